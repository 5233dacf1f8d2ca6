//! Simplifies OBJ files to a fraction of their triangle count and prints statistics.
//!
//! Usage: `cargo run --release --example simplify -- [-l] <ratio> <file.obj>...`
//!
//! `-l` enables all preservation options.

use mesh_simplifier::{MeshBuffers, SimplificationOptions, Simplifier};

use std::env;
use std::fmt::Debug;
use std::path::Path;
use std::time::Instant;

fn load<P>(path: P) -> Result<MeshBuffers, tobj::LoadError>
where
    P: AsRef<Path> + Debug,
{
    let start = Instant::now();

    let (models, _materials) = tobj::load_obj(
        path.as_ref(),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    let has_normals = models.iter().all(|m| !m.mesh.normals.is_empty());
    let has_uvs = models.iter().all(|m| !m.mesh.texcoords.is_empty());

    for model in models.iter() {
        let mesh = &model.mesh;
        let base = positions.len() as u32;

        positions.extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        indices.extend(mesh.indices.iter().map(|i| base + i));

        if has_normals {
            normals.extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        }

        if has_uvs {
            uvs.extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));
        }
    }

    let mut mesh = MeshBuffers::new(positions, indices);

    if has_normals {
        mesh = mesh.with_normals(normals);
    }

    if has_uvs {
        mesh = mesh.with_uvs(uvs);
    }

    let duration = start.elapsed();

    println!(
        "# {:?}: {} vertices, {} triangles; read in {:.2} msec",
        path,
        mesh.vertex_count(),
        mesh.triangle_count(),
        duration.as_micros() as f64 / 1000.0
    );

    Ok(mesh)
}

fn simplify(mesh: &MeshBuffers, ratio: f32, options: SimplificationOptions) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let target_count = (mesh.triangle_count() as f32 * ratio) as usize;
    let result = Simplifier::new(mesh, options)?.simplify(target_count);

    let duration = start.elapsed();

    println!(
        "{:9}: {} in {:.2} msec",
        "Simplify",
        result.stats,
        duration.as_micros() as f64 / 1000.0
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1).peekable();

    let lossless = args.next_if(|arg| arg == "-l").is_some();
    let options = if lossless {
        SimplificationOptions::lossless()
    } else {
        SimplificationOptions::default()
    };

    let ratio: f32 = match args.next() {
        Some(arg) => arg.parse()?,
        None => {
            eprintln!("Usage: simplify [-l] <ratio> <file.obj>...");
            return Ok(());
        }
    };

    for arg in args {
        let mesh = load(&arg)?;
        simplify(&mesh, ratio, options)?;
    }

    Ok(())
}
