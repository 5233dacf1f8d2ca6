use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use mesh_simplifier::{MeshBuffers, Preserve, SimplificationOptions, simplify_mesh};

use std::env;
use std::f32::consts::PI;
use std::path::Path;

/// UV sphere with normals and texture coordinates; the seam column is duplicated like exported assets do.
fn sphere(rings: usize, segments: usize) -> MeshBuffers {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * PI;

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let phi = u * 2.0 * PI;

            let p = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];

            positions.push(p);
            normals.push(p);
            uvs.push([u, v]);
        }
    }

    let stride = (segments + 1) as u32;

    for ring in 0..rings as u32 {
        for segment in 0..segments as u32 {
            let a = ring * stride + segment;
            let b = a + stride;

            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    MeshBuffers::new(positions, indices).with_normals(normals).with_uvs(uvs)
}

fn load_obj(path: &Path) -> Result<MeshBuffers, tobj::LoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut mesh = MeshBuffers::default();

    for model in models.iter() {
        let base = mesh.positions.len() as u32;

        mesh.positions
            .extend(model.mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        mesh.indices.extend(model.mesh.indices.iter().map(|i| base + i));
    }

    Ok(mesh)
}

fn bench_mesh(c: &mut Criterion, name: &str, mesh: &MeshBuffers) {
    let mut group = c.benchmark_group("simplify_mesh");
    group.sample_size(10);
    group.throughput(Throughput::Elements(mesh.triangle_count() as u64));

    for (label, options) in [
        ("default", SimplificationOptions::default()),
        ("lossless", SimplificationOptions::lossless()),
        (
            "border",
            SimplificationOptions::default().with_preserve(Preserve::BorderEdges),
        ),
    ] {
        group.bench_with_input(BenchmarkId::new(label, name), mesh, |b, mesh| {
            let target_count = mesh.triangle_count() / 4;

            b.iter(|| simplify_mesh(mesh, target_count, &options).unwrap());
        });
    }

    group.finish();
}

fn simplify(c: &mut Criterion) {
    bench_mesh(c, "sphere_64x128", &sphere(64, 128));

    // optional real world input
    if let Ok(path) = env::var("MESH_SIMPLIFIER_OBJ") {
        let mesh = load_obj(Path::new(&path)).unwrap();
        bench_mesh(c, &path, &mesh);
    }
}

criterion_group!(benches, simplify);
criterion_main!(benches);
