use criterion::{criterion_group, criterion_main, Criterion};
use radiant_core::math::Vec3;
use radiant_data::{InterpolationCurve, ParticleSystem, Surface};
use std::hint::black_box;

fn fountain(capacity: usize) -> ParticleSystem {
    let mut ps = ParticleSystem::with_seed(Surface::default(), capacity, 7);
    ps.initial_velocity = Vec3::new(0.0, 10.0, 0.0);
    ps.spread_angle = 30.0;
    ps.lifetime = 2.0;
    ps.emission_rate = capacity as f32 / 2.0;

    let mut scale = InterpolationCurve::new(3);
    scale.add_keyframe(0.0, 0.0);
    scale.add_keyframe(0.5, 1.0);
    scale.add_keyframe(1.0, 0.0);
    ps.scale_over_lifetime = Some(scale);
    ps
}

fn bench_particles(c: &mut Criterion) {
    let mut group = c.benchmark_group("CPU Particles");

    group.bench_function("update 10k (steady state)", |b| {
        let mut ps = fountain(10_000);
        for _ in 0..120 {
            ps.update(1.0 / 60.0);
        }
        b.iter(|| {
            ps.update(black_box(1.0 / 60.0));
            black_box(ps.count());
        });
    });

    group.bench_function("emit 1k", |b| {
        let mut ps = fountain(1_000);
        b.iter(|| {
            ps.clear();
            while ps.emit() {}
            black_box(ps.count());
        });
    });

    group.bench_function("bounding box 1k", |b| {
        let mut ps = fountain(1_000);
        b.iter(|| black_box(ps.calculate_bounding_box()));
    });

    group.finish();
}

criterion_group!(benches, bench_particles);
criterion_main!(benches);
