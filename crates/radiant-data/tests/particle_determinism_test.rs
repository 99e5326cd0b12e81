// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for deterministic particle emission and lifetime rules.

use radiant_core::math::Vec3;
use radiant_data::{ParticleSystem, Surface};

fn fountain(seed: u64) -> ParticleSystem {
    let mut ps = ParticleSystem::with_seed(Surface::default(), 128, seed);
    ps.emission_rate = 100.0;
    ps.lifetime = 2.0;
    ps.initial_velocity = Vec3::new(0.0, 10.0, 0.0);
    ps.spread_angle = 45.0;
    ps
}

fn emit_and_record(ps: &mut ParticleSystem, n: usize) -> Vec<(Vec3, Vec3)> {
    for _ in 0..n {
        assert!(ps.emit());
    }
    // Advance so velocities are integrated into positions.
    ps.auto_emission = false;
    ps.update(0.1);
    ps.particles().iter().map(|p| (p.position, p.velocity)).collect()
}

#[test]
fn test_same_seed_gives_identical_particles() {
    let a = emit_and_record(&mut fountain(0xC0FFEE), 10);
    let b = emit_and_record(&mut fountain(0xC0FFEE), 10);
    assert_eq!(a.len(), 10);
    for ((pa, va), (pb, vb)) in a.iter().zip(&b) {
        assert_eq!(pa.x.to_bits(), pb.x.to_bits());
        assert_eq!(pa.y.to_bits(), pb.y.to_bits());
        assert_eq!(pa.z.to_bits(), pb.z.to_bits());
        assert_eq!(va, vb);
    }
}

#[test]
fn test_different_seed_diverges() {
    let a = emit_and_record(&mut fountain(1), 10);
    let b = emit_and_record(&mut fountain(2), 10);
    assert_ne!(a, b);
}

#[test]
fn test_spread_cone_bounds_direction() {
    let mut ps = fountain(99);
    while ps.emit() {}
    let cos_limit = 45.0_f32.to_radians().cos() - 1e-4;
    for p in ps.particles() {
        let dir = p.velocity.normalize();
        assert!(dir.dot(Vec3::Y) >= cos_limit);
        assert!((p.velocity.length() - 10.0).abs() < 1e-3);
    }
}

#[test]
fn test_emit_then_zero_update_keeps_count() {
    let mut ps = fountain(5);
    for _ in 0..37 {
        ps.emit();
    }
    ps.update(0.0);
    assert_eq!(ps.count(), 37);
}

#[test]
fn test_single_particle_dies_after_lifetime() {
    let mut ps = fountain(5);
    ps.auto_emission = false;
    ps.emit();
    ps.update(ps.lifetime + 1e-3);
    assert_eq!(ps.count(), 0);
}
