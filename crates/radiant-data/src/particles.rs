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

//! CPU-simulated particle systems.
//!
//! A [`ParticleSystem`] owns a fixed-capacity pool of [`Particle`]s, spawns
//! them inside a cone around the initial velocity and integrates them every
//! update. Every particle is drawn with the system's shared surface.

use radiant_core::math::{
    degrees_to_radians, Aabb, BillboardMode, Color, Mat4, Quaternion, Vec3, DEG_TO_RAD, TAU,
};
use radiant_core::renderer::{Layers, ShadowCastMode};

use crate::curve::InterpolationCurve;
use crate::model::Surface;
use crate::rng::Xoshiro256StarStar;

/// One live particle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// Remaining lifetime in seconds.
    pub lifetime: f32,
    /// World position.
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Current scale.
    pub scale: Vec3,
    /// Current tint.
    pub color: Color,
    /// Current velocity.
    pub velocity: Vec3,
    /// Current angular velocity, in degrees per second.
    pub angular_velocity: Vec3,
    /// Scale at emission, modulated by the scale curve.
    pub base_scale: Vec3,
    /// Velocity at emission, modulated by the speed curve.
    pub base_velocity: Vec3,
    /// Angular velocity at emission, modulated by the angular curve.
    pub base_angular_velocity: Vec3,
    /// Opacity at emission, modulated by the opacity curve.
    pub base_opacity: u8,
}

impl Particle {
    /// World matrix of the particle: translation, Euler rotation, then scale.
    pub fn world_matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quaternion::from_euler(r.x, r.y, r.z),
            self.position,
        )
    }
}

/// A fixed-capacity particle emitter.
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    capacity: usize,
    rng: Xoshiro256StarStar,

    /// Surface drawn for every particle. Its albedo tint is replaced by the particle color.
    pub surface: Surface,

    /// Emitter position.
    pub position: Vec3,
    /// Constant acceleration applied to every particle.
    pub gravity: Vec3,
    /// Scale at emission.
    pub initial_scale: Vec3,
    /// Uniform variance added to every scale component.
    pub scale_variance: f32,
    /// Euler rotation at emission, in degrees.
    pub initial_rotation: Vec3,
    /// Per-axis rotation variance, in degrees.
    pub rotation_variance: Vec3,
    /// Color at emission.
    pub initial_color: Color,
    /// Per-channel color variance.
    pub color_variance: Color,
    /// Velocity at emission; its direction is the axis of the emission cone.
    pub initial_velocity: Vec3,
    /// Per-axis velocity variance.
    pub velocity_variance: Vec3,
    /// Angular velocity at emission, in degrees per second.
    pub initial_angular_velocity: Vec3,
    /// Per-axis angular velocity variance.
    pub angular_velocity_variance: Vec3,
    /// Particle lifetime in seconds.
    pub lifetime: f32,
    /// Lifetime variance in seconds.
    pub lifetime_variance: f32,
    /// Countdown to the next automatic emission.
    pub emission_timer: f32,
    /// Particles emitted per second by [`update`](Self::update).
    pub emission_rate: f32,
    /// Half-angle of the emission cone, in degrees.
    pub spread_angle: f32,
    /// Bounds used for culling, in world space relative to the origin.
    pub aabb: Aabb,

    /// Scale multiplier over normalized lifetime.
    pub scale_over_lifetime: Option<InterpolationCurve>,
    /// Opacity multiplier over normalized lifetime.
    pub opacity_over_lifetime: Option<InterpolationCurve>,
    /// Speed multiplier over normalized lifetime.
    pub speed_over_lifetime: Option<InterpolationCurve>,
    /// Angular velocity multiplier over normalized lifetime.
    pub angular_velocity_over_lifetime: Option<InterpolationCurve>,

    /// Shadow casting policy.
    pub shadow: ShadowCastMode,
    /// Billboard mode applied to each particle.
    pub billboard: BillboardMode,
    /// Render layers.
    pub layers: Layers,
    /// Whether [`update`](Self::update) emits particles at `emission_rate`.
    pub auto_emission: bool,
}

impl ParticleSystem {
    /// Creates an emitter of `capacity` particles drawing `surface`.
    pub fn new(surface: Surface, capacity: usize) -> Self {
        Self::with_seed(surface, capacity, Xoshiro256StarStar::DEFAULT_SEED)
    }

    /// Creates an emitter whose emission sequence is determined by `seed`.
    pub fn with_seed(surface: Surface, capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            rng: Xoshiro256StarStar::new(seed),
            surface,
            position: Vec3::ZERO,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            initial_scale: Vec3::ONE,
            scale_variance: 0.0,
            initial_rotation: Vec3::ZERO,
            rotation_variance: Vec3::ZERO,
            initial_color: Color::WHITE,
            color_variance: Color::BLANK,
            initial_velocity: Vec3::ZERO,
            velocity_variance: Vec3::ZERO,
            initial_angular_velocity: Vec3::ZERO,
            angular_velocity_variance: Vec3::ZERO,
            lifetime: 1.0,
            lifetime_variance: 0.0,
            emission_timer: 0.0,
            emission_rate: 1.0,
            spread_angle: 0.0,
            aabb: Aabb::from_min_max(Vec3::splat(-10.0), Vec3::splat(10.0)),
            scale_over_lifetime: None,
            opacity_over_lifetime: None,
            speed_over_lifetime: None,
            angular_velocity_over_lifetime: None,
            shadow: ShadowCastMode::Off,
            billboard: BillboardMode::Enabled,
            layers: Layers::LAYER_1,
            auto_emission: true,
        }
    }

    /// Re-seeds the emission generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    /// Maximum number of live particles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live particles.
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// The live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Kills every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawns one particle. Returns `false` when the pool is full.
    pub fn emit(&mut self) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }

        let direction = self.initial_velocity.normalize();
        let elevation = self.rng.range_f32(0.0, degrees_to_radians(self.spread_angle));
        let azimuth = self.rng.range_f32(0.0, TAU);

        let (sin_e, cos_e) = elevation.sin_cos();
        let (sin_a, cos_a) = azimuth.sin_cos();
        let local = Vec3::new(sin_e * cos_a, sin_e * sin_a, cos_e);

        let aux = if direction.y.abs() > 0.9999 { Vec3::Z } else { Vec3::X };
        let binormal = aux.cross(direction).normalize();
        let normal = direction.cross(binormal);
        let cone = (binormal * local.x + normal * local.y + direction * local.z)
            * self.initial_velocity.length();

        let lifetime = self.lifetime + self.vary(self.lifetime_variance);
        let rotation = Vec3::new(
            self.initial_rotation.x + self.vary(self.rotation_variance.x),
            self.initial_rotation.y + self.vary(self.rotation_variance.y),
            self.initial_rotation.z + self.vary(self.rotation_variance.z),
        ) * DEG_TO_RAD;
        let scale = self.initial_scale + Vec3::splat(self.vary(self.scale_variance));
        let velocity = cone + self.vary_vec(self.velocity_variance);
        let angular_velocity = self.initial_angular_velocity + self.vary_vec(self.angular_velocity_variance);

        let (c, v) = (self.initial_color, self.color_variance);
        let color = Color::new(
            self.vary_channel(c.r, v.r),
            self.vary_channel(c.g, v.g),
            self.vary_channel(c.b, v.b),
            self.vary_channel(c.a, v.a),
        );

        self.particles.push(Particle {
            lifetime,
            position: self.position,
            rotation,
            scale,
            color,
            velocity,
            angular_velocity,
            base_scale: scale,
            base_velocity: velocity,
            base_angular_velocity: angular_velocity,
            base_opacity: color.a,
        });
        true
    }

    fn vary(&mut self, variance: f32) -> f32 {
        if variance == 0.0 {
            return 0.0;
        }
        self.rng.range_f32(-variance, variance)
    }

    fn vary_vec(&mut self, variance: Vec3) -> Vec3 {
        Vec3::new(self.vary(variance.x), self.vary(variance.y), self.vary(variance.z))
    }

    fn vary_channel(&mut self, base: u8, variance: u8) -> u8 {
        let v = variance as i32;
        (base as i32 + self.rng.range_i32(-v, v)).clamp(0, 255) as u8
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// With automatic emission on, the emission timer is decreased by `dt` and
    /// one particle is spawned per elapsed `1 / emission_rate`. Particles whose
    /// lifetime runs out are swap-removed; the others have their curves
    /// applied and are integrated. A zero `dt` neither emits nor ages.
    pub fn update(&mut self, dt: f32) {
        if self.auto_emission && self.emission_rate > 0.0 && dt > 0.0 {
            self.emission_timer -= dt;
            while self.emission_timer <= 0.0 {
                self.emit();
                self.emission_timer += 1.0 / self.emission_rate;
            }
        }

        let inv_lifetime = if self.lifetime > 0.0 { 1.0 / self.lifetime } else { 0.0 };
        let gravity = self.gravity;

        let mut i = self.particles.len();
        while i > 0 {
            i -= 1;
            let p = &mut self.particles[i];
            p.lifetime -= dt;
            if p.lifetime <= 0.0 {
                self.particles.swap_remove(i);
                continue;
            }

            let t = 1.0 - p.lifetime * inv_lifetime;
            if let Some(curve) = &self.scale_over_lifetime {
                p.scale = p.base_scale * curve.evaluate(t);
            }
            if let Some(curve) = &self.opacity_over_lifetime {
                p.color.a = (p.base_opacity as f32 * curve.evaluate(t)).clamp(0.0, 255.0) as u8;
            }
            if let Some(curve) = &self.speed_over_lifetime {
                p.velocity = p.base_velocity * curve.evaluate(t);
            }
            if let Some(curve) = &self.angular_velocity_over_lifetime {
                p.angular_velocity = p.base_angular_velocity * curve.evaluate(t);
            }

            p.rotation += p.angular_velocity * (dt * DEG_TO_RAD);
            p.position += p.velocity * dt;
            p.velocity += gravity * dt;
        }
    }

    /// Estimates the bounds the particles can reach with the current settings.
    ///
    /// Emits a full pool, evaluates every trajectory at half and full
    /// lifetime under constant gravity, stores the enclosing box in
    /// [`aabb`](Self::aabb) and clears the pool.
    pub fn calculate_bounding_box(&mut self) -> Aabb {
        self.particles.clear();
        while self.emit() {}

        let gravity = self.gravity;
        let at = |p: &Particle, t: f32| p.position + p.velocity * t + gravity * (0.5 * t * t);
        let points: Vec<Vec3> = self
            .particles
            .iter()
            .flat_map(|p| [at(p, p.lifetime * 0.5), at(p, p.lifetime)])
            .collect();
        let bounds = Aabb::from_points(&points);

        self.particles.clear();
        if let Some(aabb) = bounds {
            self.aabb = aabb;
        }
        self.aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn system(capacity: usize) -> ParticleSystem {
        ParticleSystem::with_seed(Surface::default(), capacity, 1234)
    }

    #[test]
    fn test_emit_respects_capacity() {
        let mut ps = system(3);
        assert!(ps.emit());
        assert!(ps.emit());
        assert!(ps.emit());
        assert!(!ps.emit());
        assert_eq!(ps.count(), 3);
    }

    #[test]
    fn test_zero_dt_keeps_count() {
        let mut ps = system(16);
        for _ in 0..5 {
            ps.emit();
        }
        ps.update(0.0);
        assert_eq!(ps.count(), 5);
    }

    #[test]
    fn test_particle_expires() {
        let mut ps = system(4);
        ps.auto_emission = false;
        ps.emit();
        ps.update(ps.lifetime + 0.01);
        assert_eq!(ps.count(), 0);
    }

    #[test]
    fn test_auto_emission_rate() {
        let mut ps = system(64);
        ps.emission_rate = 10.0;
        ps.lifetime = 100.0;
        ps.update(0.45);
        // One at t=0 plus one per elapsed tenth of a second.
        assert_eq!(ps.count(), 5);
    }

    #[test]
    fn test_cone_zero_spread_follows_velocity() {
        let mut ps = system(1);
        ps.initial_velocity = Vec3::new(0.0, 10.0, 0.0);
        ps.emit();
        let v = ps.particles()[0].velocity;
        assert_relative_eq!(v.y, 10.0, epsilon = 1e-4);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_color_variance_stays_in_range() {
        let mut ps = system(64);
        ps.initial_color = Color::new(250, 10, 128, 255);
        ps.color_variance = Color::new(20, 20, 0, 10);
        while ps.emit() {}
        for p in ps.particles() {
            assert!(p.color.r >= 230);
            assert!(p.color.g <= 30);
            assert_eq!(p.color.b, 128);
            assert_eq!(p.base_opacity, p.color.a);
        }
    }

    #[test]
    fn test_opacity_curve() {
        let mut ps = system(1);
        ps.auto_emission = false;
        let mut curve = InterpolationCurve::new(2);
        curve.add_keyframe(0.0, 1.0);
        curve.add_keyframe(1.0, 0.0);
        ps.opacity_over_lifetime = Some(curve);
        ps.emit();
        ps.update(0.5);
        assert_eq!(ps.particles()[0].color.a, 127);
    }

    #[test]
    fn test_bounding_box_covers_fall() {
        let mut ps = system(32);
        ps.initial_velocity = Vec3::new(0.0, 10.0, 0.0);
        ps.lifetime = 2.0;
        let aabb = ps.calculate_bounding_box();
        assert_eq!(ps.count(), 0);
        // Peak sampled at t = 1: 10 - 4.905.
        assert_relative_eq!(aabb.max.y, 10.0 - 0.5 * 9.81, epsilon = 1e-3);
        // End at t = 2: 20 - 19.62.
        assert_relative_eq!(aabb.min.y, 20.0 - 0.5 * 9.81 * 4.0, epsilon = 1e-3);
    }
}
