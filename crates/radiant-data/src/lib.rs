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

//! # Radiant Data
//!
//! CPU-side representations of everything the renderer draws: transforms,
//! cameras, materials, meshes, models, sprites and particle systems, plus the
//! small utilities they depend on (interpolation curves, the particle RNG and
//! skeletal animation).
//!
//! Types here never talk to the GPU. They carry device handles produced by
//! `radiant-lanes` and are consumed by the render agent at submission time.

#![warn(missing_docs)]

pub mod animation;
pub mod camera;
pub mod curve;
pub mod material;
pub mod mesh;
pub mod model;
pub mod particles;
pub mod rng;
pub mod sprite;
pub mod transform;

pub use animation::{BoneInfo, BonePose, ModelAnimation, Skin};
pub use camera::{Camera, Projection};
pub use curve::{InterpolationCurve, Keyframe};
pub use material::{Material, MaterialMap};
pub use mesh::Mesh;
pub use model::{Model, Surface};
pub use particles::{Particle, ParticleSystem};
pub use rng::Xoshiro256StarStar;
pub use sprite::Sprite;
pub use transform::{Transform, TransformError, TransformRef};
