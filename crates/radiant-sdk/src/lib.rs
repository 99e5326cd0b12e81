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

//! The public-facing Software Development Kit (SDK) for the Radiant renderer.
//!
//! An [`Engine`] is created on a [`RenderDevice`](radiant_core::renderer::RenderDevice),
//! usually [`GlowDevice`](radiant_infra::GlowDevice) over an OpenGL 3.3
//! context, and exposes every renderer operation: frame submission, lights,
//! materials, models, skyboxes and the environment.
//!
//! ```rust,ignore
//! use radiant_sdk::prelude::*;
//!
//! radiant_sdk::init_logging();
//! let device: SharedDevice = Rc::new(GlowDevice::new(gl, 1280, 720));
//! let mut engine = Engine::with_config(device, &EngineConfig::load("engine.ron")?)?;
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod environment;
mod error;
mod lights;
mod logging;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use logging::init_logging;

/// The types needed by most applications.
pub mod prelude {
    pub use crate::{init_logging, Engine, EngineConfig, EngineError, EngineResult};
    pub use radiant_core::math::{BillboardMode, Color, Mat4, Quaternion, Vec2, Vec3};
    pub use radiant_core::renderer::{
        BlendMode, BloomMode, CullMode, DepthSortOrder, DiffuseMode, Environment, FogMode,
        FrameStats, Layers, LightKind, MaterialConfig, MaterialFlags, MeshData, Rect, RenderFlags,
        ShadowCastMode, SkyboxId, SpecularMode, TonemapMode,
    };
    pub use radiant_data::{
        mesh, Camera, InterpolationCurve, Material, Mesh, Model, ParticleSystem, Sprite, Surface,
        Transform, TransformRef,
    };
    pub use radiant_infra::{GlowDevice, HeadlessDevice};
    pub use radiant_io::CubemapLayout;
    pub use radiant_lanes::gpu::{RenderTarget, SharedDevice, Texture};
    pub use radiant_lanes::render_lane::LightId;
    pub use std::rc::Rc;
}
