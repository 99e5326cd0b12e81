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

//! Provides the public, backend-agnostic rendering contracts of Radiant.
//!
//! This module defines the "common language" for all rendering operations: the
//! [`RenderDevice`] trait, the value types it exchanges, material and light
//! classification, and the error types returned by creation paths.
//!
//! This module defines the 'what' of rendering. The 'how' lives in a
//! concrete backend in `radiant-infra`, and `radiant-lanes` / `radiant-agents`
//! drive it without knowing which backend runs underneath.

pub mod api;
pub mod environment;
pub mod error;
pub mod light;
pub mod material;
pub mod settings;
pub mod stats;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::environment::{
    Adjustments, Bloom, BloomMode, Environment, Fog, FogMode, SkyboxId, Tonemap, TonemapMode, World,
};
pub use self::error::{DeviceError, RenderError, ResourceError, ShaderError};
pub use self::light::{Layers, LightKind, ShadowCastMode};
pub use self::material::{DiffuseMode, MaterialConfig, MaterialFlags, ShaderKey, SpecularMode};
pub use self::settings::{DepthSortOrder, RenderFlags, RenderSettings};
pub use self::stats::FrameStats;
pub use self::traits::RenderDevice;
