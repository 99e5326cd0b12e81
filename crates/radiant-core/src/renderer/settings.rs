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

//! Renderer-wide settings chosen at initialization and adjustable per frame.

use serde::{Deserialize, Serialize};

use super::light::Layers;

radiant_bitflags! {
    /// Initialization flags of the renderer.
    pub struct RenderFlags: u32 {
        /// Scale the internal buffers with a linear filter when presenting.
        const BLIT_LINEAR = 1 << 0;
        /// Preserve the internal aspect ratio when presenting (letterboxing).
        const ASPECT_KEEP = 1 << 1;
        /// Skip camera frustum culling. Shadow culling is always performed.
        const NO_FRUSTUM_CULLING = 1 << 2;
        /// Load the shaders used to visualize shadow maps.
        const DEBUG_SHADOW_MAP = 1 << 3;
    }
}

/// Order in which the calls of each scene batch are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthSortOrder {
    /// Submission order.
    #[default]
    Disabled,
    /// Nearest first, reducing overdraw for opaque geometry.
    NearToFar,
    /// Farthest first, for correct alpha blending.
    FarToNear,
}

/// Global render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Internal rendering resolution. `None` follows the window size.
    pub internal_resolution: Option<(u32, u32)>,
    /// Initialization flags.
    pub flags: RenderFlags,
    /// Depth sorting of scene batches.
    pub depth_sort: DepthSortOrder,
    /// Minimum time in seconds between two shadow map refreshes. `0` refreshes every frame.
    pub shadow_update_interval: f32,
    /// Layers rendered this frame.
    pub active_layers: Layers,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            internal_resolution: None,
            flags: RenderFlags::empty(),
            depth_sort: DepthSortOrder::Disabled,
            shadow_update_interval: 0.0,
            active_layers: Layers::LAYER_1,
        }
    }
}
