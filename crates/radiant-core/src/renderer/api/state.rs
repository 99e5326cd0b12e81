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

//! Fixed-function pipeline state.

use serde::{Deserialize, Serialize};

/// Color blending applied when a batch is drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum BlendMode {
    /// Blending disabled; fragments overwrite the target.
    Disabled,
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Source added weighted by its alpha.
    Additive,
    /// Source multiplied with the destination.
    Multiplied,
    /// Source and destination added.
    AddColors,
    /// Destination minus source.
    SubtractColors,
    /// Alpha blending with premultiplied source.
    AlphaPremultiply,
}

/// Face culling applied when a batch is drawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum CullMode {
    /// No culling.
    Disabled,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

radiant_bitflags! {
    /// Buffers cleared by [`RenderDevice::clear`](crate::renderer::RenderDevice::clear).
    pub struct ClearFlags: u32 {
        /// Color buffers.
        const COLOR = 1 << 0;
        /// Depth buffer.
        const DEPTH = 1 << 1;
        /// Stencil buffer.
        const STENCIL = 1 << 2;
    }
}
