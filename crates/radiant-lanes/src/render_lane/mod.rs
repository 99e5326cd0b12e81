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

//! Rendering lanes - the GPU passes of a frame.
//!
//! A frame runs, in order: [`ShadowLane`], [`SceneLane`], [`BloomLane`],
//! [`PostFxLane`] and [`PresentLane`]. Every lane reads and writes the same
//! [`FrameContext`], which the render agent assembles once per frame.

use radiant_core::{
    lane::{Lane, LaneError},
    math::{Mat4, Vec3},
    renderer::{Environment, FrameStats, FramebufferId, RenderSettings, TextureId},
};

mod batch;
mod bloom_lane;
mod debug_lane;
mod light;
mod placeholders;
mod postfx_lane;
mod present_lane;
mod scene_lane;
mod shader_cache;
pub mod shaders;
mod shadow_lane;
mod skybox;
mod targets;

pub use batch::*;
pub use bloom_lane::*;
pub use debug_lane::*;
pub use light::*;
pub use placeholders::*;
pub use postfx_lane::*;
pub use present_lane::*;
pub use scene_lane::*;
pub use shader_cache::*;
pub use shadow_lane::*;
pub use skybox::*;
pub use targets::*;

use crate::gpu::{Primitives, SharedDevice};

/// Everything a lane may read or write while a frame executes.
///
/// The context borrows the renderer's state for the duration of one frame.
/// Batches are drained by the lanes that consume them.
pub struct FrameContext<'a> {
    /// The device.
    pub device: &'a SharedDevice,
    /// Camera view matrix.
    pub view: Mat4,
    /// Camera projection matrix for the internal aspect ratio.
    pub projection: Mat4,
    /// Camera position in world space.
    pub view_position: Vec3,
    /// Camera near plane.
    pub near: f32,
    /// Camera far plane.
    pub far: f32,
    /// Look of the frame.
    pub environment: &'a Environment,
    /// The current sky, if the world has one.
    pub skybox: Option<&'a Skybox>,
    /// Lookup of lights referenced by the batches.
    pub lights: &'a dyn LightSource,
    /// Scene draws keyed by material configuration.
    pub scene_batches: &'a mut SceneBatches,
    /// Shadow draws keyed by light.
    pub shadow_batches: &'a mut ShadowBatches,
    /// Material programs.
    pub shaders: &'a mut MaterialShaderCache,
    /// Offscreen targets.
    pub targets: &'a FrameTargets,
    /// Stand-ins for missing material maps.
    pub placeholders: &'a Placeholders,
    /// Shared quad and cube meshes.
    pub primitives: &'a Primitives,
    /// Renderer settings.
    pub settings: &'a RenderSettings,
    /// Framebuffer receiving the final image, `None` for the screen.
    pub output: Option<FramebufferId>,
    /// Size of the output framebuffer.
    pub output_size: (u32, u32),
    /// False when the shadow maps keep last update's content.
    pub render_shadows: bool,
    /// Blurred bright pass, written by the bloom lane.
    pub bloom_texture: Option<TextureId>,
    /// Counters of the frame.
    pub stats: &'a mut FrameStats,
}

/// A trait defining the behavior of a rendering lane.
///
/// Lanes own the programs they draw with. They are created empty, acquire
/// their GPU resources in [`on_initialize`](RenderLane::on_initialize) and
/// release them in [`on_shutdown`](RenderLane::on_shutdown), so the render
/// agent can hold every lane before a device exists.
pub trait RenderLane: Lane {
    /// Creates the lane's GPU resources.
    ///
    /// # Arguments
    ///
    /// * `device`: The device the lane will draw with.
    ///
    /// # Returns
    ///
    /// An error when a program fails to compile or link.
    fn on_initialize(&mut self, device: &SharedDevice) -> Result<(), LaneError>;

    /// Records the lane's commands for the current frame.
    ///
    /// # Arguments
    ///
    /// * `ctx`: The frame being rendered. Lanes consuming batches leave them empty.
    ///
    /// # Returns
    ///
    /// [`LaneError::NotInitialized`] when called before
    /// [`on_initialize`](RenderLane::on_initialize), or the render error that
    /// stopped the pass.
    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError>;

    /// Releases the lane's GPU resources.
    fn on_shutdown(&mut self);
}
