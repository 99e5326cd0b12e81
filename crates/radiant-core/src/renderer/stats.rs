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

//! Per-frame statistics of the render pipeline.

/// Counters collected while a frame is executed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// A sequential counter for rendered frames.
    pub frame_number: u64,
    /// Scene draw calls issued (one per mesh, sprite or particle).
    pub draw_calls: u32,
    /// Draw calls issued into shadow maps.
    pub shadow_draw_calls: u32,
    /// Scene batches (distinct material configurations) drawn.
    pub scene_batches: u32,
    /// Shadow maps refreshed.
    pub shadow_maps_rendered: u32,
    /// Triangles submitted by scene draws.
    pub triangles_rendered: u32,
    /// Bloom blur passes executed.
    pub bloom_passes: u32,
    /// Whether the skybox was drawn.
    pub skybox_drawn: bool,
    /// CPU time spent in `end()`, in milliseconds.
    pub cpu_frame_time_ms: f32,
}
