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

//! Acts as the **[A]gent** of the rendering subsystem.
//!
//! The render agent decides *what* is drawn in a frame and *in which order*,
//! and delegates the GPU work to the lanes of `radiant-lanes`:
//! - `begin` captures the camera.
//! - `submit_*` classifies each drawable against the camera and light
//!   frustums and pushes calls into the scene and shadow batches.
//! - `end` runs the shadow, scene, bloom, post-processing and present lanes
//!   over those batches and leaves them empty.

mod agent;
pub mod culling;
mod mesh_preparation;
mod submission;

pub use agent::*;
pub use culling::{call_matrix, Classification, Drawable, FrameView};
pub use mesh_preparation::*;
