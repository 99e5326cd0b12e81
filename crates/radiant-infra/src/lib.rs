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

//! # Radiant Infra
//!
//! Concrete [`RenderDevice`](radiant_core::renderer::RenderDevice) backends.
//!
//! - [`GlowDevice`] drives a live OpenGL 3.3 core context through `glow`.
//! - [`HeadlessDevice`] records commands without a GPU, so the frame graph can
//!   be exercised and inspected in tests.

#![warn(missing_docs)]

pub mod graphics;

pub use graphics::headless::{Command, DrawRecord, FramebufferInfo, HeadlessDevice, TextureInfo};
pub use graphics::opengl::GlowDevice;
