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

//! Owned wrappers over device objects.
//!
//! Every wrapper keeps a [`SharedDevice`] and releases its object on drop, so
//! a failed multi-step construction never leaves an orphan behind.

use std::rc::Rc;

use radiant_core::renderer::RenderDevice;

mod framebuffer;
mod primitive;
mod program;
mod target;
mod texture;

pub use framebuffer::*;
pub use primitive::*;
pub use program::*;
pub use target::*;
pub use texture::*;

/// The device shared by every wrapper of a renderer.
///
/// Devices are bound to the thread owning the GPU context, hence `Rc`.
pub type SharedDevice = Rc<dyn RenderDevice>;
