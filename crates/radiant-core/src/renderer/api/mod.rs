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

//! Backend-agnostic value types exchanged with a [`RenderDevice`](super::RenderDevice).
//!
//! - **[`handles`]**: opaque object ids.
//! - **[`texture`]**: formats, filters, wrap modes and uploads.
//! - **[`framebuffer`]**: attachment points, blits and status codes.
//! - **[`shader`]**: uniform reflection and values.
//! - **[`state`]**: blend, cull and clear state.
//! - **[`mesh`]**: CPU vertex streams.

pub mod framebuffer;
pub mod handles;
pub mod mesh;
pub mod shader;
pub mod state;
pub mod texture;

pub use self::framebuffer::*;
pub use self::handles::*;
pub use self::mesh::*;
pub use self::shader::*;
pub use self::state::*;
pub use self::texture::*;
