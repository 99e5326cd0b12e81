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

//! Opaque handles to device-side objects.
//!
//! Handles are plain integers handed out by a [`RenderDevice`](crate::renderer::RenderDevice).
//! They carry no ownership; the wrapper types in `radiant-lanes` own them and
//! release them on drop.

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

gpu_handle!(
    /// A texture object (1D, 2D, 3D or cubemap).
    TextureId
);
gpu_handle!(
    /// A renderbuffer object.
    RenderbufferId
);
gpu_handle!(
    /// A framebuffer object. The default framebuffer has no handle.
    FramebufferId
);
gpu_handle!(
    /// A linked shader program.
    ProgramId
);
gpu_handle!(
    /// An uploaded mesh (vertex array plus its buffers).
    MeshId
);

/// The location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);
