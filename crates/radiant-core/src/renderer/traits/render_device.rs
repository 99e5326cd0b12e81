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

//! Defines the `RenderDevice` trait, the abstraction over the immediate-mode GPU driver.

use crate::math::{Color, Mat4};
use crate::renderer::api::*;
use crate::renderer::error::{ResourceError, ShaderError};

/// A trait representing an immediate-mode graphics driver with an OpenGL-like state model.
///
/// This is the primary interface for creating and managing GPU resources and
/// issuing state changes and draws. It is implemented by concrete backends in
/// `radiant-infra` (an OpenGL backend and a headless recording backend).
///
/// All methods take `&self`: the driver's state machine lives behind the
/// implementation. The device is bound to the thread that owns the context
/// and is therefore neither `Send` nor `Sync`.
pub trait RenderDevice: std::fmt::Debug {
    // --- Textures ---

    /// Creates an empty texture object of the given target.
    ///
    /// ## Errors
    ///
    /// Returns [`ResourceError::AllocationFailed`] if the driver returns no object.
    fn create_texture(&self, target: TextureTarget) -> Result<TextureId, ResourceError>;

    /// Destroys a texture object. Unknown handles are ignored.
    fn destroy_texture(&self, id: TextureId);

    /// Allocates storage for one image of `id` and optionally fills it.
    fn upload_texture(&self, id: TextureId, upload: &TextureUpload<'_>);

    /// Sets the minification and magnification filters and the anisotropy level.
    fn set_texture_sampling(&self, id: TextureId, target: TextureTarget, sampling: TextureSampling);

    /// Sets the wrap mode on every axis relevant to `target` (S, T and R for 3D and cubemaps).
    fn set_texture_wrap(&self, id: TextureId, target: TextureTarget, wrap: TextureWrap);

    /// Sets the border color used by [`TextureWrap::ClampToBorder`].
    fn set_texture_border_color(&self, id: TextureId, target: TextureTarget, color: Color);

    /// Generates the full mip chain of `id` from its base level.
    fn generate_mipmaps(&self, id: TextureId, target: TextureTarget);

    /// The largest anisotropy the driver supports, `1.0` when unsupported.
    fn max_anisotropy(&self) -> f32;

    // --- Renderbuffers ---

    /// Creates a renderbuffer object.
    fn create_renderbuffer(&self) -> Result<RenderbufferId, ResourceError>;

    /// Destroys a renderbuffer object.
    fn destroy_renderbuffer(&self, id: RenderbufferId);

    /// Allocates storage for a renderbuffer.
    fn renderbuffer_storage(&self, id: RenderbufferId, format: InternalFormat, width: u32, height: u32);

    // --- Framebuffers ---

    /// Creates a framebuffer object.
    fn create_framebuffer(&self) -> Result<FramebufferId, ResourceError>;

    /// Destroys a framebuffer object.
    fn destroy_framebuffer(&self, id: FramebufferId);

    /// Binds a framebuffer, or the default framebuffer when `id` is `None`.
    fn bind_framebuffer(&self, target: FramebufferTarget, id: Option<FramebufferId>);

    /// Attaches one image of a texture to `fb`.
    ///
    /// ## Arguments
    ///
    /// * `image`: the image of `texture` to attach; use [`ImageTarget::CubeFace`]
    ///   to attach one face of a cubemap.
    /// * `level`: the mip level to attach.
    fn attach_texture(
        &self,
        fb: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
        image: ImageTarget,
        level: u32,
    );

    /// Attaches a renderbuffer to `fb`.
    fn attach_renderbuffer(&self, fb: FramebufferId, attachment: Attachment, rbo: RenderbufferId);

    /// Selects the color attachments written by fragment outputs.
    fn set_draw_buffers(&self, fb: FramebufferId, attachments: &[Attachment]);

    /// Selects the attachment read by blits.
    fn set_read_buffer(&self, fb: FramebufferId, attachment: Attachment);

    /// Queries the completeness status of `fb`.
    fn framebuffer_status(&self, fb: FramebufferId) -> FramebufferStatus;

    /// Copies a rectangle between the bound read and draw framebuffers.
    ///
    /// ## Arguments
    ///
    /// * `src`, `dst`: source and destination framebuffers; `None` is the default framebuffer.
    /// * `mask`: which buffers to copy.
    /// * `filter`: scaling filter; depth and stencil copies require [`BlitFilter::Nearest`].
    fn blit_framebuffer(
        &self,
        src: Option<FramebufferId>,
        dst: Option<FramebufferId>,
        src_rect: Rect,
        dst_rect: Rect,
        mask: BlitMask,
        filter: BlitFilter,
    );

    /// The current size of the default framebuffer (the window surface).
    fn default_framebuffer_size(&self) -> (u32, u32);

    // --- Shaders ---

    /// Compiles and links a program from vertex and fragment sources.
    ///
    /// ## Errors
    ///
    /// Returns a [`ShaderError`] carrying the driver log when a stage fails to
    /// compile or the program fails to link. No object is leaked on failure.
    fn create_program(&self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId, ShaderError>;

    /// Destroys a program.
    fn destroy_program(&self, id: ProgramId);

    /// Makes `id` the current program, or unbinds the current program.
    fn use_program(&self, id: Option<ProgramId>);

    /// Lists the active uniforms of a linked program.
    fn active_uniforms(&self, id: ProgramId) -> Vec<UniformInfo>;

    /// Looks up the location of a uniform by name.
    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Writes a value to a uniform of the current program.
    fn set_uniform(&self, location: UniformLocation, value: UniformValue);

    /// Binds `texture` to texture unit `unit`, or unbinds the unit when `None`.
    fn bind_texture_unit(&self, unit: u32, target: TextureTarget, texture: Option<TextureId>);

    // --- Meshes ---

    /// Uploads vertex streams and returns a drawable mesh.
    ///
    /// ## Arguments
    ///
    /// * `dynamic`: hint that [`RenderDevice::update_mesh_attribute`] will be called often.
    fn upload_mesh(&self, mesh: &MeshData, dynamic: bool) -> Result<MeshId, ResourceError>;

    /// Re-uploads one vertex stream of an existing mesh.
    fn update_mesh_attribute(&self, id: MeshId, attribute: MeshAttribute, mesh: &MeshData);

    /// Destroys a mesh and its buffers.
    fn destroy_mesh(&self, id: MeshId);

    /// Draws a mesh with the current program and state.
    fn draw_mesh(&self, id: MeshId);

    // --- Fixed-function state ---

    /// Sets the viewport rectangle.
    fn set_viewport(&self, rect: Rect);

    /// Returns the current viewport rectangle.
    fn viewport(&self) -> Rect;

    /// Clears the selected buffers of the bound framebuffer. Depth is cleared to 1.
    fn clear(&self, flags: ClearFlags, color: Color);

    /// Sets the blend equation and factors.
    fn set_blend_mode(&self, mode: BlendMode);

    /// Sets face culling.
    fn set_cull_mode(&self, mode: CullMode);

    /// Enables or disables depth writes.
    fn set_depth_mask(&self, enabled: bool);

    /// Enables or disables the depth test.
    fn set_depth_test(&self, enabled: bool);

    // --- Diagnostics ---

    /// Pops the oldest pending driver error code, if any.
    fn poll_error(&self) -> Option<u32>;

    /// The model-view matrix left on the host's immediate-mode matrix stack.
    ///
    /// Hosts without a matrix stack return the identity.
    fn ambient_transform(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}
