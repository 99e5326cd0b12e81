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

//! OpenGL 3.3 core implementation of [`RenderDevice`] over `glow`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use glow::HasContext;

use radiant_core::math::Color;
use radiant_core::renderer::{
    border_color_rgba, Attachment, BlendMode, BlitFilter, BlitMask, ClearFlags, CullMode,
    FramebufferId, FramebufferStatus, FramebufferTarget, ImageTarget, InternalFormat,
    MeshAttribute, MeshData, MeshId, ProgramId, Rect, RenderDevice, RenderbufferId, ResourceError,
    ShaderError, TextureId, TextureSampling, TextureTarget, TextureUpload, TextureWrap, UniformInfo,
    UniformKind, UniformLocation, UniformValue,
};

use super::conversions::{framebuffer_status_from_gl, IntoGl};

const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
const MAX_TEXTURE_MAX_ANISOTROPY: u32 = 0x84FF;

/// Vertex attribute locations shared with the embedded shaders.
const ATTRIB_POSITION: u32 = 0;
const ATTRIB_TEXCOORD: u32 = 1;
const ATTRIB_NORMAL: u32 = 2;
const ATTRIB_COLOR: u32 = 3;
const ATTRIB_TANGENT: u32 = 4;

#[derive(Debug)]
struct GlMesh {
    vao: glow::NativeVertexArray,
    buffers: HashMap<MeshAttribute, glow::NativeBuffer>,
    texcoords: Option<glow::NativeBuffer>,
    ebo: Option<glow::NativeBuffer>,
    count: i32,
    usage: u32,
}

fn texture(id: TextureId) -> Option<glow::NativeTexture> {
    NonZeroU32::new(id.0).map(glow::NativeTexture)
}

fn framebuffer(id: Option<FramebufferId>) -> Option<glow::NativeFramebuffer> {
    id.and_then(|f| NonZeroU32::new(f.0)).map(glow::NativeFramebuffer)
}

fn renderbuffer(id: RenderbufferId) -> Option<glow::NativeRenderbuffer> {
    NonZeroU32::new(id.0).map(glow::NativeRenderbuffer)
}

fn program(id: ProgramId) -> Option<glow::NativeProgram> {
    NonZeroU32::new(id.0).map(glow::NativeProgram)
}

fn uniform_kind(utype: u32) -> UniformKind {
    match utype {
        glow::FLOAT => UniformKind::Float,
        glow::FLOAT_VEC2 => UniformKind::Vec2,
        glow::FLOAT_VEC3 => UniformKind::Vec3,
        glow::FLOAT_VEC4 => UniformKind::Vec4,
        glow::INT => UniformKind::Int,
        glow::BOOL => UniformKind::Bool,
        glow::FLOAT_MAT3 => UniformKind::Mat3,
        glow::FLOAT_MAT4 => UniformKind::Mat4,
        glow::SAMPLER_1D => UniformKind::Sampler1D,
        glow::SAMPLER_2D => UniformKind::Sampler2D,
        glow::SAMPLER_3D => UniformKind::Sampler3D,
        glow::SAMPLER_CUBE => UniformKind::SamplerCube,
        _ => UniformKind::Other,
    }
}

/// The OpenGL device.
///
/// The context must be current on the calling thread for the lifetime of the
/// device. The default framebuffer size is whatever the host last passed to
/// [`GlowDevice::resize`].
pub struct GlowDevice {
    gl: glow::Context,
    meshes: RefCell<HashMap<MeshId, GlMesh>>,
    next_mesh: Cell<u32>,
    draw_fb: Cell<Option<FramebufferId>>,
    read_fb: Cell<Option<FramebufferId>>,
    viewport: Cell<Rect>,
    default_size: Cell<(u32, u32)>,
    max_anisotropy: f32,
}

impl fmt::Debug for GlowDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowDevice")
            .field("meshes", &self.meshes.borrow().len())
            .field("viewport", &self.viewport.get())
            .field("default_size", &self.default_size.get())
            .finish()
    }
}

impl GlowDevice {
    /// Wraps a current context whose default framebuffer is `width * height`.
    pub fn new(gl: glow::Context, width: u32, height: u32) -> Self {
        let max_anisotropy = unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.get_parameter_f32(MAX_TEXTURE_MAX_ANISOTROPY).max(1.0)
        };
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        log::info!("OpenGL device created: {} ({}x{})", version, width, height);

        let viewport = Rect::from_size(width as i32, height as i32);
        unsafe {
            gl.viewport(0, 0, viewport.width, viewport.height);
        }
        // A stray error from the probes above must not be reported as a frame error.
        unsafe { while gl.get_error() != glow::NO_ERROR {} }

        Self {
            gl,
            meshes: RefCell::new(HashMap::new()),
            next_mesh: Cell::new(1),
            draw_fb: Cell::new(None),
            read_fb: Cell::new(None),
            viewport: Cell::new(viewport),
            default_size: Cell::new((width, height)),
            max_anisotropy,
        }
    }

    /// The wrapped context.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Records a new default framebuffer size after a window resize.
    pub fn resize(&self, width: u32, height: u32) {
        self.default_size.set((width, height));
    }

    /// Runs `f` with `fb` bound to `GL_FRAMEBUFFER`, restoring previous bindings.
    fn with_framebuffer(&self, fb: FramebufferId, f: impl FnOnce(&glow::Context)) {
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer(Some(fb)));
            f(&self.gl);
            self.gl
                .bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer(self.draw_fb.get()));
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, framebuffer(self.read_fb.get()));
        }
    }

    fn compile(&self, stage: &'static str, kind: u32, src: &str) -> Result<glow::NativeShader, ShaderError> {
        unsafe {
            let shader = self.gl.create_shader(kind).map_err(ShaderError::CreationFailed)?;
            self.gl.shader_source(shader, src);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ShaderError::CompilationFailed { stage, log });
            }
            Ok(shader)
        }
    }

    fn upload_buffer(&self, target: u32, bytes: &[u8], usage: u32) -> Result<glow::NativeBuffer, ResourceError> {
        unsafe {
            let buffer = self.gl.create_buffer().map_err(ResourceError::AllocationFailed)?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, bytes, usage);
            Ok(buffer)
        }
    }

    fn attribute_bytes(mesh: &MeshData, attribute: MeshAttribute) -> &[u8] {
        match attribute {
            MeshAttribute::Position => bytemuck::cast_slice(&mesh.positions),
            MeshAttribute::Normal => bytemuck::cast_slice(&mesh.normals),
            MeshAttribute::Tangent => bytemuck::cast_slice(&mesh.tangents),
            MeshAttribute::Color => bytemuck::cast_slice(&mesh.colors),
        }
    }

    fn attribute_layout(attribute: MeshAttribute) -> (u32, i32, u32, bool) {
        match attribute {
            MeshAttribute::Position => (ATTRIB_POSITION, 3, glow::FLOAT, false),
            MeshAttribute::Normal => (ATTRIB_NORMAL, 3, glow::FLOAT, false),
            MeshAttribute::Tangent => (ATTRIB_TANGENT, 4, glow::FLOAT, false),
            MeshAttribute::Color => (ATTRIB_COLOR, 4, glow::UNSIGNED_BYTE, true),
        }
    }

    fn release_mesh(&self, mesh: GlMesh) {
        unsafe {
            for (_, buffer) in mesh.buffers {
                self.gl.delete_buffer(buffer);
            }
            if let Some(b) = mesh.texcoords {
                self.gl.delete_buffer(b);
            }
            if let Some(b) = mesh.ebo {
                self.gl.delete_buffer(b);
            }
            self.gl.delete_vertex_array(mesh.vao);
        }
    }
}

impl RenderDevice for GlowDevice {
    fn create_texture(&self, _target: TextureTarget) -> Result<TextureId, ResourceError> {
        let tex = unsafe { self.gl.create_texture() }.map_err(ResourceError::AllocationFailed)?;
        Ok(TextureId(tex.0.get()))
    }

    fn destroy_texture(&self, id: TextureId) {
        if let Some(tex) = texture(id) {
            unsafe { self.gl.delete_texture(tex) };
        }
    }

    fn upload_texture(&self, id: TextureId, upload: &TextureUpload<'_>) {
        let target: u32 = upload.target.texture_target().into_gl();
        let image: u32 = upload.target.into_gl();
        let internal: u32 = upload.format.internal.into_gl();
        let external: u32 = upload.format.external.into_gl();
        let component: u32 = upload.format.component.into_gl();
        let (w, h, d) = (upload.width as i32, upload.height as i32, upload.depth as i32);
        let level = upload.level as i32;
        unsafe {
            self.gl.bind_texture(target, texture(id));
            match upload.target {
                ImageTarget::Texture1D => self.gl.tex_image_1d(
                    image, level, internal as i32, w, 0, external, component, upload.data,
                ),
                ImageTarget::Texture2D | ImageTarget::CubeFace(_) => self.gl.tex_image_2d(
                    image, level, internal as i32, w, h, 0, external, component, upload.data,
                ),
                ImageTarget::Texture3D => self.gl.tex_image_3d(
                    image, level, internal as i32, w, h, d, 0, external, component, upload.data,
                ),
            }
            self.gl.bind_texture(target, None);
        }
    }

    fn set_texture_sampling(&self, id: TextureId, target: TextureTarget, sampling: TextureSampling) {
        let t: u32 = target.into_gl();
        unsafe {
            self.gl.bind_texture(t, texture(id));
            self.gl
                .tex_parameter_i32(t, glow::TEXTURE_MIN_FILTER, sampling.min.into_gl());
            self.gl
                .tex_parameter_i32(t, glow::TEXTURE_MAG_FILTER, sampling.mag.into_gl());
            if self.max_anisotropy > 1.0 {
                let aniso = sampling.anisotropy.clamp(1.0, self.max_anisotropy);
                self.gl.tex_parameter_f32(t, TEXTURE_MAX_ANISOTROPY, aniso);
            }
            self.gl.bind_texture(t, None);
        }
    }

    fn set_texture_wrap(&self, id: TextureId, target: TextureTarget, wrap: TextureWrap) {
        let t: u32 = target.into_gl();
        let w: i32 = wrap.into_gl();
        unsafe {
            self.gl.bind_texture(t, texture(id));
            self.gl.tex_parameter_i32(t, glow::TEXTURE_WRAP_S, w);
            if target != TextureTarget::Texture1D {
                self.gl.tex_parameter_i32(t, glow::TEXTURE_WRAP_T, w);
            }
            if matches!(target, TextureTarget::Texture3D | TextureTarget::CubeMap) {
                self.gl.tex_parameter_i32(t, glow::TEXTURE_WRAP_R, w);
            }
            self.gl.bind_texture(t, None);
        }
    }

    fn set_texture_border_color(&self, id: TextureId, target: TextureTarget, color: Color) {
        let t: u32 = target.into_gl();
        unsafe {
            self.gl.bind_texture(t, texture(id));
            self.gl
                .tex_parameter_f32_slice(t, glow::TEXTURE_BORDER_COLOR, &border_color_rgba(color));
            self.gl.bind_texture(t, None);
        }
    }

    fn generate_mipmaps(&self, id: TextureId, target: TextureTarget) {
        let t: u32 = target.into_gl();
        unsafe {
            self.gl.bind_texture(t, texture(id));
            self.gl.generate_mipmap(t);
            self.gl.bind_texture(t, None);
        }
    }

    fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    fn create_renderbuffer(&self) -> Result<RenderbufferId, ResourceError> {
        let rb = unsafe { self.gl.create_renderbuffer() }.map_err(ResourceError::AllocationFailed)?;
        Ok(RenderbufferId(rb.0.get()))
    }

    fn destroy_renderbuffer(&self, id: RenderbufferId) {
        if let Some(rb) = renderbuffer(id) {
            unsafe { self.gl.delete_renderbuffer(rb) };
        }
    }

    fn renderbuffer_storage(&self, id: RenderbufferId, format: InternalFormat, width: u32, height: u32) {
        unsafe {
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, renderbuffer(id));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                format.into_gl(),
                width as i32,
                height as i32,
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, ResourceError> {
        let fb = unsafe { self.gl.create_framebuffer() }.map_err(ResourceError::AllocationFailed)?;
        Ok(FramebufferId(fb.0.get()))
    }

    fn destroy_framebuffer(&self, id: FramebufferId) {
        if self.draw_fb.get() == Some(id) {
            self.draw_fb.set(None);
        }
        if self.read_fb.get() == Some(id) {
            self.read_fb.set(None);
        }
        if let Some(fb) = framebuffer(Some(id)) {
            unsafe { self.gl.delete_framebuffer(fb) };
        }
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, id: Option<FramebufferId>) {
        match target {
            FramebufferTarget::Both => {
                self.draw_fb.set(id);
                self.read_fb.set(id);
            }
            FramebufferTarget::Draw => self.draw_fb.set(id),
            FramebufferTarget::Read => self.read_fb.set(id),
        }
        unsafe { self.gl.bind_framebuffer(target.into_gl(), framebuffer(id)) };
    }

    fn attach_texture(
        &self,
        fb: FramebufferId,
        attachment: Attachment,
        tex: TextureId,
        image: ImageTarget,
        level: u32,
    ) {
        self.with_framebuffer(fb, |gl| unsafe {
            match image {
                ImageTarget::Texture2D | ImageTarget::CubeFace(_) => gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    attachment.into_gl(),
                    image.into_gl(),
                    texture(tex),
                    level as i32,
                ),
                ImageTarget::Texture1D | ImageTarget::Texture3D => gl.framebuffer_texture(
                    glow::FRAMEBUFFER,
                    attachment.into_gl(),
                    texture(tex),
                    level as i32,
                ),
            }
        });
    }

    fn attach_renderbuffer(&self, fb: FramebufferId, attachment: Attachment, rbo: RenderbufferId) {
        self.with_framebuffer(fb, |gl| unsafe {
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                attachment.into_gl(),
                glow::RENDERBUFFER,
                renderbuffer(rbo),
            );
        });
    }

    fn set_draw_buffers(&self, fb: FramebufferId, attachments: &[Attachment]) {
        let buffers: Vec<u32> = attachments.iter().map(|a| a.into_gl()).collect();
        self.with_framebuffer(fb, |gl| unsafe { gl.draw_buffers(&buffers) });
    }

    fn set_read_buffer(&self, fb: FramebufferId, attachment: Attachment) {
        self.with_framebuffer(fb, |gl| unsafe { gl.read_buffer(attachment.into_gl()) });
    }

    fn framebuffer_status(&self, fb: FramebufferId) -> FramebufferStatus {
        let status = Cell::new(FramebufferStatus::Undefined);
        self.with_framebuffer(fb, |gl| {
            status.set(framebuffer_status_from_gl(unsafe {
                gl.check_framebuffer_status(glow::FRAMEBUFFER)
            }));
        });
        status.get()
    }

    fn blit_framebuffer(
        &self,
        src: Option<FramebufferId>,
        dst: Option<FramebufferId>,
        src_rect: Rect,
        dst_rect: Rect,
        mask: BlitMask,
        filter: BlitFilter,
    ) {
        unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, framebuffer(src));
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer(dst));
            self.gl.blit_framebuffer(
                src_rect.x,
                src_rect.y,
                src_rect.x + src_rect.width,
                src_rect.y + src_rect.height,
                dst_rect.x,
                dst_rect.y,
                dst_rect.x + dst_rect.width,
                dst_rect.y + dst_rect.height,
                mask.into_gl(),
                filter.into_gl(),
            );
            self.gl
                .bind_framebuffer(glow::READ_FRAMEBUFFER, framebuffer(self.read_fb.get()));
            self.gl
                .bind_framebuffer(glow::DRAW_FRAMEBUFFER, framebuffer(self.draw_fb.get()));
        }
    }

    fn default_framebuffer_size(&self) -> (u32, u32) {
        self.default_size.get()
    }

    fn create_program(&self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId, ShaderError> {
        let vs = self.compile("vertex", glow::VERTEX_SHADER, vertex_src)?;
        let fs = match self.compile("fragment", glow::FRAGMENT_SHADER, fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(e);
            }
        };
        unsafe {
            let prog = match self.gl.create_program() {
                Ok(p) => p,
                Err(e) => {
                    self.gl.delete_shader(vs);
                    self.gl.delete_shader(fs);
                    return Err(ShaderError::CreationFailed(e));
                }
            };
            self.gl.attach_shader(prog, vs);
            self.gl.attach_shader(prog, fs);
            self.gl.link_program(prog);
            self.gl.detach_shader(prog, vs);
            self.gl.detach_shader(prog, fs);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);

            if !self.gl.get_program_link_status(prog) {
                let log = self.gl.get_program_info_log(prog);
                self.gl.delete_program(prog);
                return Err(ShaderError::LinkFailed { log });
            }
            log::debug!("Linked program {}", prog.0.get());
            Ok(ProgramId(prog.0.get()))
        }
    }

    fn destroy_program(&self, id: ProgramId) {
        if let Some(p) = program(id) {
            unsafe { self.gl.delete_program(p) };
        }
    }

    fn use_program(&self, id: Option<ProgramId>) {
        unsafe { self.gl.use_program(id.and_then(program)) };
    }

    fn active_uniforms(&self, id: ProgramId) -> Vec<UniformInfo> {
        let Some(p) = program(id) else {
            return Vec::new();
        };
        unsafe {
            let count = self.gl.get_active_uniforms(p);
            (0..count)
                .filter_map(|i| self.gl.get_active_uniform(p, i))
                .map(|u| UniformInfo {
                    name: u.name,
                    kind: uniform_kind(u.utype),
                    size: u.size,
                })
                .collect()
        }
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        let p = program(id)?;
        unsafe { self.gl.get_uniform_location(p, name) }.map(|l| UniformLocation(l.0 as i32))
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let loc = glow::NativeUniformLocation(location.0 as u32);
        let loc = Some(&loc);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
            }
        }
    }

    fn bind_texture_unit(&self, unit: u32, target: TextureTarget, tex: Option<TextureId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target.into_gl(), tex.and_then(texture));
            self.gl.active_texture(glow::TEXTURE0);
        }
    }

    fn upload_mesh(&self, mesh: &MeshData, dynamic: bool) -> Result<MeshId, ResourceError> {
        mesh.validate()?;
        let usage = if dynamic { glow::DYNAMIC_DRAW } else { glow::STATIC_DRAW };

        let vao = unsafe { self.gl.create_vertex_array() }.map_err(ResourceError::AllocationFailed)?;
        let mut gl_mesh = GlMesh {
            vao,
            buffers: HashMap::new(),
            texcoords: None,
            ebo: None,
            count: 0,
            usage,
        };

        let result = (|| -> Result<(), ResourceError> {
            unsafe {
                self.gl.bind_vertex_array(Some(vao));

                for attribute in [
                    MeshAttribute::Position,
                    MeshAttribute::Normal,
                    MeshAttribute::Tangent,
                    MeshAttribute::Color,
                ] {
                    let bytes = Self::attribute_bytes(mesh, attribute);
                    let (index, size, ty, normalized) = Self::attribute_layout(attribute);
                    if bytes.is_empty() {
                        self.gl.disable_vertex_attrib_array(index);
                        match attribute {
                            MeshAttribute::Normal => self.gl.vertex_attrib_4_f32(index, 0.0, 0.0, 1.0, 0.0),
                            MeshAttribute::Tangent => self.gl.vertex_attrib_4_f32(index, 1.0, 0.0, 0.0, 1.0),
                            _ => self.gl.vertex_attrib_4_f32(index, 1.0, 1.0, 1.0, 1.0),
                        }
                        continue;
                    }
                    let buffer = self.upload_buffer(glow::ARRAY_BUFFER, bytes, usage)?;
                    gl_mesh.buffers.insert(attribute, buffer);
                    self.gl.enable_vertex_attrib_array(index);
                    self.gl.vertex_attrib_pointer_f32(index, size, ty, normalized, 0, 0);
                }

                if mesh.texcoords.is_empty() {
                    self.gl.disable_vertex_attrib_array(ATTRIB_TEXCOORD);
                    self.gl.vertex_attrib_4_f32(ATTRIB_TEXCOORD, 0.0, 0.0, 0.0, 0.0);
                } else {
                    let buffer = self.upload_buffer(
                        glow::ARRAY_BUFFER,
                        bytemuck::cast_slice(&mesh.texcoords),
                        usage,
                    )?;
                    gl_mesh.texcoords = Some(buffer);
                    self.gl.enable_vertex_attrib_array(ATTRIB_TEXCOORD);
                    self.gl
                        .vertex_attrib_pointer_f32(ATTRIB_TEXCOORD, 2, glow::FLOAT, false, 0, 0);
                }

                if mesh.indices.is_empty() {
                    gl_mesh.count = mesh.positions.len() as i32;
                } else {
                    let ebo = self.upload_buffer(
                        glow::ELEMENT_ARRAY_BUFFER,
                        bytemuck::cast_slice(&mesh.indices),
                        usage,
                    )?;
                    gl_mesh.ebo = Some(ebo);
                    gl_mesh.count = mesh.indices.len() as i32;
                }

                self.gl.bind_vertex_array(None);
                self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            }
            Ok(())
        })();

        if let Err(e) = result {
            unsafe { self.gl.bind_vertex_array(None) };
            self.release_mesh(gl_mesh);
            return Err(e);
        }

        let id = MeshId(self.next_mesh.get());
        self.next_mesh.set(id.0 + 1);
        self.meshes.borrow_mut().insert(id, gl_mesh);
        Ok(id)
    }

    fn update_mesh_attribute(&self, id: MeshId, attribute: MeshAttribute, mesh: &MeshData) {
        let meshes = self.meshes.borrow();
        let Some(gl_mesh) = meshes.get(&id) else {
            return;
        };
        let Some(&buffer) = gl_mesh.buffers.get(&attribute) else {
            log::warn!("{:?} has no {:?} stream to update", id, attribute);
            return;
        };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                Self::attribute_bytes(mesh, attribute),
                gl_mesh.usage,
            );
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn destroy_mesh(&self, id: MeshId) {
        if let Some(mesh) = self.meshes.borrow_mut().remove(&id) {
            self.release_mesh(mesh);
        }
    }

    fn draw_mesh(&self, id: MeshId) {
        let meshes = self.meshes.borrow();
        let Some(mesh) = meshes.get(&id) else {
            return;
        };
        unsafe {
            self.gl.bind_vertex_array(Some(mesh.vao));
            if mesh.ebo.is_some() {
                self.gl
                    .draw_elements(glow::TRIANGLES, mesh.count, glow::UNSIGNED_INT, 0);
            } else {
                self.gl.draw_arrays(glow::TRIANGLES, 0, mesh.count);
            }
            self.gl.bind_vertex_array(None);
        }
    }

    fn set_viewport(&self, rect: Rect) {
        self.viewport.set(rect);
        unsafe { self.gl.viewport(rect.x, rect.y, rect.width, rect.height) };
    }

    fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    fn clear(&self, flags: ClearFlags, color: Color) {
        let c = color.to_vec4();
        unsafe {
            if flags.contains(ClearFlags::COLOR) {
                self.gl.clear_color(c.x, c.y, c.z, c.w);
            }
            if flags.contains(ClearFlags::DEPTH) {
                self.gl.clear_depth_f32(1.0);
            }
            self.gl.clear(flags.into_gl());
        }
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        unsafe {
            if mode == BlendMode::Disabled {
                self.gl.disable(glow::BLEND);
                return;
            }
            self.gl.enable(glow::BLEND);
            let (src, dst, eq) = match mode {
                BlendMode::Alpha => (glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA, glow::FUNC_ADD),
                BlendMode::Additive => (glow::SRC_ALPHA, glow::ONE, glow::FUNC_ADD),
                BlendMode::Multiplied => (glow::DST_COLOR, glow::ONE_MINUS_SRC_ALPHA, glow::FUNC_ADD),
                BlendMode::AddColors => (glow::ONE, glow::ONE, glow::FUNC_ADD),
                BlendMode::SubtractColors => (glow::ONE, glow::ONE, glow::FUNC_SUBTRACT),
                BlendMode::AlphaPremultiply => (glow::ONE, glow::ONE_MINUS_SRC_ALPHA, glow::FUNC_ADD),
                BlendMode::Disabled => (glow::ONE, glow::ZERO, glow::FUNC_ADD),
            };
            self.gl.blend_equation(eq);
            self.gl.blend_func(src, dst);
        }
    }

    fn set_cull_mode(&self, mode: CullMode) {
        unsafe {
            match mode {
                CullMode::Disabled => self.gl.disable(glow::CULL_FACE),
                CullMode::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::FRONT);
                }
                CullMode::Back => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                }
            }
        }
    }

    fn set_depth_mask(&self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) };
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn poll_error(&self) -> Option<u32> {
        let code = unsafe { self.gl.get_error() };
        (code != glow::NO_ERROR).then_some(code)
    }
}

impl Drop for GlowDevice {
    fn drop(&mut self) {
        let meshes: Vec<GlMesh> = self.meshes.borrow_mut().drain().map(|(_, m)| m).collect();
        for mesh in meshes {
            self.release_mesh(mesh);
        }
    }
}
