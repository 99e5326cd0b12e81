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

//! A [`RenderDevice`] that records every command instead of talking to a GPU.
//!
//! Resources get real handles and are tracked so leaks, attachment layouts
//! and uniform writes can be inspected after the fact. Shader sources are
//! preprocessed and reflected so programs expose the uniforms their sources
//! declare under the active `#define`s.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};

use radiant_core::math::{Color, Mat4};
use radiant_core::renderer::{
    Attachment, BlendMode, BlitFilter, BlitMask, ClearFlags, CullMode, FramebufferId,
    FramebufferStatus, FramebufferTarget, ImageTarget, InternalFormat, MeshAttribute, MeshData,
    MeshId, ProgramId, Rect, RenderDevice, RenderbufferId, ResourceError, ShaderError,
    TextureFormat, TextureId, TextureSampling, TextureTarget, TextureUpload, TextureWrap,
    UniformInfo, UniformLocation, UniformValue,
};

use super::glsl;

/// A recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Framebuffer drawn into, `None` for the default framebuffer.
    pub framebuffer: Option<FramebufferId>,
    /// Program in use.
    pub program: Option<ProgramId>,
    /// Mesh drawn.
    pub mesh: MeshId,
    /// Triangles submitted.
    pub triangles: usize,
    /// Blend state.
    pub blend: BlendMode,
    /// Cull state.
    pub cull: CullMode,
    /// Depth writes.
    pub depth_mask: bool,
    /// Viewport at draw time.
    pub viewport: Rect,
    /// Textures bound per unit at draw time.
    pub textures: BTreeMap<u32, (TextureTarget, TextureId)>,
}

/// A recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A clear of the bound draw framebuffer.
    Clear {
        /// Target framebuffer.
        framebuffer: Option<FramebufferId>,
        /// Cleared buffers.
        flags: ClearFlags,
        /// Clear color.
        color: Color,
    },
    /// A draw.
    Draw(DrawRecord),
    /// A framebuffer blit.
    Blit {
        /// Source framebuffer.
        src: Option<FramebufferId>,
        /// Destination framebuffer.
        dst: Option<FramebufferId>,
        /// Source rectangle.
        src_rect: Rect,
        /// Destination rectangle.
        dst_rect: Rect,
        /// Copied buffers.
        mask: BlitMask,
        /// Scaling filter.
        filter: BlitFilter,
    },
    /// A framebuffer binding.
    BindFramebuffer {
        /// Binding point.
        target: FramebufferTarget,
        /// Bound framebuffer.
        framebuffer: Option<FramebufferId>,
    },
    /// A texture attachment.
    AttachTexture {
        /// Framebuffer modified.
        framebuffer: FramebufferId,
        /// Attachment point.
        attachment: Attachment,
        /// Texture attached.
        texture: TextureId,
        /// Image of the texture.
        image: ImageTarget,
        /// Mip level.
        level: u32,
    },
    /// A program switch.
    UseProgram(Option<ProgramId>),
    /// A uniform write, resolved to its name.
    SetUniform {
        /// Program the location belongs to.
        program: ProgramId,
        /// Uniform name.
        name: String,
        /// Written value.
        value: UniformValue,
    },
    /// A texture unit binding.
    BindTexture {
        /// Texture unit.
        unit: u32,
        /// Bound target.
        target: TextureTarget,
        /// Bound texture, `None` to unbind.
        texture: Option<TextureId>,
    },
    /// Mip generation.
    GenerateMipmaps(TextureId),
}

/// What the device knows about a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Texture target.
    pub target: TextureTarget,
    /// Base level width.
    pub width: u32,
    /// Base level height.
    pub height: u32,
    /// Base level depth.
    pub depth: u32,
    /// Format of the last upload.
    pub format: Option<TextureFormat>,
    /// Highest mip level allocated, plus one.
    pub levels: u32,
    /// Cube faces allocated at level 0.
    pub faces: u8,
    /// Sampling state.
    pub sampling: Option<TextureSampling>,
    /// Wrap state.
    pub wrap: TextureWrap,
    /// Border color.
    pub border: Option<Color>,
    /// Whether mipmaps were generated.
    pub mipmapped: bool,
    bytes: u64,
}

/// What the device knows about a framebuffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramebufferInfo {
    /// Texture attachments: texture, image and level.
    pub textures: BTreeMap<Attachment, (TextureId, ImageTarget, u32)>,
    /// Renderbuffer attachments.
    pub renderbuffers: BTreeMap<Attachment, RenderbufferId>,
    /// Draw buffers.
    pub draw_buffers: Vec<Attachment>,
    /// Read buffer.
    pub read_buffer: Option<Attachment>,
}

#[derive(Debug)]
struct ProgramEntry {
    uniforms: Vec<UniformInfo>,
    locations: HashMap<String, i32>,
    names: HashMap<i32, String>,
    values: HashMap<String, UniformValue>,
}

#[derive(Debug, Clone, Copy)]
struct MeshEntry {
    triangles: usize,
    vertices: usize,
}

#[derive(Debug)]
struct State {
    textures: HashMap<TextureId, TextureInfo>,
    renderbuffers: HashMap<RenderbufferId, Option<(InternalFormat, u32, u32)>>,
    framebuffers: HashMap<FramebufferId, FramebufferInfo>,
    programs: HashMap<ProgramId, ProgramEntry>,
    meshes: HashMap<MeshId, MeshEntry>,

    draw_fb: Option<FramebufferId>,
    read_fb: Option<FramebufferId>,
    program: Option<ProgramId>,
    units: BTreeMap<u32, (TextureTarget, TextureId)>,
    viewport: Rect,
    blend: BlendMode,
    cull: CullMode,
    depth_mask: bool,
    depth_test: bool,

    commands: Vec<Command>,
    errors: VecDeque<u32>,

    fail_program: Option<ShaderError>,
    fail_allocations: bool,
    forced_status: Option<FramebufferStatus>,
    default_size: (u32, u32),
    texture_bytes: u64,
    programs_linked: usize,
}

/// The recording device.
#[derive(Debug)]
pub struct HeadlessDevice {
    state: RefCell<State>,
    next_id: Cell<u32>,
}

impl HeadlessDevice {
    /// Creates a device whose default framebuffer is `width * height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: RefCell::new(State {
                textures: HashMap::new(),
                renderbuffers: HashMap::new(),
                framebuffers: HashMap::new(),
                programs: HashMap::new(),
                meshes: HashMap::new(),
                draw_fb: None,
                read_fb: None,
                program: None,
                units: BTreeMap::new(),
                viewport: Rect::from_size(width as i32, height as i32),
                blend: BlendMode::Disabled,
                cull: CullMode::Disabled,
                depth_mask: true,
                depth_test: false,
                commands: Vec::new(),
                errors: VecDeque::new(),
                fail_program: None,
                fail_allocations: false,
                forced_status: None,
                default_size: (width, height),
                texture_bytes: 0,
                programs_linked: 0,
            }),
            next_id: Cell::new(1),
        }
    }

    fn alloc_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn record(&self, cmd: Command) {
        self.state.borrow_mut().commands.push(cmd);
    }

    // --- Test controls ---

    /// Resizes the default framebuffer, as a window resize would.
    pub fn resize(&self, width: u32, height: u32) {
        self.state.borrow_mut().default_size = (width, height);
    }

    /// Makes the next [`RenderDevice::create_program`] call fail with `error`.
    pub fn fail_next_program(&self, error: ShaderError) {
        self.state.borrow_mut().fail_program = Some(error);
    }

    /// Makes texture, renderbuffer and framebuffer creation fail while set.
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    /// Forces every framebuffer to report `status`, or clears the override.
    pub fn force_framebuffer_status(&self, status: Option<FramebufferStatus>) {
        self.state.borrow_mut().forced_status = status;
    }

    /// Queues a driver error code returned by the next [`RenderDevice::poll_error`].
    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    // --- Inspection ---

    /// Every command recorded so far.
    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Forgets recorded commands, keeping resources and state.
    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    /// Recorded draws.
    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded draws into `framebuffer`.
    pub fn draws_into(&self, framebuffer: Option<FramebufferId>) -> Vec<DrawRecord> {
        self.draws()
            .into_iter()
            .filter(|d| d.framebuffer == framebuffer)
            .collect()
    }

    /// Recorded blits.
    pub fn blits(&self) -> Vec<Command> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Blit { .. }))
            .cloned()
            .collect()
    }

    /// Every value written to uniform `name` of `program`, in order.
    pub fn uniform_writes(&self, program: ProgramId, name: &str) -> Vec<UniformValue> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::SetUniform {
                    program: p,
                    name: n,
                    value,
                } if *p == program && n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// The last value written to uniform `name` of `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.values.get(name).copied())
    }

    /// Information about a live texture.
    pub fn texture_info(&self, id: TextureId) -> Option<TextureInfo> {
        self.state.borrow().textures.get(&id).cloned()
    }

    /// Information about a live framebuffer.
    pub fn framebuffer_info(&self, id: FramebufferId) -> Option<FramebufferInfo> {
        self.state.borrow().framebuffers.get(&id).cloned()
    }

    /// Whether `id` names a live program.
    pub fn is_program_alive(&self, id: ProgramId) -> bool {
        self.state.borrow().programs.contains_key(&id)
    }

    /// Number of live textures.
    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Number of live framebuffers.
    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    /// Number of live renderbuffers.
    pub fn live_renderbuffers(&self) -> usize {
        self.state.borrow().renderbuffers.len()
    }

    /// Number of live programs.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// Number of live meshes.
    pub fn live_meshes(&self) -> usize {
        self.state.borrow().meshes.len()
    }

    /// Number of programs successfully linked since creation.
    pub fn programs_linked(&self) -> usize {
        self.state.borrow().programs_linked
    }

    /// Bytes of texture storage currently allocated.
    pub fn texture_bytes(&self) -> u64 {
        self.state.borrow().texture_bytes
    }

    /// The program in use.
    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.borrow().program
    }

    /// Units with a texture bound.
    pub fn bound_units(&self) -> BTreeMap<u32, (TextureTarget, TextureId)> {
        self.state.borrow().units.clone()
    }

    /// Current blend state.
    pub fn blend_mode(&self) -> BlendMode {
        self.state.borrow().blend
    }

    /// Current cull state.
    pub fn cull_mode(&self) -> CullMode {
        self.state.borrow().cull
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

fn image_bytes(upload: &TextureUpload<'_>) -> u64 {
    upload.width as u64
        * upload.height.max(1) as u64
        * upload.depth.max(1) as u64
        * upload.format.pixel_size() as u64
}

impl RenderDevice for HeadlessDevice {
    fn create_texture(&self, target: TextureTarget) -> Result<TextureId, ResourceError> {
        if self.state.borrow().fail_allocations {
            return Err(ResourceError::AllocationFailed("texture".into()));
        }
        let id = TextureId(self.alloc_id());
        self.state.borrow_mut().textures.insert(
            id,
            TextureInfo {
                target,
                width: 0,
                height: 0,
                depth: 0,
                format: None,
                levels: 0,
                faces: 0,
                sampling: None,
                wrap: TextureWrap::Repeat,
                border: None,
                mipmapped: false,
                bytes: 0,
            },
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) {
        let mut s = self.state.borrow_mut();
        if let Some(tex) = s.textures.remove(&id) {
            s.texture_bytes = s.texture_bytes.saturating_sub(tex.bytes);
        }
        s.units.retain(|_, (_, t)| *t != id);
    }

    fn upload_texture(&self, id: TextureId, upload: &TextureUpload<'_>) {
        let mut s = self.state.borrow_mut();
        let bytes = image_bytes(upload);
        let Some(tex) = s.textures.get_mut(&id) else {
            log::warn!("upload to unknown texture {:?}", id);
            return;
        };
        if upload.level == 0 {
            tex.width = upload.width;
            tex.height = upload.height;
            tex.depth = upload.depth;
            if let ImageTarget::CubeFace(_) = upload.target {
                tex.faces = tex.faces.saturating_add(1).min(6);
            }
        }
        tex.format = Some(upload.format);
        tex.levels = tex.levels.max(upload.level + 1);
        tex.bytes += bytes;
        s.texture_bytes += bytes;
    }

    fn set_texture_sampling(&self, id: TextureId, _target: TextureTarget, sampling: TextureSampling) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.sampling = Some(sampling);
        }
    }

    fn set_texture_wrap(&self, id: TextureId, _target: TextureTarget, wrap: TextureWrap) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.wrap = wrap;
        }
    }

    fn set_texture_border_color(&self, id: TextureId, _target: TextureTarget, color: Color) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.border = Some(color);
        }
    }

    fn generate_mipmaps(&self, id: TextureId, _target: TextureTarget) {
        if let Some(tex) = self.state.borrow_mut().textures.get_mut(&id) {
            tex.mipmapped = true;
        }
        self.record(Command::GenerateMipmaps(id));
    }

    fn max_anisotropy(&self) -> f32 {
        16.0
    }

    fn create_renderbuffer(&self) -> Result<RenderbufferId, ResourceError> {
        if self.state.borrow().fail_allocations {
            return Err(ResourceError::AllocationFailed("renderbuffer".into()));
        }
        let id = RenderbufferId(self.alloc_id());
        self.state.borrow_mut().renderbuffers.insert(id, None);
        Ok(id)
    }

    fn destroy_renderbuffer(&self, id: RenderbufferId) {
        self.state.borrow_mut().renderbuffers.remove(&id);
    }

    fn renderbuffer_storage(&self, id: RenderbufferId, format: InternalFormat, width: u32, height: u32) {
        if let Some(rb) = self.state.borrow_mut().renderbuffers.get_mut(&id) {
            *rb = Some((format, width, height));
        }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId, ResourceError> {
        if self.state.borrow().fail_allocations {
            return Err(ResourceError::AllocationFailed("framebuffer".into()));
        }
        let id = FramebufferId(self.alloc_id());
        self.state
            .borrow_mut()
            .framebuffers
            .insert(id, FramebufferInfo::default());
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) {
        let mut s = self.state.borrow_mut();
        s.framebuffers.remove(&id);
        if s.draw_fb == Some(id) {
            s.draw_fb = None;
        }
        if s.read_fb == Some(id) {
            s.read_fb = None;
        }
    }

    fn bind_framebuffer(&self, target: FramebufferTarget, id: Option<FramebufferId>) {
        {
            let mut s = self.state.borrow_mut();
            match target {
                FramebufferTarget::Both => {
                    s.draw_fb = id;
                    s.read_fb = id;
                }
                FramebufferTarget::Draw => s.draw_fb = id,
                FramebufferTarget::Read => s.read_fb = id,
            }
        }
        self.record(Command::BindFramebuffer {
            target,
            framebuffer: id,
        });
    }

    fn attach_texture(
        &self,
        fb: FramebufferId,
        attachment: Attachment,
        texture: TextureId,
        image: ImageTarget,
        level: u32,
    ) {
        if let Some(info) = self.state.borrow_mut().framebuffers.get_mut(&fb) {
            info.renderbuffers.remove(&attachment);
            info.textures.insert(attachment, (texture, image, level));
        }
        self.record(Command::AttachTexture {
            framebuffer: fb,
            attachment,
            texture,
            image,
            level,
        });
    }

    fn attach_renderbuffer(&self, fb: FramebufferId, attachment: Attachment, rbo: RenderbufferId) {
        if let Some(info) = self.state.borrow_mut().framebuffers.get_mut(&fb) {
            info.textures.remove(&attachment);
            info.renderbuffers.insert(attachment, rbo);
        }
    }

    fn set_draw_buffers(&self, fb: FramebufferId, attachments: &[Attachment]) {
        if let Some(info) = self.state.borrow_mut().framebuffers.get_mut(&fb) {
            info.draw_buffers = attachments.to_vec();
        }
    }

    fn set_read_buffer(&self, fb: FramebufferId, attachment: Attachment) {
        if let Some(info) = self.state.borrow_mut().framebuffers.get_mut(&fb) {
            info.read_buffer = Some(attachment);
        }
    }

    fn framebuffer_status(&self, fb: FramebufferId) -> FramebufferStatus {
        let s = self.state.borrow();
        if let Some(status) = s.forced_status {
            return status;
        }
        let Some(info) = s.framebuffers.get(&fb) else {
            return FramebufferStatus::Undefined;
        };
        if info.textures.is_empty() && info.renderbuffers.is_empty() {
            return FramebufferStatus::MissingAttachment;
        }
        let textures_alive = info
            .textures
            .values()
            .all(|(t, _, _)| s.textures.get(t).is_some_and(|i| i.width > 0));
        let rbos_alive = info
            .renderbuffers
            .values()
            .all(|r| matches!(s.renderbuffers.get(r), Some(Some(_))));
        if !textures_alive || !rbos_alive {
            return FramebufferStatus::IncompleteAttachment;
        }
        let draw_ok = info.draw_buffers.iter().all(|a| {
            *a == Attachment::None || info.textures.contains_key(a) || info.renderbuffers.contains_key(a)
        });
        if !draw_ok {
            return FramebufferStatus::IncompleteDrawBuffer;
        }
        FramebufferStatus::Complete
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
        self.record(Command::Blit {
            src,
            dst,
            src_rect,
            dst_rect,
            mask,
            filter,
        });
    }

    fn default_framebuffer_size(&self) -> (u32, u32) {
        self.state.borrow().default_size
    }

    fn create_program(&self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId, ShaderError> {
        if let Some(err) = self.state.borrow_mut().fail_program.take() {
            return Err(err);
        }
        let vs = glsl::preprocess(vertex_src).map_err(|log| ShaderError::CompilationFailed {
            stage: "vertex",
            log,
        })?;
        let fs = glsl::preprocess(fragment_src).map_err(|log| ShaderError::CompilationFailed {
            stage: "fragment",
            log,
        })?;
        for (stage, src) in [("vertex", &vs), ("fragment", &fs)] {
            if !src.trim_start().starts_with("#version") {
                return Err(ShaderError::CompilationFailed {
                    stage,
                    log: "missing #version directive".into(),
                });
            }
        }

        let mut uniforms = glsl::reflect_uniforms(&vs);
        for u in glsl::reflect_uniforms(&fs) {
            if !uniforms.iter().any(|e| e.name == u.name) {
                uniforms.push(u);
            }
        }

        let mut locations = HashMap::new();
        let mut names = HashMap::new();
        let mut next = 0;
        for u in &uniforms {
            match u.name.strip_suffix("[0]") {
                Some(base) => {
                    // `name` aliases element 0, as the driver does.
                    locations.insert(base.to_string(), next);
                    for i in 0..u.size {
                        let elem = format!("{}[{}]", base, i);
                        locations.insert(elem.clone(), next);
                        names.insert(next, elem);
                        next += 1;
                    }
                }
                None => {
                    locations.insert(u.name.clone(), next);
                    names.insert(next, u.name.clone());
                    next += 1;
                }
            }
        }

        let id = ProgramId(self.alloc_id());
        let mut s = self.state.borrow_mut();
        s.programs.insert(
            id,
            ProgramEntry {
                uniforms,
                locations,
                names,
                values: HashMap::new(),
            },
        );
        s.programs_linked += 1;
        Ok(id)
    }

    fn destroy_program(&self, id: ProgramId) {
        let mut s = self.state.borrow_mut();
        s.programs.remove(&id);
        if s.program == Some(id) {
            s.program = None;
        }
    }

    fn use_program(&self, id: Option<ProgramId>) {
        self.state.borrow_mut().program = id;
        self.record(Command::UseProgram(id));
    }

    fn active_uniforms(&self, id: ProgramId) -> Vec<UniformInfo> {
        self.state
            .borrow()
            .programs
            .get(&id)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn uniform_location(&self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        self.state
            .borrow()
            .programs
            .get(&id)
            .and_then(|p| p.locations.get(name))
            .map(|&l| UniformLocation(l))
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        let mut s = self.state.borrow_mut();
        let Some(program) = s.program else {
            log::warn!("set_uniform without a program in use");
            return;
        };
        let Some(entry) = s.programs.get_mut(&program) else {
            return;
        };
        let Some(name) = entry.names.get(&location.0).cloned() else {
            return;
        };
        entry.values.insert(name.clone(), value);
        s.commands.push(Command::SetUniform {
            program,
            name,
            value,
        });
    }

    fn bind_texture_unit(&self, unit: u32, target: TextureTarget, texture: Option<TextureId>) {
        {
            let mut s = self.state.borrow_mut();
            match texture {
                Some(t) => {
                    s.units.insert(unit, (target, t));
                }
                None => {
                    s.units.remove(&unit);
                }
            }
        }
        self.record(Command::BindTexture {
            unit,
            target,
            texture,
        });
    }

    fn upload_mesh(&self, mesh: &MeshData, _dynamic: bool) -> Result<MeshId, ResourceError> {
        mesh.validate()?;
        let id = MeshId(self.alloc_id());
        self.state.borrow_mut().meshes.insert(
            id,
            MeshEntry {
                triangles: mesh.triangle_count(),
                vertices: mesh.vertex_count(),
            },
        );
        Ok(id)
    }

    fn update_mesh_attribute(&self, id: MeshId, attribute: MeshAttribute, mesh: &MeshData) {
        let s = self.state.borrow();
        if let Some(entry) = s.meshes.get(&id) {
            if entry.vertices != mesh.vertex_count() {
                log::warn!("{:?} update of {:?} changes its vertex count", attribute, id);
            }
        }
    }

    fn destroy_mesh(&self, id: MeshId) {
        self.state.borrow_mut().meshes.remove(&id);
    }

    fn draw_mesh(&self, id: MeshId) {
        let mut s = self.state.borrow_mut();
        let Some(entry) = s.meshes.get(&id).copied() else {
            log::warn!("draw of unknown mesh {:?}", id);
            return;
        };
        let record = DrawRecord {
            framebuffer: s.draw_fb,
            program: s.program,
            mesh: id,
            triangles: entry.triangles,
            blend: s.blend,
            cull: s.cull,
            depth_mask: s.depth_mask,
            viewport: s.viewport,
            textures: s.units.clone(),
        };
        s.commands.push(Command::Draw(record));
    }

    fn set_viewport(&self, rect: Rect) {
        self.state.borrow_mut().viewport = rect;
    }

    fn viewport(&self) -> Rect {
        self.state.borrow().viewport
    }

    fn clear(&self, flags: ClearFlags, color: Color) {
        let fb = self.state.borrow().draw_fb;
        self.record(Command::Clear {
            framebuffer: fb,
            flags,
            color,
        });
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        self.state.borrow_mut().blend = mode;
    }

    fn set_cull_mode(&self, mode: CullMode) {
        self.state.borrow_mut().cull = mode;
    }

    fn set_depth_mask(&self, enabled: bool) {
        self.state.borrow_mut().depth_mask = enabled;
    }

    fn set_depth_test(&self, enabled: bool) {
        self.state.borrow_mut().depth_test = enabled;
    }

    fn poll_error(&self) -> Option<u32> {
        self.state.borrow_mut().errors.pop_front()
    }

    fn ambient_transform(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiant_core::renderer::{ClearFlags, TextureFormat};

    const VS: &str = "#version 330 core\nuniform mat4 uMVP;\nvoid main() {}\n";
    const FS: &str = "#version 330 core\n#ifdef TINT\nuniform vec3 uTint;\n#endif\nuniform sampler2D uTex;\nuniform float uWeights[3];\nvoid main() {}\n";

    #[test]
    fn test_program_reflection_and_uniform_writes() {
        let dev = HeadlessDevice::default();
        let id = dev.create_program(VS, FS).unwrap();
        let names: Vec<String> = dev.active_uniforms(id).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["uMVP", "uTex", "uWeights[0]"]);
        assert!(dev.uniform_location(id, "uWeights[2]").is_some());
        assert!(dev.uniform_location(id, "uTint").is_none());

        dev.use_program(Some(id));
        let loc = dev.uniform_location(id, "uWeights[1]").unwrap();
        dev.set_uniform(loc, UniformValue::Float(0.5));
        assert_eq!(dev.uniform_value(id, "uWeights[1]"), Some(UniformValue::Float(0.5)));
    }

    #[test]
    fn test_program_failures() {
        let dev = HeadlessDevice::default();
        assert!(matches!(
            dev.create_program("void main() {}", FS),
            Err(ShaderError::CompilationFailed { .. })
        ));
        dev.fail_next_program(ShaderError::LinkFailed { log: "boom".into() });
        assert!(dev.create_program(VS, FS).is_err());
        assert!(dev.create_program(VS, FS).is_ok());
        assert_eq!(dev.live_programs(), 1);
    }

    #[test]
    fn test_framebuffer_completeness() {
        let dev = HeadlessDevice::default();
        let fb = dev.create_framebuffer().unwrap();
        assert_eq!(dev.framebuffer_status(fb), FramebufferStatus::MissingAttachment);

        let tex = dev.create_texture(TextureTarget::Texture2D).unwrap();
        dev.attach_texture(fb, Attachment::COLOR_0, tex, ImageTarget::Texture2D, 0);
        assert_eq!(dev.framebuffer_status(fb), FramebufferStatus::IncompleteAttachment);

        dev.upload_texture(
            tex,
            &TextureUpload {
                target: ImageTarget::Texture2D,
                level: 0,
                width: 4,
                height: 4,
                depth: 1,
                format: TextureFormat::RGBA8,
                data: None,
            },
        );
        assert_eq!(dev.framebuffer_status(fb), FramebufferStatus::Complete);
        assert_eq!(dev.texture_bytes(), 64);

        dev.destroy_texture(tex);
        assert_eq!(dev.texture_bytes(), 0);
    }

    #[test]
    fn test_draw_records_state() {
        let dev = HeadlessDevice::default();
        let mesh = dev
            .upload_mesh(
                &MeshData {
                    positions: vec![Default::default(); 3],
                    ..Default::default()
                },
                false,
            )
            .unwrap();
        dev.set_blend_mode(BlendMode::Additive);
        dev.clear(ClearFlags::COLOR, Color::BLACK);
        dev.draw_mesh(mesh);
        let draws = dev.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].blend, BlendMode::Additive);
        assert_eq!(draws[0].triangles, 1);
        assert_eq!(draws[0].framebuffer, None);
    }
}
