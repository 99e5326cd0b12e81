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

//! The `Engine`, owner of every renderer object.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Weak;

use anyhow::Context;
use radiant_agents::RenderAgent;
use radiant_core::math::Vec3;
use radiant_core::renderer::{
    BlendMode, CullMode, DepthSortOrder, DiffuseMode, FrameStats, Layers, MaterialConfig,
    MaterialFlags, MeshAttribute, MeshData, Rect, RenderError, RenderFlags, SkyboxId,
    SpecularMode, TextureFormat,
};
use radiant_data::{mesh, Camera, Material, Mesh, Model, ParticleSystem, Sprite, Surface};
use radiant_io::{CubemapFaces, CubemapLayout, HdrPanorama};
use radiant_lanes::gpu::{RenderTarget, SharedDevice, Texture, TextureFilter};
use radiant_lanes::render_lane::{LightId, Skybox, SkyboxShared};

use crate::{EngineConfig, EngineError, EngineResult};

/// An initialized renderer.
///
/// The engine is created on the thread owning the GPU context and every
/// call must happen on that thread. Dropping it, or calling
/// [`close`](Self::close), releases every GPU resource it created; models,
/// textures and particle systems handed out to the caller release their own
/// device objects through [`unload_model`](Self::unload_model) and friends.
///
/// # Examples
///
/// ```rust,ignore
/// let mut engine = Engine::init(device)?;
/// let model = engine.load_model("assets/helmet.glb")?;
/// let camera = Camera::perspective(Vec3::new(0.0, 1.0, -4.0), Vec3::ZERO, Vec3::Y, 60.0);
///
/// engine.begin(&camera)?;
/// engine.submit_model(&model, Vec3::ZERO, Vec3::Y, 0.0, Vec3::ONE)?;
/// engine.end()?;
/// ```
pub struct Engine {
    pub(crate) agent: RenderAgent,
    // Live skyboxes only; unloading removes the entry.
    pub(crate) skyboxes: BTreeMap<SkyboxId, Skybox>,
    // Last id handed out. Ids are never reused.
    last_skybox: u32,
    // Shared generation resources, alive while a skybox is.
    skybox_shared: Weak<SkyboxShared>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("agent", &self.agent)
            .field("skyboxes", &self.skyboxes.len())
            .finish()
    }
}

impl Engine {
    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Starts the engine with the default configuration, rendering at the
    /// size of the default framebuffer.
    pub fn init(device: SharedDevice) -> EngineResult<Self> {
        Self::with_config(device, &EngineConfig::default())
    }

    /// Starts the engine with an explicit internal resolution and flags.
    ///
    /// A non-positive `width` or `height` follows the default framebuffer.
    pub fn init_ex(device: SharedDevice, width: i32, height: i32, flags: RenderFlags) -> EngineResult<Self> {
        let config = EngineConfig {
            internal_resolution: (width > 0 && height > 0).then_some((width as u32, height as u32)),
            flags,
            ..EngineConfig::default()
        };
        Self::with_config(device, &config)
    }

    /// Starts the engine from a full configuration.
    ///
    /// # Errors
    ///
    /// Fails when a render target, a placeholder or a built-in program cannot
    /// be created. Nothing created before the failure stays alive.
    pub fn with_config(device: SharedDevice, config: &EngineConfig) -> EngineResult<Self> {
        let mut agent = RenderAgent::new(
            device,
            config.render_settings(),
            config.default_material_config,
        )?;
        agent.set_check_gl_errors(config.check_gl_errors);
        let environment = agent.environment_mut();
        *environment = config.environment;
        environment.world.skybox = None;

        log::info!("Radiant engine started");
        Ok(Self {
            agent,
            skyboxes: BTreeMap::new(),
            last_skybox: 0,
            skybox_shared: Weak::new(),
        })
    }

    /// Shuts the engine down, releasing every skybox and internal resource.
    pub fn close(mut self) {
        self.agent.environment_mut().world.skybox = None;
        let skyboxes = self.skyboxes.len();
        self.skyboxes.clear();
        log::info!(
            "Radiant engine closed after {} frames ({} skyboxes released)",
            self.agent.frame_count(),
            skyboxes
        );
    }

    /// The render agent, for inspection of the collected frame.
    pub fn render_agent(&self) -> &RenderAgent {
        &self.agent
    }

    /// The device the engine renders with.
    pub fn device(&self) -> &SharedDevice {
        self.agent.device()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────

    /// Size of the offscreen buffers the scene is rendered into.
    pub fn internal_resolution(&self) -> (u32, u32) {
        self.agent.internal_resolution()
    }

    /// Resizes the internal buffers; a non-positive size follows the default
    /// framebuffer.
    pub fn update_internal_resolution(&mut self, width: i32, height: i32) -> EngineResult<()> {
        Ok(self.agent.update_internal_resolution(width, height)?)
    }

    /// Chooses how the internal buffers are scaled onto the output.
    pub fn set_blit_mode(&mut self, aspect_keep: bool, linear: bool) {
        self.agent.set_blit_mode(aspect_keep, linear);
    }

    /// Turns camera frustum culling on or off.
    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.agent.set_frustum_culling(enabled);
    }

    /// Whether camera frustum culling is on.
    pub fn frustum_culling(&self) -> bool {
        self.agent.frustum_culling()
    }

    /// Presents into `target` instead of the screen; `None` restores the screen.
    pub fn set_render_target(&mut self, target: Option<&RenderTarget>) {
        self.agent
            .set_output(target.map(|rt| (rt.id(), (rt.width(), rt.height()))));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────────────────

    /// Starts a frame seen from `camera`.
    pub fn begin(&mut self, camera: &Camera) -> EngineResult<()> {
        Ok(self.agent.begin(camera)?)
    }

    /// Queues every surface of `model`, placed by `position`, a rotation of
    /// `angle_deg` degrees around `axis`, and `scale`.
    pub fn submit_model(
        &mut self,
        model: &Model,
        position: Vec3,
        axis: Vec3,
        angle_deg: f32,
        scale: Vec3,
    ) -> EngineResult<()> {
        Ok(self.agent.submit_model(model, position, axis, angle_deg, scale)?)
    }

    /// Queues a sprite.
    pub fn submit_sprite(
        &mut self,
        sprite: &Sprite,
        position: Vec3,
        axis: Vec3,
        angle_deg: f32,
        scale: Vec3,
    ) -> EngineResult<()> {
        Ok(self.agent.submit_sprite(sprite, position, axis, angle_deg, scale)?)
    }

    /// Queues every live particle of `system`.
    pub fn submit_particle_system(&mut self, system: &ParticleSystem) -> EngineResult<()> {
        Ok(self.agent.submit_particle_system(system)?)
    }

    /// Renders the frame with the skybox of the current environment.
    pub fn end(&mut self) -> EngineResult<()> {
        let skybox = self
            .agent
            .environment()
            .world
            .skybox
            .and_then(|id| self.skyboxes.get(&id));
        Ok(self.agent.end(skybox)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────

    /// Depth sorting of scene batches.
    pub fn depth_sort(&self) -> DepthSortOrder {
        self.agent.depth_sort()
    }

    /// Sets the depth sorting of scene batches.
    pub fn set_depth_sort(&mut self, order: DepthSortOrder) {
        self.agent.set_depth_sort(order);
    }

    /// Layers rendered.
    pub fn active_layers(&self) -> Layers {
        self.agent.active_layers()
    }

    /// Replaces the rendered layers.
    pub fn set_active_layers(&mut self, layers: Layers) {
        self.agent.set_active_layers(layers);
    }

    /// Adds layers to the rendered set.
    pub fn enable_layers(&mut self, layers: Layers) {
        self.agent.enable_layers(layers);
    }

    /// Removes layers from the rendered set.
    pub fn disable_layers(&mut self, layers: Layers) {
        self.agent.disable_layers(layers);
    }

    /// Seconds between two shadow map refreshes.
    pub fn shadow_update_interval(&self) -> f32 {
        self.agent.shadow_update_interval()
    }

    /// Sets the seconds between two shadow map refreshes, `0` for every frame.
    pub fn set_shadow_update_interval(&mut self, seconds: f32) {
        self.agent.set_shadow_update_interval(seconds);
    }

    /// Advances the shadow refresh timer by `dt` seconds.
    pub fn update_shadow_timer(&mut self, dt: f32) {
        self.agent.update_shadow_timer(dt);
    }

    /// Whether the device is polled for errors after every pass.
    pub fn check_gl_errors(&self) -> bool {
        self.agent.check_gl_errors()
    }

    /// Turns device error polling on or off.
    pub fn set_check_gl_errors(&mut self, enabled: bool) {
        self.agent.set_check_gl_errors(enabled);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Debug
    // ─────────────────────────────────────────────────────────────────────

    /// `(scene, shadow)` calls collected since `begin`.
    pub fn draw_call_count(&self) -> (usize, usize) {
        self.agent.draw_call_count()
    }

    /// Counters of the last rendered frame.
    pub fn frame_stats(&self) -> &FrameStats {
        self.agent.stats()
    }

    /// Shows the shadow map of `light` in `rect` at the end of the next frame.
    ///
    /// Returns `false` when the engine was started without
    /// [`RenderFlags::DEBUG_SHADOW_MAP`] or the light has no shadow map.
    pub fn draw_shadow_map(&mut self, light: LightId, rect: Rect, near: f32, far: f32) -> bool {
        self.agent.draw_shadow_map(light, rect, near, far)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Materials
    // ─────────────────────────────────────────────────────────────────────

    /// Builds a material configuration and compiles its program.
    pub fn create_material_config(
        &mut self,
        diffuse: DiffuseMode,
        specular: SpecularMode,
        blend: BlendMode,
        cull: CullMode,
        flags: MaterialFlags,
    ) -> EngineResult<MaterialConfig> {
        let config = MaterialConfig::new(diffuse, specular, blend, cull, flags);
        self.agent.register_material_config(config)?;
        Ok(config)
    }

    /// A material with default maps and `config`, or the default
    /// configuration when `None`.
    pub fn create_material(&self, config: Option<MaterialConfig>) -> Material {
        Material::new(config.unwrap_or_else(|| self.agent.default_material_config()))
    }

    /// Configuration given to materials created without one.
    pub fn default_material_config(&self) -> MaterialConfig {
        self.agent.default_material_config()
    }

    /// Replaces the default configuration, compiling its program.
    pub fn set_default_material_config(&mut self, config: MaterialConfig) -> EngineResult<()> {
        Ok(self.agent.set_default_material_config(config)?)
    }

    /// Compiles the program of `config` ahead of its first use.
    pub fn register_material_config(&mut self, config: MaterialConfig) -> EngineResult<()> {
        Ok(self.agent.register_material_config(config)?)
    }

    /// Releases the program of `config`. Returns `false` if it was not loaded.
    pub fn unload_material_config(&mut self, config: MaterialConfig) -> bool {
        self.agent.unload_material_config(config)
    }

    /// Whether the program of `config` is loaded.
    pub fn is_material_config_valid(&self, config: MaterialConfig) -> bool {
        self.agent.is_material_config_valid(config)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Textures
    // ─────────────────────────────────────────────────────────────────────

    /// Loads an image file as a mipmapped RGBA texture.
    ///
    /// Materials only borrow textures: keep the returned value alive while a
    /// material refers to it.
    pub fn load_texture(&self, path: impl AsRef<Path>) -> anyhow::Result<Texture> {
        let path = path.as_ref();
        let image = radiant_io::load_image(path)
            .with_context(|| format!("loading texture '{}'", path.display()))?;
        let mut texture = Texture::new_2d(
            self.device().clone(),
            Some(image.pixels.as_slice()),
            image.width,
            image.height,
            TextureFormat::RGBA8,
        )
        .with_context(|| format!("uploading texture '{}'", path.display()))?;
        texture.set_filter(TextureFilter::Trilinear);
        log::debug!("Loaded texture '{}' ({}x{})", path.display(), image.width, image.height);
        Ok(texture)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Models
    // ─────────────────────────────────────────────────────────────────────

    /// Loads an OBJ or glTF file and uploads its meshes.
    pub fn load_model(&self, path: impl AsRef<Path>) -> anyhow::Result<Model> {
        let path = path.as_ref();
        let mut model = radiant_io::load_model(path, self.default_material_config())
            .with_context(|| format!("loading model '{}'", path.display()))?;
        self.agent
            .meshes()
            .prepare_model(&mut model)
            .with_context(|| format!("uploading model '{}'", path.display()))?;
        log::info!("Loaded model '{}' ({} surfaces)", path.display(), model.surface_count());
        Ok(model)
    }

    /// Wraps `data` in a single-surface model and uploads it.
    pub fn load_model_from_mesh(&self, data: MeshData) -> EngineResult<Model> {
        let mut model = Model::from_mesh(Mesh::new(data), self.default_material_config());
        self.agent.meshes().prepare_model(&mut model)?;
        Ok(model)
    }

    /// Uploads the surfaces of a model built by hand.
    pub fn prepare_model(&self, model: &mut Model) -> EngineResult<()> {
        Ok(self.agent.meshes().prepare_model(model)?)
    }

    /// Releases the device meshes of `model`.
    pub fn unload_model(&self, mut model: Model) {
        self.agent.meshes().release_model(&mut model);
    }

    /// Reads the animations of a glTF file into `model`.
    ///
    /// Returns the number of animations read.
    pub fn load_model_animations(&self, model: &mut Model, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let animations = radiant_io::load_model_animations(path)
            .with_context(|| format!("loading animations of '{}'", path.display()))?;
        let count = animations.len();
        model.add_animations(animations);
        Ok(count)
    }

    /// Poses `model` at `frame` of animation `name` and updates the device
    /// meshes that moved.
    pub fn update_model_animation(&self, model: &mut Model, name: &str, frame: usize) -> EngineResult<()> {
        let changed = model
            .update_animation(name, frame)
            .ok_or_else(|| EngineError::UnknownAnimation(name.to_string()))?;
        self.agent.meshes().refresh_surfaces(model, &changed);
        Ok(())
    }

    /// Generates tangents for every surface and updates the uploaded meshes.
    pub fn generate_model_tangents(&self, model: &mut Model) {
        model.generate_tangents();
        for surface in &model.surfaces {
            if let Some(id) = surface.mesh.id {
                self.device()
                    .update_mesh_attribute(id, MeshAttribute::Tangent, &surface.mesh.data);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sprites and particles
    // ─────────────────────────────────────────────────────────────────────

    /// A sprite showing `texture` split into `x_frames * y_frames` cells.
    pub fn create_sprite(&self, texture: &Texture, x_frames: u32, y_frames: u32) -> Sprite {
        Sprite::new(
            texture.id(),
            (texture.width(), texture.height()),
            x_frames,
            y_frames,
            self.default_material_config(),
        )
    }

    /// A particle system of `capacity` quads whose emission follows `seed`.
    pub fn create_particle_system(&self, capacity: usize, seed: u64) -> EngineResult<ParticleSystem> {
        let surface = Surface::new(Mesh::new(mesh::unit_quad()), self.create_material(None));
        let mut system = ParticleSystem::with_seed(surface, capacity, seed);
        self.agent.meshes().prepare_mesh(&mut system.surface.mesh)?;
        Ok(system)
    }

    /// Releases the device mesh of `system`.
    pub fn unload_particle_system(&self, mut system: ParticleSystem) {
        self.agent.meshes().release_mesh(&mut system.surface.mesh);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Skyboxes
    // ─────────────────────────────────────────────────────────────────────

    /// Loads a cubemap image laid out as `layout` and builds its lighting.
    pub fn load_skybox(&mut self, path: impl AsRef<Path>, layout: CubemapLayout) -> anyhow::Result<SkyboxId> {
        let path = path.as_ref();
        let faces = radiant_io::load_cubemap(path, layout)
            .with_context(|| format!("loading skybox '{}'", path.display()))?;
        let id = self
            .create_skybox(&faces)
            .with_context(|| format!("building skybox '{}'", path.display()))?;
        log::info!("Loaded skybox '{}' as {:?}", path.display(), id);
        Ok(id)
    }

    /// Loads an equirectangular HDR image and projects it on faces of
    /// `face_size` pixels.
    pub fn load_skybox_hdr(&mut self, path: impl AsRef<Path>, face_size: u32) -> anyhow::Result<SkyboxId> {
        let path = path.as_ref();
        let panorama = radiant_io::load_hdr_panorama(path)
            .with_context(|| format!("loading panorama '{}'", path.display()))?;
        let id = self
            .create_skybox_from_panorama(&panorama, face_size)
            .with_context(|| format!("building skybox '{}'", path.display()))?;
        log::info!("Loaded HDR skybox '{}' as {:?}", path.display(), id);
        Ok(id)
    }

    /// Builds a skybox from decoded faces.
    pub fn create_skybox(&mut self, faces: &CubemapFaces) -> EngineResult<SkyboxId> {
        let shared = SkyboxShared::acquire(&mut self.skybox_shared, self.agent.device())?;
        let skybox = Skybox::from_faces(shared, faces.face_size, TextureFormat::RGBA8, &faces.pixels)?;
        Ok(self.insert_skybox(skybox))
    }

    /// Builds a skybox from a decoded panorama.
    pub fn create_skybox_from_panorama(&mut self, panorama: &HdrPanorama, face_size: u32) -> EngineResult<SkyboxId> {
        if face_size == 0 {
            return Err(RenderError::InvalidState("skybox face size must be positive".into()).into());
        }
        let shared = SkyboxShared::acquire(&mut self.skybox_shared, self.agent.device())?;
        let skybox = Skybox::from_panorama(shared, panorama.width, panorama.height, &panorama.rgb, face_size)?;
        Ok(self.insert_skybox(skybox))
    }

    /// Destroys a skybox.
    ///
    /// When it is the current world skybox the environment stops pointing at
    /// it first. Returns `false` for unknown ids.
    pub fn unload_skybox(&mut self, id: SkyboxId) -> bool {
        let world = &mut self.agent.environment_mut().world;
        if world.skybox == Some(id) {
            world.skybox = None;
            log::debug!("Unloading the current skybox {:?}", id);
        }
        if self.skyboxes.remove(&id).is_some() {
            log::info!("Unloaded skybox {:?}", id);
            true
        } else {
            false
        }
    }

    /// The skybox of `id`.
    pub fn skybox(&self, id: SkyboxId) -> Option<&Skybox> {
        self.skyboxes.get(&id)
    }

    /// Mutable access to the skybox of `id`, to rotate it.
    pub fn skybox_mut(&mut self, id: SkyboxId) -> Option<&mut Skybox> {
        self.skyboxes.get_mut(&id)
    }

    /// Number of loaded skyboxes.
    pub fn skybox_count(&self) -> usize {
        self.skyboxes.len()
    }

    fn insert_skybox(&mut self, skybox: Skybox) -> SkyboxId {
        self.last_skybox += 1;
        let id = SkyboxId(self.last_skybox);
        self.skyboxes.insert(id, skybox);
        id
    }
}
