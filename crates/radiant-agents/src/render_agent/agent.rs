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

//! Defines the RenderAgent, the central orchestrator of a frame.

use std::time::Instant;

use radiant_core::{
    lane::{Lane, LaneError},
    renderer::{
        DepthSortOrder, DeviceError, Environment, FrameStats, FramebufferId, Layers, MaterialConfig,
        Rect, RenderError, RenderFlags, RenderSettings, ShaderError,
    },
};
use radiant_data::Camera;
use radiant_lanes::{
    gpu::{Primitives, SharedDevice},
    render_lane::{
        BloomLane, DebugLane, FrameTargets, LightId, MaterialShaderCache, Placeholders, PostFxLane,
        PresentLane, SceneBatches, SceneLane, ShadowBatches, ShadowLane, ShadowMapView, Skybox,
    },
    FrameContext, RenderLane,
};

use super::{culling::FrameView, mesh_preparation::MeshPreparationSystem};
use crate::LightStore;

/// The agent responsible for collecting the draws of a frame and running
/// the lanes that render them.
///
/// A frame is `begin`, any number of `submit_*` calls, then `end`. Between
/// frames the agent holds no call; `end` always leaves both batch maps
/// empty, even when a lane fails.
pub struct RenderAgent {
    // The device every resource of the agent lives on.
    pub(super) device: SharedDevice,
    // The frame passes, in execution order.
    lanes: Vec<Box<dyn RenderLane>>,
    // Shadow map views queued by `draw_shadow_map`, drawn after presenting.
    debug_lane: DebugLane,
    // Uploads CPU meshes on demand.
    pub(super) meshes: MeshPreparationSystem,
    // Every light of the engine.
    pub(super) lights: LightStore,
    // The look of the frame.
    environment: Environment,
    // Global settings of the renderer.
    pub(super) settings: RenderSettings,
    // Configuration given to materials created without one.
    default_material_config: MaterialConfig,
    // Material programs keyed by shading features.
    shaders: MaterialShaderCache,
    // Offscreen targets at the internal resolution.
    targets: FrameTargets,
    // White and black stand-ins for missing maps.
    placeholders: Placeholders,
    // Shared quad and cube.
    primitives: Primitives,
    // Calls collected since `begin`.
    pub(super) scene_batches: SceneBatches,
    pub(super) shadow_batches: ShadowBatches,
    // Camera state of the frame being collected, `None` outside a frame.
    pub(super) view: Option<FrameView>,
    // User render target and its size, `None` for the screen.
    output: Option<(FramebufferId, (u32, u32))>,
    // Seconds accumulated since the last shadow refresh.
    shadow_timer: f32,
    // Poll the device for errors after every pass.
    check_gl_errors: bool,
    // Counters of the last finished frame.
    stats: FrameStats,
    // Total number of frames rendered since the agent was created.
    frame_count: u64,
}

impl std::fmt::Debug for RenderAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderAgent")
            .field("internal_resolution", &self.targets.size())
            .field("settings", &self.settings)
            .field("lights", &self.lights)
            .field("in_frame", &self.view.is_some())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl RenderAgent {
    /// Creates the agent and every GPU resource it renders with.
    ///
    /// # Arguments
    ///
    /// * `device`: The device to render with.
    /// * `settings`: Initial settings. A missing internal resolution follows
    ///   the default framebuffer.
    /// * `default_material_config`: Configuration compiled up front and given
    ///   to materials created without one.
    ///
    /// # Returns
    ///
    /// The first creation error. Nothing created before the failure survives.
    pub fn new(
        device: SharedDevice,
        mut settings: RenderSettings,
        default_material_config: MaterialConfig,
    ) -> Result<Self, RenderError> {
        let (width, height) = resolve_resolution(&device, settings.internal_resolution);
        settings.internal_resolution = Some((width, height));

        let targets = FrameTargets::new(&device, width, height)?;
        let placeholders = Placeholders::new(&device)?;
        let primitives = Primitives::new(&device)?;
        let mut shaders = MaterialShaderCache::new(device.clone());
        shaders.register(default_material_config.shader_key())?;

        let mut lanes: Vec<Box<dyn RenderLane>> = vec![
            Box::new(ShadowLane::new()),
            Box::new(SceneLane::new()),
            Box::new(BloomLane::new()),
            Box::new(PostFxLane::new()),
            Box::new(PresentLane::new()),
        ];
        for lane in &mut lanes {
            if let Err(e) = lane.on_initialize(&device) {
                return Err(lane_failure(lane.strategy_name(), e));
            }
        }
        let mut debug_lane = DebugLane::new();
        if settings.flags.contains(RenderFlags::DEBUG_SHADOW_MAP) {
            if let Err(e) = debug_lane.on_initialize(&device) {
                return Err(lane_failure(debug_lane.strategy_name(), e));
            }
        }

        log::info!(
            "RenderAgent initialized at {}x{} with flags {:?}",
            width,
            height,
            settings.flags
        );
        Ok(Self {
            meshes: MeshPreparationSystem::new(device.clone()),
            lights: LightStore::new(device.clone()),
            device,
            lanes,
            debug_lane,
            environment: Environment::default(),
            settings,
            default_material_config,
            shaders,
            targets,
            placeholders,
            primitives,
            scene_batches: SceneBatches::new(),
            shadow_batches: ShadowBatches::new(),
            view: None,
            output: None,
            shadow_timer: 0.0,
            check_gl_errors: cfg!(debug_assertions),
            stats: FrameStats::default(),
            frame_count: 0,
        })
    }

    /// Starts collecting a frame seen from `camera`.
    ///
    /// Fails when the previous frame was not ended.
    pub fn begin(&mut self, camera: &Camera) -> Result<(), RenderError> {
        if self.view.is_some() {
            return Err(invalid_state("begin called twice without end"));
        }
        let (width, height) = self.targets.size();
        let aspect = width as f32 / height.max(1) as f32;
        self.view = Some(FrameView::new(camera, aspect, self.device.ambient_transform()));
        log::trace!("Frame {} begins", self.frame_count);
        Ok(())
    }

    /// True between `begin` and `end`.
    pub fn in_frame(&self) -> bool {
        self.view.is_some()
    }

    /// Renders the collected frame.
    ///
    /// Runs the shadow pass when the shadow timer allows it, sorts the scene
    /// batches, then runs the scene, bloom, post-processing and present
    /// lanes, and finally the queued debug views. A failing lane is logged
    /// and the remaining lanes still run.
    ///
    /// # Arguments
    ///
    /// * `skybox`: The sky of the current environment, if any.
    ///
    /// # Returns
    ///
    /// The first lane error, or the first driver error polled after a pass
    /// when error checking is enabled.
    pub fn end(&mut self, skybox: Option<&Skybox>) -> Result<(), RenderError> {
        let Some(view) = self.view.take() else {
            return Err(invalid_state("end called without begin"));
        };
        let started = Instant::now();

        let render_shadows = self.shadow_timer >= self.settings.shadow_update_interval;
        if render_shadows {
            self.shadow_timer = 0.0;
        }
        self.scene_batches
            .sort_by_depth(view.position, self.settings.depth_sort);

        let (output, output_size) = match self.output {
            Some((fb, size)) => (Some(fb), size),
            None => (None, self.device.default_framebuffer_size()),
        };
        let mut stats = FrameStats {
            frame_number: self.frame_count,
            ..FrameStats::default()
        };

        let mut first_error: Option<RenderError> = None;
        {
            let mut ctx = FrameContext {
                device: &self.device,
                view: view.view,
                projection: view.projection,
                view_position: view.position,
                near: view.near,
                far: view.far,
                environment: &self.environment,
                skybox,
                lights: &self.lights,
                scene_batches: &mut self.scene_batches,
                shadow_batches: &mut self.shadow_batches,
                shaders: &mut self.shaders,
                targets: &self.targets,
                placeholders: &self.placeholders,
                primitives: &self.primitives,
                settings: &self.settings,
                output,
                output_size,
                render_shadows,
                bloom_texture: None,
                stats: &mut stats,
            };

            let check = self.check_gl_errors;
            for lane in &mut self.lanes {
                run_lane(lane.as_mut(), &mut ctx, check, &mut first_error);
            }
            run_lane(&mut self.debug_lane, &mut ctx, check, &mut first_error);
        }

        self.scene_batches.clear_all();
        self.shadow_batches.clear_all();

        stats.cpu_frame_time_ms = started.elapsed().as_secs_f32() * 1000.0;
        log::trace!(
            "Frame {} rendered: {} draws, {} shadow draws, {:.2}ms",
            stats.frame_number,
            stats.draw_calls,
            stats.shadow_draw_calls,
            stats.cpu_frame_time_ms
        );
        self.stats = stats;
        self.frame_count += 1;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Scene and shadow calls collected so far in the current frame.
    pub fn draw_call_count(&self) -> (usize, usize) {
        (
            self.scene_batches.call_count(),
            self.shadow_batches.call_count(),
        )
    }

    /// Counters of the last rendered frame.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Total number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The scene calls of the current frame.
    pub fn scene_batches(&self) -> &SceneBatches {
        &self.scene_batches
    }

    /// The shadow calls of the current frame.
    pub fn shadow_batches(&self) -> &ShadowBatches {
        &self.shadow_batches
    }

    /// The device.
    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    // --- Resolution and output ---

    /// The internal rendering resolution.
    pub fn internal_resolution(&self) -> (u32, u32) {
        self.targets.size()
    }

    /// Changes the internal resolution. Zero or negative sizes use the
    /// current size of the default framebuffer.
    pub fn update_internal_resolution(&mut self, width: i32, height: i32) -> Result<(), RenderError> {
        let requested = (width > 0 && height > 0).then(|| (width as u32, height as u32));
        let (w, h) = resolve_resolution(&self.device, requested);
        self.targets.resize(w, h)?;
        self.settings.internal_resolution = Some((w, h));
        log::info!("Internal resolution set to {}x{}", w, h);
        Ok(())
    }

    /// Renders into a framebuffer of `size` instead of the screen; `None`
    /// goes back to the screen.
    pub fn set_output(&mut self, output: Option<(FramebufferId, (u32, u32))>) {
        self.output = output;
    }

    /// The user render target, if one is set.
    pub fn output(&self) -> Option<(FramebufferId, (u32, u32))> {
        self.output
    }

    // --- Settings ---

    /// The settings in use.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Selects letterboxing and linear filtering of the final blit.
    pub fn set_blit_mode(&mut self, aspect_keep: bool, linear: bool) {
        let flags = &mut self.settings.flags;
        flags.set(RenderFlags::ASPECT_KEEP, aspect_keep);
        flags.set(RenderFlags::BLIT_LINEAR, linear);
    }

    /// Enables or disables camera frustum culling.
    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.settings
            .flags
            .set(RenderFlags::NO_FRUSTUM_CULLING, !enabled);
    }

    /// Whether drawables are tested against the camera frustum.
    pub fn frustum_culling(&self) -> bool {
        !self.settings.flags.contains(RenderFlags::NO_FRUSTUM_CULLING)
    }

    /// Ordering of the calls of each scene batch.
    pub fn depth_sort(&self) -> DepthSortOrder {
        self.settings.depth_sort
    }

    /// Sets the ordering of the calls of each scene batch.
    pub fn set_depth_sort(&mut self, order: DepthSortOrder) {
        self.settings.depth_sort = order;
    }

    /// Layers rendered by the next frames.
    pub fn active_layers(&self) -> Layers {
        self.settings.active_layers
    }

    /// Replaces the active layers.
    pub fn set_active_layers(&mut self, layers: Layers) {
        self.settings.active_layers = layers;
    }

    /// Adds `layers` to the active layers.
    pub fn enable_layers(&mut self, layers: Layers) {
        self.settings.active_layers.insert(layers);
    }

    /// Removes `layers` from the active layers.
    pub fn disable_layers(&mut self, layers: Layers) {
        self.settings.active_layers.remove(layers);
    }

    /// Minimum seconds between two shadow map refreshes.
    pub fn shadow_update_interval(&self) -> f32 {
        self.settings.shadow_update_interval
    }

    /// Sets the minimum seconds between two shadow map refreshes.
    pub fn set_shadow_update_interval(&mut self, seconds: f32) {
        self.settings.shadow_update_interval = seconds.max(0.0);
    }

    /// Advances the shadow refresh timer.
    pub fn update_shadow_timer(&mut self, dt: f32) {
        self.shadow_timer += dt.max(0.0);
    }

    /// Whether driver errors are polled after every pass.
    pub fn check_gl_errors(&self) -> bool {
        self.check_gl_errors
    }

    /// Enables or disables driver error polling.
    pub fn set_check_gl_errors(&mut self, enabled: bool) {
        self.check_gl_errors = enabled;
    }

    // --- Environment and materials ---

    /// The look of the frame.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Mutable access to the look of the frame.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// The configuration of materials created without one.
    pub fn default_material_config(&self) -> MaterialConfig {
        self.default_material_config
    }

    /// Replaces the default material configuration, compiling its program.
    pub fn set_default_material_config(&mut self, config: MaterialConfig) -> Result<(), ShaderError> {
        self.shaders.register(config.shader_key())?;
        self.default_material_config = config;
        Ok(())
    }

    /// Compiles the program of `config` ahead of its first draw.
    pub fn register_material_config(&mut self, config: MaterialConfig) -> Result<(), ShaderError> {
        self.shaders.register(config.shader_key())
    }

    /// Releases the program of `config`. Returns `false` if none was loaded.
    pub fn unload_material_config(&mut self, config: MaterialConfig) -> bool {
        self.shaders.unload(&config.shader_key())
    }

    /// True when the program of `config` is loaded.
    pub fn is_material_config_valid(&self, config: MaterialConfig) -> bool {
        self.shaders.contains(&config.shader_key())
    }

    /// The material shader cache.
    pub fn shaders(&self) -> &MaterialShaderCache {
        &self.shaders
    }

    /// White and black placeholder textures.
    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    // --- Lights ---

    /// The light store.
    pub fn lights(&self) -> &LightStore {
        &self.lights
    }

    /// Mutable access to the light store.
    pub fn lights_mut(&mut self) -> &mut LightStore {
        &mut self.lights
    }

    /// Destroys a light and drops the shadow calls queued for it.
    pub fn destroy_light(&mut self, id: LightId) -> bool {
        self.shadow_batches.remove(&id);
        self.lights.destroy(id)
    }

    /// The mesh uploader.
    pub fn meshes(&self) -> &MeshPreparationSystem {
        &self.meshes
    }

    // --- Debug ---

    /// Queues the shadow map of `light` to be drawn over `rect` of the
    /// output at the end of the frame.
    ///
    /// Returns `false` when the renderer was created without
    /// [`RenderFlags::DEBUG_SHADOW_MAP`] or the light has no shadow map.
    pub fn draw_shadow_map(&mut self, light: LightId, rect: Rect, near: f32, far: f32) -> bool {
        if !self.settings.flags.contains(RenderFlags::DEBUG_SHADOW_MAP) {
            log::warn!("Shadow map views need the DEBUG_SHADOW_MAP flag");
            return false;
        }
        if !self.lights.get(light).is_some_and(|l| l.has_shadow()) {
            log::warn!("Light {} has no shadow map to show", light.0);
            return false;
        }
        self.debug_lane.queue_shadow_map(ShadowMapView {
            light,
            rect,
            near,
            far,
        });
        true
    }
}

impl Drop for RenderAgent {
    fn drop(&mut self) {
        for lane in &mut self.lanes {
            lane.on_shutdown();
        }
        self.debug_lane.on_shutdown();
        log::info!("RenderAgent shut down after {} frames", self.frame_count);
    }
}

fn resolve_resolution(device: &SharedDevice, requested: Option<(u32, u32)>) -> (u32, u32) {
    match requested {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => {
            let (w, h) = device.default_framebuffer_size();
            (w.max(1), h.max(1))
        }
    }
}

fn run_lane(
    lane: &mut dyn RenderLane,
    ctx: &mut FrameContext<'_>,
    check_gl_errors: bool,
    first_error: &mut Option<RenderError>,
) {
    let name = lane.strategy_name();
    let mut outcome = lane.execute(ctx).map_err(|e| lane_failure(name, e));
    if outcome.is_ok() && check_gl_errors {
        outcome = poll_device(ctx.device, name);
    }
    if let Err(e) = outcome {
        first_error.get_or_insert(e);
    }
}

fn poll_device(device: &SharedDevice, pass: &str) -> Result<(), RenderError> {
    let Some(code) = device.poll_error() else {
        return Ok(());
    };
    while let Some(extra) = device.poll_error() {
        log::error!("Additional GPU error 0x{:04X} during {}", extra, pass);
    }
    let error = DeviceError {
        code,
        context: format!("{pass} pass"),
    };
    log::error!("{}", error);
    Err(error.into())
}

fn lane_failure(lane: &str, error: LaneError) -> RenderError {
    log::error!("Render lane {} failed: {}", lane, error);
    match error {
        LaneError::Render(e) => e,
        other => RenderError::InvalidState(other.to_string()),
    }
}

pub(super) fn invalid_state(message: &str) -> RenderError {
    log::error!("{}", message);
    RenderError::InvalidState(message.to_string())
}
