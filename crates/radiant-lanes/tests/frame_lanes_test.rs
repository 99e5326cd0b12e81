use std::rc::{Rc, Weak};

use radiant_core::lane::{Lane, LaneError, LaneKind};
use radiant_core::math::{Color, Mat4, Vec3};
use radiant_core::renderer::*;
use radiant_data::{mesh, Camera, Material};
use radiant_infra::{Command, HeadlessDevice};
use radiant_lanes::gpu::{letterbox_rect, GpuMesh, Primitives, SharedDevice};
use radiant_lanes::render_lane::*;

#[derive(Default)]
struct Lights(Vec<(LightId, Light)>);

impl LightSource for Lights {
    fn light(&self, id: LightId) -> Option<&Light> {
        self.0.iter().find(|(i, _)| *i == id).map(|(_, l)| l)
    }
}

struct Fixture {
    headless: Rc<HeadlessDevice>,
    device: SharedDevice,
    targets: FrameTargets,
    placeholders: Placeholders,
    primitives: Primitives,
    shaders: MaterialShaderCache,
    scene: SceneBatches,
    shadow: ShadowBatches,
    settings: RenderSettings,
    environment: Environment,
    stats: FrameStats,
    output_size: (u32, u32),
}

impl Fixture {
    fn new(width: u32, height: u32) -> Self {
        let headless = Rc::new(HeadlessDevice::new(64, 64));
        let device: SharedDevice = headless.clone();
        Self {
            targets: FrameTargets::new(&device, width, height).unwrap(),
            placeholders: Placeholders::new(&device).unwrap(),
            primitives: Primitives::new(&device).unwrap(),
            shaders: MaterialShaderCache::new(device.clone()),
            scene: SceneBatches::new(),
            shadow: ShadowBatches::new(),
            settings: RenderSettings::default(),
            environment: Environment::default(),
            stats: FrameStats::default(),
            output_size: (64, 64),
            headless,
            device,
        }
    }

    fn run(
        &mut self,
        lanes: &mut [&mut dyn RenderLane],
        lights: &Lights,
        skybox: Option<&Skybox>,
    ) -> Result<Option<TextureId>, LaneError> {
        let camera = Camera::default();
        let mut ctx = FrameContext {
            device: &self.device,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(1.0),
            view_position: camera.position,
            near: Camera::NEAR,
            far: Camera::FAR,
            environment: &self.environment,
            skybox,
            lights,
            scene_batches: &mut self.scene,
            shadow_batches: &mut self.shadow,
            shaders: &mut self.shaders,
            targets: &self.targets,
            placeholders: &self.placeholders,
            primitives: &self.primitives,
            settings: &self.settings,
            output: None,
            output_size: self.output_size,
            render_shadows: true,
            bloom_texture: None,
            stats: &mut self.stats,
        };
        for lane in lanes.iter_mut() {
            lane.execute(&mut ctx)?;
        }
        Ok(ctx.bloom_texture)
    }

    fn cube(&self) -> GpuMesh {
        GpuMesh::upload(self.device.clone(), &mesh::unit_cube(), false).unwrap()
    }
}

fn mesh_call(mesh: &GpuMesh, x: f32) -> SceneCall {
    SceneCall {
        source: DrawSource::Mesh {
            mesh: mesh.id(),
            triangles: mesh.triangle_count(),
        },
        material: Material::default(),
        transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        lights: LightSet::default(),
    }
}

fn textures_of(draw: &radiant_infra::DrawRecord) -> Vec<TextureId> {
    draw.textures.values().map(|(_, id)| *id).collect()
}

#[test]
fn test_lanes_report_their_kind() {
    assert_eq!(ShadowLane::new().lane_kind(), LaneKind::Shadow);
    assert_eq!(SceneLane::new().lane_kind(), LaneKind::Render);
    assert_eq!(BloomLane::new().lane_kind(), LaneKind::Bloom);
    assert_eq!(PostFxLane::new().lane_kind(), LaneKind::PostProcess);
    assert_eq!(PresentLane::new().lane_kind(), LaneKind::Present);
    assert_eq!(DebugLane::new().lane_kind(), LaneKind::Debug);
    assert_eq!(ShadowLane::new().strategy_name(), "ShadowPass");
}

#[test]
fn test_lane_executed_before_initialize_fails() {
    let mut fx = Fixture::new(32, 32);
    let mut bloom = BloomLane::new();
    let err = fx.run(&mut [&mut bloom], &Lights::default(), None).unwrap_err();
    assert!(matches!(err, LaneError::NotInitialized(_)));
}

#[test]
fn test_scene_pass_draws_every_call_and_empties_batches() {
    let mut fx = Fixture::new(32, 32);
    let cube = fx.cube();
    let config = MaterialConfig::default();
    fx.scene.push(config, mesh_call(&cube, 0.0));
    fx.scene.push(config, mesh_call(&cube, 1.0));

    let mut scene = SceneLane::new();
    scene.on_initialize(&fx.device).unwrap();
    fx.run(&mut [&mut scene], &Lights::default(), None).unwrap();

    let scene_fb = fx.targets.scene.id();
    assert_eq!(fx.headless.draws_into(Some(scene_fb)).len(), 2);
    assert!(fx.scene.is_empty());
    assert_eq!(fx.stats.draw_calls, 2);
    assert_eq!(fx.stats.scene_batches, 1);
    assert!(fx.shaders.contains(&config.shader_key()));
    assert_eq!(fx.headless.blend_mode(), BlendMode::default());
}

#[test]
fn test_scene_viewport_covers_the_internal_target() {
    for flags in [RenderFlags::empty(), RenderFlags::ASPECT_KEEP] {
        let mut fx = Fixture::new(40, 20);
        fx.settings.flags = flags;
        let cube = fx.cube();
        fx.scene.push(MaterialConfig::default(), mesh_call(&cube, 0.0));
        let mut scene = SceneLane::new();
        scene.on_initialize(&fx.device).unwrap();
        fx.run(&mut [&mut scene], &Lights::default(), None).unwrap();

        let draws = fx.headless.draws_into(Some(fx.targets.scene.id()));
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].viewport, Rect::new(0, 0, 40, 20));
    }
}

#[test]
fn test_scene_pass_clears_to_background_without_sky() {
    let mut fx = Fixture::new(32, 32);
    fx.environment.world.background = Color::new(10, 20, 30, 255);
    let mut scene = SceneLane::new();
    scene.on_initialize(&fx.device).unwrap();
    fx.run(&mut [&mut scene], &Lights::default(), None).unwrap();

    let scene_fb = Some(fx.targets.scene.id());
    let clear = fx.headless.commands().into_iter().find_map(|c| match c {
        Command::Clear {
            framebuffer,
            flags,
            color,
        } if framebuffer == scene_fb => Some((flags, color)),
        _ => None,
    });
    let (flags, color) = clear.expect("scene target cleared");
    assert!(flags.contains(ClearFlags::COLOR | ClearFlags::DEPTH));
    assert_eq!(color, Color::new(10, 20, 30, 255));
    assert!(!fx.stats.skybox_drawn);
}

#[test]
fn test_omni_shadow_renders_six_faces() {
    let mut fx = Fixture::new(32, 32);
    let cube = fx.cube();
    let mut light = Light::new(LightKind::Omni);
    light.enabled = true;
    light.enable_shadow(&fx.device, 64).unwrap();
    let shadow_fb = light.shadow_map().map(|m| m.target().id()).unwrap();
    let lights = Lights(vec![(LightId(1), light)]);

    fx.shadow.push(
        LightId(1),
        ShadowCall {
            source: DrawSource::Mesh {
                mesh: cube.id(),
                triangles: cube.triangle_count(),
            },
            transform: Mat4::IDENTITY,
        },
    );

    let mut shadow = ShadowLane::new();
    shadow.on_initialize(&fx.device).unwrap();
    fx.run(&mut [&mut shadow], &lights, None).unwrap();

    assert_eq!(fx.headless.draws_into(Some(shadow_fb)).len(), 6);
    assert_eq!(fx.stats.shadow_maps_rendered, 1);
    assert_eq!(fx.stats.shadow_draw_calls, 6);
    assert!(fx.shadow.is_empty());
}

#[test]
fn test_bloom_texture_reaches_postfx_only_when_enabled() {
    let mut fx = Fixture::new(32, 32);
    let mut bloom = BloomLane::new();
    let mut post = PostFxLane::new();
    bloom.on_initialize(&fx.device).unwrap();
    post.on_initialize(&fx.device).unwrap();

    fx.environment.bloom.mode = BloomMode::Additive;
    fx.environment.bloom.iterations = 4;
    fx.environment.bloom.intensity = 1.0;
    let blurred = fx
        .run(&mut [&mut bloom, &mut post], &Lights::default(), None)
        .unwrap()
        .expect("bloom output");
    let last_blur = fx.targets.blur[1].attachment(Attachment::COLOR_0).unwrap().id();
    assert_eq!(blurred, last_blur);
    assert_eq!(fx.stats.bloom_passes, 4);

    let post_fb = Some(fx.targets.post_fx.id());
    let draw = fx.headless.draws_into(post_fb).pop().unwrap();
    assert!(textures_of(&draw).contains(&last_blur));

    fx.headless.clear_commands();
    fx.environment.bloom.mode = BloomMode::Disabled;
    let none = fx.run(&mut [&mut bloom, &mut post], &Lights::default(), None).unwrap();
    assert!(none.is_none());
    let draw = fx.headless.draws_into(post_fb).pop().unwrap();
    assert!(!textures_of(&draw).contains(&last_blur));
}

#[test]
fn test_present_letterboxes_with_aspect_keep() {
    let mut fx = Fixture::new(64, 32);
    fx.settings.flags = RenderFlags::ASPECT_KEEP | RenderFlags::BLIT_LINEAR;
    let mut present = PresentLane::new();
    present.on_initialize(&fx.device).unwrap();
    fx.run(&mut [&mut present], &Lights::default(), None).unwrap();

    let expected = letterbox_rect((64, 32), (64, 64));
    let blits = fx.headless.blits();
    assert_eq!(blits.len(), 2);
    for blit in &blits {
        let Command::Blit {
            dst,
            dst_rect,
            mask,
            filter,
            ..
        } = blit
        else {
            panic!("not a blit");
        };
        assert_eq!(*dst, None);
        assert_eq!(*dst_rect, expected);
        if mask.contains(BlitMask::DEPTH) {
            assert_eq!(*filter, BlitFilter::Nearest);
        } else {
            assert_eq!(*filter, BlitFilter::Linear);
        }
    }
}

#[test]
fn test_debug_views_are_dropped_without_the_flag() {
    let mut fx = Fixture::new(32, 32);
    let mut debug = DebugLane::new();
    debug.on_initialize(&fx.device).unwrap();
    debug.queue_shadow_map(ShadowMapView {
        light: LightId(1),
        rect: Rect::new(0, 0, 16, 16),
        near: 0.05,
        far: 30.0,
    });
    fx.run(&mut [&mut debug], &Lights::default(), None).unwrap();
    assert_eq!(debug.pending(), 0);
    assert!(fx.headless.draws_into(None).is_empty());
}

#[test]
fn test_skybox_shared_data_lives_as_long_as_a_skybox() {
    let headless = Rc::new(HeadlessDevice::new(64, 64));
    let device: SharedDevice = headless.clone();
    let mut slot: Weak<SkyboxShared> = Weak::new();

    let shared = SkyboxShared::acquire(&mut slot, &device).unwrap();
    let again = SkyboxShared::acquire(&mut slot, &device).unwrap();
    assert!(Rc::ptr_eq(&shared, &again));
    drop(again);

    headless.clear_commands();
    let panorama = vec![0.5f32; 8 * 4 * 3];
    let sky = Skybox::from_panorama(shared, 8, 4, &panorama, 64).unwrap();
    // Six faces for the projection, six for irradiance, six per prefilter mip.
    assert_eq!(headless.draws().len(), 6 + 6 + 6 * PREFILTER_MIP_LEVELS as usize);
    assert_eq!(sky.irradiance().width(), MIN_IRRADIANCE_SIZE);
    assert_eq!(sky.prefilter().width(), PREFILTER_SIZE);
    assert_eq!(headless.cull_mode(), CullMode::Back);

    drop(sky);
    assert!(slot.upgrade().is_none());
}

#[test]
fn test_skybox_draw_restores_state() {
    let headless = Rc::new(HeadlessDevice::new(64, 64));
    let device: SharedDevice = headless.clone();
    let mut slot = Weak::new();
    let shared = SkyboxShared::acquire(&mut slot, &device).unwrap();
    let faces = vec![128u8; 6 * 4 * 4 * 4];
    let mut sky = Skybox::from_faces(shared, 4, TextureFormat::RGBA8, &faces).unwrap();
    sky.rotation = Vec3::new(0.0, 90.0, 0.0);

    headless.clear_commands();
    sky.draw(Mat4::IDENTITY, Mat4::IDENTITY);
    let draws = headless.draws();
    assert_eq!(draws.len(), 1);
    assert!(!draws[0].depth_mask);
    assert_eq!(draws[0].cull, CullMode::Disabled);
    assert!(textures_of(&draws[0]).contains(&sky.cubemap().id()));
    assert_eq!(headless.cull_mode(), CullMode::Back);
}
