use std::rc::Rc;

use radiant_core::renderer::{RenderError, TextureFormat};
use radiant_sdk::prelude::*;

fn headless_engine() -> (Rc<HeadlessDevice>, Engine) {
    let headless = Rc::new(HeadlessDevice::new(48, 32));
    let device: SharedDevice = headless.clone();
    (headless, Engine::init(device).unwrap())
}

fn camera() -> Camera {
    Camera::perspective(Vec3::new(0.0, 2.0, -6.0), Vec3::ZERO, Vec3::Y, 60.0)
}

#[test]
fn test_non_positive_resolution_follows_the_screen() {
    let headless = Rc::new(HeadlessDevice::new(48, 32));
    let engine = Engine::init_ex(headless.clone(), 0, 100, RenderFlags::empty()).unwrap();
    assert_eq!(engine.internal_resolution(), (48, 32));

    let mut engine = Engine::init_ex(headless, 20, 10, RenderFlags::ASPECT_KEEP).unwrap();
    assert_eq!(engine.internal_resolution(), (20, 10));
    engine.update_internal_resolution(-1, -1).unwrap();
    assert_eq!(engine.internal_resolution(), (48, 32));
}

#[test]
fn test_config_is_applied_at_startup() {
    let config = EngineConfig::from_ron(
        "(internal_resolution: Some((16, 8)), depth_sort: FarToNear, check_gl_errors: false)",
    )
    .unwrap();
    let engine = Engine::with_config(Rc::new(HeadlessDevice::new(48, 32)), &config).unwrap();
    assert_eq!(engine.internal_resolution(), (16, 8));
    assert_eq!(engine.depth_sort(), DepthSortOrder::FarToNear);
    assert!(!engine.check_gl_errors());
    assert_eq!(engine.world_skybox(), None);
}

#[test]
fn test_material_configs_are_compiled_on_demand() {
    let (_, mut engine) = headless_engine();
    let default = engine.default_material_config();
    assert!(engine.is_material_config_valid(default));

    let config = engine
        .create_material_config(
            DiffuseMode::Toon,
            SpecularMode::Disabled,
            BlendMode::Alpha,
            CullMode::Disabled,
            MaterialFlags::empty(),
        )
        .unwrap();
    assert!(engine.is_material_config_valid(config));
    assert_eq!(engine.create_material(Some(config)).config, config);
    assert_eq!(engine.create_material(None).config, default);

    assert!(engine.unload_material_config(config));
    assert!(!engine.unload_material_config(config));
    assert!(!engine.is_material_config_valid(config));
}

#[test]
fn test_models_upload_and_release_their_meshes() {
    let (headless, mut engine) = headless_engine();
    let before = headless.live_meshes();

    let model = engine.load_model_from_mesh(mesh::sphere(1.0, 8, 8)).unwrap();
    assert_eq!(model.surface_count(), 1);
    assert!(model.surfaces[0].mesh.id.is_some());
    assert_eq!(headless.live_meshes(), before + 1);

    engine.begin(&camera()).unwrap();
    engine
        .submit_model(&model, Vec3::ZERO, Vec3::Y, 45.0, Vec3::splat(2.0))
        .unwrap();
    assert_eq!(engine.draw_call_count(), (1, 0));
    engine.end().unwrap();
    assert_eq!(engine.frame_stats().draw_calls, 1);

    engine.unload_model(model);
    assert_eq!(headless.live_meshes(), before);
}

#[test]
fn test_unknown_animation_is_an_error() {
    let (_, engine) = headless_engine();
    let mut model = engine.load_model_from_mesh(mesh::unit_cube()).unwrap();
    let err = engine
        .update_model_animation(&mut model, "walk", 3)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownAnimation(ref name) if name == "walk"));
}

#[test]
fn test_sprites_are_drawn_as_one_call() {
    let (_, mut engine) = headless_engine();
    let texture = Texture::new_2d(engine.device().clone(), None, 8, 8, TextureFormat::RGBA8).unwrap();
    let mut sprite = engine.create_sprite(&texture, 2, 2);
    assert_eq!(sprite.frame_count(), 4);
    sprite.update(1.0);

    engine.begin(&camera()).unwrap();
    engine
        .submit_sprite(&sprite, Vec3::ZERO, Vec3::Y, 0.0, Vec3::ONE)
        .unwrap();
    assert_eq!(engine.draw_call_count(), (1, 0));
    engine.end().unwrap();
}

#[test]
fn test_world_skybox_must_be_loaded() {
    let (_, mut engine) = headless_engine();
    assert!(matches!(
        engine.set_world_skybox(Some(SkyboxId(1))),
        Err(EngineError::UnknownSkybox(SkyboxId(1)))
    ));
    assert!(!engine.unload_skybox(SkyboxId(0)));
}

#[test]
fn test_device_errors_surface_as_render_errors() {
    let (headless, mut engine) = headless_engine();
    engine.set_check_gl_errors(true);
    engine.begin(&camera()).unwrap();
    headless.push_error(0x0505);
    match engine.end() {
        Err(EngineError::Render(RenderError::Device(e))) => assert_eq!(e.code, 0x0505),
        other => panic!("unexpected result {other:?}"),
    }

    engine.begin(&camera()).unwrap();
    engine.end().unwrap();
}

#[test]
fn test_frame_brackets_are_checked() {
    let (_, mut engine) = headless_engine();
    assert!(matches!(
        engine.end(),
        Err(EngineError::Render(RenderError::InvalidState(_)))
    ));
    engine.begin(&camera()).unwrap();
    assert!(engine.begin(&camera()).is_err());
    engine.end().unwrap();
}

#[test]
fn test_lights_are_counted_and_destroyed() {
    let (_, mut engine) = headless_engine();
    let spot = engine.create_light(LightKind::Spot, 0);
    let omni = engine.create_light(LightKind::Omni, 16);
    assert_eq!(engine.light_count(), 2);
    assert!(!engine.light_has_shadow(spot));
    assert!(engine.light_has_shadow(omni));

    assert!(!engine.draw_shadow_map(omni, Rect::new(0, 0, 8, 8), 0.1, 10.0));
    assert!(engine.destroy_light(spot));
    assert!(!engine.destroy_light(spot));
    assert_eq!(engine.light_count(), 1);
    assert!(engine.set_light_active(spot, true).is_err());
}

#[test]
fn test_logging_can_be_initialized_twice() {
    init_logging();
    init_logging();
    log::info!("still logging");
}

#[test]
fn test_unloaded_skyboxes_free_their_entry_and_keep_ids_unique() {
    let (_, mut engine) = headless_engine();
    let faces = radiant_io::CubemapFaces {
        face_size: 4,
        pixels: vec![128; 6 * 4 * 4 * 4],
    };

    let mut previous = None;
    for _ in 0..5 {
        let id = engine.create_skybox(&faces).unwrap();
        assert_eq!(engine.skybox_count(), 1);
        if let Some(old) = previous {
            assert!(id > old);
            assert!(engine.skybox(old).is_none());
        }
        assert!(engine.unload_skybox(id));
        assert_eq!(engine.skybox_count(), 0);
        previous = Some(id);
    }
}
