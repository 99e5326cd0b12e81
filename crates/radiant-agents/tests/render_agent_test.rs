use std::rc::Rc;

use radiant_agents::RenderAgent;
use radiant_core::math::Vec3;
use radiant_core::renderer::{
    DepthSortOrder, Layers, LightKind, MaterialConfig, Rect, RenderError, RenderFlags,
    RenderSettings, ShadowCastMode,
};
use radiant_data::{mesh, Camera, Material, Mesh, Model, ParticleSystem, Surface};
use radiant_infra::HeadlessDevice;
use radiant_lanes::gpu::SharedDevice;

fn agent_with(settings: RenderSettings) -> (Rc<HeadlessDevice>, RenderAgent) {
    let headless = Rc::new(HeadlessDevice::new(64, 48));
    let device: SharedDevice = headless.clone();
    let agent = RenderAgent::new(device, settings, MaterialConfig::default()).unwrap();
    (headless, agent)
}

fn agent() -> (Rc<HeadlessDevice>, RenderAgent) {
    agent_with(RenderSettings::default())
}

fn camera() -> Camera {
    Camera::perspective(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y, 60.0)
}

fn cube(agent: &RenderAgent, shadow: ShadowCastMode) -> Model {
    let mut model = Model::from_mesh(Mesh::new(mesh::unit_cube()), MaterialConfig::default());
    model.shadow = shadow;
    agent.meshes().prepare_model(&mut model).unwrap();
    model
}

fn submit_at(agent: &mut RenderAgent, model: &Model, position: Vec3) {
    agent
        .submit_model(model, position, Vec3::Y, 0.0, Vec3::ONE)
        .unwrap();
}

#[test]
fn test_internal_resolution_follows_the_screen() {
    let (headless, mut agent) = agent();
    assert_eq!(agent.internal_resolution(), (64, 48));

    agent.update_internal_resolution(32, 16).unwrap();
    assert_eq!(agent.internal_resolution(), (32, 16));

    headless.resize(80, 60);
    agent.update_internal_resolution(0, -4).unwrap();
    assert_eq!(agent.internal_resolution(), (80, 60));
}

#[test]
fn test_frame_brackets_are_enforced() {
    let (_, mut agent) = agent();
    let model = cube(&agent, ShadowCastMode::Off);

    let err = agent
        .submit_model(&model, Vec3::ZERO, Vec3::Y, 0.0, Vec3::ONE)
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidState(_)));
    assert!(matches!(agent.end(None), Err(RenderError::InvalidState(_))));

    agent.begin(&camera()).unwrap();
    assert!(agent.in_frame());
    assert!(matches!(agent.begin(&camera()), Err(RenderError::InvalidState(_))));
    agent.end(None).unwrap();
    assert!(!agent.in_frame());
}

#[test]
fn test_end_renders_and_empties_batches() {
    let (headless, mut agent) = agent();
    let model = cube(&agent, ShadowCastMode::On);
    let light = agent.lights_mut().create(LightKind::Omni, 64);
    agent.lights_mut().set_active(light, true);
    agent
        .lights_mut()
        .get_mut(light)
        .unwrap()
        .set_position(Vec3::new(0.0, 3.0, 0.0));

    agent.begin(&camera()).unwrap();
    submit_at(&mut agent, &model, Vec3::ZERO);
    submit_at(&mut agent, &model, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(agent.draw_call_count(), (2, 2));
    headless.clear_commands();
    agent.end(None).unwrap();

    assert_eq!(agent.draw_call_count(), (0, 0));
    assert!(agent.scene_batches().is_empty());
    assert!(agent.shadow_batches().is_empty());
    let stats = agent.stats();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.shadow_draw_calls, 12);
    assert_eq!(stats.shadow_maps_rendered, 1);
    assert_eq!(stats.scene_batches, 1);
    assert_eq!(agent.frame_count(), 1);
    assert!(!headless.blits().is_empty());
}

#[test]
fn test_culled_model_pushes_nothing() {
    let (_, mut agent) = agent();
    let model = cube(&agent, ShadowCastMode::On);
    agent.begin(&camera()).unwrap();
    submit_at(&mut agent, &model, Vec3::splat(100.5));
    assert_eq!(agent.draw_call_count(), (0, 0));
    assert_eq!(agent.scene_batches().batch_count(), 0);
    submit_at(&mut agent, &model, Vec3::ZERO);
    assert_eq!(agent.scene_batches().batch_count(), 1);
    agent.end(None).unwrap();
}

#[test]
fn test_inactive_layers_are_not_drawn() {
    let (_, mut agent) = agent();
    let mut model = cube(&agent, ShadowCastMode::Off);
    model.layers = Layers::LAYER_2;

    agent.begin(&camera()).unwrap();
    submit_at(&mut agent, &model, Vec3::ZERO);
    assert_eq!(agent.draw_call_count(), (0, 0));
    agent.enable_layers(Layers::LAYER_2);
    submit_at(&mut agent, &model, Vec3::ZERO);
    assert_eq!(agent.draw_call_count(), (1, 0));
    agent.end(None).unwrap();

    agent.disable_layers(Layers::LAYER_2);
    assert_eq!(agent.active_layers(), Layers::LAYER_1);
}

#[test]
fn test_shadow_interval_skips_shadow_passes() {
    let (_, mut agent) = agent();
    agent.set_shadow_update_interval(1.0);
    let model = cube(&agent, ShadowCastMode::On);
    let light = agent.lights_mut().create(LightKind::Omni, 32);
    agent.lights_mut().set_active(light, true);

    let frame = |agent: &mut RenderAgent| {
        agent.begin(&camera()).unwrap();
        submit_at(agent, &model, Vec3::ZERO);
        agent.end(None).unwrap();
        agent.stats().shadow_maps_rendered
    };

    assert_eq!(frame(&mut agent), 0);
    agent.update_shadow_timer(0.5);
    assert_eq!(frame(&mut agent), 0);
    agent.update_shadow_timer(0.6);
    assert_eq!(frame(&mut agent), 1);
    assert_eq!(frame(&mut agent), 0);
    assert!(agent.shadow_batches().is_empty());
}

#[test]
fn test_depth_sort_is_configurable() {
    let (_, mut agent) = agent();
    assert_eq!(agent.depth_sort(), DepthSortOrder::Disabled);
    agent.set_depth_sort(DepthSortOrder::FarToNear);
    assert_eq!(agent.depth_sort(), DepthSortOrder::FarToNear);
}

#[test]
fn test_driver_errors_are_reported_per_pass() {
    let (headless, mut agent) = agent();
    agent.set_check_gl_errors(true);
    agent.begin(&camera()).unwrap();
    headless.push_error(0x0502);
    match agent.end(None) {
        Err(RenderError::Device(e)) => {
            assert_eq!(e.code, 0x0502);
            assert!(e.context.contains("ShadowPass"));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(agent.scene_batches().is_empty());

    agent.set_check_gl_errors(false);
    agent.begin(&camera()).unwrap();
    headless.push_error(0x0502);
    agent.end(None).unwrap();
}

#[test]
fn test_shadow_map_views_need_the_debug_flag() {
    let (_, mut agent) = agent();
    let light = agent.lights_mut().create(LightKind::Spot, 64);
    assert!(!agent.draw_shadow_map(light, Rect::new(0, 0, 16, 16), 0.05, 10.0));

    let settings = RenderSettings {
        flags: RenderFlags::DEBUG_SHADOW_MAP,
        ..RenderSettings::default()
    };
    let (headless, mut agent) = agent_with(settings);
    let light = agent.lights_mut().create(LightKind::Spot, 64);
    let unshadowed = agent.lights_mut().create(LightKind::Spot, 0);
    assert!(!agent.draw_shadow_map(unshadowed, Rect::new(0, 0, 16, 16), 0.05, 10.0));
    assert!(agent.draw_shadow_map(light, Rect::new(0, 0, 16, 16), 0.05, 10.0));

    agent.begin(&camera()).unwrap();
    agent.end(None).unwrap();
    assert_eq!(headless.draws_into(None).len(), 1);
}

#[test]
fn test_material_configs_register_and_unload() {
    let (_, mut agent) = agent();
    assert!(agent.is_material_config_valid(agent.default_material_config()));
    let mut config = MaterialConfig::default();
    config.flags.toggle(radiant_core::renderer::MaterialFlags::VERTEX_COLOR);
    assert!(!agent.is_material_config_valid(config));
    agent.register_material_config(config).unwrap();
    assert!(agent.is_material_config_valid(config));
    assert!(agent.unload_material_config(config));
    assert!(!agent.is_material_config_valid(config));
}

#[test]
fn test_particles_draw_one_instance_per_particle() {
    let (_, mut agent) = agent();
    let surface = Surface::new(Mesh::new(mesh::unit_quad()), Material::default());
    let mut system = ParticleSystem::with_seed(surface, 16, 7);
    system.initial_velocity = Vec3::new(0.0, 1.0, 0.0);
    agent.meshes().prepare_mesh(&mut system.surface.mesh).unwrap();
    system.calculate_bounding_box();
    for _ in 0..5 {
        assert!(system.emit());
    }

    agent.begin(&camera()).unwrap();
    agent.submit_particle_system(&system).unwrap();
    assert_eq!(agent.draw_call_count(), (1, 0));
    agent.end(None).unwrap();
    assert_eq!(agent.stats().draw_calls, 5);
}

#[test]
fn test_call_placement_applies_before_the_model_transform() {
    let (_, mut agent) = agent();
    let mut model = cube(&agent, ShadowCastMode::Off);
    model.transform.position = Vec3::new(5.0, 0.0, 0.0);

    agent.begin(&camera()).unwrap();
    agent
        .submit_model(&model, Vec3::ZERO, Vec3::Y, 90.0, Vec3::ONE)
        .unwrap();
    let config = model.surfaces[0].material.config;
    let calls = agent.scene_batches().get_batch(&config).unwrap();
    let position = calls[0].transform.translation();
    assert!((position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    agent.end(None).unwrap();
}
