use std::rc::Rc;

use image::{Rgba, RgbaImage};
use radiant_core::renderer::UniformValue;
use radiant_infra::Command;
use radiant_sdk::prelude::*;

fn engine(width: i32, height: i32) -> (Rc<HeadlessDevice>, Engine) {
    let headless = Rc::new(HeadlessDevice::new(64, 64));
    let device: SharedDevice = headless.clone();
    let engine = Engine::init_ex(device, width, height, RenderFlags::empty()).unwrap();
    (headless, engine)
}

fn camera() -> Camera {
    Camera::perspective(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y, 60.0)
}

fn cube(engine: &Engine, shadow: ShadowCastMode) -> Model {
    let mut model = engine.load_model_from_mesh(mesh::unit_cube()).unwrap();
    model.shadow = shadow;
    model
}

fn submit_at(engine: &mut Engine, model: &Model, position: Vec3) {
    engine
        .submit_model(model, position, Vec3::Y, 0.0, Vec3::ONE)
        .unwrap();
}

#[test]
fn test_far_cube_is_culled() {
    let (_, mut engine) = engine(64, 64);
    let model = cube(&engine, ShadowCastMode::On);

    engine.begin(&camera()).unwrap();
    submit_at(&mut engine, &model, Vec3::splat(100.5));
    assert_eq!(engine.render_agent().scene_batches().batch_count(), 0);
    assert_eq!(engine.render_agent().shadow_batches().call_count(), 0);

    submit_at(&mut engine, &model, Vec3::ZERO);
    assert_eq!(engine.render_agent().scene_batches().batch_count(), 1);
    engine.end().unwrap();
}

#[test]
fn test_shadow_off_model_stays_out_of_shadow_batches() {
    let (_, mut engine) = engine(64, 64);
    let light = engine.create_light(LightKind::Directional, 64);
    engine
        .set_light_position_target(light, Vec3::new(0.0, 5.0, -5.0), Vec3::ZERO)
        .unwrap();
    engine.set_light_active(light, true).unwrap();
    let model = cube(&engine, ShadowCastMode::Off);

    engine.begin(&camera()).unwrap();
    submit_at(&mut engine, &model, Vec3::ZERO);
    let agent = engine.render_agent();
    assert_eq!(agent.shadow_batches().batch_count(), 0);
    assert_eq!(agent.scene_batches().batch_count(), 1);
    assert_eq!(engine.draw_call_count(), (1, 0));
    engine.end().unwrap();
}

#[test]
fn test_scene_calls_keep_eight_lights_and_every_shadow() {
    let (_, mut engine) = engine(64, 64);
    let lights: Vec<LightId> = (0..10)
        .map(|i| {
            let light = engine.create_light(LightKind::Omni, 32);
            engine
                .set_light_position(light, Vec3::new(i as f32 * 0.1, 1.0, 0.0))
                .unwrap();
            engine.set_light_active(light, true).unwrap();
            light
        })
        .collect();
    let model = cube(&engine, ShadowCastMode::On);

    engine.begin(&camera()).unwrap();
    submit_at(&mut engine, &model, Vec3::ZERO);

    let agent = engine.render_agent();
    let config = model.surfaces[0].material.config;
    let calls = agent.scene_batches().get_batch(&config).unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].lights.len(), 8);
    for light in &lights[..8] {
        assert!(calls[0].lights.contains(*light));
    }
    assert!(!calls[0].lights.contains(lights[8]));
    assert!(!calls[0].lights.contains(lights[9]));

    for light in &lights {
        assert_eq!(agent.shadow_batches().get_batch(light).map(<[_]>::len), Some(1));
    }
    engine.end().unwrap();
}

/// The last post-processing draw: the one made with the program that
/// received `uBloomMode`.
fn postfx_draw(headless: &HeadlessDevice) -> (usize, UniformValue) {
    let (program, mode) = headless
        .commands()
        .into_iter()
        .rev()
        .find_map(|c| match c {
            Command::SetUniform { program, name, value } if name == "uBloomMode" => Some((program, value)),
            _ => None,
        })
        .expect("post-processing uniforms");
    let draw = headless
        .draws()
        .into_iter()
        .rev()
        .find(|d| d.program == Some(program))
        .expect("post-processing draw");
    (draw.textures.len(), mode)
}

#[test]
fn test_bloom_toggle_changes_the_composite() {
    let (headless, mut engine) = engine(64, 64);
    let mut model = cube(&engine, ShadowCastMode::Off);
    assert!(model.set_map_emission(0, None, 10.0, Color::WHITE));

    engine.set_bloom_mode(BloomMode::Additive);
    engine.set_bloom_iterations(4);
    engine.set_bloom_intensity(1.0);
    engine.begin(&camera()).unwrap();
    submit_at(&mut engine, &model, Vec3::ZERO);
    engine.end().unwrap();

    assert_eq!(engine.frame_stats().bloom_passes, 4);
    let (with_bloom, mode) = postfx_draw(&headless);
    assert_eq!(mode, UniformValue::Int(BloomMode::Additive.shader_id()));

    headless.clear_commands();
    engine.set_bloom_mode(BloomMode::Disabled);
    engine.begin(&camera()).unwrap();
    submit_at(&mut engine, &model, Vec3::ZERO);
    engine.end().unwrap();

    assert_eq!(engine.frame_stats().bloom_passes, 0);
    let (without_bloom, mode) = postfx_draw(&headless);
    assert_eq!(mode, UniformValue::Int(0));
    assert_eq!(with_bloom, without_bloom + 1);
}

fn write_cross(dir: &tempfile::TempDir, name: &str, color: [u8; 4]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    RgbaImage::from_pixel(32, 24, Rgba(color)).save(&path).unwrap();
    path
}

fn render_frame(engine: &mut Engine) {
    engine.begin(&camera()).unwrap();
    engine.end().unwrap();
}

#[test]
fn test_skybox_swap_and_unload() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_cross(&dir, "first.png", [200, 40, 40, 255]);
    let second = write_cross(&dir, "second.png", [40, 40, 200, 255]);
    let (_, mut engine) = engine(64, 64);

    let a = engine.load_skybox(&first, CubemapLayout::AutoDetect).unwrap();
    assert_eq!(engine.skybox(a).map(|s| s.cubemap().width()), Some(8));
    engine.set_world_skybox(Some(a)).unwrap();
    render_frame(&mut engine);

    let b = engine.load_skybox(&second, CubemapLayout::CrossFourByThree).unwrap();
    assert_ne!(a, b);
    engine.set_world_skybox(Some(b)).unwrap();
    assert!(engine.unload_skybox(a));
    render_frame(&mut engine);
    assert_eq!(engine.world_skybox(), Some(b));

    assert!(engine.unload_skybox(b));
    assert_eq!(engine.world_skybox(), None);
    assert!(!engine.unload_skybox(b));
    render_frame(&mut engine);
    engine.close();
}

fn emit_and_run(engine: &Engine, seed: u64) -> Vec<[u32; 3]> {
    let mut system = engine.create_particle_system(128, seed).unwrap();
    system.emission_rate = 100.0;
    system.lifetime = 2.0;
    system.initial_velocity = Vec3::new(0.0, 10.0, 0.0);
    system.spread_angle = 45.0;
    system.auto_emission = false;
    for _ in 0..10 {
        assert!(system.emit());
    }
    for _ in 0..3 {
        system.update(0.1);
    }
    let positions = system
        .particles()
        .iter()
        .map(|p| [p.position.x.to_bits(), p.position.y.to_bits(), p.position.z.to_bits()])
        .collect();
    engine.unload_particle_system(system);
    positions
}

#[test]
fn test_particles_are_deterministic_per_seed() {
    let (_, engine) = engine(64, 64);
    let first = emit_and_run(&engine, 42);
    let second = emit_and_run(&engine, 42);
    assert_eq!(first.len(), 10);
    assert_eq!(first, second);
    assert_ne!(first, emit_and_run(&engine, 43));
}
