use radiant_core::math::{Color, Vec3};
use radiant_core::renderer::*;
use radiant_infra::{Command, HeadlessDevice};

const VS: &str = "#version 330 core
layout(location = 0) in vec3 aPosition;
uniform mat4 uMatMVP;
void main() { gl_Position = uMatMVP * vec4(aPosition, 1.0); }
";

const FS: &str = "#version 330 core
#define NUM_LIGHTS 2
struct Light { vec3 color; float energy; };
uniform Light uLights[NUM_LIGHTS];
#ifdef MAP_EMISSION
uniform sampler2D uTexEmission;
#endif
uniform sampler2D uTexAlbedo;
out vec4 FragColor;
void main() { FragColor = vec4(1.0); }
";

fn triangle() -> MeshData {
    MeshData {
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        ..Default::default()
    }
}

#[test]
fn test_program_reflects_struct_arrays_and_skips_inactive_samplers() {
    let device = HeadlessDevice::new(64, 64);
    let program = device.create_program(VS, FS).unwrap();
    let names: Vec<String> = device
        .active_uniforms(program)
        .into_iter()
        .map(|u| u.name)
        .collect();

    assert!(names.contains(&"uMatMVP".to_string()));
    assert!(names.contains(&"uLights[1].energy".to_string()));
    assert!(names.contains(&"uTexAlbedo".to_string()));
    assert!(!names.iter().any(|n| n == "uTexEmission"));
    assert!(device.uniform_location(program, "uLights[0].color").is_some());
}

#[test]
fn test_uniform_writes_are_recorded_against_the_bound_program() {
    let device = HeadlessDevice::new(64, 64);
    let program = device.create_program(VS, FS).unwrap();
    let loc = device.uniform_location(program, "uLights[1].energy").unwrap();

    device.use_program(Some(program));
    device.set_uniform(loc, UniformValue::Float(3.5));

    assert_eq!(
        device.uniform_value(program, "uLights[1].energy"),
        Some(UniformValue::Float(3.5))
    );
}

#[test]
fn test_draws_capture_target_and_state() {
    let device = HeadlessDevice::new(64, 64);
    let fb = device.create_framebuffer().unwrap();
    let color = device.create_texture(TextureTarget::Texture2D).unwrap();
    device.upload_texture(
        color,
        &TextureUpload {
            target: ImageTarget::Texture2D,
            level: 0,
            width: 64,
            height: 64,
            depth: 1,
            format: TextureFormat::RGBA8,
            data: None,
        },
    );
    device.attach_texture(fb, Attachment::Color(0), color, ImageTarget::Texture2D, 0);
    assert_eq!(device.framebuffer_status(fb), FramebufferStatus::Complete);

    let mesh = device.upload_mesh(&triangle(), false).unwrap();
    device.bind_framebuffer(FramebufferTarget::Both, Some(fb));
    device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Color::BLACK);
    device.set_blend_mode(BlendMode::Additive);
    device.draw_mesh(mesh);

    let draws = device.draws_into(Some(fb));
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].blend, BlendMode::Additive);
    assert_eq!(draws[0].triangles, 1);
    assert!(device
        .commands()
        .iter()
        .any(|c| matches!(c, Command::Clear { framebuffer: Some(f), .. } if *f == fb)));
}

#[test]
fn test_destroying_an_attachment_breaks_completeness() {
    let device = HeadlessDevice::new(32, 32);
    let fb = device.create_framebuffer().unwrap();
    let rbo = device.create_renderbuffer().unwrap();
    device.attach_renderbuffer(fb, Attachment::Depth, rbo);
    assert_eq!(
        device.framebuffer_status(fb),
        FramebufferStatus::IncompleteAttachment
    );
    device.renderbuffer_storage(rbo, InternalFormat::Depth24, 32, 32);
    assert_eq!(device.framebuffer_status(fb), FramebufferStatus::Complete);
}
