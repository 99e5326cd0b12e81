use std::path::Path;

use approx::assert_relative_eq;
use radiant_core::{math::Vec3, renderer::MaterialConfig};
use radiant_io::{
    load_cubemap, load_hdr_panorama, load_image, load_model, load_model_animations, AssetError,
    CubemapLayout,
};

fn push_f32(buf: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn write_triangle_gltf(dir: &Path) -> std::path::PathBuf {
    let mut bin = Vec::new();
    push_f32(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    std::fs::write(dir.join("tri.bin"), &bin).unwrap();

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": [0.0, 0.0, 5.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{ "uri": "tri.bin", "byteLength": 42 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;
    let path = dir.join("tri.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

fn write_skinned_gltf(dir: &Path) -> std::path::PathBuf {
    let mut bin = Vec::new();
    push_f32(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    for i in [0u16, 1, 2, 0] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0u8; 12]);
    push_f32(&mut bin, &[1.0, 0.0, 0.0, 0.0].repeat(3));
    push_f32(&mut bin, &[0.0, 1.0]);
    push_f32(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert_eq!(bin.len(), 136);
    std::fs::write(dir.join("skinned.bin"), &bin).unwrap();

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "mesh": 0, "skin": 0 },
            { "name": "root" }
        ],
        "skins": [{ "joints": [1] }],
        "meshes": [{ "primitives": [{
            "attributes": { "POSITION": 0, "JOINTS_0": 2, "WEIGHTS_0": 3 },
            "indices": 1
        }] }],
        "animations": [{
            "name": "slide",
            "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
            "samplers": [{ "input": 4, "output": 5, "interpolation": "LINEAR" }]
        }],
        "buffers": [{ "uri": "skinned.bin", "byteLength": 136 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 12 },
            { "buffer": 0, "byteOffset": 56, "byteLength": 48 },
            { "buffer": 0, "byteOffset": 104, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 112, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5121, "count": 3, "type": "VEC4" },
            { "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" },
            { "bufferView": 4, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    }"#;
    let path = dir.join("skinned.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_horizontal_cubemap_faces_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sky.png");
    let mut strip = image::RgbaImage::new(12, 2);
    for (x, _, pixel) in strip.enumerate_pixels_mut() {
        *pixel = image::Rgba([(x / 2) as u8 * 40, 0, 0, 255]);
    }
    strip.save(&path).unwrap();

    let faces = load_cubemap(&path, CubemapLayout::AutoDetect).unwrap();
    assert_eq!(faces.face_size, 2);
    assert_eq!(faces.pixels.len(), 6 * 2 * 2 * 4);
    for face in 0..6 {
        assert_eq!(faces.face(face).unwrap()[0], face as u8 * 40);
    }
    assert!(faces.face(6).is_none());
}

#[test]
fn test_square_image_is_not_a_cubemap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.png");
    image::RgbaImage::new(8, 8).save(&path).unwrap();
    let err = load_cubemap(&path, CubemapLayout::AutoDetect).unwrap_err();
    assert!(matches!(err, AssetError::UnsupportedLayout { width: 8, height: 8 }));
}

#[test]
fn test_missing_file_reports_its_path() {
    let err = load_image("does/not/exist.png").unwrap_err();
    match err {
        AssetError::Io { path, .. } => assert!(path.ends_with("exist.png")),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_ldr_panorama_loads_as_floats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pano.png");
    image::RgbImage::from_pixel(8, 4, image::Rgb([255, 255, 255])).save(&path).unwrap();
    let pano = load_hdr_panorama(&path).unwrap();
    assert_eq!((pano.width, pano.height), (8, 4));
    assert_relative_eq!(pano.max_value(), 1.0);
}

#[test]
fn test_obj_file_loads_through_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tri.obj");
    std::fs::write(&path, "v 0 0 0\nv 2 0 0\nv 0 2 0\nf 1 2 3\n").unwrap();
    let model = load_model(&path, MaterialConfig::default()).unwrap();
    assert_eq!(model.surface_count(), 1);
    assert_eq!(model.aabb.max, Vec3::new(2.0, 2.0, 0.0));
    assert!(load_model_animations(&path).unwrap().is_empty());
}

#[test]
fn test_gltf_static_mesh_is_baked_with_its_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_gltf(dir.path());
    let model = load_model(&path, MaterialConfig::default()).unwrap();
    let mesh = model.mesh(0).unwrap();
    assert_eq!(mesh.data.indices, vec![0, 1, 2]);
    for p in &mesh.data.positions {
        assert_relative_eq!(p.z, 5.0);
    }
    assert!(mesh.skin.is_none());
    assert_eq!(model.animation_count(), 0);
}

#[test]
fn test_gltf_skin_and_animation_drive_vertices() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_skinned_gltf(dir.path());
    let mut model = load_model(&path, MaterialConfig::default()).unwrap();
    assert_eq!(model.bones.len(), 1);
    assert_eq!(model.bones[0].name, "root");
    assert!(model.mesh(0).unwrap().skin.is_some());
    assert_eq!(model.animation_names().collect::<Vec<_>>(), vec!["slide"]);
    assert_eq!(model.animation("slide").unwrap().frame_count(), 61);

    let changed = model.update_animation("slide", 60).unwrap();
    assert_eq!(changed, vec![0]);
    let moved = &model.mesh(0).unwrap().data.positions;
    assert_relative_eq!(moved[0].x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(moved[1].x, 2.0, epsilon = 1e-5);

    let clips = load_model_animations(&path).unwrap();
    assert_eq!(clips.len(), 1);
    let halfway = clips[0].frame_poses[30][0].translation;
    assert_relative_eq!(halfway.x, 0.5, epsilon = 1e-5);
}
