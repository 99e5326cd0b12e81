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

//! Wavefront OBJ import through `tobj`.

use std::path::Path;

use ahash::AHashMap;
use radiant_core::{
    math::{Color, Vec2, Vec3},
    renderer::{MaterialConfig, MeshData},
};
use radiant_data::{Material, Mesh, Model, Surface};

use crate::AssetError;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Loads an OBJ file and its material library as a model.
///
/// Every object of the file becomes one surface. Diffuse colors and opacity
/// of the referenced `.mtl` materials become albedo tints; a missing material
/// library only logs a warning.
pub fn load_obj(path: impl AsRef<Path>, config: MaterialConfig) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(path, &load_options())?;
    let materials = materials.unwrap_or_else(|e| {
        log::warn!("Ignoring material library of '{}': {}", path.display(), e);
        Vec::new()
    });
    build_model(&models, &materials, config).ok_or_else(|| AssetError::Empty(path.to_path_buf()))
}

/// Parses OBJ text held in memory. Material libraries are not resolved.
pub fn decode_obj(bytes: &[u8], config: MaterialConfig) -> Result<Model, AssetError> {
    let (models, _) = tobj::load_obj_buf(&mut std::io::Cursor::new(bytes), &load_options(), |_| {
        Ok((Vec::new(), AHashMap::new()))
    })?;
    build_model(&models, &[], config).ok_or_else(|| AssetError::Empty("<memory>".into()))
}

fn build_model(models: &[tobj::Model], materials: &[tobj::Material], config: MaterialConfig) -> Option<Model> {
    let surfaces: Vec<Surface> = models
        .iter()
        .filter(|m| !m.mesh.positions.is_empty())
        .map(|m| {
            let material = m
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map_or_else(|| Material::new(config), |mtl| material_from_mtl(mtl, config));
            Surface::new(Mesh::new(mesh_data(&m.mesh)), material)
        })
        .collect();

    if surfaces.is_empty() {
        return None;
    }
    log::debug!("Imported OBJ with {} surfaces", surfaces.len());
    Some(Model::from_surfaces(surfaces, Vec::new(), Vec::new()))
}

fn mesh_data(mesh: &tobj::Mesh) -> MeshData {
    let positions = mesh
        .positions
        .chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect();
    let normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();
    let texcoords = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| Vec2::new(t[0], t[1]))
        .collect();
    let colors = mesh
        .vertex_color
        .chunks_exact(3)
        .map(|c| Color::from_vec4(Vec3::new(c[0], c[1], c[2]).extend(1.0)))
        .collect();

    MeshData {
        positions,
        texcoords,
        normals,
        colors,
        tangents: Vec::new(),
        indices: mesh.indices.clone(),
    }
}

fn material_from_mtl(mtl: &tobj::Material, config: MaterialConfig) -> Material {
    let mut material = Material::new(config);
    if let Some([r, g, b]) = mtl.diffuse {
        let alpha = mtl.dissolve.unwrap_or(1.0);
        material.albedo.color = Color::from_vec4(Vec3::new(r, g, b).extend(alpha));
    }
    material
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_decode_triangulates_faces() {
        let model = decode_obj(QUAD.as_bytes(), MaterialConfig::default()).unwrap();
        assert_eq!(model.surface_count(), 1);
        let mesh = model.mesh(0).unwrap();
        assert_eq!(mesh.data.positions.len(), 4);
        assert_eq!(mesh.data.texcoords.len(), 4);
        assert_eq!(mesh.data.normals.len(), 4);
        assert_eq!(mesh.data.indices.len(), 6);
        assert_eq!(model.aabb.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_file_without_vertices_is_empty() {
        let err = decode_obj(b"# nothing here\n", MaterialConfig::default()).unwrap_err();
        assert!(matches!(err, AssetError::Empty(_)));
    }
}
