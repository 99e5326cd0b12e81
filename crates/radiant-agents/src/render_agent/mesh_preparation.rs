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

//! Uploads CPU meshes to the device and keeps animated ones in sync.

use radiant_core::renderer::{MeshAttribute, MeshId, ResourceError};
use radiant_data::{Mesh, Model};
use radiant_lanes::gpu::SharedDevice;

/// A system responsible for giving CPU meshes their device counterpart.
///
/// Meshes without an id are uploaded once; skinned meshes are uploaded as
/// dynamic so that animation updates only rewrite positions and normals.
pub struct MeshPreparationSystem {
    device: SharedDevice,
}

impl MeshPreparationSystem {
    /// Creates a new `MeshPreparationSystem`.
    ///
    /// # Arguments
    ///
    /// * `device`: The device meshes are uploaded to.
    pub fn new(device: SharedDevice) -> Self {
        Self { device }
    }

    /// Uploads `mesh` unless it already has an id.
    ///
    /// # Returns
    ///
    /// The mesh id, or the error raised by the device for malformed data.
    pub fn prepare_mesh(&self, mesh: &mut Mesh) -> Result<MeshId, ResourceError> {
        if let Some(id) = mesh.id {
            return Ok(id);
        }
        let id = self.device.upload_mesh(&mesh.data, mesh.skin.is_some())?;
        log::debug!(
            "Uploaded mesh {:?} ({} triangles)",
            id,
            mesh.data.triangle_count()
        );
        mesh.id = Some(id);
        Ok(id)
    }

    /// Uploads every surface of `model` not yet on the device.
    ///
    /// On failure the meshes uploaded by this call are released again, so
    /// the model is left as it was.
    pub fn prepare_model(&self, model: &mut Model) -> Result<(), ResourceError> {
        let mut uploaded = Vec::new();
        for (index, surface) in model.surfaces.iter_mut().enumerate() {
            if surface.mesh.id.is_some() {
                continue;
            }
            match self.prepare_mesh(&mut surface.mesh) {
                Ok(_) => uploaded.push(index),
                Err(e) => {
                    for &i in &uploaded {
                        self.release_mesh(&mut model.surfaces[i].mesh);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Rewrites positions and normals of the listed surfaces after skinning.
    pub fn refresh_surfaces(&self, model: &Model, surfaces: &[usize]) {
        for mesh in surfaces.iter().filter_map(|&i| model.mesh(i)) {
            let Some(id) = mesh.id else {
                continue;
            };
            self.device
                .update_mesh_attribute(id, MeshAttribute::Position, &mesh.data);
            if !mesh.data.normals.is_empty() {
                self.device
                    .update_mesh_attribute(id, MeshAttribute::Normal, &mesh.data);
            }
        }
    }

    /// Destroys the device mesh of `mesh`, if any.
    pub fn release_mesh(&self, mesh: &mut Mesh) {
        if let Some(id) = mesh.id.take() {
            self.device.destroy_mesh(id);
        }
    }

    /// Destroys the device meshes of every surface of `model`.
    pub fn release_model(&self, model: &mut Model) {
        for surface in &mut model.surfaces {
            self.release_mesh(&mut surface.mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use radiant_core::renderer::{MaterialConfig, MeshData};
    use radiant_data::{mesh, Material, Surface};
    use radiant_infra::HeadlessDevice;

    use super::*;

    fn system() -> (Rc<HeadlessDevice>, MeshPreparationSystem) {
        let headless = Rc::new(HeadlessDevice::new(16, 16));
        (headless.clone(), MeshPreparationSystem::new(headless))
    }

    #[test]
    fn test_prepare_uploads_once() {
        let (headless, system) = system();
        let mut model = Model::from_mesh(Mesh::new(mesh::unit_cube()), MaterialConfig::default());
        system.prepare_model(&mut model).unwrap();
        let id = model.mesh(0).unwrap().id;
        assert!(id.is_some());
        system.prepare_model(&mut model).unwrap();
        assert_eq!(model.mesh(0).unwrap().id, id);
        assert_eq!(headless.live_meshes(), 1);

        system.release_model(&mut model);
        assert!(model.mesh(0).unwrap().id.is_none());
        assert_eq!(headless.live_meshes(), 0);
    }

    #[test]
    fn test_failed_upload_rolls_back() {
        let (headless, system) = system();
        let good = Surface::new(Mesh::new(mesh::unit_quad()), Material::default());
        let bad = Surface::new(Mesh::new(MeshData::default()), Material::default());
        let mut model = Model::from_surfaces(vec![good, bad], Vec::new(), Vec::new());

        assert!(system.prepare_model(&mut model).is_err());
        assert!(model.mesh(0).unwrap().id.is_none());
        assert_eq!(headless.live_meshes(), 0);
    }
}
