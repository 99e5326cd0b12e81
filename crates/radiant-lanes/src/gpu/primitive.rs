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

//! Uploaded meshes and the built-in primitives the passes draw.

use std::fmt;

use radiant_core::renderer::{MeshAttribute, MeshData, MeshId, ResourceError};
use radiant_data::mesh;

use super::SharedDevice;

/// A mesh living on the device.
pub struct GpuMesh {
    device: SharedDevice,
    id: MeshId,
    triangles: usize,
}

impl fmt::Debug for GpuMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuMesh")
            .field("id", &self.id)
            .field("triangles", &self.triangles)
            .finish()
    }
}

impl GpuMesh {
    /// Uploads `data`.
    pub fn upload(device: SharedDevice, data: &MeshData, dynamic: bool) -> Result<Self, ResourceError> {
        let id = device.upload_mesh(data, dynamic)?;
        Ok(Self {
            device,
            id,
            triangles: data.triangle_count(),
        })
    }

    /// The XY quad spanning `[-0.5, 0.5]`, used by sprites and particles.
    pub fn unit_quad(device: SharedDevice) -> Result<Self, ResourceError> {
        Self::upload(device, &mesh::unit_quad(), false)
    }

    /// The quad covering clip space, used by fullscreen passes.
    pub fn screen_quad(device: SharedDevice) -> Result<Self, ResourceError> {
        Self::upload(device, &mesh::screen_quad(), false)
    }

    /// The cube spanning `[-0.5, 0.5]`, used by the skybox passes.
    pub fn unit_cube(device: SharedDevice) -> Result<Self, ResourceError> {
        Self::upload(device, &mesh::unit_cube(), false)
    }

    /// The device handle.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Triangles drawn per call.
    pub fn triangle_count(&self) -> usize {
        self.triangles
    }

    /// Re-uploads one vertex stream.
    pub fn update(&self, attribute: MeshAttribute, data: &MeshData) {
        self.device.update_mesh_attribute(self.id, attribute, data);
    }

    /// Draws with the current program and state.
    pub fn draw(&self) {
        self.device.draw_mesh(self.id);
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.device.destroy_mesh(self.id);
    }
}

/// The built-in meshes every renderer uploads once.
#[derive(Debug)]
pub struct Primitives {
    /// Quad drawn for sprites and particles.
    pub unit_quad: GpuMesh,
    /// Fullscreen quad of the blur and post-processing passes.
    pub screen_quad: GpuMesh,
    /// Cube of the skybox pass.
    pub unit_cube: GpuMesh,
}

impl Primitives {
    /// Uploads the three primitives.
    pub fn new(device: &SharedDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            unit_quad: GpuMesh::unit_quad(device.clone())?,
            screen_quad: GpuMesh::screen_quad(device.clone())?,
            unit_cube: GpuMesh::unit_cube(device.clone())?,
        })
    }
}
