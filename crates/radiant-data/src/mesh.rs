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

//! Meshes: CPU vertex streams, their GPU handle and procedural primitives.

use radiant_core::math::{Aabb, Vec2, Vec3, Vec4, PI, TAU};
use radiant_core::renderer::{MeshData, MeshId};

use crate::animation::Skin;

/// A mesh as held by models, sprites and particle systems.
///
/// `data` is kept on the CPU so animation and tangent generation can rewrite
/// it; `id` is the uploaded copy, set once the renderer has uploaded the mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex streams.
    pub data: MeshData,
    /// The uploaded mesh, `None` until uploaded.
    pub id: Option<MeshId>,
    /// Bone influences for CPU skinning, if the mesh is animated.
    pub skin: Option<Skin>,
}

impl Mesh {
    /// Wraps vertex data that has not been uploaded yet.
    pub fn new(data: MeshData) -> Self {
        Self {
            data,
            id: None,
            skin: None,
        }
    }

    /// Bounding box of the vertex positions.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.data.bounding_box()
    }

    /// Number of triangles drawn.
    pub fn triangle_count(&self) -> usize {
        self.data.triangle_count()
    }

    /// Computes per-vertex tangents from positions, normals and texture coordinates.
    ///
    /// Tangents are accumulated per triangle, orthogonalized against the
    /// normal and store the bitangent handedness in `w`. Meshes without
    /// normals or texture coordinates are left untouched.
    pub fn generate_tangents(&mut self) {
        generate_tangents(&mut self.data);
    }
}

/// See [`Mesh::generate_tangents`].
pub fn generate_tangents(mesh: &mut MeshData) {
    let n = mesh.positions.len();
    if n == 0 || mesh.normals.len() != n || mesh.texcoords.len() != n {
        log::warn!("Tangent generation skipped: mesh lacks normals or texcoords");
        return;
    }

    let mut tan = vec![Vec3::ZERO; n];
    let mut bitan = vec![Vec3::ZERO; n];

    let triangles: Vec<[usize; 3]> = if mesh.indices.is_empty() {
        (0..n / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect()
    } else {
        mesh.indices
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
            .collect()
    };

    for [i0, i1, i2] in triangles {
        let (p0, p1, p2) = (mesh.positions[i0], mesh.positions[i1], mesh.positions[i2]);
        let (t0, t1, t2) = (mesh.texcoords[i0], mesh.texcoords[i1], mesh.texcoords[i2]);

        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let du1 = t1.x - t0.x;
        let dv1 = t1.y - t0.y;
        let du2 = t2.x - t0.x;
        let dv2 = t2.y - t0.y;

        let det = du1 * dv2 - du2 * dv1;
        let r = if det.abs() < 1e-8 { 0.0 } else { 1.0 / det };
        let sdir = (e1 * dv2 - e2 * dv1) * r;
        let tdir = (e2 * du1 - e1 * du2) * r;

        for i in [i0, i1, i2] {
            tan[i] += sdir;
            bitan[i] += tdir;
        }
    }

    mesh.tangents = (0..n)
        .map(|i| {
            let normal = mesh.normals[i];
            let t = tan[i];
            let ortho = (t - normal * normal.dot(t)).normalize();
            let ortho = if ortho.length_squared() < 0.5 {
                // Degenerate UVs: pick any axis orthogonal to the normal.
                let aux = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
                normal.cross(aux).normalize()
            } else {
                ortho
            };
            let w = if normal.cross(t).dot(bitan[i]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            ortho.extend(w)
        })
        .collect();
}

/// A unit quad in the XY plane centered on the origin, facing +Z.
pub fn unit_quad() -> MeshData {
    MeshData {
        positions: vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        texcoords: vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ],
        normals: vec![Vec3::Z; 4],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4],
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}

/// A fullscreen quad in normalized device coordinates.
pub fn screen_quad() -> MeshData {
    MeshData {
        positions: vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ],
        texcoords: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}

/// The eight-vertex unit cube `[-0.5, 0.5]^3`, positions only.
///
/// Used for skybox rendering and cubemap generation, which sample by
/// direction and draw without culling.
pub fn unit_cube() -> MeshData {
    let h = 0.5;
    MeshData {
        positions: vec![
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ],
        indices: vec![
            0, 1, 2, 2, 3, 0, // front
            1, 5, 6, 6, 2, 1, // right
            5, 4, 7, 7, 6, 5, // back
            4, 0, 3, 3, 7, 4, // left
            3, 2, 6, 6, 7, 3, // top
            4, 5, 1, 1, 0, 4, // bottom
        ],
        ..Default::default()
    }
}

/// A flat plane on XZ, facing +Y, subdivided into `res_x * res_z` cells.
pub fn plane(width: f32, length: f32, res_x: u32, res_z: u32) -> MeshData {
    let res_x = res_x.max(1);
    let res_z = res_z.max(1);
    let mut mesh = MeshData::default();

    for z in 0..=res_z {
        for x in 0..=res_x {
            let u = x as f32 / res_x as f32;
            let v = z as f32 / res_z as f32;
            mesh.positions
                .push(Vec3::new((u - 0.5) * width, 0.0, (v - 0.5) * length));
            mesh.texcoords.push(Vec2::new(u, v));
            mesh.normals.push(Vec3::Y);
        }
    }
    let row = res_x + 1;
    for z in 0..res_z {
        for x in 0..res_x {
            let i = z * row + x;
            mesh.indices
                .extend_from_slice(&[i, i + row, i + 1, i + 1, i + row, i + row + 1]);
        }
    }
    generate_tangents(&mut mesh);
    mesh
}

/// A UV sphere.
pub fn sphere(radius: f32, rings: u32, slices: u32) -> MeshData {
    let rings = rings.max(2);
    let slices = slices.max(3);
    let mut mesh = MeshData::default();

    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let theta = v * PI;
        for s in 0..=slices {
            let u = s as f32 / slices as f32;
            let phi = u * TAU;
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            mesh.positions.push(n * radius);
            mesh.normals.push(n);
            mesh.texcoords.push(Vec2::new(u, v));
        }
    }
    let row = slices + 1;
    for r in 0..rings {
        for s in 0..slices {
            let i = r * row + s;
            mesh.indices
                .extend_from_slice(&[i, i + 1, i + row, i + 1, i + row + 1, i + row]);
        }
    }
    generate_tangents(&mut mesh);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_primitives_are_valid() {
        for mesh in [unit_quad(), screen_quad(), unit_cube(), plane(2.0, 2.0, 3, 2), sphere(1.0, 8, 12)] {
            assert!(mesh.validate().is_ok());
        }
        assert_eq!(unit_cube().positions.len(), 8);
        assert_eq!(unit_cube().indices.len(), 36);
    }

    #[test]
    fn test_plane_tangents_follow_u() {
        let mesh = plane(1.0, 1.0, 1, 1);
        for (t, n) in mesh.tangents.iter().zip(&mesh.normals) {
            assert_abs_diff_eq!(t.truncate().dot(*n), 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(t.x, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_tangents_skipped_without_uvs() {
        let mut mesh = unit_cube();
        generate_tangents(&mut mesh);
        assert!(mesh.tangents.is_empty());
    }

    #[test]
    fn test_sphere_bounds() {
        let aabb = sphere(2.0, 16, 16).bounding_box().unwrap();
        assert_abs_diff_eq!(aabb.max.y, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(aabb.min.y, -2.0, epsilon = 1e-5);
    }
}
