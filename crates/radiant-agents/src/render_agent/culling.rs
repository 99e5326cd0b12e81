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

//! Visibility and light selection of a single submitted drawable.

use radiant_core::{
    math::{billboard_rotation, Aabb, BillboardMode, Frustum, Mat4, Vec3},
    renderer::{Layers, LightKind, ShadowCastMode},
};
use radiant_data::Camera;
use radiant_lanes::render_lane::{Light, LightId, LightSet};

use crate::LightStore;

/// The camera state captured by `begin` for the frame being collected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    /// View matrix.
    pub view: Mat4,
    /// Projection matrix at the internal aspect ratio.
    pub projection: Mat4,
    /// Frustum of `projection * view`.
    pub frustum: Frustum,
    /// Eye position.
    pub position: Vec3,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
    /// Model-view left on the host matrix stack, applied after every call transform.
    pub ambient: Mat4,
}

impl FrameView {
    /// Captures `camera` for a target of the given aspect ratio.
    pub fn new(camera: &Camera, aspect: f32, ambient: Mat4) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect);
        Self {
            view,
            projection,
            frustum: Frustum::from_view_projection(&(projection * view)),
            position: camera.position,
            near: Camera::NEAR,
            far: Camera::FAR,
            ambient,
        }
    }

    /// Places a drawable: the call transform applies first, then the
    /// drawable's global transform, then the ambient transform.
    ///
    /// Billboarded drawables are then turned towards the eye around their
    /// world position.
    pub fn world_matrix(&self, call: Mat4, local: Mat4, billboard: BillboardMode) -> Mat4 {
        let world = self.ambient * local * call;
        if billboard == BillboardMode::Disabled {
            return world;
        }
        let origin = world.translation();
        let facing = billboard_rotation(billboard, origin, self.position);
        Mat4::from_translation(origin) * facing * Mat4::from_translation(-origin) * world
    }
}

/// Builds the matrix of a `submit_*` call: translate, rotate around `axis`, then scale.
pub fn call_matrix(position: Vec3, axis: Vec3, angle_deg: f32, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_axis_angle(axis, angle_deg.to_radians())
        * Mat4::from_scale(scale)
}

/// What culling needs to know about a drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    /// World-space bounds.
    pub bounds: Aabb,
    /// World position used for light range tests.
    pub position: Vec3,
    /// Shadow policy.
    pub shadow: ShadowCastMode,
    /// Layers the drawable lives on.
    pub layers: Layers,
}

/// Culling parameters of the frame.
#[derive(Debug, Clone, Copy)]
pub struct CullSettings<'a> {
    /// Camera frustum.
    pub frustum: &'a Frustum,
    /// Test drawables against the camera frustum.
    pub frustum_culling: bool,
    /// Layers rendered this frame.
    pub active_layers: Layers,
}

/// Where a drawable goes this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// The drawable is drawn by the scene pass.
    pub draw_scene: bool,
    /// Lights shading the scene draws, at most eight.
    pub lights: LightSet,
    /// Shadowed lights whose shadow map receives the drawable.
    pub shadow_lights: Vec<LightId>,
}

impl Classification {
    /// True when the drawable produces no call at all.
    pub fn is_culled(&self) -> bool {
        !self.draw_scene && self.shadow_lights.is_empty()
    }
}

/// True when `light` may affect `drawable`: it shares a layer with it and
/// reaches its bounds.
///
/// Point-like lights are rejected beyond their range first. Directional and
/// spot lights then test the bounds against their frustum; omni lights stop
/// at the range test.
pub fn light_reaches(light: &Light, drawable: &Drawable, active: Layers) -> bool {
    if !light.layers.intersects(active) || !light.layers.intersects(drawable.layers) {
        return false;
    }
    let kind = light.kind();
    if kind != LightKind::Directional {
        let range = light.max_distance;
        if drawable.position.distance_squared(light.position()) > range * range {
            return false;
        }
    }
    kind == LightKind::Omni || light.frustum().intersects_aabb(&drawable.bounds)
}

/// Decides whether `drawable` is drawn and which lights it uses.
///
/// Drawables outside the active layers are dropped entirely. Scene
/// visibility is decided by the camera frustum unless culling is off;
/// shadow-only drawables never reach the scene. Every enabled light that
/// reaches the drawable adds it to its shadow batch when both cast shadows,
/// and the first eight become the lights of the scene draws.
pub fn classify(drawable: &Drawable, lights: &LightStore, settings: &CullSettings<'_>) -> Classification {
    let mut result = Classification::default();
    if !drawable.layers.intersects(settings.active_layers) {
        return result;
    }

    result.draw_scene = drawable.shadow != ShadowCastMode::ShadowOnly;
    if result.draw_scene && settings.frustum_culling {
        result.draw_scene = settings.frustum.intersects_aabb(&drawable.bounds);
    }

    for (id, light) in lights.iter().filter(|(_, l)| l.enabled) {
        if !light_reaches(light, drawable, settings.active_layers) {
            continue;
        }
        if drawable.shadow.casts() && light.has_shadow() {
            result.shadow_lights.push(id);
        }
        if result.draw_scene && !result.lights.is_full() {
            result.lights.push(id);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_abs_diff_eq;
    use radiant_infra::HeadlessDevice;
    use radiant_lanes::gpu::SharedDevice;

    use super::*;

    fn camera_view() -> FrameView {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y, 60.0);
        FrameView::new(&camera, 1.0, Mat4::IDENTITY)
    }

    fn store() -> LightStore {
        let device: SharedDevice = Rc::new(HeadlessDevice::new(64, 64));
        LightStore::new(device)
    }

    fn drawable(min: f32, max: f32, shadow: ShadowCastMode) -> Drawable {
        let bounds = Aabb::from_min_max(Vec3::splat(min), Vec3::splat(max));
        Drawable {
            bounds,
            position: bounds.center(),
            shadow,
            layers: Layers::LAYER_1,
        }
    }

    fn assert_near(actual: Vec3, expected: Vec3) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = 1e-5);
        assert_abs_diff_eq!(actual.z, expected.z, epsilon = 1e-5);
    }

    fn omni_at(lights: &mut LightStore, position: Vec3, shadow: u32) -> LightId {
        let id = lights.create(LightKind::Omni, shadow);
        let light = lights.get_mut(id).unwrap();
        light.set_position(position);
        light.enabled = true;
        id
    }

    #[test]
    fn test_offscreen_drawable_is_culled() {
        let view = camera_view();
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: true,
            active_layers: Layers::LAYER_1,
        };
        let lights = store();
        let far = classify(&drawable(100.0, 101.0, ShadowCastMode::On), &lights, &settings);
        assert!(far.is_culled());
        let near = classify(&drawable(-1.0, 1.0, ShadowCastMode::On), &lights, &settings);
        assert!(near.draw_scene);

        let unculled = CullSettings {
            frustum_culling: false,
            ..settings
        };
        assert!(classify(&drawable(100.0, 101.0, ShadowCastMode::Off), &lights, &unculled).draw_scene);
    }

    #[test]
    fn test_inactive_layer_hides_drawable() {
        let view = camera_view();
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: true,
            active_layers: Layers::LAYER_2,
        };
        let result = classify(&drawable(-1.0, 1.0, ShadowCastMode::On), &store(), &settings);
        assert_eq!(result, Classification::default());
    }

    #[test]
    fn test_light_cap_keeps_shadow_receivers() {
        let view = camera_view();
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: true,
            active_layers: Layers::LAYER_1,
        };
        let mut lights = store();
        let ids: Vec<LightId> = (0..10)
            .map(|i| omni_at(&mut lights, Vec3::new(i as f32 * 0.1, 2.0, 0.0), 64))
            .collect();

        let result = classify(&drawable(-1.0, 1.0, ShadowCastMode::On), &lights, &settings);
        assert_eq!(result.lights.len(), 8);
        assert_eq!(result.lights.iter().collect::<Vec<_>>(), ids[..8].to_vec());
        assert_eq!(result.shadow_lights, ids);
    }

    #[test]
    fn test_out_of_range_and_disabled_lights_are_skipped() {
        let view = camera_view();
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: true,
            active_layers: Layers::LAYER_1,
        };
        let mut lights = store();
        let far = omni_at(&mut lights, Vec3::new(100.0, 0.0, 0.0), 0);
        let off = omni_at(&mut lights, Vec3::ZERO, 0);
        lights.set_active(off, false);
        let other_layer = omni_at(&mut lights, Vec3::ZERO, 0);
        lights.get_mut(other_layer).unwrap().layers = Layers::LAYER_3;

        let result = classify(&drawable(-1.0, 1.0, ShadowCastMode::On), &lights, &settings);
        assert!(result.draw_scene);
        assert!(result.lights.is_empty());
        assert!(!result.lights.contains(far));
    }

    #[test]
    fn test_shadow_only_skips_scene_but_casts() {
        let view = camera_view();
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: true,
            active_layers: Layers::LAYER_1,
        };
        let mut lights = store();
        let id = omni_at(&mut lights, Vec3::new(0.0, 3.0, 0.0), 64);

        let result = classify(&drawable(-1.0, 1.0, ShadowCastMode::ShadowOnly), &lights, &settings);
        assert!(!result.draw_scene);
        assert!(result.lights.is_empty());
        assert_eq!(result.shadow_lights, vec![id]);

        let off = classify(&drawable(-1.0, 1.0, ShadowCastMode::Off), &lights, &settings);
        assert!(off.shadow_lights.is_empty());
        assert!(off.lights.contains(id));
    }

    #[test]
    fn test_billboard_faces_the_eye() {
        let view = camera_view();
        let world = view.world_matrix(
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            Mat4::IDENTITY,
            BillboardMode::Enabled,
        );
        assert_eq!(world.translation(), Vec3::new(0.0, 0.0, 5.0));
        let forward = world.transform_vector(Vec3::Z).normalize();
        let to_eye = (view.position - world.translation()).normalize();
        assert!(forward.dot(to_eye) > 0.999);
    }

    #[test]
    fn test_call_transform_applies_before_the_model_transform() {
        let view = camera_view();
        let local = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let call = call_matrix(Vec3::ZERO, Vec3::Y, 90.0, Vec3::ONE);
        let world = view.world_matrix(call, local, BillboardMode::Disabled);
        assert_near(world.translation(), Vec3::new(5.0, 0.0, 0.0));
        assert_near(world.transform_vector(Vec3::X), Vec3::new(0.0, 0.0, -1.0));

        let call = call_matrix(Vec3::new(0.0, 2.0, 0.0), Vec3::Y, 0.0, Vec3::splat(2.0));
        let world = view.world_matrix(call, local, BillboardMode::Disabled);
        assert_near(world.transform_point(Vec3::X), Vec3::new(7.0, 2.0, 0.0));
    }

    #[test]
    fn test_ambient_transform_applies_last() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y, 60.0);
        let ambient = Mat4::from_axis_angle(Vec3::Y, 90f32.to_radians());
        let view = FrameView::new(&camera, 1.0, ambient);
        let local = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let call = call_matrix(Vec3::new(0.0, 0.0, 1.0), Vec3::Y, 0.0, Vec3::ONE);
        let world = view.world_matrix(call, local, BillboardMode::Disabled);
        assert_near(world.translation(), Vec3::new(1.0, 0.0, -5.0));
    }

    #[test]
    fn test_y_axis_billboard_keeps_world_up() {
        let view = camera_view();
        let world = view.world_matrix(
            Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0)),
            Mat4::IDENTITY,
            BillboardMode::YAxis,
        );
        assert_near(world.translation(), Vec3::new(3.0, 4.0, 5.0));
        assert_near(world.transform_vector(Vec3::Y), Vec3::Y);

        let forward = world.transform_vector(Vec3::Z).normalize();
        assert_abs_diff_eq!(forward.y, 0.0, epsilon = 1e-5);
        let mut to_eye = view.position - world.translation();
        to_eye.y = 0.0;
        assert!(forward.dot(to_eye.normalize()) > 0.999);
    }
}
