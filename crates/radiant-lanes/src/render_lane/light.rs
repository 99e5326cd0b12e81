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

//! Light records and their shadow maps.

use radiant_core::math::{
    cube_face_index, degrees_to_radians, radians_to_degrees, Color, Frustum, Mat4, Vec3,
    CUBE_FACE_VIEWS,
};
use radiant_core::renderer::{
    Attachment, Layers, LightKind, ResourceError, TextureFormat, TextureTarget, TextureWrap,
};

use crate::gpu::{RenderTarget, SharedDevice, Texture, TextureFilter};

/// Maximum number of lights shading a single scene call.
pub const MAX_LIGHTS_PER_CALL: usize = 8;

/// Extents of the orthographic projection of directional lights.
pub const DIRECTIONAL_SHADOW_EXTENT: f32 = 10.0;

/// Near plane of every light projection.
pub const LIGHT_NEAR: f32 = 0.05;

/// Far plane of directional light projections.
pub const DIRECTIONAL_FAR: f32 = 4000.0;

/// Opaque light handle. Ids start at 1; 0 is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LightId(pub u32);

/// Depth render target a light renders its shadow casters into.
///
/// Directional and spot lights own a 2D depth texture. Omni lights own a 2D
/// depth buffer plus an `R16F` cubemap on color 0 receiving the distance of
/// each fragment to the light.
#[derive(Debug)]
pub struct ShadowMap {
    target: RenderTarget,
    resolution: u32,
    omni: bool,
}

impl ShadowMap {
    /// Allocates a shadow map matching `kind`.
    pub fn new(device: SharedDevice, kind: LightKind, resolution: u32) -> Result<Self, ResourceError> {
        let mut target = RenderTarget::new(device, resolution, resolution)?;
        let omni = kind == LightKind::Omni;

        let depth = target.create_attachment(
            Attachment::Depth,
            TextureTarget::Texture2D,
            TextureFormat::DEPTH16,
        )?;
        depth.set_filter(TextureFilter::Nearest);
        if omni {
            depth.set_wrap(TextureWrap::ClampToEdge);
            let distances = target.create_attachment(
                Attachment::COLOR_0,
                TextureTarget::CubeMap,
                TextureFormat::R16F,
            )?;
            distances.set_filter(TextureFilter::Nearest);
            distances.set_wrap(TextureWrap::ClampToEdge);
        } else {
            depth.set_wrap(TextureWrap::ClampToBorder);
            depth.set_border_color(Color::WHITE);
        }
        target.set_draw_buffer(Attachment::None);
        target.set_read_buffer(Attachment::None);

        log::debug!(
            "Allocated {}x{} {:?} shadow map",
            resolution,
            resolution,
            kind
        );
        Ok(Self {
            target,
            resolution,
            omni,
        })
    }

    /// The render target.
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Side length in texels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Size of one texel in UV units.
    pub fn texel_size(&self) -> f32 {
        1.0 / self.resolution as f32
    }

    /// The texture sampled by the material shader: the depth map, or the
    /// distance cubemap of omni lights.
    pub fn sampled_texture(&self) -> Option<&Texture> {
        if self.omni {
            self.target.attachment(Attachment::COLOR_0)
        } else {
            self.target.attachment(Attachment::Depth)
        }
    }
}

/// A light source.
///
/// Cutoffs are stored as cosines and exposed in degrees. The frustum of
/// directional and spot lights follows every change of position, direction
/// or kind; omni lights cull by range only.
#[derive(Debug)]
pub struct Light {
    kind: LightKind,
    /// Color.
    pub color: Color,
    position: Vec3,
    direction: Vec3,
    /// Intensity multiplier.
    pub energy: f32,
    /// Range of spot and omni lights.
    pub max_distance: f32,
    /// Distance attenuation factor.
    pub attenuation: f32,
    inner_cutoff: f32,
    outer_cutoff: f32,
    /// Depth bias applied when sampling the shadow map.
    pub shadow_bias: f32,
    /// Whether the light contributes to the frame.
    pub enabled: bool,
    /// Layers this light illuminates.
    pub layers: Layers,
    shadow: Option<ShadowMap>,
    frustum: Frustum,
}

impl Light {
    /// A disabled, unshadowed light with default parameters.
    pub fn new(kind: LightKind) -> Self {
        let mut light = Self {
            kind,
            color: Color::WHITE,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
            energy: 1.0,
            max_distance: 32.0,
            attenuation: 1.0,
            inner_cutoff: -1.0,
            outer_cutoff: -1.0,
            shadow_bias: 0.0,
            enabled: false,
            layers: Layers::ALL,
            shadow: None,
            frustum: Frustum::default(),
        };
        light.update_frustum();
        light
    }

    /// The light kind.
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Changes the kind. An existing shadow map is reallocated for the new
    /// kind; on failure the light loses its shadow.
    pub fn set_kind(&mut self, device: &SharedDevice, kind: LightKind) -> Result<(), ResourceError> {
        if kind == self.kind {
            return Ok(());
        }
        self.kind = kind;
        let resolution = self.shadow.as_ref().map(ShadowMap::resolution);
        self.shadow = None;
        self.update_frustum();
        match resolution {
            Some(res) => self.enable_shadow(device, res),
            None => Ok(()),
        }
    }

    /// World position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Moves the light.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_frustum();
    }

    /// Points the light. The direction is normalized; a zero vector is ignored.
    pub fn set_direction(&mut self, direction: Vec3) {
        if direction.length_squared() <= f32::EPSILON {
            log::warn!("Ignoring zero light direction");
            return;
        }
        self.direction = direction.normalize();
        self.update_frustum();
    }

    /// Points the light at `target`.
    pub fn set_target(&mut self, target: Vec3) {
        self.set_direction(target - self.position);
    }

    /// Moves the light and points it at `target`, recomputing the frustum once.
    pub fn set_position_target(&mut self, position: Vec3, target: Vec3) {
        let direction = target - position;
        self.position = position;
        if direction.length_squared() > f32::EPSILON {
            self.direction = direction.normalize();
        }
        self.update_frustum();
    }

    /// Inner cone angle in degrees.
    pub fn inner_cutoff(&self) -> f32 {
        radians_to_degrees(self.inner_cutoff.clamp(-1.0, 1.0).acos())
    }

    /// Sets the inner cone angle in degrees.
    pub fn set_inner_cutoff(&mut self, degrees: f32) {
        self.inner_cutoff = degrees_to_radians(degrees).cos();
    }

    /// Outer cone angle in degrees.
    pub fn outer_cutoff(&self) -> f32 {
        radians_to_degrees(self.outer_cutoff.clamp(-1.0, 1.0).acos())
    }

    /// Sets the outer cone angle in degrees.
    pub fn set_outer_cutoff(&mut self, degrees: f32) {
        self.outer_cutoff = degrees_to_radians(degrees).cos();
    }

    /// Cosine of the inner cone angle, as uploaded to shaders.
    pub fn inner_cutoff_cos(&self) -> f32 {
        self.inner_cutoff
    }

    /// Cosine of the outer cone angle, as uploaded to shaders.
    pub fn outer_cutoff_cos(&self) -> f32 {
        self.outer_cutoff
    }

    /// True when the light owns a shadow map.
    pub fn has_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    /// The shadow map, if shadows are enabled.
    pub fn shadow_map(&self) -> Option<&ShadowMap> {
        self.shadow.as_ref()
    }

    /// Allocates a shadow map of `resolution` texels, replacing an existing
    /// map of another size. On failure the light stays unshadowed.
    pub fn enable_shadow(&mut self, device: &SharedDevice, resolution: u32) -> Result<(), ResourceError> {
        if resolution == 0 {
            return Err(ResourceError::InvalidDimensions {
                width: 0,
                height: 0,
            });
        }
        if self.shadow.as_ref().is_some_and(|s| s.resolution() == resolution) {
            return Ok(());
        }
        self.shadow = None;
        self.shadow = Some(ShadowMap::new(device.clone(), self.kind, resolution)?);
        self.update_frustum();
        Ok(())
    }

    /// Releases the shadow map. Does nothing when shadows are already off.
    pub fn disable_shadow(&mut self) {
        if self.shadow.take().is_some() {
            log::debug!("Released {:?} shadow map", self.kind);
        }
    }

    /// The cached culling frustum.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// View matrix of directional and spot lights.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.direction, Vec3::Y)
    }

    /// View matrix of one cubemap face, for omni lights.
    pub fn face_view_matrix(&self, face: usize) -> Mat4 {
        CUBE_FACE_VIEWS[face % 6].view_matrix(self.position)
    }

    /// Projection matrix of the light.
    pub fn projection_matrix(&self) -> Mat4 {
        match self.kind {
            LightKind::Directional => Mat4::orthographic(
                -DIRECTIONAL_SHADOW_EXTENT,
                DIRECTIONAL_SHADOW_EXTENT,
                -DIRECTIONAL_SHADOW_EXTENT,
                DIRECTIONAL_SHADOW_EXTENT,
                LIGHT_NEAR,
                DIRECTIONAL_FAR,
            ),
            _ => Mat4::perspective(
                degrees_to_radians(90.0),
                1.0,
                LIGHT_NEAR,
                self.max_distance.max(LIGHT_NEAR * 2.0),
            ),
        }
    }

    /// `projection * view` of the light; omni lights use the face their
    /// direction points into.
    pub fn view_projection(&self) -> Mat4 {
        let view = match self.kind {
            LightKind::Omni => self.face_view_matrix(cube_face_index(self.direction)),
            _ => self.view_matrix(),
        };
        self.projection_matrix() * view
    }

    fn update_frustum(&mut self) {
        if self.kind != LightKind::Omni {
            self.frustum = Frustum::from_view_projection(&self.view_projection());
        }
    }
}

/// Read access to the lights referenced by batched calls.
pub trait LightSource {
    /// The light of `id`, if it exists.
    fn light(&self, id: LightId) -> Option<&Light>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let light = Light::new(LightKind::Spot);
        assert_eq!(light.color, Color::WHITE);
        assert_eq!(light.energy, 1.0);
        assert_eq!(light.max_distance, 32.0);
        assert!(!light.enabled);
        assert!(!light.has_shadow());
        assert_eq!(light.direction(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut light = Light::new(LightKind::Directional);
        light.set_direction(Vec3::new(3.0, -4.0, 0.0));
        assert_relative_eq!(light.direction().length(), 1.0, epsilon = 1e-5);
        light.set_direction(Vec3::ZERO);
        assert_relative_eq!(light.direction().length(), 1.0, epsilon = 1e-5);

        light.set_position_target(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert_relative_eq!(light.direction().y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cutoffs_round_trip_in_degrees() {
        let mut light = Light::new(LightKind::Spot);
        light.set_inner_cutoff(20.0);
        light.set_outer_cutoff(35.0);
        assert_relative_eq!(light.inner_cutoff(), 20.0, epsilon = 1e-3);
        assert_relative_eq!(light.outer_cutoff(), 35.0, epsilon = 1e-3);
        assert_relative_eq!(light.inner_cutoff_cos(), 20f32.to_radians().cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_frustum_follows_direction() {
        let mut light = Light::new(LightKind::Spot);
        light.set_position_target(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(light.frustum().contains_point(Vec3::ZERO));
        light.set_direction(Vec3::new(0.0, 0.0, 1.0));
        assert!(!light.frustum().contains_point(Vec3::ZERO));
    }
}
