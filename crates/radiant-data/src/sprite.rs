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

//! Animated billboard sprites backed by a frame grid in one texture.

use radiant_core::math::{Aabb, BillboardMode, Vec2};
use radiant_core::renderer::{Layers, MaterialConfig, Rect, ShadowCastMode, TextureId};

use crate::material::Material;
use crate::mesh::{unit_quad, Mesh};
use crate::transform::Transform;

/// A textured quad cycling through the frames of a sprite sheet.
#[derive(Debug)]
pub struct Sprite {
    /// The quad drawn for the sprite.
    pub mesh: Mesh,
    /// Material; its UV transform selects the current frame.
    pub material: Material,
    /// Local transform.
    pub transform: Transform,
    /// Fractional index of the current frame.
    pub current_frame: f32,
    /// Frame size in texels.
    pub frame_size: Vec2,
    /// Frames per row.
    pub x_frame_count: u32,
    /// Frames per column.
    pub y_frame_count: u32,
    /// Shadow casting policy.
    pub shadow: ShadowCastMode,
    /// Billboard mode.
    pub billboard: BillboardMode,
    /// Render layers.
    pub layers: Layers,
    texture_size: Vec2,
}

impl Sprite {
    /// Creates a sprite over a `texture_size` sheet split in `x_frames * y_frames` cells.
    ///
    /// Sprites face the camera around the Y axis and cast no shadow by default.
    pub fn new(
        texture: TextureId,
        texture_size: (u32, u32),
        x_frames: u32,
        y_frames: u32,
        config: MaterialConfig,
    ) -> Self {
        let x_frames = x_frames.max(1);
        let y_frames = y_frames.max(1);
        let texture_size = Vec2::new(texture_size.0 as f32, texture_size.1 as f32);

        let mut material = Material::new(config);
        material.albedo.texture = Some(texture);

        let mut sprite = Self {
            mesh: Mesh::new(unit_quad()),
            material,
            transform: Transform::identity(None),
            current_frame: 0.0,
            frame_size: Vec2::new(
                texture_size.x / x_frames as f32,
                texture_size.y / y_frames as f32,
            ),
            x_frame_count: x_frames,
            y_frame_count: y_frames,
            shadow: ShadowCastMode::Off,
            billboard: BillboardMode::YAxis,
            layers: Layers::LAYER_1,
            texture_size,
        };
        sprite.refresh_uv();
        sprite
    }

    /// Total number of frames in the sheet.
    pub fn frame_count(&self) -> u32 {
        self.x_frame_count * self.y_frame_count
    }

    /// Advances over every frame of the sheet by `speed` frames.
    pub fn update(&mut self, speed: f32) {
        self.update_range(0, self.frame_count(), speed);
    }

    /// Advances by `speed` frames, wrapping within `[first, last)`.
    pub fn update_range(&mut self, first: u32, last: u32, speed: f32) {
        let (lo, hi) = (first as f32, last as f32);
        let span = hi - lo;
        let next = self.current_frame + speed;
        self.current_frame = if span > 0.0 {
            next - span * ((next - lo) / span).floor()
        } else {
            lo
        };
        self.refresh_uv();
    }

    /// Top-left texel of the current frame.
    pub fn frame_coord(&self) -> Vec2 {
        let frame = self.current_frame.max(0.0) as u32;
        let x = frame % self.x_frame_count;
        let y = (frame / self.x_frame_count) % self.y_frame_count;
        Vec2::new(x as f32, y as f32).mul_elem(self.frame_size)
    }

    /// Texel rectangle of the current frame.
    pub fn frame_rect(&self) -> Rect {
        let c = self.frame_coord();
        Rect::new(
            c.x as i32,
            c.y as i32,
            self.frame_size.x as i32,
            self.frame_size.y as i32,
        )
    }

    /// Local bounds used for culling: the unit cube around the quad.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::UNIT_CUBE
    }

    fn refresh_uv(&mut self) {
        if self.texture_size.x <= 0.0 || self.texture_size.y <= 0.0 {
            return;
        }
        let c = self.frame_coord();
        self.material.uv_offset = Vec2::new(c.x / self.texture_size.x, c.y / self.texture_size.y);
        self.material.uv_scale = Vec2::new(
            self.frame_size.x / self.texture_size.x,
            self.frame_size.y / self.texture_size.y,
        );
    }
}
