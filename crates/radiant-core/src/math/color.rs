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

//! 8-bit RGBA colors.

use serde::{Deserialize, Serialize};

use super::{Vec3, Vec4};

/// An sRGB-encoded color with 8-bit channels.
///
/// This is the color type of the public API (light colors, material tints,
/// fog and background). Shaders receive it normalized through [`Color::to_vec3`]
/// or [`Color::to_vec4`].
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const BLANK: Self = Self::new(0, 0, 0, 0);
    /// Medium gray, default fog and background color.
    pub const GRAY: Self = Self::new(130, 130, 130, 255);
    /// Dark gray, default ambient color.
    pub const DARK_GRAY: Self = Self::new(80, 80, 80, 255);

    /// Creates a color from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the RGB channels normalized to `[0, 1]`.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Returns the RGBA channels normalized to `[0, 1]`.
    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        self.to_vec3().extend(self.a as f32 / 255.0)
    }

    /// Builds a color from normalized channels, clamping to `[0, 1]`.
    #[inline]
    pub fn from_vec4(v: Vec4) -> Self {
        let c = |f: f32| (f.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(c(v.x), c(v.y), c(v.z), c(v.w))
    }

    /// Returns the channels as an array.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_roundtrip() {
        let c = Color::new(255, 0, 128, 64);
        assert_eq!(Color::from_vec4(c.to_vec4()), c);
        assert_eq!(Color::WHITE.to_vec3(), Vec3::ONE);
    }
}
