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

//! 1x1 textures bound in place of missing material maps.

use radiant_core::math::Color;
use radiant_core::renderer::{ResourceError, TextureFormat, TextureId};

use crate::gpu::{SharedDevice, Texture, TextureFilter};

/// The placeholder textures.
///
/// White stands in for albedo, metalness, roughness and occlusion maps so
/// their factors apply unchanged. Black stands in for emission and normal
/// maps, which the shaders treat as absent.
#[derive(Debug)]
pub struct Placeholders {
    white: Texture,
    black: Texture,
}

impl Placeholders {
    /// Creates both textures.
    pub fn new(device: &SharedDevice) -> Result<Self, ResourceError> {
        Ok(Self {
            white: solid(device, Color::WHITE)?,
            black: solid(device, Color::BLACK)?,
        })
    }

    /// The white texture.
    pub fn white(&self) -> TextureId {
        self.white.id()
    }

    /// The black texture.
    pub fn black(&self) -> TextureId {
        self.black.id()
    }

    /// `texture`, or the white placeholder.
    pub fn or_white(&self, texture: Option<TextureId>) -> TextureId {
        texture.unwrap_or(self.white.id())
    }

    /// `texture`, or the black placeholder.
    pub fn or_black(&self, texture: Option<TextureId>) -> TextureId {
        texture.unwrap_or(self.black.id())
    }
}

fn solid(device: &SharedDevice, color: Color) -> Result<Texture, ResourceError> {
    let mut texture = Texture::new_2d(
        device.clone(),
        Some(&color.to_array()),
        1,
        1,
        TextureFormat::RGBA8,
    )?;
    texture.set_filter(TextureFilter::Nearest);
    Ok(texture)
}
