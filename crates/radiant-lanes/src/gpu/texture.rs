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

//! Textures with their sampling state.

use std::fmt;

use radiant_core::math::Color;
use radiant_core::renderer::{
    ImageTarget, MagFilter, MinFilter, ResourceError, TextureFormat, TextureId, TextureSampling,
    TextureTarget, TextureUpload, TextureWrap,
};

use super::SharedDevice;

/// High-level filtering presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Point sampling.
    Nearest,
    /// Linear sampling without mipmaps.
    Bilinear,
    /// Linear sampling between mip levels.
    Trilinear,
    /// Trilinear with 4x anisotropy.
    Anisotropic4,
    /// Trilinear with 8x anisotropy.
    Anisotropic8,
    /// Trilinear with 16x anisotropy.
    Anisotropic16,
}

impl TextureFilter {
    /// Whether the filter samples mip levels.
    pub fn uses_mipmaps(&self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Bilinear)
    }

    /// Driver sampling state, with the anisotropy clamped to `max_anisotropy`.
    pub fn sampling(&self, max_anisotropy: f32) -> TextureSampling {
        let (min, mag) = match self {
            TextureFilter::Nearest => (MinFilter::Nearest, MagFilter::Nearest),
            TextureFilter::Bilinear => (MinFilter::Linear, MagFilter::Linear),
            _ => (MinFilter::LinearMipmapLinear, MagFilter::Linear),
        };
        let desired: f32 = match self {
            TextureFilter::Anisotropic4 => 4.0,
            TextureFilter::Anisotropic8 => 8.0,
            TextureFilter::Anisotropic16 => 16.0,
            _ => 1.0,
        };
        TextureSampling {
            min,
            mag,
            anisotropy: desired.min(max_anisotropy.max(1.0)),
        }
    }
}

/// Number of levels of a full mip chain: `floor(log2(max(w, h))) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// An owned texture object.
pub struct Texture {
    device: SharedDevice,
    id: TextureId,
    target: TextureTarget,
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
    mip_levels: u32,
    filter: Option<TextureFilter>,
    wrap: Option<TextureWrap>,
    border: Option<Color>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("format", &self.format.internal)
            .field("size", &(self.width, self.height, self.depth))
            .field("mip_levels", &self.mip_levels)
            .finish()
    }
}

impl Texture {
    /// Creates a 1D texture, optionally filled with `data`.
    pub fn new_1d(
        device: SharedDevice,
        data: Option<&[u8]>,
        width: u32,
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        Self::create(device, TextureTarget::Texture1D, data, (width, 1, 1), format)
    }

    /// Creates a 2D texture, optionally filled with `data`.
    pub fn new_2d(
        device: SharedDevice,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        Self::create(device, TextureTarget::Texture2D, data, (width, height, 1), format)
    }

    /// Creates a 3D texture, optionally filled with `data`.
    pub fn new_3d(
        device: SharedDevice,
        data: Option<&[u8]>,
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        Self::create(device, TextureTarget::Texture3D, data, (width, height, depth), format)
    }

    /// Creates a cubemap with square faces of `size` pixels.
    ///
    /// `data`, when given, holds the six faces back to back in OpenGL order
    /// (+X, -X, +Y, -Y, +Z, -Z).
    pub fn new_cube(
        device: SharedDevice,
        data: Option<&[u8]>,
        size: u32,
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        Self::create(device, TextureTarget::CubeMap, data, (size, size, 1), format)
    }

    fn create(
        device: SharedDevice,
        target: TextureTarget,
        data: Option<&[u8]>,
        (width, height, depth): (u32, u32, u32),
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(ResourceError::InvalidDimensions { width, height });
        }
        let faces = if target == TextureTarget::CubeMap { 6 } else { 1 };
        let expected = width as usize * height as usize * depth as usize * format.pixel_size() * faces;
        if let Some(bytes) = data {
            if bytes.len() < expected {
                return Err(ResourceError::AllocationFailed(format!(
                    "texture data holds {} bytes, {} expected",
                    bytes.len(),
                    expected
                )));
            }
        }

        let id = device.create_texture(target)?;
        let texture = Self {
            device,
            id,
            target,
            format,
            width,
            height,
            depth,
            mip_levels: 1,
            filter: None,
            wrap: None,
            border: None,
        };
        texture.allocate(data);
        log::debug!(
            "Created {:?} texture {:?} ({}x{}x{}, {:?})",
            target,
            id,
            width,
            height,
            depth,
            format.internal
        );
        Ok(texture)
    }

    /// Allocates level 0 of every image, filling it from `data` when given.
    fn allocate(&self, data: Option<&[u8]>) {
        let upload = |image: ImageTarget, data: Option<&[u8]>| {
            self.device.upload_texture(
                self.id,
                &TextureUpload {
                    target: image,
                    level: 0,
                    width: self.width,
                    height: self.height,
                    depth: self.depth,
                    format: self.format,
                    data,
                },
            );
        };
        match self.target {
            TextureTarget::Texture1D => upload(ImageTarget::Texture1D, data),
            TextureTarget::Texture2D => upload(ImageTarget::Texture2D, data),
            TextureTarget::Texture3D => upload(ImageTarget::Texture3D, data),
            TextureTarget::CubeMap => {
                let face_bytes = self.face_bytes();
                for face in 0..6 {
                    let slice = data.map(|d| &d[face * face_bytes..(face + 1) * face_bytes]);
                    upload(ImageTarget::CubeFace(face), slice);
                }
            }
        }
    }

    fn face_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.format.pixel_size()
    }

    /// Allocates storage for mip `level` of every image without filling it.
    ///
    /// Used by passes that render into individual mip levels.
    pub fn allocate_level(&mut self, level: u32) {
        let width = (self.width >> level).max(1);
        let height = (self.height >> level).max(1);
        let images: Vec<ImageTarget> = match self.target {
            TextureTarget::CubeMap => (0..6).map(ImageTarget::CubeFace).collect(),
            TextureTarget::Texture1D => vec![ImageTarget::Texture1D],
            TextureTarget::Texture2D => vec![ImageTarget::Texture2D],
            TextureTarget::Texture3D => vec![ImageTarget::Texture3D],
        };
        for image in images {
            self.device.upload_texture(
                self.id,
                &TextureUpload {
                    target: image,
                    level,
                    width,
                    height,
                    depth: self.depth,
                    format: self.format,
                    data: None,
                },
            );
        }
        self.mip_levels = self.mip_levels.max(level + 1);
    }

    /// The device handle.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// The texture target.
    pub fn target(&self) -> TextureTarget {
        self.target
    }

    /// The format triple.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in pixels (1 for non-3D textures).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of allocated mip levels.
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    /// The filter last applied, if any.
    pub fn filter(&self) -> Option<TextureFilter> {
        self.filter
    }

    /// The wrap mode last applied, if any.
    pub fn wrap(&self) -> Option<TextureWrap> {
        self.wrap
    }

    /// The border color last applied, if any.
    pub fn border_color(&self) -> Option<Color> {
        self.border
    }

    /// Applies a filter preset.
    ///
    /// Mipmapped presets need a mip chain; without one the texture would be
    /// incomplete, so the chain is generated first.
    pub fn set_filter(&mut self, filter: TextureFilter) {
        if filter.uses_mipmaps() && self.mip_levels <= 1 {
            log::debug!("Filter {:?} on {:?} without mipmaps, generating them", filter, self.id);
            self.generate_mipmaps();
        }
        self.filter = Some(filter);
        let sampling = filter.sampling(self.device.max_anisotropy());
        self.device.set_texture_sampling(self.id, self.target, sampling);
    }

    /// Sets the wrap mode on every axis of the target.
    pub fn set_wrap(&mut self, wrap: TextureWrap) {
        self.wrap = Some(wrap);
        self.device.set_texture_wrap(self.id, self.target, wrap);
    }

    /// Sets the color sampled outside `[0, 1]` with [`TextureWrap::ClampToBorder`].
    pub fn set_border_color(&mut self, color: Color) {
        self.border = Some(color);
        self.device.set_texture_border_color(self.id, self.target, color);
    }

    /// Generates the full mip chain from level 0.
    pub fn generate_mipmaps(&mut self) {
        self.device.generate_mipmaps(self.id, self.target);
        self.mip_levels = mip_level_count(self.width, self.height);
    }

    /// Reallocates storage at a new size, discarding the content.
    ///
    /// Format, filter, wrap and border color are preserved. A mipmapped
    /// texture gets a new chain of the matching length.
    pub fn resize(&mut self, width: u32, height: u32, depth: u32) -> Result<(), ResourceError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(ResourceError::InvalidDimensions { width, height });
        }
        self.width = width;
        self.height = height;
        self.depth = depth;
        self.allocate(None);
        if self.mip_levels > 1 {
            self.generate_mipmaps();
        }
        if let Some(color) = self.border {
            self.set_border_color(color);
        }
        if let Some(filter) = self.filter {
            self.set_filter(filter);
        }
        if let Some(wrap) = self.wrap {
            self.set_wrap(wrap);
        }
        Ok(())
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.device.destroy_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(512, 1024), 11);
    }

    #[test]
    fn test_anisotropy_is_clamped_to_driver_limit() {
        let s = TextureFilter::Anisotropic16.sampling(8.0);
        assert_eq!(s.anisotropy, 8.0);
        assert_eq!(s.min, MinFilter::LinearMipmapLinear);
        let s = TextureFilter::Bilinear.sampling(16.0);
        assert_eq!(s.anisotropy, 1.0);
        assert!(!s.min.uses_mipmaps());
    }
}
