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

//! Data structures describing textures and their sampling state.

use crate::math::Color;

/// The binding target of a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// A one-dimensional texture.
    Texture1D,
    /// A two-dimensional texture.
    Texture2D,
    /// A three-dimensional (volumetric) texture.
    Texture3D,
    /// A cubemap (six square 2D faces).
    CubeMap,
}

/// The image of a texture that an upload or attachment refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    /// The single image of a 1D texture.
    Texture1D,
    /// The single image of a 2D texture.
    Texture2D,
    /// The volume of a 3D texture.
    Texture3D,
    /// One face of a cubemap, in OpenGL order (+X, -X, +Y, -Y, +Z, -Z).
    CubeFace(usize),
}

impl ImageTarget {
    /// The texture target that owns this image.
    pub fn texture_target(&self) -> TextureTarget {
        match self {
            ImageTarget::Texture1D => TextureTarget::Texture1D,
            ImageTarget::Texture2D => TextureTarget::Texture2D,
            ImageTarget::Texture3D => TextureTarget::Texture3D,
            ImageTarget::CubeFace(_) => TextureTarget::CubeMap,
        }
    }
}

/// Internal storage format of a texture or renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    /// One 8-bit normalized channel.
    R8,
    /// Two 8-bit normalized channels.
    Rg8,
    /// Three 8-bit normalized channels.
    Rgb8,
    /// Four 8-bit normalized channels.
    Rgba8,
    /// One half-float channel.
    R16F,
    /// Two half-float channels.
    Rg16F,
    /// Three half-float channels.
    Rgb16F,
    /// Four half-float channels.
    Rgba16F,
    /// One float channel.
    R32F,
    /// Three float channels.
    Rgb32F,
    /// Four float channels.
    Rgba32F,
    /// 16-bit depth.
    Depth16,
    /// 24-bit depth.
    Depth24,
    /// 32-bit float depth.
    Depth32F,
    /// Packed 24-bit depth and 8-bit stencil.
    Depth24Stencil8,
}

/// Layout of the client-side pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Red only.
    Red,
    /// Red and green.
    Rg,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Depth values.
    Depth,
    /// Packed depth and stencil.
    DepthStencil,
}

/// Component type of the client-side pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Unsigned bytes.
    U8,
    /// Unsigned shorts.
    U16,
    /// Half floats.
    F16,
    /// Floats.
    F32,
    /// Packed 24/8 unsigned integers.
    U24_8,
}

impl ComponentType {
    /// Size in bytes of one component.
    pub fn size(&self) -> usize {
        match self {
            ComponentType::U8 => 1,
            ComponentType::U16 | ComponentType::F16 => 2,
            ComponentType::F32 | ComponentType::U24_8 => 4,
        }
    }
}

/// The `(internal, external, component)` triple describing a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFormat {
    /// Storage format on the GPU.
    pub internal: InternalFormat,
    /// Layout of uploaded pixel data.
    pub external: PixelFormat,
    /// Component type of uploaded pixel data.
    pub component: ComponentType,
}

impl TextureFormat {
    /// Builds the canonical triple for an internal format.
    pub const fn from_internal(internal: InternalFormat) -> Self {
        let (external, component) = match internal {
            InternalFormat::R8 => (PixelFormat::Red, ComponentType::U8),
            InternalFormat::Rg8 => (PixelFormat::Rg, ComponentType::U8),
            InternalFormat::Rgb8 => (PixelFormat::Rgb, ComponentType::U8),
            InternalFormat::Rgba8 => (PixelFormat::Rgba, ComponentType::U8),
            InternalFormat::R16F => (PixelFormat::Red, ComponentType::F32),
            InternalFormat::Rg16F => (PixelFormat::Rg, ComponentType::F32),
            InternalFormat::Rgb16F => (PixelFormat::Rgb, ComponentType::F32),
            InternalFormat::Rgba16F => (PixelFormat::Rgba, ComponentType::F32),
            InternalFormat::R32F => (PixelFormat::Red, ComponentType::F32),
            InternalFormat::Rgb32F => (PixelFormat::Rgb, ComponentType::F32),
            InternalFormat::Rgba32F => (PixelFormat::Rgba, ComponentType::F32),
            InternalFormat::Depth16 => (PixelFormat::Depth, ComponentType::U16),
            InternalFormat::Depth24 => (PixelFormat::Depth, ComponentType::F32),
            InternalFormat::Depth32F => (PixelFormat::Depth, ComponentType::F32),
            InternalFormat::Depth24Stencil8 => (PixelFormat::DepthStencil, ComponentType::U24_8),
        };
        Self {
            internal,
            external,
            component,
        }
    }

    /// 8-bit RGBA, the format of decoded LDR images.
    pub const RGBA8: Self = Self::from_internal(InternalFormat::Rgba8);
    /// 8-bit RGB.
    pub const RGB8: Self = Self::from_internal(InternalFormat::Rgb8);
    /// Half-float RGB, the HDR scene format.
    pub const RGB16F: Self = Self::from_internal(InternalFormat::Rgb16F);
    /// Half-float RGBA.
    pub const RGBA16F: Self = Self::from_internal(InternalFormat::Rgba16F);
    /// Half-float RG, the BRDF lookup table format.
    pub const RG16F: Self = Self::from_internal(InternalFormat::Rg16F);
    /// Half-float R, the omni shadow distance format.
    pub const R16F: Self = Self::from_internal(InternalFormat::R16F);
    /// Float RGB, the format of decoded HDR panoramas.
    pub const RGB32F: Self = Self::from_internal(InternalFormat::Rgb32F);
    /// 16-bit depth, used by shadow maps.
    pub const DEPTH16: Self = Self::from_internal(InternalFormat::Depth16);
    /// 24-bit depth, used by the scene target.
    pub const DEPTH24: Self = Self::from_internal(InternalFormat::Depth24);

    /// True for depth or depth-stencil formats.
    pub fn is_depth(&self) -> bool {
        matches!(
            self.external,
            PixelFormat::Depth | PixelFormat::DepthStencil
        )
    }

    /// Number of client-side channels.
    pub fn channel_count(&self) -> usize {
        match self.external {
            PixelFormat::Red | PixelFormat::Depth | PixelFormat::DepthStencil => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Size in bytes of one client-side pixel.
    pub fn pixel_size(&self) -> usize {
        self.channel_count() * self.component.size()
    }
}

/// Minification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
    /// Nearest texel of the nearest mip.
    NearestMipmapNearest,
    /// Bilinear inside the nearest mip.
    LinearMipmapNearest,
    /// Nearest texel, blended between mips.
    NearestMipmapLinear,
    /// Trilinear.
    LinearMipmapLinear,
}

impl MinFilter {
    /// True when the filter reads mip levels.
    pub fn uses_mipmaps(&self) -> bool {
        !matches!(self, MinFilter::Nearest | MinFilter::Linear)
    }
}

/// Magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagFilter {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
}

/// The full sampling state written by [`RenderDevice::set_texture_sampling`](crate::renderer::RenderDevice::set_texture_sampling).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSampling {
    /// Minification filter.
    pub min: MinFilter,
    /// Magnification filter.
    pub mag: MagFilter,
    /// Maximum anisotropy, `1.0` disables anisotropic filtering.
    pub anisotropy: f32,
}

/// Wrapping behavior outside the `[0, 1]` texture coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Tile, mirroring every other repetition.
    MirroredRepeat,
    /// Clamp to the edge texels.
    ClampToEdge,
    /// Clamp to the border color.
    ClampToBorder,
}

/// An upload of pixel data into one image of a texture.
///
/// With `data == None` the storage is allocated and left undefined.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    /// Which image receives the data.
    pub target: ImageTarget,
    /// Mip level.
    pub level: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels (1 for 1D textures).
    pub height: u32,
    /// Depth in texels (1 for 1D, 2D and cube textures).
    pub depth: u32,
    /// Format triple of the texture.
    pub format: TextureFormat,
    /// Raw bytes laid out as `format.external` / `format.component`.
    pub data: Option<&'a [u8]>,
}

/// A border color for [`TextureWrap::ClampToBorder`], normalized.
pub fn border_color_rgba(color: Color) -> [f32; 4] {
    color.to_vec4().to_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_triples() {
        assert_eq!(TextureFormat::RGBA8.pixel_size(), 4);
        assert_eq!(TextureFormat::RGB32F.pixel_size(), 12);
        assert!(TextureFormat::DEPTH16.is_depth());
        assert!(!TextureFormat::RG16F.is_depth());
    }

    #[test]
    fn test_cube_face_image_belongs_to_cubemap() {
        assert_eq!(
            ImageTarget::CubeFace(3).texture_target(),
            TextureTarget::CubeMap
        );
    }
}
