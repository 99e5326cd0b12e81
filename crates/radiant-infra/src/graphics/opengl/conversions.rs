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

//! Conversions from engine enums to OpenGL enum values.

use radiant_core::renderer::{
    Attachment, BlitFilter, BlitMask, ClearFlags, ComponentType, FramebufferStatus,
    FramebufferTarget, ImageTarget, InternalFormat, MagFilter, MinFilter, PixelFormat,
    TextureTarget, TextureWrap,
};

/// A local extension trait to convert engine enums into OpenGL enum values.
/// Keeps the `.into_gl()` call sites uniform without leaking `glow` into `radiant-core`.
pub trait IntoGl<T> {
    /// Consumes self and converts it into the OpenGL value.
    fn into_gl(self) -> T;
}

// --- Textures ---

impl IntoGl<u32> for TextureTarget {
    fn into_gl(self) -> u32 {
        match self {
            TextureTarget::Texture1D => glow::TEXTURE_1D,
            TextureTarget::Texture2D => glow::TEXTURE_2D,
            TextureTarget::Texture3D => glow::TEXTURE_3D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        }
    }
}

impl IntoGl<u32> for ImageTarget {
    fn into_gl(self) -> u32 {
        match self {
            ImageTarget::Texture1D => glow::TEXTURE_1D,
            ImageTarget::Texture2D => glow::TEXTURE_2D,
            ImageTarget::Texture3D => glow::TEXTURE_3D,
            ImageTarget::CubeFace(face) => glow::TEXTURE_CUBE_MAP_POSITIVE_X + face.min(5) as u32,
        }
    }
}

impl IntoGl<u32> for InternalFormat {
    fn into_gl(self) -> u32 {
        match self {
            InternalFormat::R8 => glow::R8,
            InternalFormat::Rg8 => glow::RG8,
            InternalFormat::Rgb8 => glow::RGB8,
            InternalFormat::Rgba8 => glow::RGBA8,
            InternalFormat::R16F => glow::R16F,
            InternalFormat::Rg16F => glow::RG16F,
            InternalFormat::Rgb16F => glow::RGB16F,
            InternalFormat::Rgba16F => glow::RGBA16F,
            InternalFormat::R32F => glow::R32F,
            InternalFormat::Rgb32F => glow::RGB32F,
            InternalFormat::Rgba32F => glow::RGBA32F,
            InternalFormat::Depth16 => glow::DEPTH_COMPONENT16,
            InternalFormat::Depth24 => glow::DEPTH_COMPONENT24,
            InternalFormat::Depth32F => glow::DEPTH_COMPONENT32F,
            InternalFormat::Depth24Stencil8 => glow::DEPTH24_STENCIL8,
        }
    }
}

impl IntoGl<u32> for PixelFormat {
    fn into_gl(self) -> u32 {
        match self {
            PixelFormat::Red => glow::RED,
            PixelFormat::Rg => glow::RG,
            PixelFormat::Rgb => glow::RGB,
            PixelFormat::Rgba => glow::RGBA,
            PixelFormat::Depth => glow::DEPTH_COMPONENT,
            PixelFormat::DepthStencil => glow::DEPTH_STENCIL,
        }
    }
}

impl IntoGl<u32> for ComponentType {
    fn into_gl(self) -> u32 {
        match self {
            ComponentType::U8 => glow::UNSIGNED_BYTE,
            ComponentType::U16 => glow::UNSIGNED_SHORT,
            ComponentType::F16 => glow::HALF_FLOAT,
            ComponentType::F32 => glow::FLOAT,
            ComponentType::U24_8 => glow::UNSIGNED_INT_24_8,
        }
    }
}

impl IntoGl<i32> for MinFilter {
    fn into_gl(self) -> i32 {
        (match self {
            MinFilter::Nearest => glow::NEAREST,
            MinFilter::Linear => glow::LINEAR,
            MinFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
            MinFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
            MinFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
            MinFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }) as i32
    }
}

impl IntoGl<i32> for MagFilter {
    fn into_gl(self) -> i32 {
        (match self {
            MagFilter::Nearest => glow::NEAREST,
            MagFilter::Linear => glow::LINEAR,
        }) as i32
    }
}

impl IntoGl<i32> for TextureWrap {
    fn into_gl(self) -> i32 {
        (match self {
            TextureWrap::Repeat => glow::REPEAT,
            TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
            TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
            TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
        }) as i32
    }
}

// --- Framebuffers ---

impl IntoGl<u32> for Attachment {
    fn into_gl(self) -> u32 {
        match self {
            Attachment::Color(i) => glow::COLOR_ATTACHMENT0 + i as u32,
            Attachment::Depth => glow::DEPTH_ATTACHMENT,
            Attachment::Stencil => glow::STENCIL_ATTACHMENT,
            Attachment::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
            Attachment::None => glow::NONE,
        }
    }
}

impl IntoGl<u32> for FramebufferTarget {
    fn into_gl(self) -> u32 {
        match self {
            FramebufferTarget::Both => glow::FRAMEBUFFER,
            FramebufferTarget::Read => glow::READ_FRAMEBUFFER,
            FramebufferTarget::Draw => glow::DRAW_FRAMEBUFFER,
        }
    }
}

impl IntoGl<u32> for BlitMask {
    fn into_gl(self) -> u32 {
        let mut bits = 0;
        if self.contains(BlitMask::COLOR) {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if self.contains(BlitMask::DEPTH) {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if self.contains(BlitMask::STENCIL) {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        bits
    }
}

impl IntoGl<u32> for ClearFlags {
    fn into_gl(self) -> u32 {
        let mut bits = 0;
        if self.contains(ClearFlags::COLOR) {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            bits |= glow::STENCIL_BUFFER_BIT;
        }
        bits
    }
}

impl IntoGl<u32> for BlitFilter {
    fn into_gl(self) -> u32 {
        match self {
            BlitFilter::Nearest => glow::NEAREST,
            BlitFilter::Linear => glow::LINEAR,
        }
    }
}

/// Maps a `glCheckFramebufferStatus` result.
pub fn framebuffer_status_from_gl(status: u32) -> FramebufferStatus {
    match status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
        glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
        other => FramebufferStatus::Unknown(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_faces_follow_gl_order() {
        let faces: Vec<u32> = (0..6).map(|f| ImageTarget::CubeFace(f).into_gl()).collect();
        assert_eq!(faces[0], glow::TEXTURE_CUBE_MAP_POSITIVE_X);
        assert_eq!(faces[5], glow::TEXTURE_CUBE_MAP_NEGATIVE_Z);
    }

    #[test]
    fn test_color_attachment_offsets() {
        let a: u32 = Attachment::Color(3).into_gl();
        assert_eq!(a, glow::COLOR_ATTACHMENT3);
    }

    #[test]
    fn test_masks() {
        let m: u32 = (BlitMask::COLOR | BlitMask::DEPTH).into_gl();
        assert_eq!(m, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }
}
