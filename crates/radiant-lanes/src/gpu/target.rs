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

//! Render targets: a framebuffer with the textures it renders into.

use std::collections::BTreeMap;
use std::fmt;

use radiant_core::renderer::{
    Attachment, BlitFilter, BlitMask, FramebufferId, Rect, ResourceError, TextureFormat,
    TextureTarget,
};

use super::{Framebuffer, SharedDevice, Texture};

/// Destination rectangle of a blit that stretches `content` over `screen`.
pub fn expand_rect(screen: (u32, u32)) -> Rect {
    Rect::from_size(screen.0 as i32, screen.1 as i32)
}

/// Destination rectangle of a blit that fits `content` inside `screen`
/// while keeping its aspect ratio, centered with letterbox bars.
pub fn letterbox_rect(content: (u32, u32), screen: (u32, u32)) -> Rect {
    let (sw, sh) = (screen.0.max(1) as f32, screen.1.max(1) as f32);
    let content_ratio = content.0.max(1) as f32 / content.1.max(1) as f32;
    let screen_ratio = sw / sh;

    if content_ratio > screen_ratio {
        // Wider than the screen: bars on top and bottom.
        let height = (sw / content_ratio) as i32;
        Rect::new(0, (sh as i32 - height) / 2, sw as i32, height)
    } else {
        let width = (sh * content_ratio) as i32;
        Rect::new((sw as i32 - width) / 2, 0, width, sh as i32)
    }
}

/// A framebuffer that owns its texture attachments.
pub struct RenderTarget {
    device: SharedDevice,
    framebuffer: Framebuffer,
    attachments: BTreeMap<Attachment, Texture>,
    width: u32,
    height: u32,
}

impl fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTarget")
            .field("framebuffer", &self.framebuffer.id())
            .field("attachments", &self.attachments.keys().collect::<Vec<_>>())
            .field("size", &(self.width, self.height))
            .finish()
    }
}

impl RenderTarget {
    /// Creates a target without attachments.
    pub fn new(device: SharedDevice, width: u32, height: u32) -> Result<Self, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::InvalidDimensions { width, height });
        }
        let framebuffer = Framebuffer::new(device.clone())?;
        Ok(Self {
            device,
            framebuffer,
            attachments: BTreeMap::new(),
            width,
            height,
        })
    }

    /// Creates a texture of the target's size and attaches it.
    ///
    /// Cubemaps are created but not attached: render into them one face at
    /// a time with [`bind_face`](Self::bind_face).
    pub fn create_attachment(
        &mut self,
        attachment: Attachment,
        target: TextureTarget,
        format: TextureFormat,
    ) -> Result<&mut Texture, ResourceError> {
        if attachment == Attachment::None {
            return Err(ResourceError::AllocationFailed(
                "render target attachment cannot be None".into(),
            ));
        }
        let texture = match target {
            TextureTarget::CubeMap => {
                Texture::new_cube(self.device.clone(), None, self.width, format)?
            }
            _ => Texture::new_2d(self.device.clone(), None, self.width, self.height, format)?,
        };
        if target != TextureTarget::CubeMap {
            self.framebuffer.attach_texture(attachment, &texture, 0);
            if cfg!(debug_assertions) && attachment.is_color() {
                self.framebuffer.check_status()?;
            }
        }
        self.attachments.insert(attachment, texture);
        self.attachments
            .get_mut(&attachment)
            .ok_or_else(|| ResourceError::AllocationFailed("attachment vanished".into()))
    }

    /// The underlying framebuffer.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// The framebuffer handle.
    pub fn id(&self) -> FramebufferId {
        self.framebuffer.id()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of one texel in UV units.
    pub fn texel_size(&self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// The texture attached at `attachment`.
    pub fn attachment(&self, attachment: Attachment) -> Option<&Texture> {
        self.attachments.get(&attachment)
    }

    /// Mutable access to an attachment, to change its sampling state.
    pub fn attachment_mut(&mut self, attachment: Attachment) -> Option<&mut Texture> {
        self.attachments.get_mut(&attachment)
    }

    /// Selects the draw buffers.
    pub fn set_draw_buffers(&self, attachments: &[Attachment]) {
        self.framebuffer.set_draw_buffers(attachments);
    }

    /// Selects a single draw buffer.
    pub fn set_draw_buffer(&self, attachment: Attachment) {
        self.framebuffer.set_draw_buffer(attachment);
    }

    /// Selects the read buffer.
    pub fn set_read_buffer(&self, attachment: Attachment) {
        self.framebuffer.set_read_buffer(attachment);
    }

    /// Binds the framebuffer and sets the viewport to the full target.
    pub fn begin(&self) {
        self.framebuffer.bind();
        self.device
            .set_viewport(Rect::from_size(self.width as i32, self.height as i32));
    }

    /// Binds the default framebuffer.
    pub fn end(&self) {
        Framebuffer::unbind(&self.device);
    }

    /// Routes color output 0 into one face of a cubemap attachment.
    pub fn bind_face(&self, attachment: Attachment, face: usize) {
        match self.attachments.get(&attachment) {
            Some(texture) if texture.target() == TextureTarget::CubeMap => {
                self.framebuffer
                    .attach_cube_face(Attachment::COLOR_0, texture, face, 0);
                self.framebuffer.set_draw_buffer(Attachment::COLOR_0);
            }
            _ => debug_assert!(false, "bind_face called on a non-cubemap attachment"),
        }
    }

    /// Checks framebuffer completeness.
    pub fn check_status(&self) -> Result<(), ResourceError> {
        self.framebuffer.check_status()
    }

    /// Reallocates every attachment at a new size, discarding content.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::InvalidDimensions { width, height });
        }
        self.width = width;
        self.height = height;
        for texture in self.attachments.values_mut() {
            let h = if texture.target() == TextureTarget::CubeMap { width } else { height };
            texture.resize(width, h, 1)?;
        }
        Ok(())
    }

    /// Blits the whole target over the whole destination.
    ///
    /// `color` selects the attachment read for the color copy; `None` skips it.
    /// Depth copies always use nearest filtering.
    pub fn blit_aspect_expand(
        &self,
        dst: Option<FramebufferId>,
        dst_size: (u32, u32),
        color: Option<Attachment>,
        depth: bool,
        linear: bool,
    ) {
        self.blit(dst, expand_rect(dst_size), color, depth, linear);
    }

    /// Blits the whole target into the largest centered rectangle of the
    /// destination that keeps the target's aspect ratio.
    pub fn blit_aspect_keep(
        &self,
        dst: Option<FramebufferId>,
        dst_size: (u32, u32),
        color: Option<Attachment>,
        depth: bool,
        linear: bool,
    ) {
        let rect = letterbox_rect((self.width, self.height), dst_size);
        self.blit(dst, rect, color, depth, linear);
    }

    fn blit(
        &self,
        dst: Option<FramebufferId>,
        dst_rect: Rect,
        color: Option<Attachment>,
        depth: bool,
        linear: bool,
    ) {
        let src_rect = Rect::from_size(self.width as i32, self.height as i32);
        if let Some(attachment) = color {
            self.framebuffer.set_read_buffer(attachment);
            let filter = if linear { BlitFilter::Linear } else { BlitFilter::Nearest };
            self.device.blit_framebuffer(
                Some(self.id()),
                dst,
                src_rect,
                dst_rect,
                BlitMask::COLOR,
                filter,
            );
        }
        if depth {
            self.device.blit_framebuffer(
                Some(self.id()),
                dst,
                src_rect,
                dst_rect,
                BlitMask::DEPTH,
                BlitFilter::Nearest,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_wide_content_on_square_screen() {
        let r = letterbox_rect((1920, 1080), (1000, 1000));
        assert_eq!(r.width, 1000);
        assert_eq!(r.height, 562);
        assert_eq!(r.y, (1000 - 562) / 2);
        assert_eq!(r.x, 0);
    }

    #[test]
    fn test_letterbox_tall_content_gets_side_bars() {
        let r = letterbox_rect((800, 1600), (1600, 800));
        assert_eq!(r.height, 800);
        assert_eq!(r.width, 400);
        assert_eq!(r.x, 600);
    }

    #[test]
    fn test_same_aspect_fills_screen() {
        let r = letterbox_rect((640, 360), (1280, 720));
        assert_eq!(r, Rect::new(0, 0, 1280, 720));
    }
}
