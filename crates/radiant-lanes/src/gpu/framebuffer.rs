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

//! Framebuffer and renderbuffer objects.

use std::fmt;

use radiant_core::renderer::{
    Attachment, FramebufferId, FramebufferStatus, FramebufferTarget, ImageTarget, InternalFormat,
    RenderbufferId, ResourceError, TextureTarget,
};

use super::{SharedDevice, Texture};

/// An owned renderbuffer.
pub struct Renderbuffer {
    device: SharedDevice,
    id: RenderbufferId,
    format: InternalFormat,
    size: (u32, u32),
}

impl fmt::Debug for Renderbuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderbuffer")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("size", &self.size)
            .finish()
    }
}

impl Renderbuffer {
    /// Creates a renderbuffer with storage of the given format and size.
    pub fn new(
        device: SharedDevice,
        format: InternalFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, ResourceError> {
        let id = device.create_renderbuffer()?;
        let mut rbo = Self {
            device,
            id,
            format,
            size: (0, 0),
        };
        rbo.resize(width, height);
        Ok(rbo)
    }

    /// The device handle.
    pub fn id(&self) -> RenderbufferId {
        self.id
    }

    /// The current storage size.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Reallocates storage.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.device.renderbuffer_storage(self.id, self.format, width, height);
        self.size = (width, height);
    }
}

impl Drop for Renderbuffer {
    fn drop(&mut self) {
        self.device.destroy_renderbuffer(self.id);
    }
}

/// An owned framebuffer object.
///
/// Attachments are not owned; the caller keeps the textures and
/// renderbuffers alive for as long as they are attached.
pub struct Framebuffer {
    device: SharedDevice,
    id: FramebufferId,
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Framebuffer").field(&self.id).finish()
    }
}

impl Framebuffer {
    /// Creates an empty framebuffer.
    pub fn new(device: SharedDevice) -> Result<Self, ResourceError> {
        let id = device.create_framebuffer()?;
        log::debug!("Created framebuffer {:?}", id);
        Ok(Self { device, id })
    }

    /// The device handle.
    pub fn id(&self) -> FramebufferId {
        self.id
    }

    /// Attaches mip `level` of a 2D, 1D or 3D texture.
    pub fn attach_texture(&self, attachment: Attachment, texture: &Texture, level: u32) {
        let image = match texture.target() {
            TextureTarget::Texture1D => ImageTarget::Texture1D,
            TextureTarget::Texture3D => ImageTarget::Texture3D,
            TextureTarget::CubeMap => ImageTarget::CubeFace(0),
            TextureTarget::Texture2D => ImageTarget::Texture2D,
        };
        self.device
            .attach_texture(self.id, attachment, texture.id(), image, level);
    }

    /// Attaches one face of a cubemap at mip `level`.
    pub fn attach_cube_face(&self, attachment: Attachment, texture: &Texture, face: usize, level: u32) {
        debug_assert!(face < 6, "cube face index out of range");
        self.device.attach_texture(
            self.id,
            attachment,
            texture.id(),
            ImageTarget::CubeFace(face),
            level,
        );
    }

    /// Attaches a renderbuffer.
    pub fn attach_renderbuffer(&self, attachment: Attachment, rbo: &Renderbuffer) {
        self.device.attach_renderbuffer(self.id, attachment, rbo.id());
    }

    /// Selects a single draw buffer.
    pub fn set_draw_buffer(&self, attachment: Attachment) {
        self.device.set_draw_buffers(self.id, &[attachment]);
    }

    /// Selects the draw buffers written by fragment outputs, in order.
    pub fn set_draw_buffers(&self, attachments: &[Attachment]) {
        self.device.set_draw_buffers(self.id, attachments);
    }

    /// Selects the read buffer used by blits.
    pub fn set_read_buffer(&self, attachment: Attachment) {
        self.device.set_read_buffer(self.id, attachment);
    }

    /// Binds this framebuffer for drawing and reading.
    pub fn bind(&self) {
        self.device
            .bind_framebuffer(FramebufferTarget::Both, Some(self.id));
    }

    /// Binds the default framebuffer.
    pub fn unbind(device: &SharedDevice) {
        device.bind_framebuffer(FramebufferTarget::Both, None);
    }

    /// The completeness status.
    pub fn status(&self) -> FramebufferStatus {
        self.device.framebuffer_status(self.id)
    }

    /// True when the framebuffer can be rendered to.
    pub fn is_complete(&self) -> bool {
        self.status() == FramebufferStatus::Complete
    }

    /// Fails with [`ResourceError::FramebufferIncomplete`] unless complete.
    pub fn check_status(&self) -> Result<(), ResourceError> {
        match self.status() {
            FramebufferStatus::Complete => Ok(()),
            status => {
                log::error!("Framebuffer {:?} incomplete: {:?}", self.id, status);
                Err(ResourceError::FramebufferIncomplete(status))
            }
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.device.destroy_framebuffer(self.id);
    }
}
