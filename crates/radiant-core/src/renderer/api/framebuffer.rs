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

//! Framebuffer attachment points, blits and status codes.

use serde::{Deserialize, Serialize};

/// Maximum number of color attachments a framebuffer exposes.
pub const MAX_COLOR_ATTACHMENTS: u8 = 10;

/// An attachment point of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attachment {
    /// Color attachment `0..=9`.
    Color(u8),
    /// Depth attachment.
    Depth,
    /// Stencil attachment.
    Stencil,
    /// Combined depth and stencil attachment.
    DepthStencil,
    /// No attachment; disables drawing or reading.
    None,
}

impl Attachment {
    /// Shorthand for the first color attachment.
    pub const COLOR_0: Self = Attachment::Color(0);
    /// Shorthand for the second color attachment.
    pub const COLOR_1: Self = Attachment::Color(1);

    /// True for color slots.
    pub fn is_color(&self) -> bool {
        matches!(self, Attachment::Color(_))
    }
}

/// Binding point used by [`RenderDevice::bind_framebuffer`](crate::renderer::RenderDevice::bind_framebuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Both read and draw.
    Both,
    /// Read only (blit source).
    Read,
    /// Draw only (blit destination).
    Draw,
}

/// Completeness status reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    /// Ready for rendering.
    Complete,
    /// An attachment is not renderable.
    IncompleteAttachment,
    /// No image is attached.
    MissingAttachment,
    /// A draw buffer points to an empty slot.
    IncompleteDrawBuffer,
    /// The read buffer points to an empty slot.
    IncompleteReadBuffer,
    /// Attachments use mismatched sample counts.
    IncompleteMultisample,
    /// The combination of formats is not supported.
    Unsupported,
    /// The default framebuffer does not exist.
    Undefined,
    /// Any other driver value.
    Unknown(u32),
}

radiant_bitflags! {
    /// Buffers copied by a blit.
    pub struct BlitMask: u32 {
        /// Color buffer.
        const COLOR = 1 << 0;
        /// Depth buffer.
        const DEPTH = 1 << 1;
        /// Stencil buffer.
        const STENCIL = 1 << 2;
    }
}

/// Filter used when a blit scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlitFilter {
    /// Nearest texel, required for depth.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

/// A rectangle in window coordinates (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }
}
