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

//! Internal render targets shared by the frame passes.

use radiant_core::renderer::{Attachment, ResourceError, TextureFormat, TextureTarget, TextureWrap};

use crate::gpu::{RenderTarget, SharedDevice, TextureFilter};

/// Every offscreen target of a frame, sized to the internal resolution.
#[derive(Debug)]
pub struct FrameTargets {
    /// HDR scene: color 0 is lit color, color 1 the bright pass, plus depth.
    pub scene: RenderTarget,
    /// LDR output of the post-processing composite.
    pub post_fx: RenderTarget,
    /// Half-resolution ping-pong pair of the bloom blur.
    pub blur: [RenderTarget; 2],
}

impl FrameTargets {
    /// Creates the targets for an internal resolution of `width` x `height`.
    pub fn new(device: &SharedDevice, width: u32, height: u32) -> Result<Self, ResourceError> {
        let mut scene = RenderTarget::new(device.clone(), width, height)?;
        for attachment in [Attachment::COLOR_0, Attachment::COLOR_1] {
            scene
                .create_attachment(attachment, TextureTarget::Texture2D, TextureFormat::RGBA16F)?
                .set_filter(TextureFilter::Bilinear);
        }
        scene
            .create_attachment(Attachment::Depth, TextureTarget::Texture2D, TextureFormat::DEPTH24)?
            .set_filter(TextureFilter::Nearest);
        scene.set_draw_buffers(&[Attachment::COLOR_0, Attachment::COLOR_1]);
        scene.check_status()?;

        let mut post_fx = RenderTarget::new(device.clone(), width, height)?;
        post_fx
            .create_attachment(Attachment::COLOR_0, TextureTarget::Texture2D, TextureFormat::RGBA8)?
            .set_filter(TextureFilter::Bilinear);
        post_fx.set_draw_buffer(Attachment::COLOR_0);
        post_fx.check_status()?;

        let (bw, bh) = blur_size(width, height);
        let blur = [Self::blur_target(device, bw, bh)?, Self::blur_target(device, bw, bh)?];

        log::debug!("Created frame targets at {}x{}", width, height);
        Ok(Self {
            scene,
            post_fx,
            blur,
        })
    }

    fn blur_target(device: &SharedDevice, width: u32, height: u32) -> Result<RenderTarget, ResourceError> {
        let mut target = RenderTarget::new(device.clone(), width, height)?;
        let color =
            target.create_attachment(Attachment::COLOR_0, TextureTarget::Texture2D, TextureFormat::RGB16F)?;
        color.set_filter(TextureFilter::Bilinear);
        color.set_wrap(TextureWrap::ClampToEdge);
        target.set_draw_buffer(Attachment::COLOR_0);
        target.check_status()?;
        Ok(target)
    }

    /// The internal resolution.
    pub fn size(&self) -> (u32, u32) {
        (self.scene.width(), self.scene.height())
    }

    /// Reallocates every target. Content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ResourceError> {
        if (width, height) == self.size() {
            return Ok(());
        }
        self.scene.resize(width, height)?;
        self.post_fx.resize(width, height)?;
        let (bw, bh) = blur_size(width, height);
        for target in &mut self.blur {
            target.resize(bw, bh)?;
        }
        log::debug!("Resized frame targets to {}x{}", width, height);
        Ok(())
    }
}

/// Size of the bloom blur targets for an internal resolution.
pub fn blur_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}
