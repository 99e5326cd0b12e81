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

//! Present lane - copies the composited frame to its destination.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    renderer::{Attachment, RenderFlags},
};

use super::{FrameContext, RenderLane};
use crate::gpu::SharedDevice;

/// Blits the post-FX color and the scene depth into the output framebuffer.
///
/// With `ASPECT_KEEP` the image is letterboxed into the output, otherwise
/// it is stretched over it. Color uses linear filtering with `BLIT_LINEAR`;
/// depth always uses nearest.
#[derive(Debug, Default)]
pub struct PresentLane;

impl PresentLane {
    /// Creates a new `PresentLane`.
    pub fn new() -> Self {
        Self
    }
}

impl Lane for PresentLane {
    fn strategy_name(&self) -> &'static str {
        "Blit"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Present
    }
}

impl RenderLane for PresentLane {
    fn on_initialize(&mut self, _device: &SharedDevice) -> Result<(), LaneError> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        let targets = ctx.targets;
        let flags = ctx.settings.flags;
        let linear = flags.contains(RenderFlags::BLIT_LINEAR);
        let (dst, size) = (ctx.output, ctx.output_size);

        if flags.contains(RenderFlags::ASPECT_KEEP) {
            targets
                .post_fx
                .blit_aspect_keep(dst, size, Some(Attachment::COLOR_0), false, linear);
            targets.scene.blit_aspect_keep(dst, size, None, true, false);
        } else {
            targets
                .post_fx
                .blit_aspect_expand(dst, size, Some(Attachment::COLOR_0), false, linear);
            targets.scene.blit_aspect_expand(dst, size, None, true, false);
        }
        Ok(())
    }

    fn on_shutdown(&mut self) {}
}
