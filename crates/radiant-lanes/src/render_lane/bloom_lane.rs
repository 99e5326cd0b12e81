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

//! Bloom lane - separable gaussian blur of the bright pass.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    renderer::{Attachment, BloomMode},
};

use super::{shaders::{BLUR_FS, SCREEN_VS}, FrameContext, RenderLane};
use crate::gpu::{ShaderProgram, SharedDevice};

/// Blurs the scene's bright pass through the two half-resolution targets.
///
/// Even iterations blur horizontally, odd ones vertically. The first
/// iteration reads color 1 of the scene target, every later one reads the
/// target written by the previous iteration.
#[derive(Debug, Default)]
pub struct BloomLane {
    blur: Option<ShaderProgram>,
}

impl BloomLane {
    /// Creates a new `BloomLane`.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Index of the ping-pong target written by `iteration`.
pub fn ping_pong_index(iteration: u32) -> usize {
    (iteration % 2) as usize
}

impl Lane for BloomLane {
    fn strategy_name(&self) -> &'static str {
        "GaussianBloom"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Bloom
    }
}

impl RenderLane for BloomLane {
    fn on_initialize(&mut self, device: &SharedDevice) -> Result<(), LaneError> {
        self.blur = Some(ShaderProgram::new(device.clone(), SCREEN_VS, BLUR_FS)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        let program = self
            .blur
            .as_ref()
            .ok_or(LaneError::NotInitialized("GaussianBloom"))?;
        ctx.bloom_texture = None;
        let environment = ctx.environment;
        let bloom = &environment.bloom;
        if bloom.mode == BloomMode::Disabled {
            return Ok(());
        }

        let targets = ctx.targets;
        let bright = targets
            .scene
            .attachment(Attachment::COLOR_1)
            .ok_or(LaneError::MissingInput("scene bright pass"))?;
        if bloom.iterations == 0 {
            ctx.bloom_texture = Some(bright.id());
            return Ok(());
        }

        program.bind();
        for i in 0..bloom.iterations {
            let target = &targets.blur[ping_pong_index(i)];
            let source = if i == 0 {
                Some(bright)
            } else {
                targets.blur[ping_pong_index(i + 1)].attachment(Attachment::COLOR_0)
            };
            let source = source.ok_or(LaneError::MissingInput("bloom source"))?;

            target.begin();
            program.unbind_textures();
            program.bind_sampler("uTexture", source);
            program.set_uniform("uHorizontal", i % 2 == 0);
            ctx.primitives.screen_quad.draw();
        }
        program.unbind();
        targets.blur[0].end();

        let last = &targets.blur[ping_pong_index(bloom.iterations - 1)];
        ctx.bloom_texture = last.attachment(Attachment::COLOR_0).map(|t| t.id());
        ctx.stats.bloom_passes += bloom.iterations;
        log::trace!("Bloom blurred in {} passes", bloom.iterations);
        Ok(())
    }

    fn on_shutdown(&mut self) {
        self.blur = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_pong_alternates() {
        let indices: Vec<usize> = (0..4).map(ping_pong_index).collect();
        assert_eq!(indices, vec![0, 1, 0, 1]);
    }
}
