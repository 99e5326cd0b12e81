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

//! Post-processing lane - composites bloom, fog, tonemapping and color grading.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    math::Color,
    renderer::{Attachment, BloomMode, ClearFlags, FogMode, TextureTarget},
};

use super::{shaders::{POSTFX_FS, SCREEN_VS}, FrameContext, RenderLane};
use crate::gpu::{ShaderProgram, SharedDevice};

/// Resolves the HDR scene into the LDR post-FX target.
#[derive(Debug, Default)]
pub struct PostFxLane {
    program: Option<ShaderProgram>,
}

impl PostFxLane {
    /// Creates a new `PostFxLane`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lane for PostFxLane {
    fn strategy_name(&self) -> &'static str {
        "PostFx"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::PostProcess
    }
}

impl RenderLane for PostFxLane {
    fn on_initialize(&mut self, device: &SharedDevice) -> Result<(), LaneError> {
        self.program = Some(ShaderProgram::new(device.clone(), SCREEN_VS, POSTFX_FS)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        let program = self
            .program
            .as_ref()
            .ok_or(LaneError::NotInitialized("PostFx"))?;
        let targets = ctx.targets;
        let env = ctx.environment;
        let hdr = targets
            .scene
            .attachment(Attachment::COLOR_0)
            .ok_or(LaneError::MissingInput("scene color"))?;
        let depth = targets
            .scene
            .attachment(Attachment::Depth)
            .ok_or(LaneError::MissingInput("scene depth"))?;

        targets.post_fx.begin();
        ctx.device.clear(ClearFlags::COLOR, Color::BLACK);
        program.bind();
        program.bind_sampler("uTexSceneHDR", hdr);
        program.bind_sampler("uTexSceneDepth", depth);

        match ctx.bloom_texture {
            Some(bloom) if env.bloom.mode != BloomMode::Disabled => {
                program.set_uniform("uBloomMode", env.bloom.mode.shader_id());
                program.set_uniform("uBloomIntensity", env.bloom.intensity);
                program.bind_texture("uTexBloomBlurHDR", TextureTarget::Texture2D, bloom);
            }
            _ => program.set_uniform("uBloomMode", BloomMode::Disabled.shader_id()),
        }

        program.set_uniform("uFogMode", env.fog.mode.shader_id());
        match env.fog.mode {
            FogMode::Disabled => {}
            FogMode::Linear => {
                program.set_color("uFogColor", env.fog.color, false);
                program.set_uniform("uFogStart", env.fog.start);
                program.set_uniform("uFogEnd", env.fog.end);
            }
            FogMode::Exp | FogMode::Exp2 => {
                program.set_color("uFogColor", env.fog.color, false);
                program.set_uniform("uFogDensity", env.fog.density);
            }
        }

        program.set_uniform("uTonemapper", env.tonemap.mode.shader_id());
        program.set_uniform("uExposure", env.tonemap.exposure);
        program.set_uniform("uWhite", env.tonemap.white);

        program.set_uniform("uBrightness", env.adjustments.brightness);
        program.set_uniform("uContrast", env.adjustments.contrast);
        program.set_uniform("uSaturation", env.adjustments.saturation);

        program.set_uniform("uNear", ctx.near);
        program.set_uniform("uFar", ctx.far);

        ctx.primitives.screen_quad.draw();
        program.unbind();
        targets.post_fx.end();
        Ok(())
    }

    fn on_shutdown(&mut self) {
        self.program = None;
    }
}
