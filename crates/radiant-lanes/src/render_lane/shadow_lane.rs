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

//! Shadow pass lane implementation - renders depth for every shadowed light.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    math::{Color, Mat4},
    renderer::{Attachment, BlendMode, ClearFlags, LightKind},
};

use super::{
    shaders::{DEPTH_CUBE_FS, DEPTH_CUBE_VS, DEPTH_FS, DEPTH_VS},
    FrameContext, Light, RenderLane, ShadowCall,
};
use crate::gpu::{ShaderProgram, SharedDevice};

/// A rendering lane dedicated to producing shadow maps.
///
/// Directional and spot lights render depth into a 2D map from the light's
/// view. Omni lights render the distance to the light into each face of a
/// cubemap, which is why color blending is disabled for the whole pass.
#[derive(Debug, Default)]
pub struct ShadowLane {
    depth: Option<ShaderProgram>,
    depth_cube: Option<ShaderProgram>,
}

impl ShadowLane {
    /// Creates a new `ShadowLane`.
    pub fn new() -> Self {
        Self::default()
    }

    fn render_light(
        &self,
        ctx: &FrameContext<'_>,
        light: &Light,
        calls: &[ShadowCall],
    ) -> Result<u32, LaneError> {
        let Some(map) = light.shadow_map() else {
            return Ok(0);
        };
        let target = map.target();
        let quad = (ctx.primitives.unit_quad.id(), ctx.primitives.unit_quad.triangle_count());
        let projection = light.projection_matrix();
        let mut draws = 0;

        target.begin();
        if light.kind() == LightKind::Omni {
            let program = self
                .depth_cube
                .as_ref()
                .ok_or(LaneError::NotInitialized("ShadowPass"))?;
            program.bind();
            program.set_uniform("uViewPos", light.position());
            program.set_uniform("uFar", light.max_distance);
            for face in 0..6 {
                target.bind_face(Attachment::COLOR_0, face);
                ctx.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Color::WHITE);
                let view_proj = projection * light.face_view_matrix(face);
                for call in calls {
                    call.source.for_each_draw(call.transform, quad, |mesh, _, world, _| {
                        program.set_uniform("uMatModel", world);
                        program.set_uniform("uMatMVP", view_proj * world);
                        ctx.device.draw_mesh(mesh);
                        draws += 1;
                    });
                }
            }
            program.unbind();
        } else {
            let program = self
                .depth
                .as_ref()
                .ok_or(LaneError::NotInitialized("ShadowPass"))?;
            program.bind();
            ctx.device.clear(ClearFlags::DEPTH, Color::WHITE);
            let view_proj: Mat4 = projection * light.view_matrix();
            for call in calls {
                call.source.for_each_draw(call.transform, quad, |mesh, _, world, _| {
                    program.set_uniform("uMatMVP", view_proj * world);
                    ctx.device.draw_mesh(mesh);
                    draws += 1;
                });
            }
            program.unbind();
        }
        target.end();
        Ok(draws)
    }
}

impl Lane for ShadowLane {
    fn strategy_name(&self) -> &'static str {
        "ShadowPass"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }
}

impl RenderLane for ShadowLane {
    fn on_initialize(&mut self, device: &SharedDevice) -> Result<(), LaneError> {
        self.depth = Some(ShaderProgram::new(device.clone(), DEPTH_VS, DEPTH_FS)?);
        self.depth_cube = Some(ShaderProgram::new(device.clone(), DEPTH_CUBE_VS, DEPTH_CUBE_FS)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        if self.depth.is_none() || self.depth_cube.is_none() {
            return Err(LaneError::NotInitialized("ShadowPass"));
        }
        if ctx.render_shadows && !ctx.shadow_batches.is_empty() {
            ctx.device.set_blend_mode(BlendMode::Disabled);
            let mut result = Ok(());
            let mut maps = 0;
            let mut draws = 0;
            for (id, calls) in ctx.shadow_batches.iter() {
                let Some(light) = ctx.lights.light(id).filter(|l| l.has_shadow()) else {
                    continue;
                };
                match self.render_light(ctx, light, calls) {
                    Ok(n) => {
                        draws += n;
                        maps += 1;
                    }
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                }
            }
            ctx.device.set_blend_mode(BlendMode::default());
            ctx.stats.shadow_maps_rendered += maps;
            ctx.stats.shadow_draw_calls += draws;
            log::trace!("Rendered {} shadow maps with {} draws", maps, draws);
            result?;
        }
        ctx.shadow_batches.clear_all();
        Ok(())
    }

    fn on_shutdown(&mut self) {
        self.depth = None;
        self.depth_cube = None;
    }
}
