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

//! Debug lane - overlays shadow maps on the final image.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    math::{Mat4, Vec3},
    renderer::{FramebufferTarget, LightKind, Rect, RenderFlags},
};

use super::{
    shaders::{DEBUG_CUBE_FS, DEBUG_DEPTH_FS, DEBUG_QUAD_VS},
    FrameContext, LightId, RenderLane,
};
use crate::gpu::{ShaderProgram, SharedDevice};

/// A request to show a light's shadow map in a rectangle of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMapView {
    /// The light.
    pub light: LightId,
    /// Destination rectangle in output pixels, origin bottom-left.
    pub rect: Rect,
    /// Near plane used to linearize depth.
    pub near: f32,
    /// Far plane used to linearize depth, or the distance mapped to white
    /// for omni lights.
    pub far: f32,
}

/// Maps the `[-1, 1]` screen quad onto `rect` of an output of `size`.
pub fn rect_mvp(rect: Rect, size: (u32, u32)) -> Mat4 {
    let ortho = Mat4::orthographic(0.0, size.0 as f32, 0.0, size.1 as f32, -1.0, 1.0);
    let half = Vec3::new(rect.width as f32 * 0.5, rect.height as f32 * 0.5, 1.0);
    let center = Vec3::new(rect.x as f32 + half.x, rect.y as f32 + half.y, 0.0);
    ortho * Mat4::from_translation(center) * Mat4::from_scale(half)
}

/// Draws queued shadow map views over the presented frame.
///
/// Views are only drawn when the renderer runs with
/// [`RenderFlags::DEBUG_SHADOW_MAP`]; otherwise the queue is discarded.
/// 2D maps are shown as linearized depth, omni maps as the unwrapped
/// distance cubemap.
#[derive(Debug, Default)]
pub struct DebugLane {
    depth: Option<ShaderProgram>,
    cube: Option<ShaderProgram>,
    queue: Vec<ShadowMapView>,
}

impl DebugLane {
    /// Creates a new `DebugLane`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a view for the end of the current frame.
    pub fn queue_shadow_map(&mut self, view: ShadowMapView) {
        self.queue.push(view);
    }

    /// Number of queued views.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Lane for DebugLane {
    fn strategy_name(&self) -> &'static str {
        "ShadowMapDebug"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Debug
    }
}

impl RenderLane for DebugLane {
    fn on_initialize(&mut self, device: &SharedDevice) -> Result<(), LaneError> {
        self.depth = Some(ShaderProgram::new(device.clone(), DEBUG_QUAD_VS, DEBUG_DEPTH_FS)?);
        self.cube = Some(ShaderProgram::new(device.clone(), DEBUG_QUAD_VS, DEBUG_CUBE_FS)?);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        let views = std::mem::take(&mut self.queue);
        if views.is_empty() || !ctx.settings.flags.contains(RenderFlags::DEBUG_SHADOW_MAP) {
            return Ok(());
        }
        let (Some(depth), Some(cube)) = (self.depth.as_ref(), self.cube.as_ref()) else {
            return Err(LaneError::NotInitialized("ShadowMapDebug"));
        };

        let size = ctx.output_size;
        ctx.device.bind_framebuffer(FramebufferTarget::Both, ctx.output);
        ctx.device.set_viewport(Rect::from_size(size.0 as i32, size.1 as i32));
        ctx.device.set_depth_test(false);
        for view in &views {
            let Some(map) = ctx.lights.light(view.light).and_then(|l| {
                l.shadow_map().map(|m| (l.kind(), m))
            }) else {
                log::warn!("No shadow map to show for light {:?}", view.light);
                continue;
            };
            let (kind, map) = map;
            let Some(texture) = map.sampled_texture() else {
                continue;
            };
            let program = if kind == LightKind::Omni { cube } else { depth };
            program.bind();
            program.set_uniform("uMVP", rect_mvp(view.rect, size));
            if kind == LightKind::Omni {
                program.bind_sampler("uCubemap", texture);
                program.set_uniform("uMaxVal", view.far);
            } else {
                program.bind_sampler("uTexture", texture);
                program.set_uniform("uNear", view.near);
                program.set_uniform("uFar", view.far);
            }
            ctx.primitives.screen_quad.draw();
            program.unbind();
        }
        ctx.device.set_depth_test(true);
        Ok(())
    }

    fn on_shutdown(&mut self) {
        self.depth = None;
        self.cube = None;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use radiant_core::math::Vec4;

    #[test]
    fn test_rect_mvp_maps_quad_corners_to_rect() {
        let mvp = rect_mvp(Rect::new(0, 0, 100, 50), (200, 100));
        let lo = mvp * Vec4::new(-1.0, -1.0, 0.0, 1.0);
        let hi = mvp * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(lo.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(lo.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(hi.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(hi.y, 0.0, epsilon = 1e-5);
    }
}
