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

//! HDR scene lane - sky, then every scene batch with its material program.

use radiant_core::{
    lane::{Lane, LaneError, LaneKind},
    math::{Color, Mat4, Vec4},
    renderer::{
        BlendMode, ClearFlags, CullMode, LightKind, MaterialConfig, MaterialFlags, TextureTarget,
    },
};
use radiant_data::Material;

use super::{FrameContext, LightSet, RenderLane, SceneCall, Skybox, MAX_LIGHTS_PER_CALL};
use crate::gpu::{ShaderProgram, SharedDevice};

/// Uniform names of one element of the `uLights` array.
#[derive(Debug, Clone)]
struct LightUniforms {
    shadow_map: String,
    shadow_cubemap: String,
    color: String,
    position: String,
    direction: String,
    energy: String,
    max_distance: String,
    attenuation: String,
    inner_cutoff: String,
    outer_cutoff: String,
    texel_size: String,
    bias: String,
    kind: String,
    shadow: String,
    enabled: String,
    light_mvp: String,
}

impl LightUniforms {
    fn new(index: usize) -> Self {
        let field = |name: &str| format!("uLights[{index}].{name}");
        Self {
            shadow_map: field("shadowMap"),
            shadow_cubemap: field("shadowCubemap"),
            color: field("color"),
            position: field("position"),
            direction: field("direction"),
            energy: field("energy"),
            max_distance: field("maxDistance"),
            attenuation: field("attenuation"),
            inner_cutoff: field("innerCutOff"),
            outer_cutoff: field("outerCutOff"),
            texel_size: field("shadowMapTxlSz"),
            bias: field("shadowBias"),
            kind: field("type"),
            shadow: field("shadow"),
            enabled: field("enabled"),
            light_mvp: format!("uMatLightMVP[{index}]"),
        }
    }
}

/// The lane drawing the lit scene into the HDR target.
///
/// Color 0 receives the shaded color, color 1 the part above the bloom
/// threshold. Batches are traversed in material configuration order, so
/// blend, cull and program changes happen once per batch.
///
/// The viewport always covers the whole internal target, with or without
/// [`RenderFlags::ASPECT_KEEP`](radiant_core::renderer::RenderFlags::ASPECT_KEEP);
/// aspect keeping only affects the present blit.
#[derive(Debug)]
pub struct SceneLane {
    lights: Vec<LightUniforms>,
    initialized: bool,
}

impl Default for SceneLane {
    fn default() -> Self {
        Self {
            lights: (0..MAX_LIGHTS_PER_CALL).map(LightUniforms::new).collect(),
            initialized: false,
        }
    }
}

impl SceneLane {
    /// Creates a new `SceneLane`.
    pub fn new() -> Self {
        Self::default()
    }

    fn bind_frame(&self, ctx: &FrameContext<'_>, program: &ShaderProgram, config: MaterialConfig) {
        program.set_uniform("uViewPos", ctx.view_position);
        program.set_color("uColAmbient", ctx.environment.world.ambient, false);
        program.set_uniform("uBloomHdrThreshold", ctx.environment.bloom.hdr_threshold);
        if config.flags.contains(MaterialFlags::SKY_IBL) {
            program.set_uniform("uHasSkybox", ctx.skybox.is_some());
            if let Some(sky) = ctx.skybox {
                program.set_uniform("uQuatSkybox", sky.rotation_quat());
            }
        }
    }

    fn bind_sky(&self, program: &ShaderProgram, skybox: Option<&Skybox>, config: MaterialConfig) {
        if !config.flags.contains(MaterialFlags::SKY_IBL) {
            return;
        }
        if let Some(sky) = skybox {
            program.bind_sampler("uCubeIrradiance", sky.irradiance());
            program.bind_sampler("uCubePrefilter", sky.prefilter());
            program.bind_sampler("uTexBrdfLUT", sky.brdf_lut());
        }
    }

    fn bind_material(&self, ctx: &FrameContext<'_>, program: &ShaderProgram, material: &Material) {
        let ph = ctx.placeholders;
        let t2d = TextureTarget::Texture2D;
        program.bind_texture("uTexAlbedo", t2d, ph.or_white(material.albedo.texture));
        program.bind_texture("uTexMetalness", t2d, ph.or_white(material.metalness.texture));
        program.set_uniform("uValMetalness", material.metalness.value);
        program.bind_texture("uTexRoughness", t2d, ph.or_white(material.roughness.texture));
        program.set_uniform("uValRoughness", material.roughness.value);

        let flags = material.config.flags;
        if flags.contains(MaterialFlags::MAP_EMISSION) {
            program.bind_texture("uTexEmission", t2d, ph.or_black(material.emission.texture));
            program.set_color("uColEmission", material.emission.color, false);
            program.set_uniform("uValEmissionEnergy", material.emission.value);
        }
        if flags.contains(MaterialFlags::MAP_NORMAL) {
            program.bind_texture("uTexNormal", t2d, ph.or_black(material.normal.texture));
        }
        if flags.contains(MaterialFlags::MAP_AO) {
            program.bind_texture("uTexAO", t2d, ph.or_white(material.ao.texture));
            program.set_uniform("uValAOLightAffect", material.ao.value);
        }
        program.set_uniform("uTexCoordOffset", material.uv_offset);
        program.set_uniform("uTexCoordScale", material.uv_scale);
    }

    fn bind_lights(&self, ctx: &FrameContext<'_>, program: &ShaderProgram, lights: &LightSet) {
        let mut slot = 0;
        for id in lights.iter() {
            let Some(light) = ctx.lights.light(id) else {
                continue;
            };
            let names = &self.lights[slot];
            program.set_color(&names.color, light.color, false);
            program.set_uniform(&names.position, light.position());
            program.set_uniform(&names.direction, light.direction());
            program.set_uniform(&names.energy, light.energy);
            program.set_uniform(&names.max_distance, light.max_distance);
            program.set_uniform(&names.attenuation, light.attenuation);
            program.set_uniform(&names.inner_cutoff, light.inner_cutoff_cos());
            program.set_uniform(&names.outer_cutoff, light.outer_cutoff_cos());
            program.set_uniform(&names.bias, light.shadow_bias);
            program.set_uniform(&names.kind, light.kind().shader_id());
            program.set_uniform(&names.enabled, true);

            let map = light.shadow_map();
            program.set_uniform(&names.shadow, map.is_some());
            if let Some(map) = map {
                program.set_uniform(&names.texel_size, map.texel_size());
                if let Some(texture) = map.sampled_texture() {
                    let sampler = if light.kind() == LightKind::Omni {
                        &names.shadow_cubemap
                    } else {
                        &names.shadow_map
                    };
                    program.bind_sampler(sampler, texture);
                }
                if light.kind() != LightKind::Omni {
                    program.set_uniform(&names.light_mvp, light.view_projection());
                }
            }
            slot += 1;
        }
        for names in &self.lights[slot..] {
            program.set_uniform(&names.enabled, false);
        }
    }

    fn draw_call(
        &self,
        ctx: &FrameContext<'_>,
        program: &ShaderProgram,
        config: MaterialConfig,
        call: &SceneCall,
    ) -> (u32, u32) {
        let view_proj: Mat4 = ctx.projection * ctx.view;
        let quad = (ctx.primitives.unit_quad.id(), ctx.primitives.unit_quad.triangle_count());
        let albedo = call.material.albedo.color;
        let mut draws = 0;
        let mut triangles = 0;

        program.unbind_textures();
        self.bind_sky(program, ctx.skybox, config);
        self.bind_material(ctx, program, &call.material);
        self.bind_lights(ctx, program, &call.lights);

        call.source.for_each_draw(call.transform, quad, |mesh, tris, world, tint| {
            let color = match tint {
                Some(tint) => modulate(albedo, tint),
                None => albedo.to_vec4(),
            };
            program.set_uniform("uColAlbedo", color);
            program.set_uniform("uMatModel", world);
            program.set_uniform("uMatNormal", world.normal_matrix());
            program.set_uniform("uMatMVP", view_proj * world);
            ctx.device.draw_mesh(mesh);
            draws += 1;
            triangles += tris as u32;
        });
        (draws, triangles)
    }
}

fn modulate(color: Color, tint: Color) -> Vec4 {
    let a = color.to_vec4();
    let b = tint.to_vec4();
    Vec4::new(a.x * b.x, a.y * b.y, a.z * b.z, a.w * b.w)
}

impl Lane for SceneLane {
    fn strategy_name(&self) -> &'static str {
        "LitForward"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Render
    }
}

impl RenderLane for SceneLane {
    fn on_initialize(&mut self, _device: &SharedDevice) -> Result<(), LaneError> {
        // Material programs live in the shader cache.
        self.initialized = true;
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), LaneError> {
        if !self.initialized {
            return Err(LaneError::NotInitialized("LitForward"));
        }
        let targets = ctx.targets;
        let scene = &targets.scene;
        scene.begin();
        match ctx.skybox {
            Some(sky) => {
                ctx.device.clear(ClearFlags::DEPTH, Color::BLANK);
                sky.draw(ctx.view, ctx.projection);
                ctx.stats.skybox_drawn = true;
            }
            None => {
                ctx.device
                    .clear(ClearFlags::COLOR | ClearFlags::DEPTH, ctx.environment.world.background);
            }
        }

        let mut result = Ok(());
        let mut draws = 0;
        let mut triangles = 0;
        let mut batches = 0;
        for (config, calls) in ctx.scene_batches.iter() {
            let key = config.shader_key();
            if let Err(e) = ctx.shaders.register(key) {
                result = Err(e.into());
                break;
            }
            let Some(program) = ctx.shaders.get(&key) else {
                continue;
            };
            ctx.device.set_blend_mode(config.blend);
            ctx.device.set_cull_mode(config.cull);
            program.bind();
            self.bind_frame(ctx, program, config);
            for call in calls {
                let (d, t) = self.draw_call(ctx, program, config, call);
                draws += d;
                triangles += t;
            }
            program.unbind();
            batches += 1;
        }

        ctx.device.set_blend_mode(BlendMode::default());
        ctx.device.set_cull_mode(CullMode::default());
        scene.end();

        ctx.stats.draw_calls += draws;
        ctx.stats.triangles_rendered += triangles;
        ctx.stats.scene_batches += batches;
        ctx.scene_batches.clear_all();
        result
    }

    fn on_shutdown(&mut self) {
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_names_index_the_array() {
        let names = LightUniforms::new(3);
        assert_eq!(names.color, "uLights[3].color");
        assert_eq!(names.shadow_cubemap, "uLights[3].shadowCubemap");
        assert_eq!(names.light_mvp, "uMatLightMVP[3]");
    }

    #[test]
    fn test_modulate_multiplies_channels() {
        let v = modulate(Color::WHITE, Color::new(255, 0, 255, 0));
        assert_eq!(v, Vec4::new(1.0, 0.0, 1.0, 0.0));
    }
}
