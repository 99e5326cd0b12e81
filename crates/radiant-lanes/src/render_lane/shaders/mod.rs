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

//! Built-in GLSL sources of the render lanes.
//!
//! Every source targets `#version 330 core`. The material sources are
//! templates: the [`MaterialShaderCache`](super::MaterialShaderCache) inserts
//! `#define` lines right after the version directive to select a permutation.
//!
//! Vertex attribute locations are fixed across all programs: 0 position,
//! 1 texcoord, 2 normal, 3 color, 4 tangent.

/// Material vertex template.
pub const MATERIAL_VS: &str = include_str!("material.vert");

/// Material fragment template.
///
/// Writes lit HDR color to output 0 and the bright-pass color used by bloom
/// to output 1. Shading models are selected by `DIFFUSE_*` and `SPECULAR_*`
/// defines; optional features by the material flag defines.
pub const MATERIAL_FS: &str = include_str!("material.frag");

/// Depth-only vertex shader of directional and spot shadow maps.
pub const DEPTH_VS: &str = include_str!("depth.vert");

/// Empty fragment stage of the depth pass.
pub const DEPTH_FS: &str = include_str!("depth.frag");

/// Omni shadow vertex shader; forwards world position.
pub const DEPTH_CUBE_VS: &str = include_str!("depth_cube.vert");

/// Omni shadow fragment shader; writes the distance to the light.
pub const DEPTH_CUBE_FS: &str = include_str!("depth_cube.frag");

/// Fullscreen pass-through vertex shader.
pub const SCREEN_VS: &str = include_str!("screen.vert");

/// Separable 9-tap gaussian blur.
pub const BLUR_FS: &str = include_str!("blur.frag");

/// Bloom composite, fog, tonemapping and color grading.
pub const POSTFX_FS: &str = include_str!("postfx.frag");

/// Skybox vertex shader; pins the cube to the far plane.
pub const SKYBOX_VS: &str = include_str!("skybox.vert");

/// Skybox fragment shader.
pub const SKYBOX_FS: &str = include_str!("skybox.frag");

/// Vertex shader shared by the cubemap generation passes.
pub const CUBEMAP_VS: &str = include_str!("cubemap.vert");

/// Projects an equirectangular panorama onto a cube face.
pub const EQUIRECTANGULAR_FS: &str = include_str!("equirectangular.frag");

/// Cosine-weighted hemisphere convolution.
pub const IRRADIANCE_FS: &str = include_str!("irradiance.frag");

/// GGX importance-sampled radiance prefilter.
pub const PREFILTER_FS: &str = include_str!("prefilter.frag");

/// Split-sum BRDF integration.
pub const BRDF_FS: &str = include_str!("brdf.frag");

/// Screen-space quad with a transform, used by debug views.
pub const DEBUG_QUAD_VS: &str = include_str!("debug_quad.vert");

/// Linearized view of a 2D depth map.
pub const DEBUG_DEPTH_FS: &str = include_str!("debug_depth.frag");

/// Unwrapped view of an omni distance cubemap.
pub const DEBUG_CUBE_FS: &str = include_str!("debug_cube.frag");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_source_starts_with_version() {
        let all = [
            MATERIAL_VS,
            MATERIAL_FS,
            DEPTH_VS,
            DEPTH_FS,
            DEPTH_CUBE_VS,
            DEPTH_CUBE_FS,
            SCREEN_VS,
            BLUR_FS,
            POSTFX_FS,
            SKYBOX_VS,
            SKYBOX_FS,
            CUBEMAP_VS,
            EQUIRECTANGULAR_FS,
            IRRADIANCE_FS,
            PREFILTER_FS,
            BRDF_FS,
            DEBUG_QUAD_VS,
            DEBUG_DEPTH_FS,
            DEBUG_CUBE_FS,
        ];
        for src in all {
            assert!(src.starts_with("#version 330 core"));
        }
    }
}
