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

//! Uniform reflection and values.

use crate::math::{Color, Mat4, Quaternion, Vec2, Vec3, Vec4};

use super::TextureTarget;

/// The GLSL type of an active uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `float`
    Float,
    /// `vec2`
    Vec2,
    /// `vec3`
    Vec3,
    /// `vec4`
    Vec4,
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `mat3`
    Mat3,
    /// `mat4`
    Mat4,
    /// `sampler1D`
    Sampler1D,
    /// `sampler2D`
    Sampler2D,
    /// `sampler3D`
    Sampler3D,
    /// `samplerCube`
    SamplerCube,
    /// Any type the renderer does not set directly.
    Other,
}

impl UniformKind {
    /// Parses a GLSL type name.
    pub fn from_glsl(name: &str) -> Self {
        match name {
            "float" => UniformKind::Float,
            "vec2" => UniformKind::Vec2,
            "vec3" => UniformKind::Vec3,
            "vec4" => UniformKind::Vec4,
            "int" => UniformKind::Int,
            "bool" => UniformKind::Bool,
            "mat3" => UniformKind::Mat3,
            "mat4" => UniformKind::Mat4,
            "sampler1D" => UniformKind::Sampler1D,
            "sampler2D" => UniformKind::Sampler2D,
            "sampler3D" => UniformKind::Sampler3D,
            "samplerCube" => UniformKind::SamplerCube,
            _ => UniformKind::Other,
        }
    }

    /// The texture target a sampler uniform reads, `None` for non-samplers.
    pub fn sampler_target(&self) -> Option<TextureTarget> {
        match self {
            UniformKind::Sampler1D => Some(TextureTarget::Texture1D),
            UniformKind::Sampler2D => Some(TextureTarget::Texture2D),
            UniformKind::Sampler3D => Some(TextureTarget::Texture3D),
            UniformKind::SamplerCube => Some(TextureTarget::CubeMap),
            _ => None,
        }
    }
}

/// An active uniform reported by the driver after linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    /// The uniform name. Arrays are reported with a `[0]` suffix.
    pub name: String,
    /// The GLSL type.
    pub kind: UniformKind,
    /// Number of array elements, 1 for scalars.
    pub size: i32,
}

/// A value written to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int`, `bool` or sampler unit.
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2(Vec2),
    /// `vec3`
    Vec3(Vec3),
    /// `vec4`
    Vec4(Vec4),
    /// `mat4`, column-major.
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Int(v as i32)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Quaternion> for UniformValue {
    fn from(q: Quaternion) -> Self {
        UniformValue::Vec4(q.to_vec4())
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m)
    }
}

/// Colors are sent as normalized `vec3`; the alpha channel is dropped.
impl From<Color> for UniformValue {
    fn from(c: Color) -> Self {
        UniformValue::Vec3(c.to_vec3())
    }
}
