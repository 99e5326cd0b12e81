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

//! Linked shader programs with cached uniform locations and texture unit allocation.

use std::cell::{Cell, RefCell};
use std::fmt;

use ahash::AHashMap;

use radiant_core::math::Color;
use radiant_core::renderer::{
    ProgramId, ShaderError, TextureId, TextureTarget, UniformInfo, UniformKind, UniformLocation,
    UniformValue,
};

use super::{SharedDevice, Texture};

/// First unit handed out by [`ShaderProgram::bind_texture`].
///
/// Units below it hold the per-target default slots of unbound samplers.
pub const FIRST_DYNAMIC_UNIT: u32 = 4;

/// The unit an unbound sampler of `kind` reads from.
///
/// Samplers of different targets must never share a unit, or some drivers
/// refuse to draw. The default value of a sampler uniform is unit 0, so 2D
/// samplers keep it and the other targets are moved to their own unit.
pub fn default_sampler_unit(kind: UniformKind) -> Option<u32> {
    match kind {
        UniformKind::Sampler2D => Some(0),
        UniformKind::Sampler1D => Some(1),
        UniformKind::Sampler3D => Some(2),
        UniformKind::SamplerCube => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedUniform {
    location: UniformLocation,
    kind: UniformKind,
}

/// A compiled and linked program.
pub struct ShaderProgram {
    device: SharedDevice,
    id: ProgramId,
    uniforms: AHashMap<String, CachedUniform>,
    infos: Vec<UniformInfo>,
    next_unit: Cell<u32>,
    bound_units: RefCell<Vec<(u32, TextureTarget)>>,
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("uniforms", &self.uniforms.len())
            .finish()
    }
}

impl ShaderProgram {
    /// Compiles and links a program, then caches every active uniform.
    ///
    /// Uniform arrays are reported by the driver through their first element
    /// only; the remaining elements are probed and cached as well. Sampler
    /// uniforms are initialized to their [`default_sampler_unit`].
    pub fn new(device: SharedDevice, vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        let id = device.create_program(vertex_src, fragment_src)?;
        let infos = device.active_uniforms(id);
        let mut uniforms = AHashMap::with_capacity(infos.len());

        device.use_program(Some(id));
        for info in &infos {
            let Some(location) = device.uniform_location(id, &info.name) else {
                continue;
            };
            init_sampler(&device, info.kind, location);
            uniforms.insert(info.name.clone(), CachedUniform { location, kind: info.kind });

            if let Some(base) = info.name.strip_suffix("[0]") {
                uniforms.insert(base.to_string(), CachedUniform { location, kind: info.kind });
                for i in 1.. {
                    let name = format!("{base}[{i}]");
                    let Some(location) = device.uniform_location(id, &name) else {
                        break;
                    };
                    init_sampler(&device, info.kind, location);
                    uniforms.insert(name, CachedUniform { location, kind: info.kind });
                }
            }
        }
        device.use_program(None);

        log::debug!("Linked program {:?} with {} uniforms", id, uniforms.len());
        Ok(Self {
            device,
            id,
            uniforms,
            infos,
            next_unit: Cell::new(FIRST_DYNAMIC_UNIT),
            bound_units: RefCell::new(Vec::new()),
        })
    }

    /// The device handle.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The active uniforms as reported by the driver.
    pub fn uniforms(&self) -> &[UniformInfo] {
        &self.infos
    }

    /// True if `name` is an active uniform.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// The cached location of `name`.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).map(|u| u.location)
    }

    /// Makes this program current.
    pub fn bind(&self) {
        self.device.use_program(Some(self.id));
    }

    /// Releases the texture units bound since [`bind`](Self::bind) and unbinds the program.
    pub fn unbind(&self) {
        self.unbind_textures();
        self.device.use_program(None);
    }

    /// Writes a uniform of the current program.
    ///
    /// Uniforms optimized out by the driver are silently skipped.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        match self.uniforms.get(name) {
            Some(u) => self.device.set_uniform(u.location, value.into()),
            None => log::trace!("Uniform '{}' not active in program {:?}", name, self.id),
        }
    }

    /// Writes a color as `vec3`, or as `vec4` when `alpha` is set.
    pub fn set_color(&self, name: &str, color: Color, alpha: bool) {
        if alpha {
            self.set_uniform(name, color.to_vec4());
        } else {
            self.set_uniform(name, color.to_vec3());
        }
    }

    /// Binds `texture` to the next free unit and points sampler `name` at it.
    ///
    /// Returns the unit used, or `None` when the sampler is not active.
    pub fn bind_texture(&self, name: &str, target: TextureTarget, texture: TextureId) -> Option<u32> {
        let Some(u) = self.uniforms.get(name) else {
            log::trace!("Sampler '{}' not active in program {:?}", name, self.id);
            return None;
        };
        debug_assert_eq!(
            u.kind.sampler_target(),
            Some(target),
            "sampler '{name}' bound with a texture of another target"
        );
        let unit = self.next_unit.get();
        self.device.bind_texture_unit(unit, target, Some(texture));
        self.device.set_uniform(u.location, UniformValue::Int(unit as i32));
        self.bound_units.borrow_mut().push((unit, target));
        self.next_unit.set(unit + 1);
        Some(unit)
    }

    /// Binds a texture wrapper; see [`bind_texture`](Self::bind_texture).
    pub fn bind_sampler(&self, name: &str, texture: &Texture) -> Option<u32> {
        self.bind_texture(name, texture.target(), texture.id())
    }

    /// Unbinds every unit bound since the last reset and restarts allocation.
    pub fn unbind_textures(&self) {
        let mut bound = self.bound_units.borrow_mut();
        for (unit, target) in bound.drain(..).rev() {
            self.device.bind_texture_unit(unit, target, None);
        }
        self.next_unit.set(FIRST_DYNAMIC_UNIT);
    }

    /// Number of units currently bound through this program.
    pub fn bound_texture_count(&self) -> usize {
        self.bound_units.borrow().len()
    }
}

fn init_sampler(device: &SharedDevice, kind: UniformKind, location: UniformLocation) {
    match default_sampler_unit(kind) {
        // Unit 0 is the driver default.
        Some(0) | None => {}
        Some(unit) => device.set_uniform(location, UniformValue::Int(unit as i32)),
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.device.destroy_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_units_are_distinct_per_target() {
        let kinds = [
            UniformKind::Sampler1D,
            UniformKind::Sampler2D,
            UniformKind::Sampler3D,
            UniformKind::SamplerCube,
        ];
        let mut units: Vec<u32> = kinds.iter().filter_map(|k| default_sampler_unit(*k)).collect();
        units.sort_unstable();
        units.dedup();
        assert_eq!(units.len(), 4);
        assert!(units.iter().all(|u| *u < FIRST_DYNAMIC_UNIT));
        assert_eq!(default_sampler_unit(UniformKind::Float), None);
    }
}
