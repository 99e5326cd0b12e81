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

//! Material shader permutations, compiled on demand and memoized by [`ShaderKey`].

use ahash::AHashMap;

use radiant_core::renderer::{MaterialFlags, ShaderError, ShaderKey};

use super::shaders::{MATERIAL_FS, MATERIAL_VS};
use crate::gpu::{ShaderProgram, SharedDevice};

/// The preprocessor symbols selecting the permutation of `key`.
pub fn shader_defines(key: &ShaderKey) -> Vec<&'static str> {
    let mut defines = vec![key.diffuse.define()];
    defines.extend(key.specular.define());
    defines.extend(
        MaterialFlags::DEFINES
            .iter()
            .filter(|(flag, _)| key.flags.contains(*flag))
            .map(|(_, name)| *name),
    );
    defines
}

/// Inserts one `#define` line per symbol right after the `#version` line.
pub fn compose_source(template: &str, defines: &[&str]) -> String {
    let (version, body) = match template.split_once('\n') {
        Some((first, rest)) if first.trim_start().starts_with("#version") => (first, rest),
        _ => ("", template),
    };
    let mut out = String::with_capacity(template.len() + defines.len() * 24);
    if !version.is_empty() {
        out.push_str(version);
        out.push('\n');
    }
    for define in defines {
        out.push_str("#define ");
        out.push_str(define);
        out.push('\n');
    }
    out.push_str(body);
    out
}

/// Cache of compiled material programs.
pub struct MaterialShaderCache {
    device: SharedDevice,
    programs: AHashMap<ShaderKey, ShaderProgram>,
}

impl std::fmt::Debug for MaterialShaderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialShaderCache")
            .field("programs", &self.programs.len())
            .finish()
    }
}

impl MaterialShaderCache {
    /// Creates an empty cache.
    pub fn new(device: SharedDevice) -> Self {
        Self {
            device,
            programs: AHashMap::new(),
        }
    }

    /// Returns the program of `key`, compiling it on first use.
    pub fn get_or_compile(&mut self, key: ShaderKey) -> Result<&ShaderProgram, ShaderError> {
        if !self.programs.contains_key(&key) {
            let program = self.compile(key)?;
            self.programs.insert(key, program);
        }
        self.programs
            .get(&key)
            .ok_or_else(|| ShaderError::CreationFailed("material shader evicted".into()))
    }

    /// Compiles `key` ahead of its first draw. Does nothing if already cached.
    pub fn register(&mut self, key: ShaderKey) -> Result<(), ShaderError> {
        self.get_or_compile(key).map(|_| ())
    }

    /// The program of `key` if it is already compiled.
    pub fn get(&self, key: &ShaderKey) -> Option<&ShaderProgram> {
        self.programs.get(key)
    }

    /// True if `key` is compiled.
    pub fn contains(&self, key: &ShaderKey) -> bool {
        self.programs.contains_key(key)
    }

    /// Drops the program of `key`. Returns whether one was cached.
    pub fn unload(&mut self, key: &ShaderKey) -> bool {
        let removed = self.programs.remove(key).is_some();
        if removed {
            log::debug!("Unloaded material shader {:#x}", key.pack());
        }
        removed
    }

    /// Number of compiled permutations.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// True when nothing is compiled.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Drops every program.
    pub fn clear(&mut self) {
        self.programs.clear();
    }

    fn compile(&self, key: ShaderKey) -> Result<ShaderProgram, ShaderError> {
        let defines = shader_defines(&key);
        let vs = compose_source(MATERIAL_VS, &defines);
        let fs = compose_source(MATERIAL_FS, &defines);
        let program = ShaderProgram::new(self.device.clone(), &vs, &fs).inspect_err(|e| {
            log::error!("Material shader {:#x} ({:?}) failed: {}", key.pack(), defines, e);
        })?;
        log::info!("Compiled material shader {:#x} ({})", key.pack(), defines.join(" "));
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiant_core::renderer::{DiffuseMode, MaterialConfig, SpecularMode};

    #[test]
    fn test_defines_follow_key() {
        let key = MaterialConfig::default().shader_key();
        let defines = shader_defines(&key);
        assert_eq!(defines[0], "DIFFUSE_BURLEY");
        assert!(defines.contains(&"SPECULAR_SCHLICK_GGX"));
        assert!(defines.contains(&"RECEIVE_SHADOW"));
        assert!(defines.contains(&"SKY_IBL"));
        assert!(!defines.contains(&"MAP_NORMAL"));

        let unshaded = ShaderKey {
            diffuse: DiffuseMode::Unshaded,
            specular: SpecularMode::Disabled,
            flags: MaterialFlags::empty(),
        };
        assert_eq!(shader_defines(&unshaded), vec!["DIFFUSE_UNSHADED"]);
    }

    #[test]
    fn test_defines_go_after_version() {
        let src = compose_source("#version 330 core\nvoid main() {}\n", &["A", "B"]);
        assert_eq!(src, "#version 330 core\n#define A\n#define B\nvoid main() {}\n");
    }
}
