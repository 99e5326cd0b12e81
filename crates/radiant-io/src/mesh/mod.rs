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

//! Model import, dispatched on the file extension.

use std::path::Path;

use radiant_core::renderer::MaterialConfig;
use radiant_data::{Model, ModelAnimation};

use crate::AssetError;

mod gltf_loader;
mod obj_loader;

pub use gltf_loader::{decode_gltf, load_gltf, load_gltf_animations, ANIMATION_FPS};
pub use obj_loader::{decode_obj, load_obj};

/// Model file formats understood by [`load_model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Wavefront `.obj`.
    Obj,
    /// glTF 2.0, `.gltf` or `.glb`.
    Gltf,
}

impl ModelFormat {
    /// The format of `path`, judged from its extension.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "obj" => Ok(ModelFormat::Obj),
            "gltf" | "glb" => Ok(ModelFormat::Gltf),
            _ => Err(AssetError::UnsupportedFormat(ext)),
        }
    }
}

/// Loads the model at `path`, giving every surface a material built from
/// `config` and the factors stored in the file.
pub fn load_model(path: impl AsRef<Path>, config: MaterialConfig) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let model = match ModelFormat::from_path(path)? {
        ModelFormat::Obj => load_obj(path, config)?,
        ModelFormat::Gltf => load_gltf(path, config)?,
    };
    log::info!("Loaded model '{}' ({} surfaces)", path.display(), model.surface_count());
    Ok(model)
}

/// Loads the animation clips stored at `path`.
///
/// OBJ files carry no animation and yield an empty list.
pub fn load_model_animations(path: impl AsRef<Path>) -> Result<Vec<ModelAnimation>, AssetError> {
    let path = path.as_ref();
    match ModelFormat::from_path(path)? {
        ModelFormat::Obj => Ok(Vec::new()),
        ModelFormat::Gltf => load_gltf_animations(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_path(Path::new("a/b.OBJ")).unwrap(), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_path(Path::new("robot.glb")).unwrap(), ModelFormat::Gltf);
        assert!(matches!(
            ModelFormat::from_path(Path::new("scene.fbx")),
            Err(AssetError::UnsupportedFormat(ext)) if ext == "fbx"
        ));
    }
}
