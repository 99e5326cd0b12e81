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

//! The error type of the engine API.

use std::path::PathBuf;

use radiant_agents::LightError;
use radiant_core::renderer::{RenderError, ResourceError, ShaderError, SkyboxId};
use radiant_io::AssetError;
use thiserror::Error;

/// Every failure the [`Engine`](crate::Engine) reports.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A GPU resource or a frame could not be produced.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// An asset file could not be read or decoded.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// A light operation failed.
    #[error(transparent)]
    Light(#[from] LightError),
    /// The id names no loaded skybox.
    #[error("unknown skybox {0:?}")]
    UnknownSkybox(SkyboxId),
    /// The model has no animation of that name.
    #[error("no animation named '{0}'")]
    UnknownAnimation(String),
    /// A configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    ConfigIo {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration is not valid RON for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
    /// A configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    ConfigWrite(#[from] ron::Error),
}

impl From<ShaderError> for EngineError {
    fn from(e: ShaderError) -> Self {
        EngineError::Render(e.into())
    }
}

impl From<ResourceError> for EngineError {
    fn from(e: ResourceError) -> Self {
        EngineError::Render(e.into())
    }
}

/// A specialized `Result` for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
