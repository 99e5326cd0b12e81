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

//! Error type shared by every loader of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// An error raised while reading or decoding an asset file.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The image decoder rejected the data.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    /// The image dimensions match no cubemap layout.
    #[error("cannot lay out a {width}x{height} image as a cubemap")]
    UnsupportedLayout {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// The OBJ importer rejected the file.
    #[error("failed to import OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    /// The glTF importer rejected the file.
    #[error("failed to import glTF: {0}")]
    Gltf(#[from] gltf::Error),
    /// The file extension names no supported format.
    #[error("unsupported file format '{0}'")]
    UnsupportedFormat(String),
    /// The file parsed but holds nothing usable.
    #[error("'{0}' contains no mesh data")]
    Empty(PathBuf),
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.into(),
            source,
        }
    }
}
