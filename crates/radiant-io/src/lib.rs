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

//! # Radiant IO
//!
//! Decoding of the files the renderer consumes: plain images for material
//! maps, cubemap images and HDR panoramas for skyboxes, OBJ and glTF models
//! with their animations.
//!
//! Every loader produces CPU data only. Uploading is left to the caller.

#![warn(missing_docs)]

pub mod cubemap;
pub mod error;
pub mod mesh;
pub mod panorama;
pub mod texture;

pub use cubemap::{load_cubemap, CubemapFaces, CubemapLayout};
pub use error::AssetError;
pub use mesh::{load_model, load_model_animations, ModelFormat};
pub use panorama::{load_hdr_panorama, HdrPanorama};
pub use texture::{decode_image, load_image, ImageData};
