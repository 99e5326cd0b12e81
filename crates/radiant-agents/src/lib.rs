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

//! # Radiant Agents
//!
//! The tactical layer of the renderer. Agents own the state that outlives a
//! frame (lights, environment, settings, batches) and drive the lanes that
//! turn it into GPU passes.

#![warn(missing_docs)]

pub mod light_store;
pub mod render_agent;

pub use light_store::{LightError, LightStore};
pub use render_agent::{MeshPreparationSystem, RenderAgent};
