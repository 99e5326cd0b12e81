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

//! # Lane Abstraction
//!
//! A **Lane** is one stage of the frame pipeline: the shadow pass, the scene
//! pass, the bloom blur, the post-processing composite and the final blit are
//! each a lane. The render agent owns the lanes and runs them in order.
//!
//! The trait hierarchy has two levels:
//!
//! 1. **`Lane`** (this trait): identity and classification, shared by all lanes.
//! 2. **Domain traits** in `radiant-lanes` extend `Lane` with an `execute`
//!    method taking the typed frame context of that domain.

use std::fmt;

use crate::renderer::{DeviceError, RenderError, ResourceError, ShaderError};

/// Error type for lane operations.
#[derive(Debug)]
pub enum LaneError {
    /// A lane was executed before its GPU resources were created.
    NotInitialized(&'static str),
    /// A resource the lane needs was missing from the frame context.
    MissingInput(&'static str),
    /// A render operation failed while the lane executed.
    Render(RenderError),
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneError::NotInitialized(lane) => write!(f, "Lane {lane} not initialized"),
            LaneError::MissingInput(what) => write!(f, "Lane input missing: {what}"),
            LaneError::Render(e) => write!(f, "Lane execution failed: {e}"),
        }
    }
}

impl std::error::Error for LaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaneError::Render(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderError> for LaneError {
    fn from(e: RenderError) -> Self {
        LaneError::Render(e)
    }
}

impl From<ShaderError> for LaneError {
    fn from(e: ShaderError) -> Self {
        LaneError::Render(e.into())
    }
}

impl From<ResourceError> for LaneError {
    fn from(e: ResourceError) -> Self {
        LaneError::Render(e.into())
    }
}

impl From<DeviceError> for LaneError {
    fn from(e: DeviceError) -> Self {
        LaneError::Render(e.into())
    }
}

/// Classification of lanes, used for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Shadow map generation.
    Shadow,
    /// Main HDR scene rendering.
    Render,
    /// Bloom blur.
    Bloom,
    /// Post-processing composite.
    PostProcess,
    /// Final blit to the screen or a user target.
    Present,
    /// Debug visualizations.
    Debug,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Shadow => write!(f, "Shadow"),
            LaneKind::Render => write!(f, "Render"),
            LaneKind::Bloom => write!(f, "Bloom"),
            LaneKind::PostProcess => write!(f, "PostProcess"),
            LaneKind::Present => write!(f, "Present"),
            LaneKind::Debug => write!(f, "Debug"),
        }
    }
}

/// The base trait shared by every lane.
pub trait Lane {
    /// A short, stable name used in logs.
    fn strategy_name(&self) -> &'static str;

    /// The stage this lane implements.
    fn lane_kind(&self) -> LaneKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_errors_convert_into_lane_errors() {
        let e: LaneError = ShaderError::CreationFailed("no context".into()).into();
        assert!(matches!(e, LaneError::Render(RenderError::Shader(_))));
        assert!(e.to_string().contains("no context"));
    }

    #[test]
    fn test_lane_kind_display() {
        assert_eq!(LaneKind::PostProcess.to_string(), "PostProcess");
    }
}
