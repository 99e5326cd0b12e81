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

//! Error types for GPU resource creation and device failures.

use std::fmt;

use super::api::FramebufferStatus;

/// Errors raised while building a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// A stage failed to compile. `log` is the driver's info log.
    CompilationFailed {
        /// Human-readable stage name (`"vertex"`, `"fragment"`).
        stage: &'static str,
        /// Driver info log.
        log: String,
    },
    /// The program failed to link.
    LinkFailed {
        /// Driver info log.
        log: String,
    },
    /// The driver refused to create a shader or program object.
    CreationFailed(String),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed { stage, log } => {
                write!(f, "Failed to compile {stage} shader: {log}")
            }
            ShaderError::LinkFailed { log } => write!(f, "Failed to link shader program: {log}"),
            ShaderError::CreationFailed(msg) => write!(f, "Failed to create shader object: {msg}"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// Errors raised while creating or resizing textures, framebuffers and meshes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A framebuffer did not reach the complete status.
    FramebufferIncomplete(FramebufferStatus),
    /// The driver refused to allocate an object.
    AllocationFailed(String),
    /// Zero or negative dimensions were requested.
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The mesh has no vertices or mismatched attribute lengths.
    InvalidMesh(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::FramebufferIncomplete(status) => {
                write!(f, "Framebuffer is incomplete: {status:?}")
            }
            ResourceError::AllocationFailed(what) => write!(f, "GPU allocation failed: {what}"),
            ResourceError::InvalidDimensions { width, height } => {
                write!(f, "Invalid resource dimensions {width}x{height}")
            }
            ResourceError::InvalidMesh(msg) => write!(f, "Invalid mesh data: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// A driver error polled after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// The raw error code reported by the driver.
    pub code: u32,
    /// The operation that was running when the error was polled.
    pub context: String,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPU error 0x{:04X} during {}",
            self.code, self.context
        )
    }
}

impl std::error::Error for DeviceError {}

/// The top-level error type for render operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// See [`ShaderError`].
    Shader(ShaderError),
    /// See [`ResourceError`].
    Resource(ResourceError),
    /// See [`DeviceError`].
    Device(DeviceError),
    /// An operation was called in the wrong state, such as submitting
    /// outside a `begin`/`end` pair.
    InvalidState(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Shader(e) => write!(f, "Shader error: {e}"),
            RenderError::Resource(e) => write!(f, "Resource error: {e}"),
            RenderError::Device(e) => write!(f, "Device error: {e}"),
            RenderError::InvalidState(msg) => write!(f, "Invalid render state: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Shader(e) => Some(e),
            RenderError::Resource(e) => Some(e),
            RenderError::Device(e) => Some(e),
            RenderError::InvalidState(_) => None,
        }
    }
}

impl From<ShaderError> for RenderError {
    fn from(e: ShaderError) -> Self {
        RenderError::Shader(e)
    }
}

impl From<ResourceError> for RenderError {
    fn from(e: ResourceError) -> Self {
        RenderError::Resource(e)
    }
}

impl From<DeviceError> for RenderError {
    fn from(e: DeviceError) -> Self {
        RenderError::Device(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display_names_context() {
        let e = DeviceError {
            code: 0x0502,
            context: "scene pass".into(),
        };
        assert_eq!(e.to_string(), "GPU error 0x0502 during scene pass");
    }

    #[test]
    fn test_render_error_source_chain() {
        use std::error::Error;
        let e: RenderError = ShaderError::LinkFailed { log: "oops".into() }.into();
        assert!(e.source().is_some());
        assert!(e.to_string().contains("oops"));
    }
}
