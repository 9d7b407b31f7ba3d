//! Error types for Prism GPU
//!
//! This module defines the error types shared by the core crate and every
//! backend: context bring-up, resource creation and shader processing.

use std::fmt;

use crate::settings::ApiType;
use crate::render::ShaderStage;

/// Result type for Prism GPU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism GPU errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan)
    Backend(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, texture, framebuffer, vertex array...)
    InvalidResource(String),

    /// Initialization failed (window system, instance, device, swapchain)
    InitializationFailed(String),

    /// A shader stage failed to compile; carries the driver's info log
    ShaderCompilation {
        stage: ShaderStage,
        log: String,
    },

    /// The shader program failed to link; carries the driver's info log
    ShaderLink(String),

    /// Malformed `#type` shader source or unknown reflected type
    ShaderSource(String),

    /// The active backend has no implementation for this operation
    Unsupported {
        api: ApiType,
        operation: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ShaderCompilation { stage, log } => {
                write!(f, "{:?} shader compilation failed: {}", stage, log)
            }
            Error::ShaderLink(log) => write!(f, "Shader link failed: {}", log),
            Error::ShaderSource(msg) => write!(f, "Shader source error: {}", msg),
            Error::Unsupported { api, operation } => {
                write!(f, "{} is not supported by the {} backend", operation, api)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
