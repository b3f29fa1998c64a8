//! Error types for the graphics abstraction layer

use thiserror::Error;

/// Errors raised while creating or resizing a rendering backend
///
/// Drawing calls themselves never fail; only setup and resource
/// allocation report errors.
#[derive(Error, Debug)]
pub enum GalError {
    /// Backend could not be initialized
    #[error("GAL initialization failed: {0}")]
    Init(String),

    /// No suitable GPU adapter
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,

    /// Device request failed
    #[error("Failed to create device: {0}")]
    Device(String),

    /// Surface creation or configuration failed
    #[error("Surface error: {0}")]
    Surface(String),

    /// Framebuffer, texture or buffer allocation failed
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Configuration could not be read
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for GAL operations
pub type Result<T> = std::result::Result<T, GalError>;
