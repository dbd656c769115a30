//! Error types for the Lumen presentation pipeline
//!
//! This module defines the error types used throughout the pipeline,
//! covering surface/device loss, swapchain invalidation, timeouts, and
//! resource creation failures.

use std::fmt;

/// Result type for Lumen presentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen presentation errors
#[derive(Debug, Clone)]
pub enum Error {
    /// The surface handle was destroyed externally; presentation cannot continue
    SurfaceLost,

    /// The device was lost; no valid recreation path exists
    DeviceLost,

    /// The swapchain no longer matches the surface (e.g. after a resize).
    /// Recoverable: triggers swapchain recreation and a skipped frame tick.
    SwapchainOutOfDate,

    /// A bounded wait on a fence or image acquisition expired
    Timeout,

    /// Swapchain/image-view/sync-object creation failed under valid parameters
    AllocationFailed(String),

    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Initialization failed (device bring-up, surface creation)
    InitializationFailed(String),
}

impl Error {
    /// Returns true if the error is absorbed by the scheduler's recreation
    /// loop rather than propagated to the host.
    ///
    /// Only [`Error::SwapchainOutOfDate`] is recoverable; everything else
    /// terminates the presentation pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::SwapchainOutOfDate)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SurfaceLost => write!(f, "Surface lost"),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::Timeout => write!(f, "Wait timed out"),
            Error::AllocationFailed(msg) => write!(f, "Allocation failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
