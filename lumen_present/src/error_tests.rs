//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone,
//! std::error::Error) plus the recoverability split.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_surface_lost_display() {
    let err = Error::SurfaceLost;
    assert_eq!(format!("{}", err), "Surface lost");
}

#[test]
fn test_device_lost_display() {
    let err = Error::DeviceLost;
    assert_eq!(format!("{}", err), "Device lost");
}

#[test]
fn test_out_of_date_display() {
    let err = Error::SwapchainOutOfDate;
    assert_eq!(format!("{}", err), "Swapchain out of date");
}

#[test]
fn test_timeout_display() {
    let err = Error::Timeout;
    assert_eq!(format!("{}", err), "Wait timed out");
}

#[test]
fn test_allocation_failed_display() {
    let err = Error::AllocationFailed("fence creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Allocation failed"));
    assert!(display.contains("fence creation failed"));
}

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("Vulkan error code: -4".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("Vulkan error code: -4"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("No Vulkan-capable GPU found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("No Vulkan-capable GPU found"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::DeviceLost;
    // Verify Error implements std::error::Error trait
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let err1 = Error::SwapchainOutOfDate;
    assert!(format!("{:?}", err1).contains("SwapchainOutOfDate"));

    let err2 = Error::AllocationFailed("test".to_string());
    assert!(format!("{:?}", err2).contains("AllocationFailed"));

    let err3 = Error::Timeout;
    assert!(format!("{:?}", err3).contains("Timeout"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::BackendError("test".to_string());
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));

    let err3 = Error::SurfaceLost;
    let err4 = err3.clone();
    assert_eq!(format!("{}", err3), format!("{}", err4));
}

// ============================================================================
// RECOVERABILITY SPLIT
// ============================================================================

#[test]
fn test_out_of_date_is_recoverable() {
    assert!(Error::SwapchainOutOfDate.is_recoverable());
}

#[test]
fn test_fatal_errors_are_not_recoverable() {
    assert!(!Error::SurfaceLost.is_recoverable());
    assert!(!Error::DeviceLost.is_recoverable());
    assert!(!Error::Timeout.is_recoverable());
    assert!(!Error::AllocationFailed("x".to_string()).is_recoverable());
    assert!(!Error::BackendError("x".to_string()).is_recoverable());
    assert!(!Error::InitializationFailed("x".to_string()).is_recoverable());
}

// ============================================================================
// RESULT TYPE / PROPAGATION
// ============================================================================

#[test]
fn test_result_type_ok() {
    fn returns_ok() -> Result<u32> {
        Ok(42)
    }

    let result = returns_ok();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<u32> {
        Err(Error::DeviceLost)
    }

    fn outer() -> Result<u32> {
        inner()?;
        Ok(42)
    }

    let result = outer();
    assert!(result.is_err());
}
