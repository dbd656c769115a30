//! Unit tests for the pure Vulkan <-> core conversion functions
//!
//! These run without a GPU; everything touching a real device lives in the
//! ignored integration tests.

use ash::vk;
use lumen_present::lumen::{
    ColorSpace, CompositeAlpha, Error, ImageFormat, ImageUsage, PresentMode, SurfaceTransform,
};

use crate::vulkan_device::{
    composite_alpha_to_vk, format_to_vk, map_vk_error, present_mode_to_vk, transform_to_vk,
    usage_to_vk, vk_color_space_to_color_space, vk_composite_alpha_to_composite_alpha,
    vk_format_to_format, vk_present_mode_to_present_mode, vk_transforms_to_transforms,
    vk_usage_to_usage,
};

// ============================================================================
// FORMAT CONVERSIONS
// ============================================================================

#[test]
fn test_format_round_trip() {
    let formats = [
        ImageFormat::UNDEFINED,
        ImageFormat::R8G8B8A8_UNORM,
        ImageFormat::R8G8B8A8_SRGB,
        ImageFormat::B8G8R8A8_UNORM,
        ImageFormat::B8G8R8A8_SRGB,
    ];

    for format in formats {
        assert_eq!(vk_format_to_format(format_to_vk(format)), Some(format));
    }
}

#[test]
fn test_unrepresentable_vk_format_is_dropped() {
    assert_eq!(vk_format_to_format(vk::Format::D32_SFLOAT), None);
    assert_eq!(vk_format_to_format(vk::Format::R16G16B16A16_SFLOAT), None);
}

#[test]
fn test_color_space_conversion() {
    assert_eq!(
        vk_color_space_to_color_space(vk::ColorSpaceKHR::SRGB_NONLINEAR),
        Some(ColorSpace::SRGB_NONLINEAR)
    );
    assert_eq!(
        vk_color_space_to_color_space(vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
        Some(ColorSpace::DISPLAY_P3_NONLINEAR)
    );
    assert_eq!(
        vk_color_space_to_color_space(vk::ColorSpaceKHR::BT709_NONLINEAR_EXT),
        None
    );
}

// ============================================================================
// PRESENT MODE CONVERSIONS
// ============================================================================

#[test]
fn test_present_mode_round_trip() {
    let modes = [
        PresentMode::Immediate,
        PresentMode::Mailbox,
        PresentMode::Fifo,
        PresentMode::FifoRelaxed,
    ];

    for mode in modes {
        assert_eq!(
            vk_present_mode_to_present_mode(present_mode_to_vk(mode)),
            Some(mode)
        );
    }
}

#[test]
fn test_shared_present_modes_are_dropped() {
    assert_eq!(
        vk_present_mode_to_present_mode(vk::PresentModeKHR::SHARED_DEMAND_REFRESH),
        None
    );
}

// ============================================================================
// FLAG SET CONVERSIONS
// ============================================================================

#[test]
fn test_transform_flags_convert_both_ways() {
    let flags = vk::SurfaceTransformFlagsKHR::IDENTITY | vk::SurfaceTransformFlagsKHR::ROTATE_180;
    let transforms = vk_transforms_to_transforms(flags);

    assert!(transforms.contains(SurfaceTransform::IDENTITY));
    assert!(transforms.contains(SurfaceTransform::ROTATE_180));
    assert!(!transforms.contains(SurfaceTransform::ROTATE_90));

    assert_eq!(transform_to_vk(transforms), flags);
}

#[test]
fn test_unrepresentable_transform_bits_are_dropped() {
    let flags = vk::SurfaceTransformFlagsKHR::HORIZONTAL_MIRROR;
    assert!(vk_transforms_to_transforms(flags).is_empty());
}

#[test]
fn test_composite_alpha_round_trip() {
    let alpha = CompositeAlpha::OPAQUE | CompositeAlpha::INHERIT;
    assert_eq!(
        vk_composite_alpha_to_composite_alpha(composite_alpha_to_vk(alpha)),
        alpha
    );
}

#[test]
fn test_usage_round_trip() {
    let usage = ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_SRC;
    assert_eq!(vk_usage_to_usage(usage_to_vk(usage)), usage);
}

#[test]
fn test_unrepresentable_usage_bits_are_dropped() {
    let flags = vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::STORAGE;
    assert_eq!(vk_usage_to_usage(flags), ImageUsage::COLOR_ATTACHMENT);
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

#[test]
fn test_out_of_date_maps_to_recoverable_error() {
    let err = map_vk_error(vk::Result::ERROR_OUT_OF_DATE_KHR, "acquire");
    assert!(matches!(err, Error::SwapchainOutOfDate));
    assert!(err.is_recoverable());
}

#[test]
fn test_fatal_results_map_to_fatal_errors() {
    assert!(matches!(
        map_vk_error(vk::Result::ERROR_SURFACE_LOST_KHR, "acquire"),
        Error::SurfaceLost
    ));
    assert!(matches!(
        map_vk_error(vk::Result::ERROR_DEVICE_LOST, "submit"),
        Error::DeviceLost
    ));
    assert!(matches!(
        map_vk_error(vk::Result::TIMEOUT, "fence wait"),
        Error::Timeout
    ));
}

#[test]
fn test_out_of_memory_maps_to_allocation_failure() {
    match map_vk_error(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, "create swapchain") {
        Error::AllocationFailed(msg) => assert!(msg.contains("create swapchain")),
        other => panic!("expected AllocationFailed, got {:?}", other),
    }
}

#[test]
fn test_unknown_result_keeps_context_string() {
    match map_vk_error(vk::Result::ERROR_UNKNOWN, "queue present") {
        Error::BackendError(msg) => assert!(msg.contains("queue present")),
        other => panic!("expected BackendError, got {:?}", other),
    }
}
