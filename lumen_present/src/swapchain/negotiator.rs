/// Capability negotiation - pure selection over a surface snapshot
///
/// Each selector is a stateless function of the capability snapshot; given
/// identical input ordering the result is deterministic. `negotiate` composes
/// them into a complete swapchain configuration.

use crate::device::PresentDevice;
use crate::error::Result;
use crate::present_bail;
use crate::present_debug;
use crate::swapchain::surface::{
    ColorSpace, CompositeAlpha, Extent2d, FormatProperties, ImageFormat, ImageUsage, PresentMode,
    SurfaceCapabilities, SurfaceFormat, SurfaceTransform, SwapchainConfig,
};

/// Canonical default: 8-bit RGBA in the non-linear sRGB color space
pub const DEFAULT_SURFACE_FORMAT: SurfaceFormat = SurfaceFormat {
    format: ImageFormat::R8G8B8A8_UNORM,
    color_space: ColorSpace::SRGB_NONLINEAR,
};

/// Select the present mode to request.
///
/// Prefers Mailbox (low latency, never blocks the presentation engine) and
/// falls back to Fifo, the one mode every surface must support.
///
/// # Panics
///
/// `modes` must not be empty (surface query guarantee).
pub fn select_present_mode(modes: &[PresentMode]) -> PresentMode {
    assert!(!modes.is_empty());
    if modes.contains(&PresentMode::Mailbox) {
        PresentMode::Mailbox
    } else {
        PresentMode::Fifo
    }
}

/// Select the surface format to request.
///
/// A single `UNDEFINED` entry is the driver's way of saying any format is
/// acceptable; the canonical default is returned. Otherwise the canonical
/// default is used when the surface supports it, else the first supported
/// pair as a safe fallback.
///
/// # Panics
///
/// `formats` must not be empty (surface query guarantee).
pub fn select_surface_format(formats: &[SurfaceFormat]) -> SurfaceFormat {
    if formats.len() == 1 && formats[0].format == ImageFormat::UNDEFINED {
        return DEFAULT_SURFACE_FORMAT;
    }

    formats
        .iter()
        .copied()
        .find(|f| *f == DEFAULT_SURFACE_FORMAT)
        .unwrap_or(formats[0])
}

/// Select the number of presentable images to request.
///
/// One more than the minimum keeps the presentation engine from stalling the
/// pipeline, clamped to the maximum when the surface reports one
/// (`max_image_count == 0` means unbounded).
pub fn select_image_count(caps: &SurfaceCapabilities) -> u32 {
    let preferred = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        preferred.min(caps.max_image_count)
    } else {
        preferred
    }
}

/// Select the swapchain extent.
///
/// Echoes the driver-reported current extent verbatim. Surfaces that report
/// an arbitrary extent (all-ones sentinel) are not handled specially.
pub fn select_extent(caps: &SurfaceCapabilities) -> Extent2d {
    caps.current_extent
}

/// Select the image usage flags to request.
///
/// Color attachment is always required for rendering. Transfer-source is
/// added when the format supports blit-as-source and the surface allows it,
/// so screenshots/captures work without renegotiation.
pub fn select_usage(caps: &SurfaceCapabilities, format_props: &FormatProperties) -> ImageUsage {
    let mut usage = ImageUsage::COLOR_ATTACHMENT;
    if format_props.supports_blit_src && caps.supported_usage.contains(ImageUsage::TRANSFER_SRC) {
        usage |= ImageUsage::TRANSFER_SRC;
    }
    usage
}

/// Select the pre-transform: identity when supported, else whatever the
/// surface is currently under.
pub fn select_transform(caps: &SurfaceCapabilities) -> SurfaceTransform {
    if caps.supported_transforms.contains(SurfaceTransform::IDENTITY) {
        SurfaceTransform::IDENTITY
    } else {
        caps.current_transform
    }
}

/// Select the composite alpha mode.
///
/// TODO: pick from `caps.supported_composite_alpha` instead of assuming
/// opaque; no blending with underlying desktop content is attempted yet.
pub fn select_composite_alpha(_caps: &SurfaceCapabilities) -> CompositeAlpha {
    CompositeAlpha::OPAQUE
}

/// Run every selector against a fresh capability query and assemble the
/// swapchain configuration.
pub fn negotiate(device: &dyn PresentDevice) -> Result<SwapchainConfig> {
    let caps = device.surface_capabilities()?;

    if caps.formats.is_empty() || caps.present_modes.is_empty() {
        present_bail!(
            "lumen::negotiator",
            "Surface reports no formats or no present modes"
        );
    }

    let surface_format = select_surface_format(&caps.formats);
    let format_props = device.format_properties(surface_format.format)?;

    let config = SwapchainConfig {
        surface_format,
        extent: select_extent(&caps),
        image_count: select_image_count(&caps),
        pre_transform: select_transform(&caps),
        composite_alpha: select_composite_alpha(&caps),
        present_mode: select_present_mode(&caps.present_modes),
        image_usage: select_usage(&caps, &format_props),
    };

    present_debug!(
        "lumen::negotiator",
        "Negotiated swapchain config: {}x{}, {:?}/{:?}, {} images, {:?}",
        config.extent.width,
        config.extent.height,
        config.surface_format.format,
        config.surface_format.color_space,
        config.image_count,
        config.present_mode
    );

    Ok(config)
}

#[cfg(test)]
#[path = "negotiator_tests.rs"]
mod tests;
