/// RenderTarget trait - a presentable image's attachment surface

use crate::swapchain::surface::{Extent2d, SurfaceFormat};

/// One presentable image's view + framebuffer pair, exposed to render
/// content for attachment binding
///
/// Targets are owned by the swapchain that produced them and become invalid
/// when it is recreated.
pub trait RenderTarget: Send + Sync {
    /// Extent of the target in pixels
    fn extent(&self) -> Extent2d;

    /// Pixel format and color space of the target
    fn format(&self) -> SurfaceFormat;
}
