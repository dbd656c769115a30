/// Swapchain trait - one live presentable-image set

use std::sync::Arc;

use crate::device::{FrameContext, RenderTarget};
use crate::error::Result;
use crate::swapchain::surface::{Extent2d, SurfaceFormat};

/// The live set of presentable images plus their per-image render targets
///
/// Created by [`PresentDevice::create_swapchain`] and exclusively owned by
/// the swapchain manager. Dropping a swapchain destroys its images, views
/// and framebuffers; the caller must ensure no GPU work still references
/// them.
///
/// [`PresentDevice::create_swapchain`]: crate::device::PresentDevice::create_swapchain
pub trait Swapchain: Send + Sync {
    /// Request the next presentable image.
    ///
    /// The presentation engine signals `ctx`'s image-available semaphore
    /// once the image may actually be written; the returned index is valid
    /// immediately for target lookup but only against this swapchain.
    ///
    /// # Errors
    ///
    /// [`Error::SwapchainOutOfDate`] when the surface no longer matches
    /// (resize); [`Error::Timeout`] when a bounded wait expires.
    ///
    /// [`Error::SwapchainOutOfDate`]: crate::lumen::Error::SwapchainOutOfDate
    /// [`Error::Timeout`]: crate::lumen::Error::Timeout
    fn acquire_next_image(&self, ctx: &dyn FrameContext, timeout_ns: u64) -> Result<u32>;

    /// Queue `image_index` for presentation, waiting on `ctx`'s
    /// render-complete semaphore.
    fn present(&self, image_index: u32, ctx: &dyn FrameContext) -> Result<()>;

    /// Number of presentable images the driver actually allocated
    fn image_count(&self) -> usize;

    /// Extent of the presentable images in pixels
    fn extent(&self) -> Extent2d;

    /// Format and color space of the presentable images
    fn format(&self) -> SurfaceFormat;

    /// Render target (image view + framebuffer) for one presentable image
    fn target(&self, image_index: u32) -> Result<Arc<dyn RenderTarget>>;
}
