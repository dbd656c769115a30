/// SwapchainManager - owner of the one live swapchain

use std::sync::Arc;

use crate::device::{FrameContext, PresentDevice, RenderTarget, Swapchain};
use crate::error::Result;
use crate::present_err;
use crate::present_info;
use crate::swapchain::negotiator;
use crate::swapchain::surface::{Extent2d, SurfaceFormat, SwapchainConfig};

/// Owns exactly one live swapchain and its per-image resources
///
/// At most one swapchain is live at a time; during recreation the retiring
/// one briefly coexists inside the backend's creation call (so the driver
/// may alias internal allocations) and is destroyed before the call
/// returns. Recreation invalidates every image index acquired from the
/// retiring swapchain.
pub struct SwapchainManager {
    device: Arc<dyn PresentDevice>,
    swapchain: Option<Box<dyn Swapchain>>,
    config: SwapchainConfig,
}

impl SwapchainManager {
    /// Negotiate against the surface's current capabilities and create the
    /// initial swapchain.
    pub fn new(device: Arc<dyn PresentDevice>) -> Result<Self> {
        let config = negotiator::negotiate(device.as_ref())?;
        let swapchain = device.create_swapchain(&config, None)?;

        present_info!(
            "lumen::swapchain",
            "Swapchain created: {}x{}, {:?}, {} images",
            config.extent.width,
            config.extent.height,
            config.surface_format.format,
            swapchain.image_count()
        );

        Ok(Self {
            device,
            swapchain: Some(swapchain),
            config,
        })
    }

    /// Tear down and rebuild the swapchain after a resize.
    ///
    /// Blocks until the device has finished all outstanding work (coarse
    /// synchronization), re-runs capability negotiation against the current
    /// surface state, and hands the retiring swapchain to the creation call
    /// as `previous`.
    ///
    /// On creation failure the manager is left without a live swapchain;
    /// acquire/present then report a backend error instead of touching
    /// stale resources. Creation failure against a valid config is fatal,
    /// so this only affects error-path diagnostics.
    pub fn recreate(&mut self) -> Result<()> {
        self.device.wait_idle()?;

        let config = negotiator::negotiate(self.device.as_ref())?;
        let previous = self.swapchain.take();
        let swapchain = self.device.create_swapchain(&config, previous)?;

        present_info!(
            "lumen::swapchain",
            "Swapchain recreated: {}x{}, {} images",
            config.extent.width,
            config.extent.height,
            swapchain.image_count()
        );

        self.config = config;
        self.swapchain = Some(swapchain);
        Ok(())
    }

    fn live(&self) -> Result<&dyn Swapchain> {
        self.swapchain
            .as_deref()
            .ok_or_else(|| present_err!("lumen::swapchain", "No live swapchain"))
    }

    /// Request the next presentable image, signaling `ctx`'s image-available
    /// semaphore when it is ready.
    pub fn acquire_image(&self, ctx: &dyn FrameContext, timeout_ns: u64) -> Result<u32> {
        self.live()?.acquire_next_image(ctx, timeout_ns)
    }

    /// Queue `image_index` for presentation, waiting on `ctx`'s
    /// render-complete semaphore.
    pub fn present(&self, image_index: u32, ctx: &dyn FrameContext) -> Result<()> {
        self.live()?.present(image_index, ctx)
    }

    /// Number of presentable images in the live swapchain
    pub fn image_count(&self) -> usize {
        self.swapchain
            .as_ref()
            .map(|s| s.image_count())
            .unwrap_or(self.config.image_count as usize)
    }

    /// Extent of the presentable images in pixels
    pub fn extent(&self) -> Extent2d {
        self.swapchain
            .as_ref()
            .map(|s| s.extent())
            .unwrap_or(self.config.extent)
    }

    /// Format and color space of the presentable images
    pub fn format(&self) -> SurfaceFormat {
        self.config.surface_format
    }

    /// The configuration the live swapchain was created from
    pub fn config(&self) -> &SwapchainConfig {
        &self.config
    }

    /// Render target for one presentable image
    pub fn target(&self, image_index: u32) -> Result<Arc<dyn RenderTarget>> {
        self.live()?.target(image_index)
    }
}

#[cfg(test)]
#[path = "swapchain_manager_tests.rs"]
mod tests;
