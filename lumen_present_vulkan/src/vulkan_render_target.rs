/// VulkanRenderTarget - Vulkan implementation of the RenderTarget trait

use ash::vk;
use lumen_present::lumen::{Extent2d, RenderTarget, SurfaceFormat};

/// One presentable image's view + framebuffer pair
///
/// The handles are owned by the swapchain that created this target; the
/// target itself owns nothing and becomes invalid when that swapchain is
/// recreated.
pub struct VulkanRenderTarget {
    extent: Extent2d,
    format: SurfaceFormat,
    image_view: vk::ImageView,
    framebuffer: vk::Framebuffer,
    render_pass: vk::RenderPass,
}

impl VulkanRenderTarget {
    pub(crate) fn new(
        extent: Extent2d,
        format: SurfaceFormat,
        image_view: vk::ImageView,
        framebuffer: vk::Framebuffer,
        render_pass: vk::RenderPass,
    ) -> Self {
        Self {
            extent,
            format,
            image_view,
            framebuffer,
            render_pass,
        }
    }

    /// Raw image view for render content binding
    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    /// Framebuffer covering the whole image, compatible with
    /// [`render_pass`](Self::render_pass)
    pub fn framebuffer(&self) -> vk::Framebuffer {
        self.framebuffer
    }

    /// Presentation render pass: clears on load, stores, and leaves the
    /// image in present layout
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }
}

impl RenderTarget for VulkanRenderTarget {
    fn extent(&self) -> Extent2d {
        self.extent
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }
}
