/// VulkanSwapchain - Vulkan implementation of the Swapchain trait

use std::sync::Arc;

use ash::vk;
use lumen_present::lumen::{
    Error, Extent2d, FrameContext, RenderTarget, Result, Swapchain, SwapchainConfig,
    SurfaceFormat,
};
use lumen_present::{present_debug, present_error};

use crate::vulkan_context::VulkanContext;
use crate::vulkan_device::{
    composite_alpha_to_vk, format_to_vk, map_vk_error, present_mode_to_vk, transform_to_vk,
    usage_to_vk,
};
use crate::vulkan_frame_context::VulkanFrameContext;
use crate::vulkan_render_target::VulkanRenderTarget;

/// The live presentable-image set with one view and one framebuffer per
/// image
///
/// Created from a negotiated [`SwapchainConfig`]; when handed the retiring
/// swapchain, its raw handle is passed to the creation call so the driver
/// may alias internal allocations, and the retiring resources are destroyed
/// before creation returns.
pub struct VulkanSwapchain {
    context: Arc<VulkanContext>,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,
    render_pass: vk::RenderPass,
    targets: Vec<Arc<VulkanRenderTarget>>,
    format: SurfaceFormat,
    extent: vk::Extent2D,
}

impl VulkanSwapchain {
    pub(crate) fn new(
        context: Arc<VulkanContext>,
        config: &SwapchainConfig,
        previous: Option<Box<dyn Swapchain>>,
    ) -> Result<Self> {
        unsafe {
            // The retiring swapchain always comes from the same device, so
            // the concrete type is VulkanSwapchain.
            let old_swapchain = previous
                .as_deref()
                .map(|p| (*(p as *const dyn Swapchain as *const VulkanSwapchain)).swapchain)
                .unwrap_or(vk::SwapchainKHR::null());

            let vk_format = format_to_vk(config.surface_format.format);
            let extent = vk::Extent2D {
                width: config.extent.width,
                height: config.extent.height,
            };

            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(context.surface)
                .min_image_count(config.image_count)
                .image_format(vk_format)
                .image_color_space(crate::vulkan_device::color_space_to_vk(
                    config.surface_format.color_space,
                ))
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(usage_to_vk(config.image_usage))
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(transform_to_vk(config.pre_transform))
                .composite_alpha(composite_alpha_to_vk(config.composite_alpha))
                .present_mode(present_mode_to_vk(config.present_mode))
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = context
                .swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    present_error!("lumen::vulkan", "Failed to create swapchain: {:?}", e);
                    match e {
                        vk::Result::ERROR_OUT_OF_HOST_MEMORY
                        | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => Error::AllocationFailed(
                            format!("Failed to create swapchain: {:?}", e),
                        ),
                        other => map_vk_error(other, "Failed to create swapchain"),
                    }
                })?;

            // Destroy the retiring swapchain and its per-image resources now
            // that the driver has had its chance to reuse them.
            drop(previous);

            let images = context
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| map_vk_error(e, "Failed to get swapchain images"))?;

            let render_pass = create_present_render_pass(&context, vk_format)?;

            let mut image_views = Vec::with_capacity(images.len());
            for &image in &images {
                let create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(vk_format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let view = context
                    .device
                    .create_image_view(&create_info, None)
                    .map_err(|e| {
                        Error::AllocationFailed(format!("Failed to create image view: {:?}", e))
                    })?;
                image_views.push(view);
            }

            let mut framebuffers = Vec::with_capacity(image_views.len());
            for &view in &image_views {
                let attachments = [view];
                let framebuffer_info = vk::FramebufferCreateInfo::default()
                    .render_pass(render_pass)
                    .attachments(&attachments)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1);

                let framebuffer = context
                    .device
                    .create_framebuffer(&framebuffer_info, None)
                    .map_err(|e| {
                        Error::AllocationFailed(format!("Failed to create framebuffer: {:?}", e))
                    })?;
                framebuffers.push(framebuffer);
            }

            let core_extent = Extent2d::new(extent.width, extent.height);
            let targets = image_views
                .iter()
                .zip(&framebuffers)
                .map(|(&view, &framebuffer)| {
                    Arc::new(VulkanRenderTarget::new(
                        core_extent,
                        config.surface_format,
                        view,
                        framebuffer,
                        render_pass,
                    ))
                })
                .collect();

            present_debug!(
                "lumen::vulkan",
                "Swapchain created: {}x{}, {:?}, {} images{}",
                extent.width,
                extent.height,
                vk_format,
                images.len(),
                if old_swapchain != vk::SwapchainKHR::null() {
                    " (reused previous)"
                } else {
                    ""
                }
            );

            Ok(Self {
                context,
                swapchain,
                images,
                image_views,
                framebuffers,
                render_pass,
                targets,
                format: config.surface_format,
                extent,
            })
        }
    }
}

impl Swapchain for VulkanSwapchain {
    fn acquire_next_image(&self, ctx: &dyn FrameContext, timeout_ns: u64) -> Result<u32> {
        let frame = unsafe { &*(ctx as *const dyn FrameContext as *const VulkanFrameContext) };

        unsafe {
            match self.context.swapchain_loader.acquire_next_image(
                self.swapchain,
                timeout_ns,
                frame.image_available_semaphore(),
                vk::Fence::null(),
            ) {
                // A suboptimal acquire still delivered a usable image; it is
                // used for this tick and the next present reports the state.
                Ok((image_index, _suboptimal)) => Ok(image_index),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(Error::SwapchainOutOfDate),
                Err(vk::Result::TIMEOUT) | Err(vk::Result::NOT_READY) => Err(Error::Timeout),
                Err(e) => Err(map_vk_error(e, "Failed to acquire swapchain image")),
            }
        }
    }

    fn present(&self, image_index: u32, ctx: &dyn FrameContext) -> Result<()> {
        let frame = unsafe { &*(ctx as *const dyn FrameContext as *const VulkanFrameContext) };

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [frame.render_complete_semaphore()];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe {
            match self
                .context
                .swapchain_loader
                .queue_present(self.context.present_queue, &present_info)
            {
                Ok(false) => Ok(()),
                // Suboptimal at present time is folded into out-of-date so
                // the scheduler rebuilds for the new surface state.
                Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    Err(Error::SwapchainOutOfDate)
                }
                Err(e) => Err(map_vk_error(e, "Failed to present swapchain image")),
            }
        }
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn extent(&self) -> Extent2d {
        Extent2d::new(self.extent.width, self.extent.height)
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn target(&self, image_index: u32) -> Result<Arc<dyn RenderTarget>> {
        self.targets
            .get(image_index as usize)
            .map(|t| Arc::clone(t) as Arc<dyn RenderTarget>)
            .ok_or_else(|| {
                Error::BackendError(format!(
                    "target: image index {} out of range (count: {})",
                    image_index,
                    self.targets.len()
                ))
            })
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            // Callers guarantee no GPU work still references these images
            // (device-idle wait before recreation or shutdown).
            for &framebuffer in &self.framebuffers {
                self.context.device.destroy_framebuffer(framebuffer, None);
            }
            self.context.device.destroy_render_pass(self.render_pass, None);
            for &view in &self.image_views {
                self.context.device.destroy_image_view(view, None);
            }
            self.context
                .swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
    }
}

/// Render pass every presentable image is drawn through: clear on load,
/// store, and hand the image to the presentation engine in present layout
fn create_present_render_pass(
    context: &VulkanContext,
    format: vk::Format,
) -> Result<vk::RenderPass> {
    let attachments = [vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];

    let color_attachment_refs = [vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];

    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_attachment_refs)];

    // Color writes wait for the image-available semaphore, which the queue
    // submission gates at this same stage.
    let dependencies = [vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    unsafe {
        context
            .device
            .create_render_pass(&render_pass_info, None)
            .map_err(|e| {
                Error::AllocationFailed(format!("Failed to create render pass: {:?}", e))
            })
    }
}
