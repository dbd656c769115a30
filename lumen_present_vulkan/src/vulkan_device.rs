/// VulkanPresentDevice - Vulkan implementation of the PresentDevice trait

use std::ffi::CString;
use std::sync::Arc;

use ash::vk;
use lumen_present::lumen::{
    ColorSpace, CompositeAlpha, Config, Error, Extent2d, FormatProperties, FrameContext,
    ImageFormat, ImageUsage, PresentDevice, PresentMode, Result, SurfaceCapabilities,
    SurfaceFormat, SurfaceTransform, Swapchain, SwapchainConfig,
};
use lumen_present::{present_error, present_info, present_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::vulkan_context::VulkanContext;
use crate::vulkan_frame_context::VulkanFrameContext;
use crate::vulkan_swapchain::VulkanSwapchain;

/// Vulkan device driving one window surface
///
/// Owns the instance, the surface, the logical device and its queues.
/// Swapchain and frame-context creation, queue submission and presentation
/// all go through this type; the presentation pipeline itself never sees a
/// raw Vulkan handle.
pub struct VulkanPresentDevice {
    context: Arc<VulkanContext>,
}

impl VulkanPresentDevice {
    /// Bring up a Vulkan device for `window`.
    ///
    /// Creates the instance (with validation layers when requested and
    /// compiled in), the surface, picks the first Vulkan-capable GPU with
    /// graphics + present support, and creates the logical device with the
    /// swapchain extension enabled.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                present_error!("lumen::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            // Application Info
            let app_name = CString::new(config.app_name.as_str()).map_err(|e| {
                Error::InitializationFailed(format!("Invalid application name: {:?}", e))
            })?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(app_name.as_c_str())
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Lumen")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            // Required instance extensions for the window's display server
            let display_handle = window.display_handle().map_err(|e| {
                present_error!("lumen::vulkan", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        present_error!(
                            "lumen::vulkan",
                            "Failed to get required extensions: {:?}",
                            e
                        );
                        Error::InitializationFailed(format!(
                            "Failed to get required extensions: {:?}",
                            e
                        ))
                    })?
                    .to_vec();

            let validation = config.enable_validation && cfg!(feature = "vulkan-validation");
            if config.enable_validation && !validation {
                present_warn!(
                    "lumen::vulkan",
                    "Validation requested but the vulkan-validation feature is not compiled in"
                );
            }

            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names: Vec<*const std::os::raw::c_char> = if validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                present_error!("lumen::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            // Debug messenger for validation output
            #[cfg(feature = "vulkan-validation")]
            let (debug_utils, debug_messenger) = if validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(crate::debug::severity_flags(config.debug_severity))
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = debug_utils
                    .create_debug_utils_messenger(&debug_info, None)
                    .map_err(|e| {
                        present_error!(
                            "lumen::vulkan",
                            "Failed to create debug messenger: {:?}",
                            e
                        );
                        Error::InitializationFailed(format!(
                            "Failed to create debug messenger: {:?}",
                            e
                        ))
                    })?;

                (Some(debug_utils), Some(messenger))
            } else {
                (None, None)
            };

            // Create the surface the swapchain will present into
            let window_handle = window.window_handle().map_err(|e| {
                present_error!("lumen::vulkan", "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                present_error!("lumen::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Pick Physical Device
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                present_error!(
                    "lumen::vulkan",
                    "Failed to enumerate physical devices: {:?}",
                    e
                );
                Error::InitializationFailed(format!(
                    "Failed to enumerate physical devices: {:?}",
                    e
                ))
            })?;

            let physical_device = physical_devices.into_iter().next().ok_or_else(|| {
                present_error!("lumen::vulkan", "No Vulkan-capable GPU found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

            // Find Queue Families
            let queue_families =
                instance.get_physical_device_queue_family_properties(physical_device);

            let graphics_family_index = queue_families
                .iter()
                .enumerate()
                .find(|(_, qf)| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .map(|(i, _)| i as u32)
                .ok_or_else(|| {
                    present_error!("lumen::vulkan", "No graphics queue family found");
                    Error::InitializationFailed("No graphics queue family found".to_string())
                })?;

            let present_family_index = (0..queue_families.len() as u32)
                .find(|&i| {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    present_error!("lumen::vulkan", "No present queue family found");
                    Error::InitializationFailed("No present queue family found".to_string())
                })?;

            // Create Logical Device
            let queue_priorities = [1.0];
            let queue_create_infos = if graphics_family_index == present_family_index {
                vec![vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(graphics_family_index)
                    .queue_priorities(&queue_priorities)]
            } else {
                vec![
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(graphics_family_index)
                        .queue_priorities(&queue_priorities),
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(present_family_index)
                        .queue_priorities(&queue_priorities),
                ]
            };

            let device_extension_names = vec![ash::khr::swapchain::NAME.as_ptr()];

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    present_error!("lumen::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_family_index, 0);
            let present_queue = device.get_device_queue(present_family_index, 0);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            present_info!(
                "lumen::vulkan",
                "Vulkan device ready (graphics family {}, present family {})",
                graphics_family_index,
                present_family_index
            );

            Ok(Self {
                context: Arc::new(VulkanContext {
                    _entry: entry,
                    instance,
                    physical_device,
                    device,
                    surface,
                    surface_loader,
                    swapchain_loader,
                    graphics_queue,
                    graphics_queue_family: graphics_family_index,
                    present_queue,
                    present_queue_family: present_family_index,
                    #[cfg(feature = "vulkan-validation")]
                    debug_utils,
                    #[cfg(feature = "vulkan-validation")]
                    debug_messenger,
                }),
            })
        }
    }

    /// Raw logical device, for hosts building pipelines and recording
    /// against the presentation render pass
    pub fn device_handle(&self) -> &ash::Device {
        &self.context.device
    }

    /// Raw physical device, for host capability queries beyond this crate's
    /// scope
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.context.physical_device
    }

    /// Queue family index graphics submissions go to
    pub fn graphics_queue_family(&self) -> u32 {
        self.context.graphics_queue_family
    }
}

impl PresentDevice for VulkanPresentDevice {
    fn surface_capabilities(&self) -> Result<SurfaceCapabilities> {
        let ctx = &self.context;
        unsafe {
            let caps = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
                .map_err(|e| map_vk_error(e, "Failed to query surface capabilities"))?;

            let formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
                .map_err(|e| map_vk_error(e, "Failed to query surface formats"))?;

            let present_modes = ctx
                .surface_loader
                .get_physical_device_surface_present_modes(ctx.physical_device, ctx.surface)
                .map_err(|e| map_vk_error(e, "Failed to query present modes"))?;

            // Entries the core data model cannot represent are dropped from
            // the snapshot rather than mistranslated.
            let formats: Vec<SurfaceFormat> = formats
                .iter()
                .filter_map(|f| {
                    Some(SurfaceFormat {
                        format: vk_format_to_format(f.format)?,
                        color_space: vk_color_space_to_color_space(f.color_space)?,
                    })
                })
                .collect();

            let present_modes: Vec<PresentMode> = present_modes
                .iter()
                .filter_map(|&m| vk_present_mode_to_present_mode(m))
                .collect();

            Ok(SurfaceCapabilities {
                min_image_count: caps.min_image_count,
                max_image_count: caps.max_image_count,
                current_extent: Extent2d::new(
                    caps.current_extent.width,
                    caps.current_extent.height,
                ),
                min_image_extent: Extent2d::new(
                    caps.min_image_extent.width,
                    caps.min_image_extent.height,
                ),
                max_image_extent: Extent2d::new(
                    caps.max_image_extent.width,
                    caps.max_image_extent.height,
                ),
                supported_transforms: vk_transforms_to_transforms(caps.supported_transforms),
                current_transform: vk_transforms_to_transforms(caps.current_transform),
                supported_composite_alpha: vk_composite_alpha_to_composite_alpha(
                    caps.supported_composite_alpha,
                ),
                supported_usage: vk_usage_to_usage(caps.supported_usage_flags),
                formats,
                present_modes,
            })
        }
    }

    fn format_properties(&self, format: ImageFormat) -> Result<FormatProperties> {
        let props = unsafe {
            self.context.instance.get_physical_device_format_properties(
                self.context.physical_device,
                format_to_vk(format),
            )
        };

        Ok(FormatProperties {
            supports_blit_src: props
                .optimal_tiling_features
                .contains(vk::FormatFeatureFlags::BLIT_SRC),
        })
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        previous: Option<Box<dyn Swapchain>>,
    ) -> Result<Box<dyn Swapchain>> {
        let swapchain = VulkanSwapchain::new(Arc::clone(&self.context), config, previous)?;
        Ok(Box::new(swapchain))
    }

    fn create_frame_context(&self) -> Result<Box<dyn FrameContext>> {
        let ctx = VulkanFrameContext::new(Arc::clone(&self.context))?;
        Ok(Box::new(ctx))
    }

    fn submit(&self, ctx: &dyn FrameContext) -> Result<()> {
        // Contexts handed to this device always come from it; the concrete
        // type is VulkanFrameContext.
        let frame = unsafe { &*(ctx as *const dyn FrameContext as *const VulkanFrameContext) };

        let wait_semaphores = [frame.image_available_semaphore()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.render_complete_semaphore()];
        let command_buffers = [frame.command_buffer()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.context
                .device
                .queue_submit(
                    self.context.graphics_queue,
                    &[submit_info],
                    frame.fence_handle(),
                )
                .map_err(|e| {
                    present_error!(
                        "lumen::vulkan",
                        "Failed to submit commands to GPU queue: {:?}",
                        e
                    );
                    map_vk_error(e, "Failed to submit commands to GPU queue")
                })
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.context
                .device
                .device_wait_idle()
                .map_err(|e| map_vk_error(e, "Failed to wait for device idle"))
        }
    }
}

// ============================================================================
// Vulkan <-> core conversions
// ============================================================================

/// Convert a core image format to the Vulkan format
pub(crate) fn format_to_vk(format: ImageFormat) -> vk::Format {
    match format {
        ImageFormat::UNDEFINED => vk::Format::UNDEFINED,
        ImageFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        ImageFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        ImageFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        ImageFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
    }
}

/// Convert a Vulkan format to the core image format; `None` for formats the
/// core data model does not carry
pub(crate) fn vk_format_to_format(format: vk::Format) -> Option<ImageFormat> {
    match format {
        vk::Format::UNDEFINED => Some(ImageFormat::UNDEFINED),
        vk::Format::R8G8B8A8_UNORM => Some(ImageFormat::R8G8B8A8_UNORM),
        vk::Format::R8G8B8A8_SRGB => Some(ImageFormat::R8G8B8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(ImageFormat::B8G8R8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(ImageFormat::B8G8R8A8_SRGB),
        _ => None,
    }
}

pub(crate) fn color_space_to_vk(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SRGB_NONLINEAR => vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ColorSpace::DISPLAY_P3_NONLINEAR => vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
        ColorSpace::EXTENDED_SRGB_LINEAR => vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
    }
}

pub(crate) fn vk_color_space_to_color_space(color_space: vk::ColorSpaceKHR) -> Option<ColorSpace> {
    match color_space {
        vk::ColorSpaceKHR::SRGB_NONLINEAR => Some(ColorSpace::SRGB_NONLINEAR),
        vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT => Some(ColorSpace::DISPLAY_P3_NONLINEAR),
        vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT => Some(ColorSpace::EXTENDED_SRGB_LINEAR),
        _ => None,
    }
}

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

pub(crate) fn vk_present_mode_to_present_mode(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

/// Convert a single selected transform to its Vulkan flag
pub(crate) fn transform_to_vk(transform: SurfaceTransform) -> vk::SurfaceTransformFlagsKHR {
    let mut flags = vk::SurfaceTransformFlagsKHR::empty();
    if transform.contains(SurfaceTransform::IDENTITY) {
        flags |= vk::SurfaceTransformFlagsKHR::IDENTITY;
    }
    if transform.contains(SurfaceTransform::ROTATE_90) {
        flags |= vk::SurfaceTransformFlagsKHR::ROTATE_90;
    }
    if transform.contains(SurfaceTransform::ROTATE_180) {
        flags |= vk::SurfaceTransformFlagsKHR::ROTATE_180;
    }
    if transform.contains(SurfaceTransform::ROTATE_270) {
        flags |= vk::SurfaceTransformFlagsKHR::ROTATE_270;
    }
    if transform.contains(SurfaceTransform::INHERIT) {
        flags |= vk::SurfaceTransformFlagsKHR::INHERIT;
    }
    flags
}

pub(crate) fn vk_transforms_to_transforms(
    flags: vk::SurfaceTransformFlagsKHR,
) -> SurfaceTransform {
    let mut transforms = SurfaceTransform::empty();
    if flags.contains(vk::SurfaceTransformFlagsKHR::IDENTITY) {
        transforms |= SurfaceTransform::IDENTITY;
    }
    if flags.contains(vk::SurfaceTransformFlagsKHR::ROTATE_90) {
        transforms |= SurfaceTransform::ROTATE_90;
    }
    if flags.contains(vk::SurfaceTransformFlagsKHR::ROTATE_180) {
        transforms |= SurfaceTransform::ROTATE_180;
    }
    if flags.contains(vk::SurfaceTransformFlagsKHR::ROTATE_270) {
        transforms |= SurfaceTransform::ROTATE_270;
    }
    if flags.contains(vk::SurfaceTransformFlagsKHR::INHERIT) {
        transforms |= SurfaceTransform::INHERIT;
    }
    transforms
}

pub(crate) fn composite_alpha_to_vk(alpha: CompositeAlpha) -> vk::CompositeAlphaFlagsKHR {
    let mut flags = vk::CompositeAlphaFlagsKHR::empty();
    if alpha.contains(CompositeAlpha::OPAQUE) {
        flags |= vk::CompositeAlphaFlagsKHR::OPAQUE;
    }
    if alpha.contains(CompositeAlpha::PRE_MULTIPLIED) {
        flags |= vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED;
    }
    if alpha.contains(CompositeAlpha::POST_MULTIPLIED) {
        flags |= vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED;
    }
    if alpha.contains(CompositeAlpha::INHERIT) {
        flags |= vk::CompositeAlphaFlagsKHR::INHERIT;
    }
    flags
}

pub(crate) fn vk_composite_alpha_to_composite_alpha(
    flags: vk::CompositeAlphaFlagsKHR,
) -> CompositeAlpha {
    let mut alpha = CompositeAlpha::empty();
    if flags.contains(vk::CompositeAlphaFlagsKHR::OPAQUE) {
        alpha |= CompositeAlpha::OPAQUE;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED) {
        alpha |= CompositeAlpha::PRE_MULTIPLIED;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED) {
        alpha |= CompositeAlpha::POST_MULTIPLIED;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::INHERIT) {
        alpha |= CompositeAlpha::INHERIT;
    }
    alpha
}

pub(crate) fn usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::TRANSFER_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ImageUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    flags
}

pub(crate) fn vk_usage_to_usage(flags: vk::ImageUsageFlags) -> ImageUsage {
    let mut usage = ImageUsage::empty();
    if flags.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT) {
        usage |= ImageUsage::COLOR_ATTACHMENT;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_SRC) {
        usage |= ImageUsage::TRANSFER_SRC;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_DST) {
        usage |= ImageUsage::TRANSFER_DST;
    }
    if flags.contains(vk::ImageUsageFlags::SAMPLED) {
        usage |= ImageUsage::SAMPLED;
    }
    usage
}

/// Map a Vulkan error code to the core error taxonomy
pub(crate) fn map_vk_error(result: vk::Result, what: &str) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DATE_KHR => Error::SwapchainOutOfDate,
        vk::Result::ERROR_SURFACE_LOST_KHR => Error::SurfaceLost,
        vk::Result::ERROR_DEVICE_LOST => Error::DeviceLost,
        vk::Result::TIMEOUT => Error::Timeout,
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            Error::AllocationFailed(format!("{}: {:?}", what, result))
        }
        other => Error::BackendError(format!("{}: {:?}", what, other)),
    }
}

#[cfg(test)]
#[path = "vulkan_convert_tests.rs"]
mod tests;
