/// VulkanContext - shared device/surface state for all backend resources

use ash::vk;

/// Shared Vulkan handles, owned once and referenced by every resource
///
/// Swapchains and frame contexts keep an `Arc` to the context, so the
/// handles outlive every resource created from them. The context's `Drop`
/// performs final teardown in reverse creation order after a device-idle
/// wait.
pub(crate) struct VulkanContext {
    /// Vulkan entry (kept alive for the loaders)
    pub _entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,

    /// The one surface this device presents into
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
    pub swapchain_loader: ash::khr::swapchain::Device,

    pub graphics_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub present_queue: vk::Queue,
    #[allow(dead_code)]
    pub present_queue_family: u32,

    #[cfg(feature = "vulkan-validation")]
    pub debug_utils: Option<ash::ext::debug_utils::Instance>,
    #[cfg(feature = "vulkan-validation")]
    pub debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            // All per-resource destruction has already run; only the device,
            // surface and instance remain.
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            #[cfg(feature = "vulkan-validation")]
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils, self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
