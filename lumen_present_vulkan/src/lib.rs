/*!
# Lumen Present - Vulkan Backend

Vulkan implementation of the Lumen presentation pipeline.

This crate implements the `lumen_present` device trait layer with Ash:
instance/surface/device bring-up from a raw window handle, swapchain plus
per-image views and framebuffers, fences/semaphores/command buffers, and
queue submit/present.

Validation layer support (VK_LAYER_KHRONOS_validation plus a colored debug
messenger) compiles in behind the `vulkan-validation` feature; without it,
requesting validation at runtime logs a warning and proceeds without layers.
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_device;
mod vulkan_frame_context;
mod vulkan_render_target;
mod vulkan_swapchain;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_device::VulkanPresentDevice;
pub use vulkan_frame_context::{VulkanCommandList, VulkanFrameContext};
pub use vulkan_render_target::VulkanRenderTarget;
pub use vulkan_swapchain::VulkanSwapchain;
