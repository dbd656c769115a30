/// VulkanFrameContext - per-slot fence, semaphores, and command list

use std::sync::{Arc, Mutex};

use ash::vk;
use lumen_present::lumen::{CommandList, Error, FrameContext, Result};
use lumen_present::present_err;

use crate::vulkan_context::VulkanContext;
use crate::vulkan_device::map_vk_error;

/// One frame-ring slot backed by Vulkan synchronization objects
///
/// The fence is created signaled so the slot's first checkout never blocks.
/// The semaphores pair one acquire with one submit and one present; they are
/// never waited on by the CPU.
pub struct VulkanFrameContext {
    context: Arc<VulkanContext>,
    image_available: vk::Semaphore,
    render_complete: vk::Semaphore,
    fence: vk::Fence,
    command_list: Arc<VulkanCommandList>,
}

impl VulkanFrameContext {
    pub fn new(context: Arc<VulkanContext>) -> Result<Self> {
        unsafe {
            let semaphore_create_info = vk::SemaphoreCreateInfo::default();

            let image_available = context
                .device
                .create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    Error::AllocationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;

            let render_complete = context
                .device
                .create_semaphore(&semaphore_create_info, None)
                .map_err(|e| {
                    context.device.destroy_semaphore(image_available, None);
                    Error::AllocationFailed(format!("Failed to create semaphore: {:?}", e))
                })?;

            // Pre-signaled so the first N frames never block on the ring
            let fence_create_info =
                vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

            let fence = context
                .device
                .create_fence(&fence_create_info, None)
                .map_err(|e| {
                    context.device.destroy_semaphore(image_available, None);
                    context.device.destroy_semaphore(render_complete, None);
                    Error::AllocationFailed(format!("Failed to create fence: {:?}", e))
                })?;

            let command_list = Arc::new(VulkanCommandList::new(Arc::clone(&context))?);

            Ok(Self {
                context,
                image_available,
                render_complete,
                fence,
                command_list,
            })
        }
    }

    /// Semaphore the presentation engine signals when the acquired image is
    /// ready to be written
    pub fn image_available_semaphore(&self) -> vk::Semaphore {
        self.image_available
    }

    /// Semaphore the queue submission signals when rendering completes
    pub fn render_complete_semaphore(&self) -> vk::Semaphore {
        self.render_complete
    }

    /// Fence attached to the slot's submission
    pub fn fence_handle(&self) -> vk::Fence {
        self.fence
    }

    /// Raw command buffer for submission
    pub(crate) fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_list.handle()
    }
}

impl FrameContext for VulkanFrameContext {
    fn wait_fence(&self, timeout_ns: u64) -> Result<()> {
        unsafe {
            self.context
                .device
                .wait_for_fences(&[self.fence], true, timeout_ns)
                .map_err(|e| map_vk_error(e, "Failed to wait for frame fence"))
        }
    }

    fn reset_fence(&self) -> Result<()> {
        unsafe {
            self.context
                .device
                .reset_fences(&[self.fence])
                .map_err(|e| map_vk_error(e, "Failed to reset frame fence"))
        }
    }

    fn command_list(&self) -> Arc<dyn CommandList> {
        Arc::clone(&self.command_list) as Arc<dyn CommandList>
    }
}

impl Drop for VulkanFrameContext {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_semaphore(self.image_available, None);
            self.context.device.destroy_semaphore(self.render_complete, None);
            self.context.device.destroy_fence(self.fence, None);
        }
    }
}

/// Vulkan command list with its own pool
///
/// Recording state sits behind a mutex so recording can be driven through
/// `&self` trait calls; there is still only one recording thread.
pub struct VulkanCommandList {
    context: Arc<VulkanContext>,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    recording: Mutex<bool>,
}

impl VulkanCommandList {
    pub fn new(context: Arc<VulkanContext>) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(context.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = context
                .device
                .create_command_pool(&command_pool_create_info, None)
                .map_err(|e| {
                    Error::AllocationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = context
                .device
                .allocate_command_buffers(&command_buffer_allocate_info)
                .map_err(|e| {
                    context.device.destroy_command_pool(command_pool, None);
                    Error::AllocationFailed(format!("Failed to allocate command buffer: {:?}", e))
                })?;

            Ok(Self {
                context,
                command_pool,
                command_buffer: command_buffers[0],
                recording: Mutex::new(false),
            })
        }
    }

    /// Raw command buffer handle for render content to record into
    pub fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&self) -> Result<()> {
        let mut recording = self.recording.lock().unwrap();
        if *recording {
            return Err(present_err!(
                "lumen::vulkan",
                "Command list already recording"
            ));
        }

        unsafe {
            self.context
                .device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| map_vk_error(e, "Failed to reset command buffer"))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.context
                .device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| map_vk_error(e, "Failed to begin command buffer"))?;
        }

        *recording = true;
        Ok(())
    }

    fn end(&self) -> Result<()> {
        let mut recording = self.recording.lock().unwrap();
        if !*recording {
            return Err(present_err!("lumen::vulkan", "Command list not recording"));
        }

        unsafe {
            self.context
                .device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| map_vk_error(e, "Failed to end command buffer"))?;
        }

        *recording = false;
        Ok(())
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            // Destroying the pool frees the buffer allocated from it
            self.context.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
