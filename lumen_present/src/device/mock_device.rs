/// Mock present device for unit tests (no GPU required)
///
/// Simulates GPU completion well enough to exercise the frame pool, the
/// swapchain manager, and the scheduler: a submitted slot's fence becomes
/// "pending", a wait on a pending fence completes it and records that the
/// wait blocked, and a wait on a fence that is neither signaled nor pending
/// reports a timeout. Tests can script acquire/present outcomes and mutate
/// the advertised capabilities between queries to simulate a resize.

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use crate::device::{CommandList, FrameContext, PresentDevice, RenderTarget, Swapchain};
#[cfg(test)]
use crate::error::{Error, Result};
#[cfg(test)]
use crate::swapchain::surface::{
    ColorSpace, CompositeAlpha, Extent2d, FormatProperties, ImageFormat, ImageUsage, PresentMode,
    SurfaceCapabilities, SurfaceFormat, SurfaceTransform, SwapchainConfig,
};

// ============================================================================
// Shared state and counters
// ============================================================================

/// Counters shared between the mock device and the resources it creates
#[cfg(test)]
#[derive(Default)]
pub struct MockStats {
    pub swapchains_created: AtomicUsize,
    pub swapchains_destroyed: AtomicUsize,
    /// Creations that were handed the retiring swapchain as `previous`
    pub creations_with_previous: AtomicUsize,
    pub submits: AtomicUsize,
    pub presents: AtomicUsize,
    pub idle_waits: AtomicUsize,
    /// Fence waits that found the fence pending and had to block
    pub blocking_fence_waits: AtomicUsize,
}

/// Scripted outcomes consumed by the live mock swapchain
#[cfg(test)]
#[derive(Default)]
struct Script {
    acquire_results: Mutex<VecDeque<Result<u32>>>,
    present_results: Mutex<VecDeque<Result<()>>>,
}

// ============================================================================
// Mock device
// ============================================================================

#[cfg(test)]
pub struct MockPresentDevice {
    caps: Mutex<SurfaceCapabilities>,
    format_props: Mutex<FormatProperties>,
    stats: Arc<MockStats>,
    script: Arc<Script>,
}

#[cfg(test)]
impl MockPresentDevice {
    /// Capabilities a typical desktop surface would report
    pub fn default_capabilities() -> SurfaceCapabilities {
        SurfaceCapabilities {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: Extent2d::new(800, 600),
            min_image_extent: Extent2d::new(1, 1),
            max_image_extent: Extent2d::new(4096, 4096),
            supported_transforms: SurfaceTransform::IDENTITY | SurfaceTransform::ROTATE_90,
            current_transform: SurfaceTransform::IDENTITY,
            supported_composite_alpha: CompositeAlpha::OPAQUE | CompositeAlpha::INHERIT,
            supported_usage: ImageUsage::COLOR_ATTACHMENT
                | ImageUsage::TRANSFER_SRC
                | ImageUsage::TRANSFER_DST,
            formats: vec![
                SurfaceFormat {
                    format: ImageFormat::B8G8R8A8_SRGB,
                    color_space: ColorSpace::SRGB_NONLINEAR,
                },
                SurfaceFormat {
                    format: ImageFormat::R8G8B8A8_UNORM,
                    color_space: ColorSpace::SRGB_NONLINEAR,
                },
            ],
            present_modes: vec![PresentMode::Fifo, PresentMode::Mailbox],
        }
    }

    pub fn new() -> Self {
        Self::with_capabilities(Self::default_capabilities())
    }

    pub fn with_capabilities(caps: SurfaceCapabilities) -> Self {
        Self {
            caps: Mutex::new(caps),
            format_props: Mutex::new(FormatProperties {
                supports_blit_src: true,
            }),
            stats: Arc::new(MockStats::default()),
            script: Arc::new(Script::default()),
        }
    }

    pub fn stats(&self) -> &MockStats {
        &self.stats
    }

    /// Replace the advertised capability snapshot (simulated resize)
    pub fn set_capabilities(&self, caps: SurfaceCapabilities) {
        *self.caps.lock().unwrap() = caps;
    }

    /// Change only the advertised current extent (simulated resize)
    pub fn set_current_extent(&self, width: u32, height: u32) {
        self.caps.lock().unwrap().current_extent = Extent2d::new(width, height);
    }

    pub fn set_format_properties(&self, props: FormatProperties) {
        *self.format_props.lock().unwrap() = props;
    }

    /// Queue an outcome for the next acquire on the live swapchain
    pub fn script_acquire(&self, result: Result<u32>) {
        self.script
            .acquire_results
            .lock()
            .unwrap()
            .push_back(result);
    }

    /// Queue an outcome for the next present on the live swapchain
    pub fn script_present(&self, result: Result<()>) {
        self.script
            .present_results
            .lock()
            .unwrap()
            .push_back(result);
    }
}

#[cfg(test)]
impl PresentDevice for MockPresentDevice {
    fn surface_capabilities(&self) -> Result<SurfaceCapabilities> {
        Ok(self.caps.lock().unwrap().clone())
    }

    fn format_properties(&self, _format: ImageFormat) -> Result<FormatProperties> {
        Ok(*self.format_props.lock().unwrap())
    }

    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        previous: Option<Box<dyn Swapchain>>,
    ) -> Result<Box<dyn Swapchain>> {
        self.stats.swapchains_created.fetch_add(1, Ordering::SeqCst);
        if previous.is_some() {
            self.stats
                .creations_with_previous
                .fetch_add(1, Ordering::SeqCst);
        }
        // Dropping `previous` here is the mock's "destroy after create"
        drop(previous);

        Ok(Box::new(MockSwapchain {
            image_count: config.image_count as usize,
            extent: config.extent,
            format: config.surface_format,
            next_image: AtomicUsize::new(0),
            stats: Arc::clone(&self.stats),
            script: Arc::clone(&self.script),
        }))
    }

    fn create_frame_context(&self) -> Result<Box<dyn FrameContext>> {
        Ok(Box::new(MockFrameContext::new(Arc::clone(&self.stats))))
    }

    fn submit(&self, ctx: &dyn FrameContext) -> Result<()> {
        self.stats.submits.fetch_add(1, Ordering::SeqCst);
        // The submission attaches the slot's fence; the simulated GPU
        // signals it when something later waits on it.
        let mock = unsafe { &*(ctx as *const dyn FrameContext as *const MockFrameContext) };
        *mock.fence.lock().unwrap() = FenceState::Pending;
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.stats.idle_waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Mock swapchain
// ============================================================================

#[cfg(test)]
pub struct MockSwapchain {
    image_count: usize,
    extent: Extent2d,
    format: SurfaceFormat,
    next_image: AtomicUsize,
    stats: Arc<MockStats>,
    script: Arc<Script>,
}

#[cfg(test)]
impl Swapchain for MockSwapchain {
    fn acquire_next_image(&self, _ctx: &dyn FrameContext, _timeout_ns: u64) -> Result<u32> {
        if let Some(result) = self.script.acquire_results.lock().unwrap().pop_front() {
            return result;
        }
        let index = self.next_image.fetch_add(1, Ordering::SeqCst) % self.image_count;
        Ok(index as u32)
    }

    fn present(&self, image_index: u32, _ctx: &dyn FrameContext) -> Result<()> {
        self.stats.presents.fetch_add(1, Ordering::SeqCst);
        if image_index as usize >= self.image_count {
            return Err(Error::BackendError(format!(
                "present: image index {} out of range (count: {})",
                image_index, self.image_count
            )));
        }
        if let Some(result) = self.script.present_results.lock().unwrap().pop_front() {
            return result;
        }
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn extent(&self) -> Extent2d {
        self.extent
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn target(&self, image_index: u32) -> Result<Arc<dyn RenderTarget>> {
        if image_index as usize >= self.image_count {
            return Err(Error::BackendError(format!(
                "target: image index {} out of range (count: {})",
                image_index, self.image_count
            )));
        }
        Ok(Arc::new(MockRenderTarget {
            extent: self.extent,
            format: self.format,
        }))
    }
}

#[cfg(test)]
impl Drop for MockSwapchain {
    fn drop(&mut self) {
        self.stats
            .swapchains_destroyed
            .fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock frame context
// ============================================================================

/// Simulated fence states
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceState {
    /// A wait returns immediately
    Signaled,
    /// Reset and not attached to any submission; a wait can never complete
    Unsignaled,
    /// Attached to a submission the simulated GPU has not finished
    Pending,
}

#[cfg(test)]
pub struct MockFrameContext {
    fence: Mutex<FenceState>,
    stats: Arc<MockStats>,
    command_list: Arc<MockCommandList>,
}

#[cfg(test)]
impl MockFrameContext {
    pub fn new(stats: Arc<MockStats>) -> Self {
        Self {
            // Pre-signaled, matching real frame-context creation
            fence: Mutex::new(FenceState::Signaled),
            stats,
            command_list: Arc::new(MockCommandList::default()),
        }
    }

    pub fn fence_state(&self) -> FenceState {
        *self.fence.lock().unwrap()
    }

    pub fn mock_command_list(&self) -> &MockCommandList {
        &self.command_list
    }
}

#[cfg(test)]
impl FrameContext for MockFrameContext {
    fn wait_fence(&self, _timeout_ns: u64) -> Result<()> {
        let mut fence = self.fence.lock().unwrap();
        match *fence {
            FenceState::Signaled => Ok(()),
            FenceState::Pending => {
                // The simulated GPU finishes the submission while the CPU
                // blocks on it.
                *fence = FenceState::Signaled;
                self.stats
                    .blocking_fence_waits
                    .fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            FenceState::Unsignaled => Err(Error::Timeout),
        }
    }

    fn reset_fence(&self) -> Result<()> {
        *self.fence.lock().unwrap() = FenceState::Unsignaled;
        Ok(())
    }

    fn command_list(&self) -> Arc<dyn CommandList> {
        Arc::clone(&self.command_list) as Arc<dyn CommandList>
    }
}

// ============================================================================
// Mock command list and render target
// ============================================================================

#[cfg(test)]
#[derive(Default)]
pub struct MockCommandList {
    pub begins: AtomicUsize,
    pub ends: AtomicUsize,
    recording: Mutex<bool>,
}

#[cfg(test)]
impl CommandList for MockCommandList {
    fn begin(&self) -> Result<()> {
        let mut recording = self.recording.lock().unwrap();
        if *recording {
            return Err(Error::BackendError(
                "Command list already recording".to_string(),
            ));
        }
        *recording = true;
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn end(&self) -> Result<()> {
        let mut recording = self.recording.lock().unwrap();
        if !*recording {
            return Err(Error::BackendError(
                "Command list not recording".to_string(),
            ));
        }
        *recording = false;
        self.ends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
pub struct MockRenderTarget {
    extent: Extent2d,
    format: SurfaceFormat,
}

#[cfg(test)]
impl RenderTarget for MockRenderTarget {
    fn extent(&self) -> Extent2d {
        self.extent
    }

    fn format(&self) -> SurfaceFormat {
        self.format
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
