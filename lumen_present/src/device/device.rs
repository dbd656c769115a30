/// PresentDevice trait - backend factory and submission interface

use crate::device::{FrameContext, Swapchain};
use crate::error::Result;
use crate::swapchain::surface::{
    FormatProperties, ImageFormat, SurfaceCapabilities, SwapchainConfig,
};

/// Which backend validation messages to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Device bring-up configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Severity filter for validation messages
    pub debug_severity: DebugSeverity,
    /// Application name reported to the backend
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: false,
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            app_name: "Lumen Application".to_string(),
        }
    }
}

/// Backend device driving one presentable surface
///
/// The central seam between the presentation pipeline and a concrete
/// graphics backend. Implementations own the surface handle, the queues,
/// and the capability queries; the pipeline never touches native handles.
pub trait PresentDevice: Send + Sync {
    /// Query a fresh snapshot of what the surface supports.
    ///
    /// Called before every swapchain creation; the result must reflect the
    /// surface's current extent, so it is never cached across a resize.
    fn surface_capabilities(&self) -> Result<SurfaceCapabilities>;

    /// Query per-format capabilities used by usage-flag selection
    fn format_properties(&self, format: ImageFormat) -> Result<FormatProperties>;

    /// Create a swapchain from `config`.
    ///
    /// When `previous` is given, the backend may reuse its internal
    /// allocations; the retiring swapchain and all of its per-image
    /// resources are destroyed before this call returns. Every image index
    /// acquired from `previous` is invalid afterwards.
    fn create_swapchain(
        &self,
        config: &SwapchainConfig,
        previous: Option<Box<dyn Swapchain>>,
    ) -> Result<Box<dyn Swapchain>>;

    /// Create one frame-ring slot (fence pre-signaled, semaphores unsignaled,
    /// command list ready to record)
    fn create_frame_context(&self) -> Result<Box<dyn FrameContext>>;

    /// Submit the context's recorded command list to the graphics queue.
    ///
    /// The submission waits the context's image-available semaphore at the
    /// color-attachment-output stage (earlier pipeline stages may run before
    /// the image is ready), signals its render-complete semaphore, and
    /// attaches its fence so a later [`FrameContext::wait_fence`] observes
    /// completion.
    fn submit(&self, ctx: &dyn FrameContext) -> Result<()>;

    /// Block until the device has finished all outstanding work
    fn wait_idle(&self) -> Result<()>;
}
