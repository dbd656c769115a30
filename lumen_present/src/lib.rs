/*!
# Lumen Present

Core traits and types for the Lumen frame presentation pipeline.

This crate provides the backend-agnostic machinery for driving a presentable
surface: capability negotiation, swapchain lifecycle, and the frame
acquire/submit/present scheduling protocol. Backend implementations (Vulkan)
plug in through the device trait layer.

## Architecture

- **PresentDevice**: backend factory and submission seam
- **CapabilityNegotiator**: pure selection over a surface capability snapshot
- **SwapchainManager**: owns the one live swapchain, recreates it on resize
- **FramePool**: fixed ring of fence/semaphore/command-list contexts bounding
  frames in flight
- **FrameScheduler**: the per-tick acquire → render → submit → present state
  machine

The design targets a single submission thread driving one surface; render
content (shaders, pipelines, draw calls) is the host's concern and only sees
an `AcquiredFrame` per tick.
*/

// Internal modules
mod error;
pub mod device;
pub mod frame;
pub mod log;
pub mod swapchain;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, Result};

    // Device trait layer and bring-up configuration
    pub use crate::device::{
        CommandList, Config, DebugSeverity, FrameContext, PresentDevice, RenderTarget, Swapchain,
    };

    // Surface data model
    pub use crate::swapchain::surface::{
        ColorSpace, CompositeAlpha, Extent2d, FormatProperties, ImageFormat, ImageUsage,
        PresentMode, SurfaceCapabilities, SurfaceFormat, SurfaceTransform, SwapchainConfig,
    };

    // Swapchain lifecycle
    pub use crate::swapchain::swapchain_manager::SwapchainManager;

    // Frame scheduling
    pub use crate::frame::{
        AcquiredFrame, FramePool, FrameScheduler, FrameSchedulerDesc, PresentationState,
    };

    // Capability negotiation sub-module (pure selection functions)
    pub mod negotiator {
        pub use crate::swapchain::negotiator::{
            negotiate, select_composite_alpha, select_extent, select_image_count,
            select_present_mode, select_surface_format, select_transform, select_usage,
            DEFAULT_SURFACE_FORMAT,
        };
    }

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{
            dispatch, dispatch_detailed, reset_logger, set_logger, DefaultLogger, LogEntry,
            LogSeverity, Logger,
        };
        // Note: present_* macros are exported at the crate root by #[macro_export]
    }
}
