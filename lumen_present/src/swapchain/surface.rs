/// Surface data model - capability snapshots and swapchain configuration

use bitflags::bitflags;

/// 2D dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2d {
    pub width: u32,
    pub height: u32,
}

impl Extent2d {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Presentable image pixel format
///
/// Variant names match the graphics API's spelling of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ImageFormat {
    /// Reported by some drivers as the single supported format, meaning
    /// "any format is acceptable"
    UNDEFINED,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
}

/// Color space a presentable image is interpreted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ColorSpace {
    SRGB_NONLINEAR,
    DISPLAY_P3_NONLINEAR,
    EXTENDED_SRGB_LINEAR,
}

/// A (format, color space) pair the surface can present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: ImageFormat,
    pub color_space: ColorSpace,
}

/// Surface policy for timing image hand-off to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// No synchronization with the display; may tear
    Immediate,
    /// Low latency without tearing; newest pending image replaces older ones
    Mailbox,
    /// Strict vertical sync; the only mode every surface must support
    Fifo,
    /// Vertical sync that tears instead of stalling when a frame is late
    FifoRelaxed,
}

bitflags! {
    /// Pre-transform applied by the presentation engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SurfaceTransform: u32 {
        const IDENTITY = 1 << 0;
        const ROTATE_90 = 1 << 1;
        const ROTATE_180 = 1 << 2;
        const ROTATE_270 = 1 << 3;
        const INHERIT = 1 << 4;
    }
}

bitflags! {
    /// How a presented image's alpha channel composites with the desktop
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CompositeAlpha: u32 {
        const OPAQUE = 1 << 0;
        const PRE_MULTIPLIED = 1 << 1;
        const POST_MULTIPLIED = 1 << 2;
        const INHERIT = 1 << 3;
    }
}

bitflags! {
    /// Ways swapchain images may be used
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const TRANSFER_SRC = 1 << 1;
        const TRANSFER_DST = 1 << 2;
        const SAMPLED = 1 << 3;
    }
}

/// Read-only snapshot of what a surface/device pair supports
///
/// Queried fresh from the backend before every swapchain creation; never
/// cached across a resize.
#[derive(Debug, Clone)]
pub struct SurfaceCapabilities {
    /// Minimum number of presentable images the surface requires
    pub min_image_count: u32,
    /// Maximum number of presentable images; 0 means unbounded
    pub max_image_count: u32,
    /// Extent the surface currently has
    pub current_extent: Extent2d,
    pub min_image_extent: Extent2d,
    pub max_image_extent: Extent2d,
    /// Transforms the presentation engine can apply
    pub supported_transforms: SurfaceTransform,
    /// Transform the surface is currently under
    pub current_transform: SurfaceTransform,
    /// Composite alpha modes the surface supports
    pub supported_composite_alpha: CompositeAlpha,
    /// Usages supported for swapchain images
    pub supported_usage: ImageUsage,
    /// Supported (format, color space) pairs; never empty
    pub formats: Vec<SurfaceFormat>,
    /// Supported present modes; never empty, always contains Fifo
    pub present_modes: Vec<PresentMode>,
}

/// Per-format capabilities relevant to swapchain image usage
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatProperties {
    /// Whether images of this format can be the source of a blit
    pub supports_blit_src: bool,
}

/// Chosen swapchain parameters
///
/// Built once by capability negotiation and consumed by a single swapchain
/// creation call; immutable afterwards. The surface itself is referenced
/// implicitly through the backend device that owns it.
#[derive(Debug, Clone)]
pub struct SwapchainConfig {
    pub surface_format: SurfaceFormat,
    pub extent: Extent2d,
    /// Requested image count; the driver may allocate more
    pub image_count: u32,
    pub pre_transform: SurfaceTransform,
    pub composite_alpha: CompositeAlpha,
    pub present_mode: PresentMode,
    pub image_usage: ImageUsage,
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
