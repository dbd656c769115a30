/// Device module - backend trait seam for presentation

// Module declarations
pub mod device;
pub mod frame_context;
pub mod render_target;
pub mod swapchain;

#[cfg(test)]
pub mod mock_device;

// Re-export from modules
pub use device::*;
pub use frame_context::*;
pub use render_target::*;
pub use swapchain::*;
