/// Swapchain module - surface data model, negotiation, and lifecycle

// Module declarations
pub mod negotiator;
pub mod surface;
pub mod swapchain_manager;

// Re-export from modules
pub use surface::*;
pub use swapchain_manager::*;
