/// Frame module - in-flight frame pool and the presentation scheduler

// Module declarations
pub mod frame_pool;
pub mod scheduler;

// Re-export from modules
pub use frame_pool::*;
pub use scheduler::*;
