/// FrameContext and CommandList traits - per-slot synchronization objects

use std::sync::Arc;

use crate::error::Result;

/// One frame-ring slot: fence, image-available semaphore, render-complete
/// semaphore, and a command list
///
/// Created once at pool initialization with the fence pre-signaled so the
/// first pass over the ring never blocks. A slot is checked out by exactly
/// one logical frame at a time; the fence wait is what enforces that, not a
/// lock (single submission thread).
pub trait FrameContext: Send + Sync {
    /// Block until the GPU signals it has finished the slot's previous
    /// submission.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when `timeout_ns` expires before the fence
    /// signals.
    ///
    /// [`Error::Timeout`]: crate::lumen::Error::Timeout
    fn wait_fence(&self, timeout_ns: u64) -> Result<()>;

    /// Return the fence to the unsignaled state for reuse
    fn reset_fence(&self) -> Result<()>;

    /// The slot's command list
    fn command_list(&self) -> Arc<dyn CommandList>;
}

/// Command recording surface handed to render content each frame
///
/// Recording state lives behind `&self` so the list can be shared with the
/// render-content collaborator as a trait object.
pub trait CommandList: Send + Sync {
    /// Reset the list and begin recording
    fn begin(&self) -> Result<()>;

    /// Finish recording; the list is ready for submission afterwards
    fn end(&self) -> Result<()>;
}
