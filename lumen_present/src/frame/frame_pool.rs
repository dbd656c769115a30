/// FramePool - fixed ring of per-frame synchronization contexts

use crate::device::{FrameContext, PresentDevice};
use crate::error::Result;
use crate::present_bail;
use crate::present_debug;

/// Bounds the number of frames concurrently in flight between CPU and GPU
///
/// Each slot holds one [`FrameContext`]; the fence wait in [`acquire`] is
/// the sole throttling mechanism keeping the CPU from recording into a
/// command list the GPU might still be executing. The rotation index is
/// independent of the swapchain's own image index; the two may or may not
/// coincide and must never be assumed equal.
///
/// [`acquire`]: FramePool::acquire
pub struct FramePool {
    contexts: Vec<Box<dyn FrameContext>>,
    fence_timeout_ns: u64,
}

impl FramePool {
    /// Allocate `frames_in_flight` slots, each with a pre-signaled fence so
    /// the first pass over the ring never blocks.
    ///
    /// # Arguments
    ///
    /// * `device` - Backend that creates the per-slot contexts
    /// * `frames_in_flight` - Ring size, must be at least 1 (typically 2-3)
    /// * `fence_timeout_ns` - Bound for every fence wait; `u64::MAX` waits
    ///   forever
    pub fn new(
        device: &dyn PresentDevice,
        frames_in_flight: usize,
        fence_timeout_ns: u64,
    ) -> Result<Self> {
        if frames_in_flight == 0 {
            present_bail!("lumen::frame", "Frame pool requires at least one slot");
        }

        let mut contexts = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            contexts.push(device.create_frame_context()?);
        }

        present_debug!(
            "lumen::frame",
            "Frame pool created with {} frames in flight",
            frames_in_flight
        );

        Ok(Self {
            contexts,
            fence_timeout_ns,
        })
    }

    /// Check slot `index` out for a new logical frame.
    ///
    /// Blocks on the slot's fence until the GPU has finished consuming the
    /// slot's previous submission, then resets the fence for reuse.
    pub fn acquire(&self, index: usize) -> Result<()> {
        let ctx = &self.contexts[index];
        ctx.wait_fence(self.fence_timeout_ns)?;
        ctx.reset_fence()
    }

    /// Rotation successor of `index`
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.contexts.len()
    }

    /// Number of slots in the ring
    pub fn frames_in_flight(&self) -> usize {
        self.contexts.len()
    }

    /// The context held by slot `index`
    pub fn context(&self, index: usize) -> &dyn FrameContext {
        self.contexts[index].as_ref()
    }
}

#[cfg(test)]
#[path = "frame_pool_tests.rs"]
mod tests;
