/// FrameScheduler - the acquire/render/submit/present state machine

use std::sync::Arc;

use crate::device::{CommandList, PresentDevice, RenderTarget};
use crate::error::{Error, Result};
use crate::frame::frame_pool::FramePool;
use crate::present_bail;
use crate::present_debug;
use crate::present_info;
use crate::swapchain::surface::Extent2d;
use crate::swapchain::swapchain_manager::SwapchainManager;

/// Where the presentation pipeline currently is in its frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    /// Ready to start a new frame
    Idle,
    /// Waiting on the slot fence / requesting a presentable image
    Acquiring,
    /// An acquired frame is out with the render-content collaborator
    Rendering,
    /// Recorded work is being handed to the GPU queue
    Submitting,
    /// The frame is being queued for presentation
    Presenting,
    /// The swapchain no longer matches the surface; absorbing until
    /// recreation succeeds
    Invalid,
}

/// Scheduler construction parameters
#[derive(Debug, Clone)]
pub struct FrameSchedulerDesc {
    /// Ring size of the frame pool; must be at least 1
    pub frames_in_flight: usize,
    /// Bound for fence and image-acquisition waits; `u64::MAX` waits forever
    pub fence_timeout_ns: u64,
}

impl Default for FrameSchedulerDesc {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            fence_timeout_ns: u64::MAX,
        }
    }
}

/// Everything render content needs to draw one frame
///
/// Handed out by [`FrameScheduler::acquire`]; the collaborator records into
/// `command_list` and passes the value back to [`FrameScheduler::submit`].
/// No other choreography is required of it.
pub struct AcquiredFrame {
    /// Presentable image index, valid only against the swapchain that
    /// produced it
    pub image_index: u32,
    /// Frame-pool slot this frame checked out
    pub slot: usize,
    /// Extent of the target in pixels
    pub extent: Extent2d,
    /// The image's view + framebuffer pair
    pub target: Arc<dyn RenderTarget>,
    /// Command list, already reset and recording
    pub command_list: Arc<dyn CommandList>,
}

/// Drives the acquire → render → submit → present cycle each tick
///
/// Single submission thread; the only blocking points are the pool fence
/// wait inside [`acquire`] and the device-idle wait inside swapchain
/// recreation. A resize signal moves the machine to
/// [`PresentationState::Invalid`], which is absorbed by recreating the
/// swapchain on the next tick rather than failing the frame.
///
/// [`acquire`]: FrameScheduler::acquire
pub struct FrameScheduler {
    // Field order is teardown order: pool contexts first, then the
    // swapchain, then the device that owns the surface.
    pool: FramePool,
    swapchain: SwapchainManager,
    device: Arc<dyn PresentDevice>,
    state: PresentationState,
    slot: usize,
    /// Whether the current slot's fence has already been waited and reset
    /// this logical frame. An acquire that fails with
    /// [`Error::SwapchainOutOfDate`] leaves the slot checked out so the
    /// retry tick does not deadlock on the already-reset fence.
    slot_checked_out: bool,
    fence_timeout_ns: u64,
}

impl FrameScheduler {
    /// Build the full pipeline: negotiated swapchain plus frame pool.
    pub fn new(device: Arc<dyn PresentDevice>, desc: FrameSchedulerDesc) -> Result<Self> {
        let swapchain = SwapchainManager::new(Arc::clone(&device))?;
        let pool = FramePool::new(device.as_ref(), desc.frames_in_flight, desc.fence_timeout_ns)?;

        present_info!(
            "lumen::scheduler",
            "Frame scheduler ready: {} frames in flight, {} swapchain images",
            pool.frames_in_flight(),
            swapchain.image_count()
        );

        Ok(Self {
            pool,
            swapchain,
            device,
            state: PresentationState::Idle,
            slot: 0,
            slot_checked_out: false,
            fence_timeout_ns: desc.fence_timeout_ns,
        })
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// Frame-pool slot the next (or current) frame uses
    pub fn current_slot(&self) -> usize {
        self.slot
    }

    /// The swapchain manager, for render-target setup by collaborators
    pub fn swapchain(&self) -> &SwapchainManager {
        &self.swapchain
    }

    /// External resize notification; the next [`acquire`] recreates the
    /// swapchain before starting a frame.
    ///
    /// Must be called between ticks (single submission thread), never while
    /// an acquired frame is out.
    ///
    /// [`acquire`]: FrameScheduler::acquire
    pub fn notify_resize(&mut self) {
        present_debug!("lumen::scheduler", "Resize notified, swapchain invalidated");
        self.state = PresentationState::Invalid;
    }

    /// Start a frame tick.
    ///
    /// Returns `Ok(Some(frame))` with the acquired image ready for
    /// recording, or `Ok(None)` for a skipped tick (the swapchain was out
    /// of date and has been recreated; call again). Fatal errors propagate.
    pub fn acquire(&mut self) -> Result<Option<AcquiredFrame>> {
        if self.state == PresentationState::Invalid {
            self.swapchain.recreate()?;
            self.state = PresentationState::Idle;
        }

        if self.state != PresentationState::Idle {
            present_bail!(
                "lumen::scheduler",
                "acquire called in state {:?} (frame already in progress?)",
                self.state
            );
        }
        self.state = PresentationState::Acquiring;

        // CPU-side throttle, once per logical frame: a retry tick after an
        // out-of-date acquire reuses the already-reset fence.
        if !self.slot_checked_out {
            self.pool.acquire(self.slot)?;
            self.slot_checked_out = true;
        }

        let ctx = self.pool.context(self.slot);
        let image_index = match self.swapchain.acquire_image(ctx, self.fence_timeout_ns) {
            Ok(index) => index,
            Err(Error::SwapchainOutOfDate) => {
                present_debug!("lumen::scheduler", "Swapchain out of date during acquire");
                self.state = PresentationState::Invalid;
                self.swapchain.recreate()?;
                self.state = PresentationState::Idle;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let target = self.swapchain.target(image_index)?;
        let command_list = ctx.command_list();
        command_list.begin()?;

        self.state = PresentationState::Rendering;

        Ok(Some(AcquiredFrame {
            image_index,
            slot: self.slot,
            extent: self.swapchain.extent(),
            target,
            command_list,
        }))
    }

    /// Finish a frame tick: submit the recorded work and present the image.
    ///
    /// The submission waits the slot's image-available semaphore at the
    /// color-attachment-output stage and signals render-complete plus the
    /// slot fence; the present waits render-complete. An out-of-date
    /// surface at present time is absorbed: the submitted work stands, the
    /// rotation advances, and the swapchain is recreated before returning.
    pub fn submit(&mut self, frame: AcquiredFrame) -> Result<()> {
        if self.state != PresentationState::Rendering {
            present_bail!(
                "lumen::scheduler",
                "submit called in state {:?} (no frame acquired?)",
                self.state
            );
        }
        if frame.slot != self.slot {
            present_bail!(
                "lumen::scheduler",
                "submit called with slot {} but slot {} is current",
                frame.slot,
                self.slot
            );
        }

        self.state = PresentationState::Submitting;

        let ctx = self.pool.context(self.slot);
        ctx.command_list().end()?;
        self.device.submit(ctx)?;

        self.state = PresentationState::Presenting;

        match self.swapchain.present(frame.image_index, ctx) {
            Ok(()) => {
                self.advance_rotation();
                self.state = PresentationState::Idle;
                Ok(())
            }
            Err(Error::SwapchainOutOfDate) => {
                present_debug!("lumen::scheduler", "Swapchain out of date during present");
                // The frame was submitted, so its fence will signal; the
                // rotation advances normally before the rebuild.
                self.advance_rotation();
                self.state = PresentationState::Invalid;
                self.swapchain.recreate()?;
                self.state = PresentationState::Idle;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn advance_rotation(&mut self) {
        self.slot = self.pool.next(self.slot);
        self.slot_checked_out = false;
    }

    /// Tear the pipeline down: wait for the device to go idle, then release
    /// every frame context, the swapchain, and the device reference, in
    /// that order.
    pub fn shutdown(self) -> Result<()> {
        present_info!("lumen::scheduler", "Shutting down presentation pipeline");
        self.device.wait_idle()
        // Drop runs field by field: pool, swapchain, device.
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
