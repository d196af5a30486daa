//! Cancellable repeating render task.
//!
//! The loop itself does not know how ticks are produced. A [`FrameScheduler`]
//! requests one callback per display refresh (`requestAnimationFrame` in the
//! browser, a manual pump in tests); the host calls [`RenderLoop::on_frame`]
//! from that callback, and if it returns `true` renders one frame from the
//! current state.
//!
//! The loop is tied to the identity of the images it draws. When either the
//! subject or the frame is replaced, [`RenderLoop::sync_identity`] cancels the
//! outstanding tick and starts a new run. Dropping the loop cancels it.

use crate::asset::AssetId;

/// Identity of the scene's image pair: `(subject, frame)`.
pub type SceneIdentity = (Option<AssetId>, Option<AssetId>);

/// Source of per-refresh callbacks.
pub trait FrameScheduler {
    /// Handle used to cancel a requested callback.
    type Ticket;

    /// Ask for one callback on the next refresh. `None` if the host could not
    /// schedule it.
    fn request(&mut self) -> Option<Self::Ticket>;

    /// Withdraw a callback that has not fired yet.
    fn cancel(&mut self, ticket: Self::Ticket);
}

/// Drives repeated rendering until stopped.
pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    identity: Option<SceneIdentity>,
    ticket: Option<S::Ticket>,
    generation: u64,
    frames: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            identity: None,
            ticket: None,
            generation: 0,
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.identity.is_some()
    }

    /// Identity of the current run.
    pub fn identity(&self) -> Option<SceneIdentity> {
        self.identity
    }

    /// Incremented on every (re)start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frames rendered in the current run.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Running, but the last request for a tick was refused, so no further
    /// frames will arrive until the loop is restarted.
    pub fn is_stalled(&self) -> bool {
        self.is_running() && self.ticket.is_none()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Start a run for `identity`, replacing any current one.
    pub fn start(&mut self, identity: SceneIdentity) {
        self.cancel_pending();
        self.identity = Some(identity);
        self.generation += 1;
        self.frames = 0;
        self.ticket = self.scheduler.request();
        if self.ticket.is_none() {
            log::warn!("render loop #{} could not schedule a frame", self.generation);
        }
        log::debug!(
            "render loop #{} started for subject {:?}, frame {:?}",
            self.generation,
            identity.0,
            identity.1
        );
    }

    /// Restart if the image pair changed or the loop stalled. Returns `true`
    /// if a restart happened.
    ///
    /// A stopped loop stays stopped.
    pub fn sync_identity(&mut self, identity: SceneIdentity) -> bool {
        match self.identity {
            Some(current) if current != identity || self.ticket.is_none() => {
                self.start(identity);
                true
            }
            _ => false,
        }
    }

    /// Called from the scheduler callback. Returns `true` if the host should
    /// render a frame now; the next tick is already requested by then.
    pub fn on_frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        // The ticket that brought us here has fired
        self.ticket = self.scheduler.request();
        self.frames += 1;
        if self.ticket.is_none() {
            log::warn!(
                "render loop #{} stalled after {} frames: next frame refused",
                self.generation,
                self.frames
            );
        }
        true
    }

    /// Cancel the run. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.identity.take().is_some() {
            log::debug!(
                "render loop #{} stopped after {} frames",
                self.generation,
                self.frames
            );
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.scheduler.cancel(ticket);
        }
    }
}

impl<S: FrameScheduler> std::fmt::Debug for RenderLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("identity", &self.identity)
            .field("generation", &self.generation)
            .field("frames", &self.frames)
            .field("scheduled", &self.ticket.is_some())
            .finish()
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
