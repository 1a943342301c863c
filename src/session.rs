use crate::audio::ToneCue;
use crate::config::launch;
use crate::error::ShowError;
use crate::launcher::Launcher;
use crate::simulation::Simulation;
use crate::surface::Canvas;
use crate::timer::{FrameHandle, FrameScheduler, TimerId, TimerQueue};

/// Everything the show schedules on the timer queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowEvent {
    /// One shell of the opening salvo
    Salvo,
    /// Recurring launcher interval
    LaunchTick,
    /// Message reveal after the running phase has lasted long enough
    Reveal,
    /// Delayed re-entry into the running phase after a reset
    Restart,
}

/// One run of the animation: the pending frame, the launcher's timers and
/// the live fireworks. Start and stop are explicit and idempotent.
pub struct AnimationSession<S: FrameScheduler> {
    sim: Simulation,
    launcher: Launcher,
    frames: S,
    frame: Option<FrameHandle>,
    viewport: Option<(f32, f32)>,
    rng: fastrand::Rng,
    cue: Box<dyn ToneCue>,
}

impl<S: FrameScheduler> AnimationSession<S> {
    pub fn new(frames: S, rng: fastrand::Rng, cue: Box<dyn ToneCue>) -> Self {
        Self {
            sim: Simulation::new(),
            launcher: Launcher::new(launch::CAP),
            frames,
            frame: None,
            viewport: None,
            rng,
            cue,
        }
    }

    #[cfg(test)]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[cfg(test)]
    pub fn frames(&self) -> &S {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut S {
        &mut self.frames
    }

    #[cfg(test)]
    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.frame.is_some() || self.launcher.is_active()
    }

    /// Logical canvas size used for new launches; `None` while there is no surface.
    pub fn set_viewport(&mut self, viewport: Option<(f32, f32)>) {
        self.viewport = viewport;
    }

    /// Fresh state, launcher armed, first frame requested.
    pub fn start(&mut self, timers: &mut TimerQueue<ShowEvent>) {
        self.stop(timers);
        self.sim.clear();
        self.launcher.activate(timers);
        self.frame = Some(self.frames.request_frame());
    }

    /// Cancels the pending frame and every launcher timer. State is kept.
    pub fn stop(&mut self, timers: &mut TimerQueue<ShowEvent>) {
        if let Some(handle) = self.frame.take() {
            self.frames.cancel_frame(handle);
        }
        self.launcher.deactivate(timers);
    }

    pub fn clear(&mut self) {
        self.sim.clear();
    }

    /// Runs one frame for `handle` and requests the next. Stale handles are ignored.
    ///
    /// A missing surface ends the loop quietly: no frame is requested after it.
    pub fn on_frame(&mut self, handle: FrameHandle, canvas: &mut dyn Canvas) {
        if self.frame != Some(handle) {
            return;
        }
        self.frame = None;

        match self.sim.render_frame(canvas, &mut self.rng, self.cue.as_mut()) {
            Ok(()) => self.frame = Some(self.frames.request_frame()),
            Err(ShowError::SurfaceUnavailable) => {
                tracing::warn!("drawing surface unavailable, animation stopped");
            }
            Err(e) => tracing::warn!("animation stopped: {e}"),
        }
    }

    pub fn on_timer(&mut self, id: TimerId, event: ShowEvent) {
        match event {
            ShowEvent::Salvo => self.launcher.on_salvo(id, &mut self.sim, self.viewport, &mut self.rng),
            ShowEvent::LaunchTick => {
                self.launcher.on_tick(id, &mut self.sim, self.viewport, &mut self.rng);
            }
            ShowEvent::Reveal | ShowEvent::Restart => {}
        }
    }
}
