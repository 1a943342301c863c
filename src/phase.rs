use crate::config::timing::{REVEAL_AFTER_MS, RESTART_DELAY_MS};
use crate::session::{AnimationSession, ShowEvent};
use crate::surface::Canvas;
use crate::timer::{FrameHandle, FrameScheduler, TimerId, TimerQueue};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    /// Message shown over the still-running show
    Revealed,
}

/// Drives idle → running → revealed and back, owning the timer queue the
/// whole show runs on.
pub struct PhaseController<S: FrameScheduler> {
    phase: Phase,
    session: AnimationSession<S>,
    timers: TimerQueue<ShowEvent>,
    reveal: Option<TimerId>,
    restart: Option<TimerId>,
}

impl<S: FrameScheduler> PhaseController<S> {
    pub fn new(session: AnimationSession<S>) -> Self {
        Self {
            phase: Phase::Idle,
            session,
            timers: TimerQueue::new(),
            reveal: None,
            restart: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn session(&self) -> &AnimationSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AnimationSession<S> {
        &mut self.session
    }

    #[cfg(test)]
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    /// Idle → running. Ignored in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        cancel(&mut self.timers, &mut self.restart);

        self.phase = Phase::Running;
        self.session.start(&mut self.timers);
        self.reveal = Some(self.timers.set_timeout(REVEAL_AFTER_MS, ShowEvent::Reveal));
        info!("show started");
        true
    }

    /// Any phase → idle with the sky cleared, then running again after a short pause.
    pub fn reset(&mut self) {
        self.halt();
        self.session.clear();
        self.phase = Phase::Idle;
        self.restart = Some(self.timers.set_timeout(RESTART_DELAY_MS, ShowEvent::Restart));
        info!("show reset");
    }

    /// Stops everything, including a pending restart.
    pub fn shutdown(&mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.session.stop(&mut self.timers);
        cancel(&mut self.timers, &mut self.reveal);
        cancel(&mut self.timers, &mut self.restart);
    }

    /// Fires every timer due by `now_ms`, one at a time.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some((id, event)) = self.timers.pop_due(now_ms) {
            match event {
                ShowEvent::Reveal => {
                    self.reveal = None;
                    if self.phase == Phase::Running {
                        self.phase = Phase::Revealed;
                        info!("message revealed");
                    }
                }
                ShowEvent::Restart => {
                    self.restart = None;
                    self.start();
                }
                ShowEvent::Salvo | ShowEvent::LaunchTick => self.session.on_timer(id, event),
            }
        }
    }

    pub fn on_frame(&mut self, handle: FrameHandle, canvas: &mut dyn Canvas) {
        self.session.on_frame(handle, canvas);
    }

    pub fn set_viewport(&mut self, viewport: Option<(f32, f32)>) {
        self.session.set_viewport(viewport);
    }
}

fn cancel(timers: &mut TimerQueue<ShowEvent>, slot: &mut Option<TimerId>) {
    if let Some(id) = slot.take() {
        timers.clear(id);
    }
}
