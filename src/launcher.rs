use crate::color::random_palette_color;
use crate::config::{launch, timing};
use crate::firework::{Firework, random_in};
use crate::session::ShowEvent;
use crate::simulation::Simulation;
use crate::timer::{TimerId, TimerQueue};

/// New shell from the bottom edge of a `width` x `height` canvas.
pub fn spawn_firework(width: f32, height: f32, rng: &mut fastrand::Rng) -> Firework {
    let x = rng.f32() * width;
    let target_y = random_in(rng, launch::TARGET_FRACTION) * height;
    let speed = random_in(rng, launch::SPEED);
    let size = random_in(rng, launch::SIZE);
    let color = random_palette_color(rng);

    Firework::new(x, height, target_y, speed, color, size)
}

/// Decides when shells go up: a staggered opening salvo, then one per
/// interval while the sky holds fewer than `cap`.
pub struct Launcher {
    cap: usize,
    salvo: Vec<TimerId>,
    interval: Option<TimerId>,
}

impl Launcher {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            salvo: Vec::new(),
            interval: None,
        }
    }

    #[cfg(test)]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.interval.is_some() || !self.salvo.is_empty()
    }

    pub fn activate(&mut self, timers: &mut TimerQueue<ShowEvent>) {
        self.deactivate(timers);
        for i in 0..timing::SALVO_COUNT {
            let id = timers.set_timeout(i * timing::SALVO_SPACING_MS, ShowEvent::Salvo);
            self.salvo.push(id);
        }
        self.interval = Some(timers.set_interval(timing::LAUNCH_INTERVAL_MS, ShowEvent::LaunchTick));
    }

    /// Cancels every pending launch. Safe to call when never activated.
    pub fn deactivate(&mut self, timers: &mut TimerQueue<ShowEvent>) {
        for id in self.salvo.drain(..) {
            timers.clear(id);
        }
        if let Some(id) = self.interval.take() {
            timers.clear(id);
        }
    }

    /// A salvo shell goes up regardless of the cap.
    pub fn on_salvo(
        &mut self,
        id: TimerId,
        sim: &mut Simulation,
        viewport: Option<(f32, f32)>,
        rng: &mut fastrand::Rng,
    ) {
        let before = self.salvo.len();
        self.salvo.retain(|&pending| pending != id);
        if self.salvo.len() == before {
            return;
        }
        Self::launch(sim, viewport, rng);
    }

    /// Interval tick: one more shell if there is room. Returns whether one launched.
    pub fn on_tick(
        &mut self,
        id: TimerId,
        sim: &mut Simulation,
        viewport: Option<(f32, f32)>,
        rng: &mut fastrand::Rng,
    ) -> bool {
        if self.interval != Some(id) || sim.len() >= self.cap {
            return false;
        }
        Self::launch(sim, viewport, rng)
    }

    fn launch(sim: &mut Simulation, viewport: Option<(f32, f32)>, rng: &mut fastrand::Rng) -> bool {
        let Some((width, height)) = viewport else {
            return false;
        };
        let fw = spawn_firework(width, height, rng);
        tracing::debug!(x = fw.x, target_y = fw.target_y, live = sim.len() + 1, "launch");
        sim.push(fw);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;

    const VIEW: Option<(f32, f32)> = Some((1000.0, 800.0));

    fn dispatch(
        launcher: &mut Launcher,
        timers: &mut TimerQueue<ShowEvent>,
        sim: &mut Simulation,
        rng: &mut fastrand::Rng,
        now_ms: u64,
    ) {
        while let Some((id, event)) = timers.pop_due(now_ms) {
            match event {
                ShowEvent::Salvo => launcher.on_salvo(id, sim, VIEW, rng),
                ShowEvent::LaunchTick => {
                    launcher.on_tick(id, sim, VIEW, rng);
                    assert!(sim.len() <= launcher.cap());
                }
                _ => {}
            }
        }
    }

    #[test]
    fn spawned_shell_respects_ranges() {
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..500 {
            let fw = spawn_firework(1000.0, 800.0, &mut rng);
            assert!((0.0..1000.0).contains(&fw.x));
            assert_eq!(fw.y, 800.0);
            assert!((80.0..=480.0).contains(&fw.target_y));
            assert!((1.5..2.5).contains(&fw.speed));
            assert!((2.0..4.0).contains(&fw.size));
            assert!(PALETTE.contains(&fw.color));
            assert!(!fw.exploded());
        }
    }

    #[test]
    fn opening_salvo_is_staggered() {
        let mut timers = TimerQueue::new();
        let mut launcher = Launcher::new(launch::CAP);
        let mut sim = Simulation::new();
        let mut rng = fastrand::Rng::with_seed(2);
        launcher.activate(&mut timers);

        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 0);
        assert_eq!(sim.len(), 1);
        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 599);
        assert_eq!(sim.len(), 1);
        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 600);
        assert_eq!(sim.len(), 2);
        // first interval tick lands between the 2nd and 3rd salvo shells
        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 800);
        assert_eq!(sim.len(), 3);
        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 1200);
        assert_eq!(sim.len(), 4);
    }

    #[test]
    fn ticks_stop_at_the_cap() {
        let mut timers = TimerQueue::new();
        let mut launcher = Launcher::new(4);
        let mut sim = Simulation::new();
        let mut rng = fastrand::Rng::with_seed(3);
        launcher.activate(&mut timers);

        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 60_000);
        assert_eq!(sim.len(), 4);
    }

    #[test]
    fn deactivate_cancels_everything() {
        let mut timers = TimerQueue::new();
        let mut launcher = Launcher::new(launch::CAP);
        let mut sim = Simulation::new();
        let mut rng = fastrand::Rng::with_seed(4);

        launcher.deactivate(&mut timers);
        launcher.activate(&mut timers);
        assert!(launcher.is_active());
        launcher.deactivate(&mut timers);
        launcher.deactivate(&mut timers);
        assert!(!launcher.is_active());

        dispatch(&mut launcher, &mut timers, &mut sim, &mut rng, 60_000);
        assert!(sim.is_empty());
        assert_eq!(timers.next_due_ms(), None);
    }

    #[test]
    fn no_viewport_no_launch() {
        let mut sim = Simulation::new();
        let mut rng = fastrand::Rng::with_seed(5);
        let mut timers = TimerQueue::new();
        let mut launcher = Launcher::new(launch::CAP);
        launcher.activate(&mut timers);

        while let Some((id, event)) = timers.pop_due(2000) {
            match event {
                ShowEvent::Salvo => launcher.on_salvo(id, &mut sim, None, &mut rng),
                ShowEvent::LaunchTick => assert!(!launcher.on_tick(id, &mut sim, None, &mut rng)),
                _ => {}
            }
        }
        assert!(sim.is_empty());
        // the salvo timers were still consumed
        assert!(launcher.is_active());
        launcher.deactivate(&mut timers);
        assert_eq!(timers.next_due_ms(), None);
    }

    #[test]
    fn stale_timer_ids_are_ignored() {
        let mut timers = TimerQueue::new();
        let mut launcher = Launcher::new(launch::CAP);
        let mut sim = Simulation::new();
        let mut rng = fastrand::Rng::with_seed(6);

        launcher.activate(&mut timers);
        let (old_id, _) = timers.pop_due(0).unwrap();
        launcher.activate(&mut timers);

        launcher.on_salvo(old_id, &mut sim, VIEW, &mut rng);
        assert!(sim.is_empty());
    }
}
