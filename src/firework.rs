use crate::audio::{ToneCue, pick_note};
use crate::color::{Rgb, random_palette_color};
use crate::config::{burst, physics};
use std::f32::consts::TAU;

/// Uniform sample from a half-open float range.
pub(crate) fn random_in(rng: &mut fastrand::Rng, range: std::ops::Range<f32>) -> f32 {
    range.start + rng.f32() * (range.end - range.start)
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub gravity: f32,
    pub alpha: f32,
    pub color: Rgb,
    pub size: f32,
}

impl Particle {
    /// Fresh particles are always fully opaque.
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, color: Rgb, size: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            gravity: physics::GRAVITY,
            alpha: 1.0,
            color,
            size,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }

    /// One frame of motion and fading. Dead particles are left untouched.
    pub fn step(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.x += self.vx;
        self.y += self.vy;
        self.vy += self.gravity;
        self.alpha -= physics::ALPHA_DECAY;
    }
}

/// Angle of particle `index` in a burst of `count`, evenly spread over a full turn.
pub fn burst_angle(index: usize, count: usize) -> f32 {
    TAU * (index as f32 / count as f32)
}

#[derive(Clone, Debug)]
pub struct Firework {
    pub x: f32,
    pub y: f32,
    pub target_y: f32,
    pub speed: f32,
    pub color: Rgb,
    pub size: f32,
    exploded: bool,
    particles: Vec<Particle>,
}

impl Firework {
    pub fn new(x: f32, y: f32, target_y: f32, speed: f32, color: Rgb, size: f32) -> Self {
        Self {
            x,
            y,
            target_y,
            speed,
            color,
            size,
            exploded: false,
            particles: Vec::new(),
        }
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Burnt out: detonated and nothing left glowing.
    pub fn is_spent(&self) -> bool {
        self.exploded && !self.particles.iter().any(Particle::is_alive)
    }

    /// Moves the shell up by its speed and detonates it once it reaches its target.
    /// Returns true on the frame the detonation happens.
    pub fn ascend(&mut self, rng: &mut fastrand::Rng, cue: &mut dyn ToneCue) -> bool {
        if self.exploded {
            return false;
        }
        self.y -= self.speed;
        if self.y <= self.target_y {
            let count = rng.usize(burst::PARTICLE_COUNT);
            self.detonate(count, rng, cue);
            return true;
        }
        false
    }

    /// Advances every particle of an exploded shell by one frame.
    pub fn step_particles(&mut self) {
        for particle in &mut self.particles {
            particle.step();
        }
    }

    pub(crate) fn detonate(&mut self, count: usize, rng: &mut fastrand::Rng, cue: &mut dyn ToneCue) {
        if self.exploded {
            return;
        }
        self.exploded = true;
        self.particles = burst_particles(self.x, self.y, self.color, count, rng);
        tracing::debug!(x = self.x, y = self.y, count, "detonated");

        // Sound is decoration; a failing device never touches the show.
        if let Err(e) = cue.play(pick_note(rng)) {
            tracing::debug!("tone skipped: {e}");
        }
    }
}

/// Radially symmetric burst centred on `(x, y)`.
pub fn burst_particles(x: f32, y: f32, color: Rgb, count: usize, rng: &mut fastrand::Rng) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let angle = burst_angle(i, count);
            let speed = random_in(rng, burst::SPEED);
            let size = random_in(rng, burst::SIZE);

            let color = if rng.f32() < burst::SPARKLE_CHANCE {
                random_palette_color(rng)
            } else {
                color
            };

            let vx = angle.cos() * speed * random_in(rng, burst::JITTER);
            let vy = angle.sin() * speed * random_in(rng, burst::JITTER);

            Particle::new(x, y, vx, vy, color, size)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE;
    use proptest::prelude::*;

    #[derive(Default)]
    struct CountingCue {
        plays: Vec<f32>,
    }

    impl ToneCue for CountingCue {
        fn play(&mut self, frequency: f32) -> crate::error::Result<()> {
            self.plays.push(frequency);
            Ok(())
        }
    }

    struct BrokenCue;

    impl ToneCue for BrokenCue {
        fn play(&mut self, _frequency: f32) -> crate::error::Result<()> {
            Err(crate::error::ShowError::audio("no device"))
        }
    }

    fn shell() -> Firework {
        Firework::new(400.0, 800.0, 300.0, 2.0, PALETTE[0], 3.0)
    }

    #[test]
    fn new_shell_is_unexploded_and_empty() {
        let fw = shell();
        assert!(!fw.exploded());
        assert!(fw.particles().is_empty());
        assert!(!fw.is_spent());
    }

    #[test]
    fn reaches_target_after_exact_step_count() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut cue = CountingCue::default();
        let mut fw = shell();

        for step in 1..=250 {
            let detonated = fw.ascend(&mut rng, &mut cue);
            assert_eq!(detonated, step == 250, "step {step}");
            if step < 250 {
                assert!(fw.particles().is_empty());
            }
        }

        assert!(fw.y <= 300.0);
        assert!(fw.exploded());
        assert!(burst::PARTICLE_COUNT.contains(&fw.particles().len()));
        assert_eq!(cue.plays.len(), 1);
    }

    #[test]
    fn explodes_only_once() {
        let mut rng = fastrand::Rng::with_seed(2);
        let mut cue = CountingCue::default();
        let mut fw = Firework::new(10.0, 5.0, 10.0, 1.0, PALETTE[3], 2.0);

        assert!(fw.ascend(&mut rng, &mut cue));
        let count = fw.particles().len();
        let y = fw.y;

        for _ in 0..10 {
            assert!(!fw.ascend(&mut rng, &mut cue));
        }
        assert_eq!(fw.particles().len(), count);
        assert_eq!(fw.y, y);
        assert_eq!(cue.plays.len(), 1);
    }

    #[test]
    fn burst_of_hundred() {
        let mut rng = fastrand::Rng::with_seed(9);
        let mut fw = shell();
        fw.detonate(100, &mut rng, &mut CountingCue::default());

        assert_eq!(fw.particles().len(), 100);
        for p in fw.particles() {
            assert_eq!(p.alpha, 1.0);
            assert!((1.0..3.0).contains(&p.size));
            assert_eq!(p.gravity, physics::GRAVITY);
            assert_eq!((p.x, p.y), (fw.x, fw.y));
        }
    }

    #[test]
    fn velocities_follow_their_angle() {
        let mut rng = fastrand::Rng::with_seed(11);
        let count = 120;
        let particles = burst_particles(0.0, 0.0, PALETTE[1], count, &mut rng);

        for (i, p) in particles.iter().enumerate() {
            let angle = burst_angle(i, count);
            let (cos, sin) = (angle.cos(), angle.sin());
            // magnitude bounds: speed [2, 5) times jitter [0.8, 1.2)
            if cos.abs() > 1e-3 {
                let k = p.vx / cos;
                assert!((1.6 - 1e-4..6.0).contains(&k), "vx ratio {k} at {i}");
            }
            if sin.abs() > 1e-3 {
                let k = p.vy / sin;
                assert!((1.6 - 1e-4..6.0).contains(&k), "vy ratio {k} at {i}");
            }
        }
    }

    #[test]
    fn colors_mostly_inherit() {
        let mut rng = fastrand::Rng::with_seed(5);
        let own = Rgb::new(1, 2, 3);
        let particles = burst_particles(0.0, 0.0, own, 10_000, &mut rng);
        let inherited = particles.iter().filter(|p| p.color == own).count();
        let share = inherited as f32 / particles.len() as f32;
        assert!((0.66..0.74).contains(&share), "inherited share {share}");
        assert!(particles.iter().all(|p| p.color == own || PALETTE.contains(&p.color)));
    }

    #[test]
    fn audio_failure_does_not_stop_detonation() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut fw = shell();
        fw.detonate(90, &mut rng, &mut BrokenCue);
        assert!(fw.exploded());
        assert_eq!(fw.particles().len(), 90);
    }

    #[test]
    fn particle_step_integrates_then_fades() {
        let mut p = Particle::new(0.0, 0.0, 1.0, -2.0, PALETTE[0], 1.0);
        p.step();
        assert_eq!((p.x, p.y), (1.0, -2.0));
        assert!((p.vy - (-2.0 + physics::GRAVITY)).abs() < 1e-6);
        assert!((p.alpha - (1.0 - physics::ALPHA_DECAY)).abs() < 1e-6);
    }

    #[test]
    fn dead_particles_freeze() {
        let mut p = Particle::new(0.0, 0.0, 1.0, 1.0, PALETTE[0], 1.0);
        p.alpha = 0.0;
        p.step();
        assert_eq!((p.x, p.y, p.alpha), (0.0, 0.0, 0.0));
    }

    #[test]
    fn spent_once_every_particle_fades() {
        let mut rng = fastrand::Rng::with_seed(8);
        let mut fw = shell();
        fw.detonate(80, &mut rng, &mut CountingCue::default());

        let frames = (1.0 / physics::ALPHA_DECAY).ceil() as usize;
        for _ in 0..frames - 1 {
            fw.step_particles();
            assert!(!fw.is_spent());
        }
        // float drift may need a frame or two more
        for _ in 0..3 {
            fw.step_particles();
        }
        assert!(fw.is_spent());
    }

    proptest! {
        #[test]
        fn alpha_never_increases(vx in -5.0f32..5.0, vy in -5.0f32..5.0, steps in 1usize..400) {
            let mut p = Particle::new(0.0, 0.0, vx, vy, PALETTE[2], 2.0);
            let mut last = p.alpha;
            for _ in 0..steps {
                p.step();
                prop_assert!(p.alpha <= last);
                last = p.alpha;
            }
        }

        #[test]
        fn angles_evenly_spaced(count in 80usize..160) {
            let step = TAU / count as f32;
            for i in 0..count {
                let expected = step * i as f32;
                prop_assert!((burst_angle(i, count) - expected).abs() < 1e-4);
            }
            let gaps_ok = (1..count).all(|i| {
                ((burst_angle(i, count) - burst_angle(i - 1, count)) - step).abs() < 1e-4
            });
            prop_assert!(gaps_ok);
        }
    }
}
