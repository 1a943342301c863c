use crate::audio::ToneCue;
use crate::color::Rgb;
use crate::config::render::{FADE_ALPHA, TRAIL_ALPHA, TRAIL_LENGTH, TRAIL_WIDTH_RATIO};
use crate::error::Result;
use crate::firework::Firework;
use crate::surface::Canvas;

/// Every live firework, in paint order.
#[derive(Default)]
pub struct Simulation {
    fireworks: Vec<Firework>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fireworks.is_empty()
    }

    #[cfg(test)]
    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn push(&mut self, firework: Firework) {
        self.fireworks.push(firework);
    }

    pub fn clear(&mut self) {
        self.fireworks.clear();
    }

    /// Draws and advances everything by one frame, then drops burnt-out shells.
    ///
    /// Fails with `SurfaceUnavailable` before touching any state when the
    /// canvas has nothing to draw on.
    pub fn render_frame(
        &mut self,
        canvas: &mut dyn Canvas,
        rng: &mut fastrand::Rng,
        cue: &mut dyn ToneCue,
    ) -> Result<()> {
        canvas.size()?;

        // Translucent wash instead of a clear leaves fading trails behind.
        canvas.wash(Rgb::BLACK, FADE_ALPHA);

        for fw in &mut self.fireworks {
            if !fw.exploded() {
                canvas.fill_circle(fw.x, fw.y, fw.size, fw.color, 1.0);
                canvas.stroke_line(
                    (fw.x, fw.y),
                    (fw.x, fw.y + TRAIL_LENGTH),
                    fw.size * TRAIL_WIDTH_RATIO,
                    fw.color,
                    TRAIL_ALPHA,
                );
                fw.ascend(rng, cue);
            } else {
                for p in fw.particles().iter().filter(|p| p.is_alive()) {
                    canvas.fill_circle(p.x, p.y, p.size, p.color, p.alpha);
                }
                fw.step_particles();
            }
        }

        self.prune();
        Ok(())
    }

    /// Removes fireworks that have exploded and have no particle left alive.
    pub fn prune(&mut self) -> usize {
        let before = self.fireworks.len();
        self.fireworks.retain(|fw| !fw.is_spent());
        before - self.fireworks.len()
    }
}
