//! Tunable constants for the fireworks show.
//!
//! Distances are logical canvas pixels, times are per animation frame unless
//! the name says otherwise.

/// Particle motion
pub mod physics {
    /// Downward acceleration added to a particle's vy every frame
    pub const GRAVITY: f32 = 0.03;
    /// Opacity lost by a particle every frame
    pub const ALPHA_DECAY: f32 = 0.005;
}

/// Detonation shape
pub mod burst {
    use std::ops::Range;

    pub const PARTICLE_COUNT: Range<usize> = 80..160;
    pub const SPEED: Range<f32> = 2.0..5.0;
    /// Per-axis multiplicative jitter on the burst speed
    pub const JITTER: Range<f32> = 0.8..1.2;
    pub const SIZE: Range<f32> = 1.0..3.0;
    /// Chance a particle takes a random palette color instead of the shell's
    pub const SPARKLE_CHANCE: f32 = 0.3;
}

/// Shell creation
pub mod launch {
    use std::ops::Range;

    /// Maximum number of live fireworks the launcher keeps on screen
    pub const CAP: usize = 10;
    pub const SPEED: Range<f32> = 1.5..2.5;
    pub const SIZE: Range<f32> = 2.0..4.0;
    /// Detonation altitude as a fraction of canvas height, from the top
    pub const TARGET_FRACTION: Range<f32> = 0.1..0.6;
}

/// Wall-clock timing (milliseconds)
pub mod timing {
    /// Number of shells in the opening salvo
    pub const SALVO_COUNT: u64 = 3;
    pub const SALVO_SPACING_MS: u64 = 600;
    pub const LAUNCH_INTERVAL_MS: u64 = 800;
    /// Time spent in the running phase before the message is revealed
    pub const REVEAL_AFTER_MS: u64 = 10_000;
    /// Pause between a reset and the show starting again
    pub const RESTART_DELAY_MS: u64 = 100;
    /// Target frame period of the terminal driver (~60 fps)
    pub const FRAME_MS: u64 = 16;
}

/// Drawing
pub mod render {
    /// Opacity of the black wash painted over the canvas every frame
    pub const FADE_ALPHA: f32 = 0.15;
    pub const TRAIL_LENGTH: f32 = 20.0;
    pub const TRAIL_ALPHA: f32 = 0.3;
    /// Trail stroke width relative to the shell size
    pub const TRAIL_WIDTH_RATIO: f32 = 0.8;
    /// Logical canvas pixels per raster pixel
    pub const CANVAS_SCALE: f32 = 4.0;
    /// Raster intensities below this are written as background
    pub const BLACK_THRESHOLD: f32 = 0.02;
}

/// Detonation tone
pub mod audio {
    /// C4 through B4
    pub const NOTE_FREQUENCIES: [f32; 7] = [261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88];
    pub const TONE_SECONDS: f32 = 0.5;
    pub const TONE_GAIN: f32 = 0.1;
    /// Gain the envelope reaches at the end of the tone
    pub const TONE_FLOOR: f32 = 0.00001;
    pub const SAMPLE_RATE: u32 = 44_100;
}
