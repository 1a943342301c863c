use crate::config::audio::{NOTE_FREQUENCIES, SAMPLE_RATE, TONE_FLOOR, TONE_GAIN, TONE_SECONDS};
use crate::error::Result;

/// Fire-and-forget sound played when a shell detonates.
pub trait ToneCue {
    fn play(&mut self, frequency: f32) -> Result<()>;
}

/// Used with `--mute`, and whenever no audio device could be opened.
pub struct Silent;

impl ToneCue for Silent {
    fn play(&mut self, _frequency: f32) -> Result<()> {
        Ok(())
    }
}

pub fn pick_note(rng: &mut fastrand::Rng) -> f32 {
    NOTE_FREQUENCIES[rng.usize(0..NOTE_FREQUENCIES.len())]
}

/// Mono sine samples with an exponential fade from `TONE_GAIN` down to `TONE_FLOOR`.
#[cfg_attr(not(feature = "audio"), allow(dead_code))]
pub fn tone_samples(frequency: f32) -> Vec<f32> {
    let sample_rate = SAMPLE_RATE as f32;
    let count = (sample_rate * TONE_SECONDS) as usize;
    let ratio = TONE_FLOOR / TONE_GAIN;

    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let envelope = TONE_GAIN * ratio.powf(t / TONE_SECONDS);
            (std::f32::consts::TAU * frequency * t).sin() * envelope
        })
        .collect()
}

#[cfg(feature = "audio")]
pub use device::DeviceCue;

#[cfg(feature = "audio")]
mod device {
    use super::{ToneCue, tone_samples};
    use crate::config::audio::SAMPLE_RATE;
    use crate::error::{Result, ShowError};
    use rodio::{OutputStream, OutputStreamHandle};

    pub struct DeviceCue {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl DeviceCue {
        pub fn open() -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| ShowError::audio(e.to_string()))?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }
    }

    impl ToneCue for DeviceCue {
        fn play(&mut self, frequency: f32) -> Result<()> {
            let source = rodio::buffer::SamplesBuffer::new(1, SAMPLE_RATE, tone_samples(frequency));
            self.handle
                .play_raw(source)
                .map_err(|e| ShowError::audio(e.to_string()))
        }
    }
}

/// Opens the default output device when built with the `audio` feature.
pub fn open_cue(muted: bool) -> Box<dyn ToneCue> {
    if muted {
        return Box::new(Silent);
    }

    #[cfg(feature = "audio")]
    match DeviceCue::open() {
        Ok(cue) => return Box::new(cue),
        Err(e) => tracing::debug!("audio disabled: {e}"),
    }

    Box::new(Silent)
}
