use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowError {
    /// The drawing surface is gone (zero-sized viewport or lost terminal)
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,

    #[error("audio error: {0}")]
    Audio(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShowError {
    #[cfg_attr(not(feature = "audio"), allow(dead_code))]
    pub fn audio<S: Into<String>>(msg: S) -> Self {
        Self::Audio(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ShowError>;
