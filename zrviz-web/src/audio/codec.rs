//! Audio codec capability

use std::path::Path;

use zrviz_common::db::AudioFormat;
use zrviz_common::time::trim_arg;
use zrviz_common::{Error, Result};

/// Start and length of a trim, as `%f`-formatted seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimArgs {
    pub start: String,
    pub duration: String,
}

impl TrimArgs {
    pub fn from_hundredths(start_offset: i64, duration: i64) -> Self {
        Self {
            start: trim_arg(start_offset),
            duration: trim_arg(duration),
        }
    }

    pub fn start_seconds(&self) -> Result<f64> {
        parse_seconds("start", &self.start)
    }

    pub fn duration_seconds(&self) -> Result<f64> {
        parse_seconds("duration", &self.duration)
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(Error::InvalidInput(format!("Invalid trim {} '{}'", name, value))),
    }
}

/// Decoding, conversion and trimming of audio files
pub trait AudioCodec: Send + Sync {
    /// Convert `input` into a WAV file at `output`, keeping its signal parameters
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;

    /// Cut `args` out of `input`, converted to `format`
    ///
    /// Returns interleaved samples in `[-1.0, 1.0]`.
    fn trim(&self, input: &Path, args: &TrimArgs, format: &AudioFormat) -> Result<Vec<f32>>;
}
