//! WAV output through hound

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;
use zrviz_common::db::AudioFormat;
use zrviz_common::{Error, Result};

use super::audio_error;

/// Append-only WAV file with a fixed signal format
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    format: AudioFormat,
    path: PathBuf,
    frames_written: u64,
}

impl WavSink {
    /// Create the file at `path`
    ///
    /// The path must end in `.wav`; anything else fails with
    /// [`Error::WrongFileExtension`] before the file is created.
    pub fn create(path: &Path, format: AudioFormat) -> Result<Self> {
        if !has_wav_extension(path) {
            return Err(Error::WrongFileExtension(path.to_path_buf()));
        }
        if !matches!(format.precision, 8 | 16 | 24 | 32) {
            return Err(Error::Audio(format!(
                "Unsupported WAV precision: {} bits",
                format.precision
            )));
        }
        if format.channels == 0 || format.rate == 0 {
            return Err(Error::Audio(format!(
                "Invalid WAV format: {} Hz, {} channels",
                format.rate, format.channels
            )));
        }

        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.rate,
            bits_per_sample: format.precision,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)
            .map_err(|e| audio_error(format!("Failed to create {}", path.display()), e))?;

        Ok(Self {
            writer,
            format,
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    /// Append interleaved samples in `[-1.0, 1.0]`
    ///
    /// The sample count must be a multiple of the channel count.
    pub fn append(&mut self, samples: &[f32]) -> Result<()> {
        let channels = self.format.channels as usize;
        if samples.len() % channels != 0 {
            return Err(Error::Audio(format!(
                "{} samples do not fill {} channel frames",
                samples.len(),
                channels
            )));
        }

        for &sample in samples {
            let sample = sample.clamp(-1.0, 1.0);
            let written = match self.format.precision {
                8 => self.writer.write_sample((sample * i8::MAX as f32) as i8),
                16 => self.writer.write_sample((sample * i16::MAX as f32) as i16),
                24 => self.writer.write_sample((sample * 8_388_607.0) as i32),
                _ => self.writer.write_sample((sample as f64 * i32::MAX as f64) as i32),
            };
            written.map_err(|e| audio_error(format!("Failed to write {}", self.path.display()), e))?;
        }

        self.frames_written += (samples.len() / channels) as u64;
        Ok(())
    }

    /// Write the header and close the file
    pub fn finalize(self) -> Result<u64> {
        self.writer
            .finalize()
            .map_err(|e| audio_error(format!("Failed to finalize {}", self.path.display()), e))?;
        debug!("Wrote {} frames to {}", self.frames_written, self.path.display());
        Ok(self.frames_written)
    }
}

/// `true` when the final extension is exactly `wav`
pub fn has_wav_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("wav")
}
