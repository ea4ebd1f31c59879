//! Audio duration probing

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;
use zrviz_common::db::AudioFormat;
use zrviz_common::time::seconds_to_hundredths;
use zrviz_common::{Error, Result};

/// Length of an audio file as stored in its container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioLength {
    /// Frames per channel
    pub frames: u64,
    pub channels: u16,
}

impl AudioLength {
    /// Duration in hundredths, measured against the corpus format
    ///
    /// Total samples across all channels are divided by the corpus rate times
    /// the corpus channel count, so a file that disagrees with the corpus
    /// parameters yields a proportionally wrong duration.
    pub fn duration_hundredths(&self, format: &AudioFormat) -> i64 {
        let samples = self.frames as f64 * self.channels as f64;
        let per_second = format.rate as f64 * format.channels as f64;
        if per_second <= 0.0 {
            return 0;
        }
        seconds_to_hundredths(samples / per_second)
    }
}

/// Reads the sample count of an audio file
pub trait DurationProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<AudioLength>;
}

/// Probe backed by symphonia
///
/// Uses the container's frame count when present and decodes the stream to
/// count frames otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaProbe;

impl DurationProbe for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<AudioLength> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Audio(format!("Failed to probe {}: {}", path.display(), e)))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Audio(format!("No audio track in {}", path.display())))?;

        let track_id = track.id;
        let params = track.codec_params.clone();
        let channels = params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| Error::Audio(format!("Unknown channel layout in {}", path.display())))?;

        if let Some(frames) = params.n_frames {
            debug!(path = %path.display(), frames, channels, "Frame count from container");
            return Ok(AudioLength { frames, channels });
        }

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| Error::Audio(format!("No decoder for {}: {}", path.display(), e)))?;

        let mut frames = 0u64;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(Error::Audio(format!("Error reading {}: {}", path.display(), e)));
                }
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = decoder
                .decode(&packet)
                .map_err(|e| Error::Audio(format!("Failed to decode {}: {}", path.display(), e)))?;
            frames += decoded.frames() as u64;
        }

        debug!(path = %path.display(), frames, channels, "Frame count from decoding");
        Ok(AudioLength { frames, channels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONO_16K: AudioFormat = AudioFormat {
        rate: 16000,
        channels: 1,
        precision: 16,
    };

    #[test]
    fn test_duration_truncates_to_hundredths() {
        let length = AudioLength {
            frames: 16_159,
            channels: 1,
        };
        // 1.0099375 s
        assert_eq!(length.duration_hundredths(&MONO_16K), 100);
    }

    #[test]
    fn test_duration_uses_corpus_channels() {
        let stereo_file = AudioLength {
            frames: 32_000,
            channels: 2,
        };
        assert_eq!(stereo_file.duration_hundredths(&MONO_16K), 400);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SymphoniaProbe.probe(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
