//! Symphonia decoding to interleaved f32

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};
use zrviz_common::{Error, Result};

use super::audio_error;

/// Decoded PCM in the source's own rate and channel layout
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Source bit depth, when the codec reports one
    pub bits_per_sample: Option<u32>,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Keep only the frames in `[start, start + duration)` seconds
    ///
    /// Ranges past the end of the audio are clipped, possibly to nothing.
    pub fn trim(mut self, start_seconds: f64, duration_seconds: f64) -> Self {
        let channels = self.channels.max(1) as usize;
        let frames = self.frames();
        let start = ((start_seconds * self.sample_rate as f64) as usize).min(frames);
        let end = (((start_seconds + duration_seconds) * self.sample_rate as f64) as usize)
            .clamp(start, frames);

        self.samples.truncate(end * channels);
        self.samples.drain(..start * channels);
        self
    }
}

/// Decode an entire file
///
/// Packets that fail to decode are skipped with a warning; a container that
/// cannot be opened or probed is an error.
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    debug!("Decoding {}", path.display());

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| audio_error(format!("Failed to probe {}", path.display()), e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Audio(format!("No audio track in {}", path.display())))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::Audio(format!("Unknown sample rate in {}", path.display())))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .ok_or_else(|| Error::Audio(format!("Unknown channel layout in {}", path.display())))?;

    let bits_per_sample = track.codec_params.bits_per_sample;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| audio_error(format!("No decoder for {}", path.display()), e))?;

    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(audio_error(format!("Error reading {}", path.display()), e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let buffer = buffer.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
                });
                if buffer.capacity() < decoded.capacity() * decoded.spec().channels.count() {
                    *buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                }
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet in {}: {}", path.display(), e);
            }
            Err(e) => return Err(audio_error(format!("Failed to decode {}", path.display()), e)),
        }
    }

    debug!(
        "Decoded {} frames at {} Hz, {} channels from {}",
        samples.len() / channels.max(1) as usize,
        sample_rate,
        channels,
        path.display()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
        bits_per_sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: u16) -> DecodedAudio {
        DecodedAudio {
            samples: (0..frames * channels as usize).map(|i| i as f32).collect(),
            sample_rate: 100,
            channels,
            bits_per_sample: None,
        }
    }

    #[test]
    fn test_trim_selects_frames() {
        let trimmed = ramp(300, 2).trim(1.0, 0.5);
        assert_eq!(trimmed.frames(), 50);
        assert_eq!(trimmed.samples[0], 200.0);
        assert_eq!(trimmed.samples[1], 201.0);
    }

    #[test]
    fn test_trim_past_end_is_clipped() {
        let trimmed = ramp(100, 1).trim(0.8, 5.0);
        assert_eq!(trimmed.frames(), 20);

        let empty = ramp(100, 1).trim(3.0, 1.0);
        assert_eq!(empty.frames(), 0);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(decode_file(Path::new("/nonexistent/a.wav")), Err(Error::Io(_))));
    }
}
