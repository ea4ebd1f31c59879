//! In-process codec: symphonia in, rubato between, hound out

use std::path::Path;

use tracing::debug;
use zrviz_common::db::AudioFormat;
use zrviz_common::Result;

use super::codec::{AudioCodec, TrimArgs};
use super::decoder::decode_file;
use super::resampler::Resampler;
use super::sink::WavSink;

/// Bit depth used when transcoding a source that reports none
const FALLBACK_PRECISION: u16 = 16;

/// Smallest WAV bit depth holding `bits` source bits
fn transcode_precision(bits: Option<u32>) -> u16 {
    match bits {
        Some(1..=8) => 8,
        Some(9..=16) => 16,
        Some(17..=24) => 24,
        Some(25..) => 32,
        Some(0) | None => FALLBACK_PRECISION,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl AudioCodec for NativeCodec {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        let decoded = decode_file(input)?;
        let format = AudioFormat {
            rate: decoded.sample_rate,
            channels: decoded.channels,
            precision: transcode_precision(decoded.bits_per_sample),
        };

        let mut sink = WavSink::create(output, format)?;
        sink.append(&decoded.samples)?;
        let frames = sink.finalize()?;

        debug!(
            "Transcoded {} to {} ({} frames)",
            input.display(),
            output.display(),
            frames
        );
        Ok(())
    }

    fn trim(&self, input: &Path, args: &TrimArgs, format: &AudioFormat) -> Result<Vec<f32>> {
        let start = args.start_seconds()?;
        let duration = args.duration_seconds()?;

        let clip = decode_file(input)?.trim(start, duration);
        let remixed = remix(&clip.samples, clip.channels, format.channels);
        Resampler::resample(&remixed, clip.sample_rate, format.rate, format.channels)
    }
}

/// Convert interleaved audio between channel counts
///
/// Mono is duplicated to every output channel, any layout collapses to mono by
/// averaging, and other conversions map output channel `c` to input channel
/// `c % from`.
pub fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let from = from as usize;
    let to = to as usize;
    let mut output = Vec::with_capacity(samples.len() / from * to);

    for frame in samples.chunks_exact(from) {
        if to == 1 {
            output.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            output.extend((0..to).map(|c| frame[c % from]));
        }
    }
    output
}
