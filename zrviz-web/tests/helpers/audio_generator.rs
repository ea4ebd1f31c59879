//! WAV fixture generator

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
    /// 16 or 24
    pub bits_per_sample: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 2.0,
            sample_rate: 16000,
            channels: 1,
            frequency: 440.0,
            bits_per_sample: 16,
        }
    }
}

/// Write an integer PCM sine tone
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: config.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let frames = (config.duration_seconds * config.sample_rate as f64) as usize;

    for i in 0..frames {
        let t = i as f32 / config.sample_rate as f32;
        let amplitude = 0.3 * (2.0 * std::f32::consts::PI * config.frequency * t).sin();
        let full_scale = ((1i32 << (config.bits_per_sample - 1)) - 1) as f32;
        let sample = (amplitude * full_scale) as i32;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}
