//! WAV rendering for documents and terms
//!
//! Intermediate files live in a per-call temporary directory under the
//! scratch folder. The directory is removed when the call returns, on success
//! and on every error path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info};
use zrviz_common::db::AudioFormat;
use zrviz_common::Result;

use super::codec::{AudioCodec, TrimArgs};
use super::sink::{has_wav_extension, WavSink};
use crate::db::fragments::ClipSource;

const CONVERTED_FILE_NAME: &str = "converted.wav";
const COMBINED_FILE_NAME: &str = "combined_clips.wav";

#[derive(Clone)]
pub struct AudioRenderer {
    codec: Arc<dyn AudioCodec>,
    scratch_dir: PathBuf,
}

impl AudioRenderer {
    pub fn new(codec: Arc<dyn AudioCodec>, scratch_dir: PathBuf) -> Self {
        Self { codec, scratch_dir }
    }

    /// WAV bytes of a whole document
    ///
    /// A `.wav` source is returned unmodified; anything else is transcoded.
    pub fn render_document_wav(&self, audio_path: &Path) -> Result<Vec<u8>> {
        if has_wav_extension(audio_path) {
            debug!("Serving {} unmodified", audio_path.display());
            return Ok(std::fs::read(audio_path)?);
        }

        let workdir = self.workdir()?;
        let converted = workdir.path().join(CONVERTED_FILE_NAME);

        self.codec.transcode(audio_path, &converted)?;
        let bytes = std::fs::read(&converted)?;

        info!("Transcoded {} for playback ({} bytes)", audio_path.display(), bytes.len());
        Ok(bytes)
    }

    /// One WAV file splicing together `clips` in order, at the corpus format
    pub fn render_term_wav(&self, clips: &[ClipSource], format: AudioFormat) -> Result<Vec<u8>> {
        let workdir = self.workdir()?;
        let combined = workdir.path().join(COMBINED_FILE_NAME);

        let mut sink = WavSink::create(&combined, format)?;
        for clip in clips {
            let args = TrimArgs::from_hundredths(clip.start_offset, clip.duration);
            debug!(
                "Trimming fragment {} from {} at {} for {}",
                clip.fragment_id, clip.audio_path, args.start, args.duration
            );
            let samples = self.codec.trim(Path::new(&clip.audio_path), &args, &format)?;
            sink.append(&samples)?;
        }
        let frames = sink.finalize()?;

        let bytes = std::fs::read(&combined)?;
        info!("Rendered {} clips ({} frames)", clips.len(), frames);
        Ok(bytes)
    }

    fn workdir(&self) -> Result<TempDir> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        Ok(tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.scratch_dir)?)
    }
}
