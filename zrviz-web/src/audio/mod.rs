//! Audio rendering
//!
//! Whole-document playback and per-term clip reels, produced as WAV bytes.
//! Everything in here is blocking and is driven from `spawn_blocking`.

pub mod codec;
pub mod decoder;
pub mod native;
pub mod render;
pub mod resampler;
pub mod sink;

pub use codec::{AudioCodec, TrimArgs};
pub use native::NativeCodec;
pub use render::AudioRenderer;
pub use sink::WavSink;

use std::fmt::Display;
use zrviz_common::Error;

pub(crate) fn audio_error(context: impl Display, err: impl Display) -> Error {
    Error::Audio(format!("{}: {}", context, err))
}
