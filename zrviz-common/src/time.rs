//! Hundredths-of-a-second time helpers
//!
//! The discovery pipeline counts audio frames at 100 Hz, so every offset and
//! duration in the database is an `i64` count of hundredths of a second.
//! Computation stays in hundredths; conversion to seconds only happens when a
//! value leaves the system (JSON payloads, codec trim arguments).
//!
//! # Examples
//!
//! ```
//! use zrviz_common::time::{hundredths_to_seconds, seconds_to_hundredths, trim_arg};
//!
//! assert_eq!(hundredths_to_seconds(5502), 55.02);
//! assert_eq!(seconds_to_hundredths(12.345), 1234);
//! assert_eq!(trim_arg(150), "1.500000");
//! ```

/// Frames per second used by the upstream pipeline
pub const HUNDREDTHS_PER_SECOND: i64 = 100;

/// Convert hundredths of a second to seconds
pub fn hundredths_to_seconds(hundredths: i64) -> f64 {
    hundredths as f64 / HUNDREDTHS_PER_SECOND as f64
}

/// Convert seconds to hundredths of a second (truncating)
pub fn seconds_to_hundredths(seconds: f64) -> i64 {
    (seconds * HUNDREDTHS_PER_SECOND as f64) as i64
}

/// Render hundredths as the fixed six-decimal seconds text handed to codecs
pub fn trim_arg(hundredths: i64) -> String {
    format!("{:.6}", hundredths_to_seconds(hundredths))
}
