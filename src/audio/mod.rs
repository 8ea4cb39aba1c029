//! Track playback and spectrum analysis.
//!
//! Decodes audio files with symphonia, converts them to the device rate with
//! rubato, plays them looped through cpal and exposes the playing signal as
//! byte spectrum frames.

mod analyser;
mod decode;
mod resample;
mod system;

pub use analyser::{blackman_window, AnalysisTap, Analyser};
pub use decode::{decode_file, DecodedTrack};
pub use resample::resample_track;
pub use system::AudioSystem;
