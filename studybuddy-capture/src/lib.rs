//! Input sources that feed the workflow: still images from disk, user image adjustments, and
//! dictated questions.
//!
//! Nothing here talks to the network or to the controller; callers hand the resulting
//! `ImagePayload` or question string to the engine.

pub mod adjust;
pub mod error;
pub mod speech;
pub mod still;

pub use adjust::{DEFAULT_EDIT_QUALITY, ImageAdjustments};
pub use error::CaptureError;
pub use speech::{SpeechSegment, TranscriptAccumulator, read_transcript_file};
pub use still::{DEFAULT_CAPTURE_QUALITY, load_still};
