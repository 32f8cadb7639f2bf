//! Play-and-record session control.
//!
//! The [`Controller`] owns every piece of state on the screen: the selected
//! file, the playback and recording handles, the playing flag and the action
//! control. It only talks to audio hardware through the [`AudioBackend`]
//! capability, so the state machine can be driven and tested without a
//! sound card.

pub mod backend;
pub mod controller;
pub mod settings;

pub use backend::{AudioBackend, PlaybackHandle, RecordingHandle};
pub use controller::{Controller, PickOutcome, TransportState};
pub use settings::{AudioFormat, AudioQuality, RecordingSettings};
