use std::error::Error;
use std::path::Path;
use std::time::Duration;

use super::settings::RecordingSettings;

/// Device capabilities the controller drives.
pub trait AudioBackend {
    /// Route audio for simultaneous playback and capture. Called once.
    fn activate_session(&mut self) -> Result<(), Box<dyn Error>>;

    /// Open `path` for playback. The file is read and decoded here.
    fn create_player(&mut self, path: &Path) -> Result<Box<dyn PlaybackHandle>, Box<dyn Error>>;

    /// Create a recorder that will write to `path` once recording starts.
    fn create_recorder(
        &mut self,
        path: &Path,
        settings: &RecordingSettings,
    ) -> Result<Box<dyn RecordingHandle>, Box<dyn Error>>;
}

pub trait PlaybackHandle {
    /// Pre-buffer so `play` starts without delay.
    fn prepare_to_play(&mut self);
    /// Extra passes after the first one; negative loops forever.
    fn set_number_of_loops(&mut self, loops: i32);
    fn play(&mut self);
    /// Halt output. Keeps the current position.
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Position within the current pass.
    fn current_time(&self) -> Duration;
    fn set_current_time(&mut self, time: Duration);
    fn duration(&self) -> Duration;
}

pub trait RecordingHandle {
    fn record(&mut self) -> Result<(), Box<dyn Error>>;
    /// Stop capture and finalize the file. Safe to call more than once.
    fn stop(&mut self);
    fn is_recording(&self) -> bool;
    fn current_time(&self) -> Duration;

    /// Most recent input level in `0.0..=1.0`.
    fn input_level(&self) -> f32 {
        0.0
    }
}
