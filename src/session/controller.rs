//! The play-and-record state machine.
//!
//! There are two states, Idle and Playing, and one action that flips between
//! them. Starting plays the prepared file on an endless loop and begins
//! recording to the fixed artifact; stopping halts both, rewinds the player and
//! releases the recorder. Capability failures are logged and never propagated:
//! the screen keeps running with whatever state it already had.

use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::backend::{AudioBackend, PlaybackHandle, RecordingHandle};
use super::settings::RecordingSettings;
use crate::constants::{INFINITE_LOOPS, PLAY_AND_RECORD_LABEL, STOP_LABEL};
use crate::media::display_name;
use crate::storage::recording_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Playing,
}

/// Result of presenting the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// A local copy of exactly one audio file
    Picked(PathBuf),
    Cancelled,
}

// Handles are declared ahead of the backend so they drop before the device
pub struct Controller<B: AudioBackend> {
    player: Option<Box<dyn PlaybackHandle>>,
    recorder: Option<Box<dyn RecordingHandle>>,
    backend: B,
    documents_dir: PathBuf,
    selected: Option<PathBuf>,
    file_label: Option<String>,
    action_enabled: bool,
    is_playing: bool,
}

impl<B: AudioBackend> Controller<B> {
    pub fn new(backend: B, documents_dir: PathBuf) -> Self {
        Self {
            player: None,
            recorder: None,
            backend,
            documents_dir,
            selected: None,
            file_label: None,
            action_enabled: false,
            is_playing: false,
        }
    }

    pub fn setup_audio_session(&mut self) {
        match self.backend.activate_session() {
            Ok(()) => info!("Audio session active for playback and recording"),
            Err(e) => error!("Failed to set up audio session: {e}"),
        }
    }

    pub fn handle_pick(&mut self, outcome: PickOutcome) {
        match outcome {
            PickOutcome::Picked(path) => {
                self.file_label = Some(display_name(&path));
                self.selected = Some(path);
                self.action_enabled = true;
                self.prepare_player();
            }
            PickOutcome::Cancelled => {
                info!("File selection cancelled");
            }
        }
    }

    pub fn prepare_player(&mut self) {
        let Some(path) = self.selected.clone() else {
            return;
        };

        // Playback and recording stop together before the player is replaced
        if self.is_playing {
            self.stop_playback_and_recording();
        }

        // The old handle goes away before the new file is opened
        self.player = None;

        match self.backend.create_player(&path) {
            Ok(mut player) => {
                player.prepare_to_play();
                player.set_number_of_loops(INFINITE_LOOPS);
                info!(
                    "Player ready for {} ({:.1}s per loop)",
                    path.display(),
                    player.duration().as_secs_f32()
                );
                self.player = Some(player);
            }
            Err(e) => error!("Error creating audio player for {}: {e}", path.display()),
        }
    }

    /// The action control was triggered.
    pub fn toggle(&mut self) {
        if self.is_playing {
            self.stop_playback_and_recording();
        } else {
            self.start_playback_and_recording();
        }
    }

    pub fn start_playback_and_recording(&mut self) {
        let Some(player) = self.player.as_mut() else {
            warn!("Audio player not ready");
            return;
        };

        player.play();
        self.start_recording();

        self.is_playing = true;
    }

    pub fn stop_playback_and_recording(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.stop();
            player.set_current_time(Duration::ZERO);
        }

        self.stop_recording();

        self.is_playing = false;
    }

    fn start_recording(&mut self) {
        let path = self.recording_path();
        let settings = RecordingSettings::default();

        let started = self
            .backend
            .create_recorder(&path, &settings)
            .and_then(|mut recorder| {
                recorder.record()?;
                Ok(recorder)
            });

        match started {
            Ok(recorder) => {
                info!("Recording started. File saved at: {}", path.display());
                self.recorder = Some(recorder);
            }
            Err(e) => error!("Could not start recording: {e}"),
        }
    }

    fn stop_recording(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop();
            info!("Recording stopped");
        }
    }

    pub fn state(&self) -> TransportState {
        if self.is_playing {
            TransportState::Playing
        } else {
            TransportState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn action_label(&self) -> &'static str {
        if self.is_playing {
            STOP_LABEL
        } else {
            PLAY_AND_RECORD_LABEL
        }
    }

    pub fn action_enabled(&self) -> bool {
        self.action_enabled
    }

    pub fn file_label(&self) -> Option<&str> {
        self.file_label.as_deref()
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.as_ref().is_some_and(|r| r.is_recording())
    }

    pub fn playback_position(&self) -> Duration {
        self.player
            .as_ref()
            .map(|p| p.current_time())
            .unwrap_or_default()
    }

    pub fn loop_duration(&self) -> Option<Duration> {
        self.player.as_ref().map(|p| p.duration())
    }

    pub fn recording_elapsed(&self) -> Option<Duration> {
        self.recorder.as_ref().map(|r| r.current_time())
    }

    pub fn input_level(&self) -> f32 {
        self.recorder
            .as_ref()
            .map(|r| r.input_level())
            .unwrap_or(0.0)
    }

    pub fn recording_path(&self) -> PathBuf {
        recording_path(&self.documents_dir)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: AudioBackend> Drop for Controller<B> {
    fn drop(&mut self) {
        // Finalize an in-flight recording when the screen goes away
        if self.is_playing {
            self.stop_playback_and_recording();
        }
    }
}
