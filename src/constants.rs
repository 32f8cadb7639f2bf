//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

/// Name of the single recording artifact inside the documents directory
pub const RECORDING_FILE_NAME: &str = "recording.wav";

/// Directory (inside the documents directory) that receives picked file copies
pub const INBOX_DIR_NAME: &str = "Inbox";

/// Audio content the picker offers and the player can decode
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac"];

/// Loop count meaning "repeat forever"
pub const INFINITE_LOOPS: i32 = -1;

/// Action control label while idle
pub const PLAY_AND_RECORD_LABEL: &str = "Play and Record";

/// Action control label while playing
pub const STOP_LABEL: &str = "Stop";

/// Log file used while the terminal UI owns stdout
pub const DEFAULT_LOG_FILE: &str = "/tmp/tapeloop.log";
