//! Audio content helpers shared by the picker, the controller and the player.

use std::path::Path;

use crate::constants::AUDIO_EXTENSIONS;

#[cfg(feature = "player")]
pub mod decode;

/// Label shown for a selected file: its name with the final extension removed.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_extension() {
        assert_eq!(display_name(Path::new("/music/Song Title.wav")), "Song Title");
        assert_eq!(display_name(Path::new("loop.flac")), "loop");
    }

    #[test]
    fn test_display_name_only_strips_last_extension() {
        assert_eq!(display_name(Path::new("take.01.wav")), "take.01");
        assert_eq!(display_name(Path::new("noextension")), "noextension");
    }

    #[test]
    fn test_is_supported_audio_file() {
        assert!(is_supported_audio_file(Path::new("test.wav")));
        assert!(is_supported_audio_file(Path::new("test.flac")));
        assert!(is_supported_audio_file(Path::new("test.WAV")));
        assert!(is_supported_audio_file(Path::new("test.FLAC")));
        assert!(!is_supported_audio_file(Path::new("test.mp3")));
        assert!(!is_supported_audio_file(Path::new("test.txt")));
        assert!(!is_supported_audio_file(Path::new("test")));
    }
}
