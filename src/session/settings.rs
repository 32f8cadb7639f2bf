use std::fmt;

/// Encoding of captured audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    LinearPcm,
}

/// Encoder quality tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AudioQuality {
    Min,
    Low,
    Medium,
    High,
    Max,
}

impl AudioQuality {
    pub fn raw_value(self) -> u8 {
        match self {
            AudioQuality::Min => 0x00,
            AudioQuality::Low => 0x20,
            AudioQuality::Medium => 0x40,
            AudioQuality::High => 0x60,
            AudioQuality::Max => 0x7F,
        }
    }
}

/// Settings handed to the recorder on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSettings {
    pub format: AudioFormat,
    pub sample_rate: f64,
    pub channels: u16,
    pub quality: AudioQuality,
}

impl RecordingSettings {
    /// Stereo 44.1 kHz linear PCM at high quality.
    pub const fn stereo_linear_pcm() -> Self {
        Self {
            format: AudioFormat::LinearPcm,
            sample_rate: 44100.0,
            channels: 2,
            quality: AudioQuality::High,
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self::stereo_linear_pcm()
    }
}

impl fmt::Display for RecordingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}, {} Hz, {} ch, quality {:?}",
            self.format, self.sample_rate, self.channels, self.quality
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RecordingSettings::default();
        assert_eq!(settings.format, AudioFormat::LinearPcm);
        assert_eq!(settings.sample_rate, 44100.0);
        assert_eq!(settings.channels, 2);
        assert_eq!(settings.quality, AudioQuality::High);
    }

    #[test]
    fn test_quality_raw_values_are_ordered() {
        assert_eq!(AudioQuality::High.raw_value(), 0x60);
        assert!(AudioQuality::Max > AudioQuality::High);
        assert!(AudioQuality::Min.raw_value() < AudioQuality::Low.raw_value());
    }

    #[test]
    fn test_display() {
        let text = RecordingSettings::default().to_string();
        assert!(text.contains("LinearPcm"));
        assert!(text.contains("44100"));
    }
}
