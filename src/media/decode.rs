//! Whole-file decoding of the audio formats the picker offers.
//!
//! Playback keeps the entire decoded file in memory so the loop can wrap
//! around without touching the disk again. Every bit depth is normalized to
//! 16-bit integer samples, interleaved in the file's channel order.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl DecodedAudio {
    pub fn duration(&self) -> Duration {
        let frames_per_second = self.sample_rate as f64 * self.channels.max(1) as f64;
        if frames_per_second == 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / frames_per_second)
    }

    /// Number of interleaved samples that make up `time` of audio.
    pub fn samples_for(&self, time: Duration) -> usize {
        let per_second = self.sample_rate as f64 * self.channels as f64;
        let raw = (time.as_secs_f64() * per_second) as usize;
        // Keep the cursor on a frame boundary so channels don't swap
        raw - raw % self.channels.max(1) as usize
    }

    pub fn time_at(&self, sample_index: usize) -> Duration {
        let per_second = self.sample_rate as f64 * self.channels as f64;
        if per_second == 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(sample_index as f64 / per_second)
    }
}

pub fn decode_file(path: &Path) -> Result<DecodedAudio, Box<dyn Error>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let decoded = match ext.as_str() {
        "wav" => decode_wav(path)?,
        "flac" => decode_flac(path)?,
        _ => return Err(format!("Unsupported audio format: {ext}").into()),
    };

    if decoded.channels == 0 || decoded.sample_rate == 0 {
        return Err(format!("Invalid stream parameters in {}", path.display()).into());
    }

    log::info!(
        "Decoded {}: {} Hz, {} channels, {} samples",
        path.display(),
        decoded.sample_rate,
        decoded.channels,
        decoded.samples.len()
    );

    Ok(decoded)
}

fn decode_wav(path: &Path) -> Result<DecodedAudio, Box<dyn Error>> {
    let mut reader = hound::WavReader::new(BufReader::new(File::open(path)?))?;
    let spec = reader.spec();

    log::debug!("WAV format: {spec:?}");

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            let samples: Result<Vec<f32>, _> = reader.samples().collect();
            samples?
                .into_iter()
                .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                .collect()
        }
        (hound::SampleFormat::Int, 8) => {
            let samples: Result<Vec<i8>, _> = reader.samples().collect();
            samples?.into_iter().map(|s| (s as i16) << 8).collect()
        }
        (hound::SampleFormat::Int, 16) => {
            let samples: Result<Vec<i16>, _> = reader.samples().collect();
            samples?
        }
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let samples: Result<Vec<i32>, _> = reader.samples().collect();
            samples?
                .into_iter()
                .map(|s| to_i16(s, bits as u32))
                .collect()
        }
        (format, bits) => {
            return Err(format!("Unsupported WAV sample format: {format:?} {bits}-bit").into());
        }
    };

    Ok(DecodedAudio {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        samples,
    })
}

fn decode_flac(path: &Path) -> Result<DecodedAudio, Box<dyn Error>> {
    let mut reader = claxon::FlacReader::open(path)?;
    let info = reader.streaminfo();

    let mut samples = Vec::new();
    for sample in reader.samples() {
        samples.push(to_i16(sample?, info.bits_per_sample));
    }

    Ok(DecodedAudio {
        channels: info.channels as u16,
        sample_rate: info.sample_rate,
        samples,
    })
}

fn to_i16(sample: i32, bits_per_sample: u32) -> i16 {
    match bits_per_sample {
        0..=16 => (sample << (16 - bits_per_sample)) as i16,
        bits => (sample >> (bits - 16)) as i16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, bits: u16, samples: &[i32]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            match bits {
                8 => writer.write_sample(s as i8).unwrap(),
                16 => writer.write_sample(s as i16).unwrap(),
                _ => writer.write_sample(s).unwrap(),
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_16bit_stereo_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("loop.wav");
        write_wav(&path, 2, 16, &[100, -100, 2000, -2000]);

        let decoded = decode_file(&path).unwrap();

        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples, vec![100, -100, 2000, -2000]);
    }

    #[test]
    fn test_decode_24bit_wav_scales_down() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hi-res.wav");
        write_wav(&path, 1, 24, &[256000, -256000]);

        let decoded = decode_file(&path).unwrap();

        assert_eq!(decoded.samples, vec![1000, -1000]);
    }

    #[test]
    fn test_decode_8bit_wav_scales_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lofi.wav");
        write_wav(&path, 1, 8, &[1, -1]);

        let decoded = decode_file(&path).unwrap();

        assert_eq!(decoded.samples, vec![256, -256]);
    }

    #[test]
    fn test_decode_float_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(1.0f32).unwrap();
        writer.write_sample(0.0f32).unwrap();
        writer.finalize().unwrap();

        let decoded = decode_file(&path).unwrap();

        assert_eq!(decoded.samples, vec![i16::MAX, 0]);
    }

    #[test]
    fn test_decode_unsupported_extension() {
        let result = decode_file(Path::new("song.mp3"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported"));
    }

    #[test]
    fn test_decode_nonexistent_file() {
        assert!(decode_file(Path::new("/nonexistent/file.wav")).is_err());
    }

    #[test]
    fn test_decode_garbage_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.wav");
        std::fs::write(&path, b"fake wav").unwrap();

        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn test_time_conversions() {
        let audio = DecodedAudio {
            channels: 2,
            sample_rate: 10,
            samples: vec![0; 40],
        };

        assert_eq!(audio.duration(), Duration::from_secs(2));
        assert_eq!(audio.samples_for(Duration::from_secs(1)), 20);
        assert_eq!(audio.samples_for(Duration::from_millis(150)), 2);
        assert_eq!(audio.time_at(10), Duration::from_millis(500));
    }

    #[test]
    fn test_to_i16() {
        assert_eq!(to_i16(1000, 16), 1000);
        assert_eq!(to_i16(256000, 24), 1000);
        assert_eq!(to_i16(65536000, 32), 1000);
        assert_eq!(to_i16(1, 8), 256);
    }
}
