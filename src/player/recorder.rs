//! Microphone capture into a WAV file.
//!
//! Samples arrive on cpal's input callback thread and go straight into a
//! `hound` writer behind a mutex. The file is written next to its final
//! location and only renamed over the previous recording once the writer is
//! finalized, so an interrupted session never clobbers the last good take.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig, SupportedStreamConfig};
use hound::{WavSpec, WavWriter};
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};
use std::time::{Duration, Instant};

use tapeloop::session::{AudioFormat, RecordingHandle, RecordingSettings};

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

const BITS_PER_SAMPLE: u16 = 16;

pub struct WavRecorder {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    settings: RecordingSettings,
    path: PathBuf,
    partial_path: PathBuf,
    stream: Option<cpal::Stream>,
    writer: SharedWriter,
    level: Arc<AtomicU32>,
    started_at: Option<Instant>,
    elapsed: Duration,
}

impl WavRecorder {
    pub fn new(
        device: Device,
        path: &Path,
        settings: RecordingSettings,
    ) -> Result<Self, Box<dyn Error>> {
        match settings.format {
            AudioFormat::LinearPcm => {}
        }
        if settings.channels == 0 {
            return Err("Recording needs at least one channel".into());
        }
        if settings.sample_rate <= 0.0 || settings.sample_rate.fract() != 0.0 {
            return Err(format!("Unsupported sample rate: {}", settings.sample_rate).into());
        }

        let supported = choose_input_config(&device, settings.sample_rate as u32, settings.channels)?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        log::info!(
            "Recorder input: {} ch @ {} Hz ({:?}), writing {}",
            config.channels,
            config.sample_rate.0,
            sample_format,
            settings
        );

        Ok(Self {
            device,
            config,
            sample_format,
            settings,
            path: path.to_path_buf(),
            partial_path: partial_path_for(path),
            stream: None,
            writer: Arc::new(Mutex::new(None)),
            level: Arc::new(AtomicU32::new(0)),
            started_at: None,
            elapsed: Duration::ZERO,
        })
    }

    fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.settings.channels,
            sample_rate: self.settings.sample_rate as u32,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        }
    }

    fn build_stream<T>(&self) -> Result<cpal::Stream, Box<dyn Error>>
    where
        T: cpal::SizedSample + Send + 'static,
        f32: cpal::FromSample<T>,
    {
        let writer = self.writer.clone();
        let level = self.level.clone();
        let in_channels = self.config.channels as usize;
        let out_channels = self.settings.channels as usize;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let frames = remap_channels(data, in_channels, out_channels);

                let mut sum = 0.0f32;
                let mut count = 0usize;
                let mut guard = writer.lock().ok();
                let mut wav = guard.as_mut().and_then(|guard| guard.as_mut());

                for sample in frames {
                    sum += sample * sample;
                    count += 1;
                    if let Some(out) = wav.as_mut() {
                        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        if let Err(e) = out.write_sample(value) {
                            log::error!("Failed to write recording sample: {e}");
                            wav = None;
                        }
                    }
                }

                level.store(rms_from(sum, count).to_bits(), Ordering::Relaxed);
            },
            |err| log::error!("Recording stream error: {err}"),
            None,
        )?;

        Ok(stream)
    }

    fn finalize(&mut self) -> Result<(), Box<dyn Error>> {
        let writer = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => return Err("Recording writer lock poisoned".into()),
        };

        if let Some(writer) = writer {
            writer.finalize()?;
            fs::rename(&self.partial_path, &self.path)?;
            log::info!(
                "Recording saved to {} ({:.1}s)",
                self.path.display(),
                self.elapsed.as_secs_f32()
            );
        }
        Ok(())
    }
}

impl RecordingHandle for WavRecorder {
    fn record(&mut self) -> Result<(), Box<dyn Error>> {
        if self.stream.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>()?,
            SampleFormat::I16 => self.build_stream::<i16>()?,
            SampleFormat::U16 => self.build_stream::<u16>()?,
            other => return Err(format!("Unsupported input sample format: {other:?}").into()),
        };

        let writer = WavWriter::create(&self.partial_path, self.wav_spec())?;
        if let Ok(mut guard) = self.writer.lock() {
            *guard = Some(writer);
        }

        if let Err(e) = stream.play() {
            if let Ok(mut guard) = self.writer.lock() {
                guard.take();
            }
            let _ = fs::remove_file(&self.partial_path);
            return Err(e.into());
        }

        self.stream = Some(stream);
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };

        if let Err(e) = stream.pause() {
            log::warn!("Could not pause input stream: {e}");
        }
        drop(stream);

        if let Some(started) = self.started_at.take() {
            self.elapsed = started.elapsed();
        }
        self.level.store(0, Ordering::Relaxed);

        if let Err(e) = self.finalize() {
            log::error!("Could not finalize recording {}: {e}", self.path.display());
        }
    }

    fn is_recording(&self) -> bool {
        self.stream.is_some()
    }

    fn current_time(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or(self.elapsed)
    }

    fn input_level(&self) -> f32 {
        f32::from_bits(self.level.load(Ordering::Relaxed))
    }
}

impl Drop for WavRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pick an input configuration that runs at `sample_rate`, preferring one with
/// exactly `channels` channels.
fn choose_input_config(
    device: &Device,
    sample_rate: u32,
    channels: u16,
) -> Result<SupportedStreamConfig, Box<dyn Error>> {
    let target = cpal::SampleRate(sample_rate);
    let mut fallback = None;

    for range in device.supported_input_configs()? {
        if range.min_sample_rate() > target || range.max_sample_rate() < target {
            continue;
        }
        if !matches!(
            range.sample_format(),
            SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
        ) {
            continue;
        }
        if range.channels() == channels {
            return Ok(range.with_sample_rate(target));
        }
        if fallback.is_none() {
            fallback = Some(range.with_sample_rate(target));
        }
    }

    fallback.ok_or_else(|| format!("Input device cannot capture at {sample_rate} Hz").into())
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    PathBuf::from(partial)
}

/// Convert interleaved frames from `in_channels` to `out_channels`, yielding
/// `f32` samples without buffering.
///
/// Missing output channels repeat the last input channel (mono becomes
/// dual-mono); surplus input channels are dropped. A trailing partial frame
/// is ignored.
fn remap_channels<T>(
    input: &[T],
    in_channels: usize,
    out_channels: usize,
) -> impl Iterator<Item = f32> + '_
where
    T: cpal::Sample,
    f32: cpal::FromSample<T>,
{
    let frames = if in_channels == 0 || out_channels == 0 {
        input[..0].chunks_exact(1)
    } else {
        input.chunks_exact(in_channels)
    };
    let last = in_channels.saturating_sub(1);

    frames.flat_map(move |frame| {
        (0..out_channels).map(move |channel| {
            <f32 as cpal::Sample>::from_sample(frame[channel.min(last)])
        })
    })
}

fn rms_from(sum_of_squares: f32, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    (sum_of_squares / count as f32).sqrt().min(1.0)
}
