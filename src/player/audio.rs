//! Audio device backend: session routing and looping playback.
//!
//! The session opens the default output stream through rodio and checks that
//! an input device is present, so playback and capture can run side by side.
//! Players decode the whole file up front and feed it to a paused sink through
//! a source that wraps around at the end of each pass. The audio thread owns
//! the play cursor; the UI thread reads it and posts seek requests through
//! atomics.

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::error::Error;
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicI32, AtomicUsize, Ordering},
};
use std::time::Duration;

use super::recorder::WavRecorder;
use tapeloop::media::decode::{DecodedAudio, decode_file};
use tapeloop::session::{AudioBackend, PlaybackHandle, RecordingHandle, RecordingSettings};

const NO_SEEK: usize = usize::MAX;

pub struct DeviceBackend {
    host: cpal::Host,
    // The stream must outlive every sink created from its handle
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl DeviceBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            output: None,
        }
    }
}

impl Default for DeviceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for DeviceBackend {
    fn activate_session(&mut self) -> Result<(), Box<dyn Error>> {
        if self.output.is_none() {
            let (stream, handle) = OutputStream::try_default()?;
            self.output = Some((stream, handle));
        }

        if let Some(device) = self.host.default_output_device() {
            log::info!(
                "Output device: {}",
                device.name().unwrap_or_else(|_| "Unknown".to_string())
            );
        }

        let input = self
            .host
            .default_input_device()
            .ok_or("No default input device found")?;
        log::info!(
            "Input device: {}",
            input.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        Ok(())
    }

    fn create_player(&mut self, path: &Path) -> Result<Box<dyn PlaybackHandle>, Box<dyn Error>> {
        let (_, handle) = self
            .output
            .as_ref()
            .ok_or("Audio session is not active")?;

        let audio = decode_file(path)?;
        if audio.samples.is_empty() {
            return Err(format!("{} contains no audio", path.display()).into());
        }

        Ok(Box::new(LoopingPlayer::new(handle, audio)?))
    }

    fn create_recorder(
        &mut self,
        path: &Path,
        settings: &RecordingSettings,
    ) -> Result<Box<dyn RecordingHandle>, Box<dyn Error>> {
        let device = self
            .host
            .default_input_device()
            .ok_or("No default input device found")?;

        Ok(Box::new(WavRecorder::new(device, path, *settings)?))
    }
}

pub struct LoopingPlayer {
    sink: Sink,
    audio: Arc<DecodedAudio>,
    cursor: Arc<AtomicUsize>,
    seek_to: Arc<AtomicUsize>,
    loops: Arc<AtomicI32>,
    prepared: bool,
}

impl LoopingPlayer {
    fn new(handle: &OutputStreamHandle, audio: DecodedAudio) -> Result<Self, Box<dyn Error>> {
        let sink = Sink::try_new(handle)?;
        sink.pause();

        Ok(Self {
            sink,
            audio: Arc::new(audio),
            cursor: Arc::new(AtomicUsize::new(0)),
            seek_to: Arc::new(AtomicUsize::new(NO_SEEK)),
            loops: Arc::new(AtomicI32::new(0)),
            prepared: false,
        })
    }
}

impl PlaybackHandle for LoopingPlayer {
    fn prepare_to_play(&mut self) {
        if self.prepared {
            return;
        }
        self.sink.append(LoopingSource::new(
            self.audio.clone(),
            self.cursor.clone(),
            self.seek_to.clone(),
            self.loops.clone(),
        ));
        self.prepared = true;
    }

    fn set_number_of_loops(&mut self, loops: i32) {
        self.loops.store(loops, Ordering::Relaxed);
    }

    fn play(&mut self) {
        self.prepare_to_play();
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.pause();
    }

    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn current_time(&self) -> Duration {
        let pending = self.seek_to.load(Ordering::Relaxed);
        let position = if pending != NO_SEEK {
            pending
        } else {
            self.cursor.load(Ordering::Relaxed)
        };
        self.audio.time_at(position)
    }

    fn set_current_time(&mut self, time: Duration) {
        let target = self.audio.samples_for(time).min(self.audio.samples.len());
        self.seek_to.store(target, Ordering::Relaxed);
    }

    fn duration(&self) -> Duration {
        self.audio.duration()
    }
}

/// Replays a decoded buffer `loops + 1` times, or forever for negative loops.
struct LoopingSource {
    audio: Arc<DecodedAudio>,
    cursor: Arc<AtomicUsize>,
    seek_to: Arc<AtomicUsize>,
    loops: Arc<AtomicI32>,
    position: usize,
    passes: u32,
}

impl LoopingSource {
    fn new(
        audio: Arc<DecodedAudio>,
        cursor: Arc<AtomicUsize>,
        seek_to: Arc<AtomicUsize>,
        loops: Arc<AtomicI32>,
    ) -> Self {
        Self {
            audio,
            cursor,
            seek_to,
            loops,
            position: 0,
            passes: 0,
        }
    }
}

impl Iterator for LoopingSource {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.audio.samples.len();
        if len == 0 {
            return None;
        }

        let requested = self.seek_to.swap(NO_SEEK, Ordering::Relaxed);
        if requested != NO_SEEK {
            self.position = requested;
        }

        if self.position >= len {
            let loops = self.loops.load(Ordering::Relaxed);
            if loops >= 0 && self.passes >= loops as u32 {
                return None;
            }
            self.passes = self.passes.saturating_add(1);
            self.position = 0;
            log::debug!("Loop pass {} started", self.passes + 1);
        }

        let sample = self.audio.samples[self.position];
        self.position += 1;
        self.cursor.store(self.position % len, Ordering::Relaxed);

        Some(sample)
    }
}

impl Source for LoopingSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.audio.channels
    }

    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        if self.loops.load(Ordering::Relaxed) < 0 {
            None
        } else {
            let passes = self.loops.load(Ordering::Relaxed) as u32 + 1;
            Some(self.audio.duration() * passes)
        }
    }
}
