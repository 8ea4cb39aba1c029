//! Audio system: looped track playback, analysis tap and background loading.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::analyser::{AnalysisTap, Analyser};
use super::decode::{decode_file, DecodedTrack};
use super::resample::resample_track;
use crate::error::AudioError;
use crate::params::AnalyserConfig;
use crate::spectrum::{FrequencyFrame, FrequencySource};
use crate::tracks::Track;

/// Playback cursor shared with the output callback.
///
/// Tracks are resampled to the output rate before they get here, so the
/// cursor moves one track frame per output frame.
struct Playback {
    track: Option<Arc<DecodedTrack>>,
    position: usize,
    playing: bool,
    looping: bool,
    volume: f32,
}

impl Playback {
    fn new(volume: f32) -> Self {
        Self {
            track: None,
            position: 0,
            playing: false,
            looping: true,
            volume,
        }
    }

    fn is_active(&self) -> bool {
        self.playing && self.track.is_some()
    }

    /// Current output sample for `channel`
    fn current(&self, channel: usize) -> f32 {
        match self.track.as_deref() {
            Some(track) if self.playing => track.sample(self.position, channel) * self.volume,
            _ => 0.0,
        }
    }

    fn advance(&mut self) {
        let Some(frames) = self.track.as_ref().map(|t| t.frames()) else {
            return;
        };
        if !self.playing || frames == 0 {
            return;
        }

        self.position += 1;
        if self.position >= frames {
            if self.looping {
                self.position = 0;
            } else {
                self.playing = false;
            }
        }
    }
}

/// Owns the output stream and turns the playing signal into spectrum frames
pub struct AudioSystem {
    playback: Arc<Mutex<Playback>>,
    tap: Arc<Mutex<AnalysisTap>>,
    analyser: Analyser,
    scratch: Vec<f32>,
    output_rate: u32,
    loader: Option<Receiver<Result<DecodedTrack, AudioError>>>,
    loading: Option<PathBuf>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start a (silent) stream
    pub fn new(config: AnalyserConfig) -> Result<Self, AudioError> {
        let playback = Arc::new(Mutex::new(Playback::new(config.volume)));
        let tap = Arc::new(Mutex::new(AnalysisTap::new(config.fft_size)));

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.config();

        log::info!(
            "Audio: {} @ {}Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format
        );

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, &playback, &tap)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, &playback, &tap)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, &playback, &tap)?
            }
            other => return Err(AudioError::UnsupportedSampleFormat(other)),
        };
        stream.play()?;

        Ok(Self {
            playback,
            tap,
            scratch: vec![0.0; config.fft_size],
            analyser: Analyser::new(config),
            output_rate: stream_config.sample_rate.0,
            loader: None,
            loading: None,
            _stream: stream,
        })
    }

    /// Stop the current track and start decoding `track` in the background,
    /// converted to the output device's sample rate
    pub fn load(&mut self, track: &Track) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let path = track.path.clone();
        let output_rate = self.output_rate;
        log::info!("Loading track '{}' from {}", track.name, path.display());

        thread::spawn(move || {
            let result = decode_file(&path).and_then(|t| resample_track(t, output_rate));
            // The receiver is gone if another track was requested meanwhile
            let _ = tx.send(result);
        });

        self.loader = Some(rx);
        self.loading = Some(track.path.clone());
    }

    /// Silence output and forget the analysed signal
    pub fn stop(&mut self) {
        self.playback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .playing = false;
        self.tap.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Install a finished background decode, without blocking.
    ///
    /// Returns `None` while nothing changed, `Some(Ok(path))` when a track
    /// started playing and `Some(Err(_))` when loading failed.
    pub fn poll(&mut self) -> Option<Result<PathBuf, AudioError>> {
        let result = match self.loader.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AudioError::LoaderDisconnected),
        };
        self.loader = None;
        let requested = self.loading.take();

        match result {
            Ok(track) => {
                let path = track.path.clone();
                self.start(track);
                Some(Ok(path))
            }
            Err(e) => {
                log::warn!(
                    "Track {} failed to load",
                    requested
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                );
                Some(Err(e))
            }
        }
    }

    fn start(&mut self, track: DecodedTrack) {
        if track.sample_rate != self.output_rate {
            log::warn!(
                "Track {} is {}Hz on a {}Hz output",
                track.path.display(),
                track.sample_rate,
                self.output_rate
            );
        }
        self.analyser.reset();
        self.tap.lock().unwrap_or_else(PoisonError::into_inner).clear();

        let mut playback = self.playback.lock().unwrap_or_else(PoisonError::into_inner);
        playback.track = Some(Arc::new(track));
        playback.position = 0;
        playback.looping = true;
        playback.playing = true;
    }
}

impl FrequencySource for AudioSystem {
    fn frequency_data(&mut self) -> Option<FrequencyFrame> {
        // Never wait on the audio thread; a busy tap means a stale frame
        let tap = self.tap.try_lock().ok()?;
        if tap.is_empty() {
            return None;
        }
        tap.snapshot_into(&mut self.scratch);
        drop(tap);

        Some(self.analyser.analyse(&self.scratch))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    playback: &Arc<Mutex<Playback>>,
    tap: &Arc<Mutex<AnalysisTap>>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = usize::from(config.channels).max(1);
    let playback = Arc::clone(playback);
    let tap = Arc::clone(tap);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let (Ok(mut playback), Ok(mut tap)) = (playback.lock(), tap.lock()) else {
                data.fill(T::EQUILIBRIUM);
                return;
            };

            for frame in data.chunks_mut(channels) {
                let mut mono = 0.0;
                for (channel, slot) in frame.iter_mut().enumerate() {
                    let sample = playback.current(channel);
                    mono += sample;
                    *slot = T::from_sample(sample);
                }
                if playback.is_active() {
                    tap.push(mono / channels as f32);
                }
                playback.advance();
            }
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}
