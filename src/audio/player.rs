use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use anyhow::Result;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Engine notifications, delivered through the app's single event intake.
///
/// `MediaOpened` is always sent before any other event for the same track,
/// so a consumer never learns a track ended before it learned it opened.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    MediaOpened { duration: Option<Duration> },
    TrackStarted(Track),
    Paused,
    Resumed,
    VolumeChanged(f32),
    Error(String),
}

/// Thin wrapper over the rodio output stream and sink.
///
/// Owned by the event loop and mutated only there, so no interior locking.
/// Track-end has no callback in rodio; the owner polls `is_finished` on its
/// tick and routes completion through the same path as an explicit next.
pub struct AudioPlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    state: PlaybackState,
    volume: f32,
    event_sender: Option<mpsc::UnboundedSender<PlayerEvent>>,
}

impl AudioPlayer {
    pub fn new(volume: f32) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            state: PlaybackState::Stopped,
            volume: volume.clamp(0.0, 1.0),
            event_sender: None,
        })
    }

    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<PlayerEvent>) {
        self.event_sender = Some(sender);
    }

    /// Set the engine source to the given track and start playback.
    pub fn play(&mut self, track: &Track) -> Result<()> {
        self.stop();

        let file = match File::open(&track.path) {
            Ok(f) => f,
            Err(e) => {
                self.emit(PlayerEvent::Error(format!(
                    "failed to open {}: {e}",
                    track.path.display()
                )));
                return Err(anyhow::anyhow!(
                    "failed to open audio file {}: {e}",
                    track.path.display()
                ));
            }
        };

        let source = match Decoder::new(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                self.emit(PlayerEvent::Error(format!(
                    "cannot decode {}: {e}",
                    track.title
                )));
                return Err(anyhow::anyhow!(
                    "failed to decode {}: {e}",
                    track.path.display()
                ));
            }
        };

        let duration = source.total_duration();
        self.emit(PlayerEvent::MediaOpened { duration });

        let sink = Sink::try_new(&self.stream_handle)?;
        sink.set_volume(self.volume);
        sink.append(source);

        self.sink = Some(sink);
        self.state = PlaybackState::Playing;

        debug!(track = %track.title, ?duration, "playback started");
        self.emit(PlayerEvent::TrackStarted(track.clone()));

        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.state = PlaybackState::Paused;
            self.emit(PlayerEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
            self.state = PlaybackState::Playing;
            self.emit(PlayerEvent::Resumed);
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.state = PlaybackState::Stopped;
    }

    pub fn set_volume(&mut self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.volume = clamped;

        if let Some(sink) = &self.sink {
            sink.set_volume(clamped);
        }

        self.emit(PlayerEvent::VolumeChanged(clamped));
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Best-effort seek; some decoders cannot seek and report so.
    pub fn seek_to(&mut self, position: Duration) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(position) {
                warn!(?position, "seek rejected: {e}");
                self.emit(PlayerEvent::Error(format!("seek failed: {e}")));
            }
        }
    }

    pub fn position(&self) -> Duration {
        self.sink.as_ref().map(Sink::get_pos).unwrap_or_default()
    }

    /// Sink drained all queued audio. Also true with no sink at all, so the
    /// caller must gate on `state() == Playing`.
    pub fn is_finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(true)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}
