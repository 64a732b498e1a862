use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use crate::audio::{PlayerEvent, ScanError, Track};

/// Single intake type for everything that can happen: key presses, the
/// periodic tick, finished folder scans marshaled back from their worker
/// task, and engine notifications. One queue, one consumer, so ordering
/// within each source is preserved.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    ScanFinished {
        generation: u64,
        folder: PathBuf,
        result: Result<Vec<Track>, ScanError>,
    },
    Player(PlayerEvent),
}

pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Pump terminal input and ticks into the queue. Runs until the
    /// receiving side goes away.
    pub async fn pump_terminal_events(
        sender: mpsc::UnboundedSender<AppEvent>,
        tick_interval: Duration,
    ) -> Result<()> {
        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && sender.send(AppEvent::Key(key)).is_err() {
                        return Ok(());
                    }
                }
            }

            if sender.send(AppEvent::Tick).is_err() {
                return Ok(());
            }
            tokio::time::sleep(tick_interval).await;
        }
    }

    /// Forward engine events into the main queue so the app has exactly one
    /// intake point.
    pub fn bridge_player_events(
        sender: mpsc::UnboundedSender<AppEvent>,
        mut player_rx: mpsc::UnboundedReceiver<PlayerEvent>,
    ) {
        tokio::spawn(async move {
            while let Some(event) = player_rx.recv().await {
                if sender.send(AppEvent::Player(event)).is_err() {
                    break;
                }
            }
        });
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
