use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{AppEvent, EventHandler, TerminalManager};
use crate::audio::{
    AudioPlayer, FolderScanner, PlaybackState, PlayerEvent, Playlist, ProgressSync, ScanError,
    Track,
};
use crate::config::Config;

const STATUS_LIFETIME: Duration = Duration::from_secs(5);

// A sink can read empty for a moment right after append; don't mistake that
// for the track finishing.
const TRACK_END_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    FolderPrompt,
}

pub struct App {
    config: Config,
    terminal: TerminalManager,
    event_handler: EventHandler,
    player: AudioPlayer,

    playlist: Playlist,
    progress: ProgressSync,
    folder: Option<PathBuf>,

    // Folder scans run off-thread; only the newest generation may land.
    scan_generation: u64,
    pending_initial_folder: Option<PathBuf>,

    input_mode: InputMode,
    folder_input: String,
    status_message: Option<(String, Instant)>,
    track_started_at: Option<Instant>,
    last_progress_sync: Instant,
    list_state: ListState,
    should_quit: bool,
}

impl App {
    pub async fn new(config: Config, initial_folder: Option<PathBuf>) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let event_handler = EventHandler::new();

        let mut player = AudioPlayer::new(config.audio.volume)?;

        // Engine events flow through the same queue as everything else.
        let (player_tx, player_rx) = mpsc::unbounded_channel();
        player.set_event_sender(player_tx);
        EventHandler::bridge_player_events(event_handler.sender(), player_rx);

        Ok(Self {
            config,
            terminal,
            event_handler,
            player,
            playlist: Playlist::new(),
            progress: ProgressSync::new(),
            folder: None,
            scan_generation: 0,
            pending_initial_folder: initial_folder,
            input_mode: InputMode::Normal,
            folder_input: String::new(),
            status_message: None,
            track_started_at: None,
            last_progress_sync: Instant::now(),
            list_state: ListState::default(),
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let sender = self.event_handler.sender();
        let tick = Duration::from_millis(self.config.ui.tick_ms);
        tokio::spawn(async move {
            let _ = EventHandler::pump_terminal_events(sender, tick).await;
        });

        if let Some(folder) = self.pending_initial_folder.take() {
            self.start_scan(folder);
        }

        while !self.should_quit {
            self.render()?;

            if let Some(event) = self.event_handler.next_event().await {
                self.handle_event(event)?;
            } else {
                break;
            }
        }

        self.player.stop();
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => self.on_tick(),
            AppEvent::ScanFinished {
                generation,
                folder,
                result,
            } => self.on_scan_finished(generation, folder, result),
            AppEvent::Player(event) => self.on_player_event(event),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::FolderPrompt => self.handle_prompt_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.folder_input.clear();
            }
            KeyCode::Enter => {
                let path = self.folder_input.trim().to_string();
                self.input_mode = InputMode::Normal;
                self.folder_input.clear();
                if !path.is_empty() {
                    self.start_scan(PathBuf::from(path));
                }
            }
            KeyCode::Backspace => {
                self.folder_input.pop();
            }
            KeyCode::Char(c) => self.folder_input.push(c),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('o') => {
                self.input_mode = InputMode::FolderPrompt;
                self.folder_input.clear();
            }
            KeyCode::Char(' ') => self.toggle_play_pause(),
            KeyCode::Char('n') => self.next_track(),
            KeyCode::Char('b') => self.previous_track(),
            KeyCode::Char('z') => self.toggle_shuffle(),
            KeyCode::Left => self.seek_by(-(self.config.audio.seek_step_secs as f64)),
            KeyCode::Right => self.seek_by(self.config.audio.seek_step_secs as f64),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_volume(0.05),
            KeyCode::Char('-') => self.adjust_volume(-0.05),
            _ => {}
        }
    }

    // Folder load runs on a blocking task; the generation counter makes a
    // newer selection win over any still-outstanding scan.
    fn start_scan(&mut self, folder: PathBuf) {
        self.scan_generation += 1;
        let generation = self.scan_generation;
        self.set_status(format!("Scanning {}...", folder.display()));

        let sender = self.event_handler.sender();
        tokio::task::spawn_blocking(move || {
            let result = FolderScanner::new().scan_folder(&folder);
            let _ = sender.send(AppEvent::ScanFinished {
                generation,
                folder,
                result,
            });
        });
    }

    fn on_scan_finished(
        &mut self,
        generation: u64,
        folder: PathBuf,
        result: Result<Vec<Track>, ScanError>,
    ) {
        if generation != self.scan_generation {
            debug!(generation, "dropping stale scan result");
            return;
        }

        match result {
            Err(e) => {
                warn!(folder = %folder.display(), "scan failed: {e}");
                self.set_status(format!("Scan failed: {e}"));
            }
            Ok(tracks) if tracks.is_empty() => {
                // Empty folder resets the displays but never touches the
                // engine; whatever was playing keeps playing.
                self.playlist.replace(Vec::new());
                self.folder = None;
                self.set_status("No audio files found in this folder.".to_string());
            }
            Ok(tracks) => {
                let count = tracks.len();
                info!(folder = %folder.display(), count, "playlist loaded");
                self.playlist.replace(tracks);
                self.folder = Some(folder);
                // Autoplay on load: there is no "loaded but stopped" state.
                self.play_current();
                self.set_status(format!("Loaded {count} tracks"));
            }
        }
    }

    fn on_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::MediaOpened { duration } => {
                self.progress.media_opened(duration);
                self.last_progress_sync = Instant::now();
            }
            PlayerEvent::TrackStarted(track) => {
                info!(track = %track.title, "now playing");
            }
            PlayerEvent::Paused => self.set_status("Paused".to_string()),
            PlayerEvent::Resumed => self.set_status("Playing".to_string()),
            PlayerEvent::VolumeChanged(volume) => {
                self.set_status(format!("Volume: {}%", (volume * 100.0).round() as u32));
            }
            PlayerEvent::Error(message) => {
                warn!("engine error: {message}");
                self.set_status(format!("Audio error: {message}"));
            }
        }
    }

    fn on_tick(&mut self) {
        if self.player.state() != PlaybackState::Playing {
            return;
        }

        let settled = self
            .track_started_at
            .map(|t| t.elapsed() >= TRACK_END_DEBOUNCE)
            .unwrap_or(false);

        if settled && self.player.is_finished() {
            // Track end takes the exact same path as an explicit next.
            self.progress.track_ended();
            self.next_track();
            return;
        }

        let sync_interval = Duration::from_millis(self.config.ui.progress_sync_ms);
        if self.last_progress_sync.elapsed() >= sync_interval {
            self.progress.tick(self.player.position());
            self.last_progress_sync = Instant::now();
        }
    }

    fn toggle_play_pause(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        match self.player.state() {
            PlaybackState::Playing => self.player.pause(),
            PlaybackState::Paused => self.player.resume(),
            PlaybackState::Stopped => self.play_current(),
        }
    }

    fn next_track(&mut self) {
        if let Some(track) = self.playlist.next().cloned() {
            self.start_track(&track);
        }
    }

    fn previous_track(&mut self) {
        if let Some(track) = self.playlist.previous().cloned() {
            self.start_track(&track);
        }
    }

    fn play_current(&mut self) {
        if let Some(track) = self.playlist.current_track().cloned() {
            self.start_track(&track);
        }
    }

    fn start_track(&mut self, track: &Track) {
        self.track_started_at = Some(Instant::now());
        if let Err(e) = self.player.play(track) {
            warn!(track = %track.title, "failed to start track: {e}");
        }
    }

    fn toggle_shuffle(&mut self) {
        let enabled = !self.playlist.shuffle_enabled();
        self.playlist.set_shuffle(enabled);
        self.set_status(if enabled {
            "Shuffle: on".to_string()
        } else {
            "Shuffle: off".to_string()
        });
    }

    // Keyboard seeks reuse the drag protocol: start, move, release.
    fn seek_by(&mut self, delta_secs: f64) {
        if self.progress.duration().is_none() {
            return;
        }

        let target = self.progress.position_secs() + delta_secs;
        self.progress.drag_start();
        if let Some(position) = self.progress.drag_end(target) {
            self.player.seek_to(position);
        }
    }

    fn adjust_volume(&mut self, delta: f32) {
        let volume = self.player.volume() + delta;
        self.player.set_volume(volume);
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    fn render(&mut self) -> Result<()> {
        self.list_state.select(self.playlist.current_index());

        let playlist = &self.playlist;
        let progress = &self.progress;
        let folder = &self.folder;
        let input_mode = self.input_mode;
        let folder_input = &self.folder_input;
        let state = self.player.state();
        let volume = self.player.volume();
        let status = self
            .status_message
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_LIFETIME)
            .map(|(text, _)| text.as_str());
        let list_state = &mut self.list_state;

        self.terminal.draw(|f| {
            Self::render_ui(
                f,
                playlist,
                progress,
                folder,
                input_mode,
                folder_input,
                state,
                volume,
                status,
                list_state,
            );
        })?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_ui(
        f: &mut Frame,
        playlist: &Playlist,
        progress: &ProgressSync,
        folder: &Option<PathBuf>,
        input_mode: InputMode,
        folder_input: &str,
        state: PlaybackState,
        volume: f32,
        status: Option<&str>,
        list_state: &mut ListState,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.area());

        let header = if input_mode == InputMode::FolderPrompt {
            Line::from(vec![
                Span::styled("Open folder: ", Style::default().fg(Color::Yellow)),
                Span::raw(folder_input),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ])
        } else {
            match folder {
                Some(path) => Line::from(format!("Folder: {}", path.display())),
                None => Line::from(Span::styled(
                    "No folder selected - press 'o' to open one",
                    Style::default().fg(Color::DarkGray),
                )),
            }
        };
        f.render_widget(
            Paragraph::new(header).block(Block::default().borders(Borders::ALL).title("ocarina")),
            chunks[0],
        );

        let items: Vec<ListItem> = playlist
            .tracks()
            .iter()
            .map(|t| ListItem::new(t.title.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Playlist"))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, chunks[1], list_state);

        let clock = match progress.duration() {
            Some(duration) => format!(
                "{} / {}",
                format_clock(progress.position_secs()),
                format_clock(duration.as_secs_f64())
            ),
            None => "--:-- / --:--".to_string(),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(progress.ratio())
            .label(clock);
        f.render_widget(gauge, chunks[2]);

        let state_label = match state {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
        };
        let now_playing = playlist
            .current_track()
            .map(|t| t.title.as_str())
            .unwrap_or("None");
        let shuffle = if playlist.shuffle_enabled() {
            "on"
        } else {
            "off"
        };
        let mut status_line = vec![
            Span::styled(state_label, Style::default().fg(Color::Green)),
            Span::raw(format!(
                "  |  Now playing: {now_playing}  |  Vol {}%  |  Shuffle {shuffle}",
                (volume * 100.0).round() as u32
            )),
        ];
        if let Some(message) = status {
            status_line.push(Span::styled(
                format!("  |  {message}"),
                Style::default().fg(Color::Yellow),
            ));
        }
        f.render_widget(
            Paragraph::new(Line::from(status_line))
                .block(Block::default().borders(Borders::ALL).title("Status")),
            chunks[3],
        );
    }
}

fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
