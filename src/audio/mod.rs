pub mod player;
pub mod playlist;
pub mod progress;
pub mod scanner;
pub mod track;

pub use player::{AudioPlayer, PlaybackState, PlayerEvent};
pub use playlist::Playlist;
pub use progress::ProgressSync;
pub use scanner::{FolderScanner, ScanError};
pub use track::Track;

/// Recognized formats. The allow-list is deliberately small: this player
/// loads whatever a single folder holds, it is not a library manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Wma,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "wav" => AudioFormat::Wav,
            "wma" => AudioFormat::Wma,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
