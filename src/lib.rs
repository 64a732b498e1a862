// ocarina - minimal folder-based audio player
// One folder in, one playlist out; the rest is transport buttons

pub mod audio; // playback engine, folder scan, playlist state
pub mod config; // settings with on-disk defaults
pub mod ui; // terminal interface

// Export the stuff callers actually use
pub use audio::{AudioPlayer, FolderScanner, PlaybackState, Playlist, ProgressSync, Track};
pub use config::Config;
