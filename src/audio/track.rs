use std::path::{Path, PathBuf};

use super::AudioFormat;

/// A single playable file discovered by the folder scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub format: AudioFormat,
}

impl Track {
    pub fn new(path: PathBuf) -> Self {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown);

        let title = Self::title_for(&path);

        Self {
            path,
            title,
            format,
        }
    }

    /// Display title: file base name, no extension, no directory.
    fn title_for(path: &Path) -> String {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_strips_directory_and_extension() {
        let track = Track::new(PathBuf::from("/music/morning/02 - Sunrise.mp3"));
        assert_eq!(track.title, "02 - Sunrise");
        assert_eq!(track.format, AudioFormat::Mp3);
    }

    #[test]
    fn format_detected_case_insensitively() {
        let track = Track::new(PathBuf::from("/music/loop.WAV"));
        assert_eq!(track.format, AudioFormat::Wav);

        let track = Track::new(PathBuf::from("/music/old.Wma"));
        assert_eq!(track.format, AudioFormat::Wma);
    }

    #[test]
    fn unknown_extension_maps_to_unknown() {
        let track = Track::new(PathBuf::from("/music/cover.flac"));
        assert_eq!(track.format, AudioFormat::Unknown);
        assert!(!track.format.is_supported());
    }
}
