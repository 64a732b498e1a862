use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{AudioFormat, Track};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to read folder: {0}")]
    Io(#[from] walkdir::Error),
}

/// Lists the playable files of a single folder.
///
/// The scan is non-recursive on purpose: the playlist is "whatever this one
/// folder holds", nothing more. Results come back sorted ascending by full
/// path so load order is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct FolderScanner;

impl FolderScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan_folder(&self, folder: &Path) -> Result<Vec<Track>, ScanError> {
        if !folder.is_dir() {
            return Err(ScanError::NotADirectory(folder.to_path_buf()));
        }

        let mut tracks = Vec::new();

        for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if Self::is_recognized(path) {
                tracks.push(Track::new(path.to_path_buf()));
            } else {
                debug!(path = %path.display(), "skipping unrecognized file");
            }
        }

        tracks.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            folder = %folder.display(),
            tracks = tracks.len(),
            "folder scan complete"
        );

        Ok(tracks)
    }

    fn is_recognized(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .map(|format| format.is_supported())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"stub").unwrap();
        path
    }

    #[test]
    fn keeps_only_allow_listed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.flac");
        touch(dir.path(), "d.wav");
        touch(dir.path(), "e.wma");

        let tracks = FolderScanner::new().scan_folder(dir.path()).unwrap();
        let names: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(names, vec!["a", "d", "e"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "loud.MP3");
        touch(dir.path(), "quiet.Wav");

        let tracks = FolderScanner::new().scan_folder(dir.path()).unwrap();
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn scan_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.mp3");
        let sub = dir.path().join("deeper");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "nested.mp3");

        let tracks = FolderScanner::new().scan_folder(dir.path()).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "top");
    }

    #[test]
    fn results_are_sorted_by_full_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "zebra.mp3");
        touch(dir.path(), "alpha.mp3");
        touch(dir.path(), "miso.wav");

        let tracks = FolderScanner::new().scan_folder(dir.path()).unwrap();
        let names: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(names, vec!["alpha", "miso", "zebra"]);
    }

    #[test]
    fn folder_with_no_audio_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.md");

        let tracks = FolderScanner::new().scan_folder(dir.path()).unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(FolderScanner::new().scan_folder(&gone).is_err());
    }
}
