use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::Track;

/// Playlist plus selection state. This is the whole player "core": one folder
/// worth of tracks, a cursor into it, and the shuffle bookkeeping.
///
/// All mutation happens on the event-loop thread, so there is no locking
/// here; the struct is built fresh per session and replaced wholesale on
/// every folder load.
pub struct Playlist {
    tracks: Vec<Track>,
    current: usize,
    shuffle_enabled: bool,
    // Indices not yet visited in the current shuffle cycle.
    shuffle_pool: Vec<usize>,
    rng: StdRng,
}

impl Playlist {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tracks: Vec::new(),
            current: 0,
            shuffle_enabled: false,
            shuffle_pool: Vec::new(),
            rng,
        }
    }

    /// Replace the playlist wholesale with a freshly scanned folder.
    /// The cursor resets to track 0; whether track 0 starts playing is the
    /// caller's policy.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current = 0;
        if self.shuffle_enabled {
            self.rearm_pool();
        } else {
            self.shuffle_pool.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Enabling shuffle re-arms the pool against the current cursor;
    /// disabling leaves the playlist order and cursor untouched.
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle_enabled = enabled;
        if enabled {
            self.rearm_pool();
        }
        debug!(enabled, "shuffle toggled");
    }

    /// Advance the cursor. Sequential mode wraps past the last track;
    /// shuffle mode draws from the not-yet-visited pool, refilling it once
    /// every track has been visited.
    pub fn next(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        if self.shuffle_enabled {
            self.draw_from_pool();
        } else {
            self.current = (self.current + 1) % self.tracks.len();
        }

        self.tracks.get(self.current)
    }

    /// Step the cursor back, wrapping to the last track at the low boundary.
    ///
    /// Shuffle mode has no backward navigation: previous performs the same
    /// random draw as next. Explicit policy, not an accident.
    pub fn previous(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        if self.shuffle_enabled {
            self.draw_from_pool();
        } else if self.current == 0 {
            self.current = self.tracks.len() - 1;
        } else {
            self.current -= 1;
        }

        self.tracks.get(self.current)
    }

    /// All indices except the current one, so a fresh cycle never opens by
    /// repeating the track that is already playing. Best-effort only: once
    /// the pool refills mid-cycle the old cursor is fair game again.
    fn rearm_pool(&mut self) {
        self.shuffle_pool = (0..self.tracks.len())
            .filter(|&i| i != self.current)
            .collect();
    }

    fn draw_from_pool(&mut self) {
        if self.shuffle_pool.is_empty() {
            self.rearm_pool();
        }
        // Still empty means a single-track playlist: stay put.
        if self.shuffle_pool.is_empty() {
            return;
        }

        let slot = self.rng.gen_range(0..self.shuffle_pool.len());
        self.current = self.shuffle_pool.swap_remove(slot);
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(PathBuf::from(format!("/music/{i:02}.mp3"))))
            .collect()
    }

    #[test]
    fn replace_resets_cursor_to_first_track() {
        let mut playlist = Playlist::with_seed(1);
        playlist.replace(tracks(3));
        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(playlist.current_track().unwrap().title, "00");
    }

    #[test]
    fn empty_playlist_has_no_cursor_and_ignores_transport() {
        let mut playlist = Playlist::with_seed(1);
        assert_eq!(playlist.current_index(), None);
        assert!(playlist.next().is_none());
        assert!(playlist.previous().is_none());
    }

    #[test]
    fn sequential_next_wraps_at_the_end() {
        let mut playlist = Playlist::with_seed(1);
        playlist.replace(tracks(3));
        playlist.next();
        playlist.next();
        assert_eq!(playlist.current_index(), Some(2));
        playlist.next();
        assert_eq!(playlist.current_index(), Some(0));
    }

    #[test]
    fn sequential_previous_wraps_at_the_start() {
        let mut playlist = Playlist::with_seed(1);
        playlist.replace(tracks(3));
        playlist.previous();
        assert_eq!(playlist.current_index(), Some(2));
        playlist.previous();
        assert_eq!(playlist.current_index(), Some(1));
    }

    #[test]
    fn shuffle_visits_every_other_track_once_before_refill() {
        let mut playlist = Playlist::with_seed(42);
        playlist.replace(tracks(4));
        playlist.set_shuffle(true);

        // Three draws must exhaust {1, 2, 3} with no repeats and never
        // land on the track that was current when the pool was armed.
        let mut seen = Vec::new();
        for _ in 0..3 {
            playlist.next();
            seen.push(playlist.current_index().unwrap());
        }
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);

        // Fourth draw hits an empty pool and triggers a refill; the refill
        // excludes whatever was current at that moment.
        let before_refill = playlist.current_index().unwrap();
        playlist.next();
        let after = playlist.current_index().unwrap();
        assert_ne!(after, before_refill);
        assert!(after < 4);
    }

    #[test]
    fn toggling_shuffle_never_reorders_tracks() {
        let mut playlist = Playlist::with_seed(7);
        playlist.replace(tracks(5));
        let order_before: Vec<_> =
            playlist.tracks().iter().map(|t| t.path.clone()).collect();

        playlist.set_shuffle(true);
        playlist.next();
        playlist.set_shuffle(false);
        playlist.set_shuffle(true);

        let order_after: Vec<_> =
            playlist.tracks().iter().map(|t| t.path.clone()).collect();
        assert_eq!(order_before, order_after);
    }

    #[test]
    fn enabling_shuffle_keeps_the_cursor_in_place() {
        let mut playlist = Playlist::with_seed(7);
        playlist.replace(tracks(5));
        playlist.next();
        playlist.next();
        let cursor = playlist.current_index();
        playlist.set_shuffle(true);
        assert_eq!(playlist.current_index(), cursor);
    }

    #[test]
    fn shuffle_previous_draws_like_next() {
        let mut playlist = Playlist::with_seed(3);
        playlist.replace(tracks(4));
        playlist.set_shuffle(true);

        let start = playlist.current_index().unwrap();
        playlist.previous();
        let drawn = playlist.current_index().unwrap();
        assert_ne!(drawn, start);
    }

    #[test]
    fn single_track_shuffle_stays_put_without_panicking() {
        let mut playlist = Playlist::with_seed(9);
        playlist.replace(tracks(1));
        playlist.set_shuffle(true);
        playlist.next();
        playlist.next();
        assert_eq!(playlist.current_index(), Some(0));
    }

    #[test]
    fn shuffle_cursor_stays_in_bounds_across_many_draws() {
        let mut playlist = Playlist::with_seed(1234);
        playlist.replace(tracks(6));
        playlist.set_shuffle(true);
        for _ in 0..100 {
            playlist.next();
            assert!(playlist.current_index().unwrap() < 6);
        }
    }
}
