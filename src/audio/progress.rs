use std::time::Duration;

/// Keeps the on-screen progress indicator in sync with the engine.
///
/// The indicator only becomes live once the engine reports a track open with
/// a known duration. Periodic ticks push the engine position into the
/// display, except while the user is dragging the indicator; a drag owns the
/// displayed value until it completes, and completion turns the dragged value
/// into a seek command.
#[derive(Debug, Default)]
pub struct ProgressSync {
    duration: Option<Duration>,
    position_secs: f64,
    dragging: bool,
}

impl ProgressSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine opened a track. Arms the indicator if the duration is known;
    /// an unknown duration leaves the indicator disarmed for this track.
    pub fn media_opened(&mut self, duration: Option<Duration>) {
        self.duration = duration;
        self.position_secs = 0.0;
        self.dragging = false;
    }

    /// Track finished (or was replaced): disarm until the next open.
    pub fn track_ended(&mut self) {
        self.duration = None;
        self.position_secs = 0.0;
        self.dragging = false;
    }

    /// Periodic sync from the engine's readable position. Suppressed for the
    /// whole duration of an active drag.
    pub fn tick(&mut self, engine_position: Duration) {
        if self.dragging || self.duration.is_none() {
            return;
        }
        self.position_secs = engine_position.as_secs_f64();
    }

    pub fn drag_start(&mut self) {
        self.dragging = true;
    }

    /// Value change while dragging: move the displayed position and commit
    /// it as a seek right away. Redundant with the commit on release, which
    /// matches how the original slider behaved.
    pub fn drag_update(&mut self, secs: f64) -> Option<Duration> {
        if !self.dragging {
            return None;
        }
        self.set_clamped(secs)
    }

    /// Drag released: resume tick sync and commit the final value.
    pub fn drag_end(&mut self, secs: f64) -> Option<Duration> {
        self.dragging = false;
        self.set_clamped(secs)
    }

    fn set_clamped(&mut self, secs: f64) -> Option<Duration> {
        let duration = self.duration?;
        let clamped = secs.clamp(0.0, duration.as_secs_f64());
        self.position_secs = clamped;
        Some(Duration::from_secs_f64(clamped))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Fill ratio for the gauge widget, 0.0 when disarmed.
    pub fn ratio(&self) -> f64 {
        match self.duration {
            Some(d) if d > Duration::ZERO => {
                (self.position_secs / d.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_moves_position_once_armed() {
        let mut sync = ProgressSync::new();
        sync.tick(Duration::from_secs(10));
        assert_eq!(sync.position_secs(), 0.0);

        sync.media_opened(Some(Duration::from_secs(180)));
        sync.tick(Duration::from_secs(10));
        assert_eq!(sync.position_secs(), 10.0);
    }

    #[test]
    fn dragging_suppresses_tick_updates() {
        let mut sync = ProgressSync::new();
        sync.media_opened(Some(Duration::from_secs(180)));
        sync.drag_start();
        sync.drag_update(42.0);
        sync.tick(Duration::from_secs(90));
        assert_eq!(sync.position_secs(), 42.0);
    }

    #[test]
    fn drag_end_commits_the_exact_released_value() {
        let mut sync = ProgressSync::new();
        sync.media_opened(Some(Duration::from_secs(200)));
        sync.drag_start();
        let seek = sync.drag_end(73.0).unwrap();
        assert_eq!(seek, Duration::from_secs_f64(73.0));
        assert!(!sync.is_dragging());

        // Ticks flow again after release.
        sync.tick(Duration::from_secs(74));
        assert_eq!(sync.position_secs(), 74.0);
    }

    #[test]
    fn drag_update_commits_while_dragging_only() {
        let mut sync = ProgressSync::new();
        sync.media_opened(Some(Duration::from_secs(100)));
        assert!(sync.drag_update(10.0).is_none());

        sync.drag_start();
        assert_eq!(sync.drag_update(10.0), Some(Duration::from_secs(10)));
    }

    #[test]
    fn seek_targets_clamp_to_track_bounds() {
        let mut sync = ProgressSync::new();
        sync.media_opened(Some(Duration::from_secs(60)));
        sync.drag_start();
        assert_eq!(sync.drag_update(500.0), Some(Duration::from_secs(60)));
        assert_eq!(sync.drag_end(-5.0), Some(Duration::ZERO));
    }

    #[test]
    fn unknown_duration_never_produces_a_seek() {
        let mut sync = ProgressSync::new();
        sync.media_opened(None);
        sync.drag_start();
        assert!(sync.drag_update(10.0).is_none());
        assert!(sync.drag_end(10.0).is_none());
        assert_eq!(sync.ratio(), 0.0);
    }

    #[test]
    fn track_end_disarms_the_indicator() {
        let mut sync = ProgressSync::new();
        sync.media_opened(Some(Duration::from_secs(90)));
        sync.tick(Duration::from_secs(30));
        sync.track_ended();
        assert_eq!(sync.duration(), None);
        sync.tick(Duration::from_secs(40));
        assert_eq!(sync.position_secs(), 0.0);
    }
}
