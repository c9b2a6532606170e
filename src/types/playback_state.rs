use crate::types::timestamp::UNBOUNDED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing requested since the media was loaded.
    Idle,
    /// Range chosen, engine not yet told to seek.
    Armed,
    Playing,
    /// Boundary crossed; the next driver tick seeks back to the start.
    RestartPending,
    Paused,
}

/// The range being looped and where the controller is in its cycle. The
/// pending-restart flag itself lives in the boundary watch shared with the
/// engine thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub loop_start: i64,
    pub loop_end: i64,
    pub state: LoopState,
    /// Set once playback has been started for the loaded media.
    pub started: bool,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            loop_start: 0,
            loop_end: UNBOUNDED,
            state: LoopState::Idle,
            started: false,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.loop_end != UNBOUNDED
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
