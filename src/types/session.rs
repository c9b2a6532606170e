use std::path::PathBuf;

use crate::ops::highlight::Highlight;
use crate::types::playback_state::{LoopState, PlaybackState};

/// Everything the player tracks between frames: chosen files, loop range and
/// presentation flags. Nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub timestamp_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
    pub duration_ms: Option<u64>,
    pub playback: PlaybackState,
    pub highlight: Option<Highlight>,
    pub muted: bool,
    pub full_screen: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        matches!(
            self.playback.state,
            LoopState::Playing | LoopState::RestartPending
        )
    }
}
