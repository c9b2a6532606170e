use std::path::Path;

use crate::error::LoopResult;

/// Called with the current playback time in milliseconds. Runs on a thread
/// owned by the engine and must not issue engine commands.
pub type TimeChangedCallback = Box<dyn Fn(i64) + Send + Sync + 'static>;

/// The playback backend. Volume is 0..=100, rate is a speed multiplier and
/// positions are fractions of the media duration.
pub trait MediaEngine {
    /// Opens `path` and returns its duration in milliseconds. On failure the
    /// previously loaded media stays active.
    fn load(&mut self, path: &Path) -> LoopResult<u64>;
    fn play(&mut self) -> LoopResult<()>;
    fn pause(&mut self) -> LoopResult<()>;
    fn set_time(&mut self, time_ms: i64) -> LoopResult<()>;
    fn time(&self) -> i64;
    fn position(&self) -> f64;
    fn set_position(&mut self, fraction: f64) -> LoopResult<()>;
    fn set_rate(&mut self, rate: f64) -> LoopResult<()>;
    fn rate(&self) -> f64;
    fn set_volume(&mut self, volume: i32);
    fn volume(&self) -> i32;
    fn set_mute(&mut self, mute: bool);
    fn mute(&self) -> bool;
    fn subscribe_time_changed(&mut self, callback: TimeChangedCallback);
}
