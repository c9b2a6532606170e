use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{LoopError, LoopResult};
use crate::player::engine::{MediaEngine, TimeChangedCallback};

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct Clock {
    media: Option<PathBuf>,
    duration_ms: u64,
    playing: bool,
    playhead_ms: f64,
    rate: f64,
    last_update: Instant,
}

impl Clock {
    /// Advance the playhead by the wall time since the last update.
    fn update(&mut self) {
        let now = Instant::now();
        if self.playing {
            let elapsed_ms = now.duration_since(self.last_update).as_secs_f64() * 1000.0;
            self.playhead_ms += elapsed_ms * self.rate;
        }
        self.last_update = now;

        let end = self.duration_ms as f64;
        if self.playhead_ms >= end {
            self.playhead_ms = end;
            self.playing = false;
        }
    }

    fn seek(&mut self, time_ms: f64) {
        self.update();
        self.playhead_ms = time_ms.clamp(0.0, self.duration_ms as f64);
    }
}

/// Engine without decoding: a wall-clock playhead that moves at the current
/// rate. Every loaded file is assumed to last `media_duration_ms`.
pub struct ClockEngine {
    clock: Arc<Mutex<Clock>>,
    callbacks: Arc<Mutex<Vec<TimeChangedCallback>>>,
    media_duration_ms: u64,
    volume: i32,
    muted: bool,
    stop: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl ClockEngine {
    pub fn new(media_duration_ms: u64) -> Self {
        let clock = Arc::new(Mutex::new(Clock {
            media: None,
            duration_ms: 0,
            playing: false,
            playhead_ms: 0.0,
            rate: 1.0,
            last_update: Instant::now(),
        }));
        let callbacks: Arc<Mutex<Vec<TimeChangedCallback>>> = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let ticker = {
            let clock = Arc::clone(&clock);
            let callbacks = Arc::clone(&callbacks);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("clock-engine".to_string())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        thread::sleep(TICK);
                        let time_ms = {
                            let mut clock = lock(&clock);
                            if !clock.playing {
                                continue;
                            }
                            clock.update();
                            clock.playhead_ms as i64
                        };
                        for callback in lock(&callbacks).iter() {
                            callback(time_ms);
                        }
                    }
                })
        };
        let ticker = match ticker {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "clock engine runs without time notifications");
                None
            }
        };

        Self {
            clock,
            callbacks,
            media_duration_ms,
            volume: 100,
            muted: false,
            stop,
            ticker,
        }
    }

    fn require_media(&self) -> LoopResult<MutexGuard<'_, Clock>> {
        let clock = lock(&self.clock);
        if clock.media.is_none() {
            return Err(LoopError::engine("no media loaded"));
        }
        Ok(clock)
    }
}

impl MediaEngine for ClockEngine {
    fn load(&mut self, path: &Path) -> LoopResult<u64> {
        if self.media_duration_ms == 0 {
            return Err(LoopError::MediaError {
                path: path.to_path_buf(),
                reason: "duration is unknown".to_string(),
            });
        }
        let mut clock = lock(&self.clock);
        clock.media = Some(path.to_path_buf());
        clock.duration_ms = self.media_duration_ms;
        clock.playing = false;
        clock.playhead_ms = 0.0;
        clock.last_update = Instant::now();
        Ok(self.media_duration_ms)
    }

    fn play(&mut self) -> LoopResult<()> {
        let mut clock = self.require_media()?;
        clock.update();
        clock.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> LoopResult<()> {
        let mut clock = self.require_media()?;
        clock.update();
        clock.playing = false;
        Ok(())
    }

    fn set_time(&mut self, time_ms: i64) -> LoopResult<()> {
        self.require_media()?.seek(time_ms as f64);
        Ok(())
    }

    fn time(&self) -> i64 {
        let mut clock = lock(&self.clock);
        clock.update();
        clock.playhead_ms as i64
    }

    fn position(&self) -> f64 {
        let mut clock = lock(&self.clock);
        clock.update();
        if clock.duration_ms == 0 {
            return 0.0;
        }
        clock.playhead_ms / clock.duration_ms as f64
    }

    fn set_position(&mut self, fraction: f64) -> LoopResult<()> {
        let mut clock = self.require_media()?;
        let time_ms = fraction.clamp(0.0, 1.0) * clock.duration_ms as f64;
        clock.seek(time_ms);
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> LoopResult<()> {
        if rate <= 0.0 {
            return Err(LoopError::engine(format!("unsupported rate {}", rate)));
        }
        let mut clock = lock(&self.clock);
        clock.update();
        clock.rate = rate;
        Ok(())
    }

    fn rate(&self) -> f64 {
        lock(&self.clock).rate
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100);
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
    }

    fn mute(&self) -> bool {
        self.muted
    }

    fn subscribe_time_changed(&mut self, callback: TimeChangedCallback) {
        lock(&self.callbacks).push(callback);
    }
}

impl Drop for ClockEngine {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;

    #[test]
    fn commands_need_loaded_media() {
        let mut engine = ClockEngine::new(10_000);
        assert!(engine.play().is_err());
        assert!(engine.set_time(500).is_err());
    }

    #[test]
    fn load_reports_the_configured_duration() {
        let mut engine = ClockEngine::new(10_000);
        assert_eq!(engine.load(Path::new("clip.mp4")).unwrap(), 10_000);
        engine.play().unwrap();

        let mut unknown = ClockEngine::new(0);
        assert!(matches!(
            unknown.load(Path::new("clip.mp4")),
            Err(LoopError::MediaError { .. })
        ));
    }

    #[test]
    fn seeking_is_clamped_to_the_media() {
        let mut engine = ClockEngine::new(10_000);
        engine.load(Path::new("clip.mp4")).unwrap();
        engine.set_time(4000).unwrap();
        assert_eq!(engine.time(), 4000);
        assert_eq!(engine.position(), 0.4);

        engine.set_time(50_000).unwrap();
        assert_eq!(engine.time(), 10_000);

        engine.set_position(0.25).unwrap();
        assert_eq!(engine.time(), 2500);
    }

    #[test]
    fn paused_clock_stands_still() {
        let mut engine = ClockEngine::new(10_000);
        engine.load(Path::new("clip.mp4")).unwrap();
        engine.set_time(1000).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(engine.time(), 1000);
    }

    #[test]
    fn playing_clock_advances_and_notifies() {
        let mut engine = ClockEngine::new(60_000);
        let seen = Arc::new(AtomicI64::new(-1));
        let sink = Arc::clone(&seen);
        engine.subscribe_time_changed(Box::new(move |time_ms| {
            sink.store(time_ms, Ordering::SeqCst);
        }));
        engine.load(Path::new("clip.mp4")).unwrap();
        engine.play().unwrap();

        thread::sleep(TICK * 3);
        assert!(engine.time() > 0);
        assert!(seen.load(Ordering::SeqCst) >= 0);
    }
}
