use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_pbutils as gst_pbutils;

use crate::error::{LoopError, LoopResult};
use crate::player::engine::{MediaEngine, TimeChangedCallback};

const WATCH_INTERVAL: Duration = Duration::from_millis(250);
const DISCOVER_TIMEOUT_SECS: u64 = 5;

/// Milliseconds as a pipeline timestamp. Values past the `ClockTime` range
/// are an error.
fn clock_time(time_ms: u64) -> LoopResult<gst::ClockTime> {
    time_ms
        .checked_mul(1_000_000)
        .map(gst::ClockTime::from_nseconds)
        .ok_or_else(|| LoopError::engine(format!("time {} ms is out of range", time_ms)))
}

/// Seek target for a requested time, held inside the loaded media when its
/// duration is known.
fn seek_target(time_ms: i64, duration_ms: u64) -> u64 {
    let time_ms = time_ms.max(0) as u64;
    if duration_ms == 0 {
        time_ms
    } else {
        time_ms.min(duration_ms)
    }
}

/// `playbin`-backed engine. Video goes to the sink playbin picks; time
/// notifications come from a watcher thread polling the pipeline position.
pub struct GstEngine {
    playbin: gst::Element,
    callbacks: Arc<Mutex<Vec<TimeChangedCallback>>>,
    duration_ms: u64,
    rate: f64,
    volume: i32,
    stop: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl GstEngine {
    pub fn new() -> LoopResult<Self> {
        gst::init().map_err(|err| LoopError::engine(err.to_string()))?;
        let playbin = gst::ElementFactory::make("playbin")
            .build()
            .map_err(|err| LoopError::engine(err.to_string()))?;

        let callbacks: Arc<Mutex<Vec<TimeChangedCallback>>> = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let watcher = {
            let playbin = playbin.clone();
            let callbacks = Arc::clone(&callbacks);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("gst-time-watch".to_string())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        thread::sleep(WATCH_INTERVAL);
                        if playbin.current_state() != gst::State::Playing {
                            continue;
                        }
                        let Some(position) = playbin.query_position::<gst::ClockTime>() else {
                            continue;
                        };
                        let time_ms = position.mseconds() as i64;
                        let callbacks = callbacks.lock().unwrap_or_else(PoisonError::into_inner);
                        for callback in callbacks.iter() {
                            callback(time_ms);
                        }
                    }
                })?
        };

        Ok(Self {
            playbin,
            callbacks,
            duration_ms: 0,
            rate: 1.0,
            volume: 100,
            stop,
            watcher: Some(watcher),
        })
    }

    fn discover_duration(path: &Path, uri: &str) -> LoopResult<u64> {
        let media_error = |reason: String| LoopError::MediaError {
            path: path.to_path_buf(),
            reason,
        };
        let discoverer =
            gst_pbutils::Discoverer::new(gst::ClockTime::from_seconds(DISCOVER_TIMEOUT_SECS))
                .map_err(|err| media_error(err.to_string()))?;
        let info = discoverer
            .discover_uri(uri)
            .map_err(|err| media_error(err.to_string()))?;
        match info.duration().map(|duration| duration.mseconds()) {
            Some(duration_ms) if duration_ms > 0 => Ok(duration_ms),
            _ => Err(media_error("no duration".to_string())),
        }
    }

    fn seek_to(&self, time_ms: u64) -> LoopResult<()> {
        let position = clock_time(time_ms)?;
        self.playbin
            .seek(
                self.rate,
                gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
                gst::SeekType::Set,
                Some(position),
                gst::SeekType::None,
                gst::ClockTime::NONE,
            )
            .map_err(|err| LoopError::engine(err.to_string()))
    }

    fn set_state(&self, state: gst::State) -> LoopResult<()> {
        self.playbin
            .set_state(state)
            .map(|_| ())
            .map_err(|err| LoopError::engine(format!("{:?}: {}", state, err)))
    }
}

impl MediaEngine for GstEngine {
    fn load(&mut self, path: &Path) -> LoopResult<u64> {
        let abs_path = std::fs::canonicalize(path)?;
        let uri = gst::glib::filename_to_uri(&abs_path, None).map_err(|err| {
            LoopError::MediaError {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        })?;
        tracing::debug!(%uri, "probing media");
        let duration_ms = Self::discover_duration(path, &uri)?;

        self.set_state(gst::State::Null)?;
        self.playbin.set_property("uri", uri.as_str());
        self.set_state(gst::State::Paused)?;
        self.duration_ms = duration_ms;
        Ok(duration_ms)
    }

    fn play(&mut self) -> LoopResult<()> {
        self.set_state(gst::State::Playing)
    }

    fn pause(&mut self) -> LoopResult<()> {
        self.set_state(gst::State::Paused)
    }

    fn set_time(&mut self, time_ms: i64) -> LoopResult<()> {
        self.seek_to(seek_target(time_ms, self.duration_ms))
    }

    fn time(&self) -> i64 {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(|position| position.mseconds() as i64)
            .unwrap_or(0)
    }

    fn position(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.time() as f64 / self.duration_ms as f64
    }

    fn set_position(&mut self, fraction: f64) -> LoopResult<()> {
        let time_ms = fraction.clamp(0.0, 1.0) * self.duration_ms as f64;
        self.seek_to(seek_target(time_ms as i64, self.duration_ms))
    }

    fn set_rate(&mut self, rate: f64) -> LoopResult<()> {
        let previous = self.rate;
        self.rate = rate;
        let current = seek_target(self.time(), self.duration_ms);
        self.seek_to(current).inspect_err(|_| self.rate = previous)
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100);
        self.playbin
            .set_property("volume", f64::from(self.volume) / 100.0);
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn set_mute(&mut self, mute: bool) {
        self.playbin.set_property("mute", mute);
    }

    fn mute(&self) -> bool {
        self.playbin.property::<bool>("mute")
    }

    fn subscribe_time_changed(&mut self, callback: TimeChangedCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }
}

impl Drop for GstEngine {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
        let _ = self.playbin.set_state(gst::State::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_matches_milliseconds() {
        assert_eq!(
            clock_time(1500).unwrap(),
            gst::ClockTime::from_mseconds(1500)
        );
        assert_eq!(clock_time(0).unwrap(), gst::ClockTime::ZERO);
    }

    #[test]
    fn huge_times_are_an_error() {
        assert!(matches!(
            clock_time(20_000_000_000_000),
            Err(LoopError::Engine { .. })
        ));
        assert!(clock_time(u64::MAX).is_err());
    }

    #[test]
    fn seek_target_stays_inside_the_media() {
        assert_eq!(seek_target(20_000_000_000_000, 90_000), 90_000);
        assert_eq!(seek_target(-20, 90_000), 0);
        assert_eq!(seek_target(4000, 90_000), 4000);
        assert_eq!(seek_target(4000, 0), 4000);
    }
}
