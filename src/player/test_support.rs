use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{LoopError, LoopResult};
use crate::player::engine::{MediaEngine, TimeChangedCallback};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(PathBuf),
    Play,
    Pause,
    SetTime(i64),
    SetPosition(f64),
    SetRate(f64),
    SetVolume(i32),
    SetMute(bool),
}

#[derive(Default)]
struct Shared {
    calls: Vec<EngineCall>,
    callbacks: Vec<TimeChangedCallback>,
    load_result: Option<u64>,
    fail_play: bool,
}

/// Engine double that records every command. Tests keep the
/// [`FakeHandle`] to inspect calls and to deliver time notifications.
pub struct FakeEngine {
    shared: Arc<Mutex<Shared>>,
    time_ms: i64,
    rate: f64,
    volume: i32,
    muted: bool,
}

#[derive(Clone)]
pub struct FakeHandle {
    shared: Arc<Mutex<Shared>>,
}

impl FakeEngine {
    /// `duration_ms` is what every `load` reports; `None` makes loads fail.
    pub fn new(duration_ms: Option<u64>) -> (Self, FakeHandle) {
        let shared = Arc::new(Mutex::new(Shared {
            load_result: duration_ms,
            ..Shared::default()
        }));
        let engine = Self {
            shared: Arc::clone(&shared),
            time_ms: 0,
            rate: 1.0,
            volume: 100,
            muted: false,
        };
        (engine, FakeHandle { shared })
    }

    fn record(&self, call: EngineCall) {
        self.shared.lock().unwrap().calls.push(call);
    }
}

impl FakeHandle {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().unwrap().calls.clear();
    }

    /// Delivers a time-changed notification from a separate thread, the way
    /// a real engine would.
    pub fn fire_time_changed(&self, time_ms: i64) {
        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || {
            for callback in shared.lock().unwrap().callbacks.iter() {
                callback(time_ms);
            }
        })
        .join()
        .unwrap();
    }

    pub fn set_load_result(&self, duration_ms: Option<u64>) {
        self.shared.lock().unwrap().load_result = duration_ms;
    }

    pub fn fail_play(&self, fail: bool) {
        self.shared.lock().unwrap().fail_play = fail;
    }
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, path: &Path) -> LoopResult<u64> {
        self.record(EngineCall::Load(path.to_path_buf()));
        self.shared
            .lock()
            .unwrap()
            .load_result
            .ok_or_else(|| LoopError::engine("cannot decode"))
    }

    fn play(&mut self) -> LoopResult<()> {
        if self.shared.lock().unwrap().fail_play {
            return Err(LoopError::engine("play failed"));
        }
        self.record(EngineCall::Play);
        Ok(())
    }

    fn pause(&mut self) -> LoopResult<()> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    fn set_time(&mut self, time_ms: i64) -> LoopResult<()> {
        self.time_ms = time_ms;
        self.record(EngineCall::SetTime(time_ms));
        Ok(())
    }

    fn time(&self) -> i64 {
        self.time_ms
    }

    fn position(&self) -> f64 {
        0.5
    }

    fn set_position(&mut self, fraction: f64) -> LoopResult<()> {
        self.record(EngineCall::SetPosition(fraction));
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> LoopResult<()> {
        self.rate = rate;
        self.record(EngineCall::SetRate(rate));
        Ok(())
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume = volume;
        self.record(EngineCall::SetVolume(volume));
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
        self.record(EngineCall::SetMute(mute));
    }

    fn mute(&self) -> bool {
        self.muted
    }

    fn subscribe_time_changed(&mut self, callback: TimeChangedCallback) {
        self.shared.lock().unwrap().callbacks.push(callback);
    }
}
