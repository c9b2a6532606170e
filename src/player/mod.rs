pub mod boundary;
pub mod clock_engine;
pub mod engine;
#[cfg(feature = "gst")]
pub mod gst_engine;
pub mod loop_controller;
#[cfg(test)]
pub mod test_support;

use crate::config::PlayerSettings;
use crate::error::LoopResult;
use crate::player::clock_engine::ClockEngine;
use crate::player::engine::MediaEngine;

/// Picks the GStreamer engine when it is compiled in and initializes, the
/// clock engine otherwise.
#[cfg(feature = "gst")]
pub fn default_engine(settings: &PlayerSettings) -> LoopResult<Box<dyn MediaEngine>> {
    match gst_engine::GstEngine::new() {
        Ok(engine) => Ok(Box::new(engine)),
        Err(err) => {
            tracing::warn!(error = %err, "gstreamer unavailable, falling back to the clock engine");
            Ok(Box::new(ClockEngine::new(settings.clock_duration_ms)))
        }
    }
}

#[cfg(not(feature = "gst"))]
pub fn default_engine(settings: &PlayerSettings) -> LoopResult<Box<dyn MediaEngine>> {
    tracing::warn!("built without the gst feature, video frames will not be decoded");
    Ok(Box::new(ClockEngine::new(settings.clock_duration_ms)))
}
