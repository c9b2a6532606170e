/// Highlighted span of the seek bar, in slider units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub start: f64,
    pub end: f64,
}

/// Projects a millisecond range onto a slider: `time / duration * (max - min)`.
/// Returns `None` when a bound is missing (negative), the range is empty or
/// inverted, or the duration is unknown.
pub fn project_range(
    start_ms: i64,
    end_ms: i64,
    duration_ms: u64,
    slider_min: f64,
    slider_max: f64,
) -> Option<Highlight> {
    if start_ms < 0 || end_ms < 0 || start_ms >= end_ms || duration_ms == 0 {
        return None;
    }
    let span = slider_max - slider_min;
    let project = |ms: i64| (ms as f64 / duration_ms as f64) * span;
    Some(Highlight {
        start: project(start_ms),
        end: project(end_ms),
    })
}
