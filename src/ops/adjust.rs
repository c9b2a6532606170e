/// Volume after applying `delta`, held inside `0..=max`. A negative `max`
/// pins the volume at 0.
pub fn adjusted_volume(current: i32, delta: i32, max: i32) -> i32 {
    current.saturating_add(delta).min(max).max(0)
}

/// Rate after applying `delta`, or `None` when the result would leave
/// `min..=max`; callers ignore the request in that case. The result is
/// rounded to three decimals so repeated steps land on the bounds.
pub fn adjusted_rate(current: f64, delta: f64, min: f64, max: f64) -> Option<f64> {
    let rate = ((current + delta) * 1000.0).round() / 1000.0;
    if rate < min || rate > max {
        None
    } else {
        Some(rate)
    }
}
