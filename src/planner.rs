/// Derive the step actually sent to the backend.
///
/// Keeps `selected_step` unless it would yield more than `max_points` samples
/// over `interval`, in which case the smallest step that fits is returned.
///
/// # Arguments
/// * `selected_step` - Preferred resolution in seconds, already clamped to at least 1
/// * `interval` - Window length in seconds (`end - start`)
/// * `max_points` - Upper bound on samples per series
pub fn effective_step(selected_step: u64, interval: u64, max_points: u64) -> u64 {
    let max_points = max_points.max(1);
    if selected_step.saturating_mul(max_points) < interval {
        interval.div_ceil(max_points)
    } else {
        selected_step
    }
}
