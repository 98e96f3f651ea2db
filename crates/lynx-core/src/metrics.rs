use serde::Serialize;

/// Status-bar height in density-independent units.
pub const STATUS_BAR_REFERENCE_DP: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayMetricsSnapshot {
    pub density_scale: f32,
    pub status_bar_height_px: i32,
}

/// Derive the density-dependent layout metrics for `density_scale`.
///
/// # Panics
///
/// Panics when `density_scale` is not strictly positive. Callers that may see
/// an unknown density (reported as 0) must filter it out first.
pub fn resolve(density_scale: f32) -> DisplayMetricsSnapshot {
    assert!(
        density_scale > 0.0,
        "display density must be positive, got {density_scale}"
    );
    DisplayMetricsSnapshot {
        density_scale,
        status_bar_height_px: (density_scale * STATUS_BAR_REFERENCE_DP).ceil() as i32,
    }
}
