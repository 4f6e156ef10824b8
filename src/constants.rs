/// Space kept free around the plan when fitting it into its container.
pub const FIT_MARGIN: f64 = 24.0;

/// Zoom multiplier applied per zoom-in / zoom-out step.
pub const ZOOM_STEP: f64 = 1.2;

/// Minimum zoom level (1.0 = fit to container).
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom level.
pub const ZOOM_MAX: f64 = 8.0;

/// Diameter of a marker dot in pixels.
pub const MARKER_SIZE: f64 = 12.0;

/// Plan size assumed when a decoded image reports a zero dimension.
pub const FALLBACK_PLAN_SIZE: (u32, u32) = (1600, 900);
