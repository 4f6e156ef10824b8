/// Width of the sidebar panel in pixels.
pub const SIDEBAR_WIDTH: f32 = 220.0;

/// Pointer distance (in pixels) within which a marker counts as hovered.
pub const MARKER_HOVER_RADIUS: f64 = 8.0;

/// Refresh delay used when the backend reports no upcoming ping round.
pub const MIN_REFRESH_SECS: u64 = 5;

/// Minimum height of the plan area in the placement window.
pub const PLACEMENT_MIN_HEIGHT: f32 = 360.0;

/// eframe storage key for the last selected floor.
pub const FLOOR_STORAGE_KEY: &str = "floor_id";
