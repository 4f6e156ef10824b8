//! Color constants for map markers and UI elements.

use eframe::egui::Color32;

// Reachable machines
pub const MARKER_UP_FILL: Color32 = Color32::from_rgb(50, 205, 50);
pub const MARKER_UP_STROKE: Color32 = Color32::from_rgb(0, 100, 0);

// Unreachable machines
pub const MARKER_DOWN_FILL: Color32 = Color32::from_rgb(220, 53, 69);
pub const MARKER_DOWN_STROKE: Color32 = Color32::from_rgb(110, 20, 30);

// Position picked in the placement window, not saved yet
pub const MARKER_PENDING_FILL: Color32 = Color32::from_rgb(65, 105, 225);
pub const MARKER_PENDING_STROKE: Color32 = Color32::WHITE;

pub const MARKER_HOVER_STROKE: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 220);

// Plan backdrop
pub const PLAN_BACKGROUND: Color32 = Color32::from_rgb(40, 40, 44);
