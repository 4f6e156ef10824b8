//! Floor-plan viewport engine: fitting, rotating and zooming a plan image,
//! projecting device markers onto it and turning clicks back into plan
//! coordinates.

pub mod api;
pub mod constants;
pub mod controller;
pub mod error;
pub mod fit;
pub mod markers;
pub mod orientation;
pub mod projection;
pub mod rotation;
pub mod transform;

use serde::{Deserialize, Serialize};

pub use controller::{LoadOutcome, LoadTicket, ViewController, ViewPhase};
pub use error::{ApiError, OrientationError};
pub use fit::compute_fit;
pub use markers::{MarkerFilter, PlacedMarker, StatusCounts};
pub use orientation::{MemoryOrientationStore, OrientationStore, RonOrientationStore};
pub use projection::{NormalizedPoint, from_screen_click, to_screen};
pub use rotation::{Affine, RotateDirection, Rotation};
pub use transform::{ScaledGeometry, compute_transform};

/// A floor as listed by the public floors endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub name: String,
    /// Whether this is the backend's default floor
    #[serde(default)]
    pub default: bool,
    /// Whether markers on this floor can be filtered by category
    #[serde(default)]
    pub categories_enabled: bool,
    /// Whether a plan image has been uploaded for this floor
    #[serde(default)]
    pub has_map: bool,
}

/// Picks the floor to show first: the remembered one, then the first floor
/// with a plan, then the backend default, then whatever comes first.
pub fn pick_initial_floor<'a>(floors: &'a [Floor], remembered: Option<&str>) -> Option<&'a Floor> {
    remembered
        .and_then(|id| floors.iter().find(|f| f.id == id))
        .or_else(|| floors.iter().find(|f| f.has_map))
        .or_else(|| floors.iter().find(|f| f.default))
        .or_else(|| floors.first())
}

/// Reachability of a machine as of the last ping round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    #[default]
    Down,
}

/// A monitored machine. Only `x`, `y` and `last_status` drive the map; the
/// rest is shown when hovering a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub os: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<String>,
    /// Normalized horizontal position on the unrotated plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Normalized vertical position on the unrotated plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_status")]
    pub last_status: Status,
    #[serde(default)]
    pub last_rtt_ms: u64,
    #[serde(default)]
    pub up_pings: u64,
    #[serde(default)]
    pub total_pings: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}

impl Machine {
    /// Category key, with uncategorized machines counted as "global".
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn position(&self) -> Option<NormalizedPoint> {
        NormalizedPoint::checked(self.x, self.y)
    }

    /// Share of successful pings, formatted for display.
    pub fn uptime_label(&self) -> String {
        if self.total_pings == 0 {
            return "—".to_owned();
        }
        format!(
            "{:.1}%",
            100.0 * self.up_pings as f64 / self.total_pings as f64
        )
    }
}

pub const DEFAULT_CATEGORY: &str = "global";

/// Human readable name for a category key.
pub fn category_label(key: &str) -> &'static str {
    match key {
        "global" => "Global clients",
        "apple" => "Apple devices",
        "dzb" => "DZB",
        "brightsign" => "BrightSign",
        _ => "—",
    }
}

/// Category keys known to the backend, in display order.
pub const CATEGORIES: [&str; 4] = ["global", "apple", "dzb", "brightsign"];

/// Anything other than "up" (including null) counts as down.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(match value.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("up") => Status::Up,
        _ => Status::Down,
    })
}

/// Response of the public status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingSchedule {
    /// Seconds until the backend runs its next ping round
    #[serde(default)]
    pub seconds_left: u64,
}

/// A position chosen in the placement view, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    #[serde(skip)]
    pub machine_id: String,
    pub x: f64,
    pub y: f64,
    pub floor_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(id: &str, default: bool, has_map: bool) -> Floor {
        Floor {
            id: id.to_owned(),
            name: id.to_uppercase(),
            default,
            categories_enabled: false,
            has_map,
        }
    }

    #[test]
    fn initial_floor_prefers_remembered_then_mapped() {
        let floors = vec![floor("a", true, false), floor("b", false, true), floor("c", false, true)];
        assert_eq!(pick_initial_floor(&floors, Some("c")).unwrap().id, "c");
        assert_eq!(pick_initial_floor(&floors, Some("gone")).unwrap().id, "b");
        assert_eq!(pick_initial_floor(&floors, None).unwrap().id, "b");
    }

    #[test]
    fn initial_floor_falls_back_to_default_then_first() {
        let floors = vec![floor("a", false, false), floor("b", true, false)];
        assert_eq!(pick_initial_floor(&floors, None).unwrap().id, "b");
        let floors = vec![floor("a", false, false)];
        assert_eq!(pick_initial_floor(&floors, None).unwrap().id, "a");
        assert!(pick_initial_floor(&[], None).is_none());
    }

    #[test]
    fn machine_parses_backend_record() {
        let json = r#"{
            "id": "pc-1", "name": "Front desk", "ip": "10.0.0.5", "serial": "", "os": "macOS",
            "floor_id": "main", "category": "apple", "x": 0.25, "y": 0.75,
            "last_status": "up", "last_rtt_ms": 4, "up_pings": 3, "total_pings": 4,
            "last_seen": "2024-05-01T10:00:00", "check": "icmp", "tcp_port": 0
        }"#;
        let m: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(m.last_status, Status::Up);
        assert_eq!(m.position(), Some(NormalizedPoint { x: 0.25, y: 0.75 }));
        assert_eq!(m.uptime_label(), "75.0%");
        assert_eq!(category_label(m.category()), "Apple devices");
    }

    #[test]
    fn machine_defaults_for_sparse_record() {
        let m: Machine = serde_json::from_str(r#"{"id": "x", "last_status": null}"#).unwrap();
        assert_eq!(m.last_status, Status::Down);
        assert_eq!(m.category(), "global");
        assert_eq!(m.position(), None);
        assert_eq!(m.uptime_label(), "—");
    }

    #[test]
    fn placement_body_omits_machine_id() {
        let placement = Placement {
            machine_id: "pc-1".to_owned(),
            x: 0.5,
            y: 0.25,
            floor_id: "main".to_owned(),
        };
        let body = serde_json::to_value(&placement).unwrap();
        assert_eq!(body, serde_json::json!({"x": 0.5, "y": 0.25, "floor_id": "main"}));
    }
}
