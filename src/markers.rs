//! Marker layout: filtering machines, projecting them onto the plan and
//! finding the one under the pointer.

use crate::projection::to_screen;
use crate::transform::ScaledGeometry;
use crate::{Machine, Status};

/// Category and free-text filter applied to the marker layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerFilter {
    /// `None` shows every category.
    pub category: Option<String>,
    /// Case-insensitive search over name, IP, serial and OS.
    pub query: String,
}

impl MarkerFilter {
    pub fn matches(&self, machine: &Machine) -> bool {
        if let Some(category) = &self.category
            && machine.category() != category
        {
            return false;
        }

        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        [&machine.name, &machine.ip, &machine.serial, &machine.os]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// A machine marker positioned on the current plan geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedMarker {
    /// Index into the machine slice the layout was computed from
    pub index: usize,
    pub status: Status,
    /// Marker center in the rotated box frame
    pub center: (f64, f64),
}

/// Lays out every machine that passes `filter` and has a valid position.
///
/// Machines without coordinates, or with coordinates outside the plan, are
/// left out silently.
pub fn layout_markers(
    machines: &[Machine],
    filter: &MarkerFilter,
    geometry: &ScaledGeometry,
) -> Vec<PlacedMarker> {
    let (scaled_width, scaled_height) = geometry.scaled_size();

    machines
        .iter()
        .enumerate()
        .filter(|(_, machine)| filter.matches(machine))
        .filter_map(|(index, machine)| {
            let surface = to_screen(machine.x, machine.y, scaled_width, scaled_height)?;
            Some(PlacedMarker {
                index,
                status: machine.last_status,
                center: geometry.affine.apply(surface.0, surface.1),
            })
        })
        .collect()
}

/// Returns the marker closest to `point` (box frame) within `radius`.
pub fn hit_test(markers: &[PlacedMarker], point: (f64, f64), radius: f64) -> Option<&PlacedMarker> {
    let radius_sq = radius * radius;
    markers
        .iter()
        .map(|marker| {
            let dx = marker.center.0 - point.0;
            let dy = marker.center.1 - point.1;
            (marker, dx * dx + dy * dy)
        })
        .filter(|(_, dist_sq)| *dist_sq <= radius_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(marker, _)| marker)
}

/// Up/down totals over a machine list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub up: usize,
    pub down: usize,
}

impl StatusCounts {
    pub fn from_machines(machines: &[Machine]) -> Self {
        machines
            .iter()
            .fold(Self::default(), |mut counts, machine| {
                match machine.last_status {
                    Status::Up => counts.up += 1,
                    Status::Down => counts.down += 1,
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::Rotation;
    use crate::transform::compute_transform;

    fn machine(id: &str, x: Option<f64>, y: Option<f64>, status: Status) -> Machine {
        Machine {
            id: id.to_owned(),
            name: format!("Host {id}"),
            ip: format!("10.0.0.{}", id.len()),
            serial: String::new(),
            os: "Linux".to_owned(),
            category: None,
            floor_id: Some("main".to_owned()),
            x,
            y,
            last_status: status,
            last_rtt_ms: 0,
            up_pings: 0,
            total_pings: 0,
            last_seen: None,
        }
    }

    #[test]
    fn out_of_range_and_missing_positions_are_skipped() {
        let machines = vec![
            machine("a", Some(0.5), Some(0.5), Status::Up),
            machine("b", Some(1.2), Some(0.5), Status::Up),
            machine("c", None, Some(0.5), Status::Down),
            machine("d", Some(0.0), Some(1.0), Status::Down),
        ];
        let geometry = compute_transform(800, 450, 1.0, 1.0, Rotation::Deg0);
        let markers = layout_markers(&machines, &MarkerFilter::default(), &geometry);

        let indices: Vec<_> = markers.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 3]);
        assert_eq!(markers[0].center, (400.0, 225.0));
        assert_eq!(markers[1].status, Status::Down);
    }

    #[test]
    fn markers_follow_rotation() {
        let machines = vec![machine("a", Some(0.0), Some(0.0), Status::Up)];
        let geometry = compute_transform(800, 450, 1.0, 1.0, Rotation::Deg90);
        let markers = layout_markers(&machines, &MarkerFilter::default(), &geometry);
        // The image's top-left corner ends up at the box's top-right.
        assert_eq!(markers[0].center, (450.0, 0.0));
    }

    #[test]
    fn filter_by_category_and_query() {
        let mut apple = machine("mac", Some(0.1), Some(0.1), Status::Up);
        apple.category = Some("apple".to_owned());
        apple.serial = "C02XYZ".to_owned();
        let plain = machine("pc", Some(0.2), Some(0.2), Status::Up);

        let by_category = MarkerFilter {
            category: Some("apple".to_owned()),
            query: String::new(),
        };
        assert!(by_category.matches(&apple));
        assert!(!by_category.matches(&plain));

        let global = MarkerFilter {
            category: Some("global".to_owned()),
            query: String::new(),
        };
        assert!(global.matches(&plain));

        let by_query = MarkerFilter {
            category: None,
            query: "  c02x ".to_owned(),
        };
        assert!(by_query.matches(&apple));
        assert!(!by_query.matches(&plain));
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let machines = vec![
            machine("a", Some(0.10), Some(0.10), Status::Up),
            machine("b", Some(0.11), Some(0.10), Status::Down),
        ];
        let geometry = compute_transform(1000, 1000, 1.0, 1.0, Rotation::Deg0);
        let markers = layout_markers(&machines, &MarkerFilter::default(), &geometry);

        let hit = hit_test(&markers, (108.0, 100.0), 6.0).unwrap();
        assert_eq!(hit.index, 1);
        assert!(hit_test(&markers, (300.0, 300.0), 6.0).is_none());
    }

    #[test]
    fn counts_up_and_down() {
        let machines = vec![
            machine("a", None, None, Status::Up),
            machine("b", None, None, Status::Down),
            machine("c", None, None, Status::Down),
        ];
        assert_eq!(
            StatusCounts::from_machines(&machines),
            StatusCounts { up: 1, down: 2 }
        );
    }
}
