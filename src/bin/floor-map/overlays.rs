//! Marker drawing and hover inspection.

use crate::colors;
use crate::coordinates::box_to_screen;
use eframe::egui;
use floor_map::constants::MARKER_SIZE;
use floor_map::{Machine, PlacedMarker, ScaledGeometry, Status, category_label, to_screen};

/// Draws the machine markers laid out for the current geometry.
pub fn draw_markers(
    painter: &egui::Painter,
    box_rect: egui::Rect,
    markers: &[PlacedMarker],
    hovered: Option<usize>,
) {
    let radius = (MARKER_SIZE / 2.0) as f32;

    for marker in markers {
        let (fill, stroke) = match marker.status {
            Status::Up => (colors::MARKER_UP_FILL, colors::MARKER_UP_STROKE),
            Status::Down => (colors::MARKER_DOWN_FILL, colors::MARKER_DOWN_STROKE),
        };
        let center = box_to_screen(box_rect, marker.center);

        if hovered == Some(marker.index) {
            painter.circle(
                center,
                radius + 2.0,
                fill,
                egui::Stroke::new(2.0, colors::MARKER_HOVER_STROKE),
            );
        } else {
            painter.circle(center, radius, fill, egui::Stroke::new(1.5, stroke));
        }
    }
}

/// Draws the not-yet-saved position chosen in the placement window.
pub fn draw_pending(
    painter: &egui::Painter,
    box_rect: egui::Rect,
    geometry: &ScaledGeometry,
    x: f64,
    y: f64,
) {
    let (scaled_width, scaled_height) = geometry.scaled_size();
    let Some((sx, sy)) = to_screen(Some(x), Some(y), scaled_width, scaled_height) else {
        return;
    };
    let center = box_to_screen(box_rect, geometry.affine.apply(sx, sy));
    painter.circle(
        center,
        (MARKER_SIZE / 2.0) as f32,
        colors::MARKER_PENDING_FILL,
        egui::Stroke::new(2.0, colors::MARKER_PENDING_STROKE),
    );
}

/// Shows machine details next to the pointer.
pub fn show_machine_tooltip(ctx: &egui::Context, pointer: egui::Pos2, machine: &Machine) {
    egui::Area::new(egui::Id::new("marker_tooltip"))
        .order(egui::Order::Tooltip)
        .fixed_pos(pointer + egui::vec2(12.0, 12.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    let fill = match machine.last_status {
                        Status::Up => colors::MARKER_UP_FILL,
                        Status::Down => colors::MARKER_DOWN_FILL,
                    };
                    ui.painter().circle_filled(rect.center(), 5.0, fill);
                    let name = if machine.name.is_empty() {
                        "(unnamed)"
                    } else {
                        machine.name.as_str()
                    };
                    ui.strong(name);
                });

                egui::Grid::new("marker_tooltip_rows")
                    .num_columns(2)
                    .spacing([12.0, 2.0])
                    .show(ui, |ui| {
                        let last_seen = machine
                            .last_seen
                            .as_deref()
                            .filter(|s| !s.is_empty())
                            .unwrap_or("—");
                        let rows = [
                            ("Category", category_label(machine.category()).to_owned()),
                            ("OS", machine.os.clone()),
                            ("IP", machine.ip.clone()),
                            ("Serial", machine.serial.clone()),
                            ("RTT", format!("{} ms", machine.last_rtt_ms)),
                            ("Uptime", machine.uptime_label()),
                            ("Last seen", last_seen.to_owned()),
                        ];
                        for (key, value) in rows {
                            ui.weak(key);
                            ui.label(value);
                            ui.end_row();
                        }
                    });
            });
        });
}
