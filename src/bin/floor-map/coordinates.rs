//! Conversions between the plan's box frame and egui screen positions.

use eframe::egui;
use floor_map::ScaledGeometry;

/// Screen rectangle of the plan box, centered in `viewport` and shifted by `pan`.
pub fn box_rect(viewport: egui::Rect, geometry: &ScaledGeometry, pan: egui::Vec2) -> egui::Rect {
    let (width, height) = geometry.box_size();
    egui::Rect::from_center_size(
        viewport.center() + pan,
        egui::vec2(width as f32, height as f32),
    )
}

/// Maps a box-frame point to a screen position.
pub fn box_to_screen(box_rect: egui::Rect, point: (f64, f64)) -> egui::Pos2 {
    box_rect.min + egui::vec2(point.0 as f32, point.1 as f32)
}

/// Maps a screen position to the box frame.
pub fn screen_to_box(box_rect: egui::Rect, pos: egui::Pos2) -> (f64, f64) {
    let offset = pos - box_rect.min;
    (f64::from(offset.x), f64::from(offset.y))
}

/// Builds a textured quad that draws the plan rotated into its box.
///
/// Each image corner goes through the same affine the projectors use, so the
/// drawn rotation and click inversion always agree.
pub fn plan_mesh(
    texture_id: egui::TextureId,
    box_rect: egui::Rect,
    geometry: &ScaledGeometry,
) -> egui::Mesh {
    let (width, height) = geometry.scaled_size();
    let corners = [
        ((0.0, 0.0), egui::pos2(0.0, 0.0)),
        ((width, 0.0), egui::pos2(1.0, 0.0)),
        ((width, height), egui::pos2(1.0, 1.0)),
        ((0.0, height), egui::pos2(0.0, 1.0)),
    ];

    let mut mesh = egui::Mesh::with_texture(texture_id);
    for ((x, y), uv) in corners {
        let point = geometry.affine.apply(x, y);
        mesh.vertices.push(egui::epaint::Vertex {
            pos: box_to_screen(box_rect, point),
            uv,
            color: egui::Color32::WHITE,
        });
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use floor_map::{Rotation, compute_transform};

    #[test]
    fn box_is_centered_in_viewport() {
        let viewport = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(800.0, 600.0));
        let geometry = compute_transform(400, 200, 1.0, 1.0, Rotation::Deg90);
        let rect = box_rect(viewport, &geometry, egui::Vec2::ZERO);
        assert_eq!(rect.size(), egui::vec2(200.0, 400.0));
        assert_eq!(rect.center(), viewport.center());

        let panned = box_rect(viewport, &geometry, egui::vec2(10.0, -5.0));
        assert_eq!(panned.min, rect.min + egui::vec2(10.0, -5.0));
    }

    #[test]
    fn screen_and_box_frames_round_trip() {
        let rect = egui::Rect::from_min_size(egui::pos2(30.0, 40.0), egui::vec2(200.0, 100.0));
        let pos = box_to_screen(rect, (12.0, 34.0));
        assert_eq!(pos, egui::pos2(42.0, 74.0));
        assert_eq!(screen_to_box(rect, pos), (12.0, 34.0));
    }

    #[test]
    fn rotated_mesh_puts_image_origin_top_right() {
        let geometry = compute_transform(400, 200, 1.0, 1.0, Rotation::Deg90);
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(200.0, 400.0));
        let mesh = plan_mesh(egui::TextureId::default(), rect, &geometry);

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[0].uv, egui::pos2(0.0, 0.0));
        assert_eq!(mesh.vertices[0].pos, egui::pos2(200.0, 0.0));
        assert_eq!(mesh.vertices[2].pos, egui::pos2(0.0, 400.0));
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }
}
