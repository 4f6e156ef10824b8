//! A plan image with its markers, driven by one view controller.

use crate::assets::{DecodedImage, ImageLoadError};
use crate::colors;
use crate::constants::MARKER_HOVER_RADIUS;
use crate::coordinates::{box_rect, plan_mesh, screen_to_box};
use crate::overlays::{draw_markers, draw_pending, show_machine_tooltip};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use floor_map::constants::FIT_MARGIN;
use floor_map::markers::hit_test;
use floor_map::{
    LoadOutcome, LoadTicket, Machine, MarkerFilter, NormalizedPoint, OrientationStore,
    ViewController, ViewPhase,
};

/// What the user did on the surface this frame.
#[derive(Default)]
pub struct SurfaceResponse {
    /// Plan position of a click inside the plan box
    pub clicked: Option<NormalizedPoint>,
    /// Index of the machine whose marker was clicked
    pub clicked_marker: Option<usize>,
}

pub struct PlanSurface {
    pub view: ViewController,
    texture: Option<TextureHandle>,
    pan: egui::Vec2,
}

impl PlanSurface {
    pub fn new() -> Self {
        Self {
            view: ViewController::new(FIT_MARGIN),
            texture: None,
            pan: egui::Vec2::ZERO,
        }
    }

    pub fn begin_load(&mut self, floor_id: &str, store: &dyn OrientationStore) -> LoadTicket {
        if self.view.floor_id() != Some(floor_id) {
            self.pan = egui::Vec2::ZERO;
        }
        self.view.begin_load(floor_id, store)
    }

    /// Applies a finished plan load. Errors are returned only when they apply
    /// to the current floor; superseded failures are swallowed.
    pub fn finish_load(
        &mut self,
        ctx: &egui::Context,
        ticket: &LoadTicket,
        result: Result<DecodedImage, ImageLoadError>,
    ) -> Result<LoadOutcome, ImageLoadError> {
        match result {
            Ok(decoded) => {
                let outcome = self.view.finish_load(ticket, Some(decoded.geometry()));
                if outcome == LoadOutcome::Applied {
                    let image = ColorImage::from_rgba_unmultiplied(
                        [decoded.width as usize, decoded.height as usize],
                        &decoded.pixels,
                    );
                    let name = format!("plan-{}", ticket.floor_id());
                    self.texture = Some(ctx.load_texture(name, image, TextureOptions::LINEAR));
                }
                Ok(outcome)
            }
            Err(err) => match self.view.finish_load(ticket, None) {
                LoadOutcome::Failed => {
                    self.texture = None;
                    Err(err)
                }
                outcome => Ok(outcome),
            },
        }
    }

    pub fn reset_pan(&mut self) {
        self.pan = egui::Vec2::ZERO;
    }

    /// Renders the plan into the remaining space of `ui`.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        machines: &[Machine],
        filter: &MarkerFilter,
        pending: Option<NormalizedPoint>,
        min_height: f32,
        empty_text: &str,
    ) -> SurfaceResponse {
        let mut size = ui.available_size();
        size.y = size.y.max(min_height);
        let (viewport_rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        self.view
            .set_container(f64::from(viewport_rect.width()), f64::from(viewport_rect.height()));

        let painter = ui.painter_at(viewport_rect);
        painter.rect_filled(viewport_rect, 4.0, colors::PLAN_BACKGROUND);

        if self.view.phase() == ViewPhase::Empty {
            painter.text(
                viewport_rect.center(),
                egui::Align2::CENTER_CENTER,
                empty_text,
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return SurfaceResponse::default();
        }
        if self.view.displayed_geometry().is_none() || self.texture.is_none() {
            ui.put(viewport_rect, egui::Spinner::new());
            return SurfaceResponse::default();
        }

        self.handle_scroll_zoom(ui, viewport_rect);
        if response.dragged() {
            self.pan += response.drag_delta();
        }

        let (Some(geometry), Some(texture)) =
            (self.view.displayed_geometry().copied(), &self.texture)
        else {
            return SurfaceResponse::default();
        };
        let plan_rect = box_rect(viewport_rect, &geometry, self.pan);

        painter.add(egui::Shape::mesh(plan_mesh(texture.id(), plan_rect, &geometry)));

        let markers = self.view.markers(machines, filter);
        let hovered = response
            .hover_pos()
            .and_then(|pos| hit_test(&markers, screen_to_box(plan_rect, pos), MARKER_HOVER_RADIUS))
            .map(|marker| marker.index);

        draw_markers(&painter, plan_rect, &markers, hovered);
        if self.view.phase() == ViewPhase::Loading {
            let corner = viewport_rect.right_top() + egui::vec2(-28.0, 8.0);
            ui.put(
                egui::Rect::from_min_size(corner, egui::vec2(20.0, 20.0)),
                egui::Spinner::new(),
            );
        }
        if let Some(point) = pending {
            draw_pending(&painter, plan_rect, &geometry, point.x, point.y);
        }

        if let (Some(index), Some(pos)) = (hovered, response.hover_pos())
            && let Some(machine) = machines.get(index)
        {
            show_machine_tooltip(ui.ctx(), pos, machine);
        }

        let mut surface_response = SurfaceResponse::default();
        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            surface_response.clicked_marker = hovered;
            if plan_rect.contains(pos) {
                let (x, y) = screen_to_box(plan_rect, pos);
                surface_response.clicked = self.view.click_to_normalized(x, y);
            }
        }
        surface_response
    }

    /// Zooms with the scroll wheel while the pointer is over the viewport,
    /// keeping the viewport center fixed.
    fn handle_scroll_zoom(&mut self, ui: &egui::Ui, viewport_rect: egui::Rect) {
        let hover_pos = ui.input(|i| i.pointer.hover_pos());
        let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);

        if scroll_delta == 0.0 || !hover_pos.is_some_and(|p| viewport_rect.contains(p)) {
            return;
        }

        let old_zoom = self.view.zoom();
        if scroll_delta > 0.0 {
            self.view.zoom_in();
        } else {
            self.view.zoom_out();
        }
        self.pan *= (self.view.zoom() / old_zoom) as f32;
    }
}
