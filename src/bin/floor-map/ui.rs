//! Panels of the floor map window.

use crate::FloorMapApp;
use crate::colors;
use crate::constants::SIDEBAR_WIDTH;
use crate::error_toast;
use eframe::egui;
use floor_map::{CATEGORIES, MarkerFilter, RotateDirection, StatusCounts, category_label};

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    ZoomIn,
    ZoomOut,
    Fit,
    Rotate(RotateDirection),
    Refresh,
    Fullscreen,
}

impl FloorMapApp {
    /// Handles keyboard shortcuts for zoom, rotation, refresh and fullscreen.
    ///
    /// Disabled while the placement window is open.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if self.placement.is_open() || ctx.wants_keyboard_input() {
            return;
        }

        let shortcuts: Vec<Shortcut> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => shortcut_for(*key, *modifiers),
                    _ => None,
                })
                .collect()
        });

        for shortcut in shortcuts {
            match shortcut {
                Shortcut::ZoomIn => self.map.view.zoom_in(),
                Shortcut::ZoomOut => self.map.view.zoom_out(),
                Shortcut::Fit => self.fit_map(),
                Shortcut::Rotate(direction) => self.rotate_map(direction),
                Shortcut::Refresh => self.refresh(),
                Shortcut::Fullscreen => toggle_fullscreen(ctx),
            }
        }
    }

    fn fit_map(&mut self) {
        self.map.view.zoom_to_fit();
        self.map.reset_pan();
    }

    fn rotate_map(&mut self, direction: RotateDirection) {
        if let Err(err) = self.map.view.rotate(direction, self.orientations.as_mut()) {
            log::warn!("Failed to save rotation: {err}");
            self.toasts
                .add(error_toast(format!("Failed to save rotation: {err}")));
        }
    }

    /// Renders the bottom status bar with controls hint, refresh countdown and server.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    "Scroll: Zoom | Drag: Pan | +/-: Zoom | 0: Fit | R: Rotate | F5: Refresh | F11: Fullscreen",
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.server.as_str());
                    if let Some(secs) = self.seconds_until_refresh() {
                        ui.label(format!("Next refresh in {}", countdown_label(secs)));
                    }
                });
            });
        });
    }

    /// Renders the left sidebar panel.
    pub fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_sidebar_content(ui);
                });
            });
    }

    fn show_sidebar_content(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);

        ui.strong("Floors");
        ui.separator();

        if self.floors.is_empty() {
            ui.label("No floors loaded");
        } else {
            let mut clicked = None;
            for floor in &self.floors {
                let selected = self.floor_id.as_deref() == Some(floor.id.as_str());
                let label = if floor.has_map {
                    floor.name.clone()
                } else {
                    format!("{} (no map)", floor.name)
                };
                if ui.selectable_label(selected, label).clicked() && !selected {
                    clicked = Some(floor.id.clone());
                }
            }
            if let Some(floor_id) = clicked {
                self.map.reset_pan();
                self.select_floor(floor_id);
            }
        }

        ui.add_space(12.0);

        ui.strong("Devices");
        ui.separator();

        let counts = StatusCounts::from_machines(&self.machines);
        ui.horizontal(|ui| {
            status_dot(ui, colors::MARKER_UP_FILL);
            ui.label(format!("{} up", counts.up));
            ui.add_space(8.0);
            status_dot(ui, colors::MARKER_DOWN_FILL);
            ui.label(format!("{} down", counts.down));
        });

        ui.add(
            egui::TextEdit::singleline(&mut self.filter.query)
                .hint_text("Search name, IP, serial, OS"),
        );

        if self.selected_floor().is_some_and(|f| f.categories_enabled) {
            let selected_text = self
                .filter
                .category
                .as_deref()
                .map_or("All categories", category_label);
            egui::ComboBox::from_id_salt("category_filter")
                .selected_text(selected_text)
                .width(SIDEBAR_WIDTH - 24.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.filter.category, None, "All categories");
                    for key in CATEGORIES {
                        ui.selectable_value(
                            &mut self.filter.category,
                            Some(key.to_owned()),
                            category_label(key),
                        );
                    }
                });
        }

        ui.add_space(12.0);

        ui.strong("View");
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("-").on_hover_text("Zoom out (-)").clicked() {
                self.map.view.zoom_out();
            }
            if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
                self.map.view.zoom_in();
            }
            if ui.button("Fit").on_hover_text("Fit to window (0)").clicked() {
                self.fit_map();
            }
        });

        let rotate = ui
            .button("Rotate")
            .on_hover_text("Rotate 90° (R), counter-clockwise with Shift");
        if rotate.clicked() {
            let shift = ui.input(|i| i.modifiers.shift);
            self.rotate_map(rotate_direction(shift));
        }

        ui.label(self.map.view.zoom_label());

        ui.horizontal(|ui| {
            if ui.button("Refresh").on_hover_text("Reload devices and map (F5)").clicked() {
                self.refresh();
            }
            if ui.button("Fullscreen").on_hover_text("Toggle fullscreen (F11)").clicked() {
                toggle_fullscreen(ui.ctx());
            }
        });

        ui.add_space(12.0);

        let can_place = self.floor_id.is_some() && !self.placement.is_open();
        if ui
            .add_enabled(can_place, egui::Button::new("Place device…"))
            .clicked()
            && let Some(floor_id) = self.floor_id.clone()
        {
            self.open_placement(&floor_id, None);
        }
    }

    /// Renders the central panel containing the plan.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let empty_text = match self.selected_floor() {
                None => "No floor selected",
                Some(floor) if !floor.has_map => "No map uploaded for this floor",
                Some(_) => "No map",
            };

            let filter = self.effective_filter();
            let response = self
                .map
                .show(ui, &self.machines, &filter, None, 0.0, empty_text);

            if let Some(index) = response.clicked_marker
                && let (Some(floor_id), Some(machine)) =
                    (self.floor_id.clone(), self.machines.get(index))
            {
                let machine_id = machine.id.clone();
                self.open_placement(&floor_id, Some(machine_id));
            }
        });
    }

    /// Renders the placement window, if open, and acts on its requests.
    pub fn show_placement_window(&mut self, ctx: &egui::Context) {
        if let Some(action) = self.placement.show(ctx, &self.floors) {
            self.handle_placement_action(action);
        }
    }

    /// The marker filter with the category dropped on floors without categories.
    fn effective_filter(&self) -> MarkerFilter {
        let mut filter = self.filter.clone();
        if !self.selected_floor().is_some_and(|f| f.categories_enabled) {
            filter.category = None;
        }
        filter
    }
}

fn shortcut_for(key: egui::Key, modifiers: egui::Modifiers) -> Option<Shortcut> {
    match key {
        egui::Key::Plus | egui::Key::Equals => Some(Shortcut::ZoomIn),
        egui::Key::Minus => Some(Shortcut::ZoomOut),
        egui::Key::Num0 => Some(Shortcut::Fit),
        egui::Key::R => Some(Shortcut::Rotate(rotate_direction(modifiers.shift))),
        egui::Key::F5 => Some(Shortcut::Refresh),
        egui::Key::F11 => Some(Shortcut::Fullscreen),
        _ => None,
    }
}

fn toggle_fullscreen(ctx: &egui::Context) {
    let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
}

fn rotate_direction(shift: bool) -> RotateDirection {
    if shift {
        RotateDirection::CounterClockwise
    } else {
        RotateDirection::Clockwise
    }
}

fn status_dot(ui: &mut egui::Ui, color: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
}

/// Formats a countdown as `m:ss`.
fn countdown_label(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_pads_seconds() {
        assert_eq!(countdown_label(0), "0:00");
        assert_eq!(countdown_label(65), "1:05");
        assert_eq!(countdown_label(600), "10:00");
    }

    #[test]
    fn refresh_and_fullscreen_have_keys() {
        assert_eq!(
            shortcut_for(egui::Key::F5, egui::Modifiers::NONE),
            Some(Shortcut::Refresh)
        );
        assert_eq!(
            shortcut_for(egui::Key::F11, egui::Modifiers::NONE),
            Some(Shortcut::Fullscreen)
        );
        assert_eq!(
            shortcut_for(egui::Key::R, egui::Modifiers::SHIFT),
            Some(Shortcut::Rotate(RotateDirection::CounterClockwise))
        );
        assert_eq!(shortcut_for(egui::Key::Q, egui::Modifiers::NONE), None);
    }

    #[test]
    fn shift_reverses_rotation() {
        assert_eq!(rotate_direction(false), RotateDirection::Clockwise);
        assert_eq!(rotate_direction(true), RotateDirection::CounterClockwise);
    }
}
