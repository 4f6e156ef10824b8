//! Placement window: pick a floor and a machine, click the plan to position it.

use crate::constants::PLACEMENT_MIN_HEIGHT;
use crate::surface::PlanSurface;
use eframe::egui;
use floor_map::{Floor, Machine, MarkerFilter, NormalizedPoint, Placement};

/// Request from the placement window to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementAction {
    /// Load the plan of this floor into the window
    LoadFloor(String),
    Save(Placement),
    /// Saving is not possible yet; the message tells the user why
    Incomplete(&'static str),
}

pub struct PlacementWindow {
    open: bool,
    saving: bool,
    floor_id: Option<String>,
    machine_id: Option<String>,
    pending: Option<NormalizedPoint>,
    /// Every machine that can be placed, whatever its floor
    candidates: Vec<Machine>,
    /// Candidates already on the selected floor, drawn as reference markers
    on_floor: Vec<Machine>,
    pub surface: PlanSurface,
}

impl PlacementWindow {
    pub fn new() -> Self {
        Self {
            open: false,
            saving: false,
            floor_id: None,
            machine_id: None,
            pending: None,
            candidates: Vec::new(),
            on_floor: Vec::new(),
            surface: PlanSurface::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the window on `floor_id` with `machine_id` preselected.
    pub fn open(&mut self, floor_id: &str, machine_id: Option<String>) -> PlacementAction {
        self.open = true;
        self.saving = false;
        self.floor_id = Some(floor_id.to_owned());
        self.machine_id = machine_id;
        self.pending = None;
        self.surface.reset_pan();
        self.select_floor_machines();
        self.preset_pending();
        PlacementAction::LoadFloor(floor_id.to_owned())
    }

    pub fn close(&mut self) {
        self.open = false;
        self.saving = false;
        self.pending = None;
    }

    /// Replaces the machines offered for placement.
    pub fn set_candidates(&mut self, candidates: Vec<Machine>) {
        self.candidates = candidates;
        self.select_floor_machines();
        self.preset_pending();
    }

    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    fn select_floor_machines(&mut self) {
        self.on_floor = self
            .candidates
            .iter()
            .filter(|m| m.floor_id.is_some() && m.floor_id == self.floor_id)
            .cloned()
            .collect();
    }

    /// Starts from the selected machine's current position when it already
    /// sits on the selected floor.
    fn preset_pending(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(machine_id) = self.machine_id.as_deref() else {
            return;
        };
        self.pending = self
            .on_floor
            .iter()
            .find(|m| m.id == machine_id)
            .and_then(Machine::position);
    }

    /// Renders the window.
    pub fn show(&mut self, ctx: &egui::Context, floors: &[Floor]) -> Option<PlacementAction> {
        if !self.open {
            return None;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return None;
        }

        let mut open = self.open;
        let mut action = None;

        egui::Window::new("Place device")
            .open(&mut open)
            .default_size([760.0, 560.0])
            .collapsible(false)
            .show(ctx, |ui| {
                let floor_before = self.floor_id.clone();
                let machine_before = self.machine_id.clone();
                ui.horizontal(|ui| {
                    self.floor_selector(ui, floors);
                    self.machine_selector(ui);
                    ui.label(self.surface.view.rotation().to_string());
                });

                if self.floor_id != floor_before
                    && let Some(floor_id) = self.floor_id.clone()
                {
                    self.pending = None;
                    self.select_floor_machines();
                    self.preset_pending();
                    action = Some(PlacementAction::LoadFloor(floor_id));
                } else if self.machine_id != machine_before {
                    self.preset_pending();
                }

                ui.label("Click on the map to set the position.");

                let footer_height = 36.0;
                let response = ui
                    .allocate_ui(
                        egui::vec2(ui.available_width(), ui.available_height() - footer_height),
                        |ui| {
                            self.surface.show(
                                ui,
                                &self.on_floor,
                                &MarkerFilter::default(),
                                self.pending,
                                PLACEMENT_MIN_HEIGHT,
                                "No map for this floor",
                            )
                        },
                    )
                    .inner;
                if let Some(point) = response.clicked {
                    self.pending = Some(point);
                }

                ui.horizontal(|ui| {
                    match self.pending {
                        Some(point) => ui.label(format!("x: {:.3}, y: {:.3}", point.x, point.y)),
                        None => ui.weak("No position chosen"),
                    };

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(!self.saving, egui::Button::new("Save"))
                            .clicked()
                        {
                            match build_placement(
                                self.floor_id.as_deref(),
                                self.machine_id.as_deref(),
                                self.pending,
                            ) {
                                Ok(placement) => {
                                    self.saving = true;
                                    action = Some(PlacementAction::Save(placement));
                                }
                                Err(message) => action = Some(PlacementAction::Incomplete(message)),
                            }
                        }
                        if self.saving {
                            ui.spinner();
                        }
                    });
                });
            });

        if !open {
            self.close();
        }
        action
    }

    fn floor_selector(&mut self, ui: &mut egui::Ui, floors: &[Floor]) {
        let selected = self
            .floor_id
            .as_deref()
            .and_then(|id| floors.iter().find(|f| f.id == id))
            .map_or_else(|| "Choose a floor".to_owned(), |f| f.name.clone());

        egui::ComboBox::from_id_salt("placement_floor")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for floor in floors {
                    ui.selectable_value(
                        &mut self.floor_id,
                        Some(floor.id.clone()),
                        floor.name.as_str(),
                    );
                }
            });
    }

    fn machine_selector(&mut self, ui: &mut egui::Ui) {
        let selected = self
            .machine_id
            .as_deref()
            .map(|id| {
                self.candidates
                    .iter()
                    .find(|m| m.id == id)
                    .map_or_else(|| id.to_owned(), |m| display_name(m).to_owned())
            })
            .unwrap_or_else(|| "Choose a machine".to_owned());

        egui::ComboBox::from_id_salt("placement_machine")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for machine in &self.candidates {
                    let label = match machine.floor_id {
                        Some(_) => display_name(machine).to_owned(),
                        None => format!("{} (unplaced)", display_name(machine)),
                    };
                    ui.selectable_value(&mut self.machine_id, Some(machine.id.clone()), label);
                }
            });
    }
}

fn display_name(machine: &Machine) -> &str {
    if machine.name.is_empty() {
        &machine.id
    } else {
        &machine.name
    }
}

/// Validates the window's selection into a placement ready to be saved.
pub fn build_placement(
    floor_id: Option<&str>,
    machine_id: Option<&str>,
    pending: Option<NormalizedPoint>,
) -> Result<Placement, &'static str> {
    let floor_id = floor_id.ok_or("Choose a floor")?;
    let point = pending.ok_or("Click on the map to set a position")?;
    let machine_id = machine_id.ok_or("Choose a machine")?;

    Ok(Placement {
        machine_id: machine_id.to_owned(),
        x: point.x,
        y: point.y,
        floor_id: floor_id.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_requires_floor_position_and_machine() {
        let point = Some(NormalizedPoint { x: 0.25, y: 1.0 });
        assert_eq!(build_placement(None, Some("m"), point), Err("Choose a floor"));
        assert_eq!(
            build_placement(Some("f"), Some("m"), None),
            Err("Click on the map to set a position")
        );
        assert_eq!(build_placement(Some("f"), None, point), Err("Choose a machine"));
    }

    #[test]
    fn placement_carries_clamped_click() {
        let placement =
            build_placement(Some("annex"), Some("pc-7"), Some(NormalizedPoint { x: 0.5, y: 1.0 }))
                .unwrap();
        assert_eq!(placement.machine_id, "pc-7");
        assert_eq!(placement.floor_id, "annex");
        assert_eq!((placement.x, placement.y), (0.5, 1.0));
    }

    fn machine(json: &str) -> Machine {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unplaced_machine_can_be_placed() {
        let mut window = PlacementWindow::new();
        assert_eq!(
            window.open("main", Some("new".to_owned())),
            PlacementAction::LoadFloor("main".to_owned())
        );
        window.set_candidates(vec![
            machine(r#"{"id": "new", "floor_id": null}"#),
            machine(r#"{"id": "old", "floor_id": "main", "x": 0.2, "y": 0.4}"#),
            machine(r#"{"id": "far", "floor_id": "annex", "x": 0.5, "y": 0.5}"#),
        ]);

        assert_eq!(window.candidates.len(), 3);
        let shown: Vec<_> = window.on_floor.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(shown, vec!["old"]);
        assert_eq!(window.pending, None);

        window.pending = Some(NormalizedPoint { x: 0.5, y: 0.5 });
        let placement = build_placement(
            window.floor_id.as_deref(),
            window.machine_id.as_deref(),
            window.pending,
        )
        .unwrap();
        assert_eq!(placement.machine_id, "new");
        assert_eq!(placement.floor_id, "main");
    }

    #[test]
    fn placed_machine_starts_from_its_position() {
        let mut window = PlacementWindow::new();
        window.set_candidates(vec![machine(
            r#"{"id": "old", "floor_id": "main", "x": 0.2, "y": 0.4}"#,
        )]);

        window.open("main", Some("old".to_owned()));
        assert_eq!(window.pending, Some(NormalizedPoint { x: 0.2, y: 0.4 }));

        window.open("annex", Some("old".to_owned()));
        assert_eq!(window.pending, None);
        assert!(window.on_floor.is_empty());
        assert!(window.is_open());
        window.close();
        assert!(!window.is_open());
    }
}
