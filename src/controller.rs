//! Per-view state machine sequencing fit, transform and projection.
//!
//! Each map surface (the main map and the placement window) owns one
//! [`ViewController`]. Controllers share nothing except the orientation store,
//! which is passed in explicitly whenever rotation is read or written.

use crate::constants::{FALLBACK_PLAN_SIZE, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use crate::error::OrientationError;
use crate::fit::compute_fit;
use crate::markers::{MarkerFilter, PlacedMarker, layout_markers};
use crate::orientation::OrientationStore;
use crate::projection::{NormalizedPoint, from_screen_click};
use crate::rotation::{RotateDirection, Rotation};
use crate::transform::{ScaledGeometry, compute_transform};
use crate::Machine;

/// Natural pixel size of a loaded plan image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageGeometry {
    /// Zero dimensions are replaced by the fallback plan size.
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        let (fallback_width, fallback_height) = FALLBACK_PLAN_SIZE;
        Self {
            natural_width: if natural_width == 0 { fallback_width } else { natural_width },
            natural_height: if natural_height == 0 { fallback_height } else { natural_height },
        }
    }
}

/// Lifecycle of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// No plan loaded (none requested, or the last load failed).
    Empty,
    /// Waiting for the plan image of the current floor.
    Loading,
    /// Plan geometry known, container not measured yet.
    Fitted,
    /// Plan fitted against a measured container.
    Interactive,
}

/// Identifies one image request; stale tickets are ignored on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    floor_id: String,
}

impl LoadTicket {
    pub fn floor_id(&self) -> &str {
        &self.floor_id
    }
}

/// What happened to a completed image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The load failed; the view is now empty.
    Failed,
    /// A newer load was started meanwhile; the result was dropped.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct ViewController {
    margin: f64,
    phase: ViewPhase,
    floor_id: Option<String>,
    generation: u64,
    rotation: Rotation,
    zoom: f64,
    fit_scale: f64,
    container: Option<(f64, f64)>,
    image: Option<ImageGeometry>,
    geometry: Option<ScaledGeometry>,
}

impl ViewController {
    /// Creates an empty view that keeps `margin` pixels free when fitting.
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            phase: ViewPhase::Empty,
            floor_id: None,
            generation: 0,
            rotation: Rotation::Deg0,
            zoom: 1.0,
            fit_scale: 1.0,
            container: None,
            image: None,
            geometry: None,
        }
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn floor_id(&self) -> Option<&str> {
        self.floor_id.as_deref()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn fit_scale(&self) -> f64 {
        self.fit_scale
    }

    pub fn image(&self) -> Option<ImageGeometry> {
        self.image
    }

    /// Current plan geometry; only available once the plan has been fitted.
    pub fn geometry(&self) -> Option<&ScaledGeometry> {
        match self.phase {
            ViewPhase::Fitted | ViewPhase::Interactive => self.geometry.as_ref(),
            ViewPhase::Empty | ViewPhase::Loading => None,
        }
    }

    /// Plan geometry to draw: the current one, or during a refresh of the same
    /// floor the previous one until the new image arrives.
    pub fn displayed_geometry(&self) -> Option<&ScaledGeometry> {
        match self.phase {
            ViewPhase::Empty => None,
            _ => self.geometry.as_ref(),
        }
    }

    /// Starts loading the plan for `floor_id` (a floor switch or a refresh).
    ///
    /// Any load still in flight is superseded by the returned ticket. A refresh
    /// of the floor already shown keeps its image until the new one lands.
    pub fn begin_load(&mut self, floor_id: &str, store: &dyn OrientationStore) -> LoadTicket {
        let refresh = self.floor_id.as_deref() == Some(floor_id) && self.image.is_some();
        let rotation = store.rotation(floor_id);

        self.generation += 1;
        self.floor_id = Some(floor_id.to_owned());
        self.phase = ViewPhase::Loading;
        if refresh {
            if rotation != self.rotation {
                self.rotation = rotation;
                self.refit();
                self.retransform();
            }
        } else {
            self.rotation = rotation;
            self.image = None;
            self.geometry = None;
        }

        LoadTicket {
            generation: self.generation,
            floor_id: floor_id.to_owned(),
        }
    }

    /// Applies the result of the load identified by `ticket`.
    ///
    /// `None` means the image could not be fetched or decoded.
    pub fn finish_load(&mut self, ticket: &LoadTicket, image: Option<ImageGeometry>) -> LoadOutcome {
        let current = ticket.generation == self.generation
            && self.floor_id.as_deref() == Some(ticket.floor_id.as_str());
        if !current {
            log::debug!(
                "Dropping stale plan load for floor '{}' (generation {} < {})",
                ticket.floor_id,
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Superseded;
        }

        match image {
            Some(image) => {
                self.image = Some(image);
                self.phase = if self.container.is_some() {
                    ViewPhase::Interactive
                } else {
                    ViewPhase::Fitted
                };
                self.refit();
                self.retransform();
                LoadOutcome::Applied
            }
            None => {
                self.clear();
                LoadOutcome::Failed
            }
        }
    }

    /// Drops the plan and hides markers. The floor stays selected.
    pub fn clear(&mut self) {
        self.image = None;
        self.geometry = None;
        self.phase = ViewPhase::Empty;
    }

    /// Reports the container's available size.
    ///
    /// The plan is refitted on the first measurement, and afterwards only while
    /// the zoom is still at "fit"; a manual zoom keeps its pixel scale.
    /// Returns whether anything changed.
    pub fn set_container(&mut self, width: f64, height: f64) -> bool {
        if self.container == Some((width, height)) {
            return false;
        }
        self.container = Some((width, height));

        if self.image.is_none() {
            return true;
        }

        if self.phase == ViewPhase::Fitted || self.zoom_is_fit() {
            self.refit();
        }
        if self.phase == ViewPhase::Fitted {
            self.phase = ViewPhase::Interactive;
        }
        self.retransform();
        true
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Refits the plan to the container and resets the zoom to 1.
    pub fn zoom_to_fit(&mut self) {
        self.zoom = 1.0;
        self.refit();
        self.retransform();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.retransform();
    }

    /// Turns the plan a quarter and remembers the new rotation for the floor.
    ///
    /// The view is updated even if persisting the rotation fails.
    pub fn rotate(
        &mut self,
        direction: RotateDirection,
        store: &mut dyn OrientationStore,
    ) -> Result<Rotation, OrientationError> {
        self.rotation = self.rotation.rotated(direction);
        self.refit();
        self.retransform();

        if let Some(floor_id) = &self.floor_id {
            store.set_rotation(floor_id, self.rotation)?;
        }
        Ok(self.rotation)
    }

    /// Picks up a rotation changed through another view of the same floor.
    pub fn sync_rotation(&mut self, store: &dyn OrientationStore) -> bool {
        let Some(floor_id) = &self.floor_id else {
            return false;
        };
        let stored = store.rotation(floor_id);
        if stored == self.rotation {
            return false;
        }
        self.rotation = stored;
        self.refit();
        self.retransform();
        true
    }

    /// Lays out the markers for `machines` on the current geometry.
    pub fn markers(&self, machines: &[Machine], filter: &MarkerFilter) -> Vec<PlacedMarker> {
        match self.displayed_geometry() {
            Some(geometry) => layout_markers(machines, filter, geometry),
            None => Vec::new(),
        }
    }

    /// Converts a click relative to the box's top-left corner into a plan
    /// position. `None` while no plan is fitted.
    pub fn click_to_normalized(&self, click_x: f64, click_y: f64) -> Option<NormalizedPoint> {
        let geometry = self.geometry()?;
        let (scaled_width, scaled_height) = geometry.scaled_size();
        Some(from_screen_click(
            click_x,
            click_y,
            scaled_width,
            scaled_height,
            geometry.rotation,
        ))
    }

    /// Status line text, e.g. `"120% · 90°"`.
    pub fn zoom_label(&self) -> String {
        format!("{}% · {}", (100.0 * self.zoom).round(), self.rotation)
    }

    fn zoom_is_fit(&self) -> bool {
        (self.zoom - 1.0).abs() < 1e-9
    }

    fn refit(&mut self) {
        let (Some(image), Some((width, height))) = (self.image, self.container) else {
            self.fit_scale = 1.0;
            return;
        };
        self.fit_scale = compute_fit(
            width,
            height,
            f64::from(image.natural_width),
            f64::from(image.natural_height),
            self.rotation,
            self.margin,
        );
    }

    fn retransform(&mut self) {
        self.geometry = self.image.map(|image| {
            compute_transform(
                image.natural_width,
                image.natural_height,
                self.fit_scale,
                self.zoom,
                self.rotation,
            )
        });
    }
}
