//! Background requests to the dashboard backend.
//!
//! Requests run on a tokio runtime; results come back to the UI thread over a
//! channel drained once per frame.

use crate::assets::{DecodedImage, ImageLoadError, decode_image};
use eframe::egui;
use floor_map::api::{ApiClient, EntityProvider, ImageProvider, PlacementSink};
use floor_map::{ApiError, Floor, LoadTicket, Machine, PingSchedule, Placement};
use std::sync::mpsc;

/// Which map surface a plan request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Map,
    Placement,
}

/// Hands out increasing request numbers so that only the newest response of
/// a kind gets applied.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

pub enum Event {
    Floors(Result<Vec<Floor>, ApiError>),
    /// Machines of the main map's floor
    Machines {
        floor_id: String,
        generation: u64,
        result: Result<Vec<Machine>, ApiError>,
    },
    /// Machines offered by the placement window, across all floors
    Candidates(Result<Vec<Machine>, ApiError>),
    Schedule(Result<PingSchedule, ApiError>),
    Plan {
        view: ViewId,
        ticket: LoadTicket,
        result: Result<DecodedImage, ImageLoadError>,
    },
    PlacementSaved {
        placement: Placement,
        result: Result<(), ApiError>,
    },
}

pub struct Backend {
    api: ApiClient,
    runtime: tokio::runtime::Runtime,
    ctx: egui::Context,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
}

impl Backend {
    pub fn new(api: ApiClient, ctx: egui::Context) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (event_tx, event_rx) = mpsc::channel();
        Ok(Self {
            api,
            runtime,
            ctx,
            event_tx,
            event_rx,
        })
    }

    /// Returns every event that arrived since the last call.
    pub fn poll(&self) -> Vec<Event> {
        self.event_rx.try_iter().collect()
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(task.await);
            ctx.request_repaint();
        });
    }

    pub fn request_floors(&self) {
        let api = self.api.clone();
        self.spawn(async move { Event::Floors(api.floors().await) });
    }

    pub fn request_schedule(&self) {
        let api = self.api.clone();
        self.spawn(async move { Event::Schedule(api.ping_schedule().await) });
    }

    pub fn request_machines(&self, floor_id: &str, generation: u64) {
        let api = self.api.clone();
        let floor_id = floor_id.to_owned();
        self.spawn(async move {
            let result = api.fetch_machines(&floor_id).await;
            Event::Machines {
                floor_id,
                generation,
                result,
            }
        });
    }

    pub fn request_candidates(&self) {
        let api = self.api.clone();
        self.spawn(async move { Event::Candidates(api.fetch_all_machines().await) });
    }

    /// Fetches and decodes the plan for the floor named by `ticket`.
    pub fn request_plan(&self, view: ViewId, ticket: LoadTicket) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = load_plan(&api, ticket.floor_id()).await;
            Event::Plan {
                view,
                ticket,
                result,
            }
        });
    }

    pub fn save_placement(&self, placement: Placement) {
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.save_placement(&placement).await;
            Event::PlacementSaved { placement, result }
        });
    }
}

async fn load_plan(
    images: &impl ImageProvider,
    floor_id: &str,
) -> Result<DecodedImage, ImageLoadError> {
    let bytes = images.fetch_map_image(floor_id).await?;
    tokio::task::spawn_blocking(move || decode_image(&bytes)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_request_is_current() {
        let mut requests = Generation::default();
        let older = requests.next();
        let newer = requests.next();
        assert!(!requests.is_current(older));
        assert!(requests.is_current(newer));
        assert!(!requests.is_current(0));
    }
}
