#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod assets;
mod backend;
mod colors;
mod constants;
mod coordinates;
mod overlays;
mod placement;
mod surface;
mod ui;

use backend::{Backend, Event, Generation, ViewId};
use clap::{CommandFactory, Parser};
use constants::{FLOOR_STORAGE_KEY, MIN_REFRESH_SECS};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use floor_map::api::ApiClient;
use floor_map::{
    Floor, LoadOutcome, Machine, MarkerFilter, MemoryOrientationStore, OrientationError,
    OrientationStore, RonOrientationStore, pick_initial_floor,
};
use placement::{PlacementAction, PlacementWindow};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use surface::PlanSurface;

/// Floor plan viewer for the device monitoring dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the dashboard backend
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server: String,

    /// File that stores per-floor rotations (defaults to the user config directory)
    #[arg(long)]
    orientation_file: Option<PathBuf>,

    /// Refresh period in seconds when the backend does not report its ping schedule
    #[arg(long, default_value_t = 60)]
    refresh_secs: u64,
}

pub struct FloorMapApp {
    backend: Backend,
    server: String,
    orientations: Box<dyn OrientationStore>,
    floors: Vec<Floor>,
    floor_id: Option<String>,
    machines: Vec<Machine>,
    machine_requests: Generation,
    filter: MarkerFilter,
    map: PlanSurface,
    placement: PlacementWindow,
    next_refresh: Option<Instant>,
    refresh_fallback: Duration,
    toasts: Toasts,
}

impl FloorMapApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        api: ApiClient,
        orientation_file: Option<PathBuf>,
        refresh_secs: u64,
    ) -> std::io::Result<Self> {
        let mut toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let orientations: Box<dyn OrientationStore> = match open_orientation_store(orientation_file)
        {
            Ok(store) => {
                log::info!("Using orientation file {}", store.path().display());
                Box::new(store)
            }
            Err(err) => {
                log::warn!("Rotations will not be saved: {err}");
                toasts.add(error_toast(format!("Rotations will not be saved: {err}")));
                Box::new(MemoryOrientationStore::new())
            }
        };

        let remembered_floor = cc
            .storage
            .and_then(|storage| eframe::get_value::<String>(storage, FLOOR_STORAGE_KEY));

        let server = api.base_url().to_string();
        let backend = Backend::new(api, cc.egui_ctx.clone())?;
        backend.request_floors();

        Ok(Self {
            backend,
            server,
            orientations,
            floors: Vec::new(),
            floor_id: remembered_floor,
            machines: Vec::new(),
            machine_requests: Generation::default(),
            filter: MarkerFilter::default(),
            map: PlanSurface::new(),
            placement: PlacementWindow::new(),
            next_refresh: None,
            refresh_fallback: Duration::from_secs(refresh_secs.max(MIN_REFRESH_SECS)),
            toasts,
        })
    }

    fn selected_floor(&self) -> Option<&Floor> {
        let floor_id = self.floor_id.as_deref()?;
        self.floors.iter().find(|f| f.id == floor_id)
    }

    /// Switches the main map to `floor_id` and loads its data.
    fn select_floor(&mut self, floor_id: String) {
        if self.floor_id.as_deref() != Some(floor_id.as_str()) {
            self.machines.clear();
            self.filter.category = None;
        }
        log::info!("Showing floor '{floor_id}'");
        self.floor_id = Some(floor_id);
        self.refresh();
    }

    /// Reloads machines and the plan of the current floor, then asks the
    /// backend when to refresh next.
    fn refresh(&mut self) {
        if self.floors.is_empty() {
            self.backend.request_floors();
        }

        if let Some(floor_id) = self.floor_id.clone() {
            let generation = self.machine_requests.next();
            self.backend.request_machines(&floor_id, generation);
            let ticket = self.map.begin_load(&floor_id, &*self.orientations);
            self.backend.request_plan(ViewId::Map, ticket);
        }

        self.backend.request_schedule();
        self.next_refresh = None;
    }

    fn refresh_if_due(&mut self) {
        if self
            .next_refresh
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.refresh();
        }
    }

    /// Seconds until the next automatic refresh, if one is scheduled.
    fn seconds_until_refresh(&self) -> Option<u64> {
        self.next_refresh
            .map(|deadline| deadline.saturating_duration_since(Instant::now()).as_secs())
    }

    fn handle_placement_action(&mut self, action: PlacementAction) {
        match action {
            PlacementAction::LoadFloor(floor_id) => {
                let ticket = self
                    .placement
                    .surface
                    .begin_load(&floor_id, &*self.orientations);
                self.backend.request_plan(ViewId::Placement, ticket);
            }
            PlacementAction::Save(placement) => {
                log::info!(
                    "Saving position of '{}' on floor '{}'",
                    placement.machine_id,
                    placement.floor_id
                );
                self.backend.save_placement(placement);
            }
            PlacementAction::Incomplete(message) => {
                self.toasts.add(info_toast(message.to_owned()));
            }
        }
    }

    /// Opens the placement window and fetches the machines it offers.
    fn open_placement(&mut self, floor_id: &str, machine_id: Option<String>) {
        let action = self.placement.open(floor_id, machine_id);
        self.handle_placement_action(action);
        self.backend.request_candidates();
    }

    fn handle_events(&mut self, ctx: &egui::Context) {
        for event in self.backend.poll() {
            self.handle_event(ctx, event);
        }
    }

    fn handle_event(&mut self, ctx: &egui::Context, event: Event) {
        match event {
            Event::Floors(Ok(floors)) => {
                self.floors = floors;
                match pick_initial_floor(&self.floors, self.floor_id.as_deref()) {
                    Some(floor) => {
                        let floor_id = floor.id.clone();
                        self.select_floor(floor_id);
                    }
                    None => {
                        self.floor_id = None;
                        self.machines.clear();
                        self.map.view.clear();
                    }
                }
            }
            Event::Floors(Err(err)) => {
                log::warn!("Failed to load floors: {err}");
                self.toasts.add(error_toast(format!("Failed to load floors: {err}")));
                self.next_refresh = Some(Instant::now() + self.refresh_fallback);
            }
            Event::Machines {
                floor_id,
                generation,
                result,
            } => match result {
                Ok(machines) => {
                    if self.machine_requests.is_current(generation)
                        && self.floor_id.as_deref() == Some(floor_id.as_str())
                    {
                        self.machines = machines;
                    } else {
                        log::debug!("Dropping stale machine list for floor '{floor_id}'");
                    }
                }
                Err(err) => {
                    log::warn!("Failed to load machines for floor '{floor_id}': {err}");
                    self.toasts
                        .add(error_toast(format!("Failed to load machines: {err}")));
                }
            },
            Event::Candidates(Ok(machines)) => self.placement.set_candidates(machines),
            Event::Candidates(Err(err)) => {
                log::warn!("Failed to load machines for placement: {err}");
                self.toasts
                    .add(error_toast(format!("Failed to load machines: {err}")));
            }
            Event::Schedule(result) => {
                let delay = match result {
                    Ok(schedule) => Duration::from_secs(schedule.seconds_left.max(MIN_REFRESH_SECS)),
                    Err(err) => {
                        log::warn!("Ping schedule unavailable: {err}");
                        self.refresh_fallback
                    }
                };
                self.next_refresh = Some(Instant::now() + delay);
            }
            Event::Plan {
                view,
                ticket,
                result,
            } => {
                let surface = match view {
                    ViewId::Map => &mut self.map,
                    ViewId::Placement => &mut self.placement.surface,
                };
                match surface.finish_load(ctx, &ticket, result) {
                    Ok(LoadOutcome::Applied) => {
                        log::info!("Loaded plan for floor '{}'", ticket.floor_id());
                    }
                    Ok(_) => {}
                    Err(err) => {
                        log::warn!("Failed to load plan for floor '{}': {err}", ticket.floor_id());
                        self.toasts.add(error_toast(format!("No map: {err}")));
                    }
                }
            }
            Event::PlacementSaved { placement, result } => match result {
                Ok(()) => {
                    log::info!("Saved position of '{}'", placement.machine_id);
                    self.toasts.add(success_toast("Position saved".to_owned()));
                    self.placement.close();
                    self.select_floor(placement.floor_id);
                }
                Err(err) => {
                    log::warn!("Failed to save position of '{}': {err}", placement.machine_id);
                    self.placement.save_failed();
                    self.toasts.add(error_toast(format!("Save failed: {err}")));
                }
            },
        }
    }
}

impl eframe::App for FloorMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_events(ctx);
        self.refresh_if_due();
        self.placement
            .surface
            .view
            .sync_rotation(&*self.orientations);
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_sidebar(ctx);
        self.show_central_panel(ctx);
        self.show_placement_window(ctx);

        self.toasts.show(ctx);

        // Keeps the refresh countdown ticking
        ctx.request_repaint_after(Duration::from_secs(1));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(floor_id) = &self.floor_id {
            eframe::set_value(storage, FLOOR_STORAGE_KEY, floor_id);
        }
    }
}

fn open_orientation_store(path: Option<PathBuf>) -> Result<RonOrientationStore, OrientationError> {
    let path = match path {
        Some(path) => path,
        None => RonOrientationStore::default_path()?,
    };
    RonOrientationStore::open(path)
}

fn toast(kind: ToastKind, text: String, seconds: f64) -> Toast {
    Toast {
        kind,
        text: text.into(),
        options: ToastOptions::default()
            .duration_in_seconds(seconds)
            .show_icon(true),
        ..Default::default()
    }
}

fn error_toast(text: String) -> Toast {
    toast(ToastKind::Error, text, 8.0)
}

fn info_toast(text: String) -> Toast {
    toast(ToastKind::Info, text, 4.0)
}

fn success_toast(text: String) -> Toast {
    toast(ToastKind::Success, text, 4.0)
}

fn main() -> eframe::Result {
    env_logger::init();

    let cli = Cli::parse();
    let api = match ApiClient::new(&cli.server) {
        Ok(api) => api,
        Err(err) => Cli::command()
            .error(clap::error::ErrorKind::InvalidValue, err)
            .exit(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Floor Map",
        options,
        Box::new(move |cc| {
            let app = FloorMapApp::new(cc, api, cli.orientation_file, cli.refresh_secs)?;
            Ok(Box::new(app))
        }),
    )
}
