//! The viewer state and every interaction that mutates it.
//!
//! State lives in plain owned objects behind one mutex; each mutation emits a
//! change on the bus so the renderer knows a fresh projection is due. No lock
//! is held across an await.
//!
//! Click lookups carry generation tokens like hover lookups do: the newest
//! interaction owns the selection, and a late result from an older click is
//! dropped.

use std::sync::Arc;

use foundation::{GeoPoint, GeoPointError, Generation};
use layers::{InvalidOpacity, LayerComposition, LayerId, RunoutLayer};
use lookup::{LookupClient, PointLookup, TileEndpoints, WeatherSnapshot};
use parking_lot::Mutex;
use runtime::{ChangeKind, Event, EventBus, HoverDebouncer, HoverInfo};
use scene::{Selection, SelectionState};
use tokio::sync::watch;
use tracing::{debug, info};
use viewer3d::{TerrainProvider, ViewerLifecycle, ViewerStatus};

use crate::config::ViewerConfig;
use crate::render::{self, Frame};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("the 3D view needs a raster point selection")]
    NoRasterSelection,
    #[error(transparent)]
    Opacity(#[from] InvalidOpacity),
    #[error("invalid pointer path: {0}")]
    InvalidPath(String),
    #[error("invalid point: {0}")]
    InvalidPoint(#[from] GeoPointError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to encode state: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct ViewState {
    layers: LayerComposition,
    selection: SelectionState,
    weather: Option<WeatherSnapshot>,
    runout: RunoutLayer,
    /// Bumped by every click and runout click.
    selection_token: Generation,
    /// Bumped by every map click.
    weather_token: Generation,
}

pub struct MapApp {
    client: Arc<LookupClient>,
    endpoints: TileEndpoints,
    state: Mutex<ViewState>,
    bus: Arc<Mutex<EventBus>>,
    hover: HoverDebouncer,
    viewer: ViewerLifecycle,
}

impl MapApp {
    pub fn new(config: &ViewerConfig, terrain: Arc<dyn TerrainProvider>) -> Self {
        let client = Arc::new(LookupClient::new(config.backend_url.clone()));
        let bus = Arc::new(Mutex::new(EventBus::new()));

        let hover = HoverDebouncer::new(client.clone(), config.hover_quiet);
        let hover_bus = Arc::clone(&bus);
        hover.set_listener(move |info| {
            let message = match info {
                Some(info) => format!("hover {}", info.pointer),
                None => "hover cleared".to_string(),
            };
            hover_bus.lock().emit(ChangeKind::Hover, message);
        });

        Self {
            client,
            endpoints: config.tile_endpoints(),
            state: Mutex::new(ViewState::default()),
            bus,
            hover,
            viewer: ViewerLifecycle::new(terrain, config.flight),
        }
    }

    fn emit(&self, kind: ChangeKind, message: impl Into<String>) {
        self.bus.lock().emit(kind, message);
    }

    pub fn subscribe(&self, subscriber: impl Fn(&Event) + Send + Sync + 'static) {
        self.bus.lock().subscribe(subscriber);
    }

    /// Recent changes, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.bus.lock().events().iter().cloned().collect()
    }

    /// Removes and returns the retained changes.
    pub fn take_events(&self) -> Vec<Event> {
        self.bus.lock().drain()
    }

    pub fn endpoints(&self) -> &TileEndpoints {
        &self.endpoints
    }

    // Layers

    pub fn set_layer_visible(&self, id: LayerId, visible: bool) {
        if self.state.lock().layers.set_visible(id, visible) {
            self.emit(ChangeKind::Layers, format!("{id} visible={visible}"));
        }
    }

    pub fn toggle_layer(&self, id: LayerId) -> bool {
        let visible = self.state.lock().layers.toggle(id);
        self.emit(ChangeKind::Layers, format!("{id} visible={visible}"));
        visible
    }

    pub fn set_layer_opacity(&self, id: LayerId, opacity: f64) -> Result<f64, AppError> {
        let stored = self.state.lock().layers.set_opacity(id, opacity)?;
        self.emit(ChangeKind::Layers, format!("{id} opacity={stored}"));
        Ok(stored)
    }

    pub fn layers(&self) -> LayerComposition {
        self.state.lock().layers.clone()
    }

    // Point queries

    /// Looks up pixel attributes and weather at `point` concurrently. Each
    /// result is applied as soon as it arrives, unless a newer interaction
    /// has superseded it by then.
    pub async fn click(&self, point: GeoPoint) {
        let point = point.wrapped();
        info!("click at {point}");
        let (selection_token, weather_token) = {
            let mut state = self.state.lock();
            (state.selection_token.bump(), state.weather_token.bump())
        };
        let pixel = async {
            let attrs = self.client.query_pixel(point).await;
            self.select(selection_token, Selection::Raster(attrs));
        };
        let weather = async {
            let Some(snapshot) = self.client.query_weather(point).await else {
                debug!("keeping previous weather");
                return;
            };
            let applied = {
                let mut state = self.state.lock();
                let current = state.weather_token == weather_token;
                if current {
                    state.weather = Some(snapshot);
                }
                current
            };
            if applied {
                self.emit(ChangeKind::Weather, format!("weather at {point}"));
            } else {
                debug!("weather for {point} superseded");
            }
        };
        tokio::join!(pixel, weather);
    }

    fn select(&self, token: Generation, selection: Selection) {
        let kind = selection.kind();
        {
            let mut state = self.state.lock();
            if state.selection_token != token {
                debug!("{kind} selection superseded");
                return;
            }
            state.selection.replace(selection);
        }
        self.emit(ChangeKind::Selection, kind);
    }

    pub fn selection(&self) -> Selection {
        self.state.lock().selection.current().clone()
    }

    pub fn weather(&self) -> Option<WeatherSnapshot> {
        self.state.lock().weather.clone()
    }

    pub fn hover_move(&self, point: GeoPoint) {
        self.hover.on_pointer_move(point.wrapped());
    }

    pub fn hover_leave(&self) {
        self.hover.on_pointer_leave();
    }

    pub async fn hover_settle(&self) {
        self.hover.settle().await;
    }

    pub fn hover(&self) -> Option<HoverInfo> {
        self.hover.current()
    }

    pub fn hover_lookups_fired(&self) -> u64 {
        self.hover.fired()
    }

    pub fn hover_results_discarded(&self) -> u64 {
        self.hover.discarded()
    }

    // Runout paths

    /// Fetches the runout dataset unless a fetch has already been attempted.
    pub async fn load_runout(&self) {
        if !self.state.lock().runout.begin_load() {
            return;
        }
        let result = self.client.fetch_runout_paths().await;
        self.state.lock().runout.finish_load(result);
        self.emit(ChangeKind::Runout, "runout load finished");
    }

    pub fn runout_hover_enter(&self, index: usize) {
        if self.state.lock().runout.hover_enter(index) {
            self.emit(ChangeKind::Runout, format!("runout #{index} highlighted"));
        }
    }

    pub fn runout_hover_leave(&self, index: usize) {
        if self.state.lock().runout.hover_leave(index) {
            self.emit(ChangeKind::Runout, format!("runout #{index} restored"));
        }
    }

    pub fn runout_click(&self, index: usize) -> bool {
        let (token, selection) = {
            let mut state = self.state.lock();
            let Some(selection) = state.runout.click(index) else {
                return false;
            };
            (state.selection_token.bump(), selection)
        };
        self.select(token, selection);
        true
    }

    // 3D view

    pub async fn open_3d_view(&self) -> Result<(), AppError> {
        let point = self
            .state
            .lock()
            .selection
            .current()
            .raster_point()
            .ok_or(AppError::NoRasterSelection)?;
        self.viewer.open(point).await;
        self.emit(ChangeKind::Viewer, format!("3D view opening at {point}"));
        Ok(())
    }

    pub async fn close_3d_view(&self) {
        self.viewer.close().await;
        self.emit(ChangeKind::Viewer, "3D view closed");
    }

    pub fn viewer_status(&self) -> ViewerStatus {
        self.viewer.status()
    }

    pub fn watch_viewer(&self) -> watch::Receiver<ViewerStatus> {
        self.viewer.subscribe()
    }

    // Rendering

    fn with_frame<T>(&self, f: impl FnOnce(&Frame<'_>) -> T) -> T {
        let hover = self.hover.current();
        let viewer = self.viewer_status();
        let viewer_context = self.viewer.active_context();
        let state = self.state.lock();
        let frame = Frame {
            layers: &state.layers,
            selection: state.selection.current(),
            weather: state.weather.as_ref(),
            runout: &state.runout,
            hover: hover.as_ref(),
            viewer: &viewer,
            viewer_context,
            endpoints: &self.endpoints,
        };
        f(&frame)
    }

    pub fn render_text(&self) -> String {
        self.with_frame(render::render_text)
    }

    pub fn render_json(&self) -> serde_json::Value {
        self.with_frame(render::render_json)
    }
}
