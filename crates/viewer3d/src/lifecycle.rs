//! Creation, reuse and teardown of the 3D rendering context.
//!
//! Phases move `Closed -> Opening -> Open -> Closed`. Initialization runs as a
//! spawned task that owns its context through a [`ContextGuard`], so aborting
//! the task at any await point destroys whatever it had created. A finished
//! task only hands its context over if its generation is still current.
//!
//! Status changes are published on a `watch` channel.

use std::sync::{Arc, Weak};

use foundation::{GeoPoint, Generation};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::camera::FlightSettings;
use crate::context::{ContextGuard, ContextId};
use crate::provider::{TerrainProvider, ViewerError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewerPhase {
    Closed,
    Opening,
    Open,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerStatus {
    pub phase: ViewerPhase,
    pub bound_point: Option<GeoPoint>,
    /// Open without the photorealistic tileset.
    pub degraded: bool,
    pub last_error: Option<String>,
}

impl ViewerStatus {
    pub const fn closed() -> Self {
        Self {
            phase: ViewerPhase::Closed,
            bound_point: None,
            degraded: false,
            last_error: None,
        }
    }
}

impl Default for ViewerStatus {
    fn default() -> Self {
        Self::closed()
    }
}

struct Shared {
    status: ViewerStatus,
    generation: Generation,
    context: Option<ContextGuard>,
    init: Option<JoinHandle<()>>,
    tx: watch::Sender<ViewerStatus>,
}

impl Shared {
    fn publish(&self) {
        self.tx.send_replace(self.status.clone());
    }
}

pub struct ViewerLifecycle {
    provider: Arc<dyn TerrainProvider>,
    flight: FlightSettings,
    shared: Arc<Mutex<Shared>>,
}

impl ViewerLifecycle {
    pub fn new(provider: Arc<dyn TerrainProvider>, flight: FlightSettings) -> Self {
        let (tx, _rx) = watch::channel(ViewerStatus::closed());
        Self {
            provider,
            flight,
            shared: Arc::new(Mutex::new(Shared {
                status: ViewerStatus::closed(),
                generation: Generation::initial(),
                context: None,
                init: None,
                tx,
            })),
        }
    }

    pub fn status(&self) -> ViewerStatus {
        self.shared.lock().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewerStatus> {
        self.shared.lock().tx.subscribe()
    }

    /// The context bound to the open view, if any.
    pub fn active_context(&self) -> Option<ContextId> {
        self.shared.lock().context.as_ref().map(ContextGuard::id)
    }

    /// Starts opening a view at `point`, first releasing any previous context
    /// or in-flight initialization. Returns once the old resources are gone
    /// and the new initialization is scheduled.
    pub async fn open(&self, point: GeoPoint) {
        self.cancel_init().await;

        let previous = self.shared.lock().context.take();
        if let Some(previous) = previous {
            info!("replacing 3D view {}", previous.id());
            drop(previous);
        }

        {
            let mut shared = self.shared.lock();
            let generation = shared.generation.bump();
            shared.status = ViewerStatus {
                phase: ViewerPhase::Opening,
                bound_point: Some(point),
                degraded: false,
                last_error: None,
            };
            shared.publish();

            let task = tokio::spawn(initialize(
                Arc::clone(&self.provider),
                Arc::downgrade(&self.shared),
                generation,
                point,
                self.flight,
            ));
            // A concurrent `open` may have scheduled one while we waited.
            if let Some(raced) = shared.init.replace(task) {
                raced.abort();
            }
        }
        info!("opening 3D view at {point}");
    }

    /// Cancels initialization, destroys any context and resets to `Closed`.
    pub async fn close(&self) {
        self.cancel_init().await;
        let context = {
            let mut shared = self.shared.lock();
            shared.generation.bump();
            shared.status = ViewerStatus::closed();
            shared.publish();
            shared.context.take()
        };
        if let Some(context) = context {
            info!("closed 3D view {}", context.id());
        }
    }

    async fn cancel_init(&self) {
        let task = {
            let mut shared = self.shared.lock();
            shared.generation.bump();
            shared.init.take()
        };
        if let Some(task) = task {
            task.abort();
            // Wait until the aborted future, and the guard it holds, is dropped.
            let _ = task.await;
        }
    }
}

impl Drop for ViewerLifecycle {
    fn drop(&mut self) {
        let context = {
            let mut shared = self.shared.lock();
            shared.generation.bump();
            if let Some(task) = shared.init.take() {
                task.abort();
            }
            shared.status = ViewerStatus::closed();
            shared.publish();
            shared.context.take()
        };
        drop(context);
    }
}

async fn initialize(
    provider: Arc<dyn TerrainProvider>,
    shared: Weak<Mutex<Shared>>,
    generation: Generation,
    point: GeoPoint,
    flight: FlightSettings,
) {
    let context = match provider.create_context().await {
        Ok(context) => context,
        Err(err) => return fail(&shared, generation, err),
    };
    let mut guard = ContextGuard::new(context);
    debug!("created rendering context {}", guard.id());

    if let Err(err) = provider.load_terrain(guard.context_mut()).await {
        return fail(&shared, generation, err);
    }

    let degraded = match provider.load_photorealistic_tiles(guard.context_mut()).await {
        Ok(()) => false,
        Err(err) => {
            warn!("continuing with base terrain only: {err}");
            true
        }
    };

    if let Err(err) = provider
        .fly_to(guard.context_mut(), flight.flight_to(point))
        .await
    {
        warn!("{err}");
    }

    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut shared = shared.lock();
    if shared.generation != generation {
        debug!("discarding superseded rendering context {}", guard.id());
        return;
    }
    info!("3D view {} open at {point}", guard.id());
    shared.context = Some(guard);
    shared.init = None;
    shared.status.phase = ViewerPhase::Open;
    shared.status.degraded = degraded;
    shared.publish();
}

fn fail(shared: &Weak<Mutex<Shared>>, generation: Generation, err: ViewerError) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut shared = shared.lock();
    if shared.generation != generation {
        return;
    }
    error!("3D view failed to open: {err}");
    shared.init = None;
    shared.status = ViewerStatus {
        last_error: Some(err.to_string()),
        ..ViewerStatus::closed()
    };
    shared.publish();
}
