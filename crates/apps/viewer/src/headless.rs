//! A terrain provider with no GPU behind it. Every step is logged, and the
//! camera flight takes as long as the flight asks for.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::info;
use viewer3d::{CameraFlight, ContextId, RenderContext, TerrainProvider, ViewerError};

struct HeadlessContext {
    id: ContextId,
    destroyed: bool,
}

impl RenderContext for HeadlessContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn destroy(&mut self) {
        info!("{} destroyed", self.id);
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

pub struct HeadlessTerrain {
    next_id: AtomicU64,
    photorealistic: bool,
}

impl HeadlessTerrain {
    pub fn new(photorealistic: bool) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            photorealistic,
        }
    }
}

impl TerrainProvider for HeadlessTerrain {
    fn create_context(&self) -> BoxFuture<'_, Result<Box<dyn RenderContext>, ViewerError>> {
        let id = ContextId(self.next_id.fetch_add(1, Ordering::Relaxed));
        async move {
            info!("{id} created");
            Ok(Box::new(HeadlessContext {
                id,
                destroyed: false,
            }) as Box<dyn RenderContext>)
        }
        .boxed()
    }

    fn load_terrain<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
    ) -> BoxFuture<'a, Result<(), ViewerError>> {
        async move {
            info!("{} world terrain ready", context.id());
            Ok(())
        }
        .boxed()
    }

    fn load_photorealistic_tiles<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
    ) -> BoxFuture<'a, Result<(), ViewerError>> {
        async move {
            if !self.photorealistic {
                return Err(ViewerError::Tileset(
                    "no photorealistic tileset configured".to_string(),
                ));
            }
            info!("{} photorealistic tiles ready", context.id());
            Ok(())
        }
        .boxed()
    }

    fn fly_to<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
        flight: CameraFlight,
    ) -> BoxFuture<'a, Result<(), ViewerError>> {
        async move {
            let camera = flight.destination();
            info!(
                "{} flying to {} at {} m over {:?}",
                context.id(),
                flight.target,
                flight.altitude_m,
                flight.duration
            );
            tokio::time::sleep(flight.duration).await;
            info!(
                "{} camera {:.0} m above target",
                context.id(),
                camera.height_above_target()
            );
            Ok(())
        }
        .boxed()
    }
}
