use futures_util::future::BoxFuture;

use crate::camera::CameraFlight;
use crate::context::RenderContext;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to create rendering context: {0}")]
    Context(String),
    #[error("terrain unavailable: {0}")]
    Terrain(String),
    #[error("photorealistic tileset unavailable: {0}")]
    Tileset(String),
    #[error("camera flight failed: {0}")]
    Flight(String),
}

/// The 3D engine as seen by the lifecycle manager.
///
/// Every step runs against a context previously returned by
/// [`TerrainProvider::create_context`]. The manager owns that context and is
/// the only caller that destroys it.
pub trait TerrainProvider: Send + Sync {
    fn create_context(&self) -> BoxFuture<'_, Result<Box<dyn RenderContext>, ViewerError>>;

    fn load_terrain<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
    ) -> BoxFuture<'a, Result<(), ViewerError>>;

    /// Supplementary photorealistic tiles. Failure only degrades the view.
    fn load_photorealistic_tiles<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
    ) -> BoxFuture<'a, Result<(), ViewerError>>;

    fn fly_to<'a>(
        &'a self,
        context: &'a mut dyn RenderContext,
        flight: CameraFlight,
    ) -> BoxFuture<'a, Result<(), ViewerError>>;
}
