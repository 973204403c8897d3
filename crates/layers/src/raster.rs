use lookup::{TileEndpoints, TileTemplate};

use crate::layer::LayerId;

/// A backend-tiled hazard raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    id: LayerId,
    pub template: TileTemplate,
}

impl RasterLayer {
    /// `None` for layers that are not backend rasters.
    pub fn for_layer(id: LayerId, endpoints: &TileEndpoints) -> Option<Self> {
        let slug = id.tile_slug()?;
        Some(Self {
            id,
            template: endpoints.raster(slug),
        })
    }

    pub fn id(&self) -> LayerId {
        self.id
    }
}
