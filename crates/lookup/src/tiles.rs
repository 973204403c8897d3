//! Slippy-map tile addressing and URL templates.
//!
//! The core never fetches tiles itself; it only hands templates to the map
//! engine, which substitutes `{z}`, `{x}`, `{y}` (and `{s}` for sharded hosts).

use foundation::GeoPoint;
use serde::Serialize;

pub const DEFAULT_BASEMAP_TEMPLATE: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
pub const DEFAULT_STREETS_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Tile coordinate in ZXY scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Tile containing `point` at zoom `z` (Web Mercator).
    pub fn containing(point: GeoPoint, z: u8) -> Self {
        let n = f64::from(1u32 << z);
        let p = point.wrapped();
        // Mercator is undefined at the poles.
        let lat = p.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
        let x = ((p.lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n)
            .floor();
        let max = n - 1.0;
        Self::new(z, x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileTemplate(String);

impl TileTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self, coord: TileCoord) -> String {
        let shard = SUBDOMAINS[((coord.x + coord.y) % SUBDOMAINS.len() as u32) as usize];
        self.0
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{s}", shard)
    }
}

impl std::fmt::Display for TileTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where every tiled layer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEndpoints {
    backend_base: String,
    pub basemap: TileTemplate,
    pub streets: TileTemplate,
}

impl TileEndpoints {
    pub fn new(backend_base: impl Into<String>) -> Self {
        Self {
            backend_base: backend_base.into().trim_end_matches('/').to_string(),
            basemap: TileTemplate::new(DEFAULT_BASEMAP_TEMPLATE),
            streets: TileTemplate::new(DEFAULT_STREETS_TEMPLATE),
        }
    }

    pub fn with_basemap(mut self, template: impl Into<String>) -> Self {
        self.basemap = TileTemplate::new(template);
        self
    }

    pub fn with_streets(mut self, template: impl Into<String>) -> Self {
        self.streets = TileTemplate::new(template);
        self
    }

    /// Backend raster tiles for a layer slug, e.g. `hazard_fused`.
    pub fn raster(&self, slug: &str) -> TileTemplate {
        TileTemplate::new(format!("{}/tiles/{slug}/{{z}}/{{x}}/{{y}}.png", self.backend_base))
    }
}

#[cfg(test)]
mod tests {
    use super::{TileCoord, TileEndpoints, TileTemplate};
    use foundation::GeoPoint;

    #[test]
    fn raster_template_expands() {
        let tiles = TileEndpoints::new("http://localhost:8000/");
        let t = tiles.raster("hazard_fused");
        assert_eq!(
            t.as_str(),
            "http://localhost:8000/tiles/hazard_fused/{z}/{x}/{y}.png"
        );
        assert_eq!(
            t.url(TileCoord::new(11, 1450, 934)),
            "http://localhost:8000/tiles/hazard_fused/11/1450/934.png"
        );
    }

    #[test]
    fn basemap_uses_z_y_x_order_and_streets_shard() {
        let tiles = TileEndpoints::new("http://h");
        assert!(tiles.basemap.url(TileCoord::new(3, 1, 2)).ends_with("/tile/3/2/1"));
        let streets = TileTemplate::new("https://{s}.example/{z}/{x}/{y}.png");
        assert_eq!(
            streets.url(TileCoord::new(1, 1, 1)),
            "https://c.example/1/1/1.png"
        );
    }

    #[test]
    fn initial_view_centre_tile() {
        let coord = TileCoord::containing(GeoPoint::new(12.5, 75.0), 11);
        assert_eq!(coord, TileCoord::new(11, 1450, 952));
    }

    #[test]
    fn containing_clamps_at_edges() {
        let c = TileCoord::containing(GeoPoint::new(90.0, 180.0), 2);
        assert_eq!((c.x, c.y), (3, 0));
        let c = TileCoord::containing(GeoPoint::new(-90.0, -180.0), 2);
        assert_eq!((c.x, c.y), (0, 3));
    }
}
