use serde::{Deserialize, Serialize};

/// Geographic coordinate in WGS84 degrees.
///
/// Map engines hand us whatever the pointer is over, so construction through
/// [`GeoPoint::new`] does not validate. Use [`GeoPoint::try_new`] at trust
/// boundaries (CLI input, config).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoPointError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn try_new(lat: f64, lon: f64) -> Result<Self, GeoPointError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoPointError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoPointError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Folds the longitude back into [-180, 180] and clamps the latitude.
    ///
    /// Slippy maps report longitudes past the antimeridian once the user pans
    /// around the world.
    pub fn wrapped(self) -> Self {
        let mut lon = (self.lon + 180.0).rem_euclid(360.0) - 180.0;
        if lon == -180.0 && self.lon > 0.0 {
            lon = 180.0;
        }
        Self {
            lat: self.lat.clamp(-90.0, 90.0),
            lon,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `lat,lon`, got `{s}`"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("bad latitude `{lat}`: {e}"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|e| format!("bad longitude `{lon}`: {e}"))?;
        GeoPoint::try_new(lat, lon).map_err(|e| e.to_string())
    }
}
