use std::env;
use std::time::Duration;

use lookup::{DEFAULT_BACKEND_URL, TileEndpoints};
use runtime::DEFAULT_QUIET_PERIOD;
use viewer3d::{DEFAULT_FLIGHT_ALTITUDE_M, DEFAULT_FLIGHT_DURATION, FlightSettings};

/// Initial map view: Kasaragod district, Kerala.
pub const INITIAL_CENTER: (f64, f64) = (12.5, 75.0);
pub const INITIAL_ZOOM: u8 = 11;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub backend_url: String,
    pub hover_quiet: Duration,
    pub flight: FlightSettings,
    pub basemap_url: Option<String>,
    pub streets_url: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            hover_quiet: DEFAULT_QUIET_PERIOD,
            flight: FlightSettings::default(),
            basemap_url: None,
            streets_url: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: env::var("SLIPSENSE_BACKEND_URL").unwrap_or(defaults.backend_url),
            hover_quiet: Duration::from_millis(env_var_u64(
                "SLIPSENSE_HOVER_DEBOUNCE_MS",
                DEFAULT_QUIET_PERIOD.as_millis() as u64,
            )),
            flight: FlightSettings {
                altitude_m: env_var_f64("SLIPSENSE_FLIGHT_ALTITUDE_M", DEFAULT_FLIGHT_ALTITUDE_M),
                duration: Duration::from_millis(env_var_u64(
                    "SLIPSENSE_FLIGHT_DURATION_MS",
                    DEFAULT_FLIGHT_DURATION.as_millis() as u64,
                )),
            },
            basemap_url: env::var("SLIPSENSE_BASEMAP_URL").ok(),
            streets_url: env::var("SLIPSENSE_STREETS_URL").ok(),
        }
    }

    pub fn tile_endpoints(&self) -> TileEndpoints {
        let mut endpoints = TileEndpoints::new(self.backend_url.clone());
        if let Some(url) = &self.basemap_url {
            endpoints = endpoints.with_basemap(url.clone());
        }
        if let Some(url) = &self.streets_url {
            endpoints = endpoints.with_streets(url.clone());
        }
        endpoints
    }
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| v.is_finite())
        .unwrap_or(default)
}
