//! Coordinate lookups against the hazard backend.
//!
//! Pixel queries outside raster coverage are the normal case, not a failure:
//! [`PointLookup::query_pixel`] folds every error into an uncovered record.
//! Weather is best-effort and comes back as `None` on any failure.

use formats::{RunoutFeatureSet, RunoutParseError};
use foundation::GeoPoint;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
pub use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::pixel::PixelAttributes;
use crate::tiles::TileEndpoints;
use crate::weather::WeatherSnapshot;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const RUNOUT_PATHS_PATH: &str = "/rasters/runout_paths.geojson";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success response. 404 means "outside coverage"; anything else is a
    /// backend fault, though both are treated the same by `query_pixel`.
    #[error("backend returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed weather payload: {0}")]
    Weather(#[from] serde_json::Error),
    #[error("malformed runout dataset: {0}")]
    Runout(#[from] RunoutParseError),
}

impl LookupError {
    pub fn is_out_of_coverage(&self) -> bool {
        matches!(self, LookupError::Status(StatusCode::NOT_FOUND))
    }
}

/// Asynchronous point queries. Implementations must be `Send + Sync` so hover
/// and click lookups can be spawned as independent tasks.
pub trait PointLookup: Send + Sync {
    /// Raw pixel query with the failure reason preserved.
    fn try_query_pixel(&self, point: GeoPoint) -> BoxFuture<'_, Result<PixelAttributes, LookupError>>;

    /// Weather at `point`; failures are logged and swallowed.
    fn query_weather(&self, point: GeoPoint) -> BoxFuture<'_, Option<WeatherSnapshot>>;

    /// Pixel query that never fails. Anything other than a usable payload
    /// yields [`PixelAttributes::uncovered`].
    fn query_pixel(&self, point: GeoPoint) -> BoxFuture<'_, PixelAttributes> {
        async move {
            match self.try_query_pixel(point).await {
                Ok(attrs) => attrs,
                Err(err) => {
                    debug!("pixel-info at {point}: no raster data ({err})");
                    PixelAttributes::uncovered(point)
                }
            }
        }
        .boxed()
    }
}

/// HTTP implementation of [`PointLookup`].
#[derive(Debug, Clone)]
pub struct LookupClient {
    base_url: String,
    http: reqwest::Client,
}

impl LookupClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tile_endpoints(&self) -> TileEndpoints {
        TileEndpoints::new(self.base_url.clone())
    }

    async fn get_point_json(&self, path: &str, point: GeoPoint) -> Result<serde_json::Value, LookupError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("lat", point.lat), ("lon", point.lon)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    async fn fetch_weather(&self, point: GeoPoint) -> Result<WeatherSnapshot, LookupError> {
        let payload = self.get_point_json("/weather", point).await?;
        Ok(WeatherSnapshot::from_payload(payload)?)
    }

    /// One-shot download of the runout path dataset.
    pub async fn fetch_runout_paths(&self) -> Result<RunoutFeatureSet, LookupError> {
        let url = format!("{}{RUNOUT_PATHS_PATH}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status()));
        }
        let text = resp.text().await?;
        Ok(RunoutFeatureSet::from_geojson_str(&text)?)
    }
}

impl Default for LookupClient {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

impl PointLookup for LookupClient {
    fn try_query_pixel(&self, point: GeoPoint) -> BoxFuture<'_, Result<PixelAttributes, LookupError>> {
        async move {
            let payload = self.get_point_json("/pixel-info", point).await?;
            Ok(PixelAttributes::from_payload(point, &payload))
        }
        .boxed()
    }

    fn query_weather(&self, point: GeoPoint) -> BoxFuture<'_, Option<WeatherSnapshot>> {
        async move {
            match self.fetch_weather(point).await {
                Ok(snapshot) => Some(snapshot),
                Err(LookupError::Status(status)) => {
                    warn!("weather proxy returned status {status}");
                    None
                }
                Err(err) => {
                    error!("weather lookup failed: {err}");
                    None
                }
            }
        }
        .boxed()
    }
}
