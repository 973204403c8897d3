//! Runout path datasets.
//!
//! Runout paths arrive as a GeoJSON FeatureCollection of `LineString` /
//! `MultiLineString` features. Anything else in the collection is skipped.

use foundation::GeoPoint;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RunoutFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// One entry per polyline; a `LineString` yields exactly one.
    pub lines: Vec<Vec<GeoPoint>>,
}

impl RunoutFeature {
    pub fn vertex_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

/// Immutable, ordered set of runout features as served by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunoutFeatureSet {
    features: Vec<RunoutFeature>,
    skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RunoutParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

/// (lat_min, lon_min, lat_max, lon_max)
pub type LatLonBounds = (f64, f64, f64, f64);

impl RunoutFeatureSet {
    pub fn from_geojson_str(payload: &str) -> Result<Self, RunoutParseError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, RunoutParseError> {
        let obj = value
            .as_object()
            .ok_or(RunoutParseError::NotAFeatureCollection)?;
        if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(RunoutParseError::NotAFeatureCollection);
        }
        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(RunoutParseError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0usize;
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: &str| RunoutParseError::InvalidFeature {
                index,
                reason: reason.to_string(),
            };
            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object"))?;
            if feat_obj.get("type").and_then(Value::as_str) != Some("Feature") {
                return Err(invalid("feature type must be `Feature`"));
            }

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            let properties = feat_obj
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();

            let Some(geometry) = feat_obj.get("geometry").filter(|g| !g.is_null()) else {
                skipped += 1;
                continue;
            };
            let lines = match parse_line_geometry(geometry) {
                Ok(Some(lines)) => lines,
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(reason) => return Err(RunoutParseError::InvalidFeature { index, reason }),
            };

            features.push(RunoutFeature {
                id,
                properties,
                lines,
            });
        }

        if skipped > 0 {
            debug!("runout collection: skipped {skipped} non-line features");
        }

        Ok(Self { features, skipped })
    }

    pub fn features(&self) -> &[RunoutFeature] {
        &self.features
    }

    pub fn get(&self, index: usize) -> Option<&RunoutFeature> {
        self.features.get(index)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features dropped because they carried no line geometry.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn bounds(&self) -> Option<LatLonBounds> {
        let mut points = self
            .features
            .iter()
            .flat_map(|f| f.lines.iter().flatten());
        let first = points.next()?;
        let init = (first.lat, first.lon, first.lat, first.lon);
        Some(points.fold(init, |(lat0, lon0, lat1, lon1), p| {
            (lat0.min(p.lat), lon0.min(p.lon), lat1.max(p.lat), lon1.max(p.lon))
        }))
    }
}

/// `Ok(None)` for valid geometries that are not lines.
fn parse_line_geometry(value: &Value) -> Result<Option<Vec<Vec<GeoPoint>>>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "LineString" => {
            let coords = coordinates(obj)?;
            Ok(Some(vec![parse_points(coords)?]))
        }
        "MultiLineString" => {
            let lines = coordinates(obj)?
                .as_array()
                .ok_or("MultiLineString coordinates must be an array".to_string())?;
            let mut out = Vec::with_capacity(lines.len());
            for line in lines {
                out.push(parse_points(line)?);
            }
            Ok(Some(out))
        }
        "Point" | "MultiPoint" | "Polygon" | "MultiPolygon" | "GeometryCollection" => Ok(None),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value, String> {
    obj.get("coordinates")
        .ok_or("geometry missing coordinates".to_string())
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

// GeoJSON positions are [lon, lat(, alt)].
fn parse_position(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0]
        .as_f64()
        .ok_or("position lon must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("position lat must be a number".to_string())?;
    Ok(GeoPoint::new(lat, lon))
}
