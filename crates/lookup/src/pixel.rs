//! Point-attribute records and normalization of backend payloads.
//!
//! The pixel endpoint has gone through several revisions and the same logical
//! field shows up under different keys. Each field below lists the keys it
//! accepts, in priority order; the first one holding a usable, non-null value
//! wins. Supporting a new spelling means touching exactly one alias list.

use foundation::GeoPoint;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

pub const DEFAULT_ZONE: &str = "Unknown";

/// Accepted input keys for each logical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub keys: &'static [&'static str],
}

pub const LAT: FieldAliases = FieldAliases {
    field: "lat",
    keys: &["lat", "latitude"],
};
pub const LON: FieldAliases = FieldAliases {
    field: "lon",
    keys: &["lon", "longitude", "lng"],
};
pub const ZONE: FieldAliases = FieldAliases {
    field: "zone",
    keys: &["zone", "zone_name", "zoneName"],
};
pub const SUSCEPTIBILITY: FieldAliases = FieldAliases {
    field: "susceptibility",
    keys: &["susceptibility", "sus"],
};
pub const HISTORICAL_SUSCEPTIBILITY: FieldAliases = FieldAliases {
    field: "historical_susceptibility",
    keys: &["historical_susceptibility", "historicalSusceptibility"],
};
pub const HISTORICAL_RISK_CLASS: FieldAliases = FieldAliases {
    field: "historical_risk_class",
    keys: &["historical_risk_class", "historicalRiskClass"],
};
pub const RAINFALL: FieldAliases = FieldAliases {
    field: "rainfall",
    keys: &["rainfall", "rain"],
};
pub const RISK_LEVEL: FieldAliases = FieldAliases {
    field: "risk_level",
    keys: &["riskLevel", "risk_level", "risk"],
};

pub const PIXEL_FIELDS: [FieldAliases; 8] = [
    LAT,
    LON,
    ZONE,
    SUSCEPTIBILITY,
    HISTORICAL_SUSCEPTIBILITY,
    HISTORICAL_RISK_CLASS,
    RAINFALL,
    RISK_LEVEL,
];

/// Normalized point-query result. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelAttributes {
    pub point: GeoPoint,
    pub zone: String,
    pub susceptibility: Option<f64>,
    pub historical_susceptibility: Option<f64>,
    pub historical_risk_class: Option<String>,
    pub rainfall: f64,
    pub risk_level: Option<String>,
}

impl PixelAttributes {
    /// Record for a point with no raster data: the input coordinate and
    /// defaults everywhere else.
    pub fn uncovered(point: GeoPoint) -> Self {
        Self {
            point,
            zone: DEFAULT_ZONE.to_string(),
            susceptibility: None,
            historical_susceptibility: None,
            historical_risk_class: None,
            rainfall: 0.0,
            risk_level: None,
        }
    }

    /// Merges a raw backend payload over the defaults for `requested`.
    ///
    /// Non-object payloads normalize to [`PixelAttributes::uncovered`].
    pub fn from_payload(requested: GeoPoint, payload: &Value) -> Self {
        let Some(obj) = payload.as_object() else {
            return Self::uncovered(requested);
        };

        Self {
            point: GeoPoint::new(
                resolve_f64(obj, LAT).unwrap_or(requested.lat),
                resolve_f64(obj, LON).unwrap_or(requested.lon),
            ),
            zone: resolve_string(obj, ZONE).unwrap_or_else(|| DEFAULT_ZONE.to_string()),
            susceptibility: resolve_f64(obj, SUSCEPTIBILITY),
            historical_susceptibility: resolve_f64(obj, HISTORICAL_SUSCEPTIBILITY),
            historical_risk_class: resolve_string(obj, HISTORICAL_RISK_CLASS),
            rainfall: resolve_f64(obj, RAINFALL).unwrap_or(0.0),
            risk_level: resolve_string(obj, RISK_LEVEL),
        }
    }
}

/// First alias holding a value accepted by `extract`.
pub fn resolve<'a, T>(
    obj: &'a Map<String, Value>,
    aliases: FieldAliases,
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    let found = aliases
        .keys
        .iter()
        .filter_map(|key| obj.get(*key))
        .filter(|v| !v.is_null())
        .find_map(extract);
    if found.is_none() {
        trace!("pixel payload has no usable `{}`", aliases.field);
    }
    found
}

fn resolve_f64(obj: &Map<String, Value>, aliases: FieldAliases) -> Option<f64> {
    resolve(obj, aliases, |v| match v {
        Value::Number(n) => n.as_f64(),
        // Some raster readers emit numbers as strings.
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

fn resolve_string(obj: &Map<String, Value>, aliases: FieldAliases) -> Option<String> {
    resolve(obj, aliases, |v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ZONE, PIXEL_FIELDS, PixelAttributes};
    use foundation::GeoPoint;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn abbreviated_keys_resolve() {
        let payload = json!({"latitude": 10, "longitude": 76, "sus": 0.42, "risk": "High"});
        let got = PixelAttributes::from_payload(GeoPoint::new(10.2, 76.3), &payload);
        assert_eq!(
            got,
            PixelAttributes {
                point: GeoPoint::new(10.0, 76.0),
                zone: DEFAULT_ZONE.to_string(),
                susceptibility: Some(0.42),
                historical_susceptibility: None,
                historical_risk_class: None,
                rainfall: 0.0,
                risk_level: Some("High".to_string()),
            }
        );
    }

    #[test]
    fn full_backend_payload() {
        let payload = json!({
            "latitude": 12.5,
            "longitude": 75.0,
            "zone": "Failure",
            "susceptibility": 0.871,
            "historical_susceptibility": 4,
            "historical_risk_class": "High",
            "rainfall": 3.2,
            "riskLevel": "High"
        });
        let got = PixelAttributes::from_payload(GeoPoint::new(12.5, 75.0), &payload);
        assert_eq!(got.zone, "Failure");
        assert_eq!(got.susceptibility, Some(0.871));
        assert_eq!(got.historical_susceptibility, Some(4.0));
        assert_eq!(got.historical_risk_class.as_deref(), Some("High"));
        assert_eq!(got.rainfall, 3.2);
    }

    #[test]
    fn earlier_alias_wins_and_nulls_fall_through() {
        let payload = json!({
            "riskLevel": null,
            "risk_level": "Moderate",
            "risk": "Low",
            "susceptibility": null,
            "sus": "0.3",
            "zone": null,
            "zone_name": "Transit",
            "rainfall": 1.5,
            "rain": 9.0
        });
        let got = PixelAttributes::from_payload(GeoPoint::new(1.0, 2.0), &payload);
        assert_eq!(got.risk_level.as_deref(), Some("Moderate"));
        assert_eq!(got.susceptibility, Some(0.3));
        assert_eq!(got.zone, "Transit");
        assert_eq!(got.rainfall, 1.5);
        assert_eq!(got.point, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn empty_string_is_a_present_value() {
        let payload = json!({"zone": "", "zone_name": "Transit", "riskLevel": ""});
        let got = PixelAttributes::from_payload(GeoPoint::new(1.0, 2.0), &payload);
        assert_eq!(got.zone, "");
        assert_eq!(got.risk_level.as_deref(), Some(""));
    }

    #[test]
    fn wrong_type_falls_through_to_next_alias() {
        let payload = json!({"zone": true, "zone_name": "Deposition", "rainfall": [1], "rain": 2.5});
        let got = PixelAttributes::from_payload(GeoPoint::new(1.0, 2.0), &payload);
        assert_eq!(got.zone, "Deposition");
        assert_eq!(got.rainfall, 2.5);
    }

    #[test]
    fn non_object_payload_is_uncovered() {
        let p = GeoPoint::new(0.0, 0.0);
        let got = PixelAttributes::from_payload(p, &json!([1, 2, 3]));
        assert_eq!(got, PixelAttributes::uncovered(p));
    }

    #[test]
    fn alias_table_has_no_duplicate_keys() {
        let mut keys: Vec<&str> = PIXEL_FIELDS.iter().flat_map(|f| f.keys.iter().copied()).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
