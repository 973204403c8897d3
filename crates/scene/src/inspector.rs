//! Inspector panel projection.
//!
//! The panel holds no state. Every view is recomputed from the current
//! [`Selection`], so it can never disagree with it.

use lookup::PixelAttributes;

use crate::selection::Selection;

/// Longer text shown under the runout message.
pub const RUNOUT_DETAILS: [&str; 3] = [
    "This line represents the predicted flow direction of a landslide.",
    "It is calculated using the D8 flow direction algorithm, which follows the steepest downhill slope from a failure zone.",
    "Areas intersecting this path are at risk of being impacted even if they are not initiation zones.",
];

const MISSING: &str = "n/a";

#[derive(Debug, Clone, PartialEq)]
pub struct InspectorRow {
    pub label: &'static str,
    pub value: String,
}

impl InspectorRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InspectorView {
    Empty,
    VectorExplanation {
        message: String,
        details: &'static [&'static str],
    },
    RasterDetail {
        rows: Vec<InspectorRow>,
    },
}

impl InspectorView {
    pub fn project(selection: &Selection) -> Self {
        match selection {
            Selection::None => InspectorView::Empty,
            Selection::Vector { message } => InspectorView::VectorExplanation {
                message: message.clone(),
                details: &RUNOUT_DETAILS,
            },
            Selection::Raster(attrs) => InspectorView::RasterDetail {
                rows: raster_rows(attrs),
            },
        }
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            InspectorView::Empty => None,
            InspectorView::VectorExplanation { .. } => Some("Runout Path"),
            InspectorView::RasterDetail { .. } => Some("Selected Location"),
        }
    }

    /// Whether the "View 3D Terrain" action is available.
    pub fn offers_3d_view(&self) -> bool {
        matches!(self, InspectorView::RasterDetail { .. })
    }

    pub fn row(&self, label: &str) -> Option<&str> {
        match self {
            InspectorView::RasterDetail { rows } => rows
                .iter()
                .find(|r| r.label == label)
                .map(|r| r.value.as_str()),
            _ => None,
        }
    }
}

fn raster_rows(attrs: &PixelAttributes) -> Vec<InspectorRow> {
    let mut rows = vec![
        InspectorRow::new("Latitude", format!("{:.5}", attrs.point.lat)),
        InspectorRow::new("Longitude", format!("{:.5}", attrs.point.lon)),
        InspectorRow::new("Zone", attrs.zone.clone()),
        InspectorRow::new("Susceptibility", optional(attrs.susceptibility)),
        InspectorRow::new("Rainfall", format!("{} mm/hr", attrs.rainfall)),
        InspectorRow::new(
            "Overall Risk",
            attrs.risk_level.as_deref().unwrap_or(MISSING),
        ),
    ];
    // Historical fields only exist once the GSI raster covers the point.
    if let Some(h) = attrs.historical_susceptibility {
        rows.push(InspectorRow::new("Historical Susceptibility", h.to_string()));
    }
    if let Some(class) = &attrs.historical_risk_class {
        rows.push(InspectorRow::new("Historical Risk", class.clone()));
    }
    rows
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use foundation::GeoPoint;
    use lookup::PixelAttributes;
    use pretty_assertions::assert_eq;

    use super::InspectorView;
    use crate::selection::{RUNOUT_MESSAGE, Selection, SelectionState};

    #[test]
    fn none_projects_to_empty() {
        let view = InspectorView::project(&Selection::None);
        assert_eq!(view, InspectorView::Empty);
        assert!(!view.offers_3d_view());
        assert_eq!(view.title(), None);
    }

    #[test]
    fn vector_shows_explanation_without_3d_action() {
        let view = InspectorView::project(&Selection::runout());
        match &view {
            InspectorView::VectorExplanation { message, details } => {
                assert_eq!(message, RUNOUT_MESSAGE);
                assert!(details[1].contains("D8"));
            }
            other => panic!("unexpected view {other:?}"),
        }
        assert!(!view.offers_3d_view());
    }

    #[test]
    fn raster_after_vector_shows_detail_only() {
        let mut state = SelectionState::new();
        state.replace(Selection::runout());
        let mut attrs = PixelAttributes::uncovered(GeoPoint::new(12.5, 75.0));
        attrs.zone = "Failure".to_string();
        attrs.susceptibility = Some(0.91);
        attrs.risk_level = Some("High".to_string());
        state.replace(Selection::Raster(attrs));

        let view = InspectorView::project(state.current());
        assert_eq!(view.title(), Some("Selected Location"));
        assert!(view.offers_3d_view());
        assert_eq!(view.row("Zone"), Some("Failure"));
        assert_eq!(view.row("Susceptibility"), Some("0.91"));
        assert_eq!(view.row("Overall Risk"), Some("High"));
        assert_eq!(view.row("Historical Risk"), None);
    }

    #[test]
    fn uncovered_point_shows_defaults() {
        let attrs = PixelAttributes::uncovered(GeoPoint::new(0.0, 0.0));
        let view = InspectorView::project(&Selection::Raster(attrs));
        assert_eq!(view.row("Zone"), Some("Unknown"));
        assert_eq!(view.row("Susceptibility"), Some("n/a"));
        assert_eq!(view.row("Rainfall"), Some("0 mm/hr"));
        assert_eq!(view.row("Latitude"), Some("0.00000"));
    }
}
