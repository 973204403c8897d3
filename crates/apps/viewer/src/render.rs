//! Pure projections of the viewer state: a text panel for the terminal and a
//! JSON document for scripting. Neither keeps any state of its own.

use std::fmt::Write as _;

use layers::{
    DrawItem, HAZARD_LEGEND, LayerComposition, LegendSwatch, LoadState, RunoutLayer,
};
use lookup::{TileCoord, TileEndpoints, WeatherSnapshot};
use runtime::HoverInfo;
use scene::{InspectorView, Selection};
use serde_json::{Value, json};
use viewer3d::{ContextId, ViewerPhase, ViewerStatus};

use crate::config::{INITIAL_CENTER, INITIAL_ZOOM};

pub struct Frame<'a> {
    pub layers: &'a LayerComposition,
    pub selection: &'a Selection,
    pub weather: Option<&'a WeatherSnapshot>,
    pub runout: &'a RunoutLayer,
    pub hover: Option<&'a HoverInfo>,
    pub viewer: &'a ViewerStatus,
    pub viewer_context: Option<ContextId>,
    pub endpoints: &'a TileEndpoints,
}

pub fn render_text(frame: &Frame<'_>) -> String {
    let mut out = String::new();
    let (lat, lon) = INITIAL_CENTER;
    let center = TileCoord::containing(foundation::GeoPoint::new(lat, lon), INITIAL_ZOOM);
    let _ = writeln!(
        out,
        "View: ({lat}, {lon}) z{INITIAL_ZOOM}, centre tile {}/{}/{}",
        center.z, center.x, center.y
    );

    out.push_str("\nLayers (bottom to top):\n");
    for item in frame.layers.render_plan(frame.endpoints) {
        let _ = match item {
            DrawItem::BaseMap { template } => writeln!(out, "  base map      {template}"),
            DrawItem::Tiles {
                layer,
                template,
                opacity,
            } => writeln!(out, "  {:<13} {template} @ {opacity:.2}", layer.key()),
            DrawItem::Runout { opacity } => writeln!(
                out,
                "  {:<13} {} features @ {opacity:.2}",
                "runout",
                frame.runout.draw_list(opacity).len()
            ),
        };
    }
    let hidden: Vec<&str> = frame
        .layers
        .render_order()
        .into_iter()
        .filter(|(_, state)| !state.visible)
        .map(|(id, _)| id.key())
        .collect();
    if !hidden.is_empty() {
        let _ = writeln!(out, "  hidden: {}", hidden.join(", "));
    }

    out.push_str("\nLegend:\n");
    for entry in HAZARD_LEGEND {
        let swatch = match entry.swatch {
            LegendSwatch::Solid(c) => c.to_string(),
            LegendSwatch::Gradient(from, to) => format!("{from}..{to}"),
        };
        let _ = writeln!(out, "  {swatch:<16} {}", entry.label);
    }

    let _ = writeln!(out, "\nRunout: {}", runout_summary(frame.runout));

    out.push('\n');
    let view = InspectorView::project(frame.selection);
    match &view {
        InspectorView::Empty => out.push_str("Inspector: click the map to inspect a point\n"),
        InspectorView::VectorExplanation { message, details } => {
            let _ = writeln!(out, "Inspector: {}", view.title().unwrap_or_default());
            let _ = writeln!(out, "  {message}");
            for line in details.iter() {
                let _ = writeln!(out, "  {line}");
            }
        }
        InspectorView::RasterDetail { rows } => {
            let _ = writeln!(out, "Inspector: {}", view.title().unwrap_or_default());
            for row in rows {
                let _ = writeln!(out, "  {}: {}", row.label, row.value);
            }
            out.push_str("  [View 3D Terrain]\n");
        }
    }

    match frame.weather {
        Some(w) => {
            let _ = writeln!(out, "Weather: {}", weather_line(w));
        }
        None => out.push_str("Weather: --\n"),
    }

    if let Some(hover) = frame.hover {
        let a = &hover.attributes;
        let _ = writeln!(
            out,
            "Hover {}: {} / susceptibility {}",
            hover.pointer,
            a.zone,
            a.susceptibility
                .map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"))
        );
    }

    let _ = writeln!(
        out,
        "3D view: {}",
        viewer_line(frame.viewer, frame.viewer_context)
    );
    out
}

fn runout_summary(layer: &RunoutLayer) -> String {
    match layer.load_state() {
        LoadState::Unloaded => "not loaded".to_string(),
        LoadState::Loading => "loading".to_string(),
        LoadState::Failed(reason) => format!("unavailable ({reason})"),
        LoadState::Loaded => {
            let count = layer.features().map_or(0, |set| set.len());
            match layer.highlighted() {
                Some(i) => format!("{count} paths, #{i} highlighted"),
                None => format!("{count} paths"),
            }
        }
    }
}

fn weather_line(w: &WeatherSnapshot) -> String {
    let mut parts = Vec::new();
    match (w.temperature, w.description.as_deref()) {
        (Some(t), Some(d)) => parts.push(format!("{t} °C, {d}")),
        (Some(t), None) => parts.push(format!("{t} °C")),
        (None, Some(d)) => parts.push(d.to_string()),
        (None, None) => {}
    }
    if let Some(h) = w.humidity {
        parts.push(format!("humidity {h}%"));
    }
    if let Some(s) = w.wind_speed {
        parts.push(format!("wind {s} m/s"));
    }
    parts.push(format!("rain {} mm/h", w.rainfall_last_hour));
    parts.join(", ")
}

fn viewer_line(status: &ViewerStatus, context: Option<ContextId>) -> String {
    let mut line = match (status.phase, status.bound_point) {
        (ViewerPhase::Closed, _) => "closed".to_string(),
        (ViewerPhase::Opening, Some(p)) => format!("opening at {p}"),
        (ViewerPhase::Open, Some(p)) => format!("open at {p}"),
        (phase, None) => format!("{phase:?}").to_lowercase(),
    };
    if let Some(context) = context {
        let _ = write!(line, " on {context}");
    }
    if status.degraded {
        line.push_str(" (base terrain only)");
    }
    if let Some(err) = &status.last_error {
        let _ = write!(line, " [last error: {err}]");
    }
    line
}

pub fn render_json(frame: &Frame<'_>) -> Value {
    let layers: Vec<Value> = frame
        .layers
        .render_order()
        .into_iter()
        .map(|(id, state)| {
            json!({
                "key": id.key(),
                "label": id.label(),
                "visible": state.visible,
                "opacity": state.opacity,
            })
        })
        .collect();

    let opacity = frame.layers.state(layers::LayerId::Runout).opacity;
    let draw: Vec<Value> = frame
        .runout
        .draw_list(opacity)
        .iter()
        .map(|d| {
            json!({
                "index": d.index,
                "id": d.feature.id,
                "color": d.stroke.color,
                "weight": d.stroke.weight,
                "vertices": d.feature.vertex_count(),
            })
        })
        .collect();

    let selection = match frame.selection {
        Selection::None => Value::Null,
        Selection::Raster(attrs) => json!({"kind": "raster", "attributes": attrs}),
        Selection::Vector { message } => json!({"kind": "vector", "message": message}),
    };

    json!({
        "layers": layers,
        "runout": {
            "state": runout_summary(frame.runout),
            "bounds": frame.runout.features().and_then(|set| set.bounds()),
            "draw": draw,
        },
        "selection": selection,
        "weather": frame.weather.map(|w| json!({
            "snapshot": w,
            "icon_url": w.icon_url(),
        })),
        "hover": frame.hover.map(|h| json!({"pointer": h.pointer, "attributes": h.attributes})),
        "viewer": {
            "phase": format!("{:?}", frame.viewer.phase),
            "bound_point": frame.viewer.bound_point,
            "context": frame.viewer_context.map(|id| id.to_string()),
            "degraded": frame.viewer.degraded,
            "last_error": frame.viewer.last_error,
        },
    })
}
