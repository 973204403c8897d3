use formats::{RunoutFeature, RunoutFeatureSet};
use scene::Selection;
use tracing::{info, warn};

use crate::symbology::{RUNOUT_HIGHLIGHT_STROKE, RUNOUT_STROKE, StrokeStyle};

/// Progress of the one-shot dataset download.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    /// Permanent for the session; the layer draws nothing.
    Failed(String),
}

/// A feature ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RunoutDraw<'a> {
    pub index: usize,
    pub feature: &'a RunoutFeature,
    pub stroke: StrokeStyle,
    pub opacity: f64,
}

/// Interactive runout path overlay.
///
/// Ordering contract:
/// - `draw_list` yields features bottom to top.
/// - A hovered feature is moved to the top and stays there after the pointer
///   leaves; only its stroke is restored.
#[derive(Debug, Clone)]
pub struct RunoutLayer {
    state: LoadState,
    features: Option<RunoutFeatureSet>,
    stack: Vec<usize>,
    highlighted: Option<usize>,
}

impl Default for RunoutLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RunoutLayer {
    pub fn new() -> Self {
        Self {
            state: LoadState::Unloaded,
            features: None,
            stack: Vec::new(),
            highlighted: None,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn features(&self) -> Option<&RunoutFeatureSet> {
        self.features.as_ref()
    }

    /// Claims the single load attempt. Returns `false` if it was already taken.
    pub fn begin_load(&mut self) -> bool {
        if self.state != LoadState::Unloaded {
            return false;
        }
        self.state = LoadState::Loading;
        true
    }

    /// Stores the outcome of the load started by [`Self::begin_load`].
    /// Ignored unless a load is in progress.
    pub fn finish_load<E: std::fmt::Display>(&mut self, result: Result<RunoutFeatureSet, E>) {
        if self.state != LoadState::Loading {
            return;
        }
        match result {
            Ok(set) => {
                info!(
                    "loaded {} runout paths ({} skipped)",
                    set.len(),
                    set.skipped()
                );
                self.stack = (0..set.len()).collect();
                self.features = Some(set);
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!("runout paths unavailable for this session: {err}");
                self.state = LoadState::Failed(err.to_string());
            }
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.features.as_ref().is_some_and(|set| index < set.len())
    }

    /// Highlights `index` and raises it to the top. Returns `false` for an
    /// unknown feature.
    pub fn hover_enter(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.highlighted = Some(index);
        if let Some(pos) = self.stack.iter().position(|&i| i == index) {
            self.stack.remove(pos);
        }
        self.stack.push(index);
        true
    }

    pub fn hover_leave(&mut self, index: usize) -> bool {
        if self.highlighted != Some(index) {
            return false;
        }
        self.highlighted = None;
        true
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Selection produced by clicking a feature. No coordinate lookup happens.
    pub fn click(&self, index: usize) -> Option<Selection> {
        self.contains(index).then(Selection::runout)
    }

    pub fn stroke(&self, index: usize) -> StrokeStyle {
        if self.highlighted == Some(index) {
            RUNOUT_HIGHLIGHT_STROKE
        } else {
            RUNOUT_STROKE
        }
    }

    pub fn draw_list(&self, opacity: f64) -> Vec<RunoutDraw<'_>> {
        let Some(set) = &self.features else {
            return Vec::new();
        };
        self.stack
            .iter()
            .filter_map(|&index| {
                set.get(index).map(|feature| RunoutDraw {
                    index,
                    feature,
                    stroke: self.stroke(index),
                    opacity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use formats::RunoutFeatureSet;
    use pretty_assertions::assert_eq;
    use scene::{RUNOUT_MESSAGE, Selection};
    use serde_json::json;

    use super::{LoadState, RunoutLayer};
    use crate::symbology::{RUNOUT_HIGHLIGHT_STROKE, RUNOUT_STROKE};

    fn three_paths() -> RunoutFeatureSet {
        let line = |lon: f64| {
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[lon, 12.0], [lon, 11.9]]}
            })
        };
        RunoutFeatureSet::from_geojson_value(&json!({
            "type": "FeatureCollection",
            "features": [line(75.0), line(75.1), line(75.2)]
        }))
        .unwrap()
    }

    fn loaded() -> RunoutLayer {
        let mut layer = RunoutLayer::new();
        assert!(layer.begin_load());
        layer.finish_load::<String>(Ok(three_paths()));
        layer
    }

    fn order(layer: &RunoutLayer) -> Vec<usize> {
        layer.draw_list(1.0).iter().map(|d| d.index).collect()
    }

    #[test]
    fn unloaded_draws_nothing_and_ignores_interaction() {
        let mut layer = RunoutLayer::new();
        assert!(layer.draw_list(1.0).is_empty());
        assert!(!layer.hover_enter(0));
        assert_eq!(layer.click(0), None);
    }

    #[test]
    fn load_happens_once() {
        let mut layer = RunoutLayer::new();
        assert!(layer.begin_load());
        assert!(!layer.begin_load());
        layer.finish_load::<String>(Ok(three_paths()));
        assert_eq!(layer.load_state(), &LoadState::Loaded);
        assert!(!layer.begin_load());
        // A stray second result is ignored.
        layer.finish_load::<String>(Err("late".into()));
        assert_eq!(layer.load_state(), &LoadState::Loaded);
    }

    #[test]
    fn failure_is_permanent() {
        let mut layer = RunoutLayer::new();
        layer.begin_load();
        layer.finish_load::<String>(Err("HTTP 404".into()));
        assert_eq!(layer.load_state(), &LoadState::Failed("HTTP 404".into()));
        assert!(!layer.begin_load());
        assert!(layer.draw_list(1.0).is_empty());
    }

    #[test]
    fn hover_highlights_and_raises() {
        let mut layer = loaded();
        assert_eq!(order(&layer), vec![0, 1, 2]);

        assert!(layer.hover_enter(0));
        assert_eq!(order(&layer), vec![1, 2, 0]);
        let top = layer.draw_list(0.5).pop().unwrap();
        assert_eq!(top.stroke, RUNOUT_HIGHLIGHT_STROKE);
        assert_eq!(top.opacity, 0.5);

        assert!(layer.hover_leave(0));
        assert_eq!(order(&layer), vec![1, 2, 0]);
        assert!(layer.draw_list(1.0).iter().all(|d| d.stroke == RUNOUT_STROKE));
        assert!(!layer.hover_leave(0));
    }

    #[test]
    fn click_yields_vector_selection() {
        let layer = loaded();
        assert_eq!(
            layer.click(2),
            Some(Selection::Vector {
                message: RUNOUT_MESSAGE.to_string()
            })
        );
        assert_eq!(layer.click(3), None);
    }
}
