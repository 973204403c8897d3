//! Which layers are drawn, how opaque, and in what order.

use lookup::{TileEndpoints, TileTemplate};
use tracing::debug;

use crate::layer::{LayerId, LayerKind};
use crate::raster::RasterLayer;
use crate::symbology::LayerState;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("opacity for {layer} must be a number, got {value}")]
pub struct InvalidOpacity {
    pub layer: LayerId,
    pub value: f64,
}

/// One entry of the concrete draw list, bottom to top.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    BaseMap { template: TileTemplate },
    Tiles {
        layer: LayerId,
        template: TileTemplate,
        opacity: f64,
    },
    Runout { opacity: f64 },
}

/// Per-layer toggles and opacities.
///
/// Every [`LayerId`] always has a state. Visibility and opacity are
/// independent: hiding a layer keeps its opacity for when it comes back.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerComposition {
    states: [LayerState; LayerId::ALL.len()],
}

impl Default for LayerComposition {
    fn default() -> Self {
        Self {
            states: LayerId::ALL.map(LayerState::initial),
        }
    }
}

impl LayerComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: LayerId) -> LayerState {
        self.states[id.index()]
    }

    /// Returns `true` if visibility changed.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        let state = &mut self.states[id.index()];
        let changed = state.visible != visible;
        state.visible = visible;
        changed
    }

    /// Flips visibility and returns the new value.
    pub fn toggle(&mut self, id: LayerId) -> bool {
        let state = &mut self.states[id.index()];
        state.visible = !state.visible;
        state.visible
    }

    /// Sets opacity, clamped to [0, 1]. Returns the stored value.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> Result<f64, InvalidOpacity> {
        if opacity.is_nan() {
            return Err(InvalidOpacity {
                layer: id,
                value: opacity,
            });
        }
        let clamped = opacity.clamp(0.0, 1.0);
        if clamped != opacity {
            debug!("clamped {id} opacity {opacity} to {clamped}");
        }
        self.states[id.index()].opacity = clamped;
        Ok(clamped)
    }

    /// All layers in stacking order, visible or not.
    pub fn render_order(&self) -> Vec<(LayerId, LayerState)> {
        LayerId::ALL
            .into_iter()
            .map(|id| (id, self.state(id)))
            .collect()
    }

    pub fn visible_layers(&self) -> Vec<LayerId> {
        LayerId::ALL
            .into_iter()
            .filter(|id| self.state(*id).visible)
            .collect()
    }

    /// The base map followed by every visible layer, bottom to top.
    pub fn render_plan(&self, endpoints: &TileEndpoints) -> Vec<DrawItem> {
        let mut plan = vec![DrawItem::BaseMap {
            template: endpoints.basemap.clone(),
        }];
        for id in self.visible_layers() {
            let opacity = self.state(id).opacity;
            match id.kind() {
                LayerKind::Streets => plan.push(DrawItem::Tiles {
                    layer: id,
                    template: endpoints.streets.clone(),
                    opacity,
                }),
                LayerKind::Raster => {
                    if let Some(raster) = RasterLayer::for_layer(id, endpoints) {
                        plan.push(DrawItem::Tiles {
                            layer: raster.id(),
                            template: raster.template,
                            opacity,
                        });
                    }
                }
                LayerKind::Vector => plan.push(DrawItem::Runout { opacity }),
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use lookup::TileEndpoints;
    use pretty_assertions::assert_eq;

    use super::{DrawItem, LayerComposition};
    use crate::layer::LayerId;
    use crate::symbology::LayerState;

    #[test]
    fn initial_states() {
        let c = LayerComposition::new();
        assert_eq!(c.state(LayerId::SusceptibilityMl), LayerState::new(false, 0.6));
        assert_eq!(c.state(LayerId::HazardFused), LayerState::new(true, 0.8));
        assert_eq!(
            c.visible_layers(),
            vec![LayerId::SusceptibilityDl, LayerId::HazardFused, LayerId::Runout]
        );
    }

    #[test]
    fn opacity_clamps_and_survives_toggles() {
        let mut c = LayerComposition::new();
        assert_eq!(c.set_opacity(LayerId::HazardFused, 1.5), Ok(1.0));
        assert!(!c.toggle(LayerId::HazardFused));
        assert!(c.toggle(LayerId::HazardFused));
        assert_eq!(c.state(LayerId::HazardFused).opacity, 1.0);

        assert_eq!(c.set_opacity(LayerId::Transit, -0.2), Ok(0.0));
        assert_eq!(c.state(LayerId::Transit).opacity, 0.0);
    }

    #[test]
    fn nan_opacity_leaves_state_alone() {
        let mut c = LayerComposition::new();
        let before = c.state(LayerId::Deposition);
        assert!(c.set_opacity(LayerId::Deposition, f64::NAN).is_err());
        assert_eq!(c.state(LayerId::Deposition), before);
    }

    #[test]
    fn visibility_does_not_touch_opacity() {
        let mut c = LayerComposition::new();
        c.set_opacity(LayerId::Streets, 0.25).unwrap();
        assert!(c.set_visible(LayerId::Streets, true));
        assert!(!c.set_visible(LayerId::Streets, true));
        assert_eq!(c.state(LayerId::Streets), LayerState::new(true, 0.25));
    }

    #[test]
    fn render_order_is_fixed() {
        let mut c = LayerComposition::new();
        c.toggle(LayerId::Runout);
        c.toggle(LayerId::Streets);
        let order: Vec<LayerId> = c.render_order().into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, LayerId::ALL.to_vec());
    }

    #[test]
    fn plan_puts_base_first_and_runout_last() {
        let mut c = LayerComposition::new();
        c.set_visible(LayerId::Streets, true);
        let endpoints = TileEndpoints::new("http://h");
        let plan = c.render_plan(&endpoints);

        assert!(matches!(plan[0], DrawItem::BaseMap { .. }));
        assert!(matches!(
            plan[1],
            DrawItem::Tiles {
                layer: LayerId::Streets,
                ..
            }
        ));
        match &plan[2] {
            DrawItem::Tiles {
                layer,
                template,
                opacity,
            } => {
                assert_eq!(*layer, LayerId::SusceptibilityDl);
                assert_eq!(template.as_str(), "http://h/tiles/susceptibility_dl/{z}/{x}/{y}.png");
                assert_eq!(*opacity, 0.7);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(plan.last(), Some(&DrawItem::Runout { opacity: 1.0 }));
        assert_eq!(plan.len(), 5);
    }
}
