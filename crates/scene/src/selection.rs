use foundation::GeoPoint;
use lookup::PixelAttributes;

/// Shown when a runout path is clicked. Runout geometry is not a queryable
/// raster point, so no lookup is made.
pub const RUNOUT_MESSAGE: &str = "Runout path shows the predicted downhill movement of landslide material based on terrain slope and flow direction.";

/// What the user last picked on the map.
///
/// Exactly one variant is active. A new interaction replaces the whole value;
/// nothing carries over from the previous variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Raster(PixelAttributes),
    Vector { message: String },
}

impl Selection {
    pub fn runout() -> Self {
        Selection::Vector {
            message: RUNOUT_MESSAGE.to_string(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// The point a 3D view may be opened at. Only raster selections have one.
    pub fn raster_point(&self) -> Option<GeoPoint> {
        match self {
            Selection::Raster(attrs) => Some(attrs.point),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Selection::None => "none",
            Selection::Raster(_) => "raster",
            Selection::Vector { .. } => "vector",
        }
    }
}

/// Owner of the current [`Selection`].
///
/// Transition contract:
/// - `replace` always succeeds, whatever the prior variant.
/// - `revision` increments once per replacement, including `clear`.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: Selection,
    revision: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection and returns the previous one.
    pub fn replace(&mut self, next: Selection) -> Selection {
        self.revision += 1;
        std::mem::replace(&mut self.current, next)
    }

    pub fn clear(&mut self) -> Selection {
        self.replace(Selection::None)
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use foundation::GeoPoint;
    use lookup::PixelAttributes;

    use super::{Selection, SelectionState};

    fn raster() -> Selection {
        let mut attrs = PixelAttributes::uncovered(GeoPoint::new(12.5, 75.0));
        attrs.zone = "Failure".to_string();
        Selection::Raster(attrs)
    }

    #[test]
    fn starts_empty() {
        let state = SelectionState::new();
        assert!(state.current().is_none());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn raster_replaces_vector_entirely() {
        let mut state = SelectionState::new();
        state.replace(Selection::runout());
        let prev = state.replace(raster());
        assert_eq!(prev.kind(), "vector");
        assert_eq!(state.current(), &raster());
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn vector_replaces_raster_and_drops_point() {
        let mut state = SelectionState::new();
        state.replace(raster());
        assert_eq!(
            state.current().raster_point(),
            Some(GeoPoint::new(12.5, 75.0))
        );
        state.replace(Selection::runout());
        assert_eq!(state.current().raster_point(), None);
    }

    #[test]
    fn clear_is_a_replacement() {
        let mut state = SelectionState::new();
        state.replace(raster());
        let prev = state.clear();
        assert_eq!(prev.kind(), "raster");
        assert!(state.current().is_none());
        assert_eq!(state.revision(), 2);
    }
}
