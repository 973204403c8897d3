use crate::layer::LayerId;

/// Visibility and opacity of one layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerState {
    pub visible: bool,
    /// Always within [0, 1].
    pub opacity: f64,
}

impl LayerState {
    pub const fn new(visible: bool, opacity: f64) -> Self {
        Self { visible, opacity }
    }

    /// Start-up state of each layer.
    pub const fn initial(id: LayerId) -> Self {
        match id {
            LayerId::SusceptibilityMl => Self::new(false, 0.6),
            LayerId::SusceptibilityDl => Self::new(true, 0.7),
            LayerId::HistoricalSusceptibility => Self::new(false, 0.7),
            LayerId::HazardFused => Self::new(true, 0.8),
            LayerId::Transit => Self::new(false, 0.7),
            LayerId::Deposition => Self::new(false, 0.7),
            LayerId::Runout => Self::new(true, 1.0),
            LayerId::Streets => Self::new(false, 1.0),
        }
    }
}

/// Polyline stroke.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: &'static str,
    pub weight: u8,
}

impl StrokeStyle {
    pub const fn new(color: &'static str, weight: u8) -> Self {
        Self { color, weight }
    }
}

pub const RUNOUT_STROKE: StrokeStyle = StrokeStyle::new("#00ffff", 2);
pub const RUNOUT_HIGHLIGHT_STROKE: StrokeStyle = StrokeStyle::new("#ff0000", 4);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LegendSwatch {
    Solid(&'static str),
    Gradient(&'static str, &'static str),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub swatch: LegendSwatch,
}

// Colours match the backend's hazard_fused colorizer.
pub const HAZARD_LEGEND: [LegendEntry; 4] = [
    LegendEntry {
        label: "Failure Zone (Initiation)",
        swatch: LegendSwatch::Solid("#dc2626"),
    },
    LegendEntry {
        label: "Transit Zone (Movement)",
        swatch: LegendSwatch::Solid("#ffa500"),
    },
    LegendEntry {
        label: "Deposition Zone (Accumulation)",
        swatch: LegendSwatch::Solid("#ffff00"),
    },
    LegendEntry {
        label: "Susceptibility (Low → High)",
        swatch: LegendSwatch::Gradient("#008000", "#ff0000"),
    },
];
