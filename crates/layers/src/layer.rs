use std::fmt;
use std::str::FromStr;

/// Every overlay the viewer knows about. The set is fixed at build time.
///
/// Declaration order is the stacking order above the base map (first drawn
/// first), so `ALL` doubles as the render order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Streets,
    SusceptibilityMl,
    SusceptibilityDl,
    HistoricalSusceptibility,
    HazardFused,
    Transit,
    Deposition,
    Runout,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Streets,
    Raster,
    Vector,
}

impl LayerId {
    pub const ALL: [LayerId; 8] = [
        LayerId::Streets,
        LayerId::SusceptibilityMl,
        LayerId::SusceptibilityDl,
        LayerId::HistoricalSusceptibility,
        LayerId::HazardFused,
        LayerId::Transit,
        LayerId::Deposition,
        LayerId::Runout,
    ];

    /// Stable key used by UI state and the CLI.
    pub const fn key(self) -> &'static str {
        match self {
            LayerId::SusceptibilityMl => "susceptibilityML",
            LayerId::SusceptibilityDl => "susceptibilityDL",
            LayerId::HistoricalSusceptibility => "historicalSusceptibility",
            LayerId::HazardFused => "hazardFused",
            LayerId::Transit => "transit",
            LayerId::Deposition => "deposition",
            LayerId::Runout => "runout",
            LayerId::Streets => "streets",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LayerId::SusceptibilityMl => "ML Susceptibility",
            LayerId::SusceptibilityDl => "DL Refined Susceptibility",
            LayerId::HistoricalSusceptibility => "Historical Susceptibility (GSI)",
            LayerId::HazardFused => "Final Hazard Map",
            LayerId::Transit => "Transit Zone",
            LayerId::Deposition => "Deposition Zone",
            LayerId::Runout => "Runout Paths",
            LayerId::Streets => "Streets",
        }
    }

    pub const fn kind(self) -> LayerKind {
        match self {
            LayerId::Streets => LayerKind::Streets,
            LayerId::Runout => LayerKind::Vector,
            _ => LayerKind::Raster,
        }
    }

    /// Backend tile directory for raster layers.
    pub const fn tile_slug(self) -> Option<&'static str> {
        match self {
            LayerId::SusceptibilityMl => Some("susceptibility_ml"),
            LayerId::SusceptibilityDl => Some("susceptibility_dl"),
            LayerId::HistoricalSusceptibility => Some("historical_susceptibility"),
            LayerId::HazardFused => Some("hazard_fused"),
            LayerId::Transit => Some("transit"),
            LayerId::Deposition => Some("deposition"),
            LayerId::Runout | LayerId::Streets => None,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer `{0}`")]
pub struct UnknownLayer(pub String);

impl FromStr for LayerId {
    type Err = UnknownLayer;

    /// Accepts the key or the tile slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        LayerId::ALL
            .into_iter()
            .find(|id| {
                id.key().eq_ignore_ascii_case(needle)
                    || id
                        .tile_slug()
                        .is_some_and(|slug| slug.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerId, LayerKind};

    #[test]
    fn parses_keys_and_slugs() {
        assert_eq!("hazardFused".parse::<LayerId>(), Ok(LayerId::HazardFused));
        assert_eq!("HAZARD_FUSED".parse::<LayerId>(), Ok(LayerId::HazardFused));
        assert_eq!("susceptibilityml".parse::<LayerId>(), Ok(LayerId::SusceptibilityMl));
        assert_eq!(" runout ".parse::<LayerId>(), Ok(LayerId::Runout));
        assert!("lava".parse::<LayerId>().is_err());
    }

    #[test]
    fn keys_round_trip_through_display() {
        for id in LayerId::ALL {
            assert_eq!(id.to_string().parse::<LayerId>(), Ok(id));
        }
    }

    #[test]
    fn only_rasters_have_slugs() {
        for id in LayerId::ALL {
            assert_eq!(id.tile_slug().is_some(), id.kind() == LayerKind::Raster);
        }
    }

    #[test]
    fn index_matches_all_order() {
        for (i, id) in LayerId::ALL.into_iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }
}
