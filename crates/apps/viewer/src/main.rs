use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use foundation::GeoPoint;
use layers::LayerId;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use viewer3d::ViewerPhase;

use slipsense::headless::HeadlessTerrain;
use slipsense::{AppError, MapApp, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Landslide hazard map viewer")]
struct Args {
    /// Hazard backend base URL (default: $SLIPSENSE_BACKEND_URL or http://localhost:8000)
    #[arg(long)]
    backend_url: Option<String>,

    /// Hover quiet period in milliseconds
    #[arg(long)]
    hover_debounce_ms: Option<u64>,

    /// Print the state as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Toggle layers and set opacities, then print the layer stack
    Layers {
        #[arg(long)]
        show: Vec<LayerId>,

        #[arg(long)]
        hide: Vec<LayerId>,

        /// Flip visibility, applied after --show and --hide
        #[arg(long)]
        toggle: Vec<LayerId>,

        /// LAYER=VALUE, e.g. hazardFused=0.5
        #[arg(long, value_parser = parse_opacity)]
        opacity: Vec<(LayerId, f64)>,
    },

    /// Inspect a point as if it was clicked
    Click {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Replay a pointer path through the hover debouncer
    Hover {
        /// Points as "lat,lon;lat,lon;..."
        #[arg(long, allow_hyphen_values = true)]
        path: String,

        /// Delay between pointer moves
        #[arg(long, default_value_t = 50)]
        interval_ms: u64,
    },

    /// Load runout paths and interact with one
    Runout {
        #[arg(long)]
        hover: Option<usize>,

        /// Move the pointer off the hovered path again
        #[arg(long, requires = "hover")]
        leave: bool,

        #[arg(long)]
        click: Option<usize>,
    },

    /// Select a point and open the 3D terrain view on it
    View3d {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Skip the photorealistic tileset
        #[arg(long)]
        no_photoreal: bool,
    },
}

fn parse_opacity(raw: &str) -> Result<(LayerId, f64), String> {
    let (layer, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LAYER=VALUE, got `{raw}`"))?;
    let layer = layer.parse::<LayerId>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad opacity `{value}`: {e}"))?;
    Ok((layer, value))
}

fn parse_path(raw: &str) -> Result<Vec<GeoPoint>, AppError> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<GeoPoint>().map_err(AppError::InvalidPath))
        .collect()
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ViewerConfig::from_env();
    if let Some(url) = args.backend_url.clone() {
        config.backend_url = url;
    }
    if let Some(ms) = args.hover_debounce_ms {
        config.hover_quiet = Duration::from_millis(ms);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: ViewerConfig) -> Result<(), AppError> {
    let photoreal = !matches!(
        args.command,
        Command::View3d {
            no_photoreal: true,
            ..
        }
    );
    let app = MapApp::new(&config, Arc::new(HeadlessTerrain::new(photoreal)));
    info!("backend {}", config.backend_url);

    match args.command {
        Command::Layers {
            show,
            hide,
            toggle,
            opacity,
        } => {
            for id in show {
                app.set_layer_visible(id, true);
            }
            for id in hide {
                app.set_layer_visible(id, false);
            }
            for id in toggle {
                app.toggle_layer(id);
            }
            for (id, value) in opacity {
                app.set_layer_opacity(id, value)?;
            }
        }
        Command::Click { lat, lon } => {
            app.click(GeoPoint::try_new(lat, lon)?).await;
        }
        Command::Hover { path, interval_ms } => {
            let points = parse_path(&path)?;
            for point in points {
                app.hover_move(point);
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }
            app.hover_settle().await;
            info!(
                "{} hover lookup(s) sent, {} superseded",
                app.hover_lookups_fired(),
                app.hover_results_discarded()
            );
        }
        Command::Runout {
            hover,
            leave,
            click,
        } => {
            app.load_runout().await;
            if let Some(i) = hover {
                app.runout_hover_enter(i);
                if leave {
                    app.runout_hover_leave(i);
                }
            }
            if let Some(i) = click {
                if !app.runout_click(i) {
                    info!("no runout path #{i}");
                }
            }
        }
        Command::View3d { lat, lon, .. } => {
            app.click(GeoPoint::try_new(lat, lon)?).await;
            app.open_3d_view().await?;
            let mut status = app.watch_viewer();
            while status.borrow_and_update().phase == ViewerPhase::Opening {
                if status.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&app.render_json())?);
    } else {
        print!("{}", app.render_text());
    }

    app.close_3d_view().await;
    for event in app.take_events() {
        debug!("#{} {:?}: {}", event.revision, event.kind, event.message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use foundation::{GeoPoint, GeoPointError};
    use layers::LayerId;

    use super::{Args, Command, parse_opacity, parse_path, run};
    use slipsense::{AppError, ViewerConfig};

    #[test]
    fn opacity_pairs_parse() {
        assert_eq!(parse_opacity("hazard_fused=0.5"), Ok((LayerId::HazardFused, 0.5)));
        assert!(parse_opacity("hazard_fused").is_err());
        assert!(parse_opacity("nope=1").is_err());
    }

    #[test]
    fn path_parses_points() {
        let path = parse_path("12.5,75.0; 12.51,75.02;").unwrap();
        assert_eq!(path, vec![GeoPoint::new(12.5, 75.0), GeoPoint::new(12.51, 75.02)]);
        assert!(parse_path("12.5").is_err());
    }

    #[test]
    fn cli_parses_layer_flags() {
        let args = Args::try_parse_from([
            "slipsense",
            "layers",
            "--show",
            "streets",
            "--hide",
            "runout",
            "--toggle",
            "deposition",
            "--opacity",
            "transit=0.3",
        ])
        .unwrap();
        match args.command {
            Command::Layers {
                show,
                hide,
                toggle,
                opacity,
            } => {
                assert_eq!(show, vec![LayerId::Streets]);
                assert_eq!(hide, vec![LayerId::Runout]);
                assert_eq!(toggle, vec![LayerId::Deposition]);
                assert_eq!(opacity, vec![(LayerId::Transit, 0.3)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_coordinates_are_accepted() {
        let args =
            Args::try_parse_from(["slipsense", "click", "--lat", "-8.5", "--lon", "-70"]).unwrap();
        assert!(matches!(args.command, Command::Click { lat, lon } if lat == -8.5 && lon == -70.0));
    }

    #[test]
    fn leave_needs_a_hovered_path() {
        assert!(Args::try_parse_from(["slipsense", "runout", "--leave"]).is_err());
        assert!(Args::try_parse_from(["slipsense", "runout", "--hover", "0", "--leave"]).is_ok());
    }

    #[tokio::test]
    async fn out_of_range_click_is_rejected() {
        let args =
            Args::try_parse_from(["slipsense", "click", "--lat", "95", "--lon", "75"]).unwrap();
        let result = run(args, ViewerConfig::default()).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidPoint(GeoPointError::Latitude(lat))) if lat == 95.0
        ));

        let args =
            Args::try_parse_from(["slipsense", "view3d", "--lat", "12.5", "--lon", "200"]).unwrap();
        let result = run(args, ViewerConfig::default()).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidPoint(GeoPointError::Longitude(_)))
        ));
    }
}
