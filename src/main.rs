use anyhow::{Context, Result};
use routeplay::config::PlayerConfig;
use routeplay::input::load_file;
use routeplay::playback::{self, PlaybackEngine, PlaybackSnapshot, TokioClock};
use routeplay::provider::{fetch_and_load, OsrmProvider};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = PlayerConfig::load();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create tokio runtime for the playback task and routing requests
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(config, std::env::args().nth(1)))
}

fn finished(snapshot: &PlaybackSnapshot) -> bool {
    !snapshot.is_playing && snapshot.current_index == snapshot.max_index
}

async fn run(config: PlayerConfig, route_file: Option<String>) -> Result<()> {
    let spacing = config.synthetic_spacing();
    let mut engine = PlaybackEngine::with_clock(TokioClock);

    match route_file {
        Some(path) => {
            let route = load_file(&path, spacing)?;
            info!("Loaded {} waypoints from {}", route.len(), path);
            engine.load_route(route);
        }
        None => {
            let provider = OsrmProvider::new(&config.osrm_base_url, spacing);
            fetch_and_load(&provider, &mut engine, config.origin, config.destination)
                .await
                .context("No route available")?;
        }
    }

    let (mut handle, task) = playback::spawn(engine);
    handle.play().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut done = true;
    if let Some(snapshot) = handle.snapshot() {
        println!("{}", snapshot.status_line());
        // A single-waypoint route has nowhere to go
        done = finished(&snapshot);
    }

    while !done {
        tokio::select! {
            changed = handle.changed() => match changed {
                Some(snapshot) => {
                    println!("{}", snapshot.status_line());
                    done = finished(&snapshot);
                }
                None => done = true,
            },
            _ = &mut ctrl_c => {
                info!("Interrupted");
                done = true;
            }
        }
    }

    handle.shutdown().await;
    task.await.context("Playback task panicked")?;
    Ok(())
}
