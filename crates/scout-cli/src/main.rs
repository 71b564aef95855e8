//! scout - plan survey routes and fly simulated missions from the terminal.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scout_core::models::{Coordinate, Waypoint};
use scout_core::{optimizer, terrain};
use scout_client::{AuthClient, ElevationClient, RoutesClient};
use scout_sim::{MissionOutcome, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "scout", about = "Survey route planning and mission simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order waypoints from a file into a closed survey tour.
    Plan {
        /// JSON file with an array of {lat, lng, alt?} coordinates.
        #[arg(long)]
        file: PathBuf,
    },
    /// Sample a terrain transect and print the altitude recommendation.
    Transect {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        /// Samples on each side of the center.
        #[arg(long, default_value_t = 20)]
        samples: usize,
        #[arg(long, default_value_t = 5.0)]
        radius_km: f64,
    },
    /// List routes saved on the server.
    Routes,
    /// Register and fly a simulated mission over waypoints from a file.
    Fly {
        /// JSON file with an array of {lat, lng, alt?} coordinates.
        #[arg(long)]
        file: PathBuf,
        /// Route name for the save; a temporary name is generated otherwise.
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scout_cli=info".parse()?)
                .add_directive("scout_sim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Plan { file } => plan(&file),
        Commands::Transect {
            lat,
            lon,
            samples,
            radius_km,
        } => transect(&config, lat, lon, samples, radius_km).await,
        Commands::Routes => list_routes(&config).await,
        Commands::Fly { file, name } => fly(&config, &file, name).await,
    }
}

fn read_coordinates(file: &PathBuf) -> Result<Vec<Coordinate>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading waypoints from {}", file.display()))?;
    let coords: Vec<Coordinate> = serde_json::from_str(&raw).context("parsing waypoint file")?;
    Ok(coords)
}

fn plan(file: &PathBuf) -> Result<()> {
    let coords = read_coordinates(file)?;
    let mut waypoints: Vec<Waypoint> = coords
        .into_iter()
        .enumerate()
        .map(|(id, coord)| Waypoint::new(id, coord))
        .collect();

    optimizer::optimize(&mut waypoints);

    for wp in &waypoints {
        println!("{:>3}  {:.6}, {:.6}", wp.id, wp.coord.lat, wp.coord.lon);
    }
    println!(
        "closed tour: {} waypoints, {:.0} m",
        waypoints.len(),
        optimizer::tour_length(&waypoints)
    );
    Ok(())
}

async fn transect(
    config: &Config,
    lat: f64,
    lon: f64,
    samples: usize,
    radius_km: f64,
) -> Result<()> {
    let client = ElevationClient::new(config.elevation_url.clone());
    let points = terrain::sample_transect(Coordinate::new(lat, lon), samples, radius_km);
    let profile = client
        .fetch_profile(points)
        .await
        .context("fetching elevation profile")?;

    let bands = terrain::recommend_altitude(&profile.elevations())?;
    let slider = bands.slider();

    println!("clearance floor: {:.1} m", bands.min_clearance_m);
    println!("recommended:     {:.1} m", bands.recommended_m);
    println!("safe:            {:.1} m", bands.safe_m);
    println!(
        "slider: {:.1}..{:.1} m, default {:.1}, step {:.1}",
        slider.min_m, slider.max_m, slider.default_m, slider.step_m
    );
    Ok(())
}

async fn authed_routes_client(config: &Config) -> Result<RoutesClient> {
    let mut routes = RoutesClient::new(config.api_url.clone());

    // A pre-issued token skips the login round-trip entirely.
    if let Some(token) = &config.auth_token {
        routes.set_auth_token(Some(token.clone()));
        return Ok(routes);
    }

    let auth = AuthClient::new(config.api_url.clone());
    let token = auth
        .login(&config.username, &config.password)
        .await
        .context("logging in")?;
    routes.set_auth_token(Some(token));
    Ok(routes)
}

async fn list_routes(config: &Config) -> Result<()> {
    let client = authed_routes_client(config).await?;
    let routes = client.list_routes().await.context("listing routes")?;
    if routes.is_empty() {
        println!("no saved routes");
        return Ok(());
    }
    for route in routes {
        println!(
            "{}  {} ({} waypoints)",
            route.id.as_deref().unwrap_or("-"),
            route.name,
            route.waypoints.len()
        );
    }
    Ok(())
}

async fn fly(config: &Config, file: &PathBuf, name: Option<String>) -> Result<()> {
    let coords = read_coordinates(file)?;
    if coords.is_empty() {
        bail!("no waypoints defined for mission");
    }

    let mut session = Session::new(config.sim_config());
    for coord in coords {
        session.add_waypoint(coord);
    }

    // Register the mission before any simulation state changes; an unsaved
    // route is saved under a throwaway name first so the server has an id
    // to register against.
    let client = authed_routes_client(config).await?;
    let name =
        name.unwrap_or_else(|| format!("Temporary_{}", chrono::Utc::now().to_rfc3339()));
    let mut route = session.store().route().clone();
    route.name = name;
    let saved = client.save_route(&route).await.context("saving route")?;
    let route_id = saved
        .id
        .clone()
        .context("server did not assign a route id")?;
    session
        .store_mut()
        .mark_persisted(route_id.clone(), saved.name.clone());

    client
        .start_mission(&route_id)
        .await
        .context("registering mission start")?;

    let handle = session
        .start_mission()
        .context("starting mission simulation")?;

    // Ctrl-C cancels cooperatively; the simulator stops at the next frame.
    let sim = Arc::clone(session.simulator());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sim.cancel();
        }
    });

    let mut frames = session.simulator().subscribe();
    let printer = tokio::spawn(async move {
        let mut count = 0u64;
        while let Ok(frame) = frames.recv().await {
            count += 1;
            // One readout per second at the default frame rate.
            if count % 60 == 0 || frame.speed_mps == 0.0 {
                tracing::info!(
                    leg = frame.leg,
                    lat = frame.position.lat,
                    lon = frame.position.lon,
                    speed_mps = format!("{:.1}", frame.speed_mps),
                    battery = format!("{:.0}%", frame.battery_percent),
                    "telemetry"
                );
            }
        }
    });

    let outcome = handle.wait().await;
    printer.abort();
    match outcome {
        MissionOutcome::Completed => println!("mission complete"),
        MissionOutcome::Cancelled => println!("mission cancelled"),
    }
    Ok(())
}
