use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use drive_sim::simulation::{
    read_route, ControlFlags, GameMode, JsonRouteStore, Position, RouteRequest, RouteResponse,
    SimWorld,
};

const DEFAULT_LOG_FILTER: &str = "warn,drive_sim=info";

#[derive(Parser)]
#[command(name = "drive_sim")]
#[command(about = "Procedural driving simulation with optional UI")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.05")]
    delta: f32,

    /// Mode to start in
    #[arg(long, value_enum, default_value_t = GameMode::Drive)]
    mode: GameMode,

    /// Route JSON file: a single route, or an array of routes with --route-id
    #[arg(long)]
    route: Option<PathBuf>,

    /// Id of the route to load from the --route file
    #[arg(long, requires = "route")]
    route_id: Option<String>,

    /// JSON route store; a route-creator run saves its draft here
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print a summary every this many ticks (0 for start and end only)
    #[arg(long, default_value = "200")]
    summary_every: u32,
}

fn main() {
    let cli = Cli::parse();

    if cli.ui {
        #[cfg(feature = "ui")]
        {
            run_with_ui(cli.mode);
        }
        #[cfg(not(feature = "ui"))]
        {
            eprintln!("Error: UI feature is not enabled. Rebuild with --features ui");
            std::process::exit(1);
        }
    } else {
        // Bevy installs its own logger, so only the headless path sets one up
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER),
        )
        .init();

        if let Err(err) = run_headless(&cli) {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

/// Fixed input pattern so headless runs exercise steering and braking
fn scripted_controls(mode: GameMode, tick: u32) -> ControlFlags {
    let phase = tick % 400;
    match mode {
        GameMode::Drive => ControlFlags {
            forward: phase < 300,
            backward: (340..360).contains(&phase),
            left: (120..160).contains(&phase),
            right: (200..240).contains(&phase),
        },
        GameMode::Walk => ControlFlags {
            forward: phase < 250,
            right: (100..150).contains(&phase),
            ..ControlFlags::NONE
        },
        GameMode::RouteCreator => ControlFlags::NONE,
    }
}

fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}

/// Load the requested route into the world. A plain file is read directly; with
/// an id the file is opened as a store and queried through the worker.
fn load_route(world: &mut SimWorld, path: &Path, route_id: Option<&str>) -> Result<()> {
    let Some(id) = route_id else {
        let route = read_route(path)?;
        world.load_route(route);
        return Ok(());
    };

    world.attach_store(JsonRouteStore::open(path)?);
    world.request(RouteRequest::Fetch { id: id.to_string() })?;

    // Keep ticking while the request is in flight
    for _ in 0..1000 {
        for response in world.poll_routes() {
            match response {
                RouteResponse::Fetched(Some(route)) => {
                    world.load_route(route);
                    return Ok(());
                }
                RouteResponse::Fetched(None) => bail!("Route {} not found in {}", id, path.display()),
                RouteResponse::Failed { message } => bail!(message),
                other => warn!("Unexpected route response {:?}", other),
            }
        }
        world.tick(0.0);
        std::thread::sleep(Duration::from_millis(1));
    }
    bail!("Timed out waiting for route {}", id)
}

/// Queue the draft on the attached store and wait for the worker to write it
fn save_draft(world: &mut SimWorld) -> Result<String> {
    let id = world.save_draft("headless", now_ns())?;
    for _ in 0..1000 {
        for response in world.poll_routes() {
            match response {
                RouteResponse::Saved { id: saved } if saved == id => return Ok(id),
                RouteResponse::Failed { message } => bail!(message),
                other => warn!("Unexpected route response {:?}", other),
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    bail!("Timed out saving route {}", id)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    println!("Running driving simulation in headless mode...");
    println!(
        "Ticks: {}, Delta: {}s, Mode: {}",
        cli.ticks,
        cli.delta,
        cli.mode.label()
    );
    println!();

    let mut world = SimWorld::new_in_mode(cli.mode);

    if let Some(path) = &cli.route {
        load_route(&mut world, path, cli.route_id.as_deref())
            .with_context(|| format!("Failed to load route from {}", path.display()))?;
    }

    // Replaces the store a --route-id lookup attached
    if let Some(path) = &cli.store {
        world.attach_store(JsonRouteStore::open(path)?);
    }

    println!("Initial state:");
    world.print_summary();
    world.draw_map();

    for tick in 1..=cli.ticks {
        world.set_controls(scripted_controls(world.mode(), tick));

        if world.mode() == GameMode::RouteCreator && tick % 50 == 0 {
            let z = world.observer().z + tick as f32;
            world.click_ground(Position::new(0.0, 0.0, z));
        }

        world.tick(cli.delta);

        if cli.summary_every > 0 && tick % cli.summary_every == 0 && tick < cli.ticks {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                tick,
                tick as f32 * cli.delta
            );
            world.print_summary();
            println!();
        }
    }

    if world.mode() == GameMode::RouteCreator {
        if world.draft.name().is_empty() {
            world.draft.set_name("Headless route");
        }
        match &cli.store {
            Some(path) if world.draft.is_valid() => {
                let id = save_draft(&mut world)
                    .with_context(|| format!("Failed to save route to {}", path.display()))?;
                println!("Saved route {} to {}", id, path.display());
            }
            Some(_) => warn!("Draft is incomplete, nothing saved"),
            None => info!("Draft not saved, pass --store to keep it"),
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();
    Ok(())
}

#[cfg(feature = "ui")]
fn run_with_ui(mode: GameMode) {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;

    println!("Starting Drive Sim UI...");
    println!();
    println!("Controls:");
    println!("  W/A/S/D or arrows - Drive / walk");
    println!("  Tab               - Cycle mode (drive, route creator, walk)");
    println!("  C                 - Toggle chase / cab view");
    println!("  M                 - Mute audio");
    println!("  Click             - Place waypoint (route creator)");
    println!("  Backspace         - Clear active route");
    println!("  ESC               - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: DEFAULT_LOG_FILTER.to_string(),
                    level: bevy::log::Level::INFO,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Drive Sim".into(),
                        resolution: (1280, 720).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(drive_sim::ui::DriveSimUIPlugin { start_mode: mode })
        .run();
}
