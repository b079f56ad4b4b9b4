//! esp-sim - drive the overlay without a game client
//!
//! Builds a scene from a JSON entity list (or a small built-in one), runs the
//! given chat commands against it, and prints the notices followed by the
//! frame's draw list as JSON.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use esp_core::{
    ClientCondition, ClientSnapshot, DrawCommand, DrawList, EntitySnapshot, FrameStats,
    LatestStatus, OverlayConfig, OverlayRenderer, PvpWatch, SearchController, StatusIndicator,
    TargetSource, Vec2, Vec3, ViewProjection, Viewport,
};
use mimalloc::MiMalloc;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Advance and line height of the simulated overlay font.
const GLYPH_SIZE: Vec2 = Vec2::new(7.0, 13.0);

#[derive(Parser, Debug)]
#[command(name = "esp-sim", version, about = "Run overlay commands against a scripted scene")]
struct Args {
    /// Overlay config file (TOML). Missing files fall back to defaults.
    #[arg(long, env = "ESP_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of entities: {"name", "position": [x, y, z], "is_dead", ...}
    #[arg(long)]
    entities: Option<PathBuf>,

    /// Screen size as WIDTHxHEIGHT
    #[arg(long, default_value = "1920x1080", value_parser = parse_viewport)]
    viewport: Viewport,

    /// Camera position as X,Y,Z
    #[arg(long, default_value = "0,20,40", value_parser = parse_vec3)]
    eye: Vec3,

    /// Point the camera looks at as X,Y,Z
    #[arg(long, default_value = "0,0,0", value_parser = parse_vec3)]
    look_at: Vec3,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f32,

    /// Active client condition, e.g. between_areas. Repeatable.
    #[arg(long = "condition", value_parser = parse_condition)]
    conditions: Vec<ClientCondition>,

    /// Pretend the player is in PvP content
    #[arg(long)]
    pvp: bool,

    /// Pretend the player is not logged in
    #[arg(long)]
    logged_out: bool,

    /// Name of the soft target, used by /espt
    #[arg(long)]
    soft_target: Option<String>,

    /// Name of the hard target, used by /espt
    #[arg(long)]
    target: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Chat commands to run in order, e.g. "/espg Gua*"
    commands: Vec<String>,
}

fn parse_viewport(raw: &str) -> Result<Viewport, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{raw}`"))?;
    let width: f32 = w.trim().parse().map_err(|e| format!("bad width `{w}`: {e}"))?;
    let height: f32 = h.trim().parse().map_err(|e| format!("bad height `{h}`: {e}"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("viewport must be positive, got `{raw}`"));
    }
    Ok(Viewport::from_size(width, height))
}

fn parse_vec3(raw: &str) -> Result<Vec3, String> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad coordinate in `{raw}`: {e}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected X,Y,Z, got `{raw}`")),
    }
}

fn parse_condition(raw: &str) -> Result<ClientCondition, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|_| {
        let known: Vec<String> = ClientCondition::ALL
            .iter()
            .filter_map(|c| serde_json::to_string(c).ok())
            .collect();
        format!("unknown condition `{raw}`, expected one of {}", known.join(", "))
    })
}

struct SimTargets {
    soft: Option<String>,
    hard: Option<String>,
}

impl TargetSource for SimTargets {
    fn soft_target_name(&self) -> Option<String> {
        self.soft.clone()
    }

    fn hard_target_name(&self) -> Option<String> {
        self.hard.clone()
    }
}

fn demo_scene() -> Vec<EntitySnapshot> {
    vec![
        EntitySnapshot::new("Goblin Thug", Vec3::new(-8.0, 0.0, 4.0)),
        EntitySnapshot::new("Goblin Pugilist", Vec3::new(-4.0, 0.0, -6.0)).dead(),
        EntitySnapshot::new("Guardian", Vec3::new(6.0, 0.0, 2.0)),
        EntitySnapshot::new("Treasure Coffer", Vec3::new(0.0, 0.0, -12.0)),
        EntitySnapshot::new("Aetheryte", Vec3::new(14.0, 0.0, -3.0)).untargetable(),
        EntitySnapshot::new("Behind You", Vec3::new(0.0, 0.0, 80.0)),
    ]
}

fn load_scene(path: Option<&PathBuf>) -> Result<Vec<EntitySnapshot>, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(demo_scene());
    };
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read entities from {}: {e}", path.display()))?;
    let entities: Vec<EntitySnapshot> = serde_json::from_str(&raw)
        .map_err(|e| format!("failed to parse entities from {}: {e}", path.display()))?;
    Ok(entities)
}

fn init_logging(args: &Args, config: &OverlayConfig) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.log_file {
        esp_core::log::init_tracing(path, Some(config.log_level.as_str()))?;
        esp_core::log::install_panic_hook();
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[derive(Serialize)]
struct Report {
    status: Option<StatusIndicator>,
    stats: FrameStats,
    commands: Vec<DrawCommand>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => OverlayConfig::load_or_default(path)?,
        None => OverlayConfig::default(),
    };
    init_logging(&args, &config)?;

    let entities = load_scene(args.entities.as_ref())?;
    tracing::debug!(count = entities.len(), "Loaded scene");

    let controller = SearchController::with_empty_search(
        LatestStatus::new(),
        SimTargets {
            soft: args.soft_target.clone(),
            hard: args.target.clone(),
        },
    );

    let client = ClientSnapshot {
        logged_in: !args.logged_out,
        in_pvp: args.pvp,
        conditions: args.conditions.clone(),
    };
    let mut pvp = PvpWatch::new();
    if pvp.observe(client.logged_in, client.in_pvp) {
        println!("{}", esp_core::Notice::entered_pvp(config.hide_in_pvp));
    }

    for line in &args.commands {
        for notice in controller.run_line(line) {
            println!("{notice}");
        }
    }

    let projector =
        ViewProjection::look_at(args.eye, args.look_at, args.fov.to_radians(), args.viewport);
    let renderer = OverlayRenderer::new(
        controller.search().clone(),
        entities,
        projector,
        client,
        &config,
    );
    let mut canvas = DrawList::new(args.viewport, GLYPH_SIZE);
    let stats = renderer.render_frame(&mut canvas)?;
    tracing::info!(?stats, "Frame rendered");

    let report = Report {
        status: controller.status().get(),
        stats,
        commands: canvas.into_commands(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("esp-sim: {e}");
        std::process::exit(1);
    }
}
