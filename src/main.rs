use bevy::prelude::*;

use petrel::game::demo::{demo_scene, DemoScene};
use petrel::game::layout::io::{load_layout, save_layout};
use petrel::game::sandbox::SandboxPlugin;
use petrel::game::steering::{AgentBody, AgentCapabilities, IndoorSteering, SeekTarget, WanderTarget};
use petrel::game::layout::TeamId;
use petrel::game::math::FixedVec2;
use petrel::game::PetrelPlugin;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_TICKS: u32 = 1800;

fn setup_file_logging() -> std::io::Result<String> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Keep only the last 25 runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("petrel_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,petrel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("petrel") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

#[derive(Default)]
struct Args {
    save: Option<String>,
    load: Option<String>,
    ticks: Option<u32>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("{} needs a value", arg));
        match arg.as_str() {
            "--save" => args.save = Some(value()?),
            "--load" => args.load = Some(value()?),
            "--ticks" => {
                let raw = value()?;
                args.ticks = Some(raw.parse().map_err(|e| format!("bad --ticks {}: {}", raw, e))?);
            }
            other => return Err(format!("unknown argument {}", other)),
        }
    }
    Ok(args)
}

fn spawn_crew(app: &mut App, scene: &DemoScene) -> Vec<Entity> {
    let world = app.world_mut();
    let climber = world.spawn((
        Name::new("climber"),
        AgentBody::new(Some(scene.region), scene.lower_left),
        AgentCapabilities::humanoid(TeamId(0)),
        SeekTarget::new(scene.upper_left),
    )).id();
    let mut sentry_caps = AgentCapabilities::humanoid(TeamId(0));
    sentry_caps.keep_doors_closed = true;
    let sentry = world.spawn((
        Name::new("sentry"),
        AgentBody::new(Some(scene.region), FixedVec2::from_f32(9.0, 1.0)),
        sentry_caps,
        SeekTarget::new(FixedVec2::from_f32(3.0, 1.0)),
    )).id();
    let idler = world.spawn((
        Name::new("idler"),
        AgentBody::new(Some(scene.region), FixedVec2::from_f32(6.0, 4.0)),
        AgentCapabilities::humanoid(TeamId(0)),
        WanderTarget::default(),
    )).id();
    vec![climber, sentry, idler]
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;

    let mut scene = demo_scene();
    if let Some(path) = &args.load {
        scene.data = load_layout(path)?;
        info!("Loaded layout from {} ({} nodes)", path, scene.data.graph.len());
    }
    if let Some(path) = &args.save {
        save_layout(path, &scene.data)?;
        info!("Saved layout to {}", path);
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((PetrelPlugin, SandboxPlugin))
        .insert_resource(scene.data.graph.clone())
        .insert_resource(scene.data.layout.clone());
    app.finish();
    app.cleanup();
    // Startup: config load
    app.update();

    let crew = spawn_crew(&mut app, &scene);
    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }

    for entity in crew {
        let world = app.world();
        let name = world.get::<Name>(entity).map(|n| n.as_str().to_string()).unwrap_or_default();
        let Some(body) = world.get::<AgentBody>(entity) else {
            continue;
        };
        let route = world
            .get::<IndoorSteering>(entity)
            .and_then(|s| s.current_route())
            .map(|r| format!("{}/{} nodes{}", r.cursor(), r.len(), if r.is_unreachable() { ", unreachable" } else { "" }))
            .unwrap_or_else(|| "no route".to_string());
        info!(
            "{}: at ({:.2}, {:.2}) in {:?}, {}",
            name,
            body.position.x.to_num::<f32>(),
            body.position.y.to_num::<f32>(),
            body.hull,
            route
        );
    }
    Ok(())
}

fn main() {
    let log_file = match setup_file_logging() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            return;
        }
    };
    println!("Petrel steering demo - logging to {}", log_file);

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
