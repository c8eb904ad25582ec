use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dotenv::dotenv;
use mage::infra::{DefaultObserver, TrajectoryRecorder};
use mage::planners::RandomPolicy;
use mage::sim::{EnvConfig, EpisodeRunner, MultiAgentEnv, RunSettings};
use time::{OffsetDateTime, format_description};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const TRAJECTORY_FILE: &str = "actionPerceptionLoop.txt";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mage=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("setting default subscriber failed");
    }
}

/// Run one episode with a random policy and return the trajectory table
fn run_episode(
    env: &mut MultiAgentEnv,
    config: &EnvConfig,
    settings: &RunSettings,
    render: bool,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let policy = RandomPolicy::new(config.seed);
    let mut runner = EpisodeRunner::new(env, policy, (DefaultObserver, TrajectoryRecorder::new()))
        .with_rendering(render);
    runner.run(settings.max_steps)?;

    let (_, (_, recorder)) = runner.into_parts();
    Ok(recorder.to_table())
}

fn write_trajectory(folder: &Path, table: &str) -> io::Result<PathBuf> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let stamp = format_description::parse("[year][month][day]-[hour][minute][second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
        .unwrap_or_else(|| now.unix_timestamp().to_string());

    let dir = folder.join(stamp);
    fs::create_dir_all(&dir)?;
    let path = dir.join(TRAJECTORY_FILE);
    fs::write(&path, table)?;
    Ok(path)
}

fn finish(
    table: &str,
    settings: &RunSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("{}", table);
    if let Some(folder) = &settings.log_folder {
        let path = write_trajectory(Path::new(folder), table)?;
        tracing::info!("Trajectory written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "gui")]
fn run_with_viewer(
    config: EnvConfig,
    settings: RunSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use mage::ui::{SharedFrameSink, SharedFrameState, run_viewer};
    use std::sync::{Arc, mpsc};

    let shared: SharedFrameState = Arc::default();
    let sim_frames = Arc::clone(&shared);
    let (ready_tx, ready_rx) = mpsc::channel();

    // Construct up front so configuration errors surface before a window opens
    let mut env = MultiAgentEnv::new(config.clone())?;

    let simulation = std::thread::spawn(move || {
        let _ = ready_rx.recv();

        env.set_sink(Box::new(SharedFrameSink::new(sim_frames)));
        let result = run_episode(&mut env, &config, &settings, true)
            .and_then(|table| finish(&table, &settings));
        env.close();
        if let Err(e) = &result {
            tracing::error!("Simulation failed: {}", e);
        }
        result.is_ok()
    });

    run_viewer(shared, ready_tx);

    match simulation.join() {
        Ok(true) => Ok(()),
        Ok(false) => Err("simulation failed".into()),
        Err(_) => Err("simulation thread panicked".into()),
    }
}

#[cfg(not(feature = "gui"))]
fn run_with_viewer(
    config: EnvConfig,
    settings: RunSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::warn!("Built without the gui feature, rendering headless");
    let mut env = MultiAgentEnv::new(config.clone())?;
    let table = run_episode(&mut env, &config, &settings, true)?;
    finish(&table, &settings)
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    init_logging();

    let config = EnvConfig::from_env()?;
    let settings = RunSettings::from_env()?;

    tracing::info!("Visualizer enabled: {}", settings.visualizer);

    if settings.visualizer {
        run_with_viewer(config, settings)
    } else {
        let mut env = MultiAgentEnv::new(config.clone())?;
        let table = run_episode(&mut env, &config, &settings, false)?;
        finish(&table, &settings)
    }
}
