//! Twinview - Main entry point
//!
//! Binds the pose stream, connects the motion system and opens the
//! side-by-side operator window.

mod app;
mod config;
mod handle;
mod input;
mod scene;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use twinview_core::{LoopbackMotion, MotionSystem};
use twinview_osc::{OscMotionBridge, PoseReceiver};

#[derive(Parser, Debug)]
#[command(name = "twinview")]
#[command(about = "Side-by-side simulated and live robot views with a draggable target")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "twinview.toml")]
    config: PathBuf,

    /// Bind address for the OSC pose stream
    #[arg(short, long)]
    bind: Option<String>,

    /// Address of the external motion process (host:port)
    #[arg(short, long)]
    motion: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Twinview v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.osc.bind = bind;
    }
    if let Some(motion) = args.motion {
        config.motion.target = Some(motion);
    }

    info!(
        osc = %config.osc.bind,
        motion = config.motion.target.as_deref().unwrap_or("loopback"),
        "Configuration loaded"
    );

    let bindings = config.key_bindings()?;

    let receiver = PoseReceiver::bind(&config.osc.bind, config.osc.address.clone())
        .context("Cannot start the pose stream receiver")?;

    let motion: Box<dyn MotionSystem> = match &config.motion.target {
        Some(target) => Box::new(
            OscMotionBridge::connect(target)
                .with_context(|| format!("Cannot reach motion process at {}", target))?,
        ),
        None => Box::new(LoopbackMotion::new()),
    };

    app::run(config, bindings, receiver, motion);

    Ok(())
}
