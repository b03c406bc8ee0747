use clap::Parser;
use log::{info, warn};
use pbr_viewer::app;
use pbr_viewer::io::config::Config;
use std::path::PathBuf;
use std::process;

/// Software-rasterized PBR model viewer with four dynamic lights.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scene description in TOML; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render a single frame to a PNG instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Output path for --headless (overrides the config's `render.output`).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => {
                info!("loaded config {path:?}");
                config
            }
            Err(e) => {
                warn!("{e}, using built-in defaults");
                Config::default()
            }
        },
        None => Config::default(),
    };

    let result = if args.headless {
        app::run_cli(config, args.output.as_deref())
    } else {
        app::run_gui(config, args.config)
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
