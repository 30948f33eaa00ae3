// Entry point: loads config, installs the Ctrl-C stop flag and runs one batch.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use lvsweep::cli::{self, Args};
use lvsweep::config::AppConfig;

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let mut cfg = AppConfig::load_or_default(&args.config);
    if let Err(err) = args.apply_overrides(&mut cfg) {
        error!("{err}");
        std::process::exit(2);
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_for_ctrlc = stop_flag.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        stop_flag_for_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!(%err, "could not install Ctrl-C handler; runs cannot be interrupted cleanly");
    }

    match cli::run(&args, &cfg, &stop_flag) {
        Ok(paths) => {
            for path in paths {
                info!("saved {}", path.display());
            }
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
