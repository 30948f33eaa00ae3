use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::AppConfig;
use crate::core::State;
use crate::error::Result;
use crate::plot::render_phase_plot;
use crate::sampler::{CoefficientSampler, fresh_seed};
use crate::sweep::{
    random_batch_file_name, random_batch_title, run_random_batch, run_sweep_with, sweep_battery,
};

const PROGRESS_TEMPLATE: &str = "{msg:>14} [{bar:30}] {pos}/{len} ({elapsed})";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Lotka-Volterra phase-space simulations")]
pub struct Args {
    /// Initial prey population
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub x0: f64,

    /// Initial predator population
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub y0: f64,

    /// Number of runs with independently drawn coefficients
    #[arg(long, default_value_t = 5)]
    pub n_plots: usize,

    /// Run the five-sweep battery (delta, gamma, beta, alpha, initial condition)
    #[arg(long, default_value_t = false)]
    pub sweep: bool,

    /// Seed for coefficient sampling (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to config TOML
    #[arg(long, default_value = "lvsweep.toml")]
    pub config: PathBuf,

    /// Output directory (overrides config)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Euler steps per run (overrides config)
    #[arg(long)]
    pub steps: Option<usize>,

    /// Keep every k-th state (overrides config)
    #[arg(long)]
    pub stride: Option<usize>,

    /// Disable the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl Args {
    pub fn initial_state(&self) -> State {
        State::new(self.x0, self.y0)
    }

    /// Fold command-line overrides into `cfg` and validate the result.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) -> Result<()> {
        if let Some(dir) = &self.out_dir {
            cfg.output.dir = dir.clone();
        }
        if let Some(steps) = self.steps {
            cfg.simulation.step_count = steps;
        }
        if let Some(stride) = self.stride {
            cfg.simulation.sample_stride = stride;
        }
        cfg.validate()
    }

    fn progress(&self, total: usize, message: &str) -> ProgressBar {
        if self.no_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb
    }
}

/// Execute one invocation and return the images written, in order.
pub fn run(args: &Args, cfg: &AppConfig, stop: &AtomicBool) -> Result<Vec<PathBuf>> {
    let seed = args.seed.unwrap_or_else(fresh_seed);
    info!(seed, "coefficient sampler seeded");
    let mut sampler = CoefficientSampler::from_seed(seed);
    let initial = args.initial_state();
    let mut written = Vec::new();

    if args.sweep {
        let baseline = sampler.sample();
        info!(baseline = %baseline.label(), "sweep baseline drawn");
        let plans = sweep_battery(
            &baseline,
            &cfg.sweep.range,
            &cfg.sweep.initial_states(),
            initial,
        )?;
        for plan in plans {
            let pb = args.progress(plan.axis.len(), plan.axis.name());
            let batch = run_sweep_with(
                &plan.axis,
                &baseline,
                initial,
                &cfg.simulation,
                Some(stop),
                |done, _| pb.set_position(done as u64),
            )?;
            pb.finish_and_clear();
            let path = cfg.output.dir.join(&plan.file_name);
            render_phase_plot(&batch, &plan.title, &path, &cfg.plot)?;
            written.push(path);
        }
    } else {
        let pb = args.progress(args.n_plots, "random");
        let batch = run_random_batch(
            &mut sampler,
            args.n_plots,
            initial,
            &cfg.simulation,
            Some(stop),
            |done, _| pb.set_position(done as u64),
        )?;
        pb.finish_and_clear();
        let path = cfg.output.dir.join(random_batch_file_name(initial));
        render_phase_plot(&batch, &random_batch_title(initial), &path, &cfg.plot)?;
        written.push(path);
    }

    Ok(written)
}
