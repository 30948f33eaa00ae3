use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::{SimulationSettings, State};
use crate::error::{LvError, Result};
use crate::plot::PlotStyle;
use crate::sampler::SweepRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// `[x0, y0]` pairs for the initial-condition sweep.
    #[serde(default = "SweepConfig::default_initial_conditions")]
    pub initial_conditions: Vec<[f64; 2]>,
    #[serde(default)]
    pub range: SweepRange,
}

impl SweepConfig {
    fn default_initial_conditions() -> Vec<[f64; 2]> {
        let grid = [0.5, 1.0, 1.5];
        grid.iter()
            .flat_map(|&x| grid.iter().map(move |&y| [x, y]))
            .collect()
    }

    pub fn initial_states(&self) -> Vec<State> {
        self.initial_conditions.iter().copied().map(State::from).collect()
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            initial_conditions: Self::default_initial_conditions(),
            range: SweepRange::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("target/plots")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub plot: PlotStyle,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let section = |name: &str, err: LvError| LvError::Config(format!("[{name}] {err}"));
        self.simulation
            .validate()
            .map_err(|e| section("simulation", e))?;
        self.sweep
            .range
            .validate()
            .map_err(|e| section("sweep", e))?;
        if self.sweep.initial_conditions.is_empty() {
            return Err(LvError::Config(
                "[sweep] initial_conditions must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .sweep
            .initial_conditions
            .iter()
            .find(|p| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(LvError::Config(format!(
                "[sweep] initial condition {bad:?} is not finite"
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(LvError::Config(format!(
                "[plot] image size must be non-zero, got {}x{}",
                self.plot.width, self.plot.height
            )));
        }
        Ok(())
    }

    fn is_table_header(line: &str) -> bool {
        line.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|name| {
                name.starts_with(|c: char| c.is_ascii_alphabetic())
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            })
    }

    /// Defaults as TOML with every value commented out, table headers kept.
    fn commented_template(&self) -> Option<String> {
        let text = toml::to_string_pretty(self).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if Self::is_table_header(trimmed) {
                commented.push_str(line);
                commented.push('\n');
            } else {
                commented.push_str("# ");
                commented.push_str(line);
                commented.push('\n');
            }
        }
        Some(commented)
    }

    /// Read `path` if it exists; otherwise write a commented template of the
    /// defaults there and return the defaults. Unreadable or malformed files
    /// fall back to defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "failed to parse config; using defaults");
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to read config; using defaults");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match default_cfg.commented_template() {
            Some(text) => match fs::write(path, text) {
                Ok(()) => info!(path = %path.display(), "wrote default config"),
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to write default config")
                }
            },
            None => warn!("failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DivergencePolicy;
    use std::fs;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "lvsweep_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_writes_defaults_cleanly() {
        let path = unique_path("defaults.toml");
        let _ = fs::remove_file(&path);

        let cfg = AppConfig::load_or_default(&path);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg.simulation.dt, 1e-5);
        assert_eq!(cfg.simulation.step_count, 10_000_000);
        assert_eq!(cfg.simulation.sample_stride, 100);
        assert_eq!(cfg.simulation.divergence, DivergencePolicy::Warn);
        assert_eq!(cfg.sweep.range, SweepRange::new(0.0, 1.1, 0.2));
        assert_eq!(cfg.sweep.initial_conditions.len(), 9);
        assert_eq!(cfg.plot.width, 1200);

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[simulation]"), "headers stay live");
        assert!(contents.contains("# step_count = 10000000"));
        assert!(contents.contains("# divergence = \"warn\""));

        // Every value is commented out, so reading it back gives defaults.
        let reread = AppConfig::load_or_default(&path);
        assert_eq!(reread.simulation.step_count, 10_000_000);
        assert_eq!(reread.sweep.initial_conditions, cfg.sweep.initial_conditions);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_or_default_reads_existing() {
        let path = unique_path("custom.toml");
        let text = r#"
[simulation]
dt = 0.001
step_count = 5000
divergence = "fail"

[sweep]
initial_conditions = [[0.25, 0.75]]

[sweep.range]
start = 0.25
stop = 0.75
step = 0.125

[plot]
width = 640
"#;
        fs::write(&path, text).unwrap();

        let cfg = AppConfig::load_or_default(&path);
        assert_eq!(cfg.simulation.dt, 0.001);
        assert_eq!(cfg.simulation.step_count, 5000);
        assert_eq!(cfg.simulation.sample_stride, 100);
        assert_eq!(cfg.simulation.divergence, DivergencePolicy::Fail);
        assert_eq!(cfg.sweep.initial_states(), vec![State::new(0.25, 0.75)]);
        assert_eq!(cfg.sweep.range.values().unwrap().len(), 4);
        assert_eq!(cfg.plot.width, 640);
        assert_eq!(cfg.plot.height, 900);
        cfg.validate().unwrap();

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        fs::write(&path, "[simulation\ndt = ").unwrap();
        let cfg = AppConfig::load_or_default(&path);
        assert_eq!(cfg.simulation.step_count, 10_000_000);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn validate_flags_bad_sections() {
        let mut cfg = AppConfig::default();
        cfg.validate().unwrap();

        cfg.simulation.dt = -1.0;
        assert!(matches!(cfg.validate(), Err(LvError::Config(msg)) if msg.starts_with("[simulation]")));

        let mut cfg = AppConfig::default();
        cfg.sweep.range = SweepRange::new(1.0, 0.0, 0.1);
        assert!(matches!(cfg.validate(), Err(LvError::Config(msg)) if msg.starts_with("[sweep]")));

        let mut cfg = AppConfig::default();
        cfg.sweep.initial_conditions = vec![[f64::NAN, 1.0]];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn table_header_detection() {
        assert!(AppConfig::is_table_header("[sweep.range]"));
        assert!(!AppConfig::is_table_header("[0.5, 1.0]"));
        assert!(!AppConfig::is_table_header("[]"));
    }
}
