use crate::simulation::{MountProfile, ReceiverProfile};
use anyhow::{bail, Context};
use h1core::prelude::{
    DEFAULT_CAPTURE_SAMPLES, DEFAULT_MAX_CAPTURES, DEFAULT_POLL_INTERVAL, DEFAULT_SLEW_TIMEOUT,
};
use h1core::{InstrumentConfig, ScanConfig, ScanGrid};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ERROR_LOG_NAME: &str = "survey_errors.log";

/// Everything the `scan` command needs, as read from YAML or flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub grid_spacing: f64,
    pub sample_rate: f64,
    pub center_frequency: f64,
    pub gain: f64,
    pub bandwidth: f64,
    pub line_frequency: Option<f64>,
    pub total_averaging_time: f64,
    pub settle_secs: f64,
    pub slew_timeout_secs: f64,
    pub poll_interval_ms: u64,
    pub capture_samples: usize,
    pub max_captures: usize,
    pub output_folder: Option<PathBuf>,
    pub error_log: Option<PathBuf>,
    pub mount: MountProfile,
    pub receiver: ReceiverProfile,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            grid_width: scan.grid.width,
            grid_height: scan.grid.height,
            grid_spacing: scan.grid.spacing_deg,
            sample_rate: scan.instrument.sample_rate,
            center_frequency: scan.instrument.center_freq,
            gain: scan.instrument.gain,
            bandwidth: scan.instrument.bandwidth,
            line_frequency: None,
            total_averaging_time: scan.averaging_secs,
            settle_secs: scan.settle.as_secs_f64(),
            slew_timeout_secs: DEFAULT_SLEW_TIMEOUT.as_secs_f64(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            capture_samples: DEFAULT_CAPTURE_SAMPLES,
            max_captures: DEFAULT_MAX_CAPTURES,
            output_folder: None,
            error_log: None,
            mount: MountProfile::default(),
            receiver: ReceiverProfile::default(),
        }
    }
}

impl SurveyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading survey config {}", path_ref.display()))?;
        let config: SurveyConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing survey config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn grid(&self) -> ScanGrid {
        ScanGrid::new(self.grid_width, self.grid_height, self.grid_spacing)
    }

    pub fn output_folder(&self) -> anyhow::Result<&Path> {
        match self.output_folder.as_deref() {
            Some(folder) => Ok(folder),
            None => bail!("an output folder is required (set output_folder or pass --output)"),
        }
    }

    /// Journal for scan-halting errors; next to the datasets unless set.
    pub fn error_log_path(&self) -> anyhow::Result<PathBuf> {
        match &self.error_log {
            Some(path) => Ok(path.clone()),
            None => Ok(self.output_folder()?.join(ERROR_LOG_NAME)),
        }
    }

    pub fn to_scan_config(&self) -> anyhow::Result<ScanConfig> {
        let settle = Duration::try_from_secs_f64(self.settle_secs)
            .with_context(|| format!("settle time {}s", self.settle_secs))?;
        let slew_timeout = Duration::try_from_secs_f64(self.slew_timeout_secs)
            .with_context(|| format!("slew timeout {}s", self.slew_timeout_secs))?;
        let config = ScanConfig {
            grid: self.grid(),
            instrument: InstrumentConfig {
                sample_rate: self.sample_rate,
                center_freq: self.center_frequency,
                gain: self.gain,
                bandwidth: self.bandwidth,
            },
            averaging_secs: self.total_averaging_time,
            settle,
            slew_timeout,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            capture_samples: self.capture_samples,
            max_captures: self.max_captures,
            line_frequency: self.line_frequency,
        };
        config.validate().context("validating scan configuration")?;
        Ok(config)
    }
}
