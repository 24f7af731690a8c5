use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sky coordinate in degrees. Right ascension and declination are treated as
/// independent scalar axes; no wraparound arithmetic is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPoint {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Checks the point against the RA `[0, 360]` and Dec `[-90, 90]` ranges
    /// accepted by the pointing device.
    pub fn validate(&self) -> SurveyResult<()> {
        if !self.ra.is_finite() || !(0.0..=360.0).contains(&self.ra) {
            return Err(SurveyError::InvalidConfig(format!(
                "RA must be between 0 and 360 degrees, got {}",
                self.ra
            )));
        }
        if !self.dec.is_finite() || !(-90.0..=90.0).contains(&self.dec) {
            return Err(SurveyError::InvalidConfig(format!(
                "Dec must be between -90 and 90 degrees, got {}",
                self.dec
            )));
        }
        Ok(())
    }
}

/// Rectangular lattice centered on a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanGrid {
    pub width: usize,
    pub height: usize,
    pub spacing_deg: f64,
}

impl ScanGrid {
    pub fn new(width: usize, height: usize, spacing_deg: f64) -> Self {
        Self {
            width,
            height,
            spacing_deg,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> SurveyResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SurveyError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.spacing_deg.is_finite() || self.spacing_deg <= 0.0 {
            return Err(SurveyError::InvalidConfig(format!(
                "grid spacing must be positive, got {}",
                self.spacing_deg
            )));
        }
        Ok(())
    }
}

/// Receiver settings recorded alongside every dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub sample_rate: f64,
    pub center_freq: f64,
    pub gain: f64,
    /// Half-width of the integration band in Hz. Zero selects the single bin
    /// nearest the band center.
    pub bandwidth: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            sample_rate: 250e3,
            center_freq: 1.42e9,
            gain: 40.0,
            bandwidth: 10_000.0,
        }
    }
}

/// Immutable configuration handed to the orchestrator at scan start.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub grid: ScanGrid,
    pub instrument: InstrumentConfig,
    /// Total integration time per pointing, in seconds.
    pub averaging_secs: f64,
    pub settle: Duration,
    pub slew_timeout: Duration,
    pub poll_interval: Duration,
    pub capture_samples: usize,
    pub max_captures: usize,
    /// Band center when it differs from the tuned frequency.
    pub line_frequency: Option<f64>,
}

pub const DEFAULT_CAPTURE_SAMPLES: usize = 256_000;
pub const DEFAULT_MAX_CAPTURES: usize = 1024;
pub const DEFAULT_SLEW_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const LONG_AVERAGING_SECS: f64 = 60.0;

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            grid: ScanGrid::new(5, 5, 2.0),
            instrument: InstrumentConfig::default(),
            averaging_secs: 5.0,
            settle: Duration::from_secs(2),
            slew_timeout: DEFAULT_SLEW_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            capture_samples: DEFAULT_CAPTURE_SAMPLES,
            max_captures: DEFAULT_MAX_CAPTURES,
            line_frequency: None,
        }
    }
}

impl ScanConfig {
    /// Frequency the integration band is centered on.
    pub fn band_center(&self) -> f64 {
        self.line_frequency.unwrap_or(self.instrument.center_freq)
    }

    pub fn validate(&self) -> SurveyResult<()> {
        self.grid.validate()?;

        let instrument = &self.instrument;
        if !instrument.sample_rate.is_finite() || instrument.sample_rate <= 0.0 {
            return Err(SurveyError::InvalidConfig(
                "sample rate must be positive".into(),
            ));
        }
        if !instrument.center_freq.is_finite() || instrument.center_freq <= 0.0 {
            return Err(SurveyError::InvalidConfig(
                "center frequency must be positive".into(),
            ));
        }
        if !instrument.gain.is_finite() {
            return Err(SurveyError::InvalidConfig("gain must be a number".into()));
        }
        if !instrument.bandwidth.is_finite() || instrument.bandwidth < 0.0 {
            return Err(SurveyError::InvalidConfig(
                "bandwidth must not be negative".into(),
            ));
        }
        if let Some(line) = self.line_frequency {
            if !line.is_finite() || line <= 0.0 {
                return Err(SurveyError::InvalidConfig(
                    "line frequency must be positive".into(),
                ));
            }
        }
        if !self.averaging_secs.is_finite() || self.averaging_secs <= 0.0 {
            return Err(SurveyError::InvalidConfig(
                "total averaging time must be positive".into(),
            ));
        }
        if self.averaging_secs > LONG_AVERAGING_SECS {
            log::warn!(
                "averaging time of {}s is unusually long for a single pointing",
                self.averaging_secs
            );
        }
        if self.capture_samples == 0 {
            return Err(SurveyError::InvalidConfig(
                "capture block must hold at least one sample".into(),
            ));
        }
        if self.max_captures == 0 {
            return Err(SurveyError::InvalidConfig(
                "capture ceiling must be at least one".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(SurveyError::InvalidConfig(
                "poll interval must be positive".into(),
            ));
        }
        if self.slew_timeout < self.poll_interval {
            return Err(SurveyError::InvalidConfig(
                "slew timeout must cover at least one poll interval".into(),
            ));
        }
        Ok(())
    }
}

/// Failure at the hardware boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("position query failed: {0}")]
    Position(String),
    #[error("slew command failed: {0}")]
    Slew(String),
    #[error("sample capture failed: {0}")]
    Capture(String),
    #[error("receiver configuration failed: {0}")]
    Configure(String),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Common error type for survey operations.
#[derive(thiserror::Error, Debug)]
pub enum SurveyError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(
        "slew to point {} did not finish within {}s",
        .index + 1,
        .timeout.as_secs_f64()
    )]
    SlewTimeout { index: usize, timeout: Duration },
    #[error(
        "no frequency bins within {bandwidth_hz} Hz of {center_hz} Hz \
         (resolution {resolution_hz} Hz)"
    )]
    EmptyBand {
        center_hz: f64,
        bandwidth_hz: f64,
        resolution_hz: f64,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("dataset contains no readings")]
    NoReadings,
    #[error("reading for point {got} appended out of order (expected {expected})")]
    OutOfOrder { expected: usize, got: usize },
    #[error("dataset i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SurveyResult<T> = Result<T, SurveyError>;
