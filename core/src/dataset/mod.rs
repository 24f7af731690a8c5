//! Survey results and their on-disk form.

pub mod store;

pub use store::DatasetStore;

use crate::prelude::{InstrumentConfig, ScanGrid, SkyPoint, SurveyError, SurveyResult};
use crate::scan::path::ScanPoint;
use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// One measurement at a scan point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "RA")]
    pub ra: f64,
    #[serde(rename = "DEC")]
    pub dec: f64,
    #[serde(rename = "INTENSITY")]
    pub intensity_db: f64,
    #[serde(rename = "TIME", with = "local_time")]
    pub timestamp: NaiveDateTime,
}

/// Sortable local timestamp, e.g. `2024-11-02_21-14-05`.
pub mod local_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

    pub fn serialize<S: Serializer>(
        time: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Append-only readings of one scan, kept in scan-point order.
#[derive(Debug, Clone, Default)]
pub struct ReadingLog {
    readings: Vec<Reading>,
}

impl ReadingLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Vec::with_capacity(capacity),
        }
    }

    /// Records the reading for `point`, which must be the next index.
    /// Timestamps keep whole seconds, the resolution of the file format.
    pub fn append(
        &mut self,
        point: &ScanPoint,
        intensity_db: f64,
        timestamp: NaiveDateTime,
    ) -> SurveyResult<&Reading> {
        if point.index != self.readings.len() {
            return Err(SurveyError::OutOfOrder {
                expected: self.readings.len(),
                got: point.index,
            });
        }
        self.readings.push(Reading {
            ra: point.point.ra,
            dec: point.point.dec,
            intensity_db,
            timestamp: timestamp.trunc_subsecs(0),
        });
        Ok(&self.readings[point.index])
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.readings
    }

    pub fn into_vec(self) -> Vec<Reading> {
        self.readings
    }
}

/// Unit of persistence. Field names match the survey file format; fields
/// absent from older files are optional on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyDataset {
    pub sample_rate: f64,
    pub center_frequency: f64,
    pub gain: f64,
    #[serde(default)]
    pub bandwidth: f64,
    pub grid_width: usize,
    pub grid_height: usize,
    pub grid_spacing: f64,
    #[serde(default)]
    pub initial_ra: Option<f64>,
    #[serde(default)]
    pub initial_dec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_frequency: Option<f64>,
    #[serde(default)]
    pub measurements: Vec<Reading>,
}

impl SurveyDataset {
    pub fn new(
        instrument: InstrumentConfig,
        grid: ScanGrid,
        origin: SkyPoint,
        line_frequency: Option<f64>,
        readings: Vec<Reading>,
    ) -> Self {
        Self {
            sample_rate: instrument.sample_rate,
            center_frequency: instrument.center_freq,
            gain: instrument.gain,
            bandwidth: instrument.bandwidth,
            grid_width: grid.width,
            grid_height: grid.height,
            grid_spacing: grid.spacing_deg,
            initial_ra: Some(origin.ra),
            initial_dec: Some(origin.dec),
            line_frequency,
            measurements: readings,
        }
    }

    pub fn instrument(&self) -> InstrumentConfig {
        InstrumentConfig {
            sample_rate: self.sample_rate,
            center_freq: self.center_frequency,
            gain: self.gain,
            bandwidth: self.bandwidth,
        }
    }

    pub fn grid(&self) -> ScanGrid {
        ScanGrid::new(self.grid_width, self.grid_height, self.grid_spacing)
    }

    pub fn origin(&self) -> Option<SkyPoint> {
        Some(SkyPoint::new(self.initial_ra?, self.initial_dec?))
    }

    pub fn readings(&self) -> &[Reading] {
        &self.measurements
    }

    /// True when every planned cell has a reading.
    pub fn is_complete(&self) -> bool {
        self.measurements.len() == self.grid().cell_count()
    }
}
