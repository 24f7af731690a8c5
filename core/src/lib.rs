//! Scan-control and spectral-reduction core for the Rust hydrogen-line
//! survey platform.
//!
//! The orchestrator steers a mount across a ring-ordered sky grid, reduces a
//! receiver capture to one band intensity per pointing, and persists the
//! readings; the imaging module resamples them onto a regular sky grid.

pub mod dataset;
pub mod device;
pub mod imaging;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod scan;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use prelude::{
    DeviceError, InstrumentConfig, ScanConfig, ScanGrid, SkyPoint, SurveyError, SurveyResult,
};
