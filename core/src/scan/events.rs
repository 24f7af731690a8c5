use crate::dataset::Reading;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanPhase {
    Idle,
    Connecting,
    Homed,
    Slewing,
    Settling,
    Measuring,
    Recording,
    Finalizing,
    Cancelled,
    Error,
}

impl ScanPhase {
    /// Phases repeated once per scan point.
    pub fn is_per_point(self) -> bool {
        matches!(
            self,
            ScanPhase::Slewing | ScanPhase::Settling | ScanPhase::Measuring | ScanPhase::Recording
        )
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Position within the planned sequence; displays one-based as `i/N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointProgress {
    pub index: usize,
    pub total: usize,
}

impl fmt::Display for PointProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index + 1, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    Completed,
    Cancelled,
    Aborted,
}

/// Progress notification for status displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Phase {
        phase: ScanPhase,
        point: Option<PointProgress>,
    },
    Recorded {
        point: PointProgress,
        reading: Reading,
    },
    Failed {
        message: String,
    },
    Finished {
        outcome: OutcomeKind,
        readings: usize,
        saved_to: Option<PathBuf>,
    },
}

/// Fire-and-forget receiver of scan progress.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: &ScanEvent);
}

/// Sink that writes progress to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn publish(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Phase {
                phase,
                point: Some(point),
            } => log::debug!("{} at position {}", phase, point),
            ScanEvent::Phase { phase, point: None } => log::debug!("{}", phase),
            ScanEvent::Recorded { point, reading } => log::info!(
                "recorded position {}: RA {:.2} deg, Dec {:.2} deg, {:.2} dB",
                point,
                reading.ra,
                reading.dec,
                reading.intensity_db
            ),
            ScanEvent::Failed { message } => log::error!("{}", message),
            ScanEvent::Finished {
                outcome, readings, ..
            } => log::info!("scan {:?} with {} readings", outcome, readings),
        }
    }
}
