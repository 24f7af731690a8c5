use crate::dataset::{DatasetStore, Reading, ReadingLog, SurveyDataset};
use crate::device::{PointingDevice, PointingLease, SamplerLease, SamplingDevice};
use crate::prelude::{ScanConfig, SkyPoint, SurveyError, SurveyResult};
use crate::processing::reducer::SpectrumReducer;
use crate::scan::events::{LogStatus, OutcomeKind, PointProgress, ScanEvent, ScanPhase, StatusSink};
use crate::scan::path::{self, ScanPoint};
use crate::scan::slew::wait_for_slew;
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// Callback invoked with every new reading, e.g. to refresh a live image.
pub type Visualizer = Box<dyn FnMut(&Reading, PointProgress)>;

#[derive(Debug)]
pub enum ScanOutcome {
    Completed,
    Cancelled,
    Aborted(SurveyError),
}

impl ScanOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ScanOutcome::Completed => OutcomeKind::Completed,
            ScanOutcome::Cancelled => OutcomeKind::Cancelled,
            ScanOutcome::Aborted(_) => OutcomeKind::Aborted,
        }
    }

    pub fn error(&self) -> Option<&SurveyError> {
        match self {
            ScanOutcome::Aborted(err) => Some(err),
            _ => None,
        }
    }
}

/// Everything a finished scan hands back to its caller.
#[derive(Debug)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// `None` only when the scan failed before the mount reported a position.
    pub dataset: Option<SurveyDataset>,
    pub saved_to: Option<PathBuf>,
    pub persist_error: Option<SurveyError>,
    pub metrics: Metrics,
}

/// Drives one survey: connect, plan the ring-order path around the current
/// pointing, then slew, settle, measure and record at every point before
/// persisting the dataset and releasing both devices.
///
/// All waiting happens on the tokio timer; the only blocking call is one
/// receiver capture. Cancellation is checked between points only.
pub struct ScanOrchestrator<P: PointingDevice, S: SamplingDevice> {
    config: ScanConfig,
    pointing: PointingLease<P>,
    sampler: SamplerLease<S>,
    store: DatasetStore,
    reducer: SpectrumReducer,
    status: Arc<dyn StatusSink>,
    visualizer: Option<Visualizer>,
    cancel: CancellationToken,
    logger: LogManager,
    metrics: MetricsRecorder,
    phase: ScanPhase,
    position: Option<PointProgress>,
}

impl<P: PointingDevice, S: SamplingDevice> ScanOrchestrator<P, S> {
    /// Takes ownership of both devices. An invalid configuration is rejected
    /// here, before anything is commanded.
    pub fn new(
        config: ScanConfig,
        pointing: P,
        sampler: S,
        store: DatasetStore,
    ) -> SurveyResult<Self> {
        let pointing = PointingLease::new(pointing);
        let sampler = SamplerLease::new(sampler);
        config.validate()?;

        Ok(Self {
            reducer: SpectrumReducer::from_config(&config),
            config,
            pointing,
            sampler,
            store,
            status: Arc::new(LogStatus),
            visualizer: None,
            cancel: CancellationToken::new(),
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
            phase: ScanPhase::Idle,
            position: None,
        })
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn with_visualizer<F>(mut self, visualizer: F) -> Self
    where
        F: FnMut(&Reading, PointProgress) + 'static,
    {
        self.visualizer = Some(Box::new(visualizer));
        self
    }

    pub fn with_logger(mut self, logger: LogManager) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the scan at the next point boundary.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub async fn run(mut self) -> ScanReport {
        let origin = match self.home() {
            Ok(origin) => origin,
            Err(err) => {
                self.fail(&err);
                self.release();
                self.enter(ScanPhase::Idle, None);
                self.status.publish(&ScanEvent::Finished {
                    outcome: OutcomeKind::Aborted,
                    readings: 0,
                    saved_to: None,
                });
                return ScanReport {
                    outcome: ScanOutcome::Aborted(err),
                    dataset: None,
                    saved_to: None,
                    persist_error: None,
                    metrics: self.metrics.snapshot(),
                };
            }
        };

        let points = path::generate(origin, &self.config.grid);
        let total = points.len();
        let mut readings = ReadingLog::with_capacity(total);
        let mut outcome = ScanOutcome::Completed;

        for point in &points {
            if self.cancel.is_cancelled() {
                self.enter(
                    ScanPhase::Cancelled,
                    Some(PointProgress {
                        index: point.index,
                        total,
                    }),
                );
                self.metrics.record_cancellation();
                self.logger.record(&format!(
                    "Scan cancelled after {} of {} positions",
                    readings.len(),
                    total
                ));
                outcome = ScanOutcome::Cancelled;
                break;
            }
            if let Err(err) = self.visit(point, total, &mut readings).await {
                self.metrics.record_failure();
                self.fail(&err);
                outcome = ScanOutcome::Aborted(err);
                break;
            }
        }

        self.finalize(origin, readings, outcome)
    }

    fn home(&mut self) -> SurveyResult<SkyPoint> {
        self.enter(ScanPhase::Connecting, None);
        self.pointing.connect()?;
        let origin = self.pointing.current_position()?;

        self.enter(ScanPhase::Homed, None);
        self.logger.record(&format!(
            "Retrieved initial position - RA: {:.2} deg, Dec: {:.2} deg",
            origin.ra, origin.dec
        ));
        let instrument = self.config.instrument;
        self.sampler.configure(
            instrument.sample_rate,
            instrument.center_freq,
            instrument.gain,
        )?;
        Ok(origin)
    }

    async fn visit(
        &mut self,
        point: &ScanPoint,
        total: usize,
        readings: &mut ReadingLog,
    ) -> SurveyResult<()> {
        let progress = PointProgress {
            index: point.index,
            total,
        };
        let target = point.point;

        self.enter(ScanPhase::Slewing, Some(progress));
        self.logger.record(&format!(
            "Grid position {}: slewing to RA {:.2} deg, Dec {:.2} deg",
            progress, target.ra, target.dec
        ));
        self.pointing.slew_to(target)?;
        wait_for_slew(
            &mut *self.pointing,
            self.config.poll_interval,
            self.config.slew_timeout,
            point.index,
        )
        .await?;

        self.enter(ScanPhase::Settling, Some(progress));
        time::sleep(self.config.settle).await;

        self.enter(ScanPhase::Measuring, Some(progress));
        let intensity_db = self.reducer.reduce(
            &mut *self.sampler,
            self.config.band_center(),
            self.config.instrument.bandwidth,
            self.config.averaging_secs,
        )?;

        self.enter(ScanPhase::Recording, Some(progress));
        let reading = readings
            .append(point, intensity_db, Local::now().naive_local())?
            .clone();
        self.metrics.record_point();
        if let Some(visualizer) = self.visualizer.as_mut() {
            visualizer(&reading, progress);
        }
        self.status.publish(&ScanEvent::Recorded {
            point: progress,
            reading,
        });
        Ok(())
    }

    fn finalize(
        mut self,
        origin: SkyPoint,
        readings: ReadingLog,
        outcome: ScanOutcome,
    ) -> ScanReport {
        self.enter(ScanPhase::Finalizing, None);
        let dataset = SurveyDataset::new(
            self.config.instrument,
            self.config.grid,
            origin,
            self.config.line_frequency,
            readings.into_vec(),
        );

        let (saved_to, persist_error) = match self.store.save(&dataset) {
            Ok(path) => (Some(path), None),
            Err(err) => {
                self.logger.record_error(&format!(
                    "Failed to save {} readings: {}",
                    dataset.measurements.len(),
                    err
                ));
                (None, Some(err))
            }
        };

        // An aborted scan leaves the mount where it stopped.
        if !matches!(outcome, ScanOutcome::Aborted(_)) {
            match self.pointing.slew_to(origin) {
                Ok(()) => self.logger.record("Returning to initial position"),
                Err(err) => log::warn!("return to initial position failed: {}", err),
            }
        }

        self.release();
        self.enter(ScanPhase::Idle, None);
        self.status.publish(&ScanEvent::Finished {
            outcome: outcome.kind(),
            readings: dataset.measurements.len(),
            saved_to: saved_to.clone(),
        });

        ScanReport {
            outcome,
            dataset: Some(dataset),
            saved_to,
            persist_error,
            metrics: self.metrics.snapshot(),
        }
    }

    fn fail(&mut self, err: &SurveyError) {
        let message = match self.position {
            Some(point) => format!("{} failed at position {}: {}", self.phase, point, err),
            None => format!("{} failed: {}", self.phase, err),
        };
        self.logger.record_error(&message);
        self.enter(ScanPhase::Error, self.position);
        self.status.publish(&ScanEvent::Failed { message });
    }

    fn release(&mut self) {
        self.sampler.release();
        self.pointing.release();
    }

    fn enter(&mut self, phase: ScanPhase, point: Option<PointProgress>) {
        self.phase = phase;
        self.position = point;
        self.status.publish(&ScanEvent::Phase { phase, point });
    }
}
