use crate::gui_bridge::bridge::GuiBridge;
use crate::simulation;
use crate::workflow::config::SurveyConfig;
use anyhow::Context;
use h1core::dataset::DatasetStore;
use h1core::scan::{slew_to_target, ScanOrchestrator, ScanReport};
use h1core::telemetry::LogManager;
use h1core::SkyPoint;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Runner {
    config: SurveyConfig,
}

impl Runner {
    pub fn new(config: SurveyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Runs one survey against the simulated mount and receiver, reporting
    /// progress to `bridge` when given.
    pub async fn run_scan(
        &self,
        bridge: Option<GuiBridge>,
        cancel: CancellationToken,
    ) -> anyhow::Result<ScanReport> {
        let scan_config = self.config.to_scan_config()?;
        let store = DatasetStore::new(self.config.output_folder()?);
        let journal = self.config.error_log_path()?;
        let (mount, receiver) = simulation::build_pair(&self.config.mount, &self.config.receiver);

        let mut orchestrator = ScanOrchestrator::new(scan_config, mount, receiver, store)
            .context("preparing scan")?
            .with_logger(LogManager::with_journal(journal))
            .with_cancel_token(cancel);
        if let Some(bridge) = bridge {
            let recorder = bridge.clone();
            orchestrator = orchestrator
                .with_status(Arc::new(bridge))
                .with_visualizer(move |reading, progress| recorder.record(reading, progress));
        }

        Ok(orchestrator.run().await)
    }

    /// Points the simulated mount at `target` and reports where it ended up.
    pub async fn slew(&self, target: SkyPoint) -> anyhow::Result<SkyPoint> {
        let scan_config = self.config.to_scan_config()?;
        let (mount, _) = simulation::build_pair(&self.config.mount, &self.config.receiver);
        let reached = slew_to_target(
            mount,
            target,
            scan_config.poll_interval,
            scan_config.slew_timeout,
        )
        .await
        .with_context(|| format!("slewing to RA {} Dec {}", target.ra, target.dec))?;
        Ok(reached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h1core::dataset::DatasetStore;
    use h1core::scan::OutcomeKind;
    use tempfile::tempdir;

    fn small_config(output: &std::path::Path) -> SurveyConfig {
        let mut config = SurveyConfig {
            grid_width: 2,
            grid_height: 2,
            capture_samples: 1024,
            total_averaging_time: 0.004,
            settle_secs: 0.1,
            output_folder: Some(output.to_path_buf()),
            ..Default::default()
        };
        config.mount.slew_polls = 1;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_scan_completes_and_saves() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(small_config(dir.path()));
        let bridge = GuiBridge::new(&runner.config().grid());

        let report = runner
            .run_scan(Some(bridge.clone()), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.outcome.kind(), OutcomeKind::Completed);
        let saved = report.saved_to.expect("dataset path");
        let loaded = DatasetStore::load(&saved).unwrap();
        assert_eq!(loaded.measurements.len(), 4);
        assert!(loaded.is_complete());

        let live = bridge.snapshot();
        assert_eq!(live.completed, 4);
        assert_eq!(live.cells.iter().flatten().count(), 4);
        assert_eq!(live.phase, "Idle");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_keeps_no_readings() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(small_config(dir.path()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = runner.run_scan(None, cancel).await.unwrap();
        assert_eq!(report.outcome.kind(), OutcomeKind::Cancelled);
        assert_eq!(report.dataset.map(|d| d.measurements.len()), Some(0));
    }

    #[tokio::test]
    async fn missing_output_folder_fails_early() {
        let runner = Runner::new(SurveyConfig::default());
        let result = runner.run_scan(None, CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn slew_reaches_target() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(small_config(dir.path()));
        let reached = runner.slew(SkyPoint::new(120.0, -10.0)).await.unwrap();
        assert_eq!(reached, SkyPoint::new(120.0, -10.0));
    }
}
