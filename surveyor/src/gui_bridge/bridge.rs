use crate::gui_bridge::model::LiveScanModel;
use h1core::dataset::Reading;
use h1core::scan::{PointProgress, ScanEvent, StatusSink};
use h1core::ScanGrid;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Shares live scan progress with the terminal and, once served, over HTTP.
#[derive(Clone)]
pub struct GuiBridge {
    state: Arc<RwLock<LiveScanModel>>,
}

impl GuiBridge {
    pub fn new(grid: &ScanGrid) -> Self {
        Self {
            state: Arc::new(RwLock::new(LiveScanModel::new(grid))),
        }
    }

    /// Hosts `GET /scan` on a background thread with its own runtime.
    pub fn serve(&self, addr: SocketAddr) {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let scan_route = warp::path("scan")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<LiveScanModel>>| {
                let snapshot = match state.read() {
                    Ok(guard) => guard.clone(),
                    Err(poisoned) => poisoned.into_inner().clone(),
                };
                warp::reply::json(&snapshot)
            });

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("status bridge runtime failed: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(scan_route).try_bind_ephemeral(addr) {
                    Ok((bound, server)) => {
                        log::info!("status bridge listening on http://{}/scan", bound);
                        server.await;
                    }
                    Err(err) => log::error!("status bridge could not bind {}: {}", addr, err),
                }
            });
        });
    }

    pub fn record(&self, reading: &Reading, progress: PointProgress) {
        if let Ok(mut guard) = self.state.write() {
            guard.record(reading, progress);
        }
        println!(
            "[GUI] {} RA {:.2} Dec {:.2} -> {:.2} dB",
            progress, reading.ra, reading.dec, reading.intensity_db
        );
    }

    pub fn publish_status(&self, message: &str) {
        if let Ok(mut guard) = self.state.write() {
            guard.push_message(message.to_string());
        }
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> LiveScanModel {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatusSink for GuiBridge {
    fn publish(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Phase { phase, point } => {
                if let Ok(mut guard) = self.state.write() {
                    guard.phase = phase.to_string();
                }
                if point.is_none() {
                    self.publish_status(&format!("phase {}", phase));
                }
            }
            // cells are filled through `record`
            ScanEvent::Recorded { .. } => {}
            ScanEvent::Failed { message } => self.publish_status(message),
            ScanEvent::Finished {
                outcome,
                readings,
                saved_to,
            } => {
                let target = saved_to
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "nowhere".into());
                self.publish_status(&format!(
                    "scan {:?} with {} readings, saved to {}",
                    outcome, readings, target
                ));
            }
        }
    }
}
