use h1core::dataset::Reading;
use h1core::scan::path::ring_order;
use h1core::scan::PointProgress;
use h1core::ScanGrid;
use serde::{Deserialize, Serialize};

const MAX_MESSAGES: usize = 32;

/// Snapshot of a running scan as served to status clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LiveScanModel {
    pub phase: String,
    pub completed: usize,
    pub total: usize,
    pub width: usize,
    pub height: usize,
    pub last_intensity: Option<f64>,
    /// Row-major by declination, lowest row first.
    pub cells: Vec<Option<f64>>,
    pub color_range: Option<(f64, f64)>,
    pub messages: Vec<String>,
    /// Flat cell index for each visiting position.
    #[serde(skip)]
    visit_cells: Vec<usize>,
}

impl LiveScanModel {
    pub fn new(grid: &ScanGrid) -> Self {
        Self {
            phase: "Idle".into(),
            total: grid.cell_count(),
            width: grid.width,
            height: grid.height,
            cells: vec![None; grid.cell_count()],
            visit_cells: ring_order(grid.width, grid.height)
                .into_iter()
                .map(|(x, y)| y * grid.width + x)
                .collect(),
            ..Default::default()
        }
    }

    /// Places a reading in the cell its visiting index was planned for.
    pub fn record(&mut self, reading: &Reading, progress: PointProgress) {
        let cell = self.visit_cells.get(progress.index).copied();
        if let Some(slot) = cell.and_then(|idx| self.cells.get_mut(idx)) {
            *slot = Some(reading.intensity_db);
        }
        let value = reading.intensity_db;
        self.color_range = Some(match self.color_range {
            None => (value, value),
            Some((low, high)) => (low.min(value), high.max(value)),
        });
        self.last_intensity = Some(value);
        self.completed = self.completed.max(progress.index + 1);
    }

    pub fn push_message(&mut self, message: String) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.remove(0);
        }
        self.messages.push(message);
    }

    /// Cell at lattice column `x`, row `y`.
    #[cfg(test)]
    pub fn cell(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(value: f64) -> Reading {
        Reading {
            ra: 0.0,
            dec: 0.0,
            intensity_db: value,
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn readings_fill_cells_in_ring_order() {
        let mut model = LiveScanModel::new(&ScanGrid::new(3, 3, 1.0));
        model.record(&reading(1.0), PointProgress { index: 0, total: 9 });
        model.record(&reading(4.0), PointProgress { index: 3, total: 9 });
        model.record(&reading(9.0), PointProgress { index: 8, total: 9 });
        assert_eq!(model.cell(0, 0), Some(1.0));
        // fourth point is the middle of the right column
        assert_eq!(model.cell(2, 1), Some(4.0));
        assert_eq!(model.cell(1, 1), Some(9.0));
        assert_eq!(model.completed, 9);
        assert_eq!(model.color_range, Some((1.0, 9.0)));
        assert_eq!(model.cells.iter().flatten().count(), 3);
    }

    #[test]
    fn visiting_order_maps_to_cells_once() {
        let mut model = LiveScanModel::new(&ScanGrid::new(3, 3, 1.0));
        assert_eq!(model.visit_cells, vec![0, 1, 2, 5, 8, 7, 6, 3, 4]);
        // positions past the plan are counted but fill nothing
        model.record(&reading(2.0), PointProgress { index: 9, total: 9 });
        assert!(model.cells.iter().all(Option::is_none));
        assert_eq!(model.last_intensity, Some(2.0));
    }

    #[test]
    fn message_backlog_is_bounded() {
        let mut model = LiveScanModel::new(&ScanGrid::new(1, 1, 1.0));
        for idx in 0..40 {
            model.push_message(format!("msg {idx}"));
        }
        assert_eq!(model.messages.len(), MAX_MESSAGES);
        assert_eq!(model.messages[0], "msg 8");
    }
}
