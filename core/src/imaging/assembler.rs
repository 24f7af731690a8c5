use crate::dataset::Reading;
use crate::math::stats::StatsHelper;
use crate::prelude::{SurveyError, SurveyResult};
use ndarray::Array2;

/// Coordinates closer than this fraction of a cell to an axis value are
/// treated as lying on it, absorbing rounding in the scan lattice.
const AXIS_SNAP: f64 = 1e-9;

/// Largest image the assembler will allocate, in cells.
pub const MAX_IMAGE_CELLS: usize = 4_000_000;

/// Regular intensity grid. Rows follow declination, columns right ascension,
/// both ascending; cells nobody measured hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyImage {
    pub grid: Array2<Option<f64>>,
    pub ra_axis: Vec<f64>,
    pub dec_axis: Vec<f64>,
}

impl SkyImage {
    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    pub fn ra_extent(&self) -> (f64, f64) {
        extent(&self.ra_axis)
    }

    pub fn dec_extent(&self) -> (f64, f64) {
        extent(&self.dec_axis)
    }

    /// Value at declination row `row`, right-ascension column `col`.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.grid.get((row, col)).copied().flatten()
    }

    pub fn filled_cells(&self) -> usize {
        self.grid.iter().filter(|cell| cell.is_some()).count()
    }

    /// Smallest and largest filled value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.grid.iter().flatten().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((low, high)) => Some((low.min(value), high.max(value))),
        })
    }
}

fn extent(axis: &[f64]) -> (f64, f64) {
    match (axis.first(), axis.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (f64::NAN, f64::NAN),
    }
}

/// Resamples scattered readings onto a regular grid.
pub struct GridAssembler {
    spacing_deg: f64,
}

impl GridAssembler {
    pub fn new(spacing_deg: f64) -> SurveyResult<Self> {
        if !spacing_deg.is_finite() || spacing_deg <= 0.0 {
            return Err(SurveyError::InvalidConfig(format!(
                "cell spacing must be positive, got {}",
                spacing_deg
            )));
        }
        Ok(Self { spacing_deg })
    }

    /// Places every reading in the cell whose lower axis value is the last
    /// one not above the reading's coordinate.
    ///
    /// A reading landing on an occupied cell replaces it with the mean of the
    /// stored value and itself. With three or more contributors this is a
    /// pairwise running average, not the true mean: the earliest values carry
    /// less weight. Kept as the established behavior of survey images.
    pub fn assemble(&self, readings: &[Reading]) -> SurveyResult<SkyImage> {
        if readings.is_empty() {
            return Err(SurveyError::NoReadings);
        }

        let (ra_min, ra_max) = bounds(readings.iter().map(|r| r.ra));
        let (dec_min, dec_max) = bounds(readings.iter().map(|r| r.dec));

        let width = self.cells_for(ra_max - ra_min);
        let height = self.cells_for(dec_max - dec_min);
        if width * height > MAX_IMAGE_CELLS as f64 {
            return Err(SurveyError::InvalidConfig(format!(
                "cell spacing {} needs a {}x{} image, more than {} cells",
                self.spacing_deg, width, height, MAX_IMAGE_CELLS
            )));
        }
        let (width, height) = (width as usize, height as usize);
        let ra_axis = StatsHelper::linspace(ra_min, ra_max, width);
        let dec_axis = StatsHelper::linspace(dec_min, dec_max, height);

        let mut grid = Array2::from_elem((height, width), None);
        let tolerance = self.spacing_deg * AXIS_SNAP;
        for reading in readings {
            let col = cell_index(&ra_axis, reading.ra, tolerance);
            let row = cell_index(&dec_axis, reading.dec, tolerance);
            let cell: &mut Option<f64> = &mut grid[(row, col)];
            *cell = Some(match *cell {
                None => reading.intensity_db,
                Some(existing) => (existing + reading.intensity_db) / 2.0,
            });
        }

        Ok(SkyImage {
            grid,
            ra_axis,
            dec_axis,
        })
    }

    /// Axis length in cells, kept in floating point until checked.
    fn cells_for(&self, range: f64) -> f64 {
        (range / self.spacing_deg - AXIS_SNAP).ceil().max(0.0) + 1.0
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), v| {
        (low.min(v), high.max(v))
    })
}

/// Index of the last axis value `<= value`, clamped into the axis.
fn cell_index(axis: &[f64], value: f64, tolerance: f64) -> usize {
    let position = axis.partition_point(|&a| a <= value + tolerance);
    position.saturating_sub(1).min(axis.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading(ra: f64, dec: f64, intensity_db: f64) -> Reading {
        Reading {
            ra,
            dec,
            intensity_db,
            timestamp: NaiveDateTime::default(),
        }
    }

    #[test]
    fn collisions_average_pairwise() {
        let assembler = GridAssembler::new(1.0).unwrap();
        let readings = vec![
            reading(0.0, 0.0, 4.0),
            reading(0.2, 0.1, 8.0),
            reading(2.0, 1.0, 1.0),
        ];
        let image = assembler.assemble(&readings).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.value(0, 0), Some(6.0));
        assert_eq!(image.value(1, 2), Some(1.0));
        assert_eq!(image.filled_cells(), 2);
        assert_eq!(image.value(0, 1), None);
        assert_eq!(image.value(1, 0), None);
    }

    #[test]
    fn third_collision_is_not_the_true_mean() {
        // Pairwise running average: mean(mean(a, b), c), which weights `c`
        // twice as heavily as `a` or `b`. The true mean would be 4.0.
        let assembler = GridAssembler::new(1.0).unwrap();
        let readings = vec![
            reading(0.0, 0.0, 0.0),
            reading(0.1, 0.1, 4.0),
            reading(0.2, 0.2, 8.0),
            reading(3.0, 3.0, 1.0),
        ];
        let image = assembler.assemble(&readings).unwrap();
        assert_eq!(image.value(0, 0), Some(5.0));
        assert_ne!(image.value(0, 0), Some(4.0));
    }

    #[test]
    fn lattice_points_land_one_per_cell() {
        // 0.1 steps do not add up exactly in binary floating point.
        let assembler = GridAssembler::new(0.1).unwrap();
        let mut readings = Vec::new();
        for y in 0..4 {
            for x in 0..5 {
                let ra = 123.4 + (x as f64 - 2.0) * 0.1;
                let dec = -12.3 + (y as f64 - 1.5) * 0.1;
                readings.push(reading(ra, dec, (y * 5 + x) as f64));
            }
        }
        let image = assembler.assemble(&readings).unwrap();
        assert_eq!((image.width(), image.height()), (5, 4));
        assert_eq!(image.filled_cells(), 20);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(image.value(y, x), Some((y * 5 + x) as f64));
            }
        }
    }

    #[test]
    fn single_reading_makes_single_cell() {
        let image = GridAssembler::new(2.0)
            .unwrap()
            .assemble(&[reading(50.0, 10.0, -7.5)])
            .unwrap();
        assert_eq!(image.grid.dim(), (1, 1));
        assert_eq!(image.value(0, 0), Some(-7.5));
        assert_eq!(image.ra_extent(), (50.0, 50.0));
    }

    #[test]
    fn empty_input_and_bad_spacing_fail() {
        assert!(matches!(
            GridAssembler::new(1.0).unwrap().assemble(&[]),
            Err(SurveyError::NoReadings)
        ));
        assert!(GridAssembler::new(0.0).is_err());
        assert!(GridAssembler::new(f64::NAN).is_err());
    }

    #[test]
    fn oversized_image_is_rejected() {
        let readings = [reading(10.0, 20.0, 1.0), reading(20.0, 30.0, 2.0)];
        let err = GridAssembler::new(1e-9)
            .unwrap()
            .assemble(&readings)
            .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidConfig(_)));

        let coarse = GridAssembler::new(0.01).unwrap().assemble(&readings).unwrap();
        assert_eq!((coarse.width(), coarse.height()), (1001, 1001));
    }

    #[test]
    fn value_range_ignores_empty_cells() {
        let image = GridAssembler::new(1.0)
            .unwrap()
            .assemble(&[reading(0.0, 0.0, 3.0), reading(2.0, 0.0, -1.0)])
            .unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.value_range(), Some((-1.0, 3.0)));
    }
}
