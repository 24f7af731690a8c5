use crate::dataset::Reading;

/// Equal-width histogram of reading intensities in dB.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityHistogram {
    pub min_db: f64,
    pub max_db: f64,
    pub counts: Vec<usize>,
}

impl IntensityHistogram {
    pub fn from_readings(readings: &[Reading], bins: usize) -> Option<Self> {
        if readings.is_empty() || bins == 0 {
            return None;
        }
        let (min_db, max_db) = readings.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), r| (low.min(r.intensity_db), high.max(r.intensity_db)),
        );

        let mut counts = vec![0; bins];
        let span = max_db - min_db;
        for reading in readings {
            let bin = if span > 0.0 {
                (((reading.intensity_db - min_db) / span) * bins as f64) as usize
            } else {
                0
            };
            // the maximum belongs to the last bin
            counts[bin.min(bins - 1)] += 1;
        }

        Some(Self {
            min_db,
            max_db,
            counts,
        })
    }

    pub fn bin_width(&self) -> f64 {
        (self.max_db - self.min_db) / self.counts.len() as f64
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
