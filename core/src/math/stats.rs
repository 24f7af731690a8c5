/// Offset added before taking a logarithm so silent bands stay finite.
pub const POWER_EPSILON: f64 = 1e-10;

pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn linear_to_db(linear: f64) -> f64 {
        10.0 * linear.log10()
    }

    pub fn db_to_linear(db: f64) -> f64 {
        10f64.powf(db / 10.0)
    }

    /// Decibel value of a linear power with [`POWER_EPSILON`] added.
    pub fn power_to_db(power: f64) -> f64 {
        Self::linear_to_db(power + POWER_EPSILON)
    }

    /// `count` evenly spaced samples spanning `[start, stop]`, endpoints
    /// included. A single sample yields `start`.
    pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (count - 1) as f64;
                (0..count)
                    .map(|i| {
                        if i == count - 1 {
                            stop
                        } else {
                            start + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}
