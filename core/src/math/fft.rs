use num_complex::{Complex32, Complex64};
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps the `rustfft` planner for reuse across capture blocks.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let buffer = vec![Complex64::zero(); size];
        Self { fft, buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Squared-magnitude spectrum of `block`, shifted so index 0 holds the
    /// lowest frequency bin. Short blocks are zero-padded.
    pub fn shifted_power(&mut self, block: &[Complex32]) -> Vec<f64> {
        for (slot, sample) in self.buffer.iter_mut().zip(
            block
                .iter()
                .map(|s| Complex64::new(s.re as f64, s.im as f64))
                .chain(std::iter::repeat(Complex64::zero())),
        ) {
            *slot = sample;
        }
        self.fft.process(&mut self.buffer);

        let mut power: Vec<f64> = self.buffer.iter().map(|c| c.norm_sqr()).collect();
        let half = power.len() / 2;
        power.rotate_right(half);
        power
    }

    /// Bin frequencies matching [`FftHelper::shifted_power`], offset onto the
    /// tuned center frequency.
    pub fn shifted_frequencies(size: usize, sample_rate: f64, center_freq: f64) -> Vec<f64> {
        let resolution = sample_rate / size as f64;
        let half = (size / 2) as f64;
        (0..size)
            .map(|k| (k as f64 - half) * resolution + center_freq)
            .collect()
    }
}
