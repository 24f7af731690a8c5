use crate::device::SamplingDevice;
use crate::math::fft::FftHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::{DeviceError, ScanConfig, SurveyError, SurveyResult};
use crate::telemetry::log::LogManager;
use std::ops::Range;

/// Reduces repeated capture blocks to one band-integrated intensity in dB.
///
/// Each block is transformed, shifted to ascending frequency and squared; the
/// bins inside `[center - bandwidth, center + bandwidth]` are summed. Sums are
/// averaged in linear units and only the mean is converted to decibels. A
/// zero bandwidth integrates the single bin nearest the band center.
pub struct SpectrumReducer {
    capture_samples: usize,
    max_captures: usize,
    fft: FftHelper,
    logger: LogManager,
}

impl SpectrumReducer {
    pub fn new(capture_samples: usize, max_captures: usize) -> Self {
        let capture_samples = capture_samples.max(1);
        Self {
            capture_samples,
            max_captures: max_captures.max(1),
            fft: FftHelper::new(capture_samples),
            logger: LogManager::new(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.capture_samples, config.max_captures)
    }

    pub fn capture_samples(&self) -> usize {
        self.capture_samples
    }

    /// Blocks needed to cover `target_secs`, at least one and never more
    /// than the configured ceiling.
    pub fn capture_count(&self, sample_rate: f64, target_secs: f64) -> usize {
        let time_per_capture = self.capture_samples as f64 / sample_rate;
        let wanted = (target_secs / time_per_capture).round();
        let count = if wanted.is_nan() {
            1
        } else {
            (wanted as usize).max(1)
        };
        if count > self.max_captures {
            log::warn!(
                "averaging {}s needs {} captures; capped at {}",
                target_secs,
                count,
                self.max_captures
            );
            return self.max_captures;
        }
        count
    }

    /// Shifted-spectrum bin range integrated for the requested band.
    pub fn band_bins(
        &self,
        sample_rate: f64,
        tuned_center: f64,
        band_center: f64,
        bandwidth_hz: f64,
    ) -> SurveyResult<Range<usize>> {
        let freqs = FftHelper::shifted_frequencies(self.capture_samples, sample_rate, tuned_center);

        if bandwidth_hz <= 0.0 {
            let nearest = freqs
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    (a.1 - band_center)
                        .abs()
                        .total_cmp(&(b.1 - band_center).abs())
                })
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            return Ok(nearest..nearest + 1);
        }

        let low = band_center - bandwidth_hz;
        let high = band_center + bandwidth_hz;
        let start = freqs.partition_point(|&f| f < low);
        let end = freqs.partition_point(|&f| f <= high);
        if start >= end {
            return Err(SurveyError::EmptyBand {
                center_hz: band_center,
                bandwidth_hz,
                resolution_hz: sample_rate / self.capture_samples as f64,
            });
        }
        Ok(start..end)
    }

    /// Captures from `source` for roughly `target_secs` and returns the mean
    /// band power in dB. The frequency axis is centered on the source's tuned
    /// frequency; the band on `center_freq`.
    pub fn reduce<S: SamplingDevice + ?Sized>(
        &mut self,
        source: &mut S,
        center_freq: f64,
        bandwidth_hz: f64,
        target_secs: f64,
    ) -> SurveyResult<f64> {
        let sample_rate = source.sample_rate();
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SurveyError::InvalidConfig(format!(
                "receiver reports sample rate {}",
                sample_rate
            )));
        }

        let bins = self.band_bins(
            sample_rate,
            source.center_frequency(),
            center_freq,
            bandwidth_hz,
        )?;
        let captures = self.capture_count(sample_rate, target_secs);
        self.logger.record(&format!(
            "Performing {} captures, each {:.3}s, over {} bins",
            captures,
            self.capture_samples as f64 / sample_rate,
            bins.len()
        ));

        let mut band_powers = Vec::with_capacity(captures);
        for _ in 0..captures {
            let block = source.capture_block(self.capture_samples)?;
            if block.len() != self.capture_samples {
                return Err(DeviceError::Capture(format!(
                    "expected {} samples, received {}",
                    self.capture_samples,
                    block.len()
                ))
                .into());
            }
            let power = self.fft.shifted_power(&block);
            band_powers.push(power[bins.clone()].iter().sum::<f64>());
        }

        let mean = StatsHelper::mean(&band_powers).unwrap_or(0.0);
        let intensity_db = StatsHelper::power_to_db(mean);
        self.logger.record(&format!(
            "Averaged power: {:.2} dB from {} captures",
            intensity_db, captures
        ));
        Ok(intensity_db)
    }
}
