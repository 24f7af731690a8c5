use super::SharedPointing;
use h1core::device::SamplingDevice;
use h1core::prelude::{DeviceError, DeviceResult};
use num_complex::Complex32;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Synthetic sky: a Gaussian hydrogen cloud seen as a tone near the tuned
/// frequency, on top of uniform receiver noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverProfile {
    pub noise: f32,
    pub line_amplitude: f32,
    /// Tone offset from the tuned frequency, in Hz.
    pub line_offset_hz: f64,
    pub source_ra: f64,
    pub source_dec: f64,
    pub source_width_deg: f64,
    pub seed: u64,
}

impl Default for ReceiverProfile {
    fn default() -> Self {
        Self {
            noise: 0.05,
            line_amplitude: 0.5,
            line_offset_hz: 2_000.0,
            source_ra: 83.6,
            source_dec: 22.0,
            source_width_deg: 3.0,
            seed: 0,
        }
    }
}

pub struct SimulatedReceiver {
    profile: ReceiverProfile,
    pointing: SharedPointing,
    rng: StdRng,
    sample_rate: f64,
    center_freq: f64,
    gain_db: f64,
    open: bool,
}

impl SimulatedReceiver {
    pub fn new(profile: ReceiverProfile, pointing: SharedPointing) -> Self {
        Self {
            rng: StdRng::seed_from_u64(profile.seed),
            profile,
            pointing,
            sample_rate: 0.0,
            center_freq: 0.0,
            gain_db: 0.0,
            open: true,
        }
    }

    /// Line amplitude scaled by the cloud's brightness at the current pointing.
    fn line_strength(&self) -> DeviceResult<f64> {
        let pointing = self
            .pointing
            .lock()
            .map_err(|_| DeviceError::Capture("pointing state poisoned".into()))?;
        let d_ra = pointing.ra - self.profile.source_ra;
        let d_dec = pointing.dec - self.profile.source_dec;
        let sigma = self.profile.source_width_deg.max(f64::EPSILON);
        let falloff = (-(d_ra * d_ra + d_dec * d_dec) / (2.0 * sigma * sigma)).exp();
        Ok(self.profile.line_amplitude as f64 * falloff)
    }

    fn synthesize(&mut self, count: usize, strength: f64) -> Vec<Complex32> {
        let mut samples = Vec::with_capacity(count);
        let gain = 10f64.powf(self.gain_db / 20.0);
        let step = 2.0 * PI * self.profile.line_offset_hz / self.sample_rate;
        let noise = self.profile.noise;

        for index in 0..count {
            let phase = step * index as f64;
            let (mut re, mut im) = (
                (strength * phase.cos()) as f32,
                (strength * phase.sin()) as f32,
            );
            if noise > 0.0 {
                re += self.rng.gen_range(-noise..noise);
                im += self.rng.gen_range(-noise..noise);
            }
            samples.push(Complex32::new(re * gain as f32, im * gain as f32));
        }
        samples
    }
}

impl SamplingDevice for SimulatedReceiver {
    fn configure(&mut self, sample_rate: f64, center_freq: f64, gain: f64) -> DeviceResult<()> {
        if sample_rate <= 0.0 {
            return Err(DeviceError::Configure(format!(
                "unsupported sample rate {}",
                sample_rate
            )));
        }
        self.sample_rate = sample_rate;
        self.center_freq = center_freq;
        self.gain_db = gain;
        self.open = true;
        Ok(())
    }

    fn capture_block(&mut self, count: usize) -> DeviceResult<Vec<Complex32>> {
        if !self.open {
            return Err(DeviceError::Capture("receiver closed".into()));
        }
        if self.sample_rate <= 0.0 {
            return Err(DeviceError::Capture("receiver not configured".into()));
        }
        let strength = self.line_strength()?;
        Ok(self.synthesize(count, strength))
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn center_frequency(&self) -> f64 {
        self.center_freq
    }

    fn close(&mut self) {
        self.open = false;
        log::info!("Receiver closed.");
    }
}
