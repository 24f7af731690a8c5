//! Scripted devices shared by the unit tests.

use crate::device::{PointingDevice, SamplingDevice};
use crate::prelude::{DeviceError, DeviceResult, SkyPoint};
use num_complex::Complex32;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct MountLog {
    pub connects: usize,
    pub disconnects: usize,
    pub slews: Vec<SkyPoint>,
    pub polls: usize,
}

pub struct MockMount {
    pub log: Arc<Mutex<MountLog>>,
    position: SkyPoint,
    busy_polls: usize,
    remaining: usize,
    stuck: bool,
    fail_connect: bool,
    fail_slew_at: Option<usize>,
}

impl MockMount {
    pub fn at(position: SkyPoint) -> Self {
        Self {
            log: Arc::new(Mutex::new(MountLog::default())),
            position,
            busy_polls: 0,
            remaining: 0,
            stuck: false,
            fail_connect: false,
            fail_slew_at: None,
        }
    }

    /// Reports "still moving" for `polls` checks after every slew.
    pub fn busy_for(mut self, polls: usize) -> Self {
        self.busy_polls = polls;
        self
    }

    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_slew_at(mut self, slew_number: usize) -> Self {
        self.fail_slew_at = Some(slew_number);
        self
    }
}

impl PointingDevice for MockMount {
    fn connect(&mut self) -> DeviceResult<()> {
        if self.fail_connect {
            return Err(DeviceError::Connect("mount not responding".into()));
        }
        self.log.lock().unwrap().connects += 1;
        Ok(())
    }

    fn current_position(&mut self) -> DeviceResult<SkyPoint> {
        Ok(self.position)
    }

    fn slew_to(&mut self, target: SkyPoint) -> DeviceResult<()> {
        let mut log = self.log.lock().unwrap();
        if self.fail_slew_at == Some(log.slews.len()) {
            return Err(DeviceError::Slew("axis fault".into()));
        }
        log.slews.push(target);
        self.position = target;
        self.remaining = self.busy_polls;
        Ok(())
    }

    fn is_slewing(&mut self) -> DeviceResult<bool> {
        self.log.lock().unwrap().polls += 1;
        if self.stuck {
            return Ok(true);
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn disconnect(&mut self) {
        self.log.lock().unwrap().disconnects += 1;
    }
}

#[derive(Debug, Default)]
pub struct ReceiverLog {
    pub configured: Option<(f64, f64, f64)>,
    pub captures: usize,
    pub closes: usize,
}

/// Receiver returning a constant DC block of the given amplitude, so the
/// center bin holds `(amplitude * n)^2` and every other bin is empty.
pub struct MockReceiver {
    pub log: Arc<Mutex<ReceiverLog>>,
    amplitude: f32,
    sample_rate: f64,
    center_freq: f64,
    fail_capture_at: Option<usize>,
    short_blocks: bool,
}

impl MockReceiver {
    pub fn constant(amplitude: f32, sample_rate: f64, center_freq: f64) -> Self {
        Self {
            log: Arc::new(Mutex::new(ReceiverLog::default())),
            amplitude,
            sample_rate,
            center_freq,
            fail_capture_at: None,
            short_blocks: false,
        }
    }

    pub fn failing_capture_at(mut self, capture_number: usize) -> Self {
        self.fail_capture_at = Some(capture_number);
        self
    }

    pub fn short_blocks(mut self) -> Self {
        self.short_blocks = true;
        self
    }
}

impl SamplingDevice for MockReceiver {
    fn configure(&mut self, sample_rate: f64, center_freq: f64, gain: f64) -> DeviceResult<()> {
        self.sample_rate = sample_rate;
        self.center_freq = center_freq;
        self.log.lock().unwrap().configured = Some((sample_rate, center_freq, gain));
        Ok(())
    }

    fn capture_block(&mut self, count: usize) -> DeviceResult<Vec<Complex32>> {
        let mut log = self.log.lock().unwrap();
        if self.fail_capture_at == Some(log.captures) {
            return Err(DeviceError::Capture("usb transfer stalled".into()));
        }
        log.captures += 1;
        let len = if self.short_blocks { count / 2 } else { count };
        Ok(vec![Complex32::new(self.amplitude, 0.0); len])
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn center_frequency(&self) -> f64 {
        self.center_freq
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}
