//! Hardware collaborators driven by the scan core.
//!
//! Mount command protocols and receiver drivers live behind these traits;
//! the core only sees the operations below.

pub mod lease;

pub use lease::{PointingLease, SamplerLease};

use crate::prelude::{DeviceResult, SkyPoint};
use num_complex::Complex32;

/// Steerable mount. Coordinates are in degrees.
pub trait PointingDevice {
    fn connect(&mut self) -> DeviceResult<()>;
    fn current_position(&mut self) -> DeviceResult<SkyPoint>;
    /// Starts motion toward `target` and returns without waiting.
    fn slew_to(&mut self, target: SkyPoint) -> DeviceResult<()>;
    fn is_slewing(&mut self) -> DeviceResult<bool>;
    fn disconnect(&mut self);
}

/// Complex baseband receiver.
pub trait SamplingDevice {
    fn configure(&mut self, sample_rate: f64, center_freq: f64, gain: f64) -> DeviceResult<()>;
    /// Blocks until `count` samples have been read.
    fn capture_block(&mut self, count: usize) -> DeviceResult<Vec<Complex32>>;
    fn sample_rate(&self) -> f64;
    fn center_frequency(&self) -> f64;
    fn close(&mut self);
}

impl<T: PointingDevice + ?Sized> PointingDevice for Box<T> {
    fn connect(&mut self) -> DeviceResult<()> {
        (**self).connect()
    }

    fn current_position(&mut self) -> DeviceResult<SkyPoint> {
        (**self).current_position()
    }

    fn slew_to(&mut self, target: SkyPoint) -> DeviceResult<()> {
        (**self).slew_to(target)
    }

    fn is_slewing(&mut self) -> DeviceResult<bool> {
        (**self).is_slewing()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}

impl<T: SamplingDevice + ?Sized> SamplingDevice for Box<T> {
    fn configure(&mut self, sample_rate: f64, center_freq: f64, gain: f64) -> DeviceResult<()> {
        (**self).configure(sample_rate, center_freq, gain)
    }

    fn capture_block(&mut self, count: usize) -> DeviceResult<Vec<Complex32>> {
        (**self).capture_block(count)
    }

    fn sample_rate(&self) -> f64 {
        (**self).sample_rate()
    }

    fn center_frequency(&self) -> f64 {
        (**self).center_frequency()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
