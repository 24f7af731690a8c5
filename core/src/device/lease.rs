use super::{PointingDevice, SamplingDevice};
use crate::prelude::DeviceResult;
use std::ops::{Deref, DerefMut};

/// Exclusive hold on a mount. Disconnects on drop if a connection was made.
pub struct PointingLease<P: PointingDevice> {
    device: P,
    connected: bool,
}

impl<P: PointingDevice> PointingLease<P> {
    pub fn new(device: P) -> Self {
        Self {
            device,
            connected: false,
        }
    }

    /// Single connection attempt; any retrying is the device's business.
    pub fn connect(&mut self) -> DeviceResult<()> {
        self.device.connect()?;
        self.connected = true;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn release(&mut self) {
        if self.connected {
            self.device.disconnect();
            self.connected = false;
            log::debug!("pointing device released");
        }
    }
}

impl<P: PointingDevice> Deref for PointingLease<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.device
    }
}

impl<P: PointingDevice> DerefMut for PointingLease<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.device
    }
}

impl<P: PointingDevice> Drop for PointingLease<P> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Exclusive hold on a receiver. Closes it exactly once, on release or drop.
pub struct SamplerLease<S: SamplingDevice> {
    device: S,
    open: bool,
}

impl<S: SamplingDevice> SamplerLease<S> {
    pub fn new(device: S) -> Self {
        Self { device, open: true }
    }

    pub fn release(&mut self) {
        if self.open {
            self.device.close();
            self.open = false;
            log::debug!("sampling device released");
        }
    }
}

impl<S: SamplingDevice> Deref for SamplerLease<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.device
    }
}

impl<S: SamplingDevice> DerefMut for SamplerLease<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.device
    }
}

impl<S: SamplingDevice> Drop for SamplerLease<S> {
    fn drop(&mut self) {
        self.release();
    }
}
