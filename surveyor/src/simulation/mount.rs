use super::SharedPointing;
use h1core::device::PointingDevice;
use h1core::prelude::{DeviceError, DeviceResult, SkyPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountProfile {
    pub start_ra: f64,
    pub start_dec: f64,
    /// Status polls reporting motion after each slew command.
    pub slew_polls: usize,
}

impl Default for MountProfile {
    fn default() -> Self {
        Self {
            start_ra: 83.6,
            start_dec: 22.0,
            slew_polls: 5,
        }
    }
}

impl MountProfile {
    pub fn start(&self) -> SkyPoint {
        SkyPoint::new(self.start_ra, self.start_dec)
    }
}

/// Mount that arrives after a fixed number of status polls.
pub struct SimulatedMount {
    pointing: SharedPointing,
    slew_polls: usize,
    target: Option<SkyPoint>,
    remaining: usize,
    connected: bool,
}

impl SimulatedMount {
    pub fn new(slew_polls: usize, pointing: SharedPointing) -> Self {
        Self {
            pointing,
            slew_polls,
            target: None,
            remaining: 0,
            connected: false,
        }
    }

    fn ensure_connected(&self, action: &str) -> DeviceResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(DeviceError::Position(format!("{action} while disconnected")))
        }
    }
}

impl PointingDevice for SimulatedMount {
    fn connect(&mut self) -> DeviceResult<()> {
        self.connected = true;
        log::info!("Telescope connected successfully.");
        Ok(())
    }

    fn current_position(&mut self) -> DeviceResult<SkyPoint> {
        self.ensure_connected("position query")?;
        self.pointing
            .lock()
            .map(|point| *point)
            .map_err(|_| DeviceError::Position("pointing state poisoned".into()))
    }

    fn slew_to(&mut self, target: SkyPoint) -> DeviceResult<()> {
        if !self.connected {
            return Err(DeviceError::Slew("slew while disconnected".into()));
        }
        if !(-90.0..=90.0).contains(&target.dec) {
            return Err(DeviceError::Slew(format!(
                "declination {} out of range",
                target.dec
            )));
        }
        self.target = Some(target);
        self.remaining = self.slew_polls;
        Ok(())
    }

    fn is_slewing(&mut self) -> DeviceResult<bool> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(true);
        }
        if let Some(target) = self.target.take() {
            let mut pointing = self
                .pointing
                .lock()
                .map_err(|_| DeviceError::Slew("pointing state poisoned".into()))?;
            *pointing = target;
        }
        Ok(false)
    }

    fn disconnect(&mut self) {
        self.connected = false;
        log::info!("Telescope disconnected.");
    }
}
