//! Stand-in mount and receiver for running surveys without hardware.

pub mod mount;
pub mod receiver;

pub use mount::{MountProfile, SimulatedMount};
pub use receiver::{ReceiverProfile, SimulatedReceiver};

use h1core::SkyPoint;
use std::sync::{Arc, Mutex};

/// Where the simulated mount currently points; read by the receiver.
pub type SharedPointing = Arc<Mutex<SkyPoint>>;

/// Mount and receiver sharing one pointing.
pub fn build_pair(
    mount: &MountProfile,
    receiver: &ReceiverProfile,
) -> (SimulatedMount, SimulatedReceiver) {
    let pointing: SharedPointing = Arc::new(Mutex::new(mount.start()));
    (
        SimulatedMount::new(mount.slew_polls, pointing.clone()),
        SimulatedReceiver::new(receiver.clone(), pointing),
    )
}
