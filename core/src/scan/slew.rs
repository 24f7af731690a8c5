use crate::device::{PointingDevice, PointingLease};
use crate::prelude::{SkyPoint, SurveyError, SurveyResult};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Polls `is_slewing` every `poll` until the mount reports it has stopped.
///
/// The first check happens one interval after the call. Fails with
/// `SlewTimeout` once the mount is still moving at `timeout`.
pub async fn wait_for_slew<P: PointingDevice + ?Sized>(
    pointing: &mut P,
    poll: Duration,
    timeout: Duration,
    index: usize,
) -> SurveyResult<()> {
    let started = Instant::now();
    let mut ticker = time::interval_at(started + poll, poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !pointing.is_slewing()? {
            return Ok(());
        }
        if started.elapsed() >= timeout {
            return Err(SurveyError::SlewTimeout { index, timeout });
        }
    }
}

/// Points the mount at `target` outside of a survey and waits for it to
/// arrive. The connection is released whether or not the slew succeeds.
pub async fn slew_to_target<P: PointingDevice>(
    device: P,
    target: SkyPoint,
    poll: Duration,
    timeout: Duration,
) -> SurveyResult<SkyPoint> {
    target.validate()?;

    let mut pointing = PointingLease::new(device);
    pointing.connect()?;
    log::info!("slewing to RA {:.2} deg, Dec {:.2} deg", target.ra, target.dec);
    pointing.slew_to(target)?;
    wait_for_slew(&mut *pointing, poll, timeout, 0).await?;
    let arrived = pointing.current_position()?;
    log::info!(
        "slew complete at RA {:.2} deg, Dec {:.2} deg",
        arrived.ra,
        arrived.dec
    );
    Ok(arrived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{DEFAULT_POLL_INTERVAL, DEFAULT_SLEW_TIMEOUT};
    use crate::testing::MockMount;

    #[tokio::test(start_paused = true)]
    async fn waits_until_motion_stops() {
        let mut mount = MockMount::at(SkyPoint::new(0.0, 0.0)).busy_for(3);
        mount.slew_to(SkyPoint::new(1.0, 1.0)).unwrap();
        let started = Instant::now();
        wait_for_slew(&mut mount, DEFAULT_POLL_INTERVAL, DEFAULT_SLEW_TIMEOUT, 0)
            .await
            .unwrap();
        assert_eq!(mount.log.lock().unwrap().polls, 4);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_mount_times_out_at_ceiling() {
        let mut mount = MockMount::at(SkyPoint::new(0.0, 0.0)).stuck();
        let started = Instant::now();
        let err = wait_for_slew(&mut mount, DEFAULT_POLL_INTERVAL, DEFAULT_SLEW_TIMEOUT, 6)
            .await
            .unwrap_err();
        assert!(matches!(err, SurveyError::SlewTimeout { index: 6, .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_SLEW_TIMEOUT);
        assert!(elapsed < DEFAULT_SLEW_TIMEOUT + DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn slew_tool_rejects_bad_target_without_connecting() {
        let mount = MockMount::at(SkyPoint::new(0.0, 0.0));
        let log = mount.log.clone();
        let err = slew_to_target(
            mount,
            SkyPoint::new(400.0, 0.0),
            DEFAULT_POLL_INTERVAL,
            DEFAULT_SLEW_TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidConfig(_)));
        assert_eq!(log.lock().unwrap().connects, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slew_tool_releases_mount_after_arrival() {
        let mount = MockMount::at(SkyPoint::new(0.0, 0.0)).busy_for(2);
        let log = mount.log.clone();
        let arrived = slew_to_target(
            mount,
            SkyPoint::new(83.6, 22.0),
            DEFAULT_POLL_INTERVAL,
            DEFAULT_SLEW_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(arrived, SkyPoint::new(83.6, 22.0));
        let log = log.lock().unwrap();
        assert_eq!((log.connects, log.disconnects), (1, 1));
    }
}
