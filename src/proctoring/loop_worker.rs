use std::sync::Weak;

use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::monitor::MonitorInner;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Runs one detection tick per `period` until cancelled or the monitor is gone.
///
/// Each tick is awaited before the next one is scheduled, so ticks never
/// overlap; a tick that outlives `tick_timeout` is dropped without committing.
pub(crate) async fn detection_loop(
    monitor: Weak<MonitorInner>,
    epoch: u64,
    period: Duration,
    tick_timeout: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick of a tokio interval completes immediately; detection starts one period in.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(inner) = monitor.upgrade() else {
                    log_info!("proctoring monitor dropped, detection loop exiting");
                    break;
                };

                match tokio::time::timeout(tick_timeout, inner.detection_tick(epoch)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => log_error!("detection tick failed: {err:?}"),
                    Err(_) => log_warn!(
                        "detection tick timeout (> {}ms), result discarded",
                        tick_timeout.as_millis()
                    ),
                }

                if !inner.is_current(epoch) {
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("detection loop shutting down");
                break;
            }
        }
    }
}
