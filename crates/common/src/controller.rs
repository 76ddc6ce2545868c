use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{error, info};

use crate::error::ControlError;
use crate::Signal;

/// A control element that acts once per polling interval. The generic
/// [`run_controller`] loop owns the lifecycle: it paces, invokes the tick,
/// and commits the returned signal as `previous` only after the tick
/// returns, which is what gives implementors change detection on the next
/// tick.
pub trait Controller {
    fn name(&self) -> &str;

    fn poll_interval(&self) -> Duration;

    /// How long to wait before the next tick. Defaults to the polling
    /// interval; controllers that want an immediate first decision (the
    /// thermostat's bootstrap tick) return zero once.
    fn pace_before_tick(&self) -> Duration {
        self.poll_interval()
    }

    /// One tick. `previous` is the signal committed by the prior completed
    /// tick. Returning an error is fatal for the owning loop.
    fn tick(&mut self, previous: Signal) -> Result<Signal, ControlError>;
}

/// Cooperative cancellation shared between a control loop and whoever wants
/// to stop it. Cancelling wakes a loop blocked in its pacing wait, so
/// shutdown is prompt instead of waiting out the full interval. Cancel is
/// idempotent and may happen before the loop ever starts.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (stopped, signal) = &*self.inner;
        *stopped.lock().unwrap() = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap()
    }

    /// Blocks for up to `duration`, returning early if cancelled. Returns
    /// true when the token was cancelled, false when the wait timed out.
    pub fn wait_for(&self, duration: Duration) -> bool {
        let (stopped, signal) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = stopped.lock().unwrap();
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, timeout) = signal.wait_timeout(cancelled, deadline - now).unwrap();
            cancelled = guard;
            if timeout.timed_out() {
                return *cancelled;
            }
        }
        true
    }
}

/// Drives a controller until the token is cancelled or a tick fails.
///
/// Cancellation is observed once per iteration: an in-flight tick always
/// completes, and the committed previous-signal bookkeeping happens after
/// each tick, never mid-tick. A tick error is treated as fatal for this
/// loop only; it is logged and returned.
pub fn run_controller<C: Controller>(
    mut controller: C,
    shutdown: &ShutdownToken,
) -> Result<(), ControlError> {
    let mut previous = Signal::Off;
    loop {
        if shutdown.wait_for(controller.pace_before_tick()) {
            break;
        }
        match controller.tick(previous) {
            Ok(signal) => previous = signal,
            Err(err) => {
                error!("{}: fatal tick failure: {}", controller.name(), err);
                return Err(err);
            }
        }
    }
    info!("{}: exiting", controller.name());
    Ok(())
}
