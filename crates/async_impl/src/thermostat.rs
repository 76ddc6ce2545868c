use log::info;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Duration, Instant};

use common::metrics::TickRecord;
use common::{ControlError, FuzzyThermostat, Sensor, Signal, TickRecorder};

/// Thermostat task: one fuzzy decision per polling interval, pushing the
/// signal to the AC unit only on change. The first decision is immediate;
/// afterwards pacing is by absolute deadline. Shutdown wakes the task
/// mid-sleep.
pub async fn run_thermostat_task(
    mut engine: FuzzyThermostat,
    sensor: Sensor,
    signal_tx: mpsc::Sender<Signal>,
    recorder: TickRecorder,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ControlError> {
    let started = Instant::now();
    let mut previous = Signal::Off;
    let mut ticks: u64 = 0;
    // Bootstrap tick fires immediately.
    let mut next_tick = started;

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = shutdown.changed() => continue,
            _ = sleep_until(next_tick) => {}
        }
        next_tick = Instant::now() + interval;

        let reading = sensor.read_temperature();
        let signal = engine.evaluate(reading, started.elapsed());

        let changed = signal != previous;
        if changed {
            info!("thermostat: signal changed to {:+.1}", signal.value());
            if signal_tx.send(signal).await.is_err() {
                return Err(ControlError::SignalChannelClosed {
                    controller: "thermostat".to_string(),
                });
            }
        }

        recorder.record(TickRecord {
            tick: ticks,
            source: "thermostat".to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            temperature: reading,
            signal: signal.value(),
            load: signal.load().unwrap_or(0.0),
            signal_changed: changed,
        });
        previous = signal;
        ticks += 1;
    }

    info!("thermostat: exiting");
    Ok(())
}
