use log::info;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Duration, Instant};

use common::metrics::TickRecord;
use common::{AcUnit, ControlError, Room, Signal, TickRecorder};

/// AC unit task: every tick it drains whatever signals arrived since the
/// last one (newest wins), then applies the unit's temperature delta to the
/// room. A vanished thermostat is not fatal; the unit sustains its last
/// signal.
pub async fn run_actuator_task(
    mut unit: AcUnit,
    room: Room,
    mut signal_rx: mpsc::Receiver<Signal>,
    recorder: TickRecorder,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ControlError> {
    let started = Instant::now();
    let mut ticks: u64 = 0;
    let mut next_tick = started + interval;

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = shutdown.changed() => continue,
            _ = sleep_until(next_tick) => {}
        }
        next_tick += interval;

        let mut latest = None;
        while let Ok(signal) = signal_rx.try_recv() {
            latest = Some(signal);
        }
        let changed = latest.is_some();
        if let Some(signal) = latest {
            unit.set_signal(signal);
        }
        unit.tick();

        recorder.record(TickRecord {
            tick: ticks,
            source: "ac-unit".to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            temperature: room.temperature(),
            signal: unit.current_signal().value(),
            load: unit.load(),
            signal_changed: changed,
        });
        ticks += 1;
    }

    info!("ac-unit: exiting");
    Ok(())
}
