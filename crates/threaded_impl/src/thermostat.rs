use std::sync::mpsc::SyncSender;
use std::time::{Duration, Instant};

use log::info;

use common::metrics::TickRecord;
use common::{ControlError, Controller, FuzzyThermostat, Sensor, Signal, TickRecorder};

/// Thermostat control loop body: samples the sensor, runs the fuzzy engine,
/// and pushes the signal to the AC unit only when it changed from the
/// previously committed one.
pub struct ThermostatController {
    engine: FuzzyThermostat,
    sensor: Sensor,
    signal_tx: SyncSender<Signal>,
    recorder: TickRecorder,
    interval: Duration,
    started: Instant,
    ticks: u64,
}

impl ThermostatController {
    pub fn new(
        engine: FuzzyThermostat,
        sensor: Sensor,
        signal_tx: SyncSender<Signal>,
        recorder: TickRecorder,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            sensor,
            signal_tx,
            recorder,
            interval,
            started: Instant::now(),
            ticks: 0,
        }
    }
}

impl Controller for ThermostatController {
    fn name(&self) -> &str {
        "thermostat"
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    /// The first decision happens immediately at start; only later ticks
    /// pace themselves by the polling interval.
    fn pace_before_tick(&self) -> Duration {
        if self.ticks == 0 {
            Duration::ZERO
        } else {
            self.interval
        }
    }

    fn tick(&mut self, previous: Signal) -> Result<Signal, ControlError> {
        let reading = self.sensor.read_temperature();
        let signal = self.engine.evaluate(reading, self.started.elapsed());

        let changed = signal != previous;
        if changed {
            info!("thermostat: signal changed to {:+.1}", signal.value());
            self.signal_tx
                .send(signal)
                .map_err(|_| ControlError::SignalChannelClosed {
                    controller: "thermostat".to_string(),
                })?;
        }

        self.recorder.record(TickRecord {
            tick: self.ticks,
            source: "thermostat".to_string(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            temperature: reading,
            signal: signal.value(),
            load: signal.load().unwrap_or(0.0),
            signal_changed: changed,
        });
        self.ticks += 1;
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Room;
    use std::sync::mpsc;

    fn controller(room: &Room, target: f64) -> (ThermostatController, mpsc::Receiver<Signal>) {
        let (tx, rx) = mpsc::sync_channel(16);
        let engine = FuzzyThermostat::new(target, Duration::from_secs(5), 0.1, 0.2);
        let controller = ThermostatController::new(
            engine,
            Sensor::new(room.clone()),
            tx,
            TickRecorder::new(),
            Duration::from_secs(5),
        );
        (controller, rx)
    }

    #[test]
    fn dead_band_sends_nothing() {
        // Room held exactly at target: every tick computes Off, which never
        // differs from the committed previous signal, so the AC unit hears
        // nothing at all.
        let room = Room::new(72.0);
        let (mut controller, rx) = controller(&room, 72.0);
        let mut previous = Signal::Off;
        for _ in 0..5 {
            previous = controller.tick(previous).unwrap();
            assert_eq!(previous, Signal::Off);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn equal_consecutive_signals_push_once() {
        let room = Room::new(81.0);
        let (mut controller, rx) = controller(&room, 72.0);
        let first = controller.tick(Signal::Off).unwrap();
        assert_eq!(first, Signal::Cool);
        let second = controller.tick(first).unwrap();
        assert_eq!(second, Signal::Cool);
        // Only the tick where the value first became Cool pushed it.
        assert_eq!(rx.try_recv().unwrap(), Signal::Cool);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn first_tick_is_not_paced() {
        let room = Room::new(81.0);
        let (mut controller, _rx) = controller(&room, 72.0);
        assert_eq!(controller.pace_before_tick(), Duration::ZERO);
        controller.tick(Signal::Off).unwrap();
        assert_eq!(controller.pace_before_tick(), Duration::from_secs(5));
    }

    #[test]
    fn closed_channel_is_fatal() {
        let room = Room::new(81.0);
        let (mut controller, rx) = controller(&room, 72.0);
        drop(rx);
        assert!(matches!(
            controller.tick(Signal::Off),
            Err(ControlError::SignalChannelClosed { .. })
        ));
    }
}
