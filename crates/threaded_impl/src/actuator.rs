use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use log::warn;

use common::metrics::TickRecord;
use common::{AcUnit, ControlError, Controller, Room, Signal, TickRecorder};

/// AC unit control loop body: drains any signals the thermostat sent since
/// the last tick (the newest one wins) and applies the unit's temperature
/// delta to the room.
pub struct ActuatorController {
    unit: AcUnit,
    room: Room,
    signal_rx: Receiver<Signal>,
    recorder: TickRecorder,
    interval: Duration,
    started: Instant,
    ticks: u64,
    peer_gone: bool,
}

impl ActuatorController {
    pub fn new(
        unit: AcUnit,
        room: Room,
        signal_rx: Receiver<Signal>,
        recorder: TickRecorder,
        interval: Duration,
    ) -> Self {
        Self {
            unit,
            room,
            signal_rx,
            recorder,
            interval,
            started: Instant::now(),
            ticks: 0,
            peer_gone: false,
        }
    }

    fn drain_signals(&mut self) -> Option<Signal> {
        let mut latest = None;
        loop {
            match self.signal_rx.try_recv() {
                Ok(signal) => latest = Some(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Thermostat is gone; keep sustaining the last signal.
                    if !self.peer_gone {
                        warn!("ac-unit: thermostat disconnected, holding last signal");
                        self.peer_gone = true;
                    }
                    break;
                }
            }
        }
        latest
    }
}

impl Controller for ActuatorController {
    fn name(&self) -> &str {
        "ac-unit"
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self, _previous: Signal) -> Result<Signal, ControlError> {
        let changed = if let Some(signal) = self.drain_signals() {
            self.unit.set_signal(signal);
            true
        } else {
            false
        };
        self.unit.tick();

        self.recorder.record(TickRecord {
            tick: self.ticks,
            source: "ac-unit".to_string(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            temperature: self.room.temperature(),
            signal: self.unit.current_signal().value(),
            load: self.unit.load(),
            signal_changed: changed,
        });
        self.ticks += 1;
        Ok(self.unit.current_signal())
    }
}
