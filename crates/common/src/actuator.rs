use log::{debug, info};

use crate::room::Room;
use crate::{Mode, Signal};

/// Absolute temperature change (in F) one tick causes at 100% load.
pub const DEFAULT_COOLING_FACTOR: f64 = 0.02;

/// Response model of the heating/cooling unit. Translates the most recently
/// received signal into a sustained per-tick effect on the room.
///
/// Mode and load are owned exclusively by the loop driving this unit; other
/// loops influence them only by delivering [`Signal`]s, so there is no shared
/// mutable state to guard here.
#[derive(Debug)]
pub struct AcUnit {
    room: Room,
    mode: Mode,
    load: f64,
    cooling_factor: f64,
    signal: Signal,
}

impl AcUnit {
    pub fn new(room: Room) -> Self {
        Self::with_cooling_factor(room, DEFAULT_COOLING_FACTOR)
    }

    pub fn with_cooling_factor(room: Room, cooling_factor: f64) -> Self {
        Self {
            room,
            mode: Mode::Idle,
            load: 1.0,
            cooling_factor,
            signal: Signal::Off,
        }
    }

    /// Records a new control signal, deriving mode from its sign and load
    /// from its magnitude. `Off` switches the unit idle but leaves the load
    /// untouched (it only matters once the unit runs again).
    pub fn set_signal(&mut self, signal: Signal) {
        self.signal = signal;
        self.mode = signal.mode();
        if let Some(load) = signal.load() {
            self.load = load;
        }
        info!(
            "AC unit received new signal {:+.1} (mode {:?}, load {:.2})",
            signal.value(),
            self.mode,
            self.load
        );
    }

    /// One actuator tick: nudges the room temperature by
    /// `cooling_factor * load` in the direction of the current mode.
    pub fn tick(&mut self) {
        let delta = self.cooling_factor * self.load;
        match self.mode {
            Mode::Cooling => self.room.adjust(-delta),
            Mode::Heating => self.room.adjust(delta),
            Mode::Idle => {}
        }
        debug!(
            "AC unit tick: mode {:?}, load {:.2}, room now {:.4}",
            self.mode,
            self.load,
            self.room.temperature()
        );
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn current_signal(&self) -> Signal {
        self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooling_at_full_load_drops_by_cooling_factor() {
        let room = Room::new(81.0);
        let mut unit = AcUnit::new(room.clone());
        unit.set_signal(Signal::HighCool);
        unit.tick();
        assert!((room.temperature() - (81.0 - DEFAULT_COOLING_FACTOR)).abs() < 1e-12);
    }

    #[test]
    fn heating_at_partial_load_scales_the_delta() {
        let room = Room::new(60.0);
        let mut unit = AcUnit::new(room.clone());
        unit.set_signal(Signal::Heat);
        unit.tick();
        let expected = 60.0 + DEFAULT_COOLING_FACTOR * 0.66;
        assert!((room.temperature() - expected).abs() < 1e-12);
    }

    #[test]
    fn idle_leaves_the_room_alone() {
        let room = Room::new(72.0);
        let mut unit = AcUnit::new(room.clone());
        unit.set_signal(Signal::Off);
        unit.tick();
        assert_eq!(room.temperature(), 72.0);
    }

    #[test]
    fn off_keeps_previous_load() {
        let room = Room::new(72.0);
        let mut unit = AcUnit::new(room.clone());
        unit.set_signal(Signal::Cool);
        assert_eq!(unit.load(), 0.66);
        unit.set_signal(Signal::Off);
        assert_eq!(unit.mode(), Mode::Idle);
        assert_eq!(unit.load(), 0.66);
    }

    #[test]
    fn concrete_scenario_mode_and_load() {
        // Cool (-3) must put the unit in cooling at 0.66 load.
        let room = Room::new(81.0);
        let mut unit = AcUnit::new(room);
        unit.set_signal(Signal::Cool);
        assert_eq!(unit.mode(), Mode::Cooling);
        assert_eq!(unit.load(), 0.66);
    }
}
