use serde::{Deserialize, Serialize};

pub mod actuator;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod room;
pub mod thermostat;

pub use actuator::AcUnit;
pub use config::SimConfig;
pub use controller::{Controller, ShutdownToken};
pub use error::ControlError;
pub use metrics::TickRecorder;
pub use room::{Room, Sensor};
pub use thermostat::FuzzyThermostat;

/// Discrete command sent from the thermostat to the AC unit. Sign encodes
/// direction (cooling vs heating), magnitude encodes intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    HighCool,
    Cool,
    LowCool,
    Off,
    LowHeat,
    Heat,
    HighHeat,
}

/// Operating mode of the AC unit, derived from the sign of the last signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Cooling,
    Heating,
    Idle,
}

impl Signal {
    /// Numeric value on the -5..=+5 control scale.
    pub fn value(self) -> f64 {
        match self {
            Signal::HighCool => -5.0,
            Signal::Cool => -3.0,
            Signal::LowCool => -1.5,
            Signal::Off => 0.0,
            Signal::LowHeat => 1.5,
            Signal::Heat => 3.0,
            Signal::HighHeat => 5.0,
        }
    }

    /// Fraction of full capacity the AC unit should run at for this signal.
    /// `Off` carries no load of its own; the unit keeps its previous load
    /// (the value is meaningless while idle).
    pub fn load(self) -> Option<f64> {
        match self {
            Signal::HighCool | Signal::HighHeat => Some(1.0),
            Signal::Cool | Signal::Heat => Some(0.66),
            Signal::LowCool | Signal::LowHeat => Some(0.33),
            Signal::Off => None,
        }
    }

    pub fn mode(self) -> Mode {
        if self.value() < 0.0 {
            Mode::Cooling
        } else if self.value() > 0.0 {
            Mode::Heating
        } else {
            Mode::Idle
        }
    }

    /// Maps a raw control value onto the discrete signal set. Magnitudes
    /// outside {1.5, 3, 5} are clamped to the nearest defined level, so the
    /// AC unit never sees an undefined load mapping. Zero means off.
    pub fn from_value(value: f64) -> Signal {
        if value == 0.0 || !value.is_finite() {
            return Signal::Off;
        }
        let magnitude = value.abs();
        let cooling = value < 0.0;
        if magnitude < 2.25 {
            if cooling { Signal::LowCool } else { Signal::LowHeat }
        } else if magnitude < 4.0 {
            if cooling { Signal::Cool } else { Signal::Heat }
        } else if cooling {
            Signal::HighCool
        } else {
            Signal::HighHeat
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::Off
    }
}
