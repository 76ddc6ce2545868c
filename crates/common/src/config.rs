use std::time::Duration;

use serde::Deserialize;

use crate::error::ControlError;

/// Simulation parameters, loaded from a toml file.
#[derive(Debug, Deserialize, Clone)]
pub struct SimConfig {
    pub scenario_name: String,
    pub initial_temperature: f64,
    pub target_temperature: f64,
    /// Seconds between thermostat decisions.
    pub thermostat_interval_secs: f64,
    /// Seconds between AC unit ticks.
    pub actuator_interval_secs: f64,
    pub error_threshold_multiplier: f64,
    pub momentum_threshold_multiplier: f64,
    /// Absolute temperature change per actuator tick at full load.
    pub cooling_factor: f64,
    /// How long the simulation runs before shutdown.
    pub duration_secs: f64,
}

pub fn load_config(path: &str) -> Result<SimConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let config: SimConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl SimConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        load_config(path)
    }

    /// The reference scenario: an 81F room steered toward 72F.
    pub fn baseline() -> Self {
        Self {
            scenario_name: "baseline".to_string(),
            initial_temperature: 81.0,
            target_temperature: 72.0,
            thermostat_interval_secs: 5.0,
            actuator_interval_secs: 1.0,
            error_threshold_multiplier: 0.1,
            momentum_threshold_multiplier: 0.2,
            cooling_factor: crate::actuator::DEFAULT_COOLING_FACTOR,
            duration_secs: 60.0,
        }
    }

    /// Rejects bad parameters at configuration time so the control loops
    /// never have to deal with them at tick time.
    pub fn validate(&self) -> Result<(), ControlError> {
        let positive = [
            ("thermostat_interval_secs", self.thermostat_interval_secs),
            ("actuator_interval_secs", self.actuator_interval_secs),
            ("duration_secs", self.duration_secs),
            ("cooling_factor", self.cooling_factor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ControlError::InvalidConfig {
                    what: format!("{} must be positive, got {}", name, value),
                });
            }
        }
        let finite = [
            ("initial_temperature", self.initial_temperature),
            ("target_temperature", self.target_temperature),
            ("error_threshold_multiplier", self.error_threshold_multiplier),
            ("momentum_threshold_multiplier", self.momentum_threshold_multiplier),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ControlError::InvalidConfig {
                    what: format!("{} must be finite, got {}", name, value),
                });
            }
        }
        Ok(())
    }

    pub fn thermostat_interval(&self) -> Duration {
        Duration::from_secs_f64(self.thermostat_interval_secs)
    }

    pub fn actuator_interval(&self) -> Duration {
        Duration::from_secs_f64(self.actuator_interval_secs)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }
}
