use std::sync::mpsc;
use std::thread;

use log::{error, info};

use common::config::SimConfig;
use common::controller::run_controller;
use common::{AcUnit, ControlError, FuzzyThermostat, Room, Sensor, ShutdownToken, TickRecorder};

pub mod actuator;
pub mod thermostat;

use actuator::ActuatorController;
use thermostat::ThermostatController;

const SIGNAL_CHANNEL_CAPACITY: usize = 16;

/// Runs the full closed-loop simulation on two OS threads for the
/// configured duration, then cancels both loops and returns the tick
/// history.
pub fn run_simulation(config: SimConfig) -> Result<TickRecorder, ControlError> {
    config.validate()?;

    let room = Room::new(config.initial_temperature);
    let recorder = TickRecorder::new();
    let shutdown = ShutdownToken::new();
    let (signal_tx, signal_rx) = mpsc::sync_channel(SIGNAL_CHANNEL_CAPACITY);

    let actuator = ActuatorController::new(
        AcUnit::with_cooling_factor(room.clone(), config.cooling_factor),
        room.clone(),
        signal_rx,
        recorder.clone(),
        config.actuator_interval(),
    );
    let thermostat = ThermostatController::new(
        FuzzyThermostat::new(
            config.target_temperature,
            config.thermostat_interval(),
            config.error_threshold_multiplier,
            config.momentum_threshold_multiplier,
        ),
        Sensor::new(room.clone()),
        signal_tx,
        recorder.clone(),
        config.thermostat_interval(),
    );

    info!(
        "threaded simulation '{}': room {:.1}F -> target {:.1}F for {:.1}s",
        config.scenario_name,
        config.initial_temperature,
        config.target_temperature,
        config.duration_secs
    );

    let actuator_shutdown = shutdown.clone();
    let actuator_handle = thread::Builder::new()
        .name("ac-unit".to_string())
        .spawn(move || run_controller(actuator, &actuator_shutdown))
        .map_err(|e| ControlError::LoopFailed {
            controller: "ac-unit".to_string(),
            reason: format!("failed to spawn: {}", e),
        })?;

    let thermostat_shutdown = shutdown.clone();
    let thermostat_handle = thread::Builder::new()
        .name("thermostat".to_string())
        .spawn(move || run_controller(thermostat, &thermostat_shutdown))
        .map_err(|e| ControlError::LoopFailed {
            controller: "thermostat".to_string(),
            reason: format!("failed to spawn: {}", e),
        })?;

    thread::sleep(config.duration());
    shutdown.cancel();

    for (name, handle) in [
        ("thermostat", thermostat_handle),
        ("ac-unit", actuator_handle),
    ] {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                // A loop that died early (e.g. its peer hung up at shutdown)
                // already logged the failure; the simulation result is still
                // whatever history was recorded.
                error!("{} loop terminated with error: {}", name, err);
            }
            Err(_) => {
                return Err(ControlError::LoopFailed {
                    controller: name.to_string(),
                    reason: "worker thread panicked".to_string(),
                });
            }
        }
    }

    info!("threaded simulation finished: room at {:.2}F", room.temperature());
    Ok(recorder)
}
