use log::{error, info};
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

use common::config::SimConfig;
use common::{AcUnit, ControlError, FuzzyThermostat, Room, Sensor, TickRecorder};

pub mod actuator;
pub mod thermostat;

use actuator::run_actuator_task;
use thermostat::run_thermostat_task;

const SIGNAL_CHANNEL_CAPACITY: usize = 16;

/// Runs the full closed-loop simulation as two Tokio tasks for the
/// configured duration, then cancels both and returns the tick history.
pub async fn run_simulation(config: SimConfig) -> Result<TickRecorder, ControlError> {
    config.validate()?;

    let room = Room::new(config.initial_temperature);
    let recorder = TickRecorder::new();
    let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(
        "async simulation '{}': room {:.1}F -> target {:.1}F for {:.1}s",
        config.scenario_name,
        config.initial_temperature,
        config.target_temperature,
        config.duration_secs
    );

    let actuator_handle = tokio::spawn(run_actuator_task(
        AcUnit::with_cooling_factor(room.clone(), config.cooling_factor),
        room.clone(),
        signal_rx,
        recorder.clone(),
        config.actuator_interval(),
        shutdown_rx.clone(),
    ));
    let thermostat_handle = tokio::spawn(run_thermostat_task(
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
        shutdown_rx,
    ));

    sleep(config.duration()).await;
    let _ = shutdown_tx.send(true);

    for (name, handle) in [
        ("thermostat", thermostat_handle),
        ("ac-unit", actuator_handle),
    ] {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                // The failing loop already logged details; history up to the
                // failure is still returned.
                error!("{} task terminated with error: {}", name, err);
            }
            Err(join_err) => {
                return Err(ControlError::LoopFailed {
                    controller: name.to_string(),
                    reason: format!("task panicked: {}", join_err),
                });
            }
        }
    }

    info!("async simulation finished: room at {:.2}F", room.temperature());
    Ok(recorder)
}
