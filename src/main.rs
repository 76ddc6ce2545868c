mod menu;

use common::config::{load_config, SimConfig};
use common::TickRecorder;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "configs/thermostat_baseline.toml";
const EXPORT_FILE: &str = "thermostat_run.csv";

fn main() {
    init_logging();

    println!("===========================================");
    println!("Welcome to the Fuzzy Thermostat Simulation");
    println!("===========================================");

    let mut last_run: Option<TickRecorder> = None;

    loop {
        menu::show_menu();

        match menu::get_user_choice() {
            Ok(1) => last_run = run_threaded_demo(),
            Ok(2) => last_run = run_async_demo(),
            Ok(3) => run_comparison(),
            Ok(4) => export_last_run(last_run.as_ref()),
            Ok(5) => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please select 1-5."),
        }
    }
}

fn init_logging() {
    // RUST_LOG controls verbosity; log-crate records from the library
    // crates are bridged into the subscriber.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_scenario() -> SimConfig {
    match load_config(CONFIG_FILE) {
        Ok(config) => config,
        Err(err) => {
            println!(
                "Could not load {} ({}); falling back to the built-in baseline scenario",
                CONFIG_FILE, err
            );
            SimConfig::baseline()
        }
    }
}

fn describe(config: &SimConfig) {
    println!(
        "Scenario '{}': room {:.1}F -> target {:.1}F, thermostat every {:.1}s, AC unit every {:.1}s, running {:.0}s",
        config.scenario_name,
        config.initial_temperature,
        config.target_temperature,
        config.thermostat_interval_secs,
        config.actuator_interval_secs,
        config.duration_secs
    );
}

fn run_threaded_demo() -> Option<TickRecorder> {
    println!("\n=== Running Threaded Simulation ===");
    let config = load_scenario();
    describe(&config);

    let result = threaded_impl::run_simulation(config);
    let recorder = report(result)?;
    menu::wait_for_enter();
    Some(recorder)
}

fn run_async_demo() -> Option<TickRecorder> {
    println!("\n=== Running Async Simulation ===");
    let config = load_scenario();
    describe(&config);

    let rt = tokio::runtime::Runtime::new().expect("failed to build tokio runtime");
    let result = rt.block_on(async_impl::run_simulation(config));
    let recorder = report(result)?;
    menu::wait_for_enter();
    Some(recorder)
}

fn run_comparison() {
    println!("\n=== Comparing Threaded vs Async ===");
    let config = load_scenario();
    describe(&config);

    println!("\n--- THREADED ---");
    let threaded = report(threaded_impl::run_simulation(config.clone()));

    println!("\n--- ASYNC ---");
    let rt = tokio::runtime::Runtime::new().expect("failed to build tokio runtime");
    let async_run = report(rt.block_on(async_impl::run_simulation(config)));

    if let (Some(t), Some(a)) = (threaded, async_run) {
        println!("\n=== Comparison Summary ===");
        println!(
            "- Threaded: {} ticks, {} signal changes, final {:.2}F",
            t.len(),
            t.signal_changes(),
            final_temperature(&t).unwrap_or(f64::NAN)
        );
        println!(
            "- Async:    {} ticks, {} signal changes, final {:.2}F",
            a.len(),
            a.signal_changes(),
            final_temperature(&a).unwrap_or(f64::NAN)
        );
    }

    menu::wait_for_enter();
}

fn export_last_run(last_run: Option<&TickRecorder>) {
    match last_run {
        Some(recorder) => {
            if let Err(err) = recorder.save_to_csv(EXPORT_FILE) {
                println!("Export failed: {}", err);
            }
        }
        None => println!("No simulation run to export yet."),
    }
}

fn report(result: Result<TickRecorder, common::ControlError>) -> Option<TickRecorder> {
    match result {
        Ok(recorder) => {
            display_results(&recorder);
            Some(recorder)
        }
        Err(err) => {
            println!("Simulation failed: {}", err);
            None
        }
    }
}

fn final_temperature(recorder: &TickRecorder) -> Option<f64> {
    recorder
        .get_records()
        .iter()
        .rev()
        .find(|r| r.source == "ac-unit")
        .map(|r| r.temperature)
}

fn display_results(recorder: &TickRecorder) {
    let records = recorder.get_records();
    if records.is_empty() {
        println!("No ticks recorded.");
        return;
    }

    let thermostat_ticks = records.iter().filter(|r| r.source == "thermostat").count();
    let actuator_ticks = records.iter().filter(|r| r.source == "ac-unit").count();

    println!("\n=== Simulation Results ===");
    println!("Thermostat ticks: {}", thermostat_ticks);
    println!("AC unit ticks: {}", actuator_ticks);
    println!("Signal changes: {}", recorder.signal_changes());
    if let Some(first) = records.first() {
        println!("Starting temperature: {:.2}F", first.temperature);
    }
    if let Some(last) = final_temperature(recorder) {
        println!("Final temperature: {:.2}F", last);
    }
}
