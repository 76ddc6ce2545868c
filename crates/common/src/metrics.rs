use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use serde::Serialize;

/// One row of simulation history: what a controller saw and decided on a
/// single tick.
#[derive(Debug, Serialize, Clone)]
pub struct TickRecord {
    pub tick: u64,
    pub source: String,
    pub elapsed_ms: u64,
    pub temperature: f64,
    pub signal: f64,
    pub load: f64,
    pub signal_changed: bool,
}

/// Thread-safe tick history with internal mutability. Clones share the same
/// underlying storage (they clone the Arcs, not the data), so both control
/// loops can write to one recorder.
#[derive(Clone, Default)]
pub struct TickRecorder {
    records: Arc<Mutex<Vec<TickRecord>>>,
    signal_changes: Arc<AtomicUsize>,
}

impl TickRecorder {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::with_capacity(10_000))),
            signal_changes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn record(&self, record: TickRecord) {
        if let Ok(mut data) = self.records.lock() {
            if record.signal_changed {
                self.signal_changes.fetch_add(1, Ordering::Relaxed);
            }
            data.push(record);
        }
    }

    pub fn signal_changes(&self) -> usize {
        self.signal_changes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_records(&self) -> Vec<TickRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn save_to_csv(&self, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        let data = self.records.lock().unwrap();
        let mut wtr = csv::Writer::from_path(filename)?;
        for record in data.iter() {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        println!("Saved {} records to {}", data.len(), filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tick: u64, changed: bool) -> TickRecord {
        TickRecord {
            tick,
            source: "thermostat".into(),
            elapsed_ms: tick * 5000,
            temperature: 80.0,
            signal: -3.0,
            load: 0.66,
            signal_changed: changed,
        }
    }

    #[test]
    fn counts_signal_changes() {
        let recorder = TickRecorder::new();
        recorder.record(record(0, true));
        recorder.record(record(1, false));
        recorder.record(record(2, false));
        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.signal_changes(), 1);
    }

    #[test]
    fn clones_share_storage() {
        let recorder = TickRecorder::new();
        let other = recorder.clone();
        other.record(record(0, false));
        assert_eq!(recorder.len(), 1);
    }
}
