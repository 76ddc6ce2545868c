use std::sync::{Arc, RwLock};

/// A room with a single shared temperature value. The AC unit writes it on
/// its own clock while any number of sensors read it, so the value sits
/// behind a read-write lock. Handles are cheap to clone (they share the
/// same cell).
///
/// No validation is applied: negative or extreme temperatures are stored
/// as-is.
#[derive(Debug, Clone)]
pub struct Room {
    temperature: Arc<RwLock<f64>>,
}

impl Room {
    pub fn new(initial_temperature: f64) -> Self {
        Self {
            temperature: Arc::new(RwLock::new(initial_temperature)),
        }
    }

    pub fn temperature(&self) -> f64 {
        *self.temperature.read().unwrap()
    }

    pub fn set_temperature(&self, value: f64) {
        *self.temperature.write().unwrap() = value;
    }

    /// Read-modify-write under a single lock, used by the AC unit tick.
    pub fn adjust(&self, delta: f64) {
        *self.temperature.write().unwrap() += delta;
    }
}

/// Read-only view of a room's temperature.
#[derive(Debug, Clone)]
pub struct Sensor {
    room: Room,
}

impl Sensor {
    pub fn new(room: Room) -> Self {
        Self { room }
    }

    pub fn read_temperature(&self) -> f64 {
        self.room.temperature()
    }
}
