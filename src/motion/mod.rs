// src/motion/mod.rs - Extruder state seam between the motion subsystem and the stats tracker
use std::sync::{Arc, Mutex, PoisonError};

/// Point-in-time extruder state as reported by the g-code/motion layer.
#[derive(Debug, Clone, Copy)]
pub struct ExtruderSnapshot {
    /// Commanded extruder position, in raw motion units.
    pub position: f64,
    /// Multiplier converting raw motion units to material units. Expected > 0.
    pub extrude_factor: f64,
}

impl Default for ExtruderSnapshot {
    fn default() -> Self {
        Self {
            position: 0.0,
            extrude_factor: 1.0,
        }
    }
}

/// Non-blocking read of the current extruder state.
pub trait MotionStatusSource: Send + Sync {
    fn query(&self, eventtime: f64) -> ExtruderSnapshot;
}

/// Shared handle the motion subsystem writes and the tracker reads.
/// Cheap to clone; all clones observe the same state.
#[derive(Clone, Default)]
pub struct SharedGcodeMove {
    inner: Arc<Mutex<ExtruderSnapshot>>,
}

impl SharedGcodeMove {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, snapshot: ExtruderSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn set_position(&self, position: f64) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .position = position;
    }

    pub fn set_extrude_factor(&self, extrude_factor: f64) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extrude_factor = extrude_factor;
    }
}

impl MotionStatusSource for SharedGcodeMove {
    fn query(&self, _eventtime: f64) -> ExtruderSnapshot {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
