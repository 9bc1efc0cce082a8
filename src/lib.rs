//! Crossroads - simulation core for a 2D side-scrolling action platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, actors, world step)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Save/load of player progress through a key/value store
//! - `error`: Load-time error types
//!
//! Rendering, audio and UI are external collaborators. They read the world
//! through `sim::World` queries and react to drained `sim::GameEvent`s.

pub mod error;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, LevelError, LoadError, SaveError};
pub use tuning::Tuning;

/// Simulation timing constants
pub mod consts {
    /// Nominal update rate velocities are authored against (units per 1/60 s frame)
    pub const NOMINAL_FPS: f32 = 60.0;
    /// Nominal frame duration
    pub const NOMINAL_DT: f32 = 1.0 / NOMINAL_FPS;
    /// Largest step fed into physics after a stall (no substepping)
    pub const MAX_DT: f32 = 1.0 / 30.0;
}

/// Scale factor turning per-nominal-frame quantities into per-step ones
#[inline]
pub fn frame_multiplier(dt: f32) -> f32 {
    dt * consts::NOMINAL_FPS
}

/// Clamp a raw frame delta into the range physics accepts
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_DT)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.5), consts::MAX_DT);
        assert_eq!(clamp_dt(-1.0), 0.0);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert!((clamp_dt(consts::NOMINAL_DT) - consts::NOMINAL_DT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_frame_multiplier_nominal() {
        assert!((frame_multiplier(consts::NOMINAL_DT) - 1.0).abs() < 1e-6);
    }
}
