//! Tapquest - progression and interaction core for a tap-to-move exploration game
//!
//! Core modules:
//! - `sim`: World state (coins, interactables, move counter, minigames)
//! - `settings`: Tunable economy parameters and quiz statistics
//! - `quiz`: Question pool, session construction and scoring
//! - `persistence`: Versioned snapshots with atomic save/load
//! - `platform`: Storage backends (filesystem, memory, LocalStorage on web)
//! - `world`: Compiled-in world layout
//! - `game`: The facade UI code talks to

pub mod game;
pub mod persistence;
pub mod platform;
pub mod quiz;
pub mod settings;
pub mod sim;
pub mod world;

pub use game::Game;
pub use settings::{EconomyConfig, EconomyField, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Snapshot schema written by this build
    pub const SCHEMA_VERSION: u32 = 1;
    /// Version string stamped into every snapshot
    pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Player walking speed (world units per second)
    pub const PLAYER_SPEED: f32 = 180.0;
    /// Distance under which the player counts as arrived at a tap target
    pub const ARRIVAL_EPSILON: f32 = 0.5;

    /// Storage keys
    pub const PROGRESS_KEY: &str = "progress.json";
    pub const PROGRESS_BACKUP_KEY: &str = "progress.bak.json";
    pub const SETTINGS_KEY: &str = "settings.json";
}

/// Euclidean distance between two world positions
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Step `from` toward `to` by at most `max_step`, never overshooting
#[inline]
pub fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let len = delta.length();
    if len <= max_step || len == 0.0 {
        to
    } else {
        from + delta / len * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_does_not_overshoot() {
        let p = step_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0);
        assert_eq!(p, Vec2::new(4.0, 0.0));

        let p = step_toward(Vec2::ZERO, Vec2::new(3.0, 4.0), 100.0);
        assert_eq!(p, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(Vec2::ZERO, Vec2::new(3.0, 4.0)), 5.0);
    }
}
