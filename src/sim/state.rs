//! Game state and core simulation types
//!
//! Everything that goes into a progress save lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::interactable::{InteractableConfig, InteractableId, InteractableRegistry};
use super::ledger::CurrencyLedger;
use super::minigames::MinigameProgress;

/// Something that happened during a tick or interaction, for UI feedback
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The player reached a tap target
    MoveCompleted { count: u64 },
    Respawned { id: InteractableId },
    BatArrived,
    BatBite { penalty: i64, balance: i64 },
    SepticOverdue,
    SepticOverflow { penalty: i64, balance: i64 },
}

/// The player avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Where the last tap sent the player, if still walking
    pub target: Option<Vec2>,
}

impl Player {
    pub fn at(pos: Vec2) -> Self {
        Self { pos, target: None }
    }

    pub fn is_walking(&self) -> bool {
        self.target.is_some()
    }
}

/// Complete progression state
#[derive(Debug, Clone)]
pub struct GameState {
    pub ledger: CurrencyLedger,
    pub registry: InteractableRegistry,
    pub player: Player,
    pub minigames: MinigameProgress,
    /// Where the player appears on a fresh start
    pub spawn: Vec2,
}

impl GameState {
    /// Fresh state for a world layout
    pub fn new(spawn: Vec2, interactables: impl IntoIterator<Item = InteractableConfig>) -> Self {
        Self {
            ledger: CurrencyLedger::new(),
            registry: InteractableRegistry::from_configs(interactables),
            player: Player::at(spawn),
            minigames: MinigameProgress::default(),
            spawn,
        }
    }

    /// State for the compiled-in world
    pub fn default_world() -> Self {
        let world = crate::world::default_world();
        Self::new(world.spawn, world.interactables)
    }

    pub fn coins(&self) -> i64 {
        self.ledger.coins()
    }

    pub fn completed_moves(&self) -> u64 {
        self.registry.completed_moves()
    }

    /// Wipe progress: coins, cooldowns, move clock, minigames, position
    pub fn reset_progress(&mut self) {
        self.ledger.reset_coins();
        self.registry.reset();
        self.minigames = MinigameProgress::default();
        self.player = Player::at(self.spawn);
        log::info!("Progress reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::InteractableKind;

    #[test]
    fn test_reset_progress() {
        let mut state = GameState::new(
            Vec2::new(5.0, 5.0),
            [InteractableConfig::new("g", InteractableKind::GoatChase, Vec2::ZERO, 10.0)],
        );
        state.ledger.add_coins(12);
        state.registry.complete_move();
        state.minigames.chips_made = 4;
        state.player.pos = Vec2::new(100.0, 0.0);

        state.reset_progress();
        assert_eq!(state.coins(), 0);
        assert_eq!(state.completed_moves(), 0);
        assert_eq!(state.minigames, MinigameProgress::default());
        assert_eq!(state.player.pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_default_world_has_interactables() {
        let state = GameState::default_world();
        assert!(state.registry.configs().count() > 0);
        assert_eq!(state.player.pos, state.spawn);
    }
}
