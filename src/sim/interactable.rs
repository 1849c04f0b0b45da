//! Interactable world objects and their availability
//!
//! Each object is either available or cooling down. Cooling down objects are
//! hidden and carry the move at which they come back; the respawn sweep run
//! after every completed move restores them exactly once.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ledger::CurrencyLedger;
use crate::settings::{EconomyConfig, EconomyField};

/// Stable identity of an interactable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractableId(pub String);

impl InteractableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for InteractableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Interactable types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractableKind {
    ChipFryer,
    GoatChase,
    PotatoPatch,
    Toilet,
    SepticTank,
}

impl InteractableKind {
    /// Consumed objects hide and respawn later; everything else can be used again right away
    pub fn is_consumable(&self) -> bool {
        matches!(self, InteractableKind::GoatChase)
    }

    /// Economy field holding the respawn window (min, max) for consumable kinds
    pub fn respawn_window(&self) -> Option<(EconomyField, EconomyField)> {
        match self {
            InteractableKind::GoatChase => Some((
                EconomyField::GoatRespawnMinMoves,
                EconomyField::GoatRespawnMaxMoves,
            )),
            _ => None,
        }
    }

    /// Economy field the kind pays out by default
    pub fn reward_field(&self) -> EconomyField {
        match self {
            InteractableKind::ChipFryer => EconomyField::ChipReward,
            InteractableKind::GoatChase => EconomyField::GoatReward,
            InteractableKind::PotatoPatch => EconomyField::PotatoReward,
            InteractableKind::Toilet => EconomyField::ToiletReward,
            InteractableKind::SepticTank => EconomyField::SepticPumpReward,
        }
    }

    fn success_message(&self, reward: i64) -> String {
        match self {
            InteractableKind::ChipFryer => format!("Fried a batch of chips! +{reward} coins"),
            InteractableKind::GoatChase => format!("Caught the goat! +{reward} coins"),
            InteractableKind::PotatoPatch => format!("Dug up a potato. +{reward} coins"),
            InteractableKind::Toilet => format!("Flushed. +{reward} coins"),
            InteractableKind::SepticTank => format!("Septic tank pumped. +{reward} coins"),
        }
    }
}

/// How much an interaction pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    Fixed(i64),
    /// Read from the live economy at interaction time
    Economy(EconomyField),
}

impl Reward {
    pub fn amount(&self, economy: &EconomyConfig) -> i64 {
        match self {
            Reward::Fixed(n) => (*n).max(0),
            Reward::Economy(field) => economy.get(*field),
        }
    }
}

/// Immutable definition of a world object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableConfig {
    pub id: InteractableId,
    pub kind: InteractableKind,
    /// Spawn position
    pub position: Vec2,
    /// Max player distance for an interaction to succeed
    pub interaction_range: f32,
    pub reward: Reward,
}

impl InteractableConfig {
    /// Definition paying the kind's economy reward
    pub fn new(id: impl Into<String>, kind: InteractableKind, position: Vec2, range: f32) -> Self {
        Self {
            id: InteractableId::new(id),
            kind,
            position,
            interaction_range: range,
            reward: Reward::Economy(kind.reward_field()),
        }
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = reward;
        self
    }
}

/// Mutable per-object state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableRuntimeState {
    pub position: Vec2,
    pub hidden: bool,
    /// Set only while hidden
    pub respawn_at_move: Option<u64>,
}

impl InteractableRuntimeState {
    fn fresh(config: &InteractableConfig) -> Self {
        Self {
            position: config.position,
            hidden: false,
            respawn_at_move: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.hidden
    }
}

/// Why an interaction did not happen
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionRejection {
    #[error("Too far away ({distance:.0} > {range:.0}). Walk closer first.")]
    TooFar { distance: f32, range: f32 },
    #[error("There's nothing here right now.")]
    Unavailable,
    #[error("Unknown object '{0}'")]
    Unknown(InteractableId),
}

/// A successful interaction
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSuccess {
    pub id: InteractableId,
    pub kind: InteractableKind,
    pub reward: i64,
    pub balance: i64,
    /// Present when the object went into cooldown
    pub respawn_at_move: Option<u64>,
    pub message: String,
}

/// Definitions plus runtime state, and the completed-move clock that drives respawns
#[derive(Debug, Clone, Default)]
pub struct InteractableRegistry {
    configs: BTreeMap<InteractableId, InteractableConfig>,
    runtime: BTreeMap<InteractableId, InteractableRuntimeState>,
    completed_moves: u64,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: impl IntoIterator<Item = InteractableConfig>) -> Self {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config);
        }
        registry
    }

    /// Add (or redefine) an object; it starts available at its spawn position
    pub fn register(&mut self, config: InteractableConfig) {
        self.runtime
            .insert(config.id.clone(), InteractableRuntimeState::fresh(&config));
        self.configs.insert(config.id.clone(), config);
    }

    pub fn completed_moves(&self) -> u64 {
        self.completed_moves
    }

    pub fn config(&self, id: &InteractableId) -> Option<&InteractableConfig> {
        self.configs.get(id)
    }

    pub fn state(&self, id: &InteractableId) -> Option<&InteractableRuntimeState> {
        self.runtime.get(id)
    }

    pub fn configs(&self) -> impl Iterator<Item = &InteractableConfig> {
        self.configs.values()
    }

    pub fn is_available(&self, id: &InteractableId) -> bool {
        self.runtime.get(id).is_some_and(|s| s.is_available())
    }

    /// Move an object (e.g. a wandering goat). Non-finite positions are ignored.
    pub fn relocate(&mut self, id: &InteractableId, position: Vec2) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self.runtime.get_mut(id) {
            Some(state) => {
                state.position = position;
                true
            }
            None => false,
        }
    }

    /// Try to interact with `id` from `player_pos`.
    ///
    /// On success the reward is credited to `ledger` and consumable kinds go
    /// into cooldown for a random number of moves from their respawn window.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        id: &InteractableId,
        player_pos: Vec2,
        economy: &EconomyConfig,
        ledger: &mut CurrencyLedger,
        rng: &mut R,
    ) -> Result<InteractionSuccess, InteractionRejection> {
        let (Some(config), Some(state)) = (self.configs.get(id), self.runtime.get_mut(id)) else {
            return Err(InteractionRejection::Unknown(id.clone()));
        };

        if state.hidden {
            log::debug!("Rejected interaction with hidden '{}'", id);
            return Err(InteractionRejection::Unavailable);
        }

        // NaN compares false, so a non-finite distance is rejected explicitly
        let distance = crate::distance(player_pos, state.position);
        if !distance.is_finite() || distance > config.interaction_range {
            log::debug!(
                "Rejected interaction with '{}': distance {} > range {}",
                id,
                distance,
                config.interaction_range
            );
            return Err(InteractionRejection::TooFar {
                distance,
                range: config.interaction_range,
            });
        }

        let reward = config.reward.amount(economy);
        let balance = ledger.add_coins(reward);

        let respawn_at_move = match config.kind.respawn_window() {
            Some((min_field, max_field)) if config.kind.is_consumable() => {
                let (lo, hi) = economy.range(min_field, max_field);
                let after = rng.random_range(lo..=hi).max(1) as u64;
                let at = self.completed_moves + after;
                state.hidden = true;
                state.respawn_at_move = Some(at);
                log::debug!("'{}' cooling down until move {}", id, at);
                Some(at)
            }
            _ => None,
        };

        Ok(InteractionSuccess {
            id: id.clone(),
            kind: config.kind,
            reward,
            balance,
            respawn_at_move,
            message: config.kind.success_message(reward),
        })
    }

    /// Advance the move clock by one and run the respawn sweep
    pub fn complete_move(&mut self) -> Vec<InteractableId> {
        self.completed_moves += 1;
        self.sweep_respawns()
    }

    /// Restore every cooling-down object whose respawn move has been reached.
    /// Returns the ids that came back.
    pub fn sweep_respawns(&mut self) -> Vec<InteractableId> {
        let now = self.completed_moves;
        let mut respawned = Vec::new();
        for (id, state) in self.runtime.iter_mut() {
            let Some(at) = state.respawn_at_move else {
                continue;
            };
            if at <= now {
                state.respawn_at_move = None;
                state.hidden = false;
                if let Some(config) = self.configs.get(id) {
                    state.position = config.position;
                }
                log::debug!("'{}' respawned at move {}", id, now);
                respawned.push(id.clone());
            }
        }
        respawned
    }

    /// Everything available again, move clock back to zero
    pub fn reset(&mut self) {
        for (id, config) in &self.configs {
            self.runtime
                .insert(id.clone(), InteractableRuntimeState::fresh(config));
        }
        self.completed_moves = 0;
    }

    // === Snapshot support ===

    pub fn positions(&self) -> BTreeMap<InteractableId, Vec2> {
        self.runtime
            .iter()
            .map(|(id, s)| (id.clone(), s.position))
            .collect()
    }

    pub fn hidden_ids(&self) -> Vec<InteractableId> {
        self.runtime
            .iter()
            .filter(|(_, s)| s.hidden)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn respawn_schedule(&self) -> BTreeMap<InteractableId, u64> {
        self.runtime
            .iter()
            .filter_map(|(id, s)| s.respawn_at_move.map(|at| (id.clone(), at)))
            .collect()
    }

    /// Replace all runtime state. Ids without a definition are ignored.
    pub fn restore(
        &mut self,
        completed_moves: u64,
        positions: &BTreeMap<InteractableId, Vec2>,
        hidden: &[InteractableId],
        respawn_at: &BTreeMap<InteractableId, u64>,
    ) {
        self.reset();
        self.completed_moves = completed_moves;

        for (id, pos) in positions {
            if !self.relocate(id, *pos) {
                log::warn!("Saved position {} for '{}' ignored", pos, id);
            }
        }
        for id in hidden {
            if let Some(state) = self.runtime.get_mut(id) {
                state.hidden = true;
            } else {
                log::warn!("Saved hidden flag for unknown interactable '{}' ignored", id);
            }
        }
        for (id, at) in respawn_at {
            if let Some(state) = self.runtime.get_mut(id) {
                // A pending respawn implies hidden
                state.hidden = true;
                state.respawn_at_move = Some(*at);
            } else {
                log::warn!("Saved respawn for unknown interactable '{}' ignored", id);
            }
        }
    }
}
