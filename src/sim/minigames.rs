//! Minigame progress: potatoes, chips, goats, the toilet, the bat, the septic
//! tank and the snowmobile garage.
//!
//! Bat and septic are driven by the move clock; everything else is bumped by
//! interactions.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::interactable::InteractableKind;
use super::ledger::{CurrencyLedger, LedgerError};
use super::state::GameEvent;
use crate::settings::{EconomyConfig, EconomyField};

/// The bat that shows up every so often and bites if ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatState {
    pub active: bool,
    pub next_spawn_at_move: Option<u64>,
    pub bites_taken: u32,
    pub bats_swatted: u32,
}

impl BatState {
    fn schedule<R: Rng + ?Sized>(&mut self, now: u64, economy: &EconomyConfig, rng: &mut R) {
        let (lo, hi) = economy.range(EconomyField::BatSpawnMinMoves, EconomyField::BatSpawnMaxMoves);
        let after = rng.random_range(lo..=hi).max(1) as u64;
        self.next_spawn_at_move = Some(now + after);
    }

    fn on_move<R: Rng + ?Sized>(
        &mut self,
        now: u64,
        economy: &EconomyConfig,
        ledger: &mut CurrencyLedger,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        if self.active {
            let penalty = economy.get(EconomyField::BatBitePenalty);
            let balance = ledger.remove_coins(penalty);
            self.active = false;
            self.bites_taken += 1;
            self.schedule(now, economy, rng);
            log::info!("Bat bite at move {}: -{} coins, balance {}", now, penalty, balance);
            events.push(GameEvent::BatBite { penalty, balance });
            return;
        }

        match self.next_spawn_at_move {
            None => self.schedule(now, economy, rng),
            Some(at) if at <= now => {
                self.active = true;
                self.next_spawn_at_move = None;
                events.push(GameEvent::BatArrived);
            }
            Some(_) => {}
        }
    }
}

/// Tank that has to be pumped every so many moves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SepticState {
    /// Move counter of the last pump (0 = never pumped)
    pub last_pumped_move: u64,
    pub last_pumped_at: Option<DateTime<Utc>>,
    pub overdue: bool,
    pub overflowed: bool,
    pub times_pumped: u32,
}

impl SepticState {
    pub fn due_at_move(&self, economy: &EconomyConfig) -> u64 {
        self.last_pumped_move + economy.get(EconomyField::SepticPumpIntervalMoves) as u64
    }

    fn on_move(
        &mut self,
        now: u64,
        economy: &EconomyConfig,
        ledger: &mut CurrencyLedger,
        events: &mut Vec<GameEvent>,
    ) {
        let due = self.due_at_move(economy);
        if !self.overdue && now >= due {
            self.overdue = true;
            events.push(GameEvent::SepticOverdue);
        }
        let deadline = due + economy.get(EconomyField::SepticDeadlineMoves) as u64;
        if !self.overflowed && now >= deadline {
            let penalty = economy.get(EconomyField::SepticOverflowPenalty);
            let balance = ledger.remove_coins(penalty);
            self.overflowed = true;
            log::info!("Septic overflow at move {}: -{} coins", now, penalty);
            events.push(GameEvent::SepticOverflow { penalty, balance });
        }
    }

    fn pump(&mut self, now_move: u64, now: DateTime<Utc>) {
        self.last_pumped_move = now_move;
        self.last_pumped_at = Some(now);
        self.overdue = false;
        self.overflowed = false;
        self.times_pumped += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("You already own snowmobile '{0}'")]
    AlreadyOwned(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GarageError {
    #[error("You don't own snowmobile '{0}'")]
    NotOwned(String),
    #[error("No snowmobile selected")]
    NothingSelected,
}

/// Owned snowmobiles; `selected` is always owned and `mounted` is always the selected one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowmobileGarage {
    pub owned: Vec<String>,
    pub selected: Option<String>,
    pub mounted: Option<String>,
}

impl SnowmobileGarage {
    pub fn owns(&self, id: &str) -> bool {
        self.owned.iter().any(|o| o == id)
    }

    /// Buy and select a snowmobile. Returns the balance after paying.
    pub fn buy(
        &mut self,
        id: &str,
        economy: &EconomyConfig,
        ledger: &mut CurrencyLedger,
    ) -> Result<i64, PurchaseError> {
        if self.owns(id) {
            return Err(PurchaseError::AlreadyOwned(id.to_string()));
        }
        let balance = ledger.try_spend(economy.get(EconomyField::SnowmobilePrice))?;
        self.owned.push(id.to_string());
        if self.mounted.is_none() {
            self.selected = Some(id.to_string());
        }
        Ok(balance)
    }

    pub fn select(&mut self, id: &str) -> Result<(), GarageError> {
        if !self.owns(id) {
            return Err(GarageError::NotOwned(id.to_string()));
        }
        if self.mounted.as_deref().is_some_and(|m| m != id) {
            self.mounted = None;
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn mount(&mut self) -> Result<String, GarageError> {
        let id = self.selected.clone().ok_or(GarageError::NothingSelected)?;
        self.mounted = Some(id.clone());
        Ok(id)
    }

    pub fn dismount(&mut self) -> Option<String> {
        self.mounted.take()
    }

    /// Drop references to snowmobiles that aren't owned
    fn normalize(&mut self) {
        if self.selected.as_deref().is_some_and(|s| !self.owns(s)) {
            self.selected = None;
        }
        if self.mounted.is_some() && self.mounted != self.selected {
            self.mounted = None;
        }
    }
}

/// All minigame counters and flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinigameProgress {
    pub potatoes_harvested: u32,
    pub chips_made: u32,
    pub goats_caught: u32,
    pub toilet_flushes: u32,
    pub bat: BatState,
    pub septic: SepticState,
    pub snowmobiles: SnowmobileGarage,
}

impl MinigameProgress {
    /// Bookkeeping after a successful interaction
    pub fn record_interaction(&mut self, kind: InteractableKind, move_count: u64, now: DateTime<Utc>) {
        match kind {
            InteractableKind::PotatoPatch => self.potatoes_harvested += 1,
            InteractableKind::ChipFryer => self.chips_made += 1,
            InteractableKind::GoatChase => self.goats_caught += 1,
            InteractableKind::Toilet => self.toilet_flushes += 1,
            InteractableKind::SepticTank => self.septic.pump(move_count, now),
        }
    }

    /// Move-clock driven updates, run after the respawn sweep
    pub fn on_move_completed<R: Rng + ?Sized>(
        &mut self,
        move_count: u64,
        economy: &EconomyConfig,
        ledger: &mut CurrencyLedger,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.bat.on_move(move_count, economy, ledger, rng, &mut events);
        self.septic.on_move(move_count, economy, ledger, &mut events);
        events
    }

    /// Shoo the bat away. Returns false when there was no bat.
    pub fn swat_bat<R: Rng + ?Sized>(&mut self, move_count: u64, economy: &EconomyConfig, rng: &mut R) -> bool {
        if !self.bat.active {
            return false;
        }
        self.bat.active = false;
        self.bat.bats_swatted += 1;
        self.bat.schedule(move_count, economy, rng);
        true
    }

    pub fn normalize(&mut self) {
        self.snowmobiles.normalize();
    }
}
