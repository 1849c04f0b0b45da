//! Progression simulation
//!
//! All world-state rules live here. This module must stay free of rendering
//! and storage concerns:
//! - Time advances only through completed moves
//! - Randomness comes from an injected generator
//! - Stable iteration order (maps keyed by interactable id)

pub mod interactable;
pub mod ledger;
pub mod minigames;
pub mod state;
pub mod tick;

pub use interactable::{
    InteractableConfig, InteractableId, InteractableKind, InteractableRegistry,
    InteractableRuntimeState, InteractionRejection, InteractionSuccess, Reward,
};
pub use ledger::{CurrencyLedger, LedgerError};
pub use minigames::{
    BatState, GarageError, MinigameProgress, PurchaseError, SepticState, SnowmobileGarage,
};
pub use state::{GameEvent, GameState, Player};
pub use tick::{TickInput, attempt_interaction, on_movement_completed, tick};
