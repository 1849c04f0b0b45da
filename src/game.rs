//! The facade UI code talks to
//!
//! Owns the progression state, the settings blob, the quiz pool, the random
//! source and the persistence gateway. Nothing here is global: construct one
//! `Game` at launch and pass it to whatever needs it.
//!
//! Every mutating call writes through to storage unless autosave is off, in
//! which case `flush` must be called before shutdown.

use chrono::Utc;
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::persistence::{PersistenceGateway, ProgressionSnapshot};
use crate::platform::BlobStore;
use crate::quiz::{QuizBank, QuizError, QuizResult, QuizSession, SubjectStats, make_session};
use crate::settings::{EconomyConfig, EconomyField, Settings};
use crate::sim::{
    self, GameEvent, GameState, GarageError, InteractableId, InteractionRejection,
    InteractionSuccess, PurchaseError, TickInput,
};
use crate::world::{self, WorldLayout};

/// A scored quiz plus the coins it paid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    pub result: QuizResult,
    pub coins_awarded: i64,
    pub balance: i64,
}

pub struct Game<S: BlobStore> {
    state: GameState,
    settings: Settings,
    bank: QuizBank,
    rng: Pcg32,
    gateway: PersistenceGateway<S>,
    autosave: bool,
}

impl<S: BlobStore> Game<S> {
    /// Fresh game in the default world; storage is not read
    pub fn new(store: S, seed: u64) -> Self {
        Self::with_world(store, seed, world::default_world(), QuizBank::builtin())
    }

    pub fn with_world(store: S, seed: u64, layout: WorldLayout, bank: QuizBank) -> Self {
        Self {
            state: GameState::new(layout.spawn, layout.interactables),
            settings: Settings::default(),
            bank,
            rng: Pcg32::seed_from_u64(seed),
            gateway: PersistenceGateway::new(store),
            autosave: true,
        }
    }

    /// Fresh game, then settings and progress from storage if present
    pub fn launch(store: S, seed: u64) -> Self {
        let mut game = Self::new(store, seed);
        game.settings = game.gateway.load_settings();
        game.load_progress();
        game
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn economy(&self) -> &EconomyConfig {
        &self.settings.economy
    }

    pub fn bank(&self) -> &QuizBank {
        &self.bank
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut PersistenceGateway<S> {
        &mut self.gateway
    }

    pub fn coins(&self) -> i64 {
        self.state.coins()
    }

    pub fn player_position(&self) -> Vec2 {
        self.state.player.pos
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave = enabled;
    }

    // === World ===

    /// Advance one frame. Saves when a move completed.
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        let events = sim::tick(&mut self.state, input, dt, &self.settings.economy, &mut self.rng);
        if !events.is_empty() {
            self.autosave_progress();
        }
        events
    }

    /// Count a completed movement and run the respawn sweep and timers
    pub fn on_movement_completed(&mut self) -> Vec<GameEvent> {
        let events = sim::on_movement_completed(&mut self.state, &self.settings.economy, &mut self.rng);
        self.autosave_progress();
        events
    }

    /// Interact with `id` as if the player stood at `player_pos`
    pub fn attempt_interaction(
        &mut self,
        player_pos: Vec2,
        id: &InteractableId,
    ) -> Result<InteractionSuccess, InteractionRejection> {
        let success = sim::attempt_interaction(
            &mut self.state,
            player_pos,
            id,
            &self.settings.economy,
            &mut self.rng,
            Utc::now(),
        )?;
        self.autosave_progress();
        Ok(success)
    }

    /// Interact from the player's current position
    pub fn interact(&mut self, id: &InteractableId) -> Result<InteractionSuccess, InteractionRejection> {
        self.attempt_interaction(self.state.player.pos, id)
    }

    pub fn swat_bat(&mut self) -> bool {
        let moves = self.state.completed_moves();
        let swatted = self
            .state
            .minigames
            .swat_bat(moves, &self.settings.economy, &mut self.rng);
        if swatted {
            self.autosave_progress();
        }
        swatted
    }

    // === Snowmobiles ===

    pub fn buy_snowmobile(&mut self, id: &str) -> Result<i64, PurchaseError> {
        let balance = self.state.minigames.snowmobiles.buy(
            id,
            &self.settings.economy,
            &mut self.state.ledger,
        )?;
        log::info!("Bought snowmobile '{}', balance {}", id, balance);
        self.autosave_progress();
        Ok(balance)
    }

    pub fn select_snowmobile(&mut self, id: &str) -> Result<(), GarageError> {
        self.state.minigames.snowmobiles.select(id)?;
        self.autosave_progress();
        Ok(())
    }

    pub fn mount_snowmobile(&mut self) -> Result<String, GarageError> {
        let id = self.state.minigames.snowmobiles.mount()?;
        self.autosave_progress();
        Ok(id)
    }

    pub fn dismount_snowmobile(&mut self) -> Option<String> {
        let id = self.state.minigames.snowmobiles.dismount();
        if id.is_some() {
            self.autosave_progress();
        }
        id
    }

    // === Coins ===

    pub fn add_coins(&mut self, amount: i64) -> i64 {
        let balance = self.state.ledger.add_coins(amount);
        self.autosave_progress();
        balance
    }

    pub fn remove_coins(&mut self, amount: i64) -> i64 {
        let balance = self.state.ledger.remove_coins(amount);
        self.autosave_progress();
        balance
    }

    pub fn set_coins(&mut self, amount: i64) -> i64 {
        let balance = self.state.ledger.set_coins(amount);
        self.autosave_progress();
        balance
    }

    pub fn reset_coins(&mut self) -> i64 {
        let balance = self.state.ledger.reset_coins();
        self.autosave_progress();
        balance
    }

    // === Economy ===

    pub fn economy_value(&self, field: EconomyField) -> i64 {
        self.settings.economy.get(field)
    }

    pub fn set_economy_value(&mut self, field: EconomyField, value: i64) -> i64 {
        let result = self.settings.economy.set(field, value);
        self.autosave_settings();
        result
    }

    pub fn adjust_economy_value(&mut self, field: EconomyField, delta: i64) -> i64 {
        let result = self.settings.economy.adjust(field, delta);
        self.autosave_settings();
        result
    }

    pub fn reset_economy(&mut self) {
        self.settings.economy.reset_to_defaults();
        self.autosave_settings();
    }

    // === Quiz ===

    /// New session on `subject` sized by the economy, or `None` if the pool is too small
    pub fn start_quiz(&mut self, subject: &str) -> Option<QuizSession> {
        let count = self.settings.economy.get(EconomyField::QuizQuestionCount).max(1) as usize;
        make_session(subject, self.bank.questions(), count, &mut self.rng)
    }

    /// Score the session, update subject totals and pay out correct answers
    pub fn submit_quiz(&mut self, session: &mut QuizSession) -> Result<QuizSubmission, QuizError> {
        let result = session.submit(&mut self.settings.quiz_stats)?;
        let per_answer = self.settings.economy.get(EconomyField::QuizCorrectReward);
        let coins_awarded = per_answer.saturating_mul(result.correct_count as i64);
        let balance = self.state.ledger.add_coins(coins_awarded);
        self.autosave_settings();
        self.autosave_progress();
        Ok(QuizSubmission {
            result,
            coins_awarded,
            balance,
        })
    }

    pub fn quiz_stats(&self, subject: &str) -> SubjectStats {
        self.settings.quiz_stats.get(subject)
    }

    // === Persistence ===

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot::capture(&self.state, Utc::now())
    }

    pub fn save_progress(&mut self) -> bool {
        let snapshot = self.snapshot();
        self.gateway.save(&snapshot)
    }

    /// Replace in-memory progress with the stored save. Returns false (and
    /// leaves state untouched) when there is nothing usable to load.
    pub fn load_progress(&mut self) -> bool {
        match self.gateway.load() {
            Some(snapshot) => {
                snapshot.apply_to(&mut self.state);
                true
            }
            None => false,
        }
    }

    pub fn save_settings(&mut self) -> bool {
        self.gateway.save_settings(&self.settings)
    }

    /// Write both blobs regardless of the autosave setting
    pub fn flush(&mut self) -> bool {
        let settings_ok = self.save_settings();
        let progress_ok = self.save_progress();
        settings_ok && progress_ok
    }

    /// Wipe progress in memory and save the fresh state
    pub fn reset_progress(&mut self) {
        self.state.reset_progress();
        self.autosave_progress();
    }

    /// Wipe progress in memory and delete the stored save
    pub fn clear_progress(&mut self) -> bool {
        self.state.reset_progress();
        self.gateway.clear_progress()
    }

    fn autosave_progress(&mut self) {
        if self.autosave {
            self.save_progress();
        }
    }

    fn autosave_settings(&mut self) {
        if self.autosave {
            self.save_settings();
        }
    }
}
