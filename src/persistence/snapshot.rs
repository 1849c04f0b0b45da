//! Serializable progress snapshot
//!
//! A snapshot is written whole and replaces in-memory state whole on load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{APP_VERSION, SCHEMA_VERSION};
use crate::sim::{
    BatState, CurrencyLedger, GameState, InteractableId, MinigameProgress, Player, SepticState,
    SnowmobileGarage,
};

/// Plain `{x, y}` position record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Position> for Vec2 {
    fn from(p: Position) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSnapshot {
    pub schema_version: u32,
    pub app_version: String,
    pub saved_at: DateTime<Utc>,

    pub coins: i64,
    #[serde(default)]
    pub lifetime_coins_earned: i64,
    #[serde(default)]
    pub lifetime_coins_spent: i64,
    pub completed_move_count: u64,
    pub player_position: Position,

    #[serde(default, rename = "interactablePositionsByID")]
    pub interactable_positions_by_id: BTreeMap<InteractableId, Position>,
    #[serde(default, rename = "hiddenInteractableIDs")]
    pub hidden_interactable_ids: Vec<InteractableId>,
    #[serde(default, rename = "respawnAtMoveByInteractableID")]
    pub respawn_at_move_by_interactable_id: BTreeMap<InteractableId, u64>,

    // Minigame counters
    #[serde(default)]
    pub potatoes_harvested: u32,
    #[serde(default)]
    pub chips_made: u32,
    #[serde(default)]
    pub goats_caught: u32,
    #[serde(default)]
    pub toilet_flushes: u32,

    // Bat
    #[serde(default)]
    pub bat_active: bool,
    #[serde(default)]
    pub bat_next_spawn_at_move: Option<u64>,
    #[serde(default)]
    pub bat_bites_taken: u32,
    #[serde(default)]
    pub bats_swatted: u32,

    // Septic
    #[serde(default)]
    pub septic_last_pumped_move: u64,
    #[serde(default)]
    pub septic_last_pumped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub septic_overdue: bool,
    #[serde(default)]
    pub septic_overflowed: bool,
    #[serde(default)]
    pub septic_times_pumped: u32,

    // Snowmobiles
    #[serde(default, rename = "ownedSnowmobileIDs")]
    pub owned_snowmobile_ids: Vec<String>,
    #[serde(default, rename = "selectedOwnedSnowmobileID")]
    pub selected_owned_snowmobile_id: Option<String>,
    #[serde(default, rename = "mountedSnowmobileID")]
    pub mounted_snowmobile_id: Option<String>,
}

impl ProgressionSnapshot {
    /// Capture everything that needs to survive a restart
    pub fn capture(state: &GameState, saved_at: DateTime<Utc>) -> Self {
        let registry = &state.registry;
        let m = &state.minigames;
        Self {
            schema_version: SCHEMA_VERSION,
            app_version: APP_VERSION.to_string(),
            saved_at,
            coins: state.ledger.coins(),
            lifetime_coins_earned: state.ledger.total_earned(),
            lifetime_coins_spent: state.ledger.total_spent(),
            completed_move_count: registry.completed_moves(),
            player_position: state.player.pos.into(),
            interactable_positions_by_id: registry
                .positions()
                .into_iter()
                .map(|(id, pos)| (id, pos.into()))
                .collect(),
            hidden_interactable_ids: registry.hidden_ids(),
            respawn_at_move_by_interactable_id: registry.respawn_schedule(),
            potatoes_harvested: m.potatoes_harvested,
            chips_made: m.chips_made,
            goats_caught: m.goats_caught,
            toilet_flushes: m.toilet_flushes,
            bat_active: m.bat.active,
            bat_next_spawn_at_move: m.bat.next_spawn_at_move,
            bat_bites_taken: m.bat.bites_taken,
            bats_swatted: m.bat.bats_swatted,
            septic_last_pumped_move: m.septic.last_pumped_move,
            septic_last_pumped_at: m.septic.last_pumped_at,
            septic_overdue: m.septic.overdue,
            septic_overflowed: m.septic.overflowed,
            septic_times_pumped: m.septic.times_pumped,
            owned_snowmobile_ids: m.snowmobiles.owned.clone(),
            selected_owned_snowmobile_id: m.snowmobiles.selected.clone(),
            mounted_snowmobile_id: m.snowmobiles.mounted.clone(),
        }
    }

    /// Name of the first position JSON can't carry (NaN and infinities encode as `null`)
    pub fn non_finite_position(&self) -> Option<String> {
        if !self.player_position.is_finite() {
            return Some("playerPosition".to_string());
        }
        self.interactable_positions_by_id
            .iter()
            .find(|(_, p)| !p.is_finite())
            .map(|(id, _)| format!("interactablePositionsByID.{id}"))
    }

    /// Replace `state` with the snapshot contents. World definitions are kept.
    pub fn apply_to(&self, state: &mut GameState) {
        state.ledger = CurrencyLedger::restored(
            self.coins,
            self.lifetime_coins_earned,
            self.lifetime_coins_spent,
        );

        let positions = self
            .interactable_positions_by_id
            .iter()
            .map(|(id, p)| (id.clone(), Vec2::from(*p)))
            .collect();
        state.registry.restore(
            self.completed_move_count,
            &positions,
            &self.hidden_interactable_ids,
            &self.respawn_at_move_by_interactable_id,
        );

        state.player = Player::at(self.player_position.into());

        let mut minigames = MinigameProgress {
            potatoes_harvested: self.potatoes_harvested,
            chips_made: self.chips_made,
            goats_caught: self.goats_caught,
            toilet_flushes: self.toilet_flushes,
            bat: BatState {
                active: self.bat_active,
                next_spawn_at_move: self.bat_next_spawn_at_move,
                bites_taken: self.bat_bites_taken,
                bats_swatted: self.bats_swatted,
            },
            septic: SepticState {
                last_pumped_move: self.septic_last_pumped_move,
                last_pumped_at: self.septic_last_pumped_at,
                overdue: self.septic_overdue,
                overflowed: self.septic_overflowed,
                times_pumped: self.septic_times_pumped,
            },
            snowmobiles: SnowmobileGarage {
                owned: self.owned_snowmobile_ids.clone(),
                selected: self.selected_owned_snowmobile_id.clone(),
                mounted: self.mounted_snowmobile_id.clone(),
            },
        };
        minigames.normalize();
        state.minigames = minigames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EconomyConfig;
    use crate::sim::{InteractableConfig, InteractableKind, attempt_interaction, on_movement_completed};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> GameState {
        GameState::new(
            Vec2::new(1.0, 2.0),
            [
                InteractableConfig::new("goat", InteractableKind::GoatChase, Vec2::new(10.0, 0.0), 90.0),
                InteractableConfig::new("tank", InteractableKind::SepticTank, Vec2::new(0.0, 10.0), 90.0),
            ],
        )
    }

    fn played_state() -> GameState {
        let economy = EconomyConfig::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut state = world();
        let when = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        on_movement_completed(&mut state, &economy, &mut rng);
        attempt_interaction(&mut state, Vec2::ZERO, &InteractableId::from("goat"), &economy, &mut rng, when).unwrap();
        attempt_interaction(&mut state, Vec2::ZERO, &InteractableId::from("tank"), &economy, &mut rng, when).unwrap();
        state.ledger.add_coins(100);
        state.minigames.snowmobiles.buy("sled_1", &economy, &mut state.ledger).unwrap();
        state.minigames.snowmobiles.mount().unwrap();
        state.minigames.chips_made = 3;
        state.player.pos = Vec2::new(-4.5, 7.25);
        state
    }

    #[test]
    fn test_capture_apply_round_trip() {
        let state = played_state();
        let saved_at = Utc.with_ymd_and_hms(2025, 3, 2, 8, 30, 0).unwrap();
        let snapshot = ProgressionSnapshot::capture(&state, saved_at);

        let mut restored = world();
        snapshot.apply_to(&mut restored);
        assert_eq!(ProgressionSnapshot::capture(&restored, saved_at), snapshot);
        assert_eq!(restored.ledger, state.ledger);
        assert_eq!(restored.minigames, state.minigames);
    }

    #[test]
    fn test_json_uses_schema_field_names() {
        let snapshot = ProgressionSnapshot::capture(&played_state(), Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "schemaVersion",
            "appVersion",
            "savedAt",
            "coins",
            "completedMoveCount",
            "playerPosition",
            "interactablePositionsByID",
            "hiddenInteractableIDs",
            "respawnAtMoveByInteractableID",
            "ownedSnowmobileIDs",
            "selectedOwnedSnowmobileID",
            "mountedSnowmobileID",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["playerPosition"]["x"], -4.5);
        assert_eq!(json["hiddenInteractableIDs"][0], "goat");
    }

    #[test]
    fn test_non_finite_position_is_reported() {
        let mut state = played_state();
        let snapshot = ProgressionSnapshot::capture(&state, Utc::now());
        assert_eq!(snapshot.non_finite_position(), None);

        state.player.pos = Vec2::new(f32::NAN, 0.0);
        let snapshot = ProgressionSnapshot::capture(&state, Utc::now());
        assert_eq!(snapshot.non_finite_position().as_deref(), Some("playerPosition"));

        let mut snapshot = ProgressionSnapshot::capture(&world(), Utc::now());
        snapshot
            .interactable_positions_by_id
            .insert(InteractableId::from("tank"), Position { x: 0.0, y: f32::INFINITY });
        assert_eq!(
            snapshot.non_finite_position().as_deref(),
            Some("interactablePositionsByID.tank")
        );
    }

    #[test]
    fn test_apply_replaces_rather_than_merges() {
        let mut state = played_state();
        let fresh = ProgressionSnapshot::capture(&world(), Utc::now());
        fresh.apply_to(&mut state);
        assert_eq!(state.coins(), 0);
        assert_eq!(state.completed_moves(), 0);
        assert!(state.registry.hidden_ids().is_empty());
        assert_eq!(state.minigames, MinigameProgress::default());
        assert_eq!(state.player.pos, Vec2::new(1.0, 2.0));
    }
}
