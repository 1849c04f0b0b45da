//! Per-frame update and the player-action entry points
//!
//! Time only advances in whole moves: a move completes when the player
//! reaches a tap target. Each move runs the full pipeline (clock, respawn
//! sweep, bat, septic) before anything else touches the state.

use chrono::{DateTime, Utc};
use glam::Vec2;
use rand::Rng;

use super::interactable::{InteractableId, InteractionRejection, InteractionSuccess};
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::settings::EconomyConfig;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New walk target from a tap (replaces any current target)
    pub tap_target: Option<Vec2>,
}

/// Advance the game state by one frame
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    economy: &EconomyConfig,
    rng: &mut R,
) -> Vec<GameEvent> {
    match input.tap_target {
        Some(target) if target.is_finite() => state.player.target = Some(target),
        Some(target) => log::debug!("Ignoring non-finite tap target {}", target),
        None => {}
    }

    let Some(target) = state.player.target else {
        return Vec::new();
    };

    state.player.pos = crate::step_toward(state.player.pos, target, PLAYER_SPEED * dt.max(0.0));
    if crate::distance(state.player.pos, target) > ARRIVAL_EPSILON {
        return Vec::new();
    }

    state.player.pos = target;
    state.player.target = None;
    on_movement_completed(state, economy, rng)
}

/// Count one completed move and run everything scheduled on the move clock
pub fn on_movement_completed<R: Rng + ?Sized>(
    state: &mut GameState,
    economy: &EconomyConfig,
    rng: &mut R,
) -> Vec<GameEvent> {
    let respawned = state.registry.complete_move();
    let count = state.registry.completed_moves();

    let mut events = vec![GameEvent::MoveCompleted { count }];
    events.extend(respawned.into_iter().map(|id| GameEvent::Respawned { id }));
    events.extend(
        state
            .minigames
            .on_move_completed(count, economy, &mut state.ledger, rng),
    );
    events
}

/// Interact with an object from `player_pos`
pub fn attempt_interaction<R: Rng + ?Sized>(
    state: &mut GameState,
    player_pos: Vec2,
    id: &InteractableId,
    economy: &EconomyConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<InteractionSuccess, InteractionRejection> {
    let success = state
        .registry
        .attempt(id, player_pos, economy, &mut state.ledger, rng)?;
    state
        .minigames
        .record_interaction(success.kind, state.registry.completed_moves(), now);
    log::debug!("{} (balance {})", success.message, success.balance);
    Ok(success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EconomyField;
    use crate::sim::{InteractableConfig, InteractableKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn small_world() -> GameState {
        GameState::new(
            Vec2::ZERO,
            [
                InteractableConfig::new("goat", InteractableKind::GoatChase, Vec2::new(100.0, 0.0), 90.0),
                InteractableConfig::new("patch", InteractableKind::PotatoPatch, Vec2::new(0.0, 30.0), 40.0),
            ],
        )
    }

    fn quiet_economy() -> EconomyConfig {
        let mut economy = EconomyConfig::default();
        economy.set(EconomyField::BatSpawnMinMoves, 500);
        economy.set(EconomyField::SepticPumpIntervalMoves, 1000);
        economy
    }

    #[test]
    fn test_walk_completes_one_move_on_arrival() {
        let mut state = small_world();
        let economy = quiet_economy();
        let mut rng = Pcg32::seed_from_u64(1);

        let input = TickInput {
            tap_target: Some(Vec2::new(90.0, 0.0)),
        };
        // 180 units/s, half a second gets there
        let events = tick(&mut state, &input, 0.25, &economy, &mut rng);
        assert!(events.is_empty());
        assert!(state.player.is_walking());

        let events = tick(&mut state, &TickInput::default(), 0.25, &economy, &mut rng);
        assert_eq!(events, vec![GameEvent::MoveCompleted { count: 1 }]);
        assert_eq!(state.player.pos, Vec2::new(90.0, 0.0));
        assert!(!state.player.is_walking());

        // Idle frames don't advance the clock
        tick(&mut state, &TickInput::default(), 1.0, &economy, &mut rng);
        assert_eq!(state.completed_moves(), 1);
    }

    #[test]
    fn test_retargeting_mid_walk_does_not_count_a_move() {
        let mut state = small_world();
        let economy = quiet_economy();
        let mut rng = Pcg32::seed_from_u64(1);

        let first = TickInput {
            tap_target: Some(Vec2::new(1000.0, 0.0)),
        };
        tick(&mut state, &first, 0.1, &economy, &mut rng);
        let second = TickInput {
            tap_target: Some(Vec2::new(0.0, 0.0)),
        };
        tick(&mut state, &second, 0.01, &economy, &mut rng);
        assert_eq!(state.completed_moves(), 0);
        let events = tick(&mut state, &TickInput::default(), 1.0, &economy, &mut rng);
        assert_eq!(events, vec![GameEvent::MoveCompleted { count: 1 }]);
    }

    #[test]
    fn test_non_finite_tap_is_ignored() {
        let mut state = small_world();
        let economy = quiet_economy();
        let mut rng = Pcg32::seed_from_u64(1);

        for target in [
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(f32::INFINITY, 10.0),
            Vec2::new(0.0, f32::NEG_INFINITY),
        ] {
            let input = TickInput {
                tap_target: Some(target),
            };
            let events = tick(&mut state, &input, 1.0, &economy, &mut rng);
            assert!(events.is_empty());
        }
        assert_eq!(state.completed_moves(), 0);
        assert_eq!(state.player.pos, Vec2::ZERO);
        assert!(!state.player.is_walking());

        // A bad tap mid-walk keeps the current target
        let walk = TickInput {
            tap_target: Some(Vec2::new(90.0, 0.0)),
        };
        tick(&mut state, &walk, 0.1, &economy, &mut rng);
        let bad = TickInput {
            tap_target: Some(Vec2::new(f32::NAN, f32::NAN)),
        };
        let events = tick(&mut state, &bad, 1.0, &economy, &mut rng);
        assert_eq!(events, vec![GameEvent::MoveCompleted { count: 1 }]);
        assert_eq!(state.player.pos, Vec2::new(90.0, 0.0));
    }

    #[test]
    fn test_goat_cooldown_scenario() {
        let mut state = small_world();
        let mut economy = quiet_economy();
        economy.set(EconomyField::GoatRespawnMinMoves, 2);
        economy.set(EconomyField::GoatRespawnMaxMoves, 2);
        let mut rng = Pcg32::seed_from_u64(4);
        let goat = InteractableId::from("goat");
        let now = Utc::now();

        let far = attempt_interaction(&mut state, Vec2::new(5.0, 0.0), &goat, &economy, &mut rng, now);
        assert!(matches!(far, Err(InteractionRejection::TooFar { .. })));
        assert_eq!(state.coins(), 0);

        let ok = attempt_interaction(&mut state, Vec2::new(50.0, 0.0), &goat, &economy, &mut rng, now)
            .unwrap();
        assert_eq!(ok.respawn_at_move, Some(2));
        assert_eq!(state.coins(), 5);
        assert_eq!(state.minigames.goats_caught, 1);

        on_movement_completed(&mut state, &economy, &mut rng);
        let events = on_movement_completed(&mut state, &economy, &mut rng);
        assert_eq!(
            events,
            vec![
                GameEvent::MoveCompleted { count: 2 },
                GameEvent::Respawned { id: goat.clone() }
            ]
        );
        let events = on_movement_completed(&mut state, &economy, &mut rng);
        assert_eq!(events, vec![GameEvent::MoveCompleted { count: 3 }]);
    }

    #[test]
    fn test_potato_patch_counts_harvests() {
        let mut state = small_world();
        let economy = quiet_economy();
        let mut rng = Pcg32::seed_from_u64(4);
        let patch = InteractableId::from("patch");
        for _ in 0..3 {
            attempt_interaction(&mut state, Vec2::ZERO, &patch, &economy, &mut rng, Utc::now()).unwrap();
        }
        assert_eq!(state.minigames.potatoes_harvested, 3);
        assert_eq!(state.coins(), 3);
    }
}
