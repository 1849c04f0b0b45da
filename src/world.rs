//! Compiled-in world layout
//!
//! Positions are in world units with the origin at the farmhouse door.

use glam::Vec2;

use crate::sim::{InteractableConfig, InteractableKind};

/// Default reach for objects the player has to stand next to
pub const DEFAULT_RANGE: f32 = 90.0;

/// Player spawn plus every interactable in the world
#[derive(Debug, Clone)]
pub struct WorldLayout {
    pub spawn: Vec2,
    pub interactables: Vec<InteractableConfig>,
}

pub fn default_world() -> WorldLayout {
    use InteractableKind::*;

    let mut interactables = vec![
        InteractableConfig::new("chip_fryer", ChipFryer, Vec2::new(160.0, -40.0), DEFAULT_RANGE),
        InteractableConfig::new("toilet", Toilet, Vec2::new(-220.0, 60.0), 60.0),
        InteractableConfig::new("septic_tank", SepticTank, Vec2::new(-300.0, 140.0), DEFAULT_RANGE),
    ];

    // Potato field: a 3x2 grid of patches south of the house
    for row in 0..2 {
        for col in 0..3 {
            let id = format!("potato_patch_{}", row * 3 + col);
            let pos = Vec2::new(-80.0 + col as f32 * 80.0, 220.0 + row as f32 * 80.0);
            interactables.push(InteractableConfig::new(id, PotatoPatch, pos, 50.0));
        }
    }

    // Goats graze in the east pasture
    let pasture = [
        Vec2::new(420.0, 80.0),
        Vec2::new(520.0, 160.0),
        Vec2::new(610.0, 40.0),
    ];
    for (i, pos) in pasture.into_iter().enumerate() {
        interactables.push(InteractableConfig::new(
            format!("goat_{i}"),
            GoatChase,
            pos,
            DEFAULT_RANGE,
        ));
    }

    WorldLayout {
        spawn: Vec2::ZERO,
        interactables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let world = default_world();
        let ids: HashSet<_> = world.interactables.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), world.interactables.len());
    }

    #[test]
    fn test_every_kind_is_placed() {
        let world = default_world();
        for kind in [
            InteractableKind::ChipFryer,
            InteractableKind::GoatChase,
            InteractableKind::PotatoPatch,
            InteractableKind::Toilet,
            InteractableKind::SepticTank,
        ] {
            assert!(world.interactables.iter().any(|c| c.kind == kind), "{kind:?} missing");
        }
    }
}
