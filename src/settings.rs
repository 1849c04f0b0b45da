//! Economy tuning and player preferences
//!
//! Persisted separately from progress saves. Every field is clamped to its
//! declared range, so any value read back from storage or typed into the
//! settings dialog is usable as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::quiz::QuizStatsStore;

/// Bounds and default for one economy field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Persisted key
    pub key: &'static str,
    pub minimum: i64,
    pub maximum: i64,
    pub default: i64,
}

/// Every tunable economy parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomyField {
    GoatReward,
    ChipReward,
    PotatoReward,
    ToiletReward,
    SepticPumpReward,
    QuizCorrectReward,
    QuizQuestionCount,
    GoatRespawnMinMoves,
    GoatRespawnMaxMoves,
    BatSpawnMinMoves,
    BatSpawnMaxMoves,
    BatBitePenalty,
    SepticPumpIntervalMoves,
    SepticDeadlineMoves,
    SepticOverflowPenalty,
    SnowmobilePrice,
}

impl EconomyField {
    pub const COUNT: usize = 16;

    pub const ALL: [EconomyField; Self::COUNT] = [
        EconomyField::GoatReward,
        EconomyField::ChipReward,
        EconomyField::PotatoReward,
        EconomyField::ToiletReward,
        EconomyField::SepticPumpReward,
        EconomyField::QuizCorrectReward,
        EconomyField::QuizQuestionCount,
        EconomyField::GoatRespawnMinMoves,
        EconomyField::GoatRespawnMaxMoves,
        EconomyField::BatSpawnMinMoves,
        EconomyField::BatSpawnMaxMoves,
        EconomyField::BatBitePenalty,
        EconomyField::SepticPumpIntervalMoves,
        EconomyField::SepticDeadlineMoves,
        EconomyField::SepticOverflowPenalty,
        EconomyField::SnowmobilePrice,
    ];

    /// (min field, max field) pairs where max must stay >= min
    pub const ORDERED_PAIRS: [(EconomyField, EconomyField); 2] = [
        (EconomyField::GoatRespawnMinMoves, EconomyField::GoatRespawnMaxMoves),
        (EconomyField::BatSpawnMinMoves, EconomyField::BatSpawnMaxMoves),
    ];

    pub fn spec(&self) -> FieldSpec {
        let (key, minimum, maximum, default) = match self {
            EconomyField::GoatReward => ("goat_reward", 0, 1000, 5),
            EconomyField::ChipReward => ("chip_reward", 0, 1000, 2),
            EconomyField::PotatoReward => ("potato_reward", 0, 1000, 1),
            EconomyField::ToiletReward => ("toilet_reward", 0, 1000, 1),
            EconomyField::SepticPumpReward => ("septic_pump_reward", 0, 1000, 4),
            EconomyField::QuizCorrectReward => ("quiz_correct_reward", 0, 1000, 3),
            EconomyField::QuizQuestionCount => ("quiz_question_count", 1, 20, 5),
            EconomyField::GoatRespawnMinMoves => ("goat_respawn_min_moves", 1, 500, 10),
            EconomyField::GoatRespawnMaxMoves => ("goat_respawn_max_moves", 1, 500, 25),
            EconomyField::BatSpawnMinMoves => ("bat_spawn_min_moves", 1, 500, 15),
            EconomyField::BatSpawnMaxMoves => ("bat_spawn_max_moves", 1, 500, 40),
            EconomyField::BatBitePenalty => ("bat_bite_penalty", 0, 1000, 3),
            EconomyField::SepticPumpIntervalMoves => ("septic_pump_interval_moves", 1, 1000, 60),
            EconomyField::SepticDeadlineMoves => ("septic_deadline_moves", 1, 1000, 20),
            EconomyField::SepticOverflowPenalty => ("septic_overflow_penalty", 0, 1000, 10),
            EconomyField::SnowmobilePrice => ("snowmobile_price", 0, 100_000, 50),
        };
        FieldSpec {
            key,
            minimum,
            maximum,
            default,
        }
    }

    pub fn key(&self) -> &'static str {
        self.spec().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// Clamp a raw value into this field's range
    pub fn clamp_value(&self, value: i64) -> i64 {
        let spec = self.spec();
        value.clamp(spec.minimum, spec.maximum)
    }
}

/// Tunable economy parameters
///
/// Serialized as a map from field key to value. Unknown keys are dropped and
/// missing keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct EconomyConfig {
    values: [i64; EconomyField::COUNT],
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let mut values = [0; EconomyField::COUNT];
        for field in EconomyField::ALL {
            values[field.index()] = field.spec().default;
        }
        Self { values }
    }
}

impl EconomyConfig {
    pub fn get(&self, field: EconomyField) -> i64 {
        self.values[field.index()]
    }

    /// Assign a value (clamped) and return what the field holds afterwards.
    ///
    /// For the max half of an ordered pair the result can be raised to the
    /// paired min.
    pub fn set(&mut self, field: EconomyField, value: i64) -> i64 {
        self.values[field.index()] = value;
        self.normalize();
        let result = self.get(field);
        log::debug!("Economy {} = {} (requested {})", field.key(), result, value);
        result
    }

    /// Read, add `delta`, and route through `set`
    pub fn adjust(&mut self, field: EconomyField, delta: i64) -> i64 {
        let current = self.get(field);
        self.set(field, current.saturating_add(delta))
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    /// Re-clamp every field, then raise any max that fell below its min
    pub fn normalize(&mut self) {
        for field in EconomyField::ALL {
            let i = field.index();
            self.values[i] = field.clamp_value(self.values[i]);
        }
        for (min_field, max_field) in EconomyField::ORDERED_PAIRS {
            let min = self.get(min_field);
            if self.get(max_field) < min {
                self.values[max_field.index()] = min;
            }
        }
    }

    /// Inclusive range between a min/max pair
    pub fn range(&self, min_field: EconomyField, max_field: EconomyField) -> (i64, i64) {
        let lo = self.get(min_field);
        (lo, self.get(max_field).max(lo))
    }
}

impl From<BTreeMap<String, i64>> for EconomyConfig {
    fn from(map: BTreeMap<String, i64>) -> Self {
        let mut config = Self::default();
        for (key, value) in map {
            match EconomyField::from_key(&key) {
                Some(field) => config.values[field.index()] = value,
                None => log::warn!("Ignoring unknown economy field '{}'", key),
            }
        }
        config.normalize();
        config
    }
}

impl From<EconomyConfig> for BTreeMap<String, i64> {
    fn from(config: EconomyConfig) -> Self {
        EconomyField::ALL
            .into_iter()
            .map(|f| (f.key().to_string(), config.get(f)))
            .collect()
    }
}

/// Everything stored in the settings blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub quiz_stats: QuizStatsStore,
}
