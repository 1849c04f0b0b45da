//! Coin balance
//!
//! The balance never goes negative and negative amounts are treated as zero.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Not enough coins: need {needed}, have {balance}")]
    InsufficientCoins { needed: i64, balance: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyLedger {
    coins: i64,
    /// Lifetime coins credited
    #[serde(default)]
    total_earned: i64,
    /// Lifetime coins debited
    #[serde(default)]
    total_spent: i64,
}

impl CurrencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(coins: i64) -> Self {
        Self {
            coins: coins.max(0),
            ..Self::default()
        }
    }

    /// Rebuild a ledger from saved values
    pub fn restored(coins: i64, total_earned: i64, total_spent: i64) -> Self {
        Self {
            coins: coins.max(0),
            total_earned: total_earned.max(0),
            total_spent: total_spent.max(0),
        }
    }

    pub fn coins(&self) -> i64 {
        self.coins
    }

    pub fn total_earned(&self) -> i64 {
        self.total_earned
    }

    pub fn total_spent(&self) -> i64 {
        self.total_spent
    }

    pub fn add_coins(&mut self, amount: i64) -> i64 {
        let amount = amount.max(0);
        self.coins = self.coins.saturating_add(amount).max(0);
        self.total_earned = self.total_earned.saturating_add(amount);
        self.coins
    }

    /// Remove up to `amount`; the balance bottoms out at zero
    pub fn remove_coins(&mut self, amount: i64) -> i64 {
        let amount = amount.max(0);
        let taken = amount.min(self.coins);
        self.coins = self.coins.saturating_sub(amount).max(0);
        self.total_spent = self.total_spent.saturating_add(taken);
        self.coins
    }

    /// Overwrite the balance; the difference is booked as earned or spent
    pub fn set_coins(&mut self, amount: i64) -> i64 {
        let target = amount.max(0);
        if target >= self.coins {
            self.total_earned = self.total_earned.saturating_add(target - self.coins);
        } else {
            self.total_spent = self.total_spent.saturating_add(self.coins - target);
        }
        self.coins = target;
        self.coins
    }

    pub fn reset_coins(&mut self) -> i64 {
        *self = Self::default();
        self.coins
    }

    pub fn can_afford(&self, amount: i64) -> bool {
        self.coins >= amount.max(0)
    }

    /// Spend the full amount or nothing
    pub fn try_spend(&mut self, amount: i64) -> Result<i64, LedgerError> {
        let amount = amount.max(0);
        if !self.can_afford(amount) {
            return Err(LedgerError::InsufficientCoins {
                needed: amount,
                balance: self.coins,
            });
        }
        Ok(self.remove_coins(amount))
    }
}
