//! Native value ledger: the external holdings of every account,
//! including the funds a registry custodies at its own address.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use super::types::{AccountId, Amount};
use crate::error::Revert;

/// Balance store for all accounts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BalanceStore {
    /// Map of AccountId -> Balance
    balances: HashMap<AccountId, Amount>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BalanceError {
    InsufficientFunds { needed: Amount, available: Amount },
    Overflow,
}

impl BalanceError {
    /// Map into the revert a call observes when `account` was involved.
    pub fn into_revert(self, account: &str) -> Revert {
        match self {
            BalanceError::InsufficientFunds { needed, available } => Revert::InsufficientFunds {
                account: account.to_string(),
                needed,
                available,
            },
            BalanceError::Overflow => Revert::Overflow,
        }
    }
}

impl BalanceStore {
    /// Create a new empty balance store
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Get balance for an account
    pub fn get_balance(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Credit (add) balance to an account
    pub fn credit(&mut self, account: &str, amount: Amount) -> Result<(), BalanceError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.get_balance(account);
        let new_balance = current.checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.balances.insert(account.to_string(), new_balance);
        Ok(())
    }

    /// Debit (subtract) balance from an account
    pub fn debit(&mut self, account: &str, amount: Amount) -> Result<(), BalanceError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.get_balance(account);
        if current < amount {
            return Err(BalanceError::InsufficientFunds { needed: amount, available: current });
        }

        let new_balance = current - amount;
        if new_balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.to_string(), new_balance);
        }

        Ok(())
    }

    /// Transfer balance from one account to another
    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(), BalanceError> {
        self.debit(from, amount)?;

        if let Err(e) = self.credit(to, amount) {
            // Rollback on error
            self.credit(from, amount).ok();
            return Err(e);
        }

        Ok(())
    }

    /// Set balance directly (for genesis/faucet operations)
    pub fn set_balance(&mut self, account: &str, amount: Amount) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.to_string(), amount);
        }
    }

    /// Total value held across all accounts
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    /// Number of accounts with a non-zero balance
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// All non-zero holdings, sorted by account name
    pub fn holders(&self) -> Vec<(AccountId, Amount)> {
        let mut out: Vec<_> = self.balances.iter().map(|(a, b)| (a.clone(), *b)).collect();
        out.sort();
        out
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new()
    }
}
