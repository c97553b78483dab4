use serde::{Deserialize, Serialize};

use crate::account::{AccountId, Amount};

/// Log entries emitted by committed registry calls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    PersonCreated {
        name: String,
        senior: bool,
        created_by: AccountId,
    },
    PersonDeleted {
        name: String,
        senior: bool,
        deleted_by: AccountId,
    },
    FundsWithdrawn {
        to: AccountId,
        amount: Amount,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::PersonCreated { name, senior, created_by } => {
                write!(f, "PersonCreated name={} senior={} by={}", name, senior, created_by)
            }
            RegistryEvent::PersonDeleted { name, senior, deleted_by } => {
                write!(f, "PersonDeleted name={} senior={} by={}", name, senior, deleted_by)
            }
            RegistryEvent::FundsWithdrawn { to, amount } => {
                write!(f, "FundsWithdrawn to={} amount={}", to, amount)
            }
        }
    }
}
