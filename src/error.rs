use thiserror::Error;

use crate::account::{AccountId, Amount, Role};

/// Why a call was reverted. Every variant leaves world state exactly as it
/// was before the call started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error("age {age} exceeds maximum of {max}")]
    AgeOutOfRange { age: u32, max: u32 },
    #[error("payment of {paid} is below the required {required}")]
    InsufficientPayment { paid: Amount, required: Amount },
    #[error("caller '{caller}' lacks the {required} role")]
    Unauthorized { caller: AccountId, required: Role },
    #[error("operation does not accept value (sent {value})")]
    NonPayable { value: Amount },
    #[error("account '{account}' holds {available}, needs {needed}")]
    InsufficientFunds { account: AccountId, needed: Amount, available: Amount },
    #[error("value transfer failed: {0}")]
    TransferFailed(String),
    #[error("call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    #[error("the registry cannot call itself ('{0}')")]
    SelfCall(AccountId),
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Reverted: {0}")]
    Reverted(#[from] Revert),
    #[error("No registry deployed")]
    NotDeployed,
    #[error("Registry already deployed at {0}")]
    AlreadyDeployed(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Cannot credit custody address {0} outside a registry call")]
    CustodyAddress(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl RegistryError {
    /// The revert reason, if this error is a reverted call.
    pub fn revert(&self) -> Option<&Revert> {
        match self {
            RegistryError::Reverted(r) => Some(r),
            _ => None,
        }
    }
}

impl From<sled::Error> for RegistryError {
    fn from(err: sled::Error) -> Self {
        RegistryError::DatabaseError(err.to_string())
    }
}

impl From<bincode::Error> for RegistryError {
    fn from(err: bincode::Error) -> Self {
        RegistryError::SerializationError(err.to_string())
    }
}
