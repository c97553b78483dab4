//! Account primitives for the registry ledger:
//! - Human-readable account identifiers
//! - Native value balances
//! - Caller authorization

pub mod types;
pub mod balance;
pub mod auth;

pub use types::{derive_contract_address, AccountId, Amount, Role, ONE_UNIT};
pub use balance::{BalanceError, BalanceStore};
pub use auth::authorize;
