//! Account type definitions for the registry ledger

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Account identifier - human-readable name
pub type AccountId = String;

/// Native value, in base units
pub type Amount = u64;

/// One unit of native value (9 decimals)
pub const ONE_UNIT: Amount = 1_000_000_000;

/// Roles a caller can be checked against
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Anyone may call
    Any,
    /// Only the deployer of the registry
    Owner,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Any => write!(f, "any"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

/// Derive the address a registry is deployed at.
///
/// `0x` + first 40 hex chars of SHA-256("{deployer}:{nonce}"), so two
/// deployments by the same account never collide.
pub fn derive_contract_address(deployer: &str, nonce: u64) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", deployer, nonce).as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("0x{}", &digest[..40])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_address_shape() {
        let addr = derive_contract_address("alice", 0);
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 42);
    }

    #[test]
    fn test_contract_address_depends_on_nonce() {
        assert_ne!(derive_contract_address("alice", 0), derive_contract_address("alice", 1));
        assert_ne!(derive_contract_address("alice", 0), derive_contract_address("bob", 0));
        assert_eq!(derive_contract_address("alice", 3), derive_contract_address("alice", 3));
    }
}
