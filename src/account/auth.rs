//! Caller authorization

use super::types::{AccountId, Role};
use crate::error::Revert;

/// Check that `caller` holds `required` against a registry owned by `owner`.
///
/// Restricted operations call this before touching any state.
pub fn authorize(caller: &str, owner: &str, required: Role) -> Result<(), Revert> {
    let allowed = match required {
        Role::Any => true,
        Role::Owner => caller == owner,
    };

    if allowed {
        Ok(())
    } else {
        Err(Revert::Unauthorized {
            caller: AccountId::from(caller),
            required,
        })
    }
}
