//! The person registry contract state machine.
//!
//! Holds at most one person record, the deployer as owner, and the
//! balance of accepted payments. Every operation validates first and
//! mutates last; value movement in and out of custody is done by the
//! [`crate::vm::RegistryVm`] around these methods.

pub mod events;
pub mod person;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::account::{authorize, AccountId, Amount, Role};
use crate::config::RegistryRules;
use crate::error::Revert;

pub use events::RegistryEvent;
pub use person::{PersonRecord, PersonView};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersonRegistry {
    owner: AccountId,
    address: AccountId,
    person: Option<PersonRecord>,
    balance: Amount,
    rules: RegistryRules,
}

/// Phase one of `withdrawAll`: the balance has already been zeroed and
/// `amount` must now leave custody for `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub to: AccountId,
    pub amount: Amount,
}

impl PersonRegistry {
    pub fn new(owner: AccountId, address: AccountId, rules: RegistryRules) -> Self {
        Self {
            owner,
            address,
            person: None,
            balance: 0,
            rules,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Ledger address where custodied funds are held
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn rules(&self) -> &RegistryRules {
        &self.rules
    }

    pub fn has_person(&self) -> bool {
        self.person.is_some()
    }

    /// Store a person, replacing any existing one, and account for `payment`.
    ///
    /// The caller must already have moved `payment` into the registry's
    /// address; on error the VM reverts that transfer.
    pub fn create_person(
        &mut self,
        caller: &str,
        payment: Amount,
        name: String,
        age: u32,
        height: u32,
    ) -> Result<RegistryEvent, Revert> {
        if age > self.rules.max_age {
            return Err(Revert::AgeOutOfRange { age, max: self.rules.max_age });
        }
        if payment < self.rules.min_payment {
            return Err(Revert::InsufficientPayment {
                paid: payment,
                required: self.rules.min_payment,
            });
        }
        let new_balance = self.balance.checked_add(payment).ok_or(Revert::Overflow)?;

        let record = PersonRecord { name, age, height };
        let event = RegistryEvent::PersonCreated {
            name: record.name.clone(),
            senior: record.is_senior(self.rules.senior_age),
            created_by: caller.to_string(),
        };

        self.person = Some(record);
        self.balance = new_balance;
        info!("Registry: person stored by {} (paid {}, balance {})", caller, payment, self.balance);
        Ok(event)
    }

    pub fn get_person(&self) -> PersonView {
        self.person
            .as_ref()
            .map(|p| p.view(self.rules.senior_age))
            .unwrap_or_default()
    }

    /// Clear the person slot. Owner only.
    ///
    /// `target` does not select anything: there is a single slot.
    /// Returns `None` when the slot was already empty.
    pub fn delete_person(&mut self, caller: &str, target: &str) -> Result<Option<RegistryEvent>, Revert> {
        authorize(caller, &self.owner, Role::Owner)?;

        if target != caller {
            debug!("Registry: delete target '{}' ignored, single slot", target);
        }

        let event = self.person.take().map(|p| RegistryEvent::PersonDeleted {
            senior: p.is_senior(self.rules.senior_age),
            name: p.name,
            deleted_by: caller.to_string(),
        });
        if event.is_some() {
            info!("Registry: person deleted by {}", caller);
        }
        Ok(event)
    }

    /// First phase of `withdrawAll`: zero the balance before any value
    /// leaves custody. Owner only.
    pub fn begin_withdrawal(&mut self, caller: &str) -> Result<Withdrawal, Revert> {
        authorize(caller, &self.owner, Role::Owner)?;

        let amount = self.balance;
        self.balance = 0;
        Ok(Withdrawal {
            to: self.owner.clone(),
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ONE_UNIT;

    fn registry() -> PersonRegistry {
        PersonRegistry::new("owner".to_string(), "0xreg".to_string(), RegistryRules::default())
    }

    #[test]
    fn test_new_registry_is_empty() {
        let r = registry();
        assert_eq!(r.owner(), "owner");
        assert_eq!(r.balance(), 0);
        assert!(!r.has_person());
        assert_eq!(r.get_person(), PersonView::default());
    }

    #[test]
    fn test_create_rejects_age_over_limit() {
        let mut r = registry();
        let err = r.create_person("bob", ONE_UNIT, "Bob".to_string(), 151, 190).unwrap_err();
        assert_eq!(err, Revert::AgeOutOfRange { age: 151, max: 150 });
        assert!(!r.has_person());
        assert_eq!(r.balance(), 0);
    }

    #[test]
    fn test_create_accepts_age_at_limit() {
        let mut r = registry();
        r.create_person("bob", ONE_UNIT, "Bob".to_string(), 150, 190).unwrap();
        assert_eq!(r.get_person().age, 150);
    }

    #[test]
    fn test_create_rejects_underpayment() {
        let mut r = registry();
        let err = r.create_person("bob", ONE_UNIT - 1, "Bob".to_string(), 50, 190).unwrap_err();
        assert_eq!(err, Revert::InsufficientPayment { paid: ONE_UNIT - 1, required: ONE_UNIT });
        assert_eq!(r.balance(), 0);
    }

    #[test]
    fn test_create_keeps_full_payment() {
        let mut r = registry();
        r.create_person("bob", 3 * ONE_UNIT, "Bob".to_string(), 30, 180).unwrap();
        assert_eq!(r.balance(), 3 * ONE_UNIT);
    }

    #[test]
    fn test_create_overwrites_slot() {
        let mut r = registry();
        r.create_person("bob", ONE_UNIT, "Bob".to_string(), 30, 180).unwrap();
        let event = r.create_person("carol", ONE_UNIT, "Carol".to_string(), 70, 160).unwrap();

        assert_eq!(
            event,
            RegistryEvent::PersonCreated { name: "Carol".to_string(), senior: true, created_by: "carol".to_string() }
        );
        let p = r.get_person();
        assert_eq!(p.name, "Carol");
        assert!(p.senior);
        assert_eq!(r.balance(), 2 * ONE_UNIT);
    }

    #[test]
    fn test_senior_flag_follows_rules() {
        let rules = RegistryRules { senior_age: 60, ..RegistryRules::default() };
        let mut r = PersonRegistry::new("owner".to_string(), "0xreg".to_string(), rules);
        r.create_person("bob", ONE_UNIT, "Bob".to_string(), 60, 180).unwrap();
        assert!(r.get_person().senior);
    }

    #[test]
    fn test_delete_requires_owner() {
        let mut r = registry();
        r.create_person("bob", ONE_UNIT, "Bob".to_string(), 30, 180).unwrap();

        let err = r.delete_person("bob", "bob").unwrap_err();
        assert!(matches!(err, Revert::Unauthorized { required: Role::Owner, .. }));
        assert!(r.has_person());

        let event = r.delete_person("owner", "bob").unwrap();
        assert!(matches!(event, Some(RegistryEvent::PersonDeleted { .. })));
        assert!(!r.has_person());
    }

    #[test]
    fn test_delete_empty_slot_is_noop() {
        let mut r = registry();
        assert_eq!(r.delete_person("owner", "anyone").unwrap(), None);
    }

    #[test]
    fn test_begin_withdrawal_zeroes_first() {
        let mut r = registry();
        r.create_person("bob", 2 * ONE_UNIT, "Bob".to_string(), 30, 180).unwrap();

        assert!(r.begin_withdrawal("bob").is_err());
        assert_eq!(r.balance(), 2 * ONE_UNIT);

        let w = r.begin_withdrawal("owner").unwrap();
        assert_eq!(w, Withdrawal { to: "owner".to_string(), amount: 2 * ONE_UNIT });
        assert_eq!(r.balance(), 0);

        let again = r.begin_withdrawal("owner").unwrap();
        assert_eq!(again.amount, 0);
    }
}
