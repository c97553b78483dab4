//! Execution environment for the person registry.
//!
//! `RegistryVm` owns the whole world state (the deployed registry, the
//! native value ledger and the event log) and runs each call inside its
//! own commit frame: a snapshot is taken on entry and restored if the call
//! fails, so a failed call leaves no trace. Value transfers to an account
//! with a receive hook run that hook, which may re-enter the VM; nested
//! calls get their own frame.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::{derive_contract_address, AccountId, Amount, BalanceStore};
use crate::config::RegistryRules;
use crate::error::{RegistryError, Revert};
use crate::registry::{PersonRegistry, PersonView, RegistryEvent};

/// Code run when an account receives native value.
///
/// Returning `Err` fails the transfer, which reverts the call that issued it.
pub trait ReceiveHook: Send + Sync {
    fn on_receive(&self, vm: &mut RegistryVm, from: &str, amount: Amount) -> Result<(), String>;
}

impl<F> ReceiveHook for F
where
    F: Fn(&mut RegistryVm, &str, Amount) -> Result<(), String> + Send + Sync,
{
    fn on_receive(&self, vm: &mut RegistryVm, from: &str, amount: Amount) -> Result<(), String> {
        self(vm, from, amount)
    }
}

/// Durable state of the world
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorldState {
    pub registry: Option<PersonRegistry>,
    pub ledger: BalanceStore,
    pub events: Vec<RegistryEvent>,
    pub deploy_nonce: u64,
}

/// Registry entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePerson { name: String, age: u32, height: u32 },
    GetPerson,
    DeletePerson { target: AccountId },
    WithdrawAll,
    Owner,
    Balance,
}

impl Call {
    pub fn is_payable(&self) -> bool {
        matches!(self, Call::CreatePerson { .. })
    }

    /// Queries that can never change state
    pub fn is_read_only(&self) -> bool {
        matches!(self, Call::GetPerson | Call::Owner | Call::Balance)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Call::CreatePerson { .. } => "createPerson",
            Call::GetPerson => "getPerson",
            Call::DeletePerson { .. } => "deletePerson",
            Call::WithdrawAll => "withdrawAll",
            Call::Owner => "owner",
            Call::Balance => "balance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    Unit,
    Person(PersonView),
    Owner(AccountId),
    Balance(Amount),
}

/// Rollback point for one call frame. Events are append-only, so only
/// their length is kept.
struct Frame {
    registry: Option<PersonRegistry>,
    ledger: BalanceStore,
    events_len: usize,
}

impl Frame {
    fn capture(state: &WorldState) -> Self {
        Frame {
            registry: state.registry.clone(),
            ledger: state.ledger.clone(),
            events_len: state.events.len(),
        }
    }

    fn restore(self, state: &mut WorldState) {
        state.registry = self.registry;
        state.ledger = self.ledger;
        state.events.truncate(self.events_len);
    }
}

pub struct RegistryVm {
    state: WorldState,
    hooks: HashMap<AccountId, Arc<dyn ReceiveHook>>,
    depth: usize,
}

impl RegistryVm {
    pub fn new() -> Self {
        Self::from_state(WorldState::default())
    }

    pub fn from_state(state: WorldState) -> Self {
        RegistryVm {
            state,
            hooks: HashMap::new(),
            depth: 0,
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn registry(&self) -> Option<&PersonRegistry> {
        self.state.registry.as_ref()
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.state.events
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.state.ledger.get_balance(account)
    }

    /// Install code to run whenever `account` receives value
    pub fn set_receive_hook(&mut self, account: &str, hook: Arc<dyn ReceiveHook>) {
        self.hooks.insert(account.to_string(), hook);
    }

    pub fn clear_receive_hook(&mut self, account: &str) {
        self.hooks.remove(account);
    }

    /// Credit native value to an account out of thin air (genesis/faucet).
    ///
    /// The registry's custody address only receives value through
    /// `createPerson`.
    pub fn mint(&mut self, account: &str, amount: Amount) -> Result<(), RegistryError> {
        if self.registry().is_some_and(|r| r.address() == account) {
            return Err(RegistryError::CustodyAddress(account.to_string()));
        }
        self.state
            .ledger
            .credit(account, amount)
            .map_err(|e| e.into_revert(account))?;
        info!("Ledger: minted {} to {}", amount, account);
        Ok(())
    }

    /// Deploy the registry with `owner` as its owner. Returns its address.
    pub fn deploy(&mut self, owner: &str, rules: RegistryRules) -> Result<AccountId, RegistryError> {
        if let Some(existing) = &self.state.registry {
            return Err(RegistryError::AlreadyDeployed(existing.address().to_string()));
        }

        let address = derive_contract_address(owner, self.state.deploy_nonce);
        self.state.deploy_nonce += 1;
        self.state.registry = Some(PersonRegistry::new(owner.to_string(), address.clone(), rules));
        info!("Registry deployed at {} (owner {})", address, owner);
        Ok(address)
    }

    /// Run one call as `caller`, sending `value` along with it.
    ///
    /// Either every effect of the call commits, or none does. A top-level
    /// call that would leave the invariants broken is reverted too.
    pub fn call(&mut self, caller: &str, value: Amount, call: Call) -> Result<CallOutput, RegistryError> {
        let limit = self.registry_ref()?.rules().max_call_depth;
        if self.depth >= limit {
            return Err(Revert::CallDepthExceeded { limit }.into());
        }

        debug!("VM: {} -> {} (value {}, depth {})", caller, call.name(), value, self.depth);
        let name = call.name();
        let frame = if call.is_read_only() { None } else { Some(Frame::capture(&self.state)) };
        self.depth += 1;
        let mut result = self.dispatch(caller, value, call);
        self.depth -= 1;

        if result.is_ok() && self.depth == 0 && frame.is_some() {
            if let Err(e) = self.check_invariants() {
                result = Err(e);
            }
        }

        if let Err(e) = &result {
            warn!("VM: {} by {} reverted: {}", name, caller, e);
            if let Some(frame) = frame {
                frame.restore(&mut self.state);
            }
        }
        result
    }

    /// Check the ledger invariants of the deployed registry.
    pub fn check_invariants(&self) -> Result<(), RegistryError> {
        let Some(registry) = &self.state.registry else {
            return Ok(());
        };

        let custodied = self.state.ledger.get_balance(registry.address());
        if registry.balance() != custodied {
            return Err(RegistryError::InvariantViolation(format!(
                "registry balance {} does not match custodied funds {}",
                registry.balance(),
                custodied
            )));
        }

        let person = registry.get_person();
        if person.age > registry.rules().max_age {
            return Err(RegistryError::InvariantViolation(format!(
                "stored age {} exceeds {}",
                person.age,
                registry.rules().max_age
            )));
        }
        if person.senior != (person.age >= registry.rules().senior_age) && registry.has_person() {
            return Err(RegistryError::InvariantViolation("senior flag out of sync with age".to_string()));
        }
        Ok(())
    }

    fn dispatch(&mut self, caller: &str, value: Amount, call: Call) -> Result<CallOutput, RegistryError> {
        if value > 0 && !call.is_payable() {
            return Err(Revert::NonPayable { value }.into());
        }

        let address = self.registry_ref()?.address().to_string();
        if caller == address {
            return Err(Revert::SelfCall(address).into());
        }

        // Value travels with the call into custody
        self.state
            .ledger
            .transfer(caller, &address, value)
            .map_err(|e| e.into_revert(caller))?;

        match call {
            Call::CreatePerson { name, age, height } => {
                let event = self.registry_mut()?.create_person(caller, value, name, age, height)?;
                self.state.events.push(event);
                Ok(CallOutput::Unit)
            }
            Call::GetPerson => Ok(CallOutput::Person(self.registry_ref()?.get_person())),
            Call::DeletePerson { target } => {
                if let Some(event) = self.registry_mut()?.delete_person(caller, &target)? {
                    self.state.events.push(event);
                }
                Ok(CallOutput::Unit)
            }
            Call::WithdrawAll => {
                self.withdraw_all(caller)?;
                Ok(CallOutput::Unit)
            }
            Call::Owner => Ok(CallOutput::Owner(self.registry_ref()?.owner().to_string())),
            Call::Balance => Ok(CallOutput::Balance(self.registry_ref()?.balance())),
        }
    }

    fn withdraw_all(&mut self, caller: &str) -> Result<(), RegistryError> {
        // Phase 1: commit internal state
        let registry = self.registry_mut()?;
        let withdrawal = registry.begin_withdrawal(caller)?;
        let from = registry.address().to_string();
        self.state.events.push(RegistryEvent::FundsWithdrawn {
            to: withdrawal.to.clone(),
            amount: withdrawal.amount,
        });

        // Phase 2: external transfer; failure unwinds phase 1 via the call frame
        self.transfer(&from, &withdrawal.to, withdrawal.amount)?;
        info!("Registry: withdrew {} to {}", withdrawal.amount, withdrawal.to);
        Ok(())
    }

    /// Native value transfer. Runs the recipient's receive hook, if any,
    /// once the value has moved.
    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(), RegistryError> {
        self.state
            .ledger
            .transfer(from, to, amount)
            .map_err(|e| Revert::TransferFailed(e.into_revert(from).to_string()))?;

        if amount == 0 {
            return Ok(());
        }
        if let Some(hook) = self.hooks.get(to).cloned() {
            hook.on_receive(self, from, amount).map_err(Revert::TransferFailed)?;
        }
        Ok(())
    }

    fn registry_ref(&self) -> Result<&PersonRegistry, RegistryError> {
        self.state.registry.as_ref().ok_or(RegistryError::NotDeployed)
    }

    fn registry_mut(&mut self) -> Result<&mut PersonRegistry, RegistryError> {
        self.state.registry.as_mut().ok_or(RegistryError::NotDeployed)
    }
}

impl Default for RegistryVm {
    fn default() -> Self {
        Self::new()
    }
}
