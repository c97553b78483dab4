pub mod account;
pub mod error;
pub mod config;
pub mod registry;
pub mod vm;
pub mod storage;
pub mod cli;

pub use error::{RegistryError, Revert};
pub use registry::{PersonRegistry, PersonView, RegistryEvent};
pub use vm::{Call, CallOutput, ReceiveHook, RegistryVm, WorldState};
