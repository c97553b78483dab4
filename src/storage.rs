use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::BalanceStore;
use crate::error::RegistryError;
use crate::registry::{PersonRegistry, RegistryEvent};
use crate::vm::WorldState;

const KEY_REGISTRY: &str = "registry";
const KEY_LEDGER: &str = "ledger";
const KEY_EVENTS: &str = "events";
const KEY_NONCE: &str = "deploy_nonce";

pub struct Storage {
    db: sled::Db,
}

impl Storage {
    pub fn new(path: &str) -> Result<Self, RegistryError> {
        let db = sled::open(path)?;
        Ok(Storage { db })
    }

    /// In-memory store removed on drop
    pub fn temporary() -> Result<Self, RegistryError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Storage { db })
    }

    // Generic Helper: Put
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RegistryError> {
        let serialized = bincode::serialize(value)?;
        self.db.insert(key.as_bytes(), serialized)?;
        Ok(())
    }

    // Generic Helper: Get
    pub fn get<T: for<'a> Deserialize<'a>>(&self, key: &str) -> Result<Option<T>, RegistryError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    // --- World State ---

    /// Load the persisted world, or an empty one if nothing is stored yet
    pub fn load_world(&self) -> Result<WorldState, RegistryError> {
        Ok(WorldState {
            registry: self.get::<Option<PersonRegistry>>(KEY_REGISTRY)?.flatten(),
            ledger: self.get::<BalanceStore>(KEY_LEDGER)?.unwrap_or_default(),
            events: self.get::<Vec<RegistryEvent>>(KEY_EVENTS)?.unwrap_or_default(),
            deploy_nonce: self.get::<u64>(KEY_NONCE)?.unwrap_or(0),
        })
    }

    /// Persist the whole world in one atomic batch
    pub fn save_world(&self, world: &WorldState) -> Result<(), RegistryError> {
        let mut batch = sled::Batch::default();
        batch.insert(KEY_REGISTRY, bincode::serialize(&world.registry)?);
        batch.insert(KEY_LEDGER, bincode::serialize(&world.ledger)?);
        batch.insert(KEY_EVENTS, bincode::serialize(&world.events)?);
        batch.insert(KEY_NONCE, bincode::serialize(&world.deploy_nonce)?);
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        debug!("Persistence: world saved ({} events)", world.events.len());
        Ok(())
    }
}
