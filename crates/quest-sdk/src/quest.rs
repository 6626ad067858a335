use std::path::Path;

use quest_core::Result;
use quest_engine::Engine;
use quest_store::{Store, StoreConfig};

/// The facade an external adapter embeds: one handle carrying both the
/// storage layer and the achievement engine built on top of it.
///
/// Cheap to clone — every field is `Arc`-backed through `Store` and
/// `Engine` — so each of the adapter's own concurrent event-handling tasks
/// can hold its own clone.
#[derive(Clone)]
pub struct Quest {
    store: Store,
    engine: Engine,
}

impl Quest {
    /// Opens (or creates) the SQLite file at `path`, running schema
    /// initialization, migrations, and catalog/settings seeding.
    #[tracing::instrument(skip(config))]
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let store = Store::open(path, config)?;
        Ok(Self::from_store(store))
    }

    /// The in-memory entry point, for tests and short-lived tooling.
    #[tracing::instrument(skip(config))]
    pub fn open_in_memory(config: StoreConfig) -> Result<Self> {
        let store = Store::open_in_memory(config)?;
        Ok(Self::from_store(store))
    }

    fn from_store(store: Store) -> Self {
        let engine = Engine::new(store.clone());
        Self { store, engine }
    }

    /// Direct access to the entity repositories (step/progress CRUD, user
    /// and settings stores) for operations the engine never needs to know
    /// about.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Direct access to the achievement evaluators and event hooks.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
