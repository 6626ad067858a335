use quest_queue::QueueConfig;

/// Tuning for a [`crate::Store`]. Thin wrapper over [`QueueConfig`] today;
/// kept as its own type so store-level settings (e.g. a future read-replica
/// toggle) have somewhere to live without touching the queue's API.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    pub queue: QueueConfig,
}

impl StoreConfig {
    pub fn for_tests() -> Self {
        Self {
            queue: QueueConfig::for_tests(),
        }
    }
}
