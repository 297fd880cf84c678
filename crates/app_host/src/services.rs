//! The injected bundle of host services the state runtime runs against.

use std::rc::Rc;

use crate::env::{EnvProbe, NoopEnvProbe};
use crate::storage::{MemoryStateStorage, NoopStateStorage, StateStorage};

/// Environment-selected host services.
///
/// The embedding picks concrete adapters (browser, memory, noop) and hands the
/// bundle to the state runtime, which only ever sees the contracts. Cloning is
/// cheap and shares the underlying services.
#[derive(Clone)]
pub struct HostServices {
    /// Durable storage for the persisted state document and legacy exports.
    pub storage: Rc<dyn StateStorage>,
    /// Environment signals for device detection and context-sensitive wiring.
    pub env: Rc<dyn EnvProbe>,
}

impl HostServices {
    /// Bundle the given adapters.
    pub fn new(storage: Rc<dyn StateStorage>, env: Rc<dyn EnvProbe>) -> Self {
        Self { storage, env }
    }

    /// Memory-backed storage with a silent probe, for tests and headless runs.
    pub fn memory() -> Self {
        Self {
            storage: Rc::new(MemoryStateStorage::default()),
            env: Rc::new(NoopEnvProbe),
        }
    }

    /// Fully inert services: nothing persists, no signals.
    pub fn noop() -> Self {
        Self {
            storage: Rc::new(NoopStateStorage),
            env: Rc::new(NoopEnvProbe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_services_persist_between_clones() {
        let services = HostServices::memory();
        let alias = services.clone();
        services.storage.save_entry("k", "v").unwrap();
        assert_eq!(alias.storage.load_entry("k"), Ok(Some("v".to_owned())));
    }

    #[test]
    fn noop_services_retain_nothing() {
        let services = HostServices::noop();
        services.storage.save_entry("k", "v").unwrap();
        assert_eq!(services.storage.load_entry("k"), Ok(None));
        assert!(services.env.user_agent().is_none());
    }
}
