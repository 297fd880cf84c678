pub mod bootstrap;
pub mod migrations;
pub mod model;
pub mod persistence;
pub mod platform;
pub mod provider;
pub mod reducer;
pub mod store;

pub use bootstrap::{client_store, initialize_store, StoreInitError};
pub use migrations::{MigrationStep, LEGACY_SLICE_KEYS, MIGRATIONS};
pub use model::*;
pub use persistence::{
    PersistConfig, PersistController, PersistError, PersistMeta, PersistedPayload,
    BLOCKED_SLICE_FIELDS, PERSISTED_SLICES, PERSIST_STORAGE_KEY, PERSIST_VERSION,
};
pub use platform::use_is_ios;
pub use provider::{
    use_app_dispatch, use_app_state, use_app_store, AppStateProvider, AppStoreContext,
};
pub use reducer::{reduce_app, AppAction, SliceReducer, SLICE_REDUCERS};
pub use store::{Listener, Store, SubscriptionId};
