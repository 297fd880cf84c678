//! Store construction policy: fresh instances per server pass, one adopted
//! singleton per client.

use std::cell::RefCell;

use app_host::{ExecutionContext, HostServices};
use thiserror::Error;

use crate::model::{AppState, SliceKey, StateOverrides};
use crate::persistence::{self, PersistConfig, PersistError, PERSIST_VERSION};
use crate::reducer::AppAction;
use crate::store::Store;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Fatal store-construction errors.
pub enum StoreInitError {
    /// Rehydration hit a failing migration step.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// An override value does not decode into its slice.
    #[error("override for slice {slice} does not decode: {message}")]
    InvalidOverride {
        /// Slice the override targeted.
        slice: SliceKey,
        /// Decode failure.
        message: String,
    },
}

thread_local! {
    static CLIENT_STORE: RefCell<Option<Store>> = RefCell::new(None);
}

/// Construct or fetch the app store for the given execution context.
///
/// Server passes always get a brand-new store that never touches storage or
/// the client singleton, so state cannot leak across requests. On the client
/// the first call constructs, rehydrates, and adopts a singleton; later calls
/// return it. A later call carrying `overrides` replaces the singleton with a
/// new store seeded from the previous one's live state (overrides win per
/// slice); the replacement skips re-rehydration because that state already
/// reflects storage.
///
/// Every constructed store records the persistence schema version by
/// dispatching [`AppAction::UpdateVersion`].
///
/// # Errors
///
/// Fails when an override does not decode or a migration step fails; both are
/// configuration errors, and neither adopts a store.
pub fn initialize_store(
    services: &HostServices,
    context: ExecutionContext,
    overrides: Option<StateOverrides>,
) -> Result<Store, StoreInitError> {
    if !context.is_client() {
        return construct(services, AppState::default(), overrides.as_ref(), Hydration::Skip);
    }

    let adopted = client_store();
    match (adopted, overrides) {
        (Some(store), None) => Ok(store),
        (Some(store), Some(overrides)) => {
            // The prior store's live state already reflects storage, so the
            // replacement counts as rehydrated without re-reading.
            let replacement =
                construct(services, store.state(), Some(&overrides), Hydration::Adopt)?;
            adopt(replacement.clone());
            Ok(replacement)
        }
        (None, overrides) => {
            let store = construct(
                services,
                AppState::default(),
                overrides.as_ref(),
                Hydration::FromStorage,
            )?;
            adopt(store.clone());
            Ok(store)
        }
    }
}

/// The adopted client store, when one exists.
pub fn client_store() -> Option<Store> {
    CLIENT_STORE.with(|cell| cell.borrow().clone())
}

fn adopt(store: Store) {
    CLIENT_STORE.with(|cell| *cell.borrow_mut() = Some(store));
}

/// How a constructed store relates to the persisted payload.
enum Hydration {
    /// Read and merge the payload, then open the persistence gate.
    FromStorage,
    /// Skip reading but open the gate: the seed state already reflects storage.
    Adopt,
    /// Skip reading and keep the gate shut (server stores).
    Skip,
}

fn construct(
    services: &HostServices,
    seed: AppState,
    overrides: Option<&StateOverrides>,
    hydration: Hydration,
) -> Result<Store, StoreInitError> {
    let mut state = seed;
    if let Some(overrides) = overrides {
        for (slice, value) in overrides.entries() {
            state
                .set_slice_from_json(slice, value.clone())
                .map_err(|err| StoreInitError::InvalidOverride {
                    slice,
                    message: err.to_string(),
                })?;
        }
    }

    let config = PersistConfig::primary();
    if matches!(hydration, Hydration::FromStorage) {
        persistence::rehydrate_into(&mut state, services.storage.as_ref(), &config)?;
    }

    let store = Store::new(state, services.storage.clone(), config);
    if !matches!(hydration, Hydration::Skip) {
        store.persist_controller().mark_rehydrated();
    }
    store.dispatch(AppAction::UpdateVersion {
        version: PERSIST_VERSION,
    });
    Ok(store)
}
