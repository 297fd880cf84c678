//! Provider and context wiring for the app store.
//!
//! This module owns store bootstrap at the component boundary and the
//! reactive mirror components read from. Store semantics live in
//! [`crate::store`] and [`crate::bootstrap`].

use leptos::*;

use app_host::HostServices;

use crate::bootstrap::initialize_store;
use crate::model::{AppState, StateOverrides};
use crate::reducer::AppAction;
use crate::store::Store;

#[derive(Clone, Copy)]
/// Leptos context for reading app state and dispatching [`AppAction`] values.
pub struct AppStoreContext {
    /// Host service bundle the store was built against.
    pub host: StoredValue<HostServices>,
    /// Reactive mirror of the store state.
    pub state: RwSignal<AppState>,
    /// Store dispatch callback.
    pub dispatch: Callback<AppAction>,
    /// Underlying store handle.
    pub store: StoredValue<Store>,
}

impl AppStoreContext {
    /// Dispatches an action through the context callback.
    pub fn dispatch_action(&self, action: AppAction) {
        self.dispatch.call(action);
    }
}

#[component]
/// Provides [`AppStoreContext`] to descendant components, bootstrapping the
/// store for the probed execution context.
///
/// Bootstrap failures are configuration errors and panic here; there is no
/// meaningful way to render without a store.
pub fn AppStateProvider(
    /// Injected browser or test host bundle assembled by the entry layer.
    host_services: HostServices,
    /// Slice-level overrides applied when the store is constructed.
    #[prop(optional)]
    overrides: Option<StateOverrides>,
    children: Children,
) -> impl IntoView {
    let context = host_services.env.execution_context();
    let store = initialize_store(&host_services, context, overrides)
        .expect("AppStateProvider store bootstrap");

    let state = create_rw_signal(store.state());
    let subscription = store.subscribe(move |snapshot| state.set(snapshot.clone()));
    {
        // The client store outlives any one provider; drop the mirror
        // subscription with the component.
        let store = store.clone();
        on_cleanup(move || store.unsubscribe(subscription));
    }

    let host = store_value(host_services);
    let store_handle = store_value(store);
    let dispatch = Callback::new(move |action: AppAction| {
        if cfg!(debug_assertions) {
            logging::log!("app action: {action:?}");
        }
        store_handle.with_value(|store| store.dispatch(action));
    });

    provide_context(AppStoreContext {
        host,
        state,
        dispatch,
        store: store_handle,
    });

    children().into_view()
}

/// Returns the current [`AppStoreContext`].
///
/// # Panics
///
/// Panics if called outside [`AppStateProvider`].
pub fn use_app_store() -> AppStoreContext {
    use_context::<AppStoreContext>().expect("AppStoreContext not provided")
}

/// Reactive app state signal.
pub fn use_app_state() -> RwSignal<AppState> {
    use_app_store().state
}

/// Store dispatch callback.
pub fn use_app_dispatch() -> Callback<AppAction> {
    use_app_store().dispatch
}

#[cfg(test)]
mod tests {
    use app_host::ExecutionContext;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dispatch_action_forwards_through_the_context_callback() {
        let _ = create_runtime();
        let services = HostServices::memory();
        let store = initialize_store(&services, ExecutionContext::Server, None).expect("store");

        let handle = store_value(store.clone());
        let context = AppStoreContext {
            host: store_value(services),
            state: create_rw_signal(store.state()),
            dispatch: Callback::new(move |action: AppAction| {
                handle.with_value(|store| store.dispatch(action))
            }),
            store: handle,
        };

        context.dispatch_action(AppAction::SetSlippage { bps: 7 });

        assert_eq!(store.state().user.slippage_bps, 7);
    }
}
