//! Single-threaded store handle: dispatch, subscriptions, persistence hookup.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use app_host::StateStorage;

use crate::model::AppState;
use crate::persistence::{PersistConfig, PersistController};
use crate::reducer::{reduce_app, AppAction};

/// Change listener invoked with a snapshot of the post-dispatch state.
pub type Listener = Rc<dyn Fn(&AppState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Handle returned by [`Store::subscribe`], used to unsubscribe.
pub struct SubscriptionId(u64);

#[derive(Clone)]
/// Cheap-clone handle to the app store. Clones share state, listeners, and
/// the persistence gate.
///
/// Single-threaded by design: the store lives on the UI event loop and is
/// driven by `Rc`/`RefCell`, not locks.
pub struct Store {
    inner: Rc<StoreInner>,
}

struct StoreInner {
    state: Rc<RefCell<AppState>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
    persist: PersistController,
}

impl Store {
    pub(crate) fn new(
        state: AppState,
        storage: Rc<dyn StateStorage>,
        config: PersistConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(state));
        let persist = PersistController::new(storage, config, state.clone());
        Self {
            inner: Rc::new(StoreInner {
                state,
                listeners: RefCell::new(Vec::new()),
                next_subscription: Cell::new(1),
                persist,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Run the root reducer over `action`. When any slice changed, persist
    /// (through the gate) and notify subscribers with a snapshot; when
    /// nothing changed, do neither.
    pub fn dispatch(&self, action: AppAction) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            reduce_app(&mut state, &action)
        };
        if !changed {
            return;
        }

        self.inner.persist.persist_if_active();

        // Snapshot the listener list so a listener may subscribe, unsubscribe,
        // or dispatch again without holding any borrow.
        let snapshot = self.state();
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Register a change listener. Listeners fire after every state-changing
    /// dispatch, in subscription order.
    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    /// Controller over this store's persistence gate.
    pub fn persist_controller(&self) -> PersistController {
        self.inner.persist.clone()
    }

    /// Whether two handles point at the same store instance.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Listeners are opaque closures; show how many are registered.
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use app_host::MemoryStateStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::SliceKey;
    use crate::persistence::PERSIST_STORAGE_KEY;

    fn store_with(storage: &MemoryStateStorage) -> Store {
        let store = Store::new(
            AppState::default(),
            Rc::new(storage.clone()),
            PersistConfig::primary(),
        );
        store.persist_controller().mark_rehydrated();
        store
    }

    #[test]
    fn changing_dispatch_notifies_with_the_new_snapshot() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        store.subscribe(move |state| sink.borrow_mut().push(state.user.slippage_bps));

        store.dispatch(AppAction::SetSlippage { bps: 80 });
        store.dispatch(AppAction::SetSlippage { bps: 90 });

        assert_eq!(*seen.borrow(), vec![80, 90]);
    }

    #[test]
    fn unchanged_dispatch_neither_notifies_nor_writes() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        store.subscribe(move |_| counter.set(counter.get() + 1));

        store.dispatch(AppAction::MarkSliceSynced {
            slice: SliceKey::Global,
            at_ms: 1,
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(storage.load_entry(PERSIST_STORAGE_KEY), Ok(None));
        assert_eq!(store.state(), AppState::default());
    }

    #[test]
    fn changing_dispatch_persists_through_the_gate() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);

        store.dispatch(AppAction::SetExpertMode { enabled: true });

        let raw = storage
            .load_entry(PERSIST_STORAGE_KEY)
            .unwrap()
            .expect("payload written");
        assert!(raw.contains("\"expert_mode\":true"));
    }

    #[test]
    fn unsubscribed_listeners_stop_firing() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        let id = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.dispatch(AppAction::SetSlippage { bps: 1 });
        store.unsubscribe(id);
        store.dispatch(AppAction::SetSlippage { bps: 2 });

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listeners_may_subscribe_and_dispatch_reentrantly() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        let inner_calls = Rc::new(Cell::new(0));

        let reentrant = store.clone();
        let counter = inner_calls.clone();
        store.subscribe(move |state| {
            if state.user.slippage_bps == 5 {
                let inner_counter = counter.clone();
                reentrant.subscribe(move |_| inner_counter.set(inner_counter.get() + 1));
                reentrant.dispatch(AppAction::SetSlippage { bps: 6 });
            }
        });

        store.dispatch(AppAction::SetSlippage { bps: 5 });

        assert_eq!(store.state().user.slippage_bps, 6);
        assert_eq!(inner_calls.get(), 1);
    }

    #[test]
    fn clones_share_the_instance() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        let alias = store.clone();
        let other = store_with(&storage);

        assert!(store.ptr_eq(&alias));
        assert!(!store.ptr_eq(&other));

        alias.dispatch(AppAction::SetSlippage { bps: 33 });
        assert_eq!(store.state().user.slippage_bps, 33);
    }

    // Store must stay Debug: construction results are matched with
    // `expect_err` in bootstrap tests, which formats the success value.
    #[test]
    fn debug_formatting_reports_state_and_listener_count() {
        let storage = MemoryStateStorage::default();
        let store = store_with(&storage);
        store.subscribe(|_| {});

        let rendered = format!("{store:?}");
        assert!(rendered.starts_with("Store {"));
        assert!(rendered.contains("listeners: 1"));
    }
}
