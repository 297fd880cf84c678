//! Device detection surfaced to components.

use app_host::detect_ios;
use leptos::*;

use crate::provider::use_app_store;

/// One-shot iOS flag: `false` on the first render, flipped to `true` by an
/// effect after mount when the injected environment probe detects an iOS
/// device. Never transitions back.
///
/// # Panics
///
/// Panics if called outside [`crate::provider::AppStateProvider`].
pub fn use_is_ios() -> ReadSignal<bool> {
    let store = use_app_store();
    let (is_ios, set_is_ios) = create_signal(false);
    create_effect(move |_| {
        let services = store.host.get_value();
        if detect_ios(services.env.as_ref()) {
            set_is_ios.set(true);
        }
    });
    is_ios
}
