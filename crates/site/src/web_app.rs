use app_state::{
    use_app_dispatch, use_app_state, use_app_store, use_is_ios, AppAction, AppStateProvider,
};
use leptos::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    view! {
        <AppStateProvider host_services=app_host_web::build_host_services()>
            <StatusPanel />
        </AppStateProvider>
    }
}

#[component]
fn StatusPanel() -> impl IntoView {
    let store = use_app_store();
    let state = use_app_state();
    let dispatch = use_app_dispatch();
    let is_ios = use_is_ios();

    let slippage_bps = move || state.with(|s| s.user.slippage_bps);
    let tracked = move || state.with(|s| s.transactions.records.len());
    let unread = move || state.with(|s| s.notifications.items.iter().filter(|n| !n.read).count());

    view! {
        <section class="status-panel">
            <h1>"Account"</h1>
            <p>{move || format!("Slippage tolerance: {} bps", slippage_bps())}</p>
            <p>{move || format!("Tracked transactions: {}", tracked())}</p>
            <p>{move || format!("Unread notifications: {}", unread())}</p>
            <Show when=move || is_ios.get()>
                <p class="platform-hint">
                    "iOS detected: some wallet browsers restrict downloads here."
                </p>
            </Show>
            <button on:click=move |_| dispatch.call(AppAction::MarkAllNotificationsRead)>
                "Mark all read"
            </button>
            <button on:click=move |_| store.dispatch_action(AppAction::ClearTransactions)>
                "Clear activity"
            </button>
        </section>
    }
}
