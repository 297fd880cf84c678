//! Actions, per-slice reducers, and the root dispatch-table fold.

use app_host::monotonic_unix_ms;

use crate::model::{
    AppState, NotificationItem, SliceKey, TransactionOutcome, TransactionRecord, UserProfile,
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_app`] to mutate [`AppState`].
pub enum AppAction {
    /// Record the persistence schema version the app booted with.
    UpdateVersion {
        /// Current persistence schema version.
        version: u32,
    },
    /// Mark a data slice as freshly synced from its upstream source.
    MarkSliceSynced {
        /// Slice that finished syncing.
        slice: SliceKey,
        /// Sync completion time, unix milliseconds.
        at_ms: u64,
    },
    /// Set the lottery round currently on display.
    SetLotteryRound {
        /// Round number.
        round: u64,
    },
    /// Set the user's slippage tolerance.
    SetSlippage {
        /// Tolerance in basis points.
        bps: u32,
    },
    /// Toggle expert mode (skips confirmation prompts).
    SetExpertMode {
        /// Whether expert mode is on.
        enabled: bool,
    },
    /// Replace or clear the user's profile.
    SetProfile {
        /// New profile, `None` to clear.
        profile: Option<UserProfile>,
    },
    /// Track a submitted transaction.
    AddTransaction {
        /// Transaction hash, the record key.
        hash: String,
        /// Human-readable summary for activity lists.
        summary: Option<String>,
        /// Submission time, unix milliseconds.
        added_at_ms: u64,
    },
    /// Record the final outcome of a tracked transaction.
    FinalizeTransaction {
        /// Hash of the tracked transaction.
        hash: String,
        /// How the transaction settled.
        outcome: TransactionOutcome,
    },
    /// Drop all tracked transactions.
    ClearTransactions,
    /// Deliver a notification; an already-delivered id is ignored.
    PushNotification {
        /// Notification to deliver.
        item: NotificationItem,
    },
    /// Mark every delivered notification as read.
    MarkAllNotificationsRead,
    /// Remove a delivered notification.
    DismissNotification {
        /// Id of the notification to remove.
        id: String,
    },
}

impl AppAction {
    /// [`AppAction::AddTransaction`] stamped with the current time.
    pub fn add_transaction(hash: impl Into<String>, summary: Option<String>) -> Self {
        Self::AddTransaction {
            hash: hash.into(),
            summary,
            added_at_ms: monotonic_unix_ms(),
        }
    }

    /// [`AppAction::PushNotification`] for an unread item stamped with the
    /// current time.
    pub fn notification(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::PushNotification {
            item: NotificationItem {
                id: id.into(),
                title: title.into(),
                read: false,
                received_at_ms: monotonic_unix_ms(),
            },
        }
    }
}

/// Pure per-slice transition function. Returns whether its slice changed.
///
/// Each reducer owns exactly one slice and must not touch the others.
pub type SliceReducer = fn(&mut AppState, &AppAction) -> bool;

/// Root dispatch table: one reducer per slice, every slice present exactly
/// once. Dispatch walks the whole table, so an action can touch several
/// slices and an action nothing recognizes is a no-op.
pub const SLICE_REDUCERS: [(SliceKey, SliceReducer); 8] = [
    (SliceKey::Global, reduce_global),
    (SliceKey::Farms, reduce_farms),
    (SliceKey::Pools, reduce_pools),
    (SliceKey::Lottery, reduce_lottery),
    (SliceKey::Pottery, reduce_pottery),
    (SliceKey::User, reduce_user),
    (SliceKey::Transactions, reduce_transactions),
    (SliceKey::Notifications, reduce_notifications),
];

/// Applies an action to every slice via [`SLICE_REDUCERS`] and reports
/// whether any slice changed.
///
/// A result of `false` guarantees `state` is value-equal to what it was
/// before the call; callers rely on that to skip persistence and listener
/// notification.
pub fn reduce_app(state: &mut AppState, action: &AppAction) -> bool {
    let mut changed = false;
    for (_, reducer) in SLICE_REDUCERS {
        changed |= reducer(state, action);
    }
    changed
}

fn reduce_global(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::UpdateVersion { version } => {
            replace_if_changed(&mut state.global.last_schema_version, Some(*version))
        }
        _ => false,
    }
}

fn reduce_farms(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::MarkSliceSynced {
            slice: SliceKey::Farms,
            at_ms,
        } => replace_if_changed(&mut state.farms.synced_at_ms, Some(*at_ms)),
        _ => false,
    }
}

fn reduce_pools(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::MarkSliceSynced {
            slice: SliceKey::Pools,
            at_ms,
        } => replace_if_changed(&mut state.pools.synced_at_ms, Some(*at_ms)),
        _ => false,
    }
}

fn reduce_lottery(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::MarkSliceSynced {
            slice: SliceKey::Lottery,
            at_ms,
        } => replace_if_changed(&mut state.lottery.synced_at_ms, Some(*at_ms)),
        AppAction::SetLotteryRound { round } => {
            replace_if_changed(&mut state.lottery.current_round, Some(*round))
        }
        _ => false,
    }
}

fn reduce_pottery(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::MarkSliceSynced {
            slice: SliceKey::Pottery,
            at_ms,
        } => replace_if_changed(&mut state.pottery.synced_at_ms, Some(*at_ms)),
        _ => false,
    }
}

fn reduce_user(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::SetSlippage { bps } => replace_if_changed(&mut state.user.slippage_bps, *bps),
        AppAction::SetExpertMode { enabled } => {
            replace_if_changed(&mut state.user.expert_mode, *enabled)
        }
        AppAction::SetProfile { profile } => {
            replace_if_changed(&mut state.user.profile, profile.clone())
        }
        _ => false,
    }
}

fn reduce_transactions(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::AddTransaction {
            hash,
            summary,
            added_at_ms,
        } => {
            let next = TransactionRecord {
                summary: summary.clone(),
                added_at_ms: *added_at_ms,
                outcome: None,
            };
            match state.transactions.records.get(hash) {
                Some(existing) if *existing == next => false,
                _ => {
                    state.transactions.records.insert(hash.clone(), next);
                    true
                }
            }
        }
        AppAction::FinalizeTransaction { hash, outcome } => {
            match state.transactions.records.get_mut(hash) {
                Some(record) => replace_if_changed(&mut record.outcome, Some(*outcome)),
                None => false,
            }
        }
        AppAction::ClearTransactions => {
            if state.transactions.records.is_empty() {
                false
            } else {
                state.transactions.records.clear();
                true
            }
        }
        _ => false,
    }
}

fn reduce_notifications(state: &mut AppState, action: &AppAction) -> bool {
    match action {
        AppAction::PushNotification { item } => {
            if state.notifications.items.iter().any(|n| n.id == item.id) {
                return false;
            }
            state.notifications.items.push(item.clone());
            true
        }
        AppAction::MarkAllNotificationsRead => {
            let mut changed = false;
            for item in &mut state.notifications.items {
                if !item.read {
                    item.read = true;
                    changed = true;
                }
            }
            changed
        }
        AppAction::DismissNotification { id } => {
            let before = state.notifications.items.len();
            state.notifications.items.retain(|n| n.id != *id);
            state.notifications.items.len() != before
        }
        _ => false,
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, next: T) -> bool {
    if *slot == next {
        false
    } else {
        *slot = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dispatch_table_registers_every_slice_once() {
        let keys: Vec<SliceKey> = SLICE_REDUCERS.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, SliceKey::ALL.to_vec());
    }

    #[test]
    fn update_version_lands_in_the_global_slice() {
        let mut state = AppState::default();

        assert!(reduce_app(&mut state, &AppAction::UpdateVersion { version: 2 }));
        assert_eq!(state.global.last_schema_version, Some(2));

        let before = state.clone();
        assert!(!reduce_app(&mut state, &AppAction::UpdateVersion { version: 2 }));
        assert_eq!(state, before);
    }

    #[test]
    fn sync_marks_only_the_named_slice() {
        let mut state = AppState::default();

        assert!(reduce_app(
            &mut state,
            &AppAction::MarkSliceSynced {
                slice: SliceKey::Farms,
                at_ms: 1_000,
            },
        ));

        assert_eq!(state.farms.synced_at_ms, Some(1_000));
        assert_eq!(state.pools.synced_at_ms, None);
        assert_eq!(state.lottery.synced_at_ms, None);
        assert_eq!(state.pottery.synced_at_ms, None);
    }

    #[test]
    fn sync_mark_for_a_slice_without_sync_metadata_is_a_no_op() {
        let mut state = AppState::default();
        let before = state.clone();

        let changed = reduce_app(
            &mut state,
            &AppAction::MarkSliceSynced {
                slice: SliceKey::Global,
                at_ms: 1_000,
            },
        );

        assert!(!changed);
        assert_eq!(state, before);
    }

    #[test]
    fn user_preferences_report_unchanged_when_recomputed() {
        let mut state = AppState::default();

        assert!(reduce_app(&mut state, &AppAction::SetSlippage { bps: 80 }));
        assert!(!reduce_app(&mut state, &AppAction::SetSlippage { bps: 80 }));
        assert_eq!(state.user.slippage_bps, 80);

        assert!(reduce_app(&mut state, &AppAction::SetExpertMode { enabled: true }));
        assert!(!reduce_app(&mut state, &AppAction::SetExpertMode { enabled: true }));
    }

    #[test]
    fn profile_sets_and_clears() {
        let mut state = AppState::default();
        let profile = UserProfile {
            username: "bunny".to_owned(),
            avatar_url: None,
        };

        assert!(reduce_app(
            &mut state,
            &AppAction::SetProfile {
                profile: Some(profile.clone()),
            },
        ));
        assert_eq!(state.user.profile, Some(profile));

        assert!(reduce_app(&mut state, &AppAction::SetProfile { profile: None }));
        assert_eq!(state.user.profile, None);
        assert!(!reduce_app(&mut state, &AppAction::SetProfile { profile: None }));
    }

    #[test]
    fn transactions_track_add_finalize_clear() {
        let mut state = AppState::default();

        assert!(reduce_app(
            &mut state,
            &AppAction::add_transaction("0xabc", Some("Swap".to_owned())),
        ));
        assert!(reduce_app(&mut state, &AppAction::add_transaction("0xdef", None)));
        assert_eq!(state.transactions.records.len(), 2);

        let first = state.transactions.records["0xabc"].added_at_ms;
        let second = state.transactions.records["0xdef"].added_at_ms;
        assert!(first < second);

        assert!(reduce_app(
            &mut state,
            &AppAction::FinalizeTransaction {
                hash: "0xabc".to_owned(),
                outcome: TransactionOutcome::Succeeded,
            },
        ));
        assert_eq!(
            state.transactions.records["0xabc"].outcome,
            Some(TransactionOutcome::Succeeded)
        );

        // Finalizing an untracked hash changes nothing.
        assert!(!reduce_app(
            &mut state,
            &AppAction::FinalizeTransaction {
                hash: "0xmissing".to_owned(),
                outcome: TransactionOutcome::Reverted,
            },
        ));

        assert!(reduce_app(&mut state, &AppAction::ClearTransactions));
        assert!(state.transactions.records.is_empty());
        assert!(!reduce_app(&mut state, &AppAction::ClearTransactions));
    }

    #[test]
    fn notifications_dedupe_by_id() {
        let mut state = AppState::default();

        assert!(reduce_app(&mut state, &AppAction::notification("n1", "Harvest ready")));
        assert!(!reduce_app(&mut state, &AppAction::notification("n1", "Harvest ready")));
        assert!(reduce_app(&mut state, &AppAction::notification("n2", "Round closing")));
        assert_eq!(state.notifications.items.len(), 2);

        assert!(reduce_app(&mut state, &AppAction::MarkAllNotificationsRead));
        assert!(state.notifications.items.iter().all(|n| n.read));
        assert!(!reduce_app(&mut state, &AppAction::MarkAllNotificationsRead));

        assert!(reduce_app(
            &mut state,
            &AppAction::DismissNotification { id: "n1".to_owned() },
        ));
        assert_eq!(state.notifications.items.len(), 1);
        assert!(!reduce_app(
            &mut state,
            &AppAction::DismissNotification { id: "n1".to_owned() },
        ));
    }
}
