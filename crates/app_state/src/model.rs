use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKey {
    Global,
    Farms,
    Pools,
    Lottery,
    Pottery,
    User,
    Transactions,
    Notifications,
}

impl SliceKey {
    pub const ALL: [SliceKey; 8] = [
        SliceKey::Global,
        SliceKey::Farms,
        SliceKey::Pools,
        SliceKey::Lottery,
        SliceKey::Pottery,
        SliceKey::User,
        SliceKey::Transactions,
        SliceKey::Notifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Farms => "farms",
            Self::Pools => "pools",
            Self::Lottery => "lottery",
            Self::Pottery => "pottery",
            Self::User => "user",
            Self::Transactions => "transactions",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GlobalState {
    pub last_schema_version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FarmsState {
    pub synced_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PoolsState {
    pub synced_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LotteryState {
    pub synced_at_ms: Option<u64>,
    pub current_round: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PotteryState {
    pub synced_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    pub slippage_bps: u32,
    pub expert_mode: bool,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            profile: None,
            slippage_bps: 50,
            expert_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOutcome {
    Succeeded,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub summary: Option<String>,
    pub added_at_ms: u64,
    pub outcome: Option<TransactionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransactionsState {
    pub records: BTreeMap<String, TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: String,
    pub title: String,
    pub read: bool,
    pub received_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NotificationsState {
    pub items: Vec<NotificationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppState {
    pub global: GlobalState,
    pub farms: FarmsState,
    pub pools: PoolsState,
    pub lottery: LotteryState,
    pub pottery: PotteryState,
    pub user: UserState,
    pub transactions: TransactionsState,
    pub notifications: NotificationsState,
}

impl AppState {
    pub fn slice_json(&self, slice: SliceKey) -> Result<Value, serde_json::Error> {
        match slice {
            SliceKey::Global => serde_json::to_value(&self.global),
            SliceKey::Farms => serde_json::to_value(&self.farms),
            SliceKey::Pools => serde_json::to_value(&self.pools),
            SliceKey::Lottery => serde_json::to_value(&self.lottery),
            SliceKey::Pottery => serde_json::to_value(&self.pottery),
            SliceKey::User => serde_json::to_value(&self.user),
            SliceKey::Transactions => serde_json::to_value(&self.transactions),
            SliceKey::Notifications => serde_json::to_value(&self.notifications),
        }
    }

    pub fn set_slice_from_json(
        &mut self,
        slice: SliceKey,
        value: Value,
    ) -> Result<(), serde_json::Error> {
        match slice {
            SliceKey::Global => self.global = serde_json::from_value(value)?,
            SliceKey::Farms => self.farms = serde_json::from_value(value)?,
            SliceKey::Pools => self.pools = serde_json::from_value(value)?,
            SliceKey::Lottery => self.lottery = serde_json::from_value(value)?,
            SliceKey::Pottery => self.pottery = serde_json::from_value(value)?,
            SliceKey::User => self.user = serde_json::from_value(value)?,
            SliceKey::Transactions => self.transactions = serde_json::from_value(value)?,
            SliceKey::Notifications => self.notifications = serde_json::from_value(value)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateOverrides {
    #[serde(flatten)]
    slices: BTreeMap<SliceKey, Value>,
}

impl StateOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slice(mut self, slice: SliceKey, value: Value) -> Self {
        self.slices.insert(slice, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (SliceKey, &Value)> {
        self.slices.iter().map(|(slice, value)| (*slice, value))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn slice_keys_serialize_as_lowercase_names() {
        for slice in SliceKey::ALL {
            let encoded = serde_json::to_value(slice).expect("encode slice key");
            assert_eq!(encoded, Value::String(slice.as_str().to_owned()));
        }
    }

    #[test]
    fn slice_json_round_trips_through_set() {
        let mut state = AppState::default();
        state.user.slippage_bps = 120;
        state.lottery.current_round = Some(77);

        let user = state.slice_json(SliceKey::User).expect("encode user");
        let lottery = state.slice_json(SliceKey::Lottery).expect("encode lottery");

        let mut restored = AppState::default();
        restored
            .set_slice_from_json(SliceKey::User, user)
            .expect("decode user");
        restored
            .set_slice_from_json(SliceKey::Lottery, lottery)
            .expect("decode lottery");

        assert_eq!(restored, state);
    }

    #[test]
    fn setting_a_slice_from_bad_json_leaves_it_untouched() {
        let mut state = AppState::default();
        state.user.expert_mode = true;

        let result = state.set_slice_from_json(SliceKey::User, json!({ "slippage_bps": "high" }));

        assert!(result.is_err());
        assert!(state.user.expert_mode);
    }

    #[test]
    fn overrides_keep_one_value_per_slice() {
        let overrides = StateOverrides::new()
            .with_slice(SliceKey::User, json!({ "slippage_bps": 10 }))
            .with_slice(SliceKey::User, json!({ "slippage_bps": 20 }));

        let entries: Vec<_> = overrides.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, SliceKey::User);
        assert_eq!(entries[0].1["slippage_bps"], 20);
    }

    #[test]
    fn overrides_decode_from_slice_keyed_json() {
        let overrides: StateOverrides =
            serde_json::from_value(json!({ "user": { "slippage_bps": 30 } }))
                .expect("decode overrides");
        let entries: Vec<_> = overrides.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, SliceKey::User);
    }
}
