//! Wall-clock timestamps for stamping state records.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_STAMP_MS: Cell<u64> = const { Cell::new(0) };
}

/// Returns the current unix time in milliseconds, bumped minimally so
/// repeated calls on one thread never return the same value.
///
/// Transaction and notification records are ordered by insertion time;
/// strict monotonicity keeps that order stable even when several records
/// land inside the same millisecond or the system clock steps backwards.
pub fn monotonic_unix_ms() -> u64 {
    let now = wall_clock_unix_ms();
    LAST_STAMP_MS.with(|last| {
        let stamped = now.max(last.get().saturating_add(1));
        last.set(stamped);
        stamped
    })
}

fn wall_clock_unix_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
