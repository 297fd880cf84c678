//! Typed host-domain contracts shared by the browser adapters and the state runtime.
//!
//! This crate is the API-first boundary for platform services. It exposes the
//! storage and environment-probe traits plus their memory/noop doubles and the
//! iOS detection policy, while concrete browser adapters live in
//! `app_host_web` and the store itself in `app_state`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod env;
pub mod services;
pub mod storage;
pub mod time;

pub use env::{
    detect_ios, EnvProbe, ExecutionContext, FixedEnvProbe, NoopEnvProbe, IOS_PLATFORM_NAMES,
};
pub use services::HostServices;
pub use storage::{
    load_typed_with, save_typed_with, MemoryStateStorage, NoopStateStorage, StateStorage,
};
pub use time::monotonic_unix_ms;
