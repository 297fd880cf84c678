//! Browser (`wasm32`) implementations of [`app_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer: `localStorage`
//! for state persistence and `navigator`/`document` for environment probing.
//! Off-wasm both adapters compile to inert fallbacks so native test targets
//! can still link the wiring code.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod env;
pub mod storage;

use std::rc::Rc;

use app_host::HostServices;

pub use env::WebEnvProbe;
pub use storage::WebStateStorage;

/// Bundle the browser adapters into a [`HostServices`] for the state runtime.
pub fn build_host_services() -> HostServices {
    HostServices::new(Rc::new(WebStateStorage), Rc::new(WebEnvProbe))
}
