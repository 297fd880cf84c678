//! Browser environment probe over `navigator` and `document`.

use app_host::{EnvProbe, ExecutionContext};

/// Probe reading the live browser environment.
///
/// Off-wasm every method answers like [`app_host::NoopEnvProbe`], so the
/// adapter can sit in code paths that also compile for native test targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebEnvProbe;

impl EnvProbe for WebEnvProbe {
    fn user_agent(&self) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let navigator = web_sys::window()?.navigator();
            navigator.user_agent().ok().filter(|ua| !ua.is_empty())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    fn platform(&self) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let navigator = web_sys::window()?.navigator();
            navigator.platform().ok().filter(|p| !p.is_empty())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    fn has_touch_end(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsValue;
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return false;
            };
            // `'ontouchend' in document`: presence of the handler slot, not a
            // registered handler.
            js_sys::Reflect::has(document.as_ref(), &JsValue::from_str("ontouchend"))
                .unwrap_or(false)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    fn execution_context(&self) -> ExecutionContext {
        #[cfg(target_arch = "wasm32")]
        {
            if web_sys::window().is_some() {
                return ExecutionContext::Client;
            }
            ExecutionContext::Server
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            ExecutionContext::Server
        }
    }
}
