//! Browser-environment probes and the iOS device-detection policy.
//!
//! Detection never touches `window` directly. It reads a handful of signals
//! through [`EnvProbe`] so the policy stays testable off-browser and so native
//! embeddings can supply their own answers.

/// Where the current code is executing.
///
/// Store bootstrap branches on this: server passes get a fresh store per call,
/// client passes share a singleton. See `app_state::bootstrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Browser (or browser-like) environment with a live document.
    Client,
    /// Server-side rendering or any context without a document.
    Server,
}

impl ExecutionContext {
    /// True for [`ExecutionContext::Client`].
    pub const fn is_client(self) -> bool {
        matches!(self, ExecutionContext::Client)
    }
}

/// Host probe for the browser-environment signals the runtime consumes.
///
/// Every signal is optional: a probe running outside a browser answers `None`
/// or `false` and the consuming policies degrade to their conservative result.
pub trait EnvProbe {
    /// Raw user-agent string, if the environment exposes one.
    fn user_agent(&self) -> Option<String>;

    /// Raw platform string (`navigator.platform` in browsers), if exposed.
    fn platform(&self) -> Option<String>;

    /// Whether the document advertises touch support via an `ontouchend`
    /// handler slot.
    fn has_touch_end(&self) -> bool;

    /// Execution context of the calling code.
    fn execution_context(&self) -> ExecutionContext;
}

/// Probe that reports no signals at all.
///
/// Used where detection must stay inert: server rendering, headless tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnvProbe;

impl EnvProbe for NoopEnvProbe {
    fn user_agent(&self) -> Option<String> {
        None
    }

    fn platform(&self) -> Option<String> {
        None
    }

    fn has_touch_end(&self) -> bool {
        false
    }

    fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::Server
    }
}

/// Probe returning fixed answers, for tests and scripted embeddings.
#[derive(Debug, Clone)]
pub struct FixedEnvProbe {
    /// Value returned from [`EnvProbe::user_agent`].
    pub user_agent: Option<String>,
    /// Value returned from [`EnvProbe::platform`].
    pub platform: Option<String>,
    /// Value returned from [`EnvProbe::has_touch_end`].
    pub touch_end: bool,
    /// Value returned from [`EnvProbe::execution_context`].
    pub context: ExecutionContext,
}

impl Default for FixedEnvProbe {
    fn default() -> Self {
        Self {
            user_agent: None,
            platform: None,
            touch_end: false,
            context: ExecutionContext::Client,
        }
    }
}

impl EnvProbe for FixedEnvProbe {
    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn platform(&self) -> Option<String> {
        self.platform.clone()
    }

    fn has_touch_end(&self) -> bool {
        self.touch_end
    }

    fn execution_context(&self) -> ExecutionContext {
        self.context
    }
}

/// Platform strings that identify an iOS device outright.
pub const IOS_PLATFORM_NAMES: [&str; 6] = [
    "iPad Simulator",
    "iPhone Simulator",
    "iPod Simulator",
    "iPad",
    "iPhone",
    "iPod",
];

/// Decide whether the probed environment is an iOS device.
///
/// Three rules, any one of which suffices:
///
/// 1. the platform string is one of [`IOS_PLATFORM_NAMES`] exactly;
/// 2. the platform string contains `Mac` and the document has an `ontouchend`
///    slot (iPadOS masquerading as macOS);
/// 3. the user agent matches Safari without Chrome or Android markers.
///
/// Rule 3 accepts desktop macOS Safari as iOS. That false positive is kept on
/// purpose: callers use the answer to pick Safari-family workarounds, which
/// desktop Safari needs too.
///
/// Missing signals never match, so a bare probe always yields `false`.
pub fn detect_ios<P: EnvProbe + ?Sized>(probe: &P) -> bool {
    let platform = probe.platform();

    if let Some(platform) = platform.as_deref() {
        if IOS_PLATFORM_NAMES.contains(&platform) {
            return true;
        }
        if platform.contains("Mac") && probe.has_touch_end() {
            return true;
        }
    }

    match probe.user_agent().as_deref() {
        Some(ua) => is_safari_without_chrome_or_android(ua),
        None => false,
    }
}

/// Case-insensitive check for a `safari` token not preceded by `chrome` or
/// `android` anywhere earlier in the user agent.
///
/// Chrome on iOS ships `CriOS` instead of `Chrome`, so it still matches here;
/// desktop Chrome and Android browsers carry their marker before `Safari` and
/// are rejected.
fn is_safari_without_chrome_or_android(user_agent: &str) -> bool {
    let lowered = user_agent.to_ascii_lowercase();
    match lowered.find("safari") {
        Some(at) => {
            let prefix = &lowered[..at];
            !prefix.contains("chrome") && !prefix.contains("android")
        }
        None => false,
    }
}
