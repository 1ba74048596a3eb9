//! Process-wide engine initialization
//!
//! Initialization runs once per process before any document is opened or
//! built. When the configuration names a license variable, activation fails
//! fast if that variable is missing or empty. There is no teardown.

use once_cell::sync::OnceCell;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// State established by the first successful initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    /// Whether a license key was supplied and accepted
    pub licensed: bool,
}

static ENGINE: OnceCell<EngineState> = OnceCell::new();

/// Initialize the engine once; later calls return the first state
pub fn initialize(config: &EngineConfig) -> Result<&'static EngineState> {
    ENGINE.get_or_try_init(|| activate(config, |name| std::env::var(name).ok()))
}

pub fn is_initialized() -> bool {
    ENGINE.get().is_some()
}

fn activate(
    config: &EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EngineState> {
    let Some(variable) = config.license_env.as_deref() else {
        log::debug!("Engine initialized without a license key");
        return Ok(EngineState { licensed: false });
    };

    match lookup(variable) {
        Some(key) if !key.trim().is_empty() => {
            log::debug!("Engine license read from {variable}");
            Ok(EngineState { licensed: true })
        }
        _ => Err(Error::Activation(format!(
            "license key variable {variable} is not set"
        ))),
    }
}
