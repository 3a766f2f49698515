//! Configuration baked in at compile time.
//!
//! The browser has no process environment, so the `ECHOPROMPT_*` variables
//! are read by `option_env!` when the crate is built.

use echo_types::config::{ENV_API_URL, ENV_API_VERSION, ENV_FRONTEND_HOST, ENV_FRONTEND_PORT};

/// Lookup for `AppConfig::from_lookup`.
pub fn build_time(key: &str) -> Option<String> {
    let value = match key {
        ENV_API_URL => option_env!("ECHOPROMPT_API_URL"),
        ENV_API_VERSION => option_env!("ECHOPROMPT_API_VERSION"),
        ENV_FRONTEND_HOST => option_env!("ECHOPROMPT_FRONTEND_HOST"),
        ENV_FRONTEND_PORT => option_env!("ECHOPROMPT_FRONTEND_PORT"),
        _ => None,
    };
    value.map(String::from)
}
