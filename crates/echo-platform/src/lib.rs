//! Browser adapters for the echo-core ports.

pub mod api;
pub mod dom;
pub mod timer;

pub use api::HttpApiClient;
pub use timer::{BrowserTimer, PollTimer};
