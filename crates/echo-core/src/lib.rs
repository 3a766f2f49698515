//! EchoPrompt client core.
//!
//! Everything here is platform-free: HTTP and timers are reached through
//! the traits in [`ports`], and state lives behind `Rc<RefCell<_>>` so the
//! single-threaded browser event loop can both render and mutate it.

pub mod ports;
pub mod event_bus;
pub mod session_store;
pub mod orchestrator;
pub mod transcript;
pub mod composer;
pub mod search;
