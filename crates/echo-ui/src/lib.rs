//! egui rendering for the EchoPrompt client.
//!
//! Panels read core state and return an action for the app to dispatch;
//! they never call the backend themselves.

pub mod panels;
pub mod state;
pub mod theme;
