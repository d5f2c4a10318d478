//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., .class, .help).
//! These handlers are invoked by the Router.

pub mod class;
pub mod help;
pub mod wizard;
