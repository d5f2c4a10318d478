//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes command routing, wizard sessions, permissions, and class provisioning.

pub mod permissions;
pub mod provisioning;
pub mod retry;
pub mod router;
pub mod sessions;
