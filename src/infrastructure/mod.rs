//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, GuildProvider, RoleStore).

pub mod discord;
pub mod http;
pub mod matrix;
pub mod role_store;
