//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators (chat transport, guild platform, role store).
//! Allows for pluggable implementations in the Infrastructure layer.

use crate::domain::types::{Category, Embed, Role, TextChannel};
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Send a notification (not tracked/editable)
    async fn send_notification(&self, content: &str) -> Result<(), String>;

    /// Send a structured embed
    async fn send_embed(&self, embed: &Embed) -> Result<String, String> {
        self.send_message(&embed.to_markdown()).await
    }

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Guild platform operations used by class provisioning.
/// Lookups return `None` when nothing matches the exact name.
#[async_trait]
pub trait GuildProvider: Send + Sync {
    async fn find_category(&self, guild_id: &str, name: &str) -> Result<Option<Category>>;

    async fn create_category(&self, guild_id: &str, name: &str) -> Result<Category>;

    async fn create_text_channel(
        &self,
        guild_id: &str,
        category_id: &str,
        name: &str,
        topic: &str,
    ) -> Result<TextChannel>;

    async fn find_role(&self, guild_id: &str, name: &str) -> Result<Option<Role>>;

    async fn create_role(&self, guild_id: &str, name: &str, mentionable: bool) -> Result<Role>;

    /// Allow (`true`) or deny (`false`) viewing `channel_id` for members of `role_id`.
    async fn set_channel_visibility(
        &self,
        channel_id: &str,
        role_id: &str,
        visible: bool,
    ) -> Result<()>;

    /// Apply `(role_id, position)` pairs in one request.
    async fn set_role_positions(&self, guild_id: &str, positions: &[(String, i64)]) -> Result<()>;

    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<()>;
}

/// External store of roles members may assign to themselves.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn set_assignable(&self, guild_id: &str, role_id: &str, assignable: bool) -> Result<()>;
}
