//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for service credentials, bridge setups, permissions and class wizard settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub bridges: HashMap<String, Vec<BridgeEntry>>,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub classes: ClassesConfig,
}

impl AppConfig {
    /// Reads and parses the YAML configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context(crate::strings::messages::CONFIG_PARSE_ERROR)
    }

    /// Returns the guild linked to a Matrix room through the `bridges` table.
    pub fn guild_for_room(&self, room_id: &str) -> Option<&str> {
        self.bridges
            .values()
            .flatten()
            .filter(|b| b.service.as_deref().is_none_or(|s| s == "matrix"))
            .find(|b| b.channel.as_deref() == Some(room_id))
            .and_then(|b| b.guild.as_deref())
    }
}

/// Connects a chat room to the guild where classes get provisioned.
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeEntry {
    pub service: Option<String>,
    pub channel: Option<String>,
    pub guild: Option<String>,
}

/// Configuration for the connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub guild_api: GuildApiConfig,
    pub role_store: RoleStoreConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// REST endpoint of the guild platform (Discord API v10 by default).
#[derive(Debug, Deserialize, Clone)]
pub struct GuildApiConfig {
    #[serde(default = "default_guild_api_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>, // e.g. "DISCORD_BOT_TOKEN"
}

impl Default for GuildApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_guild_api_url(),
            token: None,
            token_env: None,
        }
    }
}

impl GuildApiConfig {
    pub fn resolve_token(&self) -> Result<String> {
        resolve_secret(self.token.as_deref(), self.token_env.as_deref())
            .context("No guild API token configured (services.guild_api.token or token_env)")
    }
}

fn default_guild_api_url() -> String {
    "https://discord.com/api/v10".to_string()
}

/// HTTP store that records which roles members may assign to themselves.
#[derive(Debug, Deserialize, Clone)]
pub struct RoleStoreConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl RoleStoreConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), self.api_key_env.as_deref())
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn resolve_secret(inline: Option<&str>, env: Option<&str>) -> Option<String> {
    inline
        .map(str::to_string)
        .or_else(|| env.and_then(|name| std::env::var(name).ok()))
        .filter(|s| !s.is_empty())
}

/// Who may run gated commands.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub admins: Vec<String>,
    /// Claim name -> users holding it.
    #[serde(default)]
    pub claims: HashMap<String, Vec<String>>,
}

/// Settings for the class creation wizard and provisioning.
#[derive(Debug, Deserialize, Clone)]
pub struct ClassesConfig {
    #[serde(default = "default_wizard_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cleanup_role")]
    pub cleanup_role: String,
    #[serde(default)]
    pub assignable_retry: RetryConfig,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_wizard_timeout(),
            cleanup_role: default_cleanup_role(),
            assignable_retry: RetryConfig::default(),
        }
    }
}

impl ClassesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_wizard_timeout() -> u64 {
    60
}

fn default_cleanup_role() -> String {
    "Cleanup".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    2
}
fn default_base_delay_ms() -> u64 {
    250
}
