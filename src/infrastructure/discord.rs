//! # Discord Guild Adapter
//!
//! Implements `GuildProvider` against the Discord REST API (v10).
//! Only the handful of endpoints class provisioning needs are covered.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::config::GuildApiConfig;
use crate::domain::traits::GuildProvider;
use crate::domain::types::{Category, Role, TextChannel};
use crate::infrastructure::http;

const SERVICE: &str = "discord";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const GUILD_TEXT: u8 = 0;
const GUILD_CATEGORY: u8 = 4;
/// Overwrite applies to a role rather than a member.
const OVERWRITE_ROLE: u8 = 0;
const VIEW_CHANNEL: u64 = 1 << 10;

#[derive(Debug, Deserialize)]
struct ApiChannel {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

impl ApiChannel {
    fn into_text_channel(self) -> TextChannel {
        TextChannel {
            id: self.id,
            name: self.name.unwrap_or_default(),
            parent_id: self.parent_id,
            topic: self.topic,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateChannel<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRole<'a> {
    name: &'a str,
    mentionable: bool,
}

#[derive(Debug, Serialize)]
struct RolePosition<'a> {
    id: &'a str,
    position: i64,
}

/// Bitsets travel as decimal strings.
#[derive(Debug, Serialize)]
struct PermissionOverwrite {
    #[serde(rename = "type")]
    kind: u8,
    allow: String,
    deny: String,
}

impl PermissionOverwrite {
    fn view_channel(visible: bool) -> Self {
        let (allow, deny) = if visible {
            (VIEW_CHANNEL, 0)
        } else {
            (0, VIEW_CHANNEL)
        };
        Self {
            kind: OVERWRITE_ROLE,
            allow: allow.to_string(),
            deny: deny.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

pub struct DiscordGuildClient {
    http: Client,
    base_url: String,
    token: String,
}

impl DiscordGuildClient {
    pub fn new(config: &GuildApiConfig) -> Result<Self> {
        Ok(Self {
            http: http::build_client(REQUEST_TIMEOUT)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.resolve_token()?,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bot {}", self.token))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("{SERVICE}: {what}: HTTP request failed"))?;
        http::ensure_success(SERVICE, response)
            .await
            .with_context(|| format!("{SERVICE}: {what}"))
    }

    async fn guild_channels(&self, guild_id: &str) -> Result<Vec<ApiChannel>> {
        let request = self.request(Method::GET, &format!("/guilds/{guild_id}/channels"));
        self.send(request, "list channels")
            .await?
            .json()
            .await
            .context("Failed to parse channel list")
    }

    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>> {
        let request = self.request(Method::GET, &format!("/guilds/{guild_id}/roles"));
        self.send(request, "list roles")
            .await?
            .json()
            .await
            .context("Failed to parse role list")
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        body: &CreateChannel<'_>,
    ) -> Result<ApiChannel> {
        let request = self
            .request(Method::POST, &format!("/guilds/{guild_id}/channels"))
            .json(body);
        self.send(request, "create channel")
            .await?
            .json()
            .await
            .context("Failed to parse created channel")
    }
}

#[async_trait]
impl GuildProvider for DiscordGuildClient {
    async fn find_category(&self, guild_id: &str, name: &str) -> Result<Option<Category>> {
        let channels = self.guild_channels(guild_id).await?;
        Ok(channels
            .into_iter()
            .filter(|c| c.kind == GUILD_CATEGORY)
            .find(|c| c.name.as_deref() == Some(name))
            .map(|c| Category {
                id: c.id,
                name: name.to_string(),
            }))
    }

    async fn create_category(&self, guild_id: &str, name: &str) -> Result<Category> {
        let body = CreateChannel {
            name,
            kind: GUILD_CATEGORY,
            parent_id: None,
            topic: None,
        };
        let created = self.create_channel(guild_id, &body).await?;
        tracing::info!("Created category {} ({}) in guild {}", name, created.id, guild_id);
        Ok(Category {
            id: created.id,
            name: name.to_string(),
        })
    }

    async fn create_text_channel(
        &self,
        guild_id: &str,
        category_id: &str,
        name: &str,
        topic: &str,
    ) -> Result<TextChannel> {
        let body = CreateChannel {
            name,
            kind: GUILD_TEXT,
            parent_id: Some(category_id),
            topic: Some(topic),
        };
        let created = self.create_channel(guild_id, &body).await?;
        tracing::info!("Created channel {} ({}) in guild {}", name, created.id, guild_id);
        Ok(created.into_text_channel())
    }

    async fn find_role(&self, guild_id: &str, name: &str) -> Result<Option<Role>> {
        let roles = self.guild_roles(guild_id).await?;
        Ok(roles.into_iter().find(|r| r.name == name))
    }

    async fn create_role(&self, guild_id: &str, name: &str, mentionable: bool) -> Result<Role> {
        let request = self
            .request(Method::POST, &format!("/guilds/{guild_id}/roles"))
            .json(&CreateRole { name, mentionable });
        let role: Role = self
            .send(request, "create role")
            .await?
            .json()
            .await
            .context("Failed to parse created role")?;
        tracing::info!("Created role {} ({}) in guild {}", name, role.id, guild_id);
        Ok(role)
    }

    async fn set_channel_visibility(
        &self,
        channel_id: &str,
        role_id: &str,
        visible: bool,
    ) -> Result<()> {
        let request = self
            .request(
                Method::PUT,
                &format!("/channels/{channel_id}/permissions/{role_id}"),
            )
            .json(&PermissionOverwrite::view_channel(visible));
        self.send(request, "edit channel permissions").await?;
        Ok(())
    }

    async fn set_role_positions(&self, guild_id: &str, positions: &[(String, i64)]) -> Result<()> {
        let body: Vec<RolePosition> = positions
            .iter()
            .map(|(id, position)| RolePosition {
                id,
                position: *position,
            })
            .collect();
        let request = self
            .request(Method::PATCH, &format!("/guilds/{guild_id}/roles"))
            .json(&body);
        self.send(request, "modify role positions").await?;
        Ok(())
    }

    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &format!("/channels/{channel_id}/messages"))
            .json(&CreateMessage { content });
        self.send(request, "create message").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_overwrite_body() {
        let allow = serde_json::to_value(PermissionOverwrite::view_channel(true)).unwrap();
        assert_eq!(allow, json!({"type": 0, "allow": "1024", "deny": "0"}));

        let deny = serde_json::to_value(PermissionOverwrite::view_channel(false)).unwrap();
        assert_eq!(deny, json!({"type": 0, "allow": "0", "deny": "1024"}));
    }

    #[test]
    fn test_category_body_omits_parent_and_topic() {
        let body = CreateChannel {
            name: "cpsc 1000 levels",
            kind: GUILD_CATEGORY,
            parent_id: None,
            topic: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"name": "cpsc 1000 levels", "type": 4})
        );
    }

    #[test]
    fn test_channel_list_parses_mixed_types() {
        let raw = r#"[
            {"id": "1", "type": 4, "name": "cpsc 1000 levels", "position": 0},
            {"id": "2", "type": 0, "name": "cpsc-1010", "parent_id": "1", "topic": null},
            {"id": "3", "type": 2, "name": "Voice"}
        ]"#;
        let channels: Vec<ApiChannel> = serde_json::from_str(raw).unwrap();
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].kind, GUILD_CATEGORY);

        let text = channels.into_iter().nth(1).unwrap().into_text_channel();
        assert_eq!(text.parent_id.as_deref(), Some("1"));
        assert_eq!(text.topic, None);
    }

    #[test]
    fn test_new_requires_token() {
        let config = GuildApiConfig {
            token: None,
            token_env: None,
            ..GuildApiConfig::default()
        };
        assert!(DiscordGuildClient::new(&config).is_err());
    }
}
