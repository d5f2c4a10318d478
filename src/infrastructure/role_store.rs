//! # Role Store Adapter
//!
//! HTTP client for the external store that tracks which guild roles members may
//! self-assign (`PATCH {base}/bot/roles/{role_id}`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::config::RoleStoreConfig;
use crate::domain::traits::RoleStore;
use crate::infrastructure::http;

const SERVICE: &str = "role store";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUpdate<'a> {
    guild_id: &'a str,
    is_assignable: bool,
}

pub struct ApiRoleStore {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiRoleStore {
    pub fn new(config: &RoleStoreConfig) -> Result<Self> {
        if config.resolve_api_key().is_none() {
            tracing::warn!("No role store API key configured; requests go out unauthenticated");
        }
        Ok(Self {
            http: http::build_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
        })
    }

    fn role_url(&self, role_id: &str) -> String {
        format!("{}/bot/roles/{}", self.base_url, role_id)
    }
}

#[async_trait]
impl RoleStore for ApiRoleStore {
    async fn set_assignable(&self, guild_id: &str, role_id: &str, assignable: bool) -> Result<()> {
        let mut request = self
            .http
            .patch(self.role_url(role_id))
            .json(&AssignableUpdate {
                guild_id,
                is_assignable: assignable,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{SERVICE}: HTTP request failed"))?;
        http::ensure_success(SERVICE, response).await?;

        tracing::debug!("Role {} in guild {} assignable={}", role_id, guild_id, assignable);
        Ok(())
    }
}
