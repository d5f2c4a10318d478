//! # Class Provisioning
//!
//! Turns a finished `ClassRecord` into guild objects: category, channel, role and the
//! permission overwrites tying them to the cleanup role. Steps run in order and are not
//! transactional; a failure leaves the objects created so far in place.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::application::retry::RetryPolicy;
use crate::domain::class::{self, ClassRecord, SKIP_TOKEN};
use crate::domain::traits::{ChatProvider, GuildProvider, RoleStore};
use crate::domain::types::{Category, Role, TextChannel};
use crate::strings;

/// Position given to the class role; the cleanup role goes right below it.
const CLASS_ROLE_POSITION: i64 = 2;
const CLEANUP_ROLE_POSITION: i64 = 1;

/// Asks the invoking user a yes/no question.
#[async_trait]
pub trait Confirmer: Send {
    /// `false` when the user declined or did not answer in time.
    async fn confirm(&mut self, question: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedClass {
    pub category: Category,
    pub channel: TextChannel,
    pub role: Role,
    pub cleanup_created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Provisioned(ProvisionedClass),
    /// The category was missing and the user did not agree to create it.
    CategoryDeclined { category: String },
}

pub struct Provisioner {
    guild: Arc<dyn GuildProvider>,
    roles: Arc<dyn RoleStore>,
    retry: RetryPolicy,
    cleanup_role: String,
}

impl Provisioner {
    pub fn new(
        guild: Arc<dyn GuildProvider>,
        roles: Arc<dyn RoleStore>,
        retry: RetryPolicy,
        cleanup_role: impl Into<String>,
    ) -> Self {
        Self {
            guild,
            roles,
            retry,
            cleanup_role: cleanup_role.into(),
        }
    }

    pub async fn provision(
        &self,
        chat: &dyn ChatProvider,
        confirmer: &mut dyn Confirmer,
        guild_id: &str,
        record: &ClassRecord,
        invoker: &str,
    ) -> Result<ProvisionOutcome> {
        let category_name = class::category_name(record);

        let Some(category) = self
            .resolve_category(confirmer, guild_id, &category_name)
            .await?
        else {
            let _ = chat
                .send_embed(&strings::wizard::category_not_created(&category_name))
                .await;
            return Ok(ProvisionOutcome::CategoryDeclined {
                category: category_name,
            });
        };

        let channel = self.create_channel(guild_id, &category, record).await?;
        if let Err(e) = self
            .guild
            .send_channel_message(&channel.id, &strings::wizard::channel_greeting(invoker))
            .await
        {
            tracing::warn!("Failed to greet in new channel {}: {:#}", channel.name, e);
        }

        let role = self.resolve_role(guild_id, record).await?;
        let cleanup_created = self.sync_permissions(chat, guild_id, &channel, &role).await?;

        Ok(ProvisionOutcome::Provisioned(ProvisionedClass {
            category,
            channel,
            role,
            cleanup_created,
        }))
    }

    /// Exact-name lookup, falling back to creation once the user confirms.
    async fn resolve_category(
        &self,
        confirmer: &mut dyn Confirmer,
        guild_id: &str,
        name: &str,
    ) -> Result<Option<Category>> {
        if let Some(category) = self.guild.find_category(guild_id, name).await? {
            return Ok(Some(category));
        }

        tracing::info!("Class creation category {} non existent, asking to create it", name);
        if !confirmer.confirm(&strings::wizard::create_category_question(name)).await? {
            return Ok(None);
        }

        tracing::info!("Creating category \"{}\" in guild {}", name, guild_id);
        let category = self
            .guild
            .create_category(guild_id, name)
            .await
            .with_context(|| format!("Failed to create category {name}"))?;
        Ok(Some(category))
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        category: &Category,
        record: &ClassRecord,
    ) -> Result<TextChannel> {
        let name = class::channel_name(record);
        let topic = format!(
            "{} - {}",
            record.name.as_deref().unwrap_or(SKIP_TOKEN),
            record.description.as_deref().unwrap_or(SKIP_TOKEN)
        );

        tracing::info!("Creating new class channel \"{}\"", name);
        self.guild
            .create_text_channel(guild_id, &category.id, &name, &topic)
            .await
            .with_context(|| format!("Failed to create channel {name}"))
    }

    async fn resolve_role(&self, guild_id: &str, record: &ClassRecord) -> Result<Role> {
        let name = class::role_name(record);
        let role = match self.guild.find_role(guild_id, &name).await? {
            Some(role) => role,
            None => {
                tracing::info!("Creating new class role \"{}\"", name);
                self.guild
                    .create_role(guild_id, &name, false)
                    .await
                    .with_context(|| format!("Failed to create role {name}"))?
            }
        };

        self.mark_assignable(guild_id, &role).await?;
        Ok(role)
    }

    async fn mark_assignable(&self, guild_id: &str, role: &Role) -> Result<()> {
        let what = format!("Marking role {} assignable", role.name);
        self.retry
            .run(&what, || self.roles.set_assignable(guild_id, &role.id, true))
            .await
    }

    /// Returns whether the cleanup role had to be created.
    async fn sync_permissions(
        &self,
        chat: &dyn ChatProvider,
        guild_id: &str,
        channel: &TextChannel,
        role: &Role,
    ) -> Result<bool> {
        let (cleanup, created) = match self.guild.find_role(guild_id, &self.cleanup_role).await? {
            Some(existing) => (existing, false),
            None => {
                let cleanup = self
                    .guild
                    .create_role(guild_id, &self.cleanup_role, false)
                    .await
                    .context("Failed to create cleanup role")?;
                self.mark_assignable(guild_id, &cleanup).await?;

                // First class in this guild: explain how members pick their classes.
                let _ = chat.send_embed(&strings::wizard::onboarding()).await;
                (cleanup, true)
            }
        };

        tracing::info!("Syncing channel {} and role {} with cleanup", channel.name, role.name);
        self.guild
            .set_channel_visibility(&channel.id, &role.id, true)
            .await?;
        self.guild
            .set_channel_visibility(&channel.id, &cleanup.id, false)
            .await?;
        self.guild
            .set_role_positions(
                guild_id,
                &[
                    (role.id.clone(), CLASS_ROLE_POSITION),
                    (cleanup.id.clone(), CLEANUP_ROLE_POSITION),
                ],
            )
            .await?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::class::ClassToken;
    use crate::testing::{FakeChat, FakeGuild, FakeRoleStore, GuildCall};
    use std::time::Duration;

    struct Answer(bool);

    #[async_trait]
    impl Confirmer for Answer {
        async fn confirm(&mut self, _question: &str) -> Result<bool> {
            Ok(self.0)
        }
    }

    fn record() -> ClassRecord {
        let mut record = ClassRecord::from_token(&ClassToken::parse("cpsc-1010").unwrap());
        record.set_name("Data Structures");
        record.set_instructor("Smith");
        record
    }

    fn provisioner(guild: &Arc<FakeGuild>, store: &Arc<FakeRoleStore>) -> Provisioner {
        Provisioner::new(
            guild.clone(),
            store.clone(),
            RetryPolicy::new(2, Duration::from_millis(1)),
            "Cleanup",
        )
    }

    #[tokio::test]
    async fn test_full_pipeline_creates_everything() {
        let guild = Arc::new(FakeGuild::default());
        let store = Arc::new(FakeRoleStore::default());
        let chat = FakeChat::new("!room:x");

        let outcome = provisioner(&guild, &store)
            .provision(&chat, &mut Answer(true), "g1", &record(), "@prof:x")
            .await
            .unwrap();

        let ProvisionOutcome::Provisioned(class) = outcome else {
            panic!("expected provisioned class");
        };
        assert_eq!(class.category.name, "cpsc 1000 levels");
        assert_eq!(class.channel.name, "cpsc-1010-smith");
        assert_eq!(class.channel.topic.as_deref(), Some("Data Structures - None"));
        assert_eq!(class.role.name, "cpsc-1010");
        assert!(class.cleanup_created);

        let cleanup = guild.role_named("Cleanup").unwrap();
        assert!(store.is_assignable(&class.role.id));
        assert!(store.is_assignable(&cleanup.id));
        assert_eq!(guild.visibility(&class.channel.id, &class.role.id), Some(true));
        assert_eq!(guild.visibility(&class.channel.id, &cleanup.id), Some(false));
        assert_eq!(guild.role_position(&class.role.id), Some(2));
        assert_eq!(guild.role_position(&cleanup.id), Some(1));

        // onboarding shown once, greeting posted in the new channel
        assert!(chat.sent().iter().any(|m| m.contains("class management")));
        assert_eq!(guild.channel_messages(&class.channel.id).len(), 1);
    }

    #[tokio::test]
    async fn test_existing_objects_are_reused() {
        let guild = Arc::new(FakeGuild::default());
        let category = guild.seed_category("cpsc 1000 levels");
        let role = guild.seed_role("cpsc-1010");
        guild.seed_role("Cleanup");
        let store = Arc::new(FakeRoleStore::default());
        let chat = FakeChat::new("!room:x");

        let outcome = provisioner(&guild, &store)
            .provision(&chat, &mut Answer(false), "g1", &record(), "@prof:x")
            .await
            .unwrap();

        let ProvisionOutcome::Provisioned(class) = outcome else {
            panic!("expected provisioned class");
        };
        assert_eq!(class.category, category);
        assert_eq!(class.role.id, role.id);
        assert!(!class.cleanup_created);
        assert!(!chat.sent().iter().any(|m| m.contains("class management")));
        assert_eq!(guild.count(|c| matches!(c, GuildCall::CreateRole(_))), 0);
        assert_eq!(guild.count(|c| matches!(c, GuildCall::CreateCategory(_))), 0);
    }

    #[tokio::test]
    async fn test_declined_category_stops_pipeline() {
        let guild = Arc::new(FakeGuild::default());
        let store = Arc::new(FakeRoleStore::default());
        let chat = FakeChat::new("!room:x");

        let outcome = provisioner(&guild, &store)
            .provision(&chat, &mut Answer(false), "g1", &record(), "@prof:x")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ProvisionOutcome::CategoryDeclined {
                category: "cpsc 1000 levels".to_string()
            }
        );
        assert!(guild.mutations().is_empty());
        assert!(store.calls().is_empty());
        assert!(chat.sent().iter().any(|m| m.contains("not found and not created")));
    }

    #[tokio::test]
    async fn test_store_retried_once_then_succeeds() {
        let guild = Arc::new(FakeGuild::default());
        guild.seed_category("cpsc 1000 levels");
        guild.seed_role("Cleanup");
        let store = Arc::new(FakeRoleStore::failing_first(1));
        let chat = FakeChat::new("!room:x");

        let outcome = provisioner(&guild, &store)
            .provision(&chat, &mut Answer(true), "g1", &record(), "@prof:x")
            .await
            .unwrap();

        assert!(matches!(outcome, ProvisionOutcome::Provisioned(_)));
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failing_twice_is_fatal_without_rollback() {
        let guild = Arc::new(FakeGuild::default());
        guild.seed_category("cpsc 1000 levels");
        let store = Arc::new(FakeRoleStore::failing_first(2));
        let chat = FakeChat::new("!room:x");

        let err = provisioner(&guild, &store)
            .provision(&chat, &mut Answer(true), "g1", &record(), "@prof:x")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("after 2 attempts"));
        // channel and role stay, permissions were never touched
        assert!(guild.role_named("cpsc-1010").is_some());
        assert_eq!(guild.count(|c| matches!(c, GuildCall::CreateChannel(_))), 1);
        assert_eq!(guild.count(|c| matches!(c, GuildCall::SetVisibility { .. })), 0);
    }
}
