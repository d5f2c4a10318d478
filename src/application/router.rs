//! # Command Router
//!
//! Routes incoming messages to the appropriate command handler (in `interface/commands`).
//! Replies from a user with a running class wizard go to that wizard instead of being
//! parsed as commands.

use anyhow::Result;
use std::sync::Arc;

use crate::application::permissions::PermissionGate;
use crate::application::provisioning::Provisioner;
use crate::application::sessions::{SessionKey, SessionRegistry};
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::interface::commands;

pub struct CommandRouter {
    config: AppConfig,
    gate: PermissionGate,
    sessions: SessionRegistry,
    provisioner: Arc<Provisioner>,
}

impl CommandRouter {
    pub fn new(config: AppConfig, sessions: SessionRegistry, provisioner: Arc<Provisioner>) -> Self {
        Self {
            gate: PermissionGate::new(config.permissions.clone()),
            config,
            sessions,
            provisioner,
        }
    }

    pub async fn route<C>(&self, chat: &C, message: &str, sender: &str) -> Result<()>
    where
        C: ChatProvider + Clone + Send + Sync + 'static,
    {
        let msg = message.trim();

        let (cmd, args) = if let Some(idx) = msg.find(' ') {
            (&msg[..idx], msg[idx + 1..].trim())
        } else {
            (msg, "")
        };
        tracing::info!(
            "Router dispatching cmd='{}' args='{}' sender='{}'",
            cmd,
            args,
            sender
        );

        // 1. Wizard replies. `.class add` still reaches the handler so a duplicate
        // session is rejected rather than swallowed as an answer.
        if !is_class_add(cmd, args) {
            let room = chat.room_id();
            if let Some(guild) = self.config.guild_for_room(&room) {
                let key = SessionKey::new(guild, sender, room);
                if self.sessions.deliver(&key, msg) {
                    return Ok(());
                }
            }
        }

        if !msg.starts_with('.') {
            return Ok(());
        }

        match cmd.to_lowercase().as_str() {
            ".class" | ".classes" => {
                commands::class::handle_class(
                    &self.config,
                    &self.gate,
                    &self.sessions,
                    &self.provisioner,
                    chat,
                    sender,
                    args,
                )
                .await?;
            }
            ".help" => {
                commands::help::handle_help(chat).await?;
            }
            _ => {
                let _ = chat
                    .send_message(crate::strings::messages::UNKNOWN_COMMAND)
                    .await;
            }
        }

        Ok(())
    }
}

fn is_class_add(cmd: &str, args: &str) -> bool {
    let sub = args.split_whitespace().next().unwrap_or("");
    matches!(cmd.to_lowercase().as_str(), ".class" | ".classes")
        && matches!(sub.to_lowercase().as_str(), "add" | "create")
}
