//! # Class Commands
//!
//! Handles the `.class` command group: `add` (alias `create`) starts the class wizard,
//! `archive` (alias `delete`) is reserved for administrators.

use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;

use crate::application::permissions::{Claim, PermissionGate};
use crate::application::provisioning::{ProvisionOutcome, Provisioner};
use crate::application::sessions::{SessionInbox, SessionKey, SessionRegistry};
use crate::domain::class::{ClassRecord, ClassToken};
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::interface::commands::wizard::{ClassWizard, WizardOutcome};
use crate::strings;

pub async fn handle_class<C>(
    config: &AppConfig,
    gate: &PermissionGate,
    sessions: &SessionRegistry,
    provisioner: &Arc<Provisioner>,
    chat: &C,
    sender: &str,
    args: &str,
) -> Result<()>
where
    C: ChatProvider + Clone + Send + Sync + 'static,
{
    let (sub, rest) = match args.trim().split_once(' ') {
        Some((sub, rest)) => (sub, rest.trim()),
        None => (args.trim(), ""),
    };

    match sub.to_lowercase().as_str() {
        "" => send(chat, strings::help::CLASS).await,
        "add" | "create" => {
            handle_add(config, gate, sessions, provisioner, chat, sender, rest).await
        }
        "archive" | "delete" => handle_archive(gate, chat, sender, rest).await,
        _ => send(chat, strings::messages::UNKNOWN_COMMAND).await,
    }
}

/// Checks the claim, opens the session and runs the wizard in its own task so the
/// sync loop keeps delivering the user's replies.
pub async fn handle_add<C>(
    config: &AppConfig,
    gate: &PermissionGate,
    sessions: &SessionRegistry,
    provisioner: &Arc<Provisioner>,
    chat: &C,
    sender: &str,
    args: &str,
) -> Result<()>
where
    C: ChatProvider + Clone + Send + Sync + 'static,
{
    if !gate.has_claim(sender, Claim::ManageClassAdd) {
        tracing::warn!("{} lacks claim {}", sender, Claim::ManageClassAdd.as_str());
        return send(chat, strings::messages::AUTH_DENIED).await;
    }

    let room = chat.room_id();
    let Some(guild_id) = config.guild_for_room(&room).map(str::to_string) else {
        return send(chat, &strings::messages::room_not_linked(&room)).await;
    };

    let inbox = match sessions.register(SessionKey::new(&guild_id, sender, &room)) {
        Ok(inbox) => inbox,
        Err(e) => {
            return send(chat, &strings::messages::wizard_already_running(&e.to_string())).await;
        }
    };

    tracing::info!(
        "Class wizard started for {} in guild {} ({} active)",
        sender,
        guild_id,
        sessions.len()
    );

    let token = args.split_whitespace().next().map(str::to_string);
    let chat = chat.clone();
    let provisioner = provisioner.clone();
    let sender = sender.to_string();
    let timeout = config.classes.timeout();

    tokio::spawn(async move {
        if let Err(e) = run_add(
            &chat,
            inbox,
            &provisioner,
            &guild_id,
            &sender,
            token.as_deref(),
            timeout,
        )
        .await
        {
            tracing::error!("Class wizard for {} failed: {:#}", sender, e);
        }
    });

    Ok(())
}

/// Wizard followed by provisioning. `None` means the wizard was cancelled.
/// Provisioning errors are reported to the room before being returned.
pub async fn run_add<C: ChatProvider>(
    chat: &C,
    mut inbox: SessionInbox,
    provisioner: &Provisioner,
    guild_id: &str,
    sender: &str,
    token: Option<&str>,
    timeout: Duration,
) -> Result<Option<ProvisionOutcome>> {
    let mut record = ClassRecord::new();
    if let Some(token) = token {
        match ClassToken::parse(token) {
            Ok(token) => record.apply_token(&token),
            Err(e) => send(chat, &strings::wizard::invalid_class_token(&e.to_string())).await?,
        }
    }

    let mut wizard = ClassWizard::new(chat, &mut inbox, sender, timeout);
    let record = match wizard.run(record).await? {
        WizardOutcome::Completed(record) => record,
        WizardOutcome::Cancelled => return Ok(None),
    };

    match provisioner
        .provision(chat, &mut wizard, guild_id, &record, sender)
        .await
    {
        Ok(outcome) => {
            if let ProvisionOutcome::Provisioned(class) = &outcome {
                tracing::info!(
                    "Provisioned class {} (channel {}, role {}) in guild {}",
                    class.channel.name,
                    class.channel.id,
                    class.role.id,
                    guild_id
                );
            }
            Ok(Some(outcome))
        }
        Err(e) => {
            let _ = chat
                .send_notification(&strings::wizard::provisioning_failed(&format!("{e:#}")))
                .await;
            Err(e)
        }
    }
}

/// Administrator-only placeholder; it has no effect past the permission check.
pub async fn handle_archive(
    gate: &PermissionGate,
    chat: &impl ChatProvider,
    sender: &str,
    args: &str,
) -> Result<()> {
    if !gate.is_admin(sender) {
        return send(chat, strings::messages::AUTH_DENIED).await;
    }
    if args.is_empty() {
        return send(chat, strings::messages::ARCHIVE_USAGE).await;
    }
    tracing::info!("Archive requested by {} for {}", sender, args);
    Ok(())
}

async fn send(chat: &impl ChatProvider, content: &str) -> Result<()> {
    chat.send_message(content)
        .await
        .map(|_| ())
        .map_err(|e| anyhow!(e))
}
