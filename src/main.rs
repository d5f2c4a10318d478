//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, class records and provider traits
//! - Infrastructure: Matrix, Discord REST, role store
//! - Application: Router, wizard sessions, permissions, provisioning
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::provisioning::Provisioner;
use crate::application::retry::RetryPolicy;
use crate::application::router::CommandRouter;
use crate::application::sessions::SessionRegistry;
use crate::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::domain::traits::ChatProvider;
use crate::infrastructure::discord::DiscordGuildClient;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::role_store::ApiRoleStore;
use crate::strings::messages;

#[derive(Parser, Debug)]
#[command(name = "classroom", about = "Class channel provisioning bot")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&args.config)?;

    // 2. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting Classroom...");
    tracing::info!("{}", messages::config_loaded(&config.services.matrix.username));

    // 3. Initialize Infrastructure
    let guild = Arc::new(DiscordGuildClient::new(&config.services.guild_api)?);
    let role_store = Arc::new(ApiRoleStore::new(&config.services.role_store)?);

    // 4. Initialize Application Components
    let provisioner = Arc::new(Provisioner::new(
        guild,
        role_store,
        RetryPolicy::from_config(&config.classes.assignable_retry),
        config.classes.cleanup_role.clone(),
    ));
    let router = Arc::new(CommandRouter::new(
        config.clone(),
        SessionRegistry::new(),
        provisioner,
    ));

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    if let Some(name) = &config.services.matrix.display_name {
        tracing::info!("{}", messages::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name)).await {
            tracing::warn!("{}", messages::set_display_name_fail(&e.to_string()));
        }
    }

    // 6. Event Handlers
    let start_time = std::time::SystemTime::now();
    let loop_router = router.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = loop_router.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            if original_msg.sender == room.own_user_id() {
                return;
            }

            let body = &text_content.body;
            tracing::info!("Received message from {}: \n{}", original_msg.sender, body);

            let chat = MatrixService::new(room);
            if let Err(e) = router
                .route(&chat, body, original_msg.sender.as_str())
                .await
            {
                tracing::error!("Failed to route message: {:#}", e);
                let _ = chat
                    .send_notification(&messages::command_failed(&e.to_string()))
                    .await;
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", messages::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::error!("{}", messages::join_invite_fail(&e.to_string()));
            }
        }
    });

    // 7. Sync Loop
    tracing::info!("{}", messages::SYNC_LOOP_START);
    client.sync(SyncSettings::default()).await?;

    Ok(())
}
