//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes error messages, usage hints, and notification templates.

pub const AUTH_DENIED: &str = "🚫 **Authorization Denied**.";
pub const UNKNOWN_COMMAND: &str = "❓ Unknown command.";
pub const ARCHIVE_USAGE: &str = "Usage: `.class archive <channel>`";
pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";

pub fn room_not_linked(room: &str) -> String {
    format!("⚠️ Room `{room}` is not linked to a guild. Add it to `bridges` in the config.")
}

pub fn wizard_already_running(err: &str) -> String {
    format!("⚠️ {err}. Finish or let it time out first.")
}

pub fn command_failed(err: &str) -> String {
    format!("Command Failed: {err}")
}

pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}
