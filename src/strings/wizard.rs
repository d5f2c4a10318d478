//! # Wizard Strings
//!
//! Prompts and embeds used by the class creation wizard and the provisioning steps.

use crate::domain::class::{self, ClassRecord};
use crate::domain::types::Embed;

pub const CURRENT_VALUES: &str = "**Current values**";
pub const TIMEOUT_NOTICE: &str = "Response timed out please redo the class wizard";
pub const DESCRIPTION_TOO_LONG: &str =
    "Error: Description needs to be less than 256 characters\nPlease try again";
pub const CONFIRM_HINT: &str = "Please answer `yes` or `no`";

/// Which field a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    AbbrevAndNumber,
    Name,
    Description,
    Instructor,
}

fn footer(user: &str, timeout_secs: u64) -> String {
    format!("{user} - Time Limit: {timeout_secs} Seconds")
}

pub fn started() -> Embed {
    Embed::new("🧙 New class setup wizard started ✅")
}

pub fn prompt(step: Prompt, record: &ClassRecord, user: &str, timeout_secs: u64) -> Embed {
    let (title, ask, example) = match step {
        Prompt::AbbrevAndNumber => (
            "🧙 New class setup wizard started ✅".to_string(),
            "Please enter the class abbreviation and number E.G.",
            "cpsc-1010",
        ),
        Prompt::Name => (
            format!("Class \"{}\" set", class::role_name(record)),
            "Please enter the class name or \"None\" to skip this step E.G.",
            "Introduction to C",
        ),
        Prompt::Description => (
            format!(
                "Class name: \"{}\" set",
                record.name.as_deref().unwrap_or(class::SKIP_TOKEN)
            ),
            "Please enter the class description (must be less than 256 characters) or \"None\" to skip this step E.G.",
            "An overview of programming fundamentals using the C programming language",
        ),
        Prompt::Instructor => (
            format!(
                "Class description: \"{}\" set",
                record.description.as_deref().unwrap_or(class::SKIP_TOKEN)
            ),
            "Please enter the class professors last name or \"None\" to skip this step E.G.",
            "Plis",
        ),
    };

    Embed::new(title)
        .field(CURRENT_VALUES, record.to_string())
        .field(ask, format!("`{example}`"))
        .footer(footer(user, timeout_secs))
}

pub fn invalid_class_token(err: &str) -> String {
    format!("❌ Error: {err}\nPlease enter the class as `abbreviation-number`, E.G. `cpsc-1010`")
}

pub fn finished(record: &ClassRecord) -> Embed {
    Embed::new(format!(
        "Class and role \"{}\" created in category \"{}\"",
        class::role_name(record),
        class::category_name(record)
    ))
    .inline_field("Channel", format!("#{}", class::channel_name(record)))
    .field(CURRENT_VALUES, record.to_string())
}

pub fn create_category_question(category: &str) -> String {
    format!("⚠️ Error: Category \"{category}\" not found\nWould you like to create it? (`yes` / `no`)")
}

pub fn category_not_created(category: &str) -> Embed {
    Embed::new(format!(
        "❌ Error: Category {category} not found and not created, Exiting Wizard"
    ))
}

pub fn channel_greeting(user: &str) -> String {
    format!("Here is your generated class channel {user}, Good luck!")
}

/// Shown the first time a guild gets the cleanup role.
pub fn onboarding() -> Embed {
    Embed::new("Welcome to class management!")
        .field(
            "To assign your class year or a specific class, run the command:",
            "`.roles <year>` or `.roles cpsc-<class-number>`",
        )
        .field("To see a list of assignable roles run:", "`.roles`")
        .field(
            "If you would like to hide all class channels you are not in, run:",
            "`.roles cleanup`",
        )
}

pub fn provisioning_failed(err: &str) -> String {
    format!("❌ **Class provisioning failed**: {err}")
}
