//! # Domain Types
//!
//! Common data structures used across the application logic: guild objects returned by the
//! guild platform and the embed layout used for wizard prompts.

use serde::{Deserialize, Serialize};

/// A channel grouping container in the guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChannel {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub mentionable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured message: a title, named fields and an optional footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    /// Renders the embed as a Markdown message body.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("### {}\n", self.title);
        for field in &self.fields {
            if field.inline {
                out.push_str(&format!("\n**{}**: {}\n", field.name, field.value));
            } else {
                out.push_str(&format!("\n**{}**\n{}\n", field.name, field.value));
            }
        }
        if let Some(footer) = &self.footer {
            out.push_str(&format!("\n_{footer}_"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_markdown_layout() {
        let embed = Embed::new("Wizard")
            .field("Current values", "Class Major: **cpsc**")
            .inline_field("Step", "1")
            .footer("@prof:example.org - Time Limit: 60 Seconds");

        let md = embed.to_markdown();
        assert!(md.starts_with("### Wizard\n"));
        assert!(md.contains("\n**Current values**\nClass Major: **cpsc**\n"));
        assert!(md.contains("\n**Step**: 1\n"));
        assert!(md.ends_with("_@prof:example.org - Time Limit: 60 Seconds_"));
    }

    #[test]
    fn test_role_deserializes_without_optional_fields() {
        let role: Role = serde_json::from_str(r#"{"id":"1","name":"cpsc-1010"}"#).unwrap();
        assert_eq!(role.position, 0);
        assert!(!role.mentionable);
    }
}
