//! # Class Wizard
//!
//! Linear conversational state machine collecting a `ClassRecord`.
//! Each step sends a prompt, then waits for the invoking user's next reply in the room.
//! The wait for a step has a single deadline, set when the step starts; invalid replies
//! are re-asked under the same deadline. Running out of time cancels the wizard.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::provisioning::Confirmer;
use crate::application::sessions::SessionInbox;
use crate::domain::class::{ClassRecord, ClassToken, SKIP_TOKEN};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Embed;
use crate::strings::wizard::{self as text, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    CollectAbbrevAndNumber,
    CollectName,
    CollectDescription,
    CollectInstructor,
    Finalize,
}

impl WizardStep {
    pub fn next(self) -> Self {
        match self {
            WizardStep::CollectAbbrevAndNumber => WizardStep::CollectName,
            WizardStep::CollectName => WizardStep::CollectDescription,
            WizardStep::CollectDescription => WizardStep::CollectInstructor,
            WizardStep::CollectInstructor | WizardStep::Finalize => WizardStep::Finalize,
        }
    }

    fn prompt(self) -> Option<Prompt> {
        match self {
            WizardStep::CollectAbbrevAndNumber => Some(Prompt::AbbrevAndNumber),
            WizardStep::CollectName => Some(Prompt::Name),
            WizardStep::CollectDescription => Some(Prompt::Description),
            WizardStep::CollectInstructor => Some(Prompt::Instructor),
            WizardStep::Finalize => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Completed(ClassRecord),
    /// A step timed out; nothing was provisioned.
    Cancelled,
}

pub struct ClassWizard<'a, C: ChatProvider> {
    chat: &'a C,
    inbox: &'a mut SessionInbox,
    user: String,
    timeout: Duration,
}

impl<'a, C: ChatProvider> ClassWizard<'a, C> {
    pub fn new(chat: &'a C, inbox: &'a mut SessionInbox, user: &str, timeout: Duration) -> Self {
        Self {
            chat,
            inbox,
            user: user.to_string(),
            timeout,
        }
    }

    /// Drives the steps to completion. A record that already has an abbreviation skips
    /// the first step.
    pub async fn run(&mut self, mut record: ClassRecord) -> Result<WizardOutcome> {
        let mut step = if record.abbreviation.is_some() {
            self.show(&text::started()).await?;
            WizardStep::CollectName
        } else {
            WizardStep::CollectAbbrevAndNumber
        };

        loop {
            let Some(prompt) = step.prompt() else {
                self.show(&text::finished(&record)).await?;
                return Ok(WizardOutcome::Completed(record));
            };

            self.show(&text::prompt(prompt, &record, &self.user, self.timeout.as_secs()))
                .await?;

            let deadline = Instant::now() + self.timeout;
            if !self.collect(step, &mut record, deadline).await? {
                tracing::info!(
                    "Class wizard for {} in {} timed out at {:?}",
                    self.user,
                    self.inbox.key().channel_id,
                    step
                );
                self.say(text::TIMEOUT_NOTICE).await?;
                return Ok(WizardOutcome::Cancelled);
            }
            step = step.next();
        }
    }

    /// Applies one reply to `record`. Returns false if the deadline passed first.
    async fn collect(
        &mut self,
        step: WizardStep,
        record: &mut ClassRecord,
        deadline: Instant,
    ) -> Result<bool> {
        loop {
            let Some(reply) = self.inbox.next_until(deadline).await else {
                return Ok(false);
            };
            let reply = reply.trim();

            match step {
                WizardStep::CollectAbbrevAndNumber => match ClassToken::parse(reply) {
                    Ok(token) => {
                        record.apply_token(&token);
                        return Ok(true);
                    }
                    Err(e) => self.say(&text::invalid_class_token(&e.to_string())).await?,
                },
                WizardStep::CollectName => {
                    if reply != SKIP_TOKEN {
                        record.set_name(reply);
                    }
                    return Ok(true);
                }
                WizardStep::CollectDescription => {
                    if reply == SKIP_TOKEN || record.set_description(reply).is_ok() {
                        return Ok(true);
                    }
                    self.say(text::DESCRIPTION_TOO_LONG).await?;
                }
                WizardStep::CollectInstructor => {
                    if reply != SKIP_TOKEN {
                        record.set_instructor(reply);
                    }
                    return Ok(true);
                }
                WizardStep::Finalize => return Ok(true),
            }
        }
    }

    async fn show(&self, embed: &Embed) -> Result<()> {
        self.chat
            .send_embed(embed)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!(e))
    }

    async fn say(&self, content: &str) -> Result<()> {
        self.chat
            .send_message(content)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!(e))
    }
}

fn parse_yes_no(reply: &str) -> Option<bool> {
    match reply.trim().to_lowercase().as_str() {
        "yes" | "y" | "ok" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Yes/no questions asked during provisioning share the wizard's inbox and timeout.
#[async_trait]
impl<C: ChatProvider> Confirmer for ClassWizard<'_, C> {
    async fn confirm(&mut self, question: &str) -> Result<bool> {
        self.say(question).await?;
        let deadline = Instant::now() + self.timeout;
        loop {
            let Some(reply) = self.inbox.next_until(deadline).await else {
                tracing::info!("Confirmation from {} timed out", self.user);
                return Ok(false);
            };
            match parse_yes_no(&reply) {
                Some(answer) => return Ok(answer),
                None => self.say(text::CONFIRM_HINT).await?,
            }
        }
    }
}
