//! In-memory fakes of the provider traits for unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::traits::{ChatProvider, GuildProvider, RoleStore};
use crate::domain::types::{Category, Role, TextChannel};

/// Records everything the bot says in a room.
#[derive(Clone, Default)]
pub struct FakeChat {
    room: String,
    sent: Arc<Mutex<Vec<String>>>,
}

impl FakeChat {
    pub fn new(room: &str) -> Self {
        Self {
            room: room.to_string(),
            sent: Arc::default(),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.sent().iter().filter(|m| m.contains(needle)).count()
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(format!("$event{}", sent.len()))
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.send_message(content).await.map(|_| ())
    }

    fn room_id(&self) -> String {
        self.room.clone()
    }
}

/// Mutating guild operations, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildCall {
    CreateCategory(String),
    CreateChannel(String),
    CreateRole(String),
    SetVisibility {
        channel: String,
        role: String,
        visible: bool,
    },
    SetPositions(Vec<(String, i64)>),
    SendMessage(String),
}

#[derive(Default)]
struct GuildData {
    next_id: u64,
    categories: Vec<Category>,
    channels: Vec<TextChannel>,
    roles: Vec<Role>,
    overwrites: HashMap<(String, String), bool>,
    messages: Vec<(String, String)>,
    calls: Vec<GuildCall>,
}

impl GuildData {
    fn id(&mut self) -> String {
        self.next_id += 1;
        format!("{}", 1000 + self.next_id)
    }

    fn new_role(&mut self, name: &str, mentionable: bool) -> Role {
        let role = Role {
            id: self.id(),
            name: name.to_string(),
            position: 0,
            mentionable,
        };
        self.roles.push(role.clone());
        role
    }
}

#[derive(Default)]
pub struct FakeGuild {
    data: Mutex<GuildData>,
}

impl FakeGuild {
    pub fn seed_category(&self, name: &str) -> Category {
        let mut data = self.data.lock().unwrap();
        let category = Category {
            id: data.id(),
            name: name.to_string(),
        };
        data.categories.push(category.clone());
        category
    }

    pub fn seed_role(&self, name: &str) -> Role {
        self.data.lock().unwrap().new_role(name, false)
    }

    pub fn role_named(&self, name: &str) -> Option<Role> {
        let data = self.data.lock().unwrap();
        data.roles.iter().find(|r| r.name == name).cloned()
    }

    pub fn channel_named(&self, name: &str) -> Option<TextChannel> {
        let data = self.data.lock().unwrap();
        data.channels.iter().find(|c| c.name == name).cloned()
    }

    pub fn category_named(&self, name: &str) -> Option<Category> {
        let data = self.data.lock().unwrap();
        data.categories.iter().find(|c| c.name == name).cloned()
    }

    pub fn role_position(&self, role_id: &str) -> Option<i64> {
        let data = self.data.lock().unwrap();
        data.roles.iter().find(|r| r.id == role_id).map(|r| r.position)
    }

    pub fn visibility(&self, channel_id: &str, role_id: &str) -> Option<bool> {
        let data = self.data.lock().unwrap();
        data.overwrites
            .get(&(channel_id.to_string(), role_id.to_string()))
            .copied()
    }

    pub fn channel_messages(&self, channel_id: &str) -> Vec<String> {
        let data = self.data.lock().unwrap();
        data.messages
            .iter()
            .filter(|(c, _)| c == channel_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn mutations(&self) -> Vec<GuildCall> {
        self.data.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&GuildCall) -> bool) -> usize {
        self.mutations().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl GuildProvider for FakeGuild {
    async fn find_category(&self, _guild_id: &str, name: &str) -> Result<Option<Category>> {
        Ok(self.category_named(name))
    }

    async fn create_category(&self, _guild_id: &str, name: &str) -> Result<Category> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::CreateCategory(name.to_string()));
        let category = Category {
            id: data.id(),
            name: name.to_string(),
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn create_text_channel(
        &self,
        _guild_id: &str,
        category_id: &str,
        name: &str,
        topic: &str,
    ) -> Result<TextChannel> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::CreateChannel(name.to_string()));
        let channel = TextChannel {
            id: data.id(),
            name: name.to_string(),
            parent_id: Some(category_id.to_string()),
            topic: Some(topic.to_string()),
        };
        data.channels.push(channel.clone());
        Ok(channel)
    }

    async fn find_role(&self, _guild_id: &str, name: &str) -> Result<Option<Role>> {
        Ok(self.role_named(name))
    }

    async fn create_role(&self, _guild_id: &str, name: &str, mentionable: bool) -> Result<Role> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::CreateRole(name.to_string()));
        Ok(data.new_role(name, mentionable))
    }

    async fn set_channel_visibility(
        &self,
        channel_id: &str,
        role_id: &str,
        visible: bool,
    ) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::SetVisibility {
            channel: channel_id.to_string(),
            role: role_id.to_string(),
            visible,
        });
        data.overwrites
            .insert((channel_id.to_string(), role_id.to_string()), visible);
        Ok(())
    }

    async fn set_role_positions(&self, _guild_id: &str, positions: &[(String, i64)]) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::SetPositions(positions.to_vec()));
        for (id, position) in positions {
            let role = data
                .roles
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| anyhow!("unknown role {id}"))?;
            role.position = *position;
        }
        Ok(())
    }

    async fn send_channel_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(GuildCall::SendMessage(channel_id.to_string()));
        data.messages
            .push((channel_id.to_string(), content.to_string()));
        Ok(())
    }
}

/// Role store that can fail its first `n` calls.
#[derive(Default)]
pub struct FakeRoleStore {
    fail_first: usize,
    calls: Mutex<Vec<(String, bool)>>,
    assignable: Mutex<HashMap<String, bool>>,
}

impl FakeRoleStore {
    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_assignable(&self, role_id: &str) -> bool {
        self.assignable
            .lock()
            .unwrap()
            .get(role_id)
            .copied()
            .unwrap_or(false)
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn set_assignable(&self, _guild_id: &str, role_id: &str, assignable: bool) -> Result<()> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((role_id.to_string(), assignable));
            calls.len()
        };
        if attempt <= self.fail_first {
            return Err(anyhow!("404 role {role_id} not found"));
        }
        self.assignable
            .lock()
            .unwrap()
            .insert(role_id.to_string(), assignable);
        Ok(())
    }
}
