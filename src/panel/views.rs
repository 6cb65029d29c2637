//! Typed payloads for each console panel.

use serde::Serialize;

/// Row written to the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveUserView {
    pub user_id: u32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub table: String,
}

/// Encrypted mirror row in `users_shadow`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowUserView {
    pub user_id: u32,
    pub email_enc: String,
    pub table: String,
}

/// One per-field encryption key in `key_store`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEntry {
    pub purpose: String,
    pub destroyed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeysView {
    Entries(Vec<KeyEntry>),
    Destroyed { user_id: u32, status: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupProtection {
    pub backup_id: u32,
    pub protected_by_hold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupRef {
    pub backup_id: u32,
    pub backup_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackupsView {
    Protection(Vec<BackupProtection>),
    Impacted(Vec<BackupRef>),
}

/// Content of a single panel. Each update replaces the previous view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PanelView {
    ActiveUser(ActiveUserView),
    ShadowUser(ShadowUserView),
    Keys(KeysView),
    Backups(BackupsView),
    Text(String),
}

impl PanelView {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }
}

impl From<&str> for PanelView {
    fn from(message: &str) -> Self {
        Self::Text(message.to_string())
    }
}

impl From<String> for PanelView {
    fn from(message: String) -> Self {
        Self::Text(message)
    }
}
