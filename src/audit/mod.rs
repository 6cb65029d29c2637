//! In-memory audit log for console actions.
//!
//! Entries are kept most-recent-first. Every entry recorded during the
//! session is retained; only the newest `window` entries (12 by default) are
//! rendered into the audit table.

use std::collections::VecDeque;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::html;

/// Number of entries rendered into the audit table.
pub const DEFAULT_WINDOW: usize = 12;

/// Default and maximum number of entries returned by [`AuditLog::recent`].
pub const DEFAULT_RECENT_LIMIT: usize = 50;
pub const MAX_RECENT_LIMIT: usize = 500;

/// Placeholder row rendered when nothing has been recorded yet.
pub const EMPTY_ROW: &str = r#"<tr><td colspan="4" class="muted">No audit entries yet.</td></tr>"#;

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// Kind of console action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateUser,
    CryptoErase,
    RestoreSim,
    AddLegalHold,
    ReleaseHold,
    ProtectBackups,
    LookupBackups,
    RefreshStatus,
    RefreshKeys,
    LoadMetrics,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUser => "CREATE_USER",
            Self::CryptoErase => "CRYPTO_ERASE",
            Self::RestoreSim => "RESTORE_SIM",
            Self::AddLegalHold => "ADD_LEGAL_HOLD",
            Self::ReleaseHold => "RELEASE_HOLD",
            Self::ProtectBackups => "PROTECT_BACKUPS",
            Self::LookupBackups => "LOOKUP_BACKUPS",
            Self::RefreshStatus => "REFRESH_STATUS",
            Self::RefreshKeys => "REFRESH_KEYS",
            Self::LoadMetrics => "LOAD_METRICS",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub action: AuditAction,
    /// Subject user, or `None` for console-wide actions (rendered as `-`).
    pub user_id: Option<u32>,
    pub detail: String,
}

impl AuditEntry {
    /// Build an entry stamped with the current time.
    pub fn now(action: AuditAction, user_id: Option<u32>, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            action,
            user_id,
            detail: detail.into(),
        }
    }

    /// User id column text.
    pub fn user_label(&self) -> String {
        match self.user_id {
            Some(id) => id.to_string(),
            None => "-".to_string(),
        }
    }

    /// Render this entry as one audit table row.
    pub fn render_row(&self) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html::escape(&self.timestamp),
            self.action,
            self.user_label(),
            html::escape(&self.detail),
        )
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Most-recent-first audit log with a fixed display window.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    window: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl AuditLog {
    /// Create an empty log rendering at most `window` rows.
    pub fn new(window: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Record an action stamped with the current time and return the entry.
    pub fn record(
        &mut self,
        action: AuditAction,
        user_id: Option<u32>,
        detail: impl Into<String>,
    ) -> &AuditEntry {
        self.push(AuditEntry::now(action, user_id, detail))
    }

    /// Insert a prebuilt entry at the front of the log.
    pub fn push(&mut self, entry: AuditEntry) -> &AuditEntry {
        self.entries.push_front(entry);
        &self.entries[0]
    }

    /// Entries shown in the audit table, most recent first.
    pub fn visible(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().take(self.window)
    }

    /// All retained entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// The `limit` most recent entries, with `limit` clamped to
    /// `1..=MAX_RECENT_LIMIT`.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let limit = clamp_limit(limit);
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Render the full `<tbody>` content for the audit table.
    pub fn render_rows(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_ROW.to_string();
        }
        self.visible().map(AuditEntry::render_row).collect()
    }
}

/// Clamp a requested entry count to `1..=MAX_RECENT_LIMIT`.
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_RECENT_LIMIT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u32) -> AuditEntry {
        AuditEntry {
            timestamp: format!("2026-01-01T00:00:{:02}.000Z", n % 60),
            action: AuditAction::CryptoErase,
            user_id: Some(n),
            detail: format!("entry {n}"),
        }
    }

    #[test]
    fn empty_log_renders_single_placeholder_row() {
        let log = AuditLog::default();
        let rows = log.render_rows();
        assert_eq!(rows, EMPTY_ROW);
        assert_eq!(rows.matches("<tr>").count(), 1);
        assert!(rows.contains("No audit entries yet."));
    }

    #[test]
    fn record_inserts_most_recent_first() {
        let mut log = AuditLog::default();
        log.push(entry(1));
        log.push(entry(2));
        let ids: Vec<_> = log.entries().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
    }

    #[test]
    fn render_is_truncated_to_window_but_all_entries_retained() {
        let mut log = AuditLog::default();
        for n in 1..=20 {
            log.push(entry(n));
        }
        assert_eq!(log.len(), 20);

        let visible: Vec<_> = log.visible().filter_map(|e| e.user_id).collect();
        assert_eq!(visible, (9..=20).rev().collect::<Vec<_>>());

        let rows = log.render_rows();
        assert_eq!(rows.matches("<tr>").count(), DEFAULT_WINDOW);
        assert!(rows.starts_with("<tr><td>2026-01-01T00:00:20.000Z</td>"));
        assert!(!rows.contains("entry 8<"));
    }

    #[test]
    fn fewer_entries_than_window_render_all() {
        let mut log = AuditLog::default();
        for n in 1..=3 {
            log.push(entry(n));
        }
        assert_eq!(log.render_rows().matches("<tr>").count(), 3);
    }

    #[test]
    fn row_renders_dash_for_missing_user() {
        let e = AuditEntry {
            timestamp: "t".to_string(),
            action: AuditAction::RestoreSim,
            user_id: None,
            detail: "d".to_string(),
        };
        assert_eq!(
            e.render_row(),
            "<tr><td>t</td><td>RESTORE_SIM</td><td>-</td><td>d</td></tr>"
        );
    }

    #[test]
    fn row_escapes_detail() {
        let e = AuditEntry {
            timestamp: "t".to_string(),
            action: AuditAction::AddLegalHold,
            user_id: Some(7),
            detail: "Hold active: <script>".to_string(),
        };
        assert!(e.render_row().contains("Hold active: &lt;script&gt;"));
    }

    #[test]
    fn record_stamps_iso_timestamp() {
        let mut log = AuditLog::default();
        let e = log.record(AuditAction::LoadMetrics, None, "x");
        assert!(e.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&e.timestamp).is_ok());
    }

    #[test]
    fn recent_clamps_limit() {
        let mut log = AuditLog::default();
        for n in 1..=5 {
            log.push(entry(n));
        }
        assert_eq!(log.recent(0).len(), 1);
        assert_eq!(log.recent(3).len(), 3);
        assert_eq!(log.recent(10_000).len(), 5);
        assert_eq!(clamp_limit(10_000), MAX_RECENT_LIMIT);
    }

    #[test]
    fn action_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&AuditAction::AddLegalHold).unwrap();
        assert_eq!(json, "\"ADD_LEGAL_HOLD\"");
        assert_eq!(AuditAction::RefreshStatus.to_string(), "REFRESH_STATUS");
    }
}
