//! Simulated compliance console.
//!
//! Each action reads its form fields, fabricates the result a real
//! compliance backend *would* produce, updates the affected panels, and
//! records exactly one audit entry. Nothing is persisted and no action can
//! fail.

mod action;

use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::audit::{AuditAction, AuditLog};
use crate::config::{ConsoleConfig, GrapConfig};
use crate::events;
use crate::panel::views::{
    ActiveUserView, BackupProtection, BackupRef, BackupsView, KeyEntry, KeysView, ShadowUserView,
};
use crate::panel::{PanelId, PanelView, Panels};

pub use action::{Action, ActionInput, RawUserId};

/// Range of the fabricated user ids handed out by `create_user`.
pub const SIMULATED_USER_IDS: std::ops::RangeInclusive<u32> = 1..=900;

/// Fields of the create-user form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl NewUser {
    /// Build from raw form values, trimming whitespace.
    pub fn from_form(full_name: &str, email: &str, phone: &str) -> Self {
        Self {
            full_name: full_name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        }
    }
}

/// Panel text and rendered audit rows after an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub panels: BTreeMap<&'static str, String>,
    pub audit_html: String,
}

/// Console session state: audit log, panels, and the id generator.
///
/// Lives from server start to shutdown and is only touched by the request
/// loop, one action at a time.
pub struct Console {
    audit: AuditLog,
    panels: Panels,
    rng: StdRng,
    settings: ConsoleConfig,
    event_log: Option<PathBuf>,
}

impl Console {
    /// A console without an event log.
    pub fn new(settings: ConsoleConfig) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// A console with a deterministic id sequence.
    pub fn with_seed(settings: ConsoleConfig, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: ConsoleConfig, rng: StdRng) -> Self {
        Self {
            audit: AuditLog::new(settings.audit_window),
            panels: Panels::new(),
            rng,
            settings,
            event_log: None,
        }
    }

    /// Build the console from the resolved config, enabling the event log
    /// when configured.
    pub fn from_config(config: &GrapConfig) -> Self {
        let mut console = Self::new(config.console.clone());
        if config.logging.event_log {
            console.event_log = events::events_log_path();
        }
        console
    }

    /// Also append every recorded entry to the JSONL log at `path`.
    pub fn with_event_log(mut self, path: PathBuf) -> Self {
        self.event_log = Some(path);
        self
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            panels: self.panels.snapshot(),
            audit_html: self.audit.render_rows(),
        }
    }

    /// Run `action` with the submitted form fields.
    pub fn perform(&mut self, action: Action, input: &ActionInput) {
        match action {
            Action::CreateUser => {
                let user = NewUser::from_form(&input.full_name, &input.email, &input.phone);
                self.create_user(&user);
            }
            Action::DestroyKeys => {
                let uid = self.user_id(input);
                self.destroy_keys(uid);
            }
            Action::RestoreSim => self.restore_sim(),
            Action::AddHold => {
                let uid = self.user_id(input);
                let reason = self.hold_reason(input);
                self.add_hold(uid, &reason);
            }
            Action::ReleaseHold => {
                let uid = self.user_id(input);
                self.release_hold(uid);
            }
            Action::ProtectBackups => {
                let uid = self.user_id(input);
                self.protect_backups(uid);
            }
            Action::LookupBackups => {
                let uid = self.user_id(input);
                self.lookup_backups(uid);
            }
            Action::RefreshUser => self.refresh_user(),
            Action::RefreshKeys => self.refresh_keys(),
            Action::LoadMetrics => self.load_metrics(),
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Insert a user and show the rows the database triggers would write.
    /// Returns the fabricated user id.
    pub fn create_user(&mut self, user: &NewUser) -> u32 {
        let user_id = self.rng.gen_range(SIMULATED_USER_IDS);

        self.show(
            PanelId::ActiveUser,
            PanelView::ActiveUser(ActiveUserView {
                user_id,
                full_name: user.full_name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                table: "users".to_string(),
            }),
        );
        self.show(
            PanelId::ShadowUser,
            PanelView::ShadowUser(ShadowUserView {
                user_id,
                email_enc: "<ciphertext>".to_string(),
                table: "users_shadow".to_string(),
            }),
        );
        let keys = ["name", "email", "phone"]
            .into_iter()
            .map(|purpose| KeyEntry {
                purpose: purpose.to_string(),
                destroyed_at: None,
            })
            .collect();
        self.show(PanelId::Keys, PanelView::Keys(KeysView::Entries(keys)));

        self.record(
            AuditAction::CreateUser,
            Some(user_id),
            "Inserted into users; trigger would write users_shadow + key_store.",
        );
        user_id
    }

    /// Crypto-erase: destroy the user's field keys.
    pub fn destroy_keys(&mut self, user_id: u32) {
        self.record(
            AuditAction::CryptoErase,
            Some(user_id),
            "Would call destroy_user_keys(user_id) and write deletion_audit.",
        );
        self.show(
            PanelId::Keys,
            PanelView::Keys(KeysView::Destroyed {
                user_id,
                status: "DESTROYED (simulated)".to_string(),
            }),
        );
    }

    /// Truncate `users` and rebuild it from the shadow table.
    pub fn restore_sim(&mut self) {
        self.record(
            AuditAction::RestoreSim,
            None,
            "Would truncate users and run restore_users_from_shadow().",
        );
        self.show(
            PanelId::ActiveUser,
            PanelView::text("Restore complete (simulated). Redacted rows shown for deleted users."),
        );
    }

    pub fn add_hold(&mut self, user_id: u32, reason: &str) {
        self.record(
            AuditAction::AddLegalHold,
            Some(user_id),
            format!("Hold active: {reason}"),
        );
    }

    pub fn release_hold(&mut self, user_id: u32) {
        self.record(AuditAction::ReleaseHold, Some(user_id), "Released legal hold.");
    }

    /// Flag the backups containing the user as protected by the hold.
    pub fn protect_backups(&mut self, user_id: u32) {
        self.record(
            AuditAction::ProtectBackups,
            Some(user_id),
            "Would call protect_backups_for_legal_hold(user_id).",
        );
        self.show(
            PanelId::Backups,
            PanelView::Backups(BackupsView::Protection(vec![
                BackupProtection {
                    backup_id: 1,
                    protected_by_hold: true,
                },
                BackupProtection {
                    backup_id: 2,
                    protected_by_hold: false,
                },
            ])),
        );
    }

    /// List backups that contain the user's data.
    pub fn lookup_backups(&mut self, user_id: u32) {
        self.record(
            AuditAction::LookupBackups,
            Some(user_id),
            "Would query backup_user_index to list impacted backups.",
        );
        self.show(
            PanelId::Backups,
            PanelView::Backups(BackupsView::Impacted(vec![BackupRef {
                backup_id: 1,
                backup_type: "FULL".to_string(),
            }])),
        );
    }

    pub fn refresh_user(&mut self) {
        self.record(
            AuditAction::RefreshStatus,
            None,
            "Would refresh active/shadow/keys panels from API.",
        );
    }

    pub fn refresh_keys(&mut self) {
        self.record(
            AuditAction::RefreshKeys,
            None,
            "Would refresh key_store state from API.",
        );
    }

    /// Fill the metric panels with example values.
    pub fn load_metrics(&mut self) {
        self.show(
            PanelId::MetricLatency,
            PanelView::text("ON: 4.2ms vs OFF: 1.1ms (example)"),
        );
        self.show(
            PanelId::MetricStorage,
            PanelView::text("shadow 2.3× users (example)"),
        );
        self.show(
            PanelId::MetricRestore,
            PanelView::text("1000 restored / 300 redacted (example)"),
        );
        self.record(
            AuditAction::LoadMetrics,
            None,
            "Would load CSV metrics and show charts.",
        );
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn show(&mut self, id: PanelId, view: PanelView) {
        self.panels.show(id, &view);
    }

    fn record(&mut self, action: AuditAction, user_id: Option<u32>, detail: impl Into<String>) {
        let entry = self.audit.record(action, user_id, detail);
        if let Some(path) = &self.event_log {
            events::log_entry(path, entry);
        }
    }

    fn user_id(&self, input: &ActionInput) -> u32 {
        input
            .user_id
            .as_ref()
            .and_then(RawUserId::resolve)
            .unwrap_or(self.settings.default_user_id)
    }

    fn hold_reason(&self, input: &ActionInput) -> String {
        match input.reason.trim() {
            "" => self.settings.default_hold_reason.clone(),
            reason => reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
