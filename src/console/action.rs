use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A console action, one per form or button on the console pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateUser,
    DestroyKeys,
    RestoreSim,
    AddHold,
    ReleaseHold,
    ProtectBackups,
    LookupBackups,
    RefreshUser,
    RefreshKeys,
    LoadMetrics,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Self::CreateUser,
        Self::DestroyKeys,
        Self::RestoreSim,
        Self::AddHold,
        Self::ReleaseHold,
        Self::ProtectBackups,
        Self::LookupBackups,
        Self::RefreshUser,
        Self::RefreshKeys,
        Self::LoadMetrics,
    ];

    /// Route name, as in `POST /api/actions/<name>`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateUser => "create-user",
            Self::DestroyKeys => "destroy-keys",
            Self::RestoreSim => "restore-sim",
            Self::AddHold => "add-hold",
            Self::ReleaseHold => "release-hold",
            Self::ProtectBackups => "protect-backups",
            Self::LookupBackups => "lookup-backups",
            Self::RefreshUser => "refresh-user",
            Self::RefreshKeys => "refresh-keys",
            Self::LoadMetrics => "load-metrics",
        }
    }

    /// Id of the page element that triggers the action.
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::CreateUser => "createUserForm",
            Self::DestroyKeys => "btnDestroyKeys",
            Self::RestoreSim => "btnRestoreSim",
            Self::AddHold => "btnAddHold",
            Self::ReleaseHold => "btnReleaseHold",
            Self::ProtectBackups => "btnProtectBackups",
            Self::LookupBackups => "btnLookupBackups",
            Self::RefreshUser => "btnRefreshUser",
            Self::RefreshKeys => "btnRefreshKeys",
            Self::LoadMetrics => "btnLoadLocalCSVs",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// User id as submitted: a number from the CLI or text from a form input.
/// Anything else (floats, booleans, objects) is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawUserId {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl RawUserId {
    /// The positive user id this value denotes, if any. Blank, non-numeric,
    /// zero, and negative inputs resolve to `None`.
    pub fn resolve(&self) -> Option<u32> {
        let id = match self {
            Self::Number(n) => u32::try_from(*n).ok()?,
            Self::Text(s) => s.trim().parse::<u32>().ok()?,
            Self::Other(_) => return None,
        };
        (id > 0).then_some(id)
    }
}

/// Form fields submitted with an action. Absent fields are blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionInput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RawUserId>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>(), Ok(action));
        }
        assert_eq!("ADD_HOLD".parse::<Action>(), Ok(Action::AddHold));
        assert!("format-disk".parse::<Action>().is_err());
    }

    #[test]
    fn raw_user_id_resolution() {
        assert_eq!(RawUserId::Text("12".into()).resolve(), Some(12));
        assert_eq!(RawUserId::Text(" 12 ".into()).resolve(), Some(12));
        assert_eq!(RawUserId::Text("".into()).resolve(), None);
        assert_eq!(RawUserId::Text("abc".into()).resolve(), None);
        assert_eq!(RawUserId::Text("0".into()).resolve(), None);
        assert_eq!(RawUserId::Number(-3).resolve(), None);
        assert_eq!(RawUserId::Number(5).resolve(), Some(5));
    }

    #[test]
    fn input_accepts_numeric_or_text_user_id() {
        let input: ActionInput = serde_json::from_str(r#"{"user_id": 4}"#).unwrap();
        assert_eq!(input.user_id, Some(RawUserId::Number(4)));

        let input: ActionInput =
            serde_json::from_str(r#"{"user_id": "4", "reason": "Audit"}"#).unwrap();
        assert_eq!(input.user_id, Some(RawUserId::Text("4".into())));
        assert_eq!(input.reason, "Audit");
        assert!(input.full_name.is_empty());
    }

    #[test]
    fn non_integer_user_id_is_accepted_and_unresolved() {
        for raw in [r#"{"user_id": 4.0}"#, r#"{"user_id": true}"#, r#"{"user_id": [4]}"#] {
            let input: ActionInput = serde_json::from_str(raw).unwrap();
            let user_id = input.user_id.unwrap();
            assert!(matches!(user_id, RawUserId::Other(_)), "{raw}");
            assert_eq!(user_id.resolve(), None, "{raw}");
        }
    }

    #[test]
    fn empty_input_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&ActionInput::default()).unwrap(), "{}");
    }
}
