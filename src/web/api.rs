//! JSON API handlers for the web console.
//!
//! Every response uses the same envelope:
//! `{ "ok": bool, "data"?: ..., "error"?: "...", "details"?: "..." }`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::audit::{self, AuditEntry};
use crate::console::{Action, ActionInput, Console, Snapshot};

use super::Reply;

/// Path prefix of the action endpoints: `POST /api/actions/<name>`.
pub const ACTIONS_PREFIX: &str = "/api/actions/";

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
            details,
        }
    }
}

/// Result of an action: what was run plus the new console state.
#[derive(Debug, Serialize)]
struct ActionResponse {
    action: &'static str,
    #[serde(flatten)]
    snapshot: Snapshot,
}

/// Audit API response.
#[derive(Debug, Serialize)]
struct AuditResponse {
    limit: usize,
    total: usize,
    rows: Vec<AuditEntry>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a 200 JSON response wrapping `data` in the success envelope.
fn json_ok<T: Serialize>(data: T) -> Result<Reply> {
    let body = serde_json::to_string(&ApiResponse::ok(data))
        .context("failed to serialize JSON response")?;
    Ok(Reply::json(200, body))
}

/// Build an error envelope with the given status.
pub fn error_reply(status: u16, error: &str, details: Option<String>) -> Reply {
    let body = serde_json::to_string(&ApiResponse::err(error, details))
        .unwrap_or_else(|_| format!(r#"{{"ok":false,"error":"{error}"}}"#));
    Reply::json(status, body)
}

/// Parse the `?limit=N` query parameter from a URL, already clamped to
/// `1..=MAX_RECENT_LIMIT`. Negative values clamp to 1 and values past the
/// integer range clamp to the maximum.
fn parse_limit_param(url: &str) -> Option<usize> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "limit" { parse_limit(v) } else { None }
    })
}

fn parse_limit(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.starts_with('-') {
        return Some(audit::clamp_limit(0));
    }
    let limit = digits.parse::<usize>().unwrap_or(usize::MAX);
    Some(audit::clamp_limit(limit))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/ping` — liveness check.
pub fn ping() -> Result<Reply> {
    json_ok("pong")
}

/// `GET /api/state` — current panels and audit table.
pub fn get_state(console: &Console) -> Result<Reply> {
    json_ok(console.snapshot())
}

/// `GET /api/audit?limit=N` — most recent retained audit entries.
///
/// `limit` defaults to 50 and is clamped to `1..=500`.
pub fn get_audit(console: &Console, url: &str) -> Result<Reply> {
    let limit = audit::clamp_limit(parse_limit_param(url).unwrap_or(audit::DEFAULT_RECENT_LIMIT));
    json_ok(AuditResponse {
        limit,
        total: console.audit().len(),
        rows: console.audit().recent(limit),
    })
}

/// `POST /api/actions/<name>` — run a console action.
///
/// Expects a JSON body of form fields, e.g. `{ "user_id": "3", "reason": "Court Order" }`.
/// An empty body means every field is blank. A body that is not valid UTF-8
/// JSON is rejected and nothing is recorded.
pub fn post_action(console: &mut Console, name: &str, body: &[u8]) -> Result<Reply> {
    let action: Action = match name.parse() {
        Ok(action) => action,
        Err(details) => return Ok(error_reply(404, "unknown action", Some(details))),
    };

    let input: ActionInput = if body.trim_ascii().is_empty() {
        ActionInput::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(input) => input,
            Err(e) => {
                return Ok(error_reply(
                    400,
                    "invalid JSON in action request",
                    Some(e.to_string()),
                ));
            }
        }
    };

    console.perform(action, &input);

    json_ok(ActionResponse {
        action: action.name(),
        snapshot: console.snapshot(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::config::ConsoleConfig;

    fn console() -> Console {
        Console::with_seed(ConsoleConfig::default(), 11)
    }

    fn body(reply: &Reply) -> Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn parse_limit_param_extracts_value() {
        assert_eq!(parse_limit_param("/api/audit?limit=7"), Some(7));
        assert_eq!(parse_limit_param("/api/audit?x=1&limit=30"), Some(30));
        assert_eq!(parse_limit_param("/api/audit"), None);
        assert_eq!(parse_limit_param("/api/audit?limit=abc"), None);
    }

    #[test]
    fn out_of_range_limits_are_clamped() {
        assert_eq!(parse_limit_param("/api/audit?limit=-5"), Some(1));
        assert_eq!(parse_limit_param("/api/audit?limit=0"), Some(1));
        assert_eq!(parse_limit_param("/api/audit?limit=501"), Some(500));
        assert_eq!(
            parse_limit_param("/api/audit?limit=99999999999999999999999"),
            Some(500)
        );
        assert_eq!(parse_limit_param("/api/audit?limit=-"), None);
        assert_eq!(parse_limit_param("/api/audit?limit="), None);
    }

    #[test]
    fn negative_audit_limit_returns_one_row() {
        let mut c = console();
        for _ in 0..5 {
            c.refresh_user();
        }
        let json = body(&get_audit(&c, "/api/audit?limit=-5").unwrap());
        assert_eq!(json["data"]["limit"], 1);
        assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 1);

        let json = body(&get_audit(&c, "/api/audit?limit=99999999999999999999999").unwrap());
        assert_eq!(json["data"]["limit"], 500);
        assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn non_utf8_body_is_rejected_without_recording() {
        let mut c = console();
        let reply = post_action(&mut c, "destroy-keys", b"{\"user_id\": \"\xff\xfe\"}").unwrap();
        assert_eq!(reply.status, 400);
        assert_eq!(body(&reply)["error"], "invalid JSON in action request");
        assert!(c.audit().is_empty());
        assert_eq!(c.panels().snapshot()["keys"], "");
    }

    #[test]
    fn float_user_id_falls_back_to_default() {
        let mut c = console();
        let reply = post_action(&mut c, "release-hold", br#"{"user_id": 4.0}"#).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(c.audit().entries().next().unwrap().user_id, Some(1));
    }

    #[test]
    fn whitespace_body_uses_blank_fields() {
        let mut c = console();
        let reply = post_action(&mut c, "refresh-keys", b" \n").unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(c.audit().len(), 1);
    }

    #[test]
    fn ping_returns_pong_envelope() {
        assert_eq!(ping().unwrap().body, r#"{"ok":true,"data":"pong"}"#);
    }

    #[test]
    fn action_returns_panels_and_rows() {
        let mut c = console();
        let reply = post_action(&mut c, "lookup-backups", br#"{"user_id": 2}"#).unwrap();
        let json = body(&reply);
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"]["action"], "lookup-backups");
        assert!(json["data"]["panels"]["backups"]
            .as_str()
            .unwrap()
            .contains("\"backup_type\": \"FULL\""));
        assert!(json["data"]["audit_html"]
            .as_str()
            .unwrap()
            .contains("<td>LOOKUP_BACKUPS</td><td>2</td>"));
    }

    #[test]
    fn empty_body_uses_blank_fields() {
        let mut c = console();
        post_action(&mut c, "release-hold", b"").unwrap();
        assert_eq!(c.audit().entries().next().unwrap().user_id, Some(1));
    }

    #[test]
    fn invalid_json_is_rejected_without_recording() {
        let mut c = console();
        let reply = post_action(&mut c, "add-hold", b"{not json").unwrap();
        assert_eq!(reply.status, 400);
        assert_eq!(body(&reply)["error"], "invalid JSON in action request");
        assert!(c.audit().is_empty());
    }

    #[test]
    fn unknown_action_is_404() {
        let mut c = console();
        let reply = post_action(&mut c, "drop-tables", b"{}").unwrap();
        assert_eq!(reply.status, 404);
        assert_eq!(body(&reply)["details"], "unknown action 'drop-tables'");
    }

    #[test]
    fn audit_limit_is_clamped() {
        let mut c = console();
        for _ in 0..3 {
            c.refresh_keys();
        }

        let json = body(&get_audit(&c, "/api/audit?limit=0").unwrap());
        assert_eq!(json["data"]["limit"], 1);
        assert_eq!(json["data"]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["total"], 3);

        let json = body(&get_audit(&c, "/api/audit?limit=9999").unwrap());
        assert_eq!(json["data"]["limit"], 500);

        let json = body(&get_audit(&c, "/api/audit").unwrap());
        assert_eq!(json["data"]["limit"], 50);
        assert_eq!(json["data"]["rows"][0]["action"], "REFRESH_KEYS");
    }

    #[test]
    fn state_lists_every_panel() {
        let json = body(&get_state(&console()).unwrap());
        let panels = json["data"]["panels"].as_object().unwrap();
        for id in [
            "activeUser",
            "shadowUser",
            "keys",
            "backups",
            "mLatency",
            "mStorage",
            "mRestore",
        ] {
            assert!(panels.contains_key(id), "{id}");
        }
    }
}
