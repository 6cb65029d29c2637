//! Display panels of the console.
//!
//! A panel holds plain text. Strings are shown verbatim; structured views are
//! pretty-printed as JSON with 2-space indentation. Every update replaces the
//! panel's previous content.

pub mod views;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

pub use views::PanelView;

/// Panel element ids as they appear in the console pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelId {
    ActiveUser,
    ShadowUser,
    Keys,
    Backups,
    MetricLatency,
    MetricStorage,
    MetricRestore,
}

impl PanelId {
    pub const ALL: [PanelId; 7] = [
        Self::ActiveUser,
        Self::ShadowUser,
        Self::Keys,
        Self::Backups,
        Self::MetricLatency,
        Self::MetricStorage,
        Self::MetricRestore,
    ];

    /// DOM element id.
    pub fn dom_id(&self) -> &'static str {
        match self {
            Self::ActiveUser => "activeUser",
            Self::ShadowUser => "shadowUser",
            Self::Keys => "keys",
            Self::Backups => "backups",
            Self::MetricLatency => "mLatency",
            Self::MetricStorage => "mStorage",
            Self::MetricRestore => "mRestore",
        }
    }

    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.dom_id() == id)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}

/// Render a JSON-like value for display: strings verbatim, everything else
/// pretty-printed.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

/// Render a typed panel view. Struct fields keep their declaration order.
pub fn render_view(view: &PanelView) -> String {
    match view {
        PanelView::Text(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

/// Current text of every panel on the console.
#[derive(Debug, Clone, Default)]
pub struct Panels {
    contents: BTreeMap<PanelId, String>,
}

impl Panels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of `id` with the rendered `view`.
    pub fn show(&mut self, id: PanelId, view: &PanelView) {
        self.contents.insert(id, render_view(view));
    }

    /// Replace the content of the panel named `name` with a rendered JSON
    /// value. Unknown panel names are ignored.
    pub fn show_named(&mut self, name: &str, value: &Value) {
        if let Some(id) = PanelId::from_dom_id(name) {
            self.contents.insert(id, render_value(value));
        }
    }

    /// Text currently shown in `id`; empty if never set.
    pub fn text(&self, id: PanelId) -> &str {
        self.contents.get(&id).map(String::as_str).unwrap_or("")
    }

    /// Text of every panel keyed by DOM id, including unset panels.
    pub fn snapshot(&self) -> BTreeMap<&'static str, String> {
        PanelId::ALL
            .into_iter()
            .map(|id| (id.dom_id(), self.text(id).to_string()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
