//! Embedded HTML/CSS/JS frontend for the grap console.
//!
//! Pages are rendered on the server from the current [`Console`] state; the
//! page script only posts actions and swaps in the returned panel text and
//! audit rows. No external assets, no build tools, no CDN dependencies.

use crate::console::{Action, Console};
use crate::nav;
use crate::panel::PanelId;
use crate::utils::html;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// A console page. All pages share the navigation bar and the audit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Users,
    Holds,
    Reports,
}

impl Page {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Users => "index.html",
            Self::Holds => "holds.html",
            Self::Reports => "reports.html",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Users => "Users & Keys",
            Self::Holds => "Legal Holds & Backups",
            Self::Reports => "Reports",
        }
    }

    /// Resolve the page served at `path`. Only top-level routes match;
    /// `/` is the index page.
    pub fn from_path(path: &str) -> Option<Self> {
        let name = match path.strip_prefix('/')? {
            "" => nav::DEFAULT_PAGE,
            name => name,
        };
        [Self::Users, Self::Holds, Self::Reports]
            .into_iter()
            .find(|p| p.file_name() == name)
    }
}

/// Render a complete console page for the request `path`.
pub fn render_page(page: Page, path: &str, console: &Console) -> String {
    let nav_html = nav::render(&nav::highlight(path, nav::CONSOLE_LINKS));
    let body = match page {
        Page::Users => users_page(console),
        Page::Holds => holds_page(console),
        Page::Reports => reports_page(console),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>grap console · {title}</title>
<style>{style}</style>
</head>
<body>
<div class="app">
<header>
  <h1><span class="logo">grap</span> Compliance Console</h1>
  <span class="subtitle">Simulated actions, nothing leaves this page</span>
</header>
{nav_html}
{body}
<section class="card">
  <h2>Audit Log</h2>
  <table id="auditTable">
    <thead><tr><th>Time</th><th>Action</th><th>User</th><th>Detail</th></tr></thead>
    <tbody>{audit_rows}</tbody>
  </table>
</section>
</div>
<script src="/assets/app.js"></script>
</body>
</html>
"##,
        title = page.title(),
        style = STYLE,
        nav_html = nav_html,
        body = body,
        audit_rows = console.audit().render_rows(),
    )
}

fn panel(console: &Console, id: PanelId) -> String {
    format!(
        r#"<pre class="panel" id="{}">{}</pre>"#,
        id.dom_id(),
        html::escape(console.panels().text(id))
    )
}

fn button(action: Action, label: &str, extra: &str) -> String {
    format!(
        r#"<button type="button" id="{}" data-action="{}"{}>{}</button>"#,
        action.element_id(),
        action.name(),
        extra,
        label
    )
}

fn users_page(console: &Console) -> String {
    format!(
        r#"<div class="grid">
<section class="card">
  <h2>Create User</h2>
  <form id="{form_id}" data-action="{form_action}">
    <label>Full name <input id="fullName" name="full_name" required></label>
    <label>Email <input id="email" name="email" type="email" required></label>
    <label>Phone <input id="phone" name="phone"></label>
    <button type="submit">Create</button>
  </form>
</section>
<section class="card">
  <h2>Crypto-Erase</h2>
  <label>User id <input id="eraseUserId" type="number" min="1" placeholder="1"></label>
  <div class="actions">
    {destroy}
    {restore}
  </div>
</section>
</div>
<div class="grid">
<section class="card">
  <h2>Active User <small>users</small></h2>
  {active}
  <div class="actions">{refresh_user}</div>
</section>
<section class="card">
  <h2>Shadow Row <small>users_shadow</small></h2>
  {shadow}
</section>
<section class="card">
  <h2>Keys <small>key_store</small></h2>
  {keys}
  <div class="actions">{refresh_keys}</div>
</section>
</div>"#,
        form_id = Action::CreateUser.element_id(),
        form_action = Action::CreateUser.name(),
        destroy = button(
            Action::DestroyKeys,
            "Destroy keys",
            r#" class="danger" data-user-field="eraseUserId""#
        ),
        restore = button(Action::RestoreSim, "Simulate restore", ""),
        active = panel(console, PanelId::ActiveUser),
        refresh_user = button(Action::RefreshUser, "Refresh", ""),
        shadow = panel(console, PanelId::ShadowUser),
        keys = panel(console, PanelId::Keys),
        refresh_keys = button(Action::RefreshKeys, "Refresh", ""),
    )
}

fn holds_page(console: &Console) -> String {
    let hold_fields = r#" data-user-field="holdUserId" data-reason-field="holdReason""#;
    let user_field = r#" data-user-field="holdUserId""#;
    format!(
        r#"<div class="grid">
<section class="card">
  <h2>Legal Hold</h2>
  <label>User id <input id="holdUserId" type="number" min="1" placeholder="1"></label>
  <label>Reason <input id="holdReason" placeholder="Court Order"></label>
  <div class="actions">
    {add}
    {release}
  </div>
</section>
<section class="card">
  <h2>Backups</h2>
  <div class="actions">
    {protect}
    {lookup}
  </div>
  {backups}
</section>
</div>"#,
        add = button(Action::AddHold, "Place hold", hold_fields),
        release = button(Action::ReleaseHold, "Release hold", user_field),
        protect = button(Action::ProtectBackups, "Protect backups", user_field),
        lookup = button(Action::LookupBackups, "Lookup backups", user_field),
        backups = panel(console, PanelId::Backups),
    )
}

fn reports_page(console: &Console) -> String {
    format!(
        r#"<section class="card">
  <h2>Metrics</h2>
  <div class="actions">{load}</div>
  <div class="stats-grid">
    <div class="stat-card"><div class="label">Lookup latency</div>{latency}</div>
    <div class="stat-card"><div class="label">Storage overhead</div>{storage}</div>
    <div class="stat-card"><div class="label">Restore</div>{restore}</div>
  </div>
</section>"#,
        load = button(Action::LoadMetrics, "Load local CSVs", ""),
        latency = metric(console, PanelId::MetricLatency),
        storage = metric(console, PanelId::MetricStorage),
        restore = metric(console, PanelId::MetricRestore),
    )
}

fn metric(console: &Console, id: PanelId) -> String {
    format!(
        r#"<div class="value" id="{}">{}</div>"#,
        id.dom_id(),
        html::escape(console.panels().text(id))
    )
}

// ---------------------------------------------------------------------------
// Static assets
// ---------------------------------------------------------------------------

const STYLE: &str = r#"
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1200px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: baseline; justify-content: space-between; margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }
nav.nav { display: flex; gap: 4px; margin-bottom: 24px; background: var(--surface); border-radius: var(--radius); padding: 4px; border: 1px solid var(--border); }
nav.nav a { flex: 1; text-align: center; padding: 8px 16px; border-radius: 6px; color: var(--text-muted); text-decoration: none; font-size: 13px; font-weight: 500; }
nav.nav a:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav.nav a.active { background: var(--accent); color: #fff; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; margin-bottom: 16px; }
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card h2 small { color: var(--text-muted); font-family: var(--mono); font-weight: 400; margin-left: 6px; }
label { display: block; color: var(--text-muted); font-size: 12px; margin-bottom: 10px; }
input { display: block; width: 100%; margin-top: 4px; padding: 6px 10px; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; }
button { padding: 6px 14px; border: 1px solid var(--border); border-radius: 6px; background: var(--bg); color: var(--text); cursor: pointer; font-size: 13px; }
button:hover { border-color: var(--accent); }
button.danger { border-color: var(--red); color: var(--red); }
.actions { display: flex; gap: 8px; margin: 12px 0; }
pre.panel { min-height: 48px; padding: 12px; background: var(--bg); border: 1px solid var(--border); border-radius: 6px; font-family: var(--mono); font-size: 12px; white-space: pre-wrap; }
.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; }
.stat-card { background: var(--bg); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; text-align: center; }
.stat-card .label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }
.stat-card .value { font-family: var(--mono); color: var(--accent); margin-top: 6px; min-height: 20px; }
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; letter-spacing: 0.5px; }
td.muted { color: var(--text-muted); text-align: center; }
"#;

/// Page script: JSON helper, panel writer, and action wiring.
pub const APP_JS: &str = r##"// grap console
async function apiJson(path, options = {}) {
  const res = await fetch(path, {
    ...options,
    headers: { "Content-Type": "application/json", ...(options.headers || {}) },
  });

  const text = await res.text();
  let data;
  try { data = text ? JSON.parse(text) : null; }
  catch { data = { raw: text }; }

  if (!res.ok) {
    const err = new Error(`HTTP ${res.status}`);
    err.payload = data;
    throw err;
  }
  return data;
}

function setPanel(id, value) {
  const el = document.getElementById(id);
  if (!el) return;
  el.textContent = typeof value === "string" ? value : JSON.stringify(value, null, 2);
}

function fieldValue(id) {
  const el = id ? document.getElementById(id) : null;
  return el ? el.value.trim() : "";
}

function applySnapshot(data) {
  for (const [id, text] of Object.entries(data.panels || {})) {
    setPanel(id, text);
  }
  const tbody = document.querySelector("#auditTable tbody");
  if (tbody && typeof data.audit_html === "string") tbody.innerHTML = data.audit_html;
}

async function runAction(action, fields) {
  try {
    const res = await apiJson(`/api/actions/${action}`, {
      method: "POST",
      body: JSON.stringify(fields),
    });
    applySnapshot(res.data);
  } catch (err) {
    console.error(err.message, err.payload);
  }
}

document.querySelectorAll("button[data-action]").forEach((btn) => {
  btn.addEventListener("click", () => {
    const fields = {};
    const userId = fieldValue(btn.dataset.userField);
    if (userId) fields.user_id = userId;
    const reason = fieldValue(btn.dataset.reasonField);
    if (reason) fields.reason = reason;
    runAction(btn.dataset.action, fields);
  });
});

document.querySelectorAll("form[data-action]").forEach((form) => {
  form.addEventListener("submit", async (e) => {
    e.preventDefault();
    const fields = Object.fromEntries(new FormData(form).entries());
    await runAction(form.dataset.action, fields);
    form.reset();
  });
});
"##;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
