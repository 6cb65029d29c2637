//! Console event log: one JSON line per recorded console action.
//!
//! The in-memory audit log only lives as long as the server process. This
//! log keeps a best-effort copy of every entry so `grap audit --local` can
//! show history across restarts.
//!
//! Log file: `~/.grap/events.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::audit::AuditEntry;
use crate::config;

/// Append an audit entry to the event log at `path`.
///
/// Best-effort: failures are silently ignored.
pub fn log_entry(path: &Path, entry: &AuditEntry) {
    let _ = append_entry(path, entry);
}

fn append_entry(path: &Path, entry: &AuditEntry) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read every entry from the event log, most recent first.
///
/// Malformed lines are skipped. A missing or unreadable file yields an empty
/// list.
pub fn read_entries(path: &Path) -> Vec<AuditEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let mut entries: Vec<AuditEntry> = BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<AuditEntry>(&line).ok())
        .collect();
    entries.reverse();
    entries
}

/// Return the path to the event log file.
pub fn events_log_path() -> Option<PathBuf> {
    config::grap_home().map(|dir| dir.join("events.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;

    fn temp_log(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("grap-events-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("events.jsonl")
    }

    #[test]
    fn appended_entries_read_back_newest_first() {
        let path = temp_log("roundtrip");
        log_entry(
            &path,
            &AuditEntry::now(AuditAction::AddLegalHold, Some(4), "Hold active: Court Order"),
        );
        log_entry(&path, &AuditEntry::now(AuditAction::RestoreSim, None, "restore"));

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::RestoreSim);
        assert_eq!(entries[1].user_id, Some(4));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log("malformed");
        log_entry(&path, &AuditEntry::now(AuditAction::RefreshKeys, None, "ok"));
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(read_entries(&path).len(), 1);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_reads_empty() {
        assert!(read_entries(Path::new("/nonexistent/grap/events.jsonl")).is_empty());
    }
}
