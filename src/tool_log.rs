use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;

use crate::ToolLogEntry;

/// Append one invocation entry to the dated JSONL log.
pub(crate) fn append_tool_log(
    log_dir: &Path,
    entry: &ToolLogEntry,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(log_dir)?;
    let date_str = Utc::now().format("%Y-%m-%d");
    let path = log_dir.join(format!("tools-{}.jsonl", date_str));
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> std::path::PathBuf {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("mailpilot-log-{}-{seq}", std::process::id()))
    }

    #[test]
    fn appends_one_line_per_entry() {
        let dir = scratch_dir();
        let entry = ToolLogEntry {
            ts: "2024-01-01T00:00:00Z".to_string(),
            tool: "list_accounts".to_string(),
            duration_ms: 42,
            ok: true,
            error: None,
        };
        append_tool_log(&dir, &entry).expect("append");
        append_tool_log(&dir, &entry).expect("append");

        let files: Vec<_> = fs::read_dir(&dir)
            .expect("dir")
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(files[0].path()).expect("read");
        assert_eq!(content.lines().count(), 2);
        let parsed: ToolLogEntry =
            serde_json::from_str(content.lines().next().expect("line")).expect("json");
        assert_eq!(parsed.tool, "list_accounts");
        assert!(parsed.ok);
        let _ = fs::remove_dir_all(&dir);
    }
}
