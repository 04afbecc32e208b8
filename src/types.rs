use serde::{Deserialize, Serialize};

/// Result of one tool invocation: the text the caller sees, a structured
/// details payload for clients that want more than prose, and an error flag
/// for tool-level failures that are still valid responses (bad action names,
/// missing conditional arguments).
#[derive(Debug, Clone)]
pub(crate) struct ToolExecution {
    pub(crate) output: String,
    pub(crate) details: serde_json::Value,
    pub(crate) is_error: bool,
}

/// One email entry recovered from script output. Only `subject` and the read
/// flag are always present; the other fields depend on which lines the
/// generating script chose to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EmailRecord {
    pub(crate) subject: String,
    pub(crate) is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) preview: Option<String>,
}

impl EmailRecord {
    pub(crate) fn new(subject: String, is_read: bool) -> Self {
        EmailRecord {
            subject,
            is_read,
            sender: None,
            date: None,
            preview: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ToolLogEntry {
    pub(crate) ts: String,
    pub(crate) tool: String,
    pub(crate) duration_ms: u64,
    pub(crate) ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}
