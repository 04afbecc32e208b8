use serde_json;

fn base_tool_definitions() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "name": "list_inbox_emails",
            "description": "List inbox emails across all accounts or a specific account, with subject, sender, date, and read status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string", "description": "Account name to filter (e.g. \"Work\"); omit for all accounts" },
                    "max_emails": { "type": "integer", "description": "Maximum emails per account (0 = all)" },
                    "include_read": { "type": "boolean", "description": "Include read emails (default true)" }
                }
            }
        }),
        serde_json::json!({
            "name": "get_email_with_content",
            "description": "Search emails by subject keyword and return them with a content preview.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "max_results": { "type": "integer" },
                    "max_content_length": { "type": "integer", "description": "Preview length in characters (0 = unlimited)" },
                    "mailbox": { "type": "string", "description": "Mailbox to search (default INBOX, \"All\" for every mailbox)" }
                },
                "required": ["account", "subject_keyword"]
            }
        }),
        serde_json::json!({
            "name": "get_unread_count",
            "description": "Unread email count for each account.",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
        serde_json::json!({
            "name": "list_accounts",
            "description": "List all Mail accounts.",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
        serde_json::json!({
            "name": "get_recent_emails",
            "description": "Most recent inbox emails from one account.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "count": { "type": "integer" },
                    "include_content": { "type": "boolean", "description": "Include a content preview (slower)" }
                },
                "required": ["account"]
            }
        }),
        serde_json::json!({
            "name": "list_mailboxes",
            "description": "List mailboxes (folders) with optional message counts; nested mailboxes show their path form.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "include_counts": { "type": "boolean" }
                }
            }
        }),
        serde_json::json!({
            "name": "move_email",
            "description": "Move emails matching a subject keyword to another mailbox. Nested destinations use '/' (e.g. \"Projects/Client\").",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "to_mailbox": { "type": "string" },
                    "from_mailbox": { "type": "string" },
                    "max_moves": { "type": "integer", "description": "Safety cap (default 1)" }
                },
                "required": ["account", "subject_keyword", "to_mailbox"]
            }
        }),
        serde_json::json!({
            "name": "reply_to_email",
            "description": "Reply to the first email matching a subject keyword. Dry run unless confirm=true.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "reply_body": { "type": "string" },
                    "reply_to_all": { "type": "boolean" },
                    "confirm": { "type": "boolean", "description": "false previews, true sends" }
                },
                "required": ["account", "subject_keyword", "reply_body"]
            }
        }),
        serde_json::json!({
            "name": "compose_email",
            "description": "Compose a new email from an account. Dry run unless confirm=true.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "to": { "type": "string", "description": "Comma-separated recipients" },
                    "subject": { "type": "string" },
                    "body": { "type": "string" },
                    "cc": { "type": "string" },
                    "bcc": { "type": "string" },
                    "confirm": { "type": "boolean" }
                },
                "required": ["account", "to", "subject", "body"]
            }
        }),
        serde_json::json!({
            "name": "list_email_attachments",
            "description": "List attachments (names and sizes) of emails matching a subject keyword.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "max_results": { "type": "integer" }
                },
                "required": ["account", "subject_keyword"]
            }
        }),
        serde_json::json!({
            "name": "save_email_attachment",
            "description": "Save a named attachment from a matching email to disk.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "attachment_name": { "type": "string" },
                    "save_path": { "type": "string" }
                },
                "required": ["account", "subject_keyword", "attachment_name", "save_path"]
            }
        }),
        serde_json::json!({
            "name": "get_inbox_overview",
            "description": "Full inbox status: unread counts per account, mailbox structure, recent emails, suggested actions.",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
        serde_json::json!({
            "name": "search_emails",
            "description": "Search any mailbox with combined filters: subject, sender, attachments, read status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "mailbox": { "type": "string", "description": "Default INBOX; \"All\" searches every mailbox" },
                    "subject_keyword": { "type": "string" },
                    "sender": { "type": "string" },
                    "has_attachments": { "type": "boolean" },
                    "read_status": { "type": "string", "description": "all, read, or unread" },
                    "include_content": { "type": "boolean" },
                    "max_results": { "type": "integer" }
                },
                "required": ["account"]
            }
        }),
        serde_json::json!({
            "name": "update_email_status",
            "description": "Mark emails read/unread or flag/unflag them, filtered by subject or sender.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "action": { "type": "string", "description": "mark_read, mark_unread, flag, or unflag" },
                    "subject_keyword": { "type": "string" },
                    "sender": { "type": "string" },
                    "mailbox": { "type": "string" },
                    "max_updates": { "type": "integer", "description": "Safety cap (default 10)" }
                },
                "required": ["account", "action"]
            }
        }),
        serde_json::json!({
            "name": "manage_trash",
            "description": "Move emails to trash, permanently delete from trash, or empty the trash. Destructive actions need confirm=true.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "action": { "type": "string", "description": "move_to_trash, delete_permanent, or empty_trash" },
                    "subject_keyword": { "type": "string" },
                    "sender": { "type": "string" },
                    "mailbox": { "type": "string" },
                    "max_deletes": { "type": "integer", "description": "Safety cap (default 5)" },
                    "confirm": { "type": "boolean" }
                },
                "required": ["account", "action"]
            }
        }),
        serde_json::json!({
            "name": "forward_email",
            "description": "Forward the first matching email, optionally prefixed with a message. Dry run unless confirm=true.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "to": { "type": "string" },
                    "message": { "type": "string" },
                    "mailbox": { "type": "string" },
                    "confirm": { "type": "boolean" }
                },
                "required": ["account", "subject_keyword", "to"]
            }
        }),
        serde_json::json!({
            "name": "get_email_thread",
            "description": "Collect a conversation thread by subject, ignoring Re:/Fwd: prefixes.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "subject_keyword": { "type": "string" },
                    "mailbox": { "type": "string" },
                    "max_messages": { "type": "integer" }
                },
                "required": ["account", "subject_keyword"]
            }
        }),
        serde_json::json!({
            "name": "manage_drafts",
            "description": "List, create, send, or delete drafts. Sending and deleting need confirm=true.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "action": { "type": "string", "description": "list, create, send, or delete" },
                    "subject": { "type": "string", "description": "For create" },
                    "to": { "type": "string", "description": "For create" },
                    "body": { "type": "string", "description": "For create" },
                    "cc": { "type": "string" },
                    "bcc": { "type": "string" },
                    "draft_subject": { "type": "string", "description": "Keyword to find the draft for send/delete" },
                    "confirm": { "type": "boolean" }
                },
                "required": ["account", "action"]
            }
        }),
        serde_json::json!({
            "name": "get_statistics",
            "description": "Email analytics: account overview, per-sender stats, or one mailbox's breakdown.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "scope": { "type": "string", "description": "account_overview, sender_stats, or mailbox_breakdown" },
                    "sender": { "type": "string", "description": "For sender_stats" },
                    "mailbox": { "type": "string", "description": "For mailbox_breakdown" },
                    "days_back": { "type": "integer", "description": "Analysis window in days (0 = all time)" }
                },
                "required": ["account"]
            }
        }),
        serde_json::json!({
            "name": "export_emails",
            "description": "Export one email or a whole mailbox to txt/html files on disk.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "account": { "type": "string" },
                    "scope": { "type": "string", "description": "single_email or entire_mailbox" },
                    "subject_keyword": { "type": "string", "description": "For single_email" },
                    "mailbox": { "type": "string" },
                    "save_directory": { "type": "string", "description": "Default ~/Desktop" },
                    "format": { "type": "string", "description": "txt or html" }
                },
                "required": ["account", "scope"]
            }
        }),
    ]
}

/// The tool catalog. When the operator set preferences, they are appended to
/// every description so the calling agent sees them wherever it looks.
pub(crate) fn tool_definitions_json(preferences: Option<&str>) -> Vec<serde_json::Value> {
    let mut defs = base_tool_definitions();
    if let Some(prefs) = preferences.map(str::trim).filter(|p| !p.is_empty()) {
        for def in &mut defs {
            if let Some(desc) = def.get_mut("description") {
                if let Some(text) = desc.as_str() {
                    *desc = serde_json::Value::String(format!(
                        "{text}\n\nUser Preferences: {prefs}"
                    ));
                }
            }
        }
    }
    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_tool_once() {
        let defs = tool_definitions_json(None);
        assert_eq!(defs.len(), 20);
        let mut names: Vec<&str> = defs
            .iter()
            .map(|d| d.get("name").and_then(|n| n.as_str()).expect("name"))
            .collect();
        names.sort_unstable();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
        assert!(names.contains(&"list_inbox_emails"));
        assert!(names.contains(&"export_emails"));
    }

    #[test]
    fn every_tool_has_schema_and_description() {
        for def in tool_definitions_json(None) {
            let name = def.get("name").and_then(|n| n.as_str()).expect("name");
            assert!(
                def.get("description").and_then(|d| d.as_str()).is_some(),
                "{name} missing description"
            );
            let schema = def.get("inputSchema").expect("schema");
            assert_eq!(schema.get("type").and_then(|t| t.as_str()), Some("object"));
        }
    }

    #[test]
    fn preferences_append_to_descriptions() {
        let defs = tool_definitions_json(Some("Reply formally."));
        for def in defs {
            let desc = def.get("description").and_then(|d| d.as_str()).expect("desc");
            assert!(desc.ends_with("User Preferences: Reply formally."));
        }
    }

    #[test]
    fn blank_preferences_are_ignored() {
        let defs = tool_definitions_json(Some("   "));
        for def in defs {
            let desc = def.get("description").and_then(|d| d.as_str()).expect("desc");
            assert!(!desc.contains("User Preferences"));
        }
    }
}
