use std::time::Instant;

use chrono::Utc;

use crate::{
    append_tool_log, compose_script, export_emails_script, forward_script,
    get_email_content_script, inbox_overview_script, list_accounts_script,
    list_attachments_script, list_inbox_script, list_mailboxes_script, manage_drafts_script,
    manage_trash_script, move_email_script, parse_account_list, parse_email_list,
    parse_unread_counts, recent_emails_script, reply_script, save_attachment_script,
    search_emails_script, statistics_script, thread_script, unread_count_script,
    update_status_script, ComposeArgs, ExportArgs, ForwardArgs, GetEmailContentArgs,
    ListAttachmentsArgs, ListInboxArgs, ListMailboxesArgs, ManageDraftsArgs, ManageTrashArgs,
    MoveEmailArgs, RecentEmailsArgs, ReplyArgs, RuntimeConfig, SaveAttachmentArgs, ScriptRunner,
    SearchEmailsArgs, StatisticsArgs, ThreadArgs, ToolExecution, ToolLogEntry, UpdateStatusArgs,
};

/// Run one tool call end to end and, when the invocation log is enabled,
/// record its outcome.
pub(crate) fn execute_tool(
    name: &str,
    args: serde_json::Value,
    runner: &ScriptRunner,
    cfg: &RuntimeConfig,
) -> Result<ToolExecution, String> {
    let started = Instant::now();
    let result = dispatch_tool(name, args, runner);

    if let Some(log_dir) = &cfg.log_dir {
        let error = match &result {
            Err(err) => Some(err.clone()),
            Ok(execution) if execution.is_error => Some(execution.output.clone()),
            Ok(_) => None,
        };
        let entry = ToolLogEntry {
            ts: Utc::now().to_rfc3339(),
            tool: name.to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            ok: error.is_none(),
            error,
        };
        if let Err(err) = append_tool_log(log_dir, &entry) {
            eprintln!("[tool-log] append failed: {err}");
        }
    }

    result
}

/// Wrap a builder-side validation failure ("Error: Invalid action …") as a
/// tool result rather than a transport error, so the caller sees the usage
/// text verbatim.
fn usage_error(message: String) -> ToolExecution {
    ToolExecution {
        output: message,
        details: serde_json::json!({}),
        is_error: true,
    }
}

/// Plain pass-through: the script's text is the whole answer.
fn text_result(output: String) -> ToolExecution {
    ToolExecution {
        output,
        details: serde_json::json!({}),
        is_error: false,
    }
}

/// List-shaped outputs additionally carry the parsed records.
fn email_list_result(output: String) -> ToolExecution {
    let emails = parse_email_list(&output);
    ToolExecution {
        details: serde_json::json!({ "emails": emails }),
        output,
        is_error: false,
    }
}

fn dispatch_tool(
    name: &str,
    args: serde_json::Value,
    runner: &ScriptRunner,
) -> Result<ToolExecution, String> {
    match name {
        "list_inbox_emails" => {
            let parsed: ListInboxArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&list_inbox_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(email_list_result(output))
        }
        "get_email_with_content" => {
            let parsed: GetEmailContentArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&get_email_content_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(email_list_result(output))
        }
        "get_unread_count" => {
            let output = runner
                .execute(&unread_count_script())
                .map_err(|e| e.to_string())?;
            let counts = parse_unread_counts(&output);
            let mut lines = Vec::new();
            let mut details = serde_json::Map::new();
            for (account, count) in &counts {
                lines.push(format!("{account}: {count}"));
                details.insert(account.clone(), serde_json::json!(count));
            }
            Ok(ToolExecution {
                output: if lines.is_empty() {
                    "No accounts found.".to_string()
                } else {
                    lines.join("\n")
                },
                details: serde_json::Value::Object(details),
                is_error: false,
            })
        }
        "list_accounts" => {
            let output = runner
                .execute(&list_accounts_script())
                .map_err(|e| e.to_string())?;
            let accounts = parse_account_list(&output);
            Ok(ToolExecution {
                output: if accounts.is_empty() {
                    "No accounts found.".to_string()
                } else {
                    accounts.join("\n")
                },
                details: serde_json::json!({ "accounts": accounts }),
                is_error: false,
            })
        }
        "get_recent_emails" => {
            let parsed: RecentEmailsArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&recent_emails_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(email_list_result(output))
        }
        "list_mailboxes" => {
            let parsed: ListMailboxesArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&list_mailboxes_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "move_email" => {
            let parsed: MoveEmailArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&move_email_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "reply_to_email" => {
            let parsed: ReplyArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&reply_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "compose_email" => {
            let parsed: ComposeArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&compose_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "list_email_attachments" => {
            let parsed: ListAttachmentsArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&list_attachments_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "save_email_attachment" => {
            let parsed: SaveAttachmentArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&save_attachment_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "get_inbox_overview" => {
            let output = runner
                .execute(&inbox_overview_script())
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "search_emails" => {
            let parsed: SearchEmailsArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&search_emails_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(email_list_result(output))
        }
        "update_email_status" => {
            let parsed: UpdateStatusArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            match update_status_script(&parsed) {
                Ok(script) => {
                    let output = runner.execute(&script).map_err(|e| e.to_string())?;
                    Ok(text_result(output))
                }
                Err(message) => Ok(usage_error(message)),
            }
        }
        "manage_trash" => {
            let parsed: ManageTrashArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            match manage_trash_script(&parsed) {
                Ok(script) => {
                    let output = runner.execute(&script).map_err(|e| e.to_string())?;
                    Ok(text_result(output))
                }
                Err(message) => Ok(usage_error(message)),
            }
        }
        "forward_email" => {
            let parsed: ForwardArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&forward_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(text_result(output))
        }
        "get_email_thread" => {
            let parsed: ThreadArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            let output = runner
                .execute(&thread_script(&parsed))
                .map_err(|e| e.to_string())?;
            Ok(email_list_result(output))
        }
        "manage_drafts" => {
            let parsed: ManageDraftsArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            match manage_drafts_script(&parsed) {
                Ok(script) => {
                    let output = runner.execute(&script).map_err(|e| e.to_string())?;
                    Ok(text_result(output))
                }
                Err(message) => Ok(usage_error(message)),
            }
        }
        "get_statistics" => {
            let parsed: StatisticsArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            match statistics_script(&parsed) {
                Ok(script) => {
                    let output = runner.execute(&script).map_err(|e| e.to_string())?;
                    Ok(text_result(output))
                }
                Err(message) => Ok(usage_error(message)),
            }
        }
        "export_emails" => {
            let parsed: ExportArgs =
                serde_json::from_value(args).map_err(|e| format!("args: {e}"))?;
            match export_emails_script(&parsed) {
                Ok(script) => {
                    let output = runner.execute(&script).map_err(|e| e.to_string())?;
                    Ok(text_result(output))
                }
                Err(message) => Ok(usage_error(message)),
            }
        }
        other => Err(format!("unknown tool '{other}'")),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Runner whose "interpreter" echoes a canned body instead of talking to
    /// Mail; the generated script still travels through the whole engine.
    fn echo_runner(body: &str) -> ScriptRunner {
        ScriptRunner::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("printf '%s\\n' \"{body}\""),
            ],
            Arc::new(Mutex::new(())),
            Duration::from_secs(10),
            1,
            Duration::from_millis(10),
        )
    }

    fn test_cfg() -> RuntimeConfig {
        RuntimeConfig {
            preferences: None,
            interpreter: vec!["sh".to_string()],
            script_timeout: Duration::from_secs(10),
            max_retries: 1,
            backoff_base: Duration::from_millis(10),
            log_dir: None,
        }
    }

    #[test]
    fn unknown_tool_is_a_transport_error() {
        let runner = echo_runner("unused");
        let err = execute_tool("frobnicate", serde_json::json!({}), &runner, &test_cfg())
            .expect_err("unknown tool");
        assert!(err.contains("unknown tool 'frobnicate'"));
    }

    #[test]
    fn malformed_args_are_reported_with_context() {
        let runner = echo_runner("unused");
        let err = execute_tool(
            "get_recent_emails",
            serde_json::json!({ "count": 5 }),
            &runner,
            &test_cfg(),
        )
        .expect_err("missing account");
        assert!(err.starts_with("args:"));
    }

    #[test]
    fn list_shaped_tools_attach_parsed_records() {
        let runner = echo_runner("✉ Hello\n   From: a@b.com\nTOTAL EMAILS: 1");
        let result = execute_tool(
            "list_inbox_emails",
            serde_json::json!({}),
            &runner,
            &test_cfg(),
        )
        .expect("tool runs");
        assert!(!result.is_error);
        let emails = result.details.get("emails").and_then(|e| e.as_array()).expect("emails");
        assert_eq!(emails.len(), 1);
        assert_eq!(
            emails[0].get("subject").and_then(|s| s.as_str()),
            Some("Hello")
        );
        assert_eq!(emails[0].get("is_read").and_then(|r| r.as_bool()), Some(false));
    }

    #[test]
    fn unread_counts_become_structured_details() {
        let runner = echo_runner("Work:3|Stale:ERROR");
        let result = execute_tool(
            "get_unread_count",
            serde_json::json!({}),
            &runner,
            &test_cfg(),
        )
        .expect("tool runs");
        assert_eq!(result.details.get("Work").and_then(|v| v.as_i64()), Some(3));
        assert_eq!(result.details.get("Stale").and_then(|v| v.as_i64()), Some(-1));
        assert!(result.output.contains("Work: 3"));
    }

    #[test]
    fn accounts_become_array_details() {
        let runner = echo_runner("Work|Personal");
        let result = execute_tool("list_accounts", serde_json::json!({}), &runner, &test_cfg())
            .expect("tool runs");
        assert_eq!(
            result.details.get("accounts").and_then(|a| a.as_array()).map(|a| a.len()),
            Some(2)
        );
        assert_eq!(result.output, "Work\nPersonal");
    }

    #[test]
    fn invalid_action_is_a_tool_result_not_an_error() {
        let runner = echo_runner("unused");
        let result = execute_tool(
            "update_email_status",
            serde_json::json!({ "account": "Work", "action": "explode" }),
            &runner,
            &test_cfg(),
        )
        .expect("usage errors are results");
        assert!(result.is_error);
        assert!(result.output.contains("Invalid action 'explode'"));
    }

    #[test]
    fn invocation_log_records_calls() {
        use std::fs;

        let log_dir = std::env::temp_dir().join(format!(
            "mailpilot-exec-log-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&log_dir);
        let mut cfg = test_cfg();
        cfg.log_dir = Some(log_dir.clone());

        let runner = echo_runner("Work|Personal");
        execute_tool("list_accounts", serde_json::json!({}), &runner, &cfg).expect("tool runs");

        let files: Vec<_> = fs::read_dir(&log_dir)
            .expect("log dir")
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(files[0].path()).expect("read");
        let entry: ToolLogEntry =
            serde_json::from_str(content.lines().next().expect("line")).expect("json");
        assert_eq!(entry.tool, "list_accounts");
        assert!(entry.ok);
        let _ = fs::remove_dir_all(&log_dir);
    }
}
