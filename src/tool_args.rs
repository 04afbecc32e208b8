#[allow(unused_imports)]
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ListInboxArgs {
    #[serde(default)]
    pub(crate) account: Option<String>,
    #[serde(default)]
    pub(crate) max_emails: Option<u32>,
    #[serde(default)]
    pub(crate) include_read: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetEmailContentArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    #[serde(default)]
    pub(crate) max_results: Option<u32>,
    #[serde(default)]
    pub(crate) max_content_length: Option<u32>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecentEmailsArgs {
    pub(crate) account: String,
    #[serde(default)]
    pub(crate) count: Option<u32>,
    #[serde(default)]
    pub(crate) include_content: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListMailboxesArgs {
    #[serde(default)]
    pub(crate) account: Option<String>,
    #[serde(default)]
    pub(crate) include_counts: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveEmailArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    pub(crate) to_mailbox: String,
    #[serde(default)]
    pub(crate) from_mailbox: Option<String>,
    #[serde(default)]
    pub(crate) max_moves: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    pub(crate) reply_body: String,
    #[serde(default)]
    pub(crate) reply_to_all: Option<bool>,
    #[serde(default)]
    pub(crate) confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComposeArgs {
    pub(crate) account: String,
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) cc: Option<String>,
    #[serde(default)]
    pub(crate) bcc: Option<String>,
    #[serde(default)]
    pub(crate) confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListAttachmentsArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    #[serde(default)]
    pub(crate) max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveAttachmentArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    pub(crate) attachment_name: String,
    pub(crate) save_path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEmailsArgs {
    pub(crate) account: String,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) subject_keyword: Option<String>,
    #[serde(default)]
    pub(crate) sender: Option<String>,
    #[serde(default)]
    pub(crate) has_attachments: Option<bool>,
    #[serde(default)]
    pub(crate) read_status: Option<String>,
    #[serde(default)]
    pub(crate) include_content: Option<bool>,
    #[serde(default)]
    pub(crate) max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusArgs {
    pub(crate) account: String,
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) subject_keyword: Option<String>,
    #[serde(default)]
    pub(crate) sender: Option<String>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) max_updates: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManageTrashArgs {
    pub(crate) account: String,
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) subject_keyword: Option<String>,
    #[serde(default)]
    pub(crate) sender: Option<String>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) max_deletes: Option<u32>,
    #[serde(default)]
    pub(crate) confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForwardArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    pub(crate) to: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadArgs {
    pub(crate) account: String,
    pub(crate) subject_keyword: String,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) max_messages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManageDraftsArgs {
    pub(crate) account: String,
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) subject: Option<String>,
    #[serde(default)]
    pub(crate) to: Option<String>,
    #[serde(default)]
    pub(crate) body: Option<String>,
    #[serde(default)]
    pub(crate) cc: Option<String>,
    #[serde(default)]
    pub(crate) bcc: Option<String>,
    #[serde(default)]
    pub(crate) draft_subject: Option<String>,
    #[serde(default)]
    pub(crate) confirm: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatisticsArgs {
    pub(crate) account: String,
    #[serde(default)]
    pub(crate) scope: Option<String>,
    #[serde(default)]
    pub(crate) sender: Option<String>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) days_back: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportArgs {
    pub(crate) account: String,
    pub(crate) scope: String,
    #[serde(default)]
    pub(crate) subject_keyword: Option<String>,
    #[serde(default)]
    pub(crate) mailbox: Option<String>,
    #[serde(default)]
    pub(crate) save_directory: Option<String>,
    #[serde(default)]
    pub(crate) format: Option<String>,
}
