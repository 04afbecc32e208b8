//! AppleScript body assembly for every tool.
//!
//! Scripts are plain string templates aimed at Mail.app's scripting
//! dictionary. Each builder takes the tool's parsed arguments and returns a
//! complete script; the execution engine treats the result as opaque text.
//! Every user-supplied value is routed through `applescript_quote` before
//! interpolation so it cannot break out of a quoted literal.

use super::applescript_quote as q;
use super::expand_tilde;
use crate::tool_args::*;

/// Inbox names vary by provider and locale; Exchange in particular localizes
/// the folder. Try the known spellings in order and error only if none bind.
pub(crate) fn inbox_discovery(account_var: &str) -> String {
    format!(
        r#"
                set inboxMailbox to missing value
                set possibleInboxNames to {{"INBOX", "Inbox", "Boîte de réception", "Posteingang", "Bandeja de entrada", "Posta in arrivo", "Caixa de entrada", "Входящие", "受信トレイ", "收件箱"}}
                repeat with inboxName in possibleInboxNames
                    try
                        set inboxMailbox to mailbox inboxName of {account_var}
                        exit repeat
                    end try
                end repeat
                if inboxMailbox is missing value then
                    error "Could not find inbox for account " & (name of {account_var})
                end if
"#
    )
}

/// Bind `result_var` to the named mailbox of `account_var`. "INBOX" goes
/// through localized discovery; anything else is looked up directly.
pub(crate) fn mailbox_lookup(mailbox: &str, account_var: &str, result_var: &str) -> String {
    if mailbox.eq_ignore_ascii_case("INBOX") {
        format!(
            r#"
            set {result_var} to missing value
            set possibleInboxNames to {{"INBOX", "Inbox", "Boîte de réception", "Posteingang", "Bandeja de entrada", "Posta in arrivo", "Caixa de entrada", "Входящие", "受信トレイ", "收件箱"}}
            repeat with inboxName in possibleInboxNames
                try
                    set {result_var} to mailbox inboxName of {account_var}
                    exit repeat
                end try
            end repeat
            if {result_var} is missing value then
                error "Could not find inbox for account"
            end if
"#
        )
    } else {
        format!(
            r#"
            set {result_var} to mailbox "{}" of {account_var}
"#,
            q(mailbox)
        )
    }
}

/// Mailbox lookup wrapped so a miss becomes a caller-visible error message.
fn guarded_mailbox_lookup(mailbox: &str, account_var: &str, result_var: &str) -> String {
    format!(
        r#"
            try
                {lookup}
            on error errMsg
                error "Mailbox not found: {name}. " & errMsg
            end try
"#,
        lookup = mailbox_lookup(mailbox, account_var, result_var),
        name = q(mailbox)
    )
}

/// Reference a destination mailbox, resolving `/`-separated nesting into a
/// chain of `mailbox "child" of mailbox "parent" of …` qualifiers.
pub(crate) fn nested_mailbox_ref(path: &str, account_var: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    let mut reference = String::new();
    for part in parts.iter().rev() {
        reference.push_str(&format!("mailbox \"{}\" of ", q(part)));
    }
    reference.push_str(account_var);
    reference
}

/// Flatten a message body to one line and cap its length, appending the
/// capped text as a labeled output line. `max_len` of 0 means unlimited.
fn content_preview(max_len: u32, label: &str) -> String {
    format!(
        r#"
                            try
                                set msgContent to content of aMessage
                                set AppleScript's text item delimiters to {{return, linefeed}}
                                set contentParts to text items of msgContent
                                set AppleScript's text item delimiters to " "
                                set cleanText to contentParts as string
                                set AppleScript's text item delimiters to ""

                                if {max_len} > 0 and length of cleanText > {max_len} then
                                    set contentPreview to text 1 thru {max_len} of cleanText & "..."
                                else
                                    set contentPreview to cleanText
                                end if

                                set outputText to outputText & "   {label}: " & contentPreview & return
                            on error
                                set outputText to outputText & "   {label}: [Not available]" & return
                            end try
"#
    )
}

pub(crate) fn list_inbox_script(args: &ListInboxArgs) -> String {
    let max_emails = args.max_emails.unwrap_or(0);
    let include_read = args.include_read.unwrap_or(true);
    let discovery = inbox_discovery("anAccount");

    let (account_filter, account_filter_end) = match &args.account {
        Some(account) => (
            format!("if accountName is \"{}\" then", q(account)),
            "end if".to_string(),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "INBOX EMAILS" & return & return
        set totalCount to 0
        set allAccounts to every account

        repeat with anAccount in allAccounts
            set accountName to name of anAccount

            {account_filter}
            try
                {discovery}
                set inboxMessages to every message of inboxMailbox
                set messageCount to count of inboxMessages

                if messageCount > 0 then
                    set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
                    set outputText to outputText & "📧 ACCOUNT: " & accountName & " (" & messageCount & " messages)" & return
                    set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return & return

                    set currentIndex to 0
                    repeat with aMessage in inboxMessages
                        set currentIndex to currentIndex + 1
                        if {max_emails} > 0 and currentIndex > {max_emails} then exit repeat

                        try
                            set messageSubject to subject of aMessage
                            set messageSender to sender of aMessage
                            set messageDate to date received of aMessage
                            set messageRead to read status of aMessage

                            set shouldInclude to true
                            if not {include_read} and messageRead then
                                set shouldInclude to false
                            end if

                            if shouldInclude then
                                if messageRead then
                                    set readIndicator to "✓"
                                else
                                    set readIndicator to "✉"
                                end if

                                set outputText to outputText & readIndicator & " " & messageSubject & return
                                set outputText to outputText & "   From: " & messageSender & return
                                set outputText to outputText & "   Date: " & (messageDate as string) & return
                                set outputText to outputText & return

                                set totalCount to totalCount + 1
                            end if
                        end try
                    end repeat
                end if
            on error errMsg
                set outputText to outputText & "⚠ Error accessing inbox for account " & accountName & return
                set outputText to outputText & "   " & errMsg & return & return
            end try
            {account_filter_end}
        end repeat

        set outputText to outputText & "========================================" & return
        set outputText to outputText & "TOTAL EMAILS: " & totalCount & return
        set outputText to outputText & "========================================" & return

        return outputText
    end tell
"#
    )
}

pub(crate) fn get_email_content_script(args: &GetEmailContentArgs) -> String {
    let max_results = args.max_results.unwrap_or(5);
    let max_content_length = args.max_content_length.unwrap_or(300);
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");

    let (mailbox_script, search_location) = if mailbox == "All" {
        (
            r#"
            set searchMailboxes to every mailbox of targetAccount
"#
            .to_string(),
            "all mailboxes".to_string(),
        )
    } else {
        (
            format!(
                "{}\n            set searchMailboxes to {{searchMailbox}}\n",
                guarded_mailbox_lookup(mailbox, "targetAccount", "searchMailbox")
            ),
            q(mailbox),
        )
    };

    format!(
        r#"
    on lowercase(str)
        set lowerStr to do shell script "echo " & quoted form of str & " | tr '[:upper:]' '[:lower:]'"
        return lowerStr
    end lowercase

    tell application "Mail"
        set outputText to "SEARCH RESULTS FOR: {keyword}" & return
        set outputText to outputText & "Searching in: {search_location}" & return & return
        set resultCount to 0

        try
            set targetAccount to account "{account}"
            {mailbox_script}

            repeat with currentMailbox in searchMailboxes
                set mailboxMessages to every message of currentMailbox
                set mailboxName to name of currentMailbox

                repeat with aMessage in mailboxMessages
                    if resultCount >= {max_results} then exit repeat

                    try
                        set messageSubject to subject of aMessage

                        set lowerSubject to my lowercase(messageSubject)
                        set lowerKeyword to my lowercase("{keyword}")

                        if lowerSubject contains lowerKeyword then
                            set messageSender to sender of aMessage
                            set messageDate to date received of aMessage
                            set messageRead to read status of aMessage

                            if messageRead then
                                set readIndicator to "✓"
                            else
                                set readIndicator to "✉"
                            end if

                            set outputText to outputText & readIndicator & " " & messageSubject & return
                            set outputText to outputText & "   From: " & messageSender & return
                            set outputText to outputText & "   Date: " & (messageDate as string) & return
                            set outputText to outputText & "   Mailbox: " & mailboxName & return
                            {preview}
                            set outputText to outputText & return
                            set resultCount to resultCount + 1
                        end if
                    end try
                end repeat
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "FOUND: " & resultCount & " matching email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        keyword = q(&args.subject_keyword),
        account = q(&args.account),
        preview = content_preview(max_content_length, "Content"),
    )
}

pub(crate) fn unread_count_script() -> String {
    let discovery = inbox_discovery("anAccount");
    format!(
        r#"
    tell application "Mail"
        set resultList to {{}}
        set allAccounts to every account

        repeat with anAccount in allAccounts
            set accountName to name of anAccount

            try
                {discovery}
                set unreadCount to unread count of inboxMailbox
                set end of resultList to accountName & ":" & unreadCount
            on error
                set end of resultList to accountName & ":ERROR"
            end try
        end repeat

        set AppleScript's text item delimiters to "|"
        return resultList as string
    end tell
"#
    )
}

pub(crate) fn list_accounts_script() -> String {
    r#"
    tell application "Mail"
        set accountNames to {}
        set allAccounts to every account

        repeat with anAccount in allAccounts
            set accountName to name of anAccount
            set end of accountNames to accountName
        end repeat

        set AppleScript's text item delimiters to "|"
        return accountNames as string
    end tell
"#
    .to_string()
}

pub(crate) fn recent_emails_script(args: &RecentEmailsArgs) -> String {
    let count = args.count.unwrap_or(10);
    let preview = if args.include_content.unwrap_or(false) {
        content_preview(200, "Preview")
    } else {
        String::new()
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "RECENT EMAILS - {account}" & return & return

        try
            set targetAccount to account "{account}"
            {discovery}
            set inboxMessages to every message of inboxMailbox

            set currentIndex to 0
            repeat with aMessage in inboxMessages
                set currentIndex to currentIndex + 1
                if currentIndex > {count} then exit repeat

                try
                    set messageSubject to subject of aMessage
                    set messageSender to sender of aMessage
                    set messageDate to date received of aMessage
                    set messageRead to read status of aMessage

                    if messageRead then
                        set readIndicator to "✓"
                    else
                        set readIndicator to "✉"
                    end if

                    set outputText to outputText & readIndicator & " " & messageSubject & return
                    set outputText to outputText & "   From: " & messageSender & return
                    set outputText to outputText & "   Date: " & (messageDate as string) & return
                    {preview}
                    set outputText to outputText & return
                end try
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "Showing " & (currentIndex - 1) & " email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        discovery = inbox_discovery("targetAccount"),
    )
}

pub(crate) fn list_mailboxes_script(args: &ListMailboxesArgs) -> String {
    let count_script = if args.include_counts.unwrap_or(true) {
        r#"
        try
            set msgCount to count of messages of aMailbox
            set unreadCount to unread count of aMailbox
            set outputText to outputText & " (" & msgCount & " total, " & unreadCount & " unread)"
        on error
            set outputText to outputText & " (count unavailable)"
        end try
"#
        .to_string()
    } else {
        String::new()
    };
    let sub_count_script = count_script.replace("aMailbox", "subBox");

    let (account_filter, account_filter_end) = match &args.account {
        Some(account) => (
            format!("if accountName is \"{}\" then", q(account)),
            "end if".to_string(),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "MAILBOXES" & return & return
        set allAccounts to every account

        repeat with anAccount in allAccounts
            set accountName to name of anAccount

            {account_filter}
                set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
                set outputText to outputText & "📁 ACCOUNT: " & accountName & return
                set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return & return

                try
                    set accountMailboxes to every mailbox of anAccount

                    repeat with aMailbox in accountMailboxes
                        set mailboxName to name of aMailbox
                        set outputText to outputText & "  📂 " & mailboxName
                        {count_script}
                        set outputText to outputText & return

                        try
                            set subMailboxes to every mailbox of aMailbox
                            repeat with subBox in subMailboxes
                                set subName to name of subBox
                                set outputText to outputText & "    └─ " & subName & " [Path: " & mailboxName & "/" & subName & "]"
                                {sub_count_script}
                                set outputText to outputText & return
                            end repeat
                        end try
                    end repeat

                    set outputText to outputText & return
                on error errMsg
                    set outputText to outputText & "  ⚠ Error accessing mailboxes: " & errMsg & return & return
                end try
            {account_filter_end}
        end repeat

        return outputText
    end tell
"#
    )
}

pub(crate) fn move_email_script(args: &MoveEmailArgs) -> String {
    let from_mailbox = args.from_mailbox.as_deref().unwrap_or("INBOX");
    let max_moves = args.max_moves.unwrap_or(1);
    let dest_ref = nested_mailbox_ref(&args.to_mailbox, "targetAccount");

    format!(
        r#"
    tell application "Mail"
        set outputText to "MOVING EMAILS" & return & return
        set movedCount to 0

        try
            set targetAccount to account "{account}"
            try
                {source_lookup}
            on error errMsg
                error "Source mailbox not found: {from_name}. " & errMsg
            end try

            set destMailbox to {dest_ref}
            set sourceMessages to every message of sourceMailbox

            repeat with aMessage in sourceMessages
                if movedCount >= {max_moves} then exit repeat

                try
                    set messageSubject to subject of aMessage

                    if messageSubject contains "{keyword}" then
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage

                        move aMessage to destMailbox

                        set outputText to outputText & "✓ Moved: " & messageSubject & return
                        set outputText to outputText & "  From: " & messageSender & return
                        set outputText to outputText & "  Date: " & (messageDate as string) & return
                        set outputText to outputText & "  {from_name} → {to_name}" & return & return

                        set movedCount to movedCount + 1
                    end if
                end try
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "TOTAL MOVED: " & movedCount & " email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg & return & "Please check that account and mailbox names are correct. For nested mailboxes, use '/' separator (e.g., 'Projects/Client')."
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        source_lookup = mailbox_lookup(from_mailbox, "targetAccount", "sourceMailbox"),
        from_name = q(from_mailbox),
        to_name = q(&args.to_mailbox),
        keyword = q(&args.subject_keyword),
    )
}

pub(crate) fn reply_script(args: &ReplyArgs) -> String {
    let reply_command = if args.reply_to_all.unwrap_or(false) {
        "set replyMessage to reply foundMessage with opening window reply to all"
    } else {
        "set replyMessage to reply foundMessage with opening window"
    };
    let (send_command, status_message) = if args.confirm.unwrap_or(false) {
        ("send replyMessage", "✓ Reply sent successfully!")
    } else {
        (
            "-- send replyMessage (dry run - set confirm=true to send)",
            "📋 PREVIEW - Reply prepared but NOT sent (set confirm=true to send)",
        )
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "SENDING REPLY" & return & return

        try
            set targetAccount to account "{account}"
            {discovery}
            set inboxMessages to every message of inboxMailbox
            set foundMessage to missing value

            repeat with aMessage in inboxMessages
                try
                    set messageSubject to subject of aMessage

                    if messageSubject contains "{keyword}" then
                        set foundMessage to aMessage
                        exit repeat
                    end if
                end try
            end repeat

            if foundMessage is not missing value then
                set messageSubject to subject of foundMessage
                set messageSender to sender of foundMessage
                set messageDate to date received of foundMessage

                {reply_command}

                set sender of replyMessage to targetAccount
                set content of replyMessage to "{body}"

                {send_command}

                set outputText to outputText & "{status_message}" & return & return
                set outputText to outputText & "Original email:" & return
                set outputText to outputText & "  Subject: " & messageSubject & return
                set outputText to outputText & "  From: " & messageSender & return
                set outputText to outputText & "  Date: " & (messageDate as string) & return & return
                set outputText to outputText & "Reply body:" & return
                set outputText to outputText & "  " & "{body}" & return

            else
                set outputText to outputText & "⚠ No email found matching: {keyword}" & return
            end if

        on error errMsg
            return "Error: " & errMsg & return & "Please check that the account name is correct and the email exists."
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        discovery = inbox_discovery("targetAccount"),
        keyword = q(&args.subject_keyword),
        body = q(&args.reply_body),
    )
}

/// Fan a comma-separated address list out into recipient clauses.
fn recipient_clauses(kind: &str, addresses: &str, message_var: &str) -> String {
    let mut clauses = String::new();
    for addr in addresses.split(',') {
        let addr = addr.trim();
        if addr.is_empty() {
            continue;
        }
        clauses.push_str(&format!(
            "make new {kind} recipient at end of {kind} recipients of {message_var} with properties {{address:\"{}\"}}\n                ",
            q(addr)
        ));
    }
    clauses
}

pub(crate) fn compose_script(args: &ComposeArgs) -> String {
    let cc_script = args
        .cc
        .as_deref()
        .map(|cc| recipient_clauses("cc", cc, "newMessage"))
        .unwrap_or_default();
    let bcc_script = args
        .bcc
        .as_deref()
        .map(|bcc| recipient_clauses("bcc", bcc, "newMessage"))
        .unwrap_or_default();
    let (send_command, status_message) = if args.confirm.unwrap_or(false) {
        ("send newMessage", "✓ Email sent successfully!")
    } else {
        (
            "-- send newMessage (dry run - set confirm=true to send)",
            "📋 PREVIEW - Email prepared but NOT sent (set confirm=true to send)",
        )
    };

    let mut recipients_echo = format!(
        "set outputText to outputText & \"To: {}\" & return\n",
        q(&args.to)
    );
    if let Some(cc) = &args.cc {
        recipients_echo.push_str(&format!(
            "            set outputText to outputText & \"CC: {}\" & return\n",
            q(cc)
        ));
    }
    if let Some(bcc) = &args.bcc {
        recipients_echo.push_str(&format!(
            "            set outputText to outputText & \"BCC: {}\" & return\n",
            q(bcc)
        ));
    }

    format!(
        r#"
    tell application "Mail"
        set outputText to "COMPOSING EMAIL" & return & return

        try
            set targetAccount to account "{account}"

            set newMessage to make new outgoing message with properties {{subject:"{subject}", content:"{body}", visible:false}}

            set sender of newMessage to targetAccount

            tell newMessage
                make new to recipient at end of to recipients with properties {{address:"{to}"}}
                {cc_script}
                {bcc_script}
            end tell

            {send_command}

            set outputText to outputText & "{status_message}" & return & return
            set outputText to outputText & "From: " & name of targetAccount & return
            {recipients_echo}
            set outputText to outputText & "Subject: {subject}" & return
            set outputText to outputText & "Body: " & "{body}" & return

        on error errMsg
            return "Error: " & errMsg & return & "Please check that the account name and email addresses are correct."
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        subject = q(&args.subject),
        body = q(&args.body),
        to = q(&args.to),
    )
}

pub(crate) fn list_attachments_script(args: &ListAttachmentsArgs) -> String {
    let max_results = args.max_results.unwrap_or(1);
    format!(
        r#"
    tell application "Mail"
        set outputText to "ATTACHMENTS FOR: {keyword}" & return & return
        set resultCount to 0

        try
            set targetAccount to account "{account}"
            {discovery}
            set inboxMessages to every message of inboxMailbox

            repeat with aMessage in inboxMessages
                if resultCount >= {max_results} then exit repeat

                try
                    set messageSubject to subject of aMessage

                    if messageSubject contains "{keyword}" then
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage

                        set outputText to outputText & "✉ " & messageSubject & return
                        set outputText to outputText & "   From: " & messageSender & return
                        set outputText to outputText & "   Date: " & (messageDate as string) & return & return

                        set msgAttachments to mail attachments of aMessage
                        set attachmentCount to count of msgAttachments

                        if attachmentCount > 0 then
                            set outputText to outputText & "   Attachments (" & attachmentCount & "):" & return

                            repeat with anAttachment in msgAttachments
                                set attachmentName to name of anAttachment
                                try
                                    set attachmentSize to size of anAttachment
                                    set sizeInKB to (attachmentSize / 1024) as integer
                                    set outputText to outputText & "   📎 " & attachmentName & " (" & sizeInKB & " KB)" & return
                                on error
                                    set outputText to outputText & "   📎 " & attachmentName & return
                                end try
                            end repeat
                        else
                            set outputText to outputText & "   No attachments" & return
                        end if

                        set outputText to outputText & return
                        set resultCount to resultCount + 1
                    end if
                end try
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "FOUND: " & resultCount & " matching email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        discovery = inbox_discovery("targetAccount"),
        keyword = q(&args.subject_keyword),
    )
}

pub(crate) fn save_attachment_script(args: &SaveAttachmentArgs) -> String {
    let save_path = expand_tilde(&args.save_path);
    format!(
        r#"
    tell application "Mail"
        set outputText to ""

        try
            set targetAccount to account "{account}"
            {discovery}
            set inboxMessages to every message of inboxMailbox
            set foundAttachment to false

            repeat with aMessage in inboxMessages
                try
                    set messageSubject to subject of aMessage

                    if messageSubject contains "{keyword}" then
                        set msgAttachments to mail attachments of aMessage

                        repeat with anAttachment in msgAttachments
                            set attachmentFileName to name of anAttachment

                            if attachmentFileName contains "{attachment}" then
                                save anAttachment in POSIX file "{save_path}"

                                set outputText to "✓ Attachment saved successfully!" & return & return
                                set outputText to outputText & "Email: " & messageSubject & return
                                set outputText to outputText & "Attachment: " & attachmentFileName & return
                                set outputText to outputText & "Saved to: {save_path}" & return

                                set foundAttachment to true
                                exit repeat
                            end if
                        end repeat

                        if foundAttachment then exit repeat
                    end if
                end try
            end repeat

            if not foundAttachment then
                set outputText to "⚠ Attachment not found" & return
                set outputText to outputText & "Email keyword: {keyword}" & return
                set outputText to outputText & "Attachment name: {attachment}" & return
            end if

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        discovery = inbox_discovery("targetAccount"),
        keyword = q(&args.subject_keyword),
        attachment = q(&args.attachment_name),
        save_path = q(&save_path),
    )
}

pub(crate) fn inbox_overview_script() -> String {
    let discovery = inbox_discovery("anAccount");
    format!(
        r#"
    tell application "Mail"
        set outputText to "EMAIL INBOX OVERVIEW" & return & return

        set outputText to outputText & "📊 UNREAD EMAILS BY ACCOUNT" & return
        set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
        set allAccounts to every account
        set totalUnread to 0

        repeat with anAccount in allAccounts
            set accountName to name of anAccount

            try
                {discovery}

                set unreadCount to unread count of inboxMailbox
                set totalMessages to count of messages of inboxMailbox
                set totalUnread to totalUnread + unreadCount

                set outputText to outputText & "  " & accountName & ": " & unreadCount & " unread"
                set outputText to outputText & " (" & totalMessages & " total)" & return
            on error
                set outputText to outputText & "  " & accountName & ": Error accessing inbox" & return
            end try
        end repeat

        set outputText to outputText & return
        set outputText to outputText & "📈 TOTAL UNREAD: " & totalUnread & " across all accounts" & return
        set outputText to outputText & return & return

        set outputText to outputText & "📁 MAILBOX STRUCTURE" & return
        set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return

        repeat with anAccount in allAccounts
            set accountName to name of anAccount
            set outputText to outputText & return & "Account: " & accountName & return

            try
                set accountMailboxes to every mailbox of anAccount

                repeat with aMailbox in accountMailboxes
                    set mailboxName to name of aMailbox

                    try
                        set unreadCount to unread count of aMailbox
                        if unreadCount > 0 then
                            set outputText to outputText & "  📂 " & mailboxName & " (" & unreadCount & " unread)" & return
                        else
                            set outputText to outputText & "  📂 " & mailboxName & return
                        end if

                        try
                            set subMailboxes to every mailbox of aMailbox
                            repeat with subBox in subMailboxes
                                set subName to name of subBox
                                set subUnread to unread count of subBox

                                if subUnread > 0 then
                                    set outputText to outputText & "     └─ " & subName & " (" & subUnread & " unread)" & return
                                end if
                            end repeat
                        end try
                    on error
                        set outputText to outputText & "  📂 " & mailboxName & return
                    end try
                end repeat
            on error
                set outputText to outputText & "  ⚠ Error accessing mailboxes" & return
            end try
        end repeat

        set outputText to outputText & return & return

        set outputText to outputText & "📬 RECENT EMAILS PREVIEW (10 Most Recent)" & return
        set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return

        set allRecentMessages to {{}}

        repeat with anAccount in allAccounts
            set accountName to name of anAccount

            try
                {discovery}

                set inboxMessages to every message of inboxMailbox

                set messageIndex to 0
                repeat with aMessage in inboxMessages
                    set messageIndex to messageIndex + 1
                    if messageIndex > 10 then exit repeat

                    try
                        set messageSubject to subject of aMessage
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage
                        set messageRead to read status of aMessage

                        set messageRecord to {{accountName:accountName, msgSubject:messageSubject, msgSender:messageSender, msgDate:messageDate, msgRead:messageRead}}
                        set end of allRecentMessages to messageRecord
                    end try
                end repeat
            end try
        end repeat

        set displayCount to 0
        repeat with msgRecord in allRecentMessages
            set displayCount to displayCount + 1
            if displayCount > 10 then exit repeat

            set readIndicator to "✉"
            if msgRead of msgRecord then
                set readIndicator to "✓"
            end if

            set outputText to outputText & return & readIndicator & " " & msgSubject of msgRecord & return
            set outputText to outputText & "   Account: " & accountName of msgRecord & return
            set outputText to outputText & "   From: " & msgSender of msgRecord & return
            set outputText to outputText & "   Date: " & (msgDate of msgRecord as string) & return
        end repeat

        if displayCount = 0 then
            set outputText to outputText & return & "No recent emails found." & return
        end if

        set outputText to outputText & return & return

        set outputText to outputText & "💡 SUGGESTED ACTIONS" & return
        set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return

        if totalUnread > 0 then
            set outputText to outputText & "1. Review unread emails with get_recent_emails" & return
            set outputText to outputText & "2. Search for action items (keywords like 'urgent', 'deadline')" & return
            set outputText to outputText & "3. Move processed emails to their folders with move_email" & return
        else
            set outputText to outputText & "1. Inbox is clear! No unread emails." & return
        end if
        set outputText to outputText & "4. Draft replies for emails that need responses" & return
        set outputText to outputText & "5. Archive older read emails" & return

        return outputText
    end tell
"#
    )
}

pub(crate) fn search_emails_script(args: &SearchEmailsArgs) -> String {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let max_results = args.max_results.unwrap_or(20);

    let mut conditions = Vec::new();
    if let Some(keyword) = &args.subject_keyword {
        conditions.push(format!("messageSubject contains \"{}\"", q(keyword)));
    }
    if let Some(sender) = &args.sender {
        conditions.push(format!("messageSender contains \"{}\"", q(sender)));
    }
    match args.has_attachments {
        Some(true) => conditions.push("(count of mail attachments of aMessage) > 0".to_string()),
        Some(false) => conditions.push("(count of mail attachments of aMessage) = 0".to_string()),
        None => {}
    }
    match args.read_status.as_deref() {
        Some("read") => conditions.push("messageRead is true".to_string()),
        Some("unread") => conditions.push("messageRead is false".to_string()),
        _ => {}
    }
    let condition_str = if conditions.is_empty() {
        "true".to_string()
    } else {
        conditions.join(" and ")
    };

    let preview = if args.include_content.unwrap_or(false) {
        content_preview(300, "Content")
    } else {
        String::new()
    };

    let mailbox_script = if mailbox == "All" {
        r#"
            set searchMailboxes to every mailbox of targetAccount
"#
        .to_string()
    } else {
        format!(
            "{}\n            set searchMailboxes to {{searchMailbox}}\n",
            guarded_mailbox_lookup(mailbox, "targetAccount", "searchMailbox")
        )
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "SEARCH RESULTS" & return & return
        set outputText to outputText & "Searching in: {mailbox_name}" & return
        set outputText to outputText & "Account: {account}" & return & return
        set resultCount to 0

        try
            set targetAccount to account "{account}"
            {mailbox_script}

            repeat with currentMailbox in searchMailboxes
                set mailboxMessages to every message of currentMailbox
                set mailboxName to name of currentMailbox

                repeat with aMessage in mailboxMessages
                    if resultCount >= {max_results} then exit repeat

                    try
                        set messageSubject to subject of aMessage
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage
                        set messageRead to read status of aMessage

                        if {condition_str} then
                            set readIndicator to "✉"
                            if messageRead then
                                set readIndicator to "✓"
                            end if

                            set outputText to outputText & readIndicator & " " & messageSubject & return
                            set outputText to outputText & "   From: " & messageSender & return
                            set outputText to outputText & "   Date: " & (messageDate as string) & return
                            set outputText to outputText & "   Mailbox: " & mailboxName & return
                            {preview}
                            set outputText to outputText & return
                            set resultCount to resultCount + 1
                        end if
                    end try
                end repeat
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "FOUND: " & resultCount & " matching email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        mailbox_name = q(mailbox),
        account = q(&args.account),
    )
}

pub(crate) fn update_status_script(args: &UpdateStatusArgs) -> Result<String, String> {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let max_updates = args.max_updates.unwrap_or(10);

    let (action_script, action_label) = match args.action.as_str() {
        "mark_read" => ("set read status of aMessage to true", "Marked as read"),
        "mark_unread" => ("set read status of aMessage to false", "Marked as unread"),
        "flag" => ("set flagged status of aMessage to true", "Flagged"),
        "unflag" => ("set flagged status of aMessage to false", "Unflagged"),
        other => {
            return Err(format!(
                "Error: Invalid action '{other}'. Use: mark_read, mark_unread, flag, unflag"
            ));
        }
    };

    let mut conditions = Vec::new();
    if let Some(keyword) = &args.subject_keyword {
        conditions.push(format!("messageSubject contains \"{}\"", q(keyword)));
    }
    if let Some(sender) = &args.sender {
        conditions.push(format!("messageSender contains \"{}\"", q(sender)));
    }
    let condition_str = if conditions.is_empty() {
        "true".to_string()
    } else {
        conditions.join(" and ")
    };

    Ok(format!(
        r#"
    tell application "Mail"
        set outputText to "UPDATING EMAIL STATUS: {action_label}" & return & return
        set updateCount to 0

        try
            set targetAccount to account "{account}"
            {mailbox_lookup}

            set mailboxMessages to every message of targetMailbox

            repeat with aMessage in mailboxMessages
                if updateCount >= {max_updates} then exit repeat

                try
                    set messageSubject to subject of aMessage
                    set messageSender to sender of aMessage
                    set messageDate to date received of aMessage

                    if {condition_str} then
                        {action_script}

                        set outputText to outputText & "✓ {action_label}: " & messageSubject & return
                        set outputText to outputText & "   From: " & messageSender & return
                        set outputText to outputText & "   Date: " & (messageDate as string) & return & return

                        set updateCount to updateCount + 1
                    end if
                end try
            end repeat

            set outputText to outputText & "========================================" & return
            set outputText to outputText & "TOTAL UPDATED: " & updateCount & " email(s)" & return
            set outputText to outputText & "========================================" & return

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        mailbox_lookup = guarded_mailbox_lookup(mailbox, "targetAccount", "targetMailbox"),
    ))
}

pub(crate) fn manage_trash_script(args: &ManageTrashArgs) -> Result<String, String> {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let max_deletes = args.max_deletes.unwrap_or(5);
    let confirm = args.confirm.unwrap_or(false);

    let mut conditions = Vec::new();
    if let Some(keyword) = &args.subject_keyword {
        conditions.push(format!("messageSubject contains \"{}\"", q(keyword)));
    }
    if let Some(sender) = &args.sender {
        conditions.push(format!("messageSender contains \"{}\"", q(sender)));
    }
    let condition_str = if conditions.is_empty() {
        "true".to_string()
    } else {
        conditions.join(" and ")
    };

    match args.action.as_str() {
        "empty_trash" => {
            let (delete_command, status_message) = if confirm {
                (
                    r#"repeat with aMessage in trashMessages
                    delete aMessage
                end repeat"#,
                    "✓ Emptied trash",
                )
            } else {
                (
                    "-- deletion skipped (dry run - set confirm=true to execute)",
                    "📋 PREVIEW - Would empty trash (set confirm=true to execute)",
                )
            };
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "EMPTYING TRASH" & return & return

            try
                set targetAccount to account "{account}"
                set trashMailbox to mailbox "Trash" of targetAccount
                set trashMessages to every message of trashMailbox
                set messageCount to count of trashMessages

                {delete_command}

                set outputText to outputText & "{status_message}" & return
                set outputText to outputText & "   Messages in trash: " & messageCount & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                account = q(&args.account),
            ))
        }
        "delete_permanent" => {
            let (delete_command, status_message, header_message) = if confirm {
                (
                    "delete aMessage",
                    "✓ Permanently deleted",
                    "PERMANENTLY DELETING EMAILS",
                )
            } else {
                (
                    "-- delete aMessage (dry run - set confirm=true to execute)",
                    "📋 Would permanently delete",
                    "PREVIEW - PERMANENT DELETION (set confirm=true to execute)",
                )
            };
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "{header_message}" & return & return
            set deleteCount to 0

            try
                set targetAccount to account "{account}"
                set trashMailbox to mailbox "Trash" of targetAccount
                set trashMessages to every message of trashMailbox

                repeat with aMessage in trashMessages
                    if deleteCount >= {max_deletes} then exit repeat

                    try
                        set messageSubject to subject of aMessage
                        set messageSender to sender of aMessage

                        if {condition_str} then
                            set outputText to outputText & "{status_message}: " & messageSubject & return
                            set outputText to outputText & "   From: " & messageSender & return & return

                            {delete_command}
                            set deleteCount to deleteCount + 1
                        end if
                    end try
                end repeat

                set outputText to outputText & "========================================" & return
                set outputText to outputText & "TOTAL: " & deleteCount & " email(s)" & return
                set outputText to outputText & "========================================" & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                account = q(&args.account),
            ))
        }
        "move_to_trash" => Ok(format!(
            r#"
        tell application "Mail"
            set outputText to "MOVING EMAILS TO TRASH" & return & return
            set deleteCount to 0

            try
                set targetAccount to account "{account}"
                try
                    {source_lookup}
                on error errMsg
                    error "Mailbox not found: {mailbox_name}. " & errMsg
                end try

                set trashMailbox to mailbox "Trash" of targetAccount
                set sourceMessages to every message of sourceMailbox

                repeat with aMessage in sourceMessages
                    if deleteCount >= {max_deletes} then exit repeat

                    try
                        set messageSubject to subject of aMessage
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage

                        if {condition_str} then
                            move aMessage to trashMailbox

                            set outputText to outputText & "✓ Moved to trash: " & messageSubject & return
                            set outputText to outputText & "   From: " & messageSender & return
                            set outputText to outputText & "   Date: " & (messageDate as string) & return & return

                            set deleteCount to deleteCount + 1
                        end if
                    end try
                end repeat

                set outputText to outputText & "========================================" & return
                set outputText to outputText & "TOTAL MOVED TO TRASH: " & deleteCount & " email(s)" & return
                set outputText to outputText & "========================================" & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
            account = q(&args.account),
            source_lookup = mailbox_lookup(mailbox, "targetAccount", "sourceMailbox"),
            mailbox_name = q(mailbox),
        )),
        other => Err(format!(
            "Error: Invalid action '{other}'. Use: move_to_trash, delete_permanent, empty_trash"
        )),
    }
}

pub(crate) fn forward_script(args: &ForwardArgs) -> String {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let message = args.message.as_deref().map(q).unwrap_or_default();
    let (send_command, status_message) = if args.confirm.unwrap_or(false) {
        ("send forwardMessage", "✓ Email forwarded successfully!")
    } else {
        (
            "-- send forwardMessage (dry run - set confirm=true to send)",
            "📋 PREVIEW - Forward prepared but NOT sent (set confirm=true to send)",
        )
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "FORWARDING EMAIL" & return & return

        try
            set targetAccount to account "{account}"
            {mailbox_lookup}

            set mailboxMessages to every message of targetMailbox
            set foundMessage to missing value

            repeat with aMessage in mailboxMessages
                try
                    set messageSubject to subject of aMessage

                    if messageSubject contains "{keyword}" then
                        set foundMessage to aMessage
                        exit repeat
                    end if
                end try
            end repeat

            if foundMessage is not missing value then
                set messageSubject to subject of foundMessage
                set messageSender to sender of foundMessage
                set messageDate to date received of foundMessage

                set forwardMessage to forward foundMessage with opening window

                set sender of forwardMessage to targetAccount

                make new to recipient at end of to recipients of forwardMessage with properties {{address:"{to}"}}

                if "{message}" is not "" then
                    set content of forwardMessage to "{message}" & return & return & content of forwardMessage
                end if

                {send_command}

                set outputText to outputText & "{status_message}" & return & return
                set outputText to outputText & "Original email:" & return
                set outputText to outputText & "  Subject: " & messageSubject & return
                set outputText to outputText & "  From: " & messageSender & return
                set outputText to outputText & "  Date: " & (messageDate as string) & return & return
                set outputText to outputText & "Forwarded to: {to}" & return

            else
                set outputText to outputText & "⚠ No email found matching: {keyword}" & return
            end if

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        account = q(&args.account),
        mailbox_lookup = guarded_mailbox_lookup(mailbox, "targetAccount", "targetMailbox"),
        keyword = q(&args.subject_keyword),
        to = q(&args.to),
    )
}

pub(crate) fn thread_script(args: &ThreadArgs) -> String {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let max_messages = args.max_messages.unwrap_or(50);

    // Strip reply/forward prefixes so "Re: Re: Topic" matches "Topic".
    let mut cleaned = args.subject_keyword.clone();
    for prefix in ["Re:", "Fwd:", "FW:", "RE:", "Fw:"] {
        cleaned = cleaned.replace(prefix, "");
    }
    let cleaned = cleaned.trim().to_string();

    let mailbox_script = if mailbox == "All" {
        r#"
            set searchMailboxes to every mailbox of targetAccount
"#
        .to_string()
    } else {
        format!(
            "{}\n            set searchMailboxes to {{searchMailbox}}\n",
            guarded_mailbox_lookup(mailbox, "targetAccount", "searchMailbox")
        )
    };

    format!(
        r#"
    tell application "Mail"
        set outputText to "EMAIL THREAD VIEW" & return & return
        set outputText to outputText & "Thread topic: {topic}" & return
        set outputText to outputText & "Account: {account}" & return & return
        set threadMessages to {{}}

        try
            set targetAccount to account "{account}"
            {mailbox_script}

            repeat with currentMailbox in searchMailboxes
                set mailboxMessages to every message of currentMailbox

                repeat with aMessage in mailboxMessages
                    if (count of threadMessages) >= {max_messages} then exit repeat

                    try
                        set messageSubject to subject of aMessage

                        set cleanSubject to messageSubject
                        if cleanSubject starts with "Re: " then
                            set cleanSubject to text 5 thru -1 of cleanSubject
                        end if
                        if cleanSubject starts with "Fwd: " or cleanSubject starts with "FW: " then
                            set cleanSubject to text 6 thru -1 of cleanSubject
                        end if

                        if cleanSubject contains "{topic}" or messageSubject contains "{topic}" then
                            set end of threadMessages to aMessage
                        end if
                    end try
                end repeat
            end repeat

            set messageCount to count of threadMessages
            set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
            set outputText to outputText & "FOUND " & messageCount & " MESSAGE(S) IN THREAD" & return
            set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return & return

            repeat with aMessage in threadMessages
                try
                    set messageSubject to subject of aMessage
                    set messageSender to sender of aMessage
                    set messageDate to date received of aMessage
                    set messageRead to read status of aMessage

                    if messageRead then
                        set readIndicator to "✓"
                    else
                        set readIndicator to "✉"
                    end if

                    set outputText to outputText & readIndicator & " " & messageSubject & return
                    set outputText to outputText & "   From: " & messageSender & return
                    set outputText to outputText & "   Date: " & (messageDate as string) & return
                    {preview}
                    set outputText to outputText & return
                end try
            end repeat

        on error errMsg
            return "Error: " & errMsg
        end try

        return outputText
    end tell
"#,
        topic = q(&cleaned),
        account = q(&args.account),
        preview = content_preview(150, "Preview"),
    )
}

pub(crate) fn manage_drafts_script(args: &ManageDraftsArgs) -> Result<String, String> {
    let confirm = args.confirm.unwrap_or(false);
    match args.action.as_str() {
        "list" => Ok(format!(
            r#"
        tell application "Mail"
            set outputText to "DRAFT EMAILS - {account}" & return & return

            try
                set targetAccount to account "{account}"
                set draftsMailbox to mailbox "Drafts" of targetAccount
                set draftMessages to every message of draftsMailbox
                set draftCount to count of draftMessages

                set outputText to outputText & "Found " & draftCount & " draft(s)" & return & return

                repeat with aDraft in draftMessages
                    try
                        set draftSubject to subject of aDraft
                        set draftDate to date sent of aDraft

                        set outputText to outputText & "✉ " & draftSubject & return
                        set outputText to outputText & "   Created: " & (draftDate as string) & return & return
                    end try
                end repeat

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
            account = q(&args.account),
        )),
        "create" => {
            let (Some(subject), Some(to), Some(body)) = (&args.subject, &args.to, &args.body)
            else {
                return Err(
                    "Error: 'subject', 'to', and 'body' are required for creating drafts"
                        .to_string(),
                );
            };
            let cc_script = args
                .cc
                .as_deref()
                .map(|cc| recipient_clauses("cc", cc, "newDraft"))
                .unwrap_or_default();
            let bcc_script = args
                .bcc
                .as_deref()
                .map(|bcc| recipient_clauses("bcc", bcc, "newDraft"))
                .unwrap_or_default();
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "CREATING DRAFT" & return & return

            try
                set targetAccount to account "{account}"

                set newDraft to make new outgoing message with properties {{subject:"{subject}", content:"{body}", visible:false}}

                set sender of newDraft to targetAccount

                tell newDraft
                    make new to recipient at end of to recipients with properties {{address:"{to}"}}
                    {cc_script}
                    {bcc_script}
                end tell

                set outputText to outputText & "✓ Draft created successfully!" & return & return
                set outputText to outputText & "Subject: {subject}" & return
                set outputText to outputText & "To: {to}" & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                account = q(&args.account),
                subject = q(subject),
                body = q(body),
                to = q(to),
            ))
        }
        action @ ("send" | "delete") => {
            let Some(draft_subject) = &args.draft_subject else {
                let verb = if action == "send" { "sending" } else { "deleting" };
                return Err(format!("Error: 'draft_subject' is required for {verb} drafts"));
            };
            let (command, status_message, header_message) = match (action, confirm) {
                ("send", true) => (
                    "send foundDraft",
                    "✓ Draft sent successfully!",
                    "SENDING DRAFT",
                ),
                ("send", false) => (
                    "-- send foundDraft (dry run - set confirm=true to send)",
                    "📋 PREVIEW - Draft found but NOT sent (set confirm=true to send)",
                    "PREVIEW - SEND DRAFT",
                ),
                ("delete", true) => (
                    "delete foundDraft",
                    "✓ Draft deleted successfully!",
                    "DELETING DRAFT",
                ),
                _ => (
                    "-- delete foundDraft (dry run - set confirm=true to delete)",
                    "📋 PREVIEW - Draft found but NOT deleted (set confirm=true to delete)",
                    "PREVIEW - DELETE DRAFT",
                ),
            };
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "{header_message}" & return & return

            try
                set targetAccount to account "{account}"
                set draftsMailbox to mailbox "Drafts" of targetAccount
                set draftMessages to every message of draftsMailbox
                set foundDraft to missing value

                repeat with aDraft in draftMessages
                    try
                        set draftSubject to subject of aDraft

                        if draftSubject contains "{draft_subject}" then
                            set foundDraft to aDraft
                            exit repeat
                        end if
                    end try
                end repeat

                if foundDraft is not missing value then
                    set draftSubject to subject of foundDraft

                    {command}

                    set outputText to outputText & "{status_message}" & return
                    set outputText to outputText & "Subject: " & draftSubject & return

                else
                    set outputText to outputText & "⚠ No draft found matching: {draft_subject}" & return
                end if

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                account = q(&args.account),
                draft_subject = q(draft_subject),
            ))
        }
        other => Err(format!(
            "Error: Invalid action '{other}'. Use: list, create, send, delete"
        )),
    }
}

pub(crate) fn statistics_script(args: &StatisticsArgs) -> Result<String, String> {
    let scope = args.scope.as_deref().unwrap_or("account_overview");
    let days_back = args.days_back.unwrap_or(30);

    let (date_filter, date_check) = if days_back > 0 {
        (
            format!("set targetDate to (current date) - ({days_back} * days)"),
            "and messageDate > targetDate",
        )
    } else {
        (String::new(), "")
    };

    match scope {
        "account_overview" => Ok(format!(
            r#"
        tell application "Mail"
            set outputText to "EMAIL STATISTICS - {account}" & return & return

            {date_filter}

            try
                set targetAccount to account "{account}"
                set allMailboxes to every mailbox of targetAccount

                set totalEmails to 0
                set totalUnread to 0
                set totalRead to 0
                set totalFlagged to 0
                set totalWithAttachments to 0
                set senderCounts to {{}}
                set mailboxCounts to {{}}

                repeat with aMailbox in allMailboxes
                    set mailboxName to name of aMailbox
                    set mailboxMessages to every message of aMailbox
                    set mailboxTotal to 0

                    repeat with aMessage in mailboxMessages
                        try
                            set messageDate to date received of aMessage

                            if true {date_check} then
                                set totalEmails to totalEmails + 1
                                set mailboxTotal to mailboxTotal + 1

                                if read status of aMessage then
                                    set totalRead to totalRead + 1
                                else
                                    set totalUnread to totalUnread + 1
                                end if

                                try
                                    if flagged status of aMessage then
                                        set totalFlagged to totalFlagged + 1
                                    end if
                                end try

                                set attachmentCount to count of mail attachments of aMessage
                                if attachmentCount > 0 then
                                    set totalWithAttachments to totalWithAttachments + 1
                                end if

                                set messageSender to sender of aMessage
                                set senderFound to false
                                repeat with senderPair in senderCounts
                                    if item 1 of senderPair is messageSender then
                                        set item 2 of senderPair to (item 2 of senderPair) + 1
                                        set senderFound to true
                                        exit repeat
                                    end if
                                end repeat
                                if not senderFound then
                                    set end of senderCounts to {{messageSender, 1}}
                                end if
                            end if
                        end try
                    end repeat

                    if mailboxTotal > 0 then
                        set end of mailboxCounts to {{mailboxName, mailboxTotal}}
                    end if
                end repeat

                set outputText to outputText & "📊 VOLUME METRICS" & return
                set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
                set outputText to outputText & "Total Emails: " & totalEmails & return
                if totalEmails > 0 then
                    set outputText to outputText & "Unread: " & totalUnread & " (" & (round ((totalUnread / totalEmails) * 100)) & "%)" & return
                    set outputText to outputText & "Read: " & totalRead & " (" & (round ((totalRead / totalEmails) * 100)) & "%)" & return
                    set outputText to outputText & "Flagged: " & totalFlagged & return
                    set outputText to outputText & "With Attachments: " & totalWithAttachments & " (" & (round ((totalWithAttachments / totalEmails) * 100)) & "%)" & return
                end if
                set outputText to outputText & return

                set outputText to outputText & "👥 TOP SENDERS" & return
                set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
                set topCount to 0
                repeat with senderPair in senderCounts
                    set topCount to topCount + 1
                    if topCount > 5 then exit repeat
                    set outputText to outputText & item 1 of senderPair & ": " & item 2 of senderPair & " emails" & return
                end repeat
                set outputText to outputText & return

                set outputText to outputText & "📁 MAILBOX DISTRIBUTION" & return
                set outputText to outputText & "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━" & return
                set topCount to 0
                repeat with mailboxPair in mailboxCounts
                    set topCount to topCount + 1
                    if topCount > 5 then exit repeat
                    if totalEmails > 0 then
                        set mailboxPercent to round ((item 2 of mailboxPair / totalEmails) * 100)
                        set outputText to outputText & item 1 of mailboxPair & ": " & item 2 of mailboxPair & " (" & mailboxPercent & "%)" & return
                    end if
                end repeat

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
            account = q(&args.account),
        )),
        "sender_stats" => {
            let Some(sender) = &args.sender else {
                return Err("Error: 'sender' parameter required for sender_stats scope".to_string());
            };
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "SENDER STATISTICS" & return & return
            set outputText to outputText & "Sender: {sender}" & return
            set outputText to outputText & "Account: {account}" & return & return

            {date_filter}

            try
                set targetAccount to account "{account}"
                set allMailboxes to every mailbox of targetAccount

                set totalFromSender to 0
                set unreadFromSender to 0
                set withAttachments to 0

                repeat with aMailbox in allMailboxes
                    set mailboxMessages to every message of aMailbox

                    repeat with aMessage in mailboxMessages
                        try
                            set messageSender to sender of aMessage
                            set messageDate to date received of aMessage

                            if messageSender contains "{sender}" {date_check} then
                                set totalFromSender to totalFromSender + 1

                                if not (read status of aMessage) then
                                    set unreadFromSender to unreadFromSender + 1
                                end if

                                if (count of mail attachments of aMessage) > 0 then
                                    set withAttachments to withAttachments + 1
                                end if
                            end if
                        end try
                    end repeat
                end repeat

                set outputText to outputText & "Total emails: " & totalFromSender & return
                set outputText to outputText & "Unread: " & unreadFromSender & return
                set outputText to outputText & "With attachments: " & withAttachments & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                sender = q(sender),
                account = q(&args.account),
            ))
        }
        "mailbox_breakdown" => {
            let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "MAILBOX STATISTICS" & return & return
            set outputText to outputText & "Mailbox: {mailbox_name}" & return
            set outputText to outputText & "Account: {account}" & return & return

            try
                set targetAccount to account "{account}"
                {mailbox_lookup}

                set mailboxMessages to every message of targetMailbox
                set totalMessages to count of mailboxMessages
                set unreadMessages to unread count of targetMailbox

                set outputText to outputText & "Total messages: " & totalMessages & return
                set outputText to outputText & "Unread: " & unreadMessages & return
                set outputText to outputText & "Read: " & (totalMessages - unreadMessages) & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                mailbox_name = q(mailbox),
                account = q(&args.account),
                mailbox_lookup = guarded_mailbox_lookup(mailbox, "targetAccount", "targetMailbox"),
            ))
        }
        other => Err(format!(
            "Error: Invalid scope '{other}'. Use: account_overview, sender_stats, mailbox_breakdown"
        )),
    }
}

pub(crate) fn export_emails_script(args: &ExportArgs) -> Result<String, String> {
    let mailbox = args.mailbox.as_deref().unwrap_or("INBOX");
    let format_ext = args.format.as_deref().unwrap_or("txt");
    if format_ext != "txt" && format_ext != "html" {
        return Err(format!(
            "Error: Invalid format '{format_ext}'. Use: txt, html"
        ));
    }
    let save_dir = expand_tilde(args.save_directory.as_deref().unwrap_or("~/Desktop"));

    match args.scope.as_str() {
        "single_email" => {
            let Some(keyword) = &args.subject_keyword else {
                return Err("Error: 'subject_keyword' required for single_email scope".to_string());
            };
            Ok(format!(
                r#"
        tell application "Mail"
            set outputText to "EXPORTING EMAIL" & return & return

            try
                set targetAccount to account "{account}"
                {mailbox_lookup}

                set mailboxMessages to every message of targetMailbox
                set foundMessage to missing value

                repeat with aMessage in mailboxMessages
                    try
                        set messageSubject to subject of aMessage

                        if messageSubject contains "{keyword}" then
                            set foundMessage to aMessage
                            exit repeat
                        end if
                    end try
                end repeat

                if foundMessage is not missing value then
                    set messageSubject to subject of foundMessage
                    set messageSender to sender of foundMessage
                    set messageDate to date received of foundMessage
                    set messageContent to content of foundMessage

                    set safeSubject to messageSubject
                    set AppleScript's text item delimiters to "/"
                    set safeSubjectParts to text items of safeSubject
                    set AppleScript's text item delimiters to "-"
                    set safeSubject to safeSubjectParts as string
                    set AppleScript's text item delimiters to ""

                    set fileName to safeSubject & ".{ext}"
                    set filePath to "{save_dir}/" & fileName

                    if "{ext}" is "txt" then
                        set exportContent to "Subject: " & messageSubject & return
                        set exportContent to exportContent & "From: " & messageSender & return
                        set exportContent to exportContent & "Date: " & (messageDate as string) & return & return
                        set exportContent to exportContent & messageContent
                    else
                        set exportContent to "<html><body>"
                        set exportContent to exportContent & "<h2>" & messageSubject & "</h2>"
                        set exportContent to exportContent & "<p><strong>From:</strong> " & messageSender & "</p>"
                        set exportContent to exportContent & "<p><strong>Date:</strong> " & (messageDate as string) & "</p>"
                        set exportContent to exportContent & "<hr>" & messageContent
                        set exportContent to exportContent & "</body></html>"
                    end if

                    set fileRef to open for access POSIX file filePath with write permission
                    set eof of fileRef to 0
                    write exportContent to fileRef as «class utf8»
                    close access fileRef

                    set outputText to outputText & "✓ Email exported successfully!" & return & return
                    set outputText to outputText & "Subject: " & messageSubject & return
                    set outputText to outputText & "Saved to: " & filePath & return

                else
                    set outputText to outputText & "⚠ No email found matching: {keyword}" & return
                end if

            on error errMsg
                try
                    close access file filePath
                end try
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
                account = q(&args.account),
                mailbox_lookup = guarded_mailbox_lookup(mailbox, "targetAccount", "targetMailbox"),
                keyword = q(keyword),
                ext = format_ext,
                save_dir = q(&save_dir),
            ))
        }
        "entire_mailbox" => Ok(format!(
            r#"
        tell application "Mail"
            set outputText to "EXPORTING MAILBOX" & return & return

            try
                set targetAccount to account "{account}"
                {mailbox_lookup}

                set mailboxMessages to every message of targetMailbox
                set messageCount to count of mailboxMessages
                set exportCount to 0

                set exportDir to "{save_dir}/{mailbox_name}_export"
                do shell script "mkdir -p " & quoted form of exportDir

                repeat with aMessage in mailboxMessages
                    try
                        set messageSubject to subject of aMessage
                        set messageSender to sender of aMessage
                        set messageDate to date received of aMessage
                        set messageContent to content of aMessage

                        set exportCount to exportCount + 1
                        set fileName to exportCount & "_" & messageSubject & ".{ext}"

                        set AppleScript's text item delimiters to "/"
                        set fileNameParts to text items of fileName
                        set AppleScript's text item delimiters to "-"
                        set fileName to fileNameParts as string
                        set AppleScript's text item delimiters to ""

                        set filePath to exportDir & "/" & fileName

                        if "{ext}" is "txt" then
                            set exportContent to "Subject: " & messageSubject & return
                            set exportContent to exportContent & "From: " & messageSender & return
                            set exportContent to exportContent & "Date: " & (messageDate as string) & return & return
                            set exportContent to exportContent & messageContent
                        else
                            set exportContent to "<html><body>"
                            set exportContent to exportContent & "<h2>" & messageSubject & "</h2>"
                            set exportContent to exportContent & "<p><strong>From:</strong> " & messageSender & "</p>"
                            set exportContent to exportContent & "<p><strong>Date:</strong> " & (messageDate as string) & "</p>"
                            set exportContent to exportContent & "<hr>" & messageContent
                            set exportContent to exportContent & "</body></html>"
                        end if

                        set fileRef to open for access POSIX file filePath with write permission
                        set eof of fileRef to 0
                        write exportContent to fileRef as «class utf8»
                        close access fileRef

                    on error
                        -- keep exporting the rest of the mailbox
                    end try
                end repeat

                set outputText to outputText & "✓ Mailbox exported successfully!" & return & return
                set outputText to outputText & "Mailbox: {mailbox_name}" & return
                set outputText to outputText & "Total emails: " & messageCount & return
                set outputText to outputText & "Exported: " & exportCount & return
                set outputText to outputText & "Location: " & exportDir & return

            on error errMsg
                return "Error: " & errMsg
            end try

            return outputText
        end tell
"#,
            account = q(&args.account),
            mailbox_lookup = guarded_mailbox_lookup(mailbox, "targetAccount", "targetMailbox"),
            mailbox_name = q(mailbox),
            ext = format_ext,
            save_dir = q(&save_dir),
        )),
        other => Err(format!(
            "Error: Invalid scope '{other}'. Use: single_email, entire_mailbox"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_mailbox_paths_chain_qualifiers() {
        assert_eq!(
            nested_mailbox_ref("Archive", "targetAccount"),
            r#"mailbox "Archive" of targetAccount"#
        );
        assert_eq!(
            nested_mailbox_ref("Projects/Client/2024", "targetAccount"),
            r#"mailbox "2024" of mailbox "Client" of mailbox "Projects" of targetAccount"#
        );
    }

    #[test]
    fn inbox_lookup_uses_localized_discovery() {
        let script = mailbox_lookup("INBOX", "targetAccount", "searchMailbox");
        assert!(script.contains("possibleInboxNames"));
        assert!(script.contains("Boîte de réception"));
        let direct = mailbox_lookup("Archive", "targetAccount", "searchMailbox");
        assert!(direct.contains(r#"mailbox "Archive" of targetAccount"#));
        assert!(!direct.contains("possibleInboxNames"));
    }

    #[test]
    fn quoted_values_cannot_break_out() {
        let args = MoveEmailArgs {
            account: "Wo\"rk".to_string(),
            subject_keyword: "inject\" & (do shell script \"true\") & \"".to_string(),
            to_mailbox: "Archive".to_string(),
            from_mailbox: None,
            max_moves: None,
        };
        let script = move_email_script(&args);
        assert!(script.contains(r#"account "Wo\"rk""#));
        assert!(script.contains(r#"contains "inject\" & (do shell script \"true\") & \"""#));
    }

    #[test]
    fn reply_dry_run_comments_out_send() {
        let mut args = ReplyArgs {
            account: "Work".to_string(),
            subject_keyword: "Status".to_string(),
            reply_body: "On it".to_string(),
            reply_to_all: None,
            confirm: None,
        };
        let preview = reply_script(&args);
        assert!(preview.contains("-- send replyMessage"));
        assert!(preview.contains("NOT sent"));

        args.confirm = Some(true);
        args.reply_to_all = Some(true);
        let confirmed = reply_script(&args);
        assert!(confirmed.contains("\n                send replyMessage"));
        assert!(confirmed.contains("reply to all"));
    }

    #[test]
    fn compose_fans_out_cc_addresses() {
        let args = ComposeArgs {
            account: "Work".to_string(),
            to: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
            cc: Some("c@d.com, e@f.com".to_string()),
            bcc: None,
            confirm: Some(false),
        };
        let script = compose_script(&args);
        assert_eq!(script.matches("make new cc recipient").count(), 2);
        assert!(script.contains(r#"{address:"c@d.com"}"#));
        assert!(script.contains(r#"{address:"e@f.com"}"#));
        assert!(script.contains("-- send newMessage"));
    }

    #[test]
    fn search_builds_combined_conditions() {
        let args = SearchEmailsArgs {
            account: "Work".to_string(),
            mailbox: None,
            subject_keyword: Some("invoice".to_string()),
            sender: Some("billing".to_string()),
            has_attachments: Some(true),
            read_status: Some("unread".to_string()),
            include_content: None,
            max_results: None,
        };
        let script = search_emails_script(&args);
        assert!(script.contains(
            "messageSubject contains \"invoice\" and messageSender contains \"billing\" \
             and (count of mail attachments of aMessage) > 0 and messageRead is false"
        ));
    }

    #[test]
    fn search_without_filters_matches_everything() {
        let args = SearchEmailsArgs {
            account: "Work".to_string(),
            mailbox: Some("All".to_string()),
            subject_keyword: None,
            sender: None,
            has_attachments: None,
            read_status: Some("all".to_string()),
            include_content: None,
            max_results: None,
        };
        let script = search_emails_script(&args);
        assert!(script.contains("if true then"));
        assert!(script.contains("every mailbox of targetAccount"));
    }

    #[test]
    fn update_status_rejects_unknown_action() {
        let args = UpdateStatusArgs {
            account: "Work".to_string(),
            action: "explode".to_string(),
            subject_keyword: None,
            sender: None,
            mailbox: None,
            max_updates: None,
        };
        let err = update_status_script(&args).expect_err("invalid action");
        assert!(err.contains("Invalid action 'explode'"));
    }

    #[test]
    fn trash_actions_gate_on_confirm() {
        let mut args = ManageTrashArgs {
            account: "Work".to_string(),
            action: "empty_trash".to_string(),
            subject_keyword: None,
            sender: None,
            mailbox: None,
            max_deletes: None,
            confirm: None,
        };
        let preview = manage_trash_script(&args).expect("script");
        assert!(preview.contains("-- deletion skipped"));

        args.confirm = Some(true);
        let confirmed = manage_trash_script(&args).expect("script");
        assert!(confirmed.contains("delete aMessage"));

        args.action = "move_to_trash".to_string();
        args.confirm = None;
        let moved = manage_trash_script(&args).expect("script");
        assert!(moved.contains("move aMessage to trashMailbox"));
    }

    #[test]
    fn thread_strips_reply_prefixes() {
        let args = ThreadArgs {
            account: "Work".to_string(),
            subject_keyword: "Re: Fwd: Project Update".to_string(),
            mailbox: None,
            max_messages: None,
        };
        let script = thread_script(&args);
        assert!(script.contains(r#"contains "Project Update""#));
        assert!(!script.contains(r#"Thread topic: Re:"#));
    }

    #[test]
    fn drafts_create_requires_fields() {
        let args = ManageDraftsArgs {
            account: "Work".to_string(),
            action: "create".to_string(),
            subject: Some("Hi".to_string()),
            to: None,
            body: None,
            cc: None,
            bcc: None,
            draft_subject: None,
            confirm: None,
        };
        let err = manage_drafts_script(&args).expect_err("missing fields");
        assert!(err.contains("'subject', 'to', and 'body' are required"));
    }

    #[test]
    fn statistics_scope_validation() {
        let mut args = StatisticsArgs {
            account: "Work".to_string(),
            scope: Some("sender_stats".to_string()),
            sender: None,
            mailbox: None,
            days_back: None,
        };
        let err = statistics_script(&args).expect_err("missing sender");
        assert!(err.contains("'sender' parameter required"));

        args.sender = Some("boss@example.com".to_string());
        let script = statistics_script(&args).expect("script");
        assert!(script.contains("SENDER STATISTICS"));
        assert!(script.contains("targetDate"));

        args.scope = Some("nope".to_string());
        assert!(statistics_script(&args).is_err());
    }

    #[test]
    fn statistics_all_time_skips_date_filter() {
        let args = StatisticsArgs {
            account: "Work".to_string(),
            scope: None,
            sender: None,
            mailbox: None,
            days_back: Some(0),
        };
        let script = statistics_script(&args).expect("script");
        assert!(!script.contains("targetDate"));
    }

    #[test]
    fn export_validates_scope_and_format() {
        let mut args = ExportArgs {
            account: "Work".to_string(),
            scope: "single_email".to_string(),
            subject_keyword: None,
            mailbox: None,
            save_directory: None,
            format: None,
        };
        let err = export_emails_script(&args).expect_err("missing keyword");
        assert!(err.contains("'subject_keyword' required"));

        args.subject_keyword = Some("Report".to_string());
        args.format = Some("pdf".to_string());
        let err = export_emails_script(&args).expect_err("bad format");
        assert!(err.contains("Invalid format 'pdf'"));

        args.format = Some("html".to_string());
        let script = export_emails_script(&args).expect("script");
        assert!(script.contains("<html><body>"));

        args.scope = "entire_mailbox".to_string();
        let script = export_emails_script(&args).expect("script");
        assert!(script.contains("mkdir -p"));
    }

    #[test]
    fn list_inbox_account_filter_is_optional() {
        let mut args = ListInboxArgs {
            account: None,
            max_emails: None,
            include_read: None,
        };
        let all = list_inbox_script(&args);
        assert!(!all.contains("if accountName is"));

        args.account = Some("Work".to_string());
        let filtered = list_inbox_script(&args);
        assert!(filtered.contains(r#"if accountName is "Work" then"#));
    }
}
