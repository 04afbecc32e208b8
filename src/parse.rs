//! Decoders for the line-oriented output the generated scripts emit.
//!
//! The email-list format is a record-block layout: a subject line prefixed
//! with a read marker, indented `From:` / `Date:` / `Preview:` lines, and a
//! `TOTAL EMAILS` footer. Everything here is a pure function of its input;
//! garbled output degrades to whatever records are still recoverable.

use crate::EmailRecord;

const UNREAD_MARKER: char = '\u{2709}'; // ✉
const READ_MARKER: char = '\u{2713}'; // ✓

/// Decorative prefixes that carry no record data: banner fills, section
/// icons, warning lines.
fn is_noise(line: &str) -> bool {
    line.starts_with('=')
        || line.starts_with('\u{2501}') // ━
        || line.starts_with('\u{1F4E7}') // 📧
        || line.starts_with('\u{26A0}') // ⚠
}

pub(crate) fn parse_email_list(output: &str) -> Vec<EmailRecord> {
    let mut emails = Vec::new();
    let mut current: Option<EmailRecord> = None;

    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() || is_noise(line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix(UNREAD_MARKER) {
            emails.extend(current.take());
            current = Some(EmailRecord::new(rest.trim().to_string(), false));
        } else if let Some(rest) = line.strip_prefix(READ_MARKER) {
            emails.extend(current.take());
            current = Some(EmailRecord::new(rest.trim().to_string(), true));
        } else if let Some(rest) = line.strip_prefix("From:") {
            if let Some(email) = current.as_mut() {
                email.sender = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Date:") {
            if let Some(email) = current.as_mut() {
                email.date = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Preview:") {
            if let Some(email) = current.as_mut() {
                email.preview = Some(rest.trim().to_string());
            }
        } else if line.starts_with("TOTAL EMAILS") {
            break;
        }
        // Anything else is prose from the script (counts, section labels);
        // it neither opens nor touches a record.
    }

    // `take()` on every append means a record can flush at most once,
    // whether scanning ended at the footer or ran off the end of input.
    emails.extend(current.take());
    emails
}

/// Decode the `Account:3|Other:ERROR` list the unread-count script returns.
/// `ERROR` means the account's inbox could not be read and maps to -1.
pub(crate) fn parse_unread_counts(output: &str) -> Vec<(String, i64)> {
    let mut counts = Vec::new();
    for item in output.split('|') {
        let Some((account, count)) = item.split_once(':') else {
            continue;
        };
        let value = if count.trim() == "ERROR" {
            -1
        } else {
            match count.trim().parse::<i64>() {
                Ok(n) => n,
                Err(_) => continue,
            }
        };
        counts.push((account.trim().to_string(), value));
    }
    counts
}

/// Decode the `|`-joined account-name list.
pub(crate) fn parse_account_list(output: &str) -> Vec<String> {
    if output.trim().is_empty() {
        return Vec::new();
    }
    output.split('|').map(|name| name.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, is_read: bool) -> EmailRecord {
        EmailRecord::new(subject.to_string(), is_read)
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_email_list("").is_empty());
        assert!(parse_email_list("\n\n   \n").is_empty());
    }

    #[test]
    fn single_record_with_fields_and_footer() {
        let input = "✉ Hello\n   From: a@b.com\n   Date: 2024-01-01\nTOTAL EMAILS: 1\n";
        let emails = parse_email_list(input);
        assert_eq!(emails.len(), 1);
        let mut expected = record("Hello", false);
        expected.sender = Some("a@b.com".to_string());
        expected.date = Some("2024-01-01".to_string());
        assert_eq!(emails[0], expected);
    }

    #[test]
    fn footer_stops_scanning() {
        let input = "✉ First\nTOTAL EMAILS: 1\n✓ After footer\n   From: x@y.z\n";
        let emails = parse_email_list(input);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "First");
    }

    #[test]
    fn record_flushes_exactly_once_at_footer() {
        // Footer present: the end-of-input path must not duplicate the
        // record the footer already appended.
        let input = "✓ Only one\nTOTAL EMAILS: 1";
        let emails = parse_email_list(input);
        assert_eq!(emails, vec![record("Only one", true)]);
    }

    #[test]
    fn trailing_record_without_footer_is_kept() {
        let input = "✉ Dangling\n   From: a@b.com";
        let emails = parse_email_list(input);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].sender.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn consecutive_start_lines_each_produce_a_record() {
        let input = "✉ One\n✓ Two\n✉ Three\n";
        let emails = parse_email_list(input);
        assert_eq!(
            emails,
            vec![record("One", false), record("Two", true), record("Three", false)]
        );
    }

    #[test]
    fn read_marker_sets_flag() {
        let emails = parse_email_list("✓ Seen it\n");
        assert_eq!(emails, vec![record("Seen it", true)]);
    }

    #[test]
    fn noise_and_unknown_lines_are_inert() {
        let input = "\
========================================
━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
📧 ACCOUNT: Work (3 messages)
⚠ Error accessing inbox for account Stale
✉ Kept
   Mailbox: Archive
   some stray prose line
   From: keep@example.com
";
        let emails = parse_email_list(input);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "Kept");
        assert_eq!(emails[0].sender.as_deref(), Some("keep@example.com"));
        assert!(emails[0].date.is_none());
    }

    #[test]
    fn field_line_without_open_record_is_ignored() {
        let input = "From: orphan@example.com\n✉ Real\n";
        let emails = parse_email_list(input);
        assert_eq!(emails, vec![record("Real", false)]);
    }

    #[test]
    fn preview_field_attaches() {
        let input = "✉ Subject line\n   Preview: the first 200 chars...\n";
        let emails = parse_email_list(input);
        assert_eq!(emails[0].preview.as_deref(), Some("the first 200 chars..."));
    }

    /// Re-serialize records in the documented layout and parse them back.
    fn render(emails: &[EmailRecord]) -> String {
        let mut out = String::new();
        for email in emails {
            let marker = if email.is_read { '✓' } else { '✉' };
            out.push_str(&format!("{marker} {}\n", email.subject));
            if let Some(sender) = &email.sender {
                out.push_str(&format!("   From: {sender}\n"));
            }
            if let Some(date) = &email.date {
                out.push_str(&format!("   Date: {date}\n"));
            }
            if let Some(preview) = &email.preview {
                out.push_str(&format!("   Preview: {preview}\n"));
            }
            out.push('\n');
        }
        out.push_str(&format!("TOTAL EMAILS: {}\n", emails.len()));
        out
    }

    #[test]
    fn rendered_records_round_trip() {
        let mut first = record("Status update", true);
        first.sender = Some("pm@example.com".to_string());
        first.date = Some("Mon, 1 Jan 2024".to_string());
        let mut second = record("Invoice #42", false);
        second.preview = Some("Please find attached".to_string());
        let originals = vec![first, second, record("Bare subject", false)];

        let reparsed = parse_email_list(&render(&originals));
        assert_eq!(reparsed, originals);
    }

    #[test]
    fn unread_counts_decode() {
        let counts = parse_unread_counts("Work:5|Personal:0|Stale:ERROR");
        assert_eq!(
            counts,
            vec![
                ("Work".to_string(), 5),
                ("Personal".to_string(), 0),
                ("Stale".to_string(), -1),
            ]
        );
    }

    #[test]
    fn unread_counts_skip_malformed_items() {
        let counts = parse_unread_counts("no-colon|Work:abc|Good:2");
        assert_eq!(counts, vec![("Good".to_string(), 2)]);
    }

    #[test]
    fn account_list_decode() {
        assert_eq!(
            parse_account_list("Work|Personal"),
            vec!["Work".to_string(), "Personal".to_string()]
        );
        assert!(parse_account_list("").is_empty());
        assert!(parse_account_list("   ").is_empty());
    }
}
