//! Credential masking for log output.
//!
//! The outbound message always carries raw values; only diagnostics go
//! through [`redact`].

use serde_json::Value;

use super::escape::coerce;
use super::Submission;

pub const MASK_CHAR: char = '*';

/// Top-level keys holding credential material.
const TOP_LEVEL_SECRETS: [&str; 2] = ["loginPin", "otp"];
/// Keys inside `loanData` holding credential material.
const LOAN_SECRETS: [&str; 2] = ["pin", "otp"];

/// Mask all but the last two characters. Two or fewer are fully masked.
pub fn mask(text: &str) -> String {
    let len = text.chars().count();
    if len <= 2 {
        return MASK_CHAR.to_string().repeat(len);
    }

    let mut masked: String = std::iter::repeat(MASK_CHAR).take(len - 2).collect();
    masked.extend(text.chars().skip(len - 2));
    masked
}

/// Copy of `submission` with credential fields masked.
///
/// The key set is unchanged and absent fields stay absent.
pub fn redact(submission: &Submission) -> Submission {
    let mut redacted = submission.clone();

    for key in TOP_LEVEL_SECRETS {
        if let Some(value) = redacted.get_mut(key) {
            mask_value(value);
        }
    }

    if let Some(Value::Object(loan)) = redacted.get_mut("loanData") {
        for key in LOAN_SECRETS {
            if let Some(value) = loan.get_mut(key) {
                mask_value(value);
            }
        }
    }

    redacted
}

fn mask_value(value: &mut Value) {
    if value.is_null() {
        return;
    }
    let masked = mask(&coerce(Some(&*value)));
    *value = Value::String(masked);
}
