//! Submission relay: decoding, rendering and the request handler.
//!
//! A request flows strictly in sequence:
//! method check → configuration check → body decode → format → deliver.
//! Failures before delivery never reach the network.

pub mod escape;
mod format;
mod handler;
pub mod redact;
mod submission;

pub use escape::{escape, escape_text, ESCAPE_MARKER, METACHARACTERS};
pub use format::{format, FormattedMessage, HEADER, TRUNCATION_MARKER};
pub use handler::relay_submission;
pub use redact::{mask, redact, MASK_CHAR};
pub use submission::{DecodeError, Submission};
