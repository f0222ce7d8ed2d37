//! Streaming secret redaction for log output.
//!
//! Track literal secrets in a [`redact::SecretStore`], combine stores with
//! [`redact::RedactorCollection`], and wrap any output in a
//! [`redact::RedactingWriter`] so that secrets never reach it, even when a
//! secret is split across separate writes.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod redact;

pub use error::{LogscrubError, Result};
