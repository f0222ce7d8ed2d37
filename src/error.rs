use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LogscrubError {
    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("unable to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret source {name}: {reason}")]
    SecretSource { name: String, reason: String },

    #[error("logging init error: {reason}")]
    LoggingInit { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogscrubError>;
