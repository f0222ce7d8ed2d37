//! Diagnostics output that can never print a tracked secret.
//!
//! Every formatted event is written through a [`RedactingWriter`] wrapping
//! the configured destination (stderr, a log file, both, or nowhere):
//!
//! ```ignore
//! let store = Arc::new(SecretStore::new(["hunter2"]));
//! let handle = logging::init(&LogConfig::default(), store.clone())?;
//! tracing::warn!("login with hunter2");   // emitted as "login with *******"
//! handle.close()?;
//! ```
//!
//! The redaction window means the tail of the output is held back until
//! [`LogHandle::close`] runs, so close the handle before exiting.

pub mod config;

pub use config::{level_from_verbosity, LogConfig, LogLevel};

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, time::ChronoLocal, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{LogscrubError, Result};
use crate::redact::{RedactingWriter, Redactor, Sink, Tee};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl<'a, W: Sink + 'static> MakeWriter<'a> for RedactingWriter<W> {
    type Writer = &'a RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}

/// Keeps the redacting log writer reachable so it can be flushed at exit.
#[derive(Debug, Clone)]
pub struct LogHandle {
    writer: RedactingWriter<Box<dyn Sink>>,
}

impl LogHandle {
    pub fn writer(&self) -> &RedactingWriter<Box<dyn Sink>> {
        &self.writer
    }

    /// Flush the held-back window and close the destination.
    pub fn close(&self) -> Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

/// Install the global subscriber writing through a redacting writer.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init(config: &LogConfig, redactor: Arc<dyn Redactor>) -> Result<LogHandle> {
    let writer = RedactingWriter::new(open_sink(config)?, redactor);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(layer::<Registry, _>(config, writer.clone()).with_filter(filter))
        .try_init()
        .map_err(|e| LogscrubError::LoggingInit {
            reason: e.to_string(),
        })?;

    Ok(LogHandle { writer })
}

/// Formatting layer writing through `writer`, without installing anything.
pub fn layer<S, W>(config: &LogConfig, writer: RedactingWriter<W>) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Sink + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);
    let timer = ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    match (config.structured, config.timestamps) {
        (true, true) => base.json().with_timer(timer).boxed(),
        (true, false) => base.json().without_time().boxed(),
        (false, true) => base.with_timer(timer).boxed(),
        (false, false) => base.without_time().boxed(),
    }
}

/// Destination selected by `console` and `file`.
pub fn open_sink(config: &LogConfig) -> Result<Box<dyn Sink>> {
    let file = config.file.as_deref().map(open_log_file).transpose()?;
    let sink: Box<dyn Sink> = match (config.console, file) {
        (true, Some(file)) => Box::new(Tee::new(io::stderr(), file)),
        (true, None) => Box::new(io::stderr()),
        (false, Some(file)) => Box::new(file),
        (false, None) => Box::new(io::sink()),
    };
    Ok(sink)
}

fn open_log_file(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path).map_err(|source| LogscrubError::LogFile {
        path: path.to_path_buf(),
        source,
    })
}
