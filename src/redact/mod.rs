pub mod collection;
pub mod sink;
pub mod store;
pub mod writer;

use std::sync::Arc;

pub use collection::RedactorCollection;
pub use sink::{Sink, Tee, Uncloseable};
pub use store::SecretStore;
pub use writer::{RedactingWriter, WriteError};

/// Replacement text for every matched secret, whatever its length.
pub const MARKER: &str = "*******";

/// Secrets shorter than this (in bytes) are never tracked.
pub const MIN_SECRET_LEN: usize = 2;

/// A source of redaction: something that knows a set of literal secrets and
/// can scrub them out of text.
pub trait Redactor: Send + Sync {
    /// Replace every occurrence of every known secret with [`MARKER`].
    fn redact_string(&self, input: &str) -> String;

    /// Snapshot of every secret currently known to this redactor.
    fn values(&self) -> Vec<String>;

    /// Opaque identity used to drop duplicate redactors from a collection.
    fn id(&self) -> String;

    /// Members of a composite redactor. Collections splice these into a
    /// parent collection instead of nesting.
    fn members(&self) -> Option<Vec<Arc<dyn Redactor>>> {
        None
    }
}
