use std::collections::HashSet;
use std::sync::RwLock;

use super::{Redactor, MARKER, MIN_SECRET_LEN};

/// Thread-safe set of literal secrets with a stable identity.
///
/// Readers (`values`, `redact_string`) share the lock; `add` takes it
/// exclusively. Share a store between collections and writers with `Arc`;
/// additions are visible to every holder on its next read.
///
/// Iteration over the set has no defined order. When one secret is a
/// substring of another, which one is replaced first is unspecified, so the
/// longer secret may come out as `*******` plus a visible tail.
#[derive(Debug)]
pub struct SecretStore {
    secrets: RwLock<HashSet<String>>,
    id: String,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl SecretStore {
    /// Build a store seeded with `initial`. Values shorter than
    /// [`MIN_SECRET_LEN`] are dropped and duplicates collapse.
    pub fn new<I, S>(initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let secrets = initial
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| s.len() >= MIN_SECRET_LEN)
            .collect();
        Self {
            secrets: RwLock::new(secrets),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// A store tracking no secrets yet.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Add secrets in order. The first value shorter than [`MIN_SECRET_LEN`]
    /// stops this call: values before it stay added, values after it are
    /// skipped. Nothing is reported either way.
    pub fn add<I, S>(&self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut secrets = self.secrets.write().unwrap_or_else(|e| e.into_inner());
        for value in values {
            let value = value.into();
            if value.len() < MIN_SECRET_LEN {
                return;
            }
            secrets.insert(value);
        }
    }

    /// Number of distinct secrets tracked.
    pub fn len(&self) -> usize {
        self.secrets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Redactor for SecretStore {
    fn redact_string(&self, input: &str) -> String {
        let secrets = self.secrets.read().unwrap_or_else(|e| e.into_inner());
        let mut result = input.to_string();
        for secret in secrets.iter() {
            if result.contains(secret.as_str()) {
                result = result.replace(secret.as_str(), MARKER);
            }
        }
        result
    }

    fn values(&self) -> Vec<String> {
        let secrets = self.secrets.read().unwrap_or_else(|e| e.into_inner());
        secrets.iter().cloned().collect()
    }

    fn id(&self) -> String {
        self.id.clone()
    }
}
