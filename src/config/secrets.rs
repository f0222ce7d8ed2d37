use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LogscrubError, Result};
use crate::redact::MIN_SECRET_LEN;

/// Comma-separated secrets taken from the environment in addition to the
/// configured ones.
pub const SECRETS_ENV: &str = "LOGSCRUB_SECRETS";

/// Where secrets come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Literal secret values.
    #[serde(default)]
    pub values: Vec<String>,

    /// Names of environment variables whose values are secrets.
    #[serde(default)]
    pub env: Vec<String>,

    /// Files holding one secret per line.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl SecretsConfig {
    /// Gather secrets from the process environment and the filesystem.
    pub fn collect(&self) -> Result<Vec<String>> {
        self.collect_with(|name| std::env::var(name).ok())
    }

    /// Gather secrets in order: literal values, [`SECRETS_ENV`], named env
    /// vars, then secret files. Values too short to track are dropped here so
    /// that [`SecretStore::add`](crate::redact::SecretStore::add) takes the
    /// whole list.
    pub fn collect_with<F>(&self, lookup: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut secrets = self.values.clone();

        if let Some(list) = lookup(SECRETS_ENV) {
            secrets.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }

        for name in &self.env {
            match lookup(name) {
                Some(value) if !value.is_empty() => secrets.push(value),
                _ => tracing::warn!(var = %name, "secret env var is unset or empty, skipping"),
            }
        }

        for path in &self.files {
            secrets.extend(read_secret_file(path)?);
        }

        let before = secrets.len();
        secrets.retain(|s| s.len() >= MIN_SECRET_LEN);
        if secrets.len() < before {
            tracing::warn!(
                dropped = before - secrets.len(),
                "ignoring secrets shorter than {} bytes",
                MIN_SECRET_LEN
            );
        }

        Ok(secrets)
    }
}

/// Non-empty lines of a secrets file, with trailing `\r` removed.
fn read_secret_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| LogscrubError::SecretSource {
        name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(contents
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect())
}
