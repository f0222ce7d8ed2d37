use std::path::{Path, PathBuf};

use crate::error::{LogscrubError, Result};
use crate::redact::Redactor;

/// A line that still contains a tracked secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub file: PathBuf,
    pub line: usize,
}

/// Scan files and directories for lines containing secrets. Findings are
/// reported on stderr by location only; the secret itself is never printed.
pub fn run(paths: &[PathBuf], redactor: &dyn Redactor) -> Result<Vec<Finding>> {
    if redactor.values().is_empty() {
        tracing::warn!("no secrets configured; nothing can be detected");
    }

    let mut findings = Vec::new();
    for path in paths {
        if path.is_dir() {
            eprintln!("logscrub: scanning directory {}...", path.display());
            scan_dir(redactor, path, &mut findings)?;
        } else if path.is_file() {
            scan_file(redactor, path, &mut findings);
        } else {
            return Err(LogscrubError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("path not found: {}", path.display()),
            )));
        }
    }

    for finding in &findings {
        eprintln!("  {}:{}: secret detected", finding.file.display(), finding.line);
    }
    if findings.is_empty() {
        eprintln!("logscrub: scan clean -- no secrets detected.");
    } else {
        eprintln!(
            "\nlogscrub: {} line(s) contain tracked secrets.",
            findings.len()
        );
    }

    Ok(findings)
}

/// Scan a single file line by line.
fn scan_file(redactor: &dyn Redactor, path: &Path, findings: &mut Vec<Finding>) {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            // Skip binary/unreadable files
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            return;
        }
    };

    for (line_num, line) in contents.lines().enumerate() {
        if redactor.redact_string(line) != line {
            findings.push(Finding {
                file: path.to_path_buf(),
                line: line_num + 1,
            });
        }
    }
}

/// Scan a directory recursively, skipping hidden entries.
fn scan_dir(redactor: &dyn Redactor, dir: &Path, findings: &mut Vec<Finding>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'))
        {
            continue;
        }
        if path.is_dir() {
            scan_dir(redactor, &path, findings)?;
        } else if path.is_file() {
            scan_file(redactor, &path, findings);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::SecretStore;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_lines() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.log"), "clean\nhas tok-123 here\nclean\n").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("nested/b.log"), "tok-123\n").unwrap();
        std::fs::create_dir(tmp.path().join(".hidden")).unwrap();
        std::fs::write(tmp.path().join(".hidden/c.log"), "tok-123\n").unwrap();

        let store = SecretStore::new(["tok-123"]);
        let findings = run(&[tmp.path().to_path_buf()], &store).unwrap();

        assert_eq!(
            findings,
            vec![
                Finding {
                    file: tmp.path().join("a.log"),
                    line: 2
                },
                Finding {
                    file: tmp.path().join("nested/b.log"),
                    line: 1
                },
            ]
        );
    }

    #[test]
    fn test_scan_clean_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("clean.txt");
        std::fs::write(&file, "nothing to see\n").unwrap();

        let store = SecretStore::new(["tok-123"]);
        assert!(run(&[file], &store).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_path_errors() {
        let store = SecretStore::new(["tok-123"]);
        assert!(run(&[PathBuf::from("/no/such/path")], &store).is_err());
    }
}
