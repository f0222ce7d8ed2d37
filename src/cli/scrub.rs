use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::redact::{RedactingWriter, Redactor, Sink};

/// Stream `input` (or stdin) into `output` (or stdout) through a redacting
/// writer. Returns the number of bytes read.
pub fn run(
    input: Option<&Path>,
    output: Option<&Path>,
    chunk_size: usize,
    redactor: Arc<dyn Redactor>,
) -> Result<u64> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let sink: Box<dyn Sink> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let writer = RedactingWriter::new(sink, redactor);
    let total = pump(reader, &writer, chunk_size)?;
    writer.close()?;

    tracing::debug!(bytes = total, "scrub complete");
    Ok(total)
}

/// Copy everything from `reader` into `writer`, `chunk_size` bytes at a time.
pub fn pump<R: Read, W: Sink>(
    mut reader: R,
    writer: &RedactingWriter<W>,
    chunk_size: usize,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_chunk(&buf[..n]).map_err(|e| e.source)?;
        total += n as u64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::SecretStore;
    use tempfile::TempDir;

    const INPUT: &str = "line one s3cr3t-value\nline two s3cr3t-value end\n";
    const EXPECTED: &str = "line one *******\nline two ******* end\n";

    fn store() -> Arc<dyn Redactor> {
        Arc::new(SecretStore::new(["s3cr3t-value"]))
    }

    #[test]
    fn test_pump_small_chunks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        let writer = RedactingWriter::new(File::create(&path).unwrap(), store());

        let total = pump(INPUT.as_bytes(), &writer, 3).unwrap();
        writer.close().unwrap();

        assert_eq!(total, INPUT.len() as u64);
        assert_eq!(std::fs::read_to_string(path).unwrap(), EXPECTED);
    }

    #[test]
    fn test_run_file_to_file() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.txt");
        let output = tmp.path().join("out.txt");
        std::fs::write(&input, INPUT).unwrap();

        let total = run(Some(&input), Some(&output), 5, store()).unwrap();

        assert_eq!(total, INPUT.len() as u64);
        assert_eq!(std::fs::read_to_string(output).unwrap(), EXPECTED);
    }

    #[test]
    fn test_run_missing_input_errors() {
        assert!(run(Some(Path::new("/no/such/input")), None, 16, store()).is_err());
    }
}
