//! RedactingWriter end to end: sliding window, split secrets, sinks.

use std::io::Write;
use std::sync::Arc;

use logscrub::redact::{
    RedactingWriter, Redactor, RedactorCollection, SecretStore, Tee, Uncloseable,
};
use tempfile::TempDir;

fn file_writer(
    tmp: &TempDir,
    redactor: Arc<dyn Redactor>,
) -> (RedactingWriter<std::fs::File>, std::path::PathBuf) {
    let path = tmp.path().join("out.log");
    let file = std::fs::File::create(&path).unwrap();
    (RedactingWriter::new(file, redactor), path)
}

// ---------------------------------------------------------------------------
// Window sizing
// ---------------------------------------------------------------------------

#[test]
fn window_is_twice_longest_secret() {
    let store = Arc::new(SecretStore::new(["short", "a-much-longer-secret"]));
    let writer = RedactingWriter::new(Vec::new(), store.clone());
    assert_eq!(writer.window_size(), 40);

    store.add(["an-even-longer-secret-value"]);
    assert_eq!(writer.window_size(), 54);
}

#[test]
fn window_uses_collection_values() {
    let a: Arc<dyn Redactor> = Arc::new(SecretStore::new(["abc"]));
    let b: Arc<dyn Redactor> = Arc::new(SecretStore::new(["abcdefgh"]));
    let writer = RedactingWriter::new(Vec::new(), Arc::new(RedactorCollection::new([a, b])));
    assert_eq!(writer.window_size(), 16);
}

#[test]
fn nothing_reaches_sink_within_window() {
    let tmp = TempDir::new().unwrap();
    let secret = "0123456789";
    let (writer, path) = file_writer(&tmp, Arc::new(SecretStore::new([secret])));

    for _ in 0..20 {
        writer.write_chunk(b"x").unwrap();
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

    writer.write_chunk(b"x").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
}

// ---------------------------------------------------------------------------
// Split secrets
// ---------------------------------------------------------------------------

#[test]
fn split_secret_scenario() {
    let tmp = TempDir::new().unwrap();
    let (writer, path) = file_writer(&tmp, Arc::new(SecretStore::new(["password123"])));

    writer.write_chunk(b"user pass").unwrap();
    writer.write_chunk(b"word123 logged in").unwrap();
    writer.close().unwrap();

    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "user ******* logged in"
    );
}

#[test]
fn byte_at_a_time_never_leaks() {
    let tmp = TempDir::new().unwrap();
    let secrets = ["ghp_abcdef0123456789", "hunter2"];
    let (writer, path) = file_writer(&tmp, Arc::new(SecretStore::new(secrets)));

    let input = "token=ghp_abcdef0123456789 user=admin pass=hunter2 again ghp_abcdef0123456789\n"
        .repeat(5);
    for byte in input.as_bytes() {
        writer.write_chunk(std::slice::from_ref(byte)).unwrap();
    }
    writer.close().unwrap();

    let output = std::fs::read_to_string(path).unwrap();
    assert_eq!(
        output,
        "token=******* user=admin pass=******* again *******\n".repeat(5)
    );
}

#[test]
fn marker_in_retained_window_is_not_rescrubbed() {
    let tmp = TempDir::new().unwrap();
    let (writer, path) = file_writer(&tmp, Arc::new(SecretStore::new(["abc"])));

    writer.write_chunk(b"abc abc").unwrap();
    writer.write_chunk(b" tail text that pushes it out").unwrap();
    writer.close().unwrap();

    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "******* ******* tail text that pushes it out"
    );
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

#[test]
fn tee_sink_receives_identical_output() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.log");
    let b = tmp.path().join("b.log");
    let sink = Tee::new(
        std::fs::File::create(&a).unwrap(),
        std::fs::File::create(&b).unwrap(),
    );
    let mut writer = RedactingWriter::new(sink, Arc::new(SecretStore::new(["s3cret"])));

    writeln!(writer, "value s3cret").unwrap();
    writer.close().unwrap();

    let a = std::fs::read_to_string(a).unwrap();
    assert_eq!(a, "value *******\n");
    assert_eq!(std::fs::read_to_string(b).unwrap(), a);
}

#[test]
fn uncloseable_sink_closes_cleanly() {
    let writer = RedactingWriter::new(
        Uncloseable(std::io::sink()),
        Arc::new(SecretStore::new(["s3cret"])),
    );
    writer.write_chunk(b"s3cret").unwrap();
    assert!(writer.close().is_ok());
}

#[test]
fn clones_share_one_buffer() {
    let tmp = TempDir::new().unwrap();
    let (writer, path) = file_writer(&tmp, Arc::new(SecretStore::new(["split-me"])));
    let other = writer.clone();

    writer.write_chunk(b"first split").unwrap();
    other.write_chunk(b"-me second").unwrap();
    other.close().unwrap();

    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "first ******* second"
    );
}
