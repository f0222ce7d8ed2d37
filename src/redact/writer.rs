use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use aho_corasick::{AhoCorasick, Anchored, Input, MatchKind, StartKind};

use super::{Redactor, Sink, MARKER};

/// Window retained when the redactor tracks no secrets.
pub const DEFAULT_WINDOW: usize = 64;

/// A sink write failed. The data from the failing call was still accepted
/// into the buffer and goes out with the next successful flush or close.
#[derive(Debug, thiserror::Error)]
#[error("sink write failed ({accepted} bytes buffered): {source}")]
pub struct WriteError {
    pub accepted: usize,
    pub source: io::Error,
}

/// Writer that redacts secrets before forwarding bytes to a [`Sink`].
///
/// Incoming bytes are buffered. Once the buffer grows past twice the length
/// of the longest known secret, the whole buffer is redacted and everything
/// except the trailing window is written out. The retained window is kept in
/// redacted form, so a secret split across two `write` calls is still caught
/// and nothing is scrubbed twice. [`close`](Self::close) redacts and writes
/// whatever is left, then closes the sink.
///
/// The handle is cheap to clone; clones share the buffer, the sink and one
/// lock, so concurrent writers are serialized.
///
/// `flush` only flushes the sink. The trailing window stays buffered until
/// enough data arrives or the writer is closed.
pub struct RedactingWriter<W> {
    shared: Arc<Shared<W>>,
}

struct Shared<W> {
    redactor: Arc<dyn Redactor>,
    state: Mutex<State<W>>,
}

struct State<W> {
    sink: W,
    buffer: Vec<u8>,
}

impl<W> Clone for RedactingWriter<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<W> std::fmt::Debug for RedactingWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedactingWriter")
            .field("redactor", &self.shared.redactor.id())
            .finish_non_exhaustive()
    }
}

impl<W: Sink> RedactingWriter<W> {
    /// Wrap `sink`, redacting with whatever secrets `redactor` knows at
    /// each write.
    pub fn new(sink: W, redactor: Arc<dyn Redactor>) -> Self {
        Self {
            shared: Arc::new(Shared {
                redactor,
                state: Mutex::new(State {
                    sink,
                    buffer: Vec::new(),
                }),
            }),
        }
    }

    /// The redactor shared by every clone of this writer.
    pub fn redactor(&self) -> &Arc<dyn Redactor> {
        &self.shared.redactor
    }

    /// Current window size: twice the longest known secret, or
    /// [`DEFAULT_WINDOW`] when there are none.
    pub fn window_size(&self) -> usize {
        window_size(&self.shared.redactor.values())
    }

    fn lock(&self) -> MutexGuard<'_, State<W>> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Buffer `data`, flushing the redacted excess beyond the window.
    ///
    /// Returns `data.len()` on success. On sink failure the returned error
    /// still carries `accepted == data.len()` and the buffer keeps every
    /// unflushed byte, including `data`.
    pub fn write_chunk(&self, data: &[u8]) -> Result<usize, WriteError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.buffer.extend_from_slice(data);

        // Re-read on every call so newly added secrets widen the window.
        let values = self.shared.redactor.values();
        let window = window_size(&values);
        if state.buffer.len() <= window {
            return Ok(data.len());
        }

        let (text, pending) = split_utf8(&state.buffer);
        let redacted = self.shared.redactor.redact_string(&text);

        // A secret added mid-call leaves markers the position walk cannot
        // account for; hold everything until the next write.
        if !same_secrets(&values, self.shared.redactor.values()) {
            return Ok(data.len());
        }

        let total = text.len() + pending.len();
        let flush_len = (total - window).min(text.len());
        let boundary = map_position(&text, &redacted, flush_len, &values);

        if let Err(source) = state.sink.write_all(&redacted.as_bytes()[..boundary]) {
            return Err(WriteError {
                accepted: data.len(),
                source,
            });
        }

        let mut retained = redacted.as_bytes()[boundary..].to_vec();
        retained.extend_from_slice(pending);
        state.buffer = retained;
        Ok(data.len())
    }

    /// Redact and write any buffered bytes, then close the sink.
    pub fn close(&self) -> io::Result<()> {
        let mut state = self.lock();
        if !state.buffer.is_empty() {
            let text = String::from_utf8_lossy(&state.buffer).into_owned();
            let redacted = self.shared.redactor.redact_string(&text);
            state.sink.write_all(redacted.as_bytes())?;
            state.buffer.clear();
        }
        state.sink.close()
    }
}

/// `write` buffers the data before touching the sink, so an `Err` from it
/// does not mean nothing was written: the bytes are kept and go out with the
/// next flush or close. Callers that retry on error would duplicate them;
/// use [`RedactingWriter::write_chunk`] to see how much was accepted.
impl<W: Sink> Write for &RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(|e| e.source)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().sink.flush()
    }
}

impl<W: Sink> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

fn same_secrets(before: &[String], mut after: Vec<String>) -> bool {
    if before.len() != after.len() {
        return false;
    }
    let mut before = before.to_vec();
    before.sort_unstable();
    after.sort_unstable();
    before == after
}

fn window_size(values: &[String]) -> usize {
    values
        .iter()
        .map(String::len)
        .max()
        .map_or(DEFAULT_WINDOW, |longest| 2 * longest)
}

/// Decode the buffer as text. An incomplete UTF-8 sequence at the very end is
/// returned separately so it can wait for the rest of its character; any
/// other invalid bytes become U+FFFD.
fn split_utf8(buffer: &[u8]) -> (String, &[u8]) {
    let complete = match std::str::from_utf8(buffer) {
        Ok(_) => buffer.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => {
            // Invalid bytes mid-stream; only a trailing partial char is held.
            let tail = incomplete_tail(buffer);
            buffer.len() - tail
        }
    };
    let text = String::from_utf8_lossy(&buffer[..complete]).into_owned();
    (text, &buffer[complete..])
}

/// Length of a trailing, not yet complete, UTF-8 sequence.
fn incomplete_tail(buffer: &[u8]) -> usize {
    let start = buffer.len().saturating_sub(3);
    for i in (start..buffer.len()).rev() {
        let byte = buffer[i];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let needed = match byte {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return 0,
        };
        let have = buffer.len() - i;
        return if have < needed { have } else { 0 };
    }
    0
}

/// Translate `orig_pos` in `original` into the matching offset in
/// `redacted`, stepping over each secret as one marker.
///
/// The result never splits a marker or a character.
fn map_position(original: &str, redacted: &str, orig_pos: usize, values: &[String]) -> usize {
    if orig_pos >= original.len() {
        return redacted.len();
    }

    let patterns: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    let matcher = if patterns.is_empty() {
        None
    } else {
        AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .start_kind(StartKind::Anchored)
            .build(&patterns)
            .ok()
    };

    let (mut o, mut r) = (0, 0);
    while o < orig_pos {
        let secret = matcher.as_ref().and_then(|ac| {
            ac.find(Input::new(original).range(o..).anchored(Anchored::Yes))
        });
        if let Some(m) = secret {
            o += m.len();
            r += MARKER.len();
            continue;
        }
        let step = original[o..].chars().next().map_or(1, char::len_utf8);
        o += step;
        r += step;
    }

    let mut r = r.min(redacted.len());
    while !redacted.is_char_boundary(r) {
        r += 1;
    }
    r
}
