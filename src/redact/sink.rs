use std::fs::File;
use std::io::{self, BufWriter, LineWriter, Write};

/// Destination for redacted output.
///
/// `close` is called once by [`RedactingWriter::close`](super::RedactingWriter::close)
/// after the last bytes have been written. Sinks without a close operation
/// keep the default, which does nothing.
pub trait Sink: Write + Send {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for Vec<u8> {}

impl Sink for io::Sink {}

impl Sink for io::Stdout {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for io::Stderr {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl<W: Sink> Sink for BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

impl<W: Sink> Sink for LineWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts any writer into a [`Sink`] whose close is a no-op.
#[derive(Debug, Default)]
pub struct Uncloseable<W>(pub W);

impl<W> Uncloseable<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> Write for Uncloseable<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write + Send> Sink for Uncloseable<W> {}

/// Duplicates every write to two sinks, e.g. the console and a log file.
#[derive(Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Sink, B: Sink> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Sink, B: Sink> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

impl<A: Sink, B: Sink> Sink for Tee<A, B> {
    /// Closes both sides; the first error wins.
    fn close(&mut self) -> io::Result<()> {
        let first = self.first.close();
        let second = self.second.close();
        first.and(second)
    }
}
