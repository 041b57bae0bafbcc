//! Line-oriented N-Quads output
//!
//! Each quad is written as `s p o g .` on its own line. Comments are written
//! as `# text` lines (a bare `#` for an empty comment).

use crate::{Quad, QuadSink};
use std::io::{self, Write};

/// A [`QuadSink`] that writes N-Quads to any [`Write`] target
///
/// Wrap file handles in a `BufWriter`; this type does no buffering itself.
#[derive(Debug)]
pub struct NQuadsWriter<W: Write> {
    inner: W,
    quads_written: usize,
}

impl<W: Write> NQuadsWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            quads_written: 0,
        }
    }

    /// Number of quad lines written so far
    pub fn quads_written(&self) -> usize {
        self.quads_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> QuadSink for NQuadsWriter<W> {
    fn on_comment(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            writeln!(self.inner, "#")
        } else {
            writeln!(self.inner, "# {}", text)
        }
    }

    fn emit_quad(&mut self, quad: Quad) -> io::Result<()> {
        writeln!(self.inner, "{}", quad)?;
        self.quads_written += 1;
        Ok(())
    }
}
