//! QuadSink trait for event-driven quad output
//!
//! Producers call `on_comment()` and `emit_quad()` on a sink without knowing
//! the concrete sink type.
//!
//! # Design
//!
//! The sink can be:
//! - `NQuadsWriter`: writes each quad as an N-Quads line
//! - `QuadCollectorSink`: collects quads in memory (used by tests and by
//!   callers that need to inspect the output)

use crate::Quad;
use std::collections::BTreeSet;
use std::io;

/// Event-driven interface for quad output
///
/// # Example
///
/// ```
/// use ssm_graph_ir::{QuadSink, QuadCollectorSink, Quad, Term};
///
/// let mut sink = QuadCollectorSink::new();
/// let g = Term::iri("http://example.org/g");
///
/// sink.on_comment("people").unwrap();
/// sink.emit_quad(Quad::new(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://www.w3.org/2000/01/rdf-schema#label"),
///     Term::string("Alice"),
///     g,
/// ))
/// .unwrap();
///
/// assert_eq!(sink.len(), 1);
/// ```
pub trait QuadSink {
    /// Called for section headings and separators
    ///
    /// Sinks that cannot represent comments ignore them.
    fn on_comment(&mut self, text: &str) -> io::Result<()> {
        let _ = text;
        Ok(())
    }

    /// Emit one quad
    fn emit_quad(&mut self, quad: Quad) -> io::Result<()>;
}

impl<S: QuadSink + ?Sized> QuadSink for &mut S {
    fn on_comment(&mut self, text: &str) -> io::Result<()> {
        (**self).on_comment(text)
    }

    fn emit_quad(&mut self, quad: Quad) -> io::Result<()> {
        (**self).emit_quad(quad)
    }
}

/// A sink that collects quads in memory
#[derive(Debug, Default)]
pub struct QuadCollectorSink {
    quads: Vec<Quad>,
    comments: usize,
}

impl QuadCollectorSink {
    /// Create a new collector sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected quads
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if no quads were collected
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Number of comment events seen
    pub fn comment_count(&self) -> usize {
        self.comments
    }

    /// Collected quads in emission order
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Distinct subject IRIs
    pub fn subjects(&self) -> BTreeSet<&str> {
        self.quads.iter().filter_map(Quad::subject_iri).collect()
    }

    /// Consume the sink and return the quads
    pub fn finish(self) -> Vec<Quad> {
        self.quads
    }
}

impl QuadSink for QuadCollectorSink {
    fn on_comment(&mut self, _text: &str) -> io::Result<()> {
        self.comments += 1;
        Ok(())
    }

    fn emit_quad(&mut self, quad: Quad) -> io::Result<()> {
        self.quads.push(quad);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Term;

    fn quad(s: &str) -> Quad {
        Quad::new(
            Term::iri(s),
            Term::iri("http://example.org/p"),
            Term::boolean(true),
            Term::iri("http://example.org/g"),
        )
    }

    #[test]
    fn test_collector_sink() {
        let mut sink = QuadCollectorSink::new();
        assert!(sink.is_empty());

        sink.on_comment("").unwrap();
        sink.emit_quad(quad("http://example.org/b")).unwrap();
        sink.emit_quad(quad("http://example.org/a")).unwrap();
        sink.emit_quad(quad("http://example.org/a")).unwrap();

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.comment_count(), 1);
        let subjects: Vec<_> = sink.subjects().into_iter().collect();
        assert_eq!(subjects, vec!["http://example.org/a", "http://example.org/b"]);

        let quads = sink.finish();
        assert_eq!(quads[0].subject_iri(), Some("http://example.org/b"));
    }

    #[test]
    fn test_sink_by_mut_ref() {
        fn emit(mut sink: impl QuadSink) {
            sink.emit_quad(quad("http://example.org/x")).unwrap();
        }

        let mut sink = QuadCollectorSink::new();
        emit(&mut sink);
        assert_eq!(sink.len(), 1);
    }
}
