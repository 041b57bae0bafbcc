//! RDF quad type

use crate::Term;
use std::fmt;

/// An RDF quad (subject, predicate, object, graph)
///
/// Quads are created once, handed to a [`QuadSink`](crate::QuadSink), and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    /// Subject (IRI)
    pub s: Term,
    /// Predicate (always an IRI)
    pub p: Term,
    /// Object (IRI or literal)
    pub o: Term,
    /// Graph label (IRI)
    pub g: Term,
}

impl Quad {
    /// Create a new quad
    pub fn new(s: Term, p: Term, o: Term, g: Term) -> Self {
        Self { s, p, o, g }
    }

    /// Subject IRI, if the subject is an IRI
    pub fn subject_iri(&self) -> Option<&str> {
        self.s.as_iri()
    }

    /// Predicate IRI
    pub fn predicate_iri(&self) -> Option<&str> {
        self.p.as_iri()
    }
}

/// One N-Quads statement, without the trailing newline
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {} .", self.s, self.p, self.o, self.g)
    }
}
