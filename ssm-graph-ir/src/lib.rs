//! Quad-level RDF intermediate representation
//!
//! This crate provides the types the domain-model serializer produces and the
//! sinks that consume them.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype.
//!    Plain strings use `xsd:string` and are written without a `^^` suffix.
//!
//! 3. **Emission order is output order** - Sinks never reorder quads, so a
//!    producer that walks its input deterministically gets deterministic
//!    output.
//!
//! # Example
//!
//! ```
//! use ssm_graph_ir::{NQuadsWriter, Quad, QuadSink, Term};
//!
//! let mut writer = NQuadsWriter::new(Vec::new());
//! writer
//!     .emit_quad(Quad::new(
//!         Term::iri("http://example.org/alice"),
//!         Term::iri("http://www.w3.org/2000/01/rdf-schema#label"),
//!         Term::string("Alice"),
//!         Term::iri("http://example.org/graph"),
//!     ))
//!     .unwrap();
//! let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert!(out.ends_with(" .\n"));
//! ```

pub mod datatype;
mod nquads;
mod quad;
mod sink;
mod term;

pub use datatype::Datatype;
pub use nquads::NQuadsWriter;
pub use quad::Quad;
pub use sink::{QuadCollectorSink, QuadSink};
pub use term::{LiteralValue, Term};
