//! SSM domain-model conversion
//!
//! Loads the CSV tables that describe a Spyderisk-style domain model and
//! writes them out as N-Quads in the domain graph.
//!
//! Conversion runs in three strictly sequential stages:
//!
//! 1. [`TableSet::load`] reads every catalogue table from the input
//!    directory.
//! 2. [`build`] resolves features, packages and the ontology header, applies
//!    the unfiltered and population options, and produces a [`DomainModel`].
//! 3. [`serialize`] walks the model and emits quads to any [`QuadSink`].
//!
//! [`run`] chains the three stages and writes the output files.
//!
//! [`QuadSink`]: ssm_graph_ir::QuadSink

pub mod builder;
pub mod error;
pub mod features;
pub mod mapping;
pub mod model;
pub mod registry;
pub mod sequence;
pub mod serializer;
pub mod tables;

#[cfg(test)]
mod test_fixture;

pub use builder::{build, ConvertOptions};
pub use error::{ConvertError, ConvertResult};
pub use mapping::IconMapping;
pub use model::DomainModel;
pub use serializer::serialize;
pub use tables::TableSet;

use ssm_graph_ir::NQuadsWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// One conversion: where to read, where to write, and how
#[derive(Debug, Clone)]
pub struct ConvertJob {
    /// Directory holding the CSV tables
    pub input_dir: PathBuf,
    /// N-Quads output file
    pub output: PathBuf,
    /// Optional icon mapping output file
    pub mapping: Option<PathBuf>,
    pub options: ConvertOptions,
}

/// Counts reported after a successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub quads: usize,
    pub assets: usize,
    pub threats: usize,
    pub nodes: usize,
    pub role_links: usize,
    pub expanded: bool,
}

/// Load, build and write a domain model
pub fn run(job: &ConvertJob) -> ConvertResult<ConvertSummary> {
    tracing::info!(input = %job.input_dir.display(), "loading domain model tables");
    let tables = TableSet::load(&job.input_dir)?;
    if job.mapping.is_some() {
        tables.table("DomainAsset")?.require("icon")?;
    }
    let model = build(&tables, &job.options)?;

    let write_error = |source| ConvertError::Write {
        path: job.output.clone(),
        source,
    };
    let file = File::create(&job.output).map_err(write_error)?;
    let mut writer = NQuadsWriter::new(BufWriter::new(file));
    serialize(&model, &mut writer).map_err(write_error)?;
    let quads = writer.quads_written();
    writer.into_inner().map_err(write_error)?;
    tracing::info!(output = %job.output.display(), quads, "wrote domain model");

    if let Some(path) = &job.mapping {
        IconMapping::from_model(&model).write_to(path)?;
    }

    Ok(ConvertSummary {
        quads,
        assets: model.assets.len(),
        threats: model.threats.len(),
        nodes: model.nodes.len(),
        role_links: model.role_links.len(),
        expanded: model.expansion,
    })
}
