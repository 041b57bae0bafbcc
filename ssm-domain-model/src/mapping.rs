//! Icon mapping file
//!
//! A small JSON document that tells the modelling front end which graph the
//! domain model lives in and which icon to draw for each asset type:
//!
//! ```json
//! {
//!     "ontology": "network",
//!     "graph": "http://example.org/models/network",
//!     "defaultUserAccess": true,
//!     "icons": {
//!         "http://it-innovation.soton.ac.uk/ontologies/trustworthiness/domain#Host": "host.png"
//!     }
//! }
//! ```

use crate::error::{ConvertError, ConvertResult};
use crate::model::DomainModel;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use ssm_vocab::ssm;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Contents of the icon mapping file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconMapping {
    /// Last path segment of the domain graph IRI
    pub ontology: String,
    pub graph: String,
    #[serde(rename = "defaultUserAccess")]
    pub default_user_access: bool,
    /// Full asset IRI to icon path, for emitted assets that have an icon
    pub icons: BTreeMap<String, String>,
}

impl IconMapping {
    pub fn from_model(model: &DomainModel) -> Self {
        let graph = model.header.domain_graph.clone();
        let ontology = graph.rsplit('/').next().unwrap_or_default().to_string();
        let icons = model
            .icons()
            .filter_map(|(asset, icon)| ssm::expand(asset).map(|iri| (iri, icon.to_string())))
            .collect();
        Self {
            ontology,
            graph,
            default_user_access: true,
            icons,
        }
    }

    /// Serialize with four-space indentation
    pub fn to_writer<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut serializer =
            serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer).map_err(io::Error::from)?;
        let mut writer = serializer.into_inner();
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn write_to(&self, path: &Path) -> ConvertResult<()> {
        let write_error = |source| ConvertError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        self.to_writer(BufWriter::new(file)).map_err(write_error)?;
        tracing::info!(path = %path.display(), icons = self.icons.len(), "wrote icon mapping");
        Ok(())
    }
}
