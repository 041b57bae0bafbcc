//! CSV table loading
//!
//! Every table of the catalogue is read once into memory. The first line of
//! each file is its header; cells are kept verbatim. Rows holding the
//! editor's placeholder URI (`domain#000000`) carry default values rather
//! than data and are dropped at load time.

use crate::error::{ConvertError, ConvertResult};
use ssm_vocab::ssm::names;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A table of the catalogue and the columns it must always have
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub optional: bool,
    pub columns: &'static [&'static str],
}

impl TableSchema {
    const fn required(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            optional: false,
            columns,
        }
    }

    const fn optional(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            optional: true,
            columns,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

const SCALE: &[&str] = &["URI", "label", "comment", "levelValue"];
const LOCATIONS: &[&str] = &["URI", "package", "metaLocatedAt"];
const DESCRIBED: &[&str] = &["URI", "package", "label", "comment"];

/// Feature-gated and optional columns are checked by the builder instead.
pub const CATALOGUE: &[TableSchema] = &[
    TableSchema::optional("DomainFeature", &["URI", "comment", "supported"]),
    TableSchema::required(
        "DomainModel",
        &["URI", "label", "comment", "domainGraph", "reasonerClass"],
    ),
    TableSchema::required("Packages", &["URI", "Label", "Description"]),
    TableSchema::required("TrustworthinessLevel", SCALE),
    TableSchema::required("Likelihood", SCALE),
    TableSchema::required("ImpactLevel", SCALE),
    TableSchema::required("RiskLevel", SCALE),
    TableSchema::required("PopulationLevel", SCALE),
    TableSchema::required("CostLevel", SCALE),
    TableSchema::required("PerformanceImpactLevel", SCALE),
    TableSchema::required(
        "DomainAsset",
        &["URI", "package", "label", "comment", "isAssertable", "isVisible"],
    ),
    TableSchema::required("DomainAssetParents", &["URI", "package", "subClassOf"]),
    TableSchema::required(
        "ObjectProperty",
        &["URI", "package", "label", "comment", "isAssertable", "isVisible", "hidden"],
    ),
    TableSchema::required("ObjectPropertyParents", &["URI", "package", "subPropertyOf"]),
    TableSchema::required("ObjectPropertyDomains", &["URI", "package", "domain"]),
    TableSchema::required("ObjectPropertyRanges", &["URI", "package", "range"]),
    TableSchema::required("Role", DESCRIBED),
    TableSchema::required("RoleLocations", LOCATIONS),
    TableSchema::required(
        "Control",
        &["URI", "package", "label", "comment", "isVisible", "unitCost", "performanceImpact"],
    ),
    TableSchema::required("ControlLocations", LOCATIONS),
    TableSchema::required("Misbehaviour", &["URI", "package", "label", "comment", "isVisible"]),
    TableSchema::required("MisbehaviourLocations", LOCATIONS),
    TableSchema::required(
        "TrustworthinessAttribute",
        &["URI", "package", "label", "comment", "isVisible"],
    ),
    TableSchema::required("TWALocations", LOCATIONS),
    TableSchema::required("TWIS", &["URI", "package", "affectedBy", "affects"]),
    TableSchema::required("MIS", &["URI", "package", "inhibited", "inhibitedBy"]),
    TableSchema::required("RootPattern", DESCRIBED),
    TableSchema::required("RootPatternNodes", &["URI", "package", "hasNode", "keyNode"]),
    TableSchema::required("RootPatternLinks", &["URI", "package", "hasLink"]),
    TableSchema::required(
        "MatchingPattern",
        &["URI", "package", "label", "comment", "hasRootPattern"],
    ),
    TableSchema::required(
        "MatchingPatternNodes",
        &["URI", "package", "hasNode", "mandatoryNode", "prohibitedNode", "sufficientNode"],
    ),
    TableSchema::required("MatchingPatternLinks", &["URI", "package", "hasLink", "prohibited"]),
    TableSchema::required("MatchingPatternDNG", &["URI", "package", "hasDistinctNodeGroup"]),
    TableSchema::required("DistinctNodeGroupNodes", &["URI", "package", "hasNode"]),
    TableSchema::required(
        "ConstructionPattern",
        &["URI", "package", "label", "comment", "hasMatchingPattern", "iterate", "maxIterations"],
    ),
    TableSchema::optional(
        "ConstructionPredecessor",
        &["URI", "package", "hasPredecessor", "fake"],
    ),
    TableSchema::optional("ConstructionSuccessor", &["URI", "package", "hasSuccessor", "fake"]),
    TableSchema::required(
        "InferredNodeSetting",
        &[
            "package",
            "inPattern",
            "hasNode",
            "hasSetting",
            "displayedAtNode",
            "displayedAtLink",
            "displayedAt",
        ],
    ),
    TableSchema::required("InferredNodeSettingIncludes", &["URI", "package", "includesNodeInURI"]),
    TableSchema::required("ConstructionPatternLinks", &["URI", "package", "hasInferredLink"]),
    TableSchema::required("ThreatCategory", &["URI", "label", "comment"]),
    TableSchema::required("ComplianceSet", DESCRIBED),
    TableSchema::required("ComplianceSetThreats", &["URI", "package", "requiresTreatmentOf"]),
    TableSchema::required(
        "Threat",
        &[
            "URI",
            "package",
            "label",
            "comment",
            "hasCategory",
            "appliesTo",
            "threatens",
            "hasFrequency",
            "currentRisk",
            "futureRisk",
        ],
    ),
    TableSchema::required("ThreatEntryPoints", &["URI", "package", "hasEntryPoint"]),
    TableSchema::required("ThreatSEC", &["URI", "package", "hasSecondaryEffectCondition"]),
    TableSchema::required("ThreatEffects", &["URI", "package", "causesMisbehaviour"]),
    TableSchema::required(
        "ControlStrategy",
        &["URI", "package", "label", "comment", "hasBlockingEffect"],
    ),
    TableSchema::required("ControlStrategyBlocks", &["URI", "package", "blocks"]),
    TableSchema::required("ControlStrategyMitigates", &["URI", "package", "mitigates"]),
    TableSchema::required("ControlStrategyTriggers", &["URI", "package", "triggers"]),
    TableSchema::required(
        "ControlStrategyControls",
        &["URI", "package", "hasControlSet", "optional"],
    ),
    TableSchema::required(
        "CASetting",
        &[
            "URI",
            "package",
            "metaLocatedAt",
            "hasControl",
            "isAssertable",
            "hasLevel",
            "independentLevels",
        ],
    ),
    TableSchema::required(
        "MADefaultSetting",
        &["URI", "package", "metaLocatedAt", "hasMisbehaviour", "hasLevel"],
    ),
    TableSchema::required(
        "TWAADefaultSetting",
        &[
            "URI",
            "package",
            "metaLocatedAt",
            "hasTrustworthinessAttribute",
            "hasLevel",
            "independentLevels",
        ],
    ),
];

/// Look up a catalogue entry by table name
pub fn schema(name: &str) -> Option<&'static TableSchema> {
    CATALOGUE.iter().find(|schema| schema.name == name)
}

#[derive(Debug, Clone)]
struct Row {
    line: u64,
    cells: Vec<String>,
}

/// One loaded CSV table
#[derive(Debug, Clone)]
pub struct Table {
    file: String,
    columns: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl Table {
    /// Parse CSV text. `file` names the table in diagnostics.
    ///
    /// A leading byte-order mark is stripped. Rows may be shorter or longer
    /// than the header; a short row only fails when a missing cell is read.
    pub fn parse(file: impl Into<String>, text: &str) -> Result<Self, csv::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx))
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().any(|cell| cell == names::DUMMY) {
                continue;
            }
            let line = record.position().map_or(0, |pos| pos.line());
            rows.push(Row {
                line,
                cells: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(Self {
            file: file.into(),
            columns,
            rows,
        })
    }

    /// File name used in diagnostics
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Fail with `MissingColumn` unless the header has `column`
    pub fn require(&self, column: &str) -> ConvertResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ConvertError::MissingColumn {
                file: self.file.clone(),
                column: column.to_string(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows in file order
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |row| RowRef { table: self, row })
    }
}

/// A row together with the table it belongs to
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl<'a> RowRef<'a> {
    /// 1-based line number in the source file
    pub fn line(&self) -> u64 {
        self.row.line
    }

    pub fn file(&self) -> &'a str {
        &self.table.file
    }

    /// Build a `MalformedRow` error pointing at this row
    pub fn malformed(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::malformed(self.table.file.clone(), self.row.line, reason)
    }

    /// Raw cell value
    pub fn get(&self, column: &str) -> ConvertResult<&'a str> {
        let idx = *self
            .table
            .columns
            .get(column)
            .ok_or_else(|| ConvertError::MissingColumn {
                file: self.table.file.clone(),
                column: column.to_string(),
            })?;
        self.row
            .cells
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| self.malformed(format!("missing value for column '{column}'")))
    }

    /// Cell value, or `None` when the column is absent or the cell is empty
    pub fn get_opt(&self, column: &str) -> Option<&'a str> {
        let idx = *self.table.columns.get(column)?;
        self.row
            .cells
            .get(idx)
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }

    /// Strict boolean: `true` or `false` in any case
    pub fn get_bool(&self, column: &str) -> ConvertResult<bool> {
        let value = self.get(column)?;
        parse_bool(value)
            .ok_or_else(|| self.malformed(format!("column '{column}' is not a boolean: '{value}'")))
    }

    /// Lenient flag: `true` in any case, anything else is `false`
    pub fn is_true(&self, column: &str) -> ConvertResult<bool> {
        Ok(self.get(column)?.eq_ignore_ascii_case("true"))
    }

    pub fn get_int(&self, column: &str) -> ConvertResult<i64> {
        let value = self.get(column)?;
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(format!("column '{column}' is not an integer: '{value}'")))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// All catalogue tables found in one input directory
#[derive(Debug)]
pub struct TableSet {
    dir: PathBuf,
    tables: HashMap<&'static str, Table>,
}

impl TableSet {
    /// Load every catalogue table from `dir`
    ///
    /// Fails on the first required table that is absent, unreadable, not
    /// valid CSV, or missing a required column.
    pub fn load(dir: &Path) -> ConvertResult<Self> {
        let mut tables = HashMap::with_capacity(CATALOGUE.len());
        for schema in CATALOGUE {
            let file = schema.file_name();
            let path = dir.join(&file);
            if !path.is_file() {
                if schema.optional {
                    tracing::debug!(table = schema.name, "optional table not present");
                    continue;
                }
                return Err(ConvertError::MissingTable {
                    file,
                    dir: dir.to_path_buf(),
                });
            }

            let text = fs::read_to_string(&path).map_err(|source| ConvertError::Read {
                path: path.clone(),
                source,
            })?;
            let table = Table::parse(&file, &text)
                .map_err(|source| ConvertError::Csv { path, source })?;
            for column in schema.columns {
                table.require(column)?;
            }
            tracing::debug!(table = schema.name, rows = table.len(), "table loaded");
            tables.insert(schema.name, table);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            tables,
        })
    }

    /// A loaded table; `MissingTable` if it was optional and absent
    pub fn table(&self, name: &str) -> ConvertResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| ConvertError::MissingTable {
                file: format!("{name}.csv"),
                dir: self.dir.clone(),
            })
    }

    /// A loaded table, or `None` if it is absent
    pub fn optional(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}
