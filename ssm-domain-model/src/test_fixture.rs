//! Table directories for unit tests

use crate::tables::{TableSet, CATALOGUE};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Gated and optional columns the catalogue does not list
fn extra_columns(table: &str) -> &'static [&'static str] {
    match table {
        "Packages" => &["Enabled"],
        "DomainAsset" => &["constructionState", "icon"],
        "ObjectProperty" => &["constructionState"],
        "ConstructionPattern" => &["hasPriority", "marker"],
        "Threat" => &["secondaryThreat", "normalOperation"],
        "ControlStrategy" => &["currentRisk", "futureRisk"],
        _ => &[],
    }
}

const SCALES: [&str; 7] = [
    "TrustworthinessLevel",
    "Likelihood",
    "ImpactLevel",
    "RiskLevel",
    "PopulationLevel",
    "CostLevel",
    "PerformanceImpactLevel",
];

#[derive(Debug, Clone)]
struct FixtureTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Every catalogue table, with headers, plus whatever rows a test adds
#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    tables: BTreeMap<String, FixtureTable>,
}

impl Fixture {
    /// All tables, header rows only
    pub(crate) fn empty() -> Self {
        let tables = CATALOGUE
            .iter()
            .map(|schema| {
                let header = schema
                    .columns
                    .iter()
                    .chain(extra_columns(schema.name))
                    .map(|column| column.to_string())
                    .collect();
                (
                    schema.name.to_string(),
                    FixtureTable {
                        header,
                        rows: Vec::new(),
                    },
                )
            })
            .collect();
        Self { tables }
    }

    /// A small network model touching every table that produces output
    pub(crate) fn sample() -> Self {
        let mut fixture = Self::empty()
            .feature("feature#OptionalPackages")
            .feature("feature#ConstructionStateFlags")
            .row(
                "DomainFeature",
                &[("URI", "feature#MixedThreatCauses"), ("supported", "FALSE")],
            )
            .row(
                "DomainModel",
                &[
                    ("URI", "http://example.org/models/network-ontology"),
                    ("label", "Network"),
                    ("comment", "Network domain"),
                    ("domainGraph", "http://example.org/models/network"),
                    ("reasonerClass", "org.example.NetworkReasoner"),
                ],
            )
            .row(
                "Packages",
                &[
                    ("URI", "package#Core"),
                    ("Label", "Core"),
                    ("Description", "Core assets"),
                    ("Enabled", "TRUE"),
                ],
            )
            .row(
                "Packages",
                &[
                    ("URI", "package#Cloud"),
                    ("Label", "Cloud"),
                    ("Description", "Cloud assets"),
                    ("Enabled", "FALSE"),
                ],
            );

        for scale in SCALES {
            for (name, value) in [("Low", "0"), ("High", "1")] {
                let uri = format!("domain#{scale}{name}");
                fixture = fixture.row(
                    scale,
                    &[("URI", uri.as_str()), ("label", name), ("levelValue", value)],
                );
            }
        }

        fixture
            .row(
                "DomainAsset",
                &[
                    ("URI", "domain#Host"),
                    ("package", "package#Core"),
                    ("label", "Host"),
                    ("comment", "A \"physical\" host"),
                    ("isAssertable", "TRUE"),
                    ("isVisible", "TRUE"),
                    ("constructionState", "FALSE"),
                    ("icon", "host.png"),
                ],
            )
            .row(
                "DomainAsset",
                &[
                    ("URI", "domain#Network"),
                    ("package", "package#Core"),
                    ("label", "Network"),
                    ("isAssertable", "FALSE"),
                    ("isVisible", "TRUE"),
                    ("constructionState", "TRUE"),
                ],
            )
            .row(
                "DomainAsset",
                &[
                    ("URI", "domain#Bucket"),
                    ("package", "package#Cloud"),
                    ("label", "Bucket"),
                    ("isAssertable", "TRUE"),
                    ("isVisible", "TRUE"),
                    ("constructionState", "FALSE"),
                    ("icon", "bucket.png"),
                ],
            )
            .row(
                "DomainAssetParents",
                &[
                    ("URI", "domain#Host"),
                    ("package", "package#Core"),
                    ("subClassOf", "core#Asset"),
                ],
            )
            .row(
                "ObjectProperty",
                &[
                    ("URI", "domain#connectedTo"),
                    ("package", "package#Core"),
                    ("label", "connected to"),
                    ("isAssertable", "TRUE"),
                    ("isVisible", "TRUE"),
                    ("hidden", "FALSE"),
                    ("constructionState", "FALSE"),
                ],
            )
            .row(
                "ObjectPropertyDomains",
                &[
                    ("URI", "domain#connectedTo"),
                    ("package", "package#Core"),
                    ("domain", "domain#Host"),
                ],
            )
            .row(
                "ObjectPropertyRanges",
                &[
                    ("URI", "domain#connectedTo"),
                    ("package", "package#Core"),
                    ("range", "domain#Network"),
                ],
            )
            .row(
                "Role",
                &[("URI", "domain#Role_Host"), ("package", "package#Core"), ("label", "Host")],
            )
            .row(
                "Role",
                &[("URI", "domain#Role_Net"), ("package", "package#Core"), ("label", "Net")],
            )
            .row(
                "RoleLocations",
                &[
                    ("URI", "domain#Role_Host"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Host"),
                ],
            )
            .row(
                "RoleLocations",
                &[
                    ("URI", "domain#Role_Net"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Network"),
                ],
            )
            .row(
                "Control",
                &[
                    ("URI", "domain#Patching"),
                    ("package", "package#Core"),
                    ("label", "Patching"),
                    ("isVisible", "TRUE"),
                    ("unitCost", "domain#CostLevelLow"),
                    ("performanceImpact", "domain#PerformanceImpactLevelLow"),
                ],
            )
            .row(
                "ControlLocations",
                &[
                    ("URI", "domain#Patching"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Role_Host"),
                ],
            )
            .row(
                "Misbehaviour",
                &[
                    ("URI", "domain#LossOfAvailability"),
                    ("package", "package#Core"),
                    ("label", "Loss of Availability"),
                    ("isVisible", "FALSE"),
                ],
            )
            .row(
                "MisbehaviourLocations",
                &[
                    ("URI", "domain#LossOfAvailability"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Role_Host"),
                ],
            )
            .row(
                "TrustworthinessAttribute",
                &[
                    ("URI", "domain#Availability"),
                    ("package", "package#Core"),
                    ("label", "Availability"),
                    ("isVisible", "TRUE"),
                ],
            )
            .row(
                "TWALocations",
                &[
                    ("URI", "domain#Availability"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Role_Host"),
                ],
            )
            .row(
                "TWIS",
                &[
                    ("URI", "domain#TWIS-Availability-LossOfAvailability"),
                    ("package", "package#Core"),
                    ("affectedBy", "domain#LossOfAvailability"),
                    ("affects", "domain#Availability"),
                ],
            )
            .row(
                "MIS",
                &[
                    ("URI", "domain#MIS-LossOfAvailability-Patching"),
                    ("package", "package#Core"),
                    ("inhibited", "domain#LossOfAvailability"),
                    ("inhibitedBy", "domain#Patching"),
                ],
            )
            .row(
                "RootPattern",
                &[("URI", "domain#RP-Host"), ("package", "package#Core"), ("label", "Host")],
            )
            .row(
                "RootPatternNodes",
                &[
                    ("URI", "domain#RP-Host"),
                    ("package", "package#Core"),
                    ("hasNode", "domain#Node-Host-Host"),
                    ("keyNode", "TRUE"),
                ],
            )
            .row(
                "RootPatternLinks",
                &[
                    ("URI", "domain#RP-Host"),
                    ("package", "package#Core"),
                    ("hasLink", "domain#Link-Host-connectedTo-Net"),
                ],
            )
            .row(
                "MatchingPattern",
                &[
                    ("URI", "domain#MP-Host"),
                    ("package", "package#Core"),
                    ("label", "Host"),
                    ("hasRootPattern", "domain#RP-Host"),
                ],
            )
            .row(
                "MatchingPatternNodes",
                &[
                    ("URI", "domain#MP-Host"),
                    ("package", "package#Core"),
                    ("hasNode", "domain#Node-Net-Network"),
                    ("mandatoryNode", "FALSE"),
                    ("prohibitedNode", "FALSE"),
                    ("sufficientNode", "FALSE"),
                ],
            )
            .row(
                "ConstructionPattern",
                &[
                    ("URI", "domain#CP-Host"),
                    ("package", "package#Core"),
                    ("label", "Host"),
                    ("hasMatchingPattern", "domain#MP-Host"),
                    ("iterate", "FALSE"),
                    ("maxIterations", "1"),
                    ("hasPriority", "5"),
                ],
            )
            .row(
                "InferredNodeSetting",
                &[
                    ("package", "package#Core"),
                    ("inPattern", "domain#CP-Host"),
                    ("hasNode", "domain#Node-Host-Host"),
                    ("hasSetting", "domain#INS-CP-Host-Host"),
                    ("displayedAtNode", "TRUE"),
                    ("displayedAtLink", "FALSE"),
                    ("displayedAt", "domain#Node-Host-Host"),
                ],
            )
            .row(
                "ThreatCategory",
                &[("URI", "domain#ThreatCategory-Availability"), ("label", "Availability")],
            )
            .row(
                "ComplianceSet",
                &[
                    ("URI", "domain#ComplianceSet-Basic"),
                    ("package", "package#Core"),
                    ("label", "Basic"),
                ],
            )
            .row(
                "ComplianceSetThreats",
                &[
                    ("URI", "domain#ComplianceSet-Basic"),
                    ("package", "package#Core"),
                    ("requiresTreatmentOf", "domain#H.A.HDoS.1"),
                ],
            )
            .row(
                "Threat",
                &[
                    ("URI", "domain#H.A.HDoS.1"),
                    ("package", "package#Core"),
                    ("label", "Host DoS"),
                    ("comment", "Host is flooded"),
                    ("hasCategory", "domain#ThreatCategory-Availability"),
                    ("appliesTo", "domain#MP-Host"),
                    ("threatens", "domain#Node-Host-Host"),
                    ("hasFrequency", "domain#LikelihoodHigh"),
                    ("currentRisk", "TRUE"),
                    ("futureRisk", "FALSE"),
                    ("secondaryThreat", "FALSE"),
                    ("normalOperation", "FALSE"),
                ],
            )
            .row(
                "ThreatEntryPoints",
                &[
                    ("URI", "domain#H.A.HDoS.1"),
                    ("package", "package#Core"),
                    ("hasEntryPoint", "domain#TWAS-Availability-Host"),
                ],
            )
            .row(
                "ThreatEffects",
                &[
                    ("URI", "domain#H.A.HDoS.1"),
                    ("package", "package#Core"),
                    ("causesMisbehaviour", "domain#MS-LossOfAvailability-Host"),
                ],
            )
            .row(
                "ControlStrategy",
                &[
                    ("URI", "domain#CSG-Patching"),
                    ("package", "package#Core"),
                    ("label", "Patching"),
                    ("hasBlockingEffect", "domain#TrustworthinessLevelHigh"),
                    ("currentRisk", "TRUE"),
                    ("futureRisk", "TRUE"),
                ],
            )
            .row(
                "ControlStrategyBlocks",
                &[
                    ("URI", "domain#CSG-Patching"),
                    ("package", "package#Core"),
                    ("blocks", "domain#H.A.HDoS.1"),
                ],
            )
            .row(
                "ControlStrategyControls",
                &[
                    ("URI", "domain#CSG-Patching"),
                    ("package", "package#Core"),
                    ("hasControlSet", "domain#CS-Patching-Host"),
                    ("optional", "FALSE"),
                ],
            )
            .row(
                "CASetting",
                &[
                    ("URI", "domain#CAS-Patching-Host"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Host"),
                    ("hasControl", "domain#Patching"),
                    ("isAssertable", "TRUE"),
                    ("hasLevel", "domain#PopulationLevelHigh"),
                    ("independentLevels", "TRUE"),
                ],
            )
            .row(
                "MADefaultSetting",
                &[
                    ("URI", "domain#MAD-LossOfAvailability-Host"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Host"),
                    ("hasMisbehaviour", "domain#LossOfAvailability"),
                    ("hasLevel", "domain#ImpactLevelLow"),
                ],
            )
            .row(
                "TWAADefaultSetting",
                &[
                    ("URI", "domain#TWAAD-Availability-Host"),
                    ("package", "package#Core"),
                    ("metaLocatedAt", "domain#Host"),
                    ("hasTrustworthinessAttribute", "domain#Availability"),
                    ("hasLevel", "domain#TrustworthinessLevelHigh"),
                    ("independentLevels", "FALSE"),
                ],
            )
    }

    /// Append a row; columns not named are left empty
    pub(crate) fn row(mut self, table: &str, cells: &[(&str, &str)]) -> Self {
        let entry = self
            .tables
            .get_mut(table)
            .unwrap_or_else(|| panic!("no fixture table {table}"));
        for (column, _) in cells {
            assert!(
                entry.header.iter().any(|known| known.as_str() == *column),
                "{table} has no column {column}"
            );
        }
        let row = entry
            .header
            .iter()
            .map(|column| {
                cells
                    .iter()
                    .find(|(name, _)| *name == column.as_str())
                    .map_or_else(String::new, |(_, value)| value.to_string())
            })
            .collect();
        entry.rows.push(row);
        self
    }

    /// Set `column` to `value` in every row of `table`
    pub(crate) fn replace(mut self, table: &str, column: &str, value: &str) -> Self {
        let entry = self
            .tables
            .get_mut(table)
            .unwrap_or_else(|| panic!("no fixture table {table}"));
        let idx = entry
            .header
            .iter()
            .position(|known| known.as_str() == column)
            .unwrap_or_else(|| panic!("{table} has no column {column}"));
        for row in &mut entry.rows {
            row[idx] = value.to_string();
        }
        self
    }

    /// Remove `column` from the header and every row of `table`
    pub(crate) fn drop_column(mut self, table: &str, column: &str) -> Self {
        let entry = self
            .tables
            .get_mut(table)
            .unwrap_or_else(|| panic!("no fixture table {table}"));
        let idx = entry
            .header
            .iter()
            .position(|known| known.as_str() == column)
            .unwrap_or_else(|| panic!("{table} has no column {column}"));
        entry.header.remove(idx);
        for row in &mut entry.rows {
            row.remove(idx);
        }
        self
    }

    /// Declare a supported feature
    pub(crate) fn feature(self, uri: &str) -> Self {
        self.row("DomainFeature", &[("URI", uri), ("supported", "TRUE")])
    }

    /// Drop a table file entirely
    pub(crate) fn without(mut self, table: &str) -> Self {
        self.tables.remove(table);
        self
    }

    /// Write every table to a fresh temporary directory
    pub(crate) fn write(&self) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, table) in &self.tables {
            let mut writer = csv::Writer::from_path(dir.path().join(format!("{name}.csv"))).unwrap();
            writer.write_record(&table.header).unwrap();
            for row in &table.rows {
                writer.write_record(row).unwrap();
            }
            writer.flush().unwrap();
        }
        dir
    }

    /// Write and load the tables
    pub(crate) fn load(&self) -> TableSet {
        let dir = self.write();
        TableSet::load(dir.path()).unwrap()
    }
}
