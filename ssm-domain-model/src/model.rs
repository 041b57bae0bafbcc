//! In-memory domain model records
//!
//! All resource identifiers are SSM local names (`domain#Host`,
//! `core#Threat`, ...) except [`ModelHeader::ontology`] and
//! [`ModelHeader::domain_graph`], which are full IRIs taken from
//! `DomainModel.csv`. Predicates are full IRIs from `ssm_vocab`.

use crate::features::{FeatureSet, Package};
use ssm_vocab::ssm::core;

/// Ontology header: the first resource written to the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHeader {
    /// Ontology IRI, written verbatim
    pub ontology: String,
    /// Domain graph IRI; the graph label of every quad
    pub domain_graph: String,
    pub label: String,
    pub comment: String,
    pub version_info: String,
    pub reasoner_class: String,
}

/// A generic (subject, predicate, object) record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub subject: String,
    pub predicate: &'static str,
    pub object: String,
}

impl Relation {
    pub fn new(subject: impl Into<String>, predicate: &'static str, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

/// The seven ordinal scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    TrustworthinessLevel,
    Likelihood,
    ImpactLevel,
    RiskLevel,
    PopulationLevel,
    CostLevel,
    PerformanceImpactLevel,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 7] = [
        ScaleKind::TrustworthinessLevel,
        ScaleKind::Likelihood,
        ScaleKind::ImpactLevel,
        ScaleKind::RiskLevel,
        ScaleKind::PopulationLevel,
        ScaleKind::CostLevel,
        ScaleKind::PerformanceImpactLevel,
    ];

    /// Table the scale is read from
    pub fn table(self) -> &'static str {
        match self {
            ScaleKind::TrustworthinessLevel => "TrustworthinessLevel",
            ScaleKind::Likelihood => "Likelihood",
            ScaleKind::ImpactLevel => "ImpactLevel",
            ScaleKind::RiskLevel => "RiskLevel",
            ScaleKind::PopulationLevel => "PopulationLevel",
            ScaleKind::CostLevel => "CostLevel",
            ScaleKind::PerformanceImpactLevel => "PerformanceImpactLevel",
        }
    }

    /// `rdf:type` of each level
    pub fn class_iri(self) -> &'static str {
        match self {
            ScaleKind::TrustworthinessLevel => core::TRUSTWORTHINESS_LEVEL,
            ScaleKind::Likelihood => core::LIKELIHOOD,
            ScaleKind::ImpactLevel => core::IMPACT_LEVEL,
            ScaleKind::RiskLevel => core::RISK_LEVEL,
            ScaleKind::PopulationLevel => core::POPULATION_LEVEL,
            ScaleKind::CostLevel => core::COST_LEVEL,
            ScaleKind::PerformanceImpactLevel => core::PERFORMANCE_IMPACT_LEVEL,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ScaleKind::TrustworthinessLevel => "Scale for (asset) Trustworthiness Levels",
            ScaleKind::Likelihood => "Scale for (threat or asset behaviour) Likelihood Levels",
            ScaleKind::ImpactLevel => "Scale for (asset behaviour) Impact Levels",
            ScaleKind::RiskLevel => "Scale for (threat or asset behaviour) Risk Levels",
            ScaleKind::PopulationLevel => "Scale for asset Population Levels",
            ScaleKind::CostLevel => "Scale for Control Cost Levels",
            ScaleKind::PerformanceImpactLevel => "Scale for Control Performance Overhead Levels",
        }
    }

    /// Whether the scale's notable end is its highest level
    /// (only trustworthiness; every other scale notes its zero level)
    pub fn notes_highest(self) -> bool {
        matches!(self, ScaleKind::TrustworthinessLevel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub uri: String,
    pub label: String,
    pub comment: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pub kind: ScaleKind,
    pub levels: Vec<Level>,
}

impl Scale {
    /// The highest level for trustworthiness, the zero level otherwise
    pub fn end(&self) -> Option<&Level> {
        if self.kind.notes_highest() {
            self.levels.iter().max_by_key(|level| level.value)
        } else {
            self.levels.iter().rev().find(|level| level.value == 0)
        }
    }
}

/// Flags shared by asset types and relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementFlags {
    pub assertable: bool,
    pub visible: bool,
    /// Only relationships carry `core#hidden`
    pub hidden: Option<bool>,
    /// `core#isConstructionState` is written only when set
    pub construction_state: bool,
}

/// An asset type (class) or relationship (object property)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelElement {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub flags: ElementFlags,
    /// Asset icon, when the table has an `icon` column and the cell is set
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
}

/// Controls, misbehaviours and trustworthiness attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Control,
    Misbehaviour,
    TrustworthinessAttribute,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Control => "Control",
            EntityKind::Misbehaviour => "Misbehaviour",
            EntityKind::TrustworthinessAttribute => "TrustworthinessAttribute",
        }
    }

    pub fn locations_table(self) -> &'static str {
        match self {
            EntityKind::Control => "ControlLocations",
            EntityKind::Misbehaviour => "MisbehaviourLocations",
            EntityKind::TrustworthinessAttribute => "TWALocations",
        }
    }

    pub fn class_iri(self) -> &'static str {
        match self {
            EntityKind::Control => core::CONTROL,
            EntityKind::Misbehaviour => core::MISBEHAVIOUR,
            EntityKind::TrustworthinessAttribute => core::TRUSTWORTHINESS_ATTRIBUTE,
        }
    }

    /// Type of the sets that locate this entity at a role
    pub fn set_class_iri(self) -> &'static str {
        match self {
            EntityKind::Control => core::CONTROL_SET,
            EntityKind::Misbehaviour => core::MISBEHAVIOUR_SET,
            EntityKind::TrustworthinessAttribute => core::TRUSTWORTHINESS_ATTRIBUTE_SET,
        }
    }

    /// Predicate from a set to its entity
    pub fn set_member_iri(self) -> &'static str {
        match self {
            EntityKind::Control => core::HAS_CONTROL,
            EntityKind::Misbehaviour => core::HAS_MISBEHAVIOUR,
            EntityKind::TrustworthinessAttribute => core::HAS_TRUSTWORTHINESS_ATTRIBUTE,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            EntityKind::Control => "Control definitions",
            EntityKind::Misbehaviour => "Misbehaviour definitions",
            EntityKind::TrustworthinessAttribute => "Trustworthiness Attribute definitions",
        }
    }

    pub fn set_heading(self) -> &'static str {
        match self {
            EntityKind::Control => {
                "Control Set definitions: combination of a Control at an asset with a given Role"
            }
            EntityKind::Misbehaviour => {
                "Misbehaviour Set definitions: combination of a Misbehaviour at an asset with a given Role"
            }
            EntityKind::TrustworthinessAttribute => {
                "Trustworthiness Attribute Set definitions: combination of a Trustworthiness Attribute at an asset with a given Role"
            }
        }
    }
}

/// Control cost and performance levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCosts {
    pub unit_cost: String,
    pub performance_impact: String,
}

/// `_Min`/`_Max` members of a population triplet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triplet {
    pub min: String,
    pub max: String,
}

/// Min/max variants of a control, misbehaviour or TWA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationVariants {
    pub uri: Triplet,
    pub label: Triplet,
    pub visible: bool,
}

/// A control, misbehaviour or trustworthiness attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationEntity {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub visible: bool,
    pub costs: Option<ControlCosts>,
    /// Present only when population expansion is in effect
    pub variants: Option<PopulationVariants>,
}

/// Entities of one kind with their (already expanded) locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTable {
    pub kind: EntityKind,
    pub entities: Vec<PopulationEntity>,
    pub locations: Vec<Relation>,
}

/// A trustworthiness impact set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactSet {
    pub uri: String,
    pub affected_by: String,
    pub affects: String,
    /// Min/max population variant of the preceding average set
    pub variant: bool,
}

/// A misbehaviour inhibition set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InhibitionSet {
    pub uri: String,
    pub inhibited: String,
    pub inhibited_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPattern {
    pub uri: String,
    pub package: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingPattern {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub root_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionPattern {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub matching_pattern: String,
    pub priority: i64,
    pub iterate: bool,
    pub max_iterations: i64,
}

/// Where an inferred node is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayedAt {
    Node(String),
    Link(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredNodeSetting {
    pub pattern: String,
    pub node: String,
    pub setting: String,
    pub displayed_at: DisplayedAt,
}

/// A resource with only a label and comment (threat categories, compliance sets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Described {
    pub uri: String,
    pub label: String,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskFlags {
    pub current: bool,
    pub future: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreatTypeFlags {
    pub secondary: bool,
    pub normal_op: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threat {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub category: String,
    pub applies_to: String,
    pub threatens: String,
    /// The flags and triplet below are written only for threats with a frequency
    pub frequency: Option<String>,
    pub risk: Option<RiskFlags>,
    pub threat_type: Option<ThreatTypeFlags>,
    pub triplet: Option<Triplet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStrategy {
    pub uri: String,
    pub package: String,
    pub label: String,
    pub comment: String,
    pub blocking_effect: String,
    pub risk: Option<RiskFlags>,
    pub triplet: Option<Triplet>,
}

/// The three default-setting tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    CaSetting,
    MaDefault,
    TwaaDefault,
}

impl SettingKind {
    pub fn table(self) -> &'static str {
        match self {
            SettingKind::CaSetting => "CASetting",
            SettingKind::MaDefault => "MADefaultSetting",
            SettingKind::TwaaDefault => "TWAADefaultSetting",
        }
    }

    pub fn class_iri(self) -> &'static str {
        match self {
            SettingKind::CaSetting => core::CA_SETTING,
            SettingKind::MaDefault => core::MA_DEFAULT_SETTING,
            SettingKind::TwaaDefault => core::TWAA_DEFAULT_SETTING,
        }
    }

    /// Column holding the target entity, which is also the predicate's local name
    pub fn target_column(self) -> &'static str {
        match self {
            SettingKind::CaSetting => "hasControl",
            SettingKind::MaDefault => "hasMisbehaviour",
            SettingKind::TwaaDefault => "hasTrustworthinessAttribute",
        }
    }

    pub fn target_iri(self) -> &'static str {
        match self {
            SettingKind::CaSetting => core::HAS_CONTROL,
            SettingKind::MaDefault => core::HAS_MISBEHAVIOUR,
            SettingKind::TwaaDefault => core::HAS_TRUSTWORTHINESS_ATTRIBUTE,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            SettingKind::CaSetting => {
                "CASetting definitions: whether a Control is assertible at an Asset"
            }
            SettingKind::MaDefault => {
                "MADefaultSetting definitions: default impact level for a Misbehaviour at an Asset"
            }
            SettingKind::TwaaDefault => {
                "TWAADefaultSetting definitions: default TW level for a Trustworthiness Attribute at an Asset"
            }
        }
    }
}

/// One default setting. CASetting variants are separate records that
/// follow their average setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub uri: String,
    pub target: String,
    pub located_at: String,
    pub assertable: Option<bool>,
    pub level: String,
    pub independent_levels: Option<bool>,
    pub variant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingTable {
    pub kind: SettingKind,
    pub settings: Vec<Setting>,
}

/// `domain#Node-{role}-{asset}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub uri: String,
    pub role: String,
    pub asset: String,
}

/// `domain#Link-{from}-{relationship}-{to}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLink {
    pub uri: String,
    pub from: String,
    pub link_type: String,
    pub to: String,
}

/// `domain#CS-…`, `domain#MS-…` or `domain#TWAS-…`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub uri: String,
    pub entity: String,
    pub located_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTable {
    pub kind: EntityKind,
    pub sets: Vec<EntitySet>,
}

/// Everything the serializer writes, in table-row order
#[derive(Debug, Clone)]
pub struct DomainModel {
    pub header: ModelHeader,
    pub features: FeatureSet,
    /// Feature local names written as `domain#Feature-…`
    pub published_features: Vec<String>,
    pub packages: Vec<Package>,
    /// Whether `core#enabled` is written for packages
    pub optional_packages: bool,
    pub expansion: bool,

    pub scales: Vec<Scale>,
    pub assets: Vec<ModelElement>,
    pub asset_parents: Vec<Relation>,
    pub relationships: Vec<ModelElement>,
    /// Parents, then domains, then ranges
    pub relationship_links: Vec<Vec<Relation>>,
    pub roles: Vec<Role>,
    pub role_locations: Vec<Relation>,
    pub entities: Vec<EntityTable>,
    pub impact_sets: Vec<ImpactSet>,
    pub inhibition_sets: Vec<InhibitionSet>,

    pub root_patterns: Vec<RootPattern>,
    pub root_nodes: Vec<Relation>,
    pub root_links: Vec<Relation>,
    pub matching_patterns: Vec<MatchingPattern>,
    pub matching_nodes: Vec<Relation>,
    pub matching_links: Vec<Relation>,
    /// Type and membership relations for distinct node groups
    pub distinct_node_groups: Vec<Relation>,
    pub distinct_node_group_nodes: Vec<Relation>,
    pub construction_patterns: Vec<ConstructionPattern>,
    pub inferred_node_settings: Vec<InferredNodeSetting>,
    pub inferred_node_includes: Vec<Relation>,
    pub inferred_links: Vec<Relation>,

    pub threat_categories: Vec<Described>,
    pub compliance_sets: Vec<Described>,
    pub compliance_threats: Vec<Relation>,
    pub threats: Vec<Threat>,
    /// Entry points, secondary effect conditions, effects, blocks,
    /// mitigates and triggers, one list per table
    pub threat_links: Vec<Vec<Relation>>,
    pub control_strategies: Vec<ControlStrategy>,
    pub control_strategy_controls: Vec<Relation>,

    pub settings: Vec<SettingTable>,

    pub nodes: Vec<Node>,
    pub role_links: Vec<RoleLink>,
    pub sets: Vec<SetTable>,
}

impl DomainModel {
    /// `(asset local name, icon)` for every emitted asset with an icon
    pub fn icons(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets
            .iter()
            .filter_map(|asset| asset.icon.as_deref().map(|icon| (asset.uri.as_str(), icon)))
    }
}
