//! RDF vocabulary constants for SSM domain models
//!
//! This crate centralizes the IRIs written by the CSV to N-Quads converter.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `ssm` - the trustworthiness ontology base, its `core#` terms, and the
//!   local-name conventions used for `domain#` resources

/// Expand a `core#` local name to its full IRI at compile time.
macro_rules! core_iri {
    ($local:literal) => {
        concat!(
            "http://it-innovation.soton.ac.uk/ontologies/trustworthiness/core#",
            $local
        )
    };
}

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:subClassOf IRI
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

    /// rdfs:subPropertyOf IRI
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";

    /// rdfs:domain IRI
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";

    /// rdfs:range IRI
    pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// OWL vocabulary constants
pub mod owl {
    /// owl:imports IRI
    pub const IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";

    /// owl:Ontology IRI
    pub const ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";

    /// owl:versionInfo IRI
    pub const VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";

    /// owl:Class IRI
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";

    /// owl:ObjectProperty IRI
    pub const OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
}

/// SSM trustworthiness ontology
pub mod ssm {
    /// Base of every SSM IRI. Local names such as `core#Threat` or
    /// `domain#Host` are appended after a `/`.
    pub const BASE: &str = "http://it-innovation.soton.ac.uk/ontologies/trustworthiness";

    /// The core ontology imported by every domain model
    pub const CORE_ONTOLOGY: &str = "http://it-innovation.soton.ac.uk/ontologies/trustworthiness/core";

    /// Expand an SSM local name (`domain#Host`, `core#Role`, ...) to a full IRI.
    ///
    /// Returns `None` for an empty local name so callers can skip the quad
    /// instead of writing a malformed term.
    pub fn expand(local: &str) -> Option<String> {
        if local.is_empty() {
            None
        } else {
            Some(format!("{BASE}/{local}"))
        }
    }

    /// Local-name prefixes that give `domain#` resources their structure
    pub mod names {
        /// Prefix of every domain-model resource
        pub const DOMAIN: &str = "domain#";

        /// Prefix of package identifiers in the CSV tables
        pub const PACKAGE: &str = "package#";

        /// Prefix of published package resources
        pub const DOMAIN_PACKAGE: &str = "domain#Package-";

        /// Prefix of feature identifiers in `DomainFeature.csv`
        pub const FEATURE: &str = "feature#";

        /// Prefix of published feature resources
        pub const DOMAIN_FEATURE: &str = "domain#Feature-";

        /// Role resources: `domain#Role_{name}`
        pub const ROLE: &str = "domain#Role_";

        /// Node resources: `domain#Node-{role}-{asset}`
        pub const NODE: &str = "domain#Node-";

        /// Role link resources: `domain#Link-{from}-{relationship}-{to}`
        pub const LINK: &str = "domain#Link-";

        /// Control sets: `domain#CS-{control}-{role}`
        pub const CONTROL_SET: &str = "domain#CS-";

        /// Misbehaviour sets: `domain#MS-{misbehaviour}-{role}`
        pub const MISBEHAVIOUR_SET: &str = "domain#MS-";

        /// TWA sets: `domain#TWAS-{twa}-{role}`
        pub const TWA_SET: &str = "domain#TWAS-";

        /// Trustworthiness impact sets: `domain#TWIS-{affects}-{affectedBy}`
        pub const TWIS: &str = "domain#TWIS-";

        /// Placeholder URI marking the row of editor defaults in a CSV table
        pub const DUMMY: &str = "domain#000000";

        /// Suffix of the minimum member of a population triplet
        pub const MIN_SUFFIX: &str = "_Min";

        /// Suffix of the maximum member of a population triplet
        pub const MAX_SUFFIX: &str = "_Max";
    }

    /// Domain model feature identifiers (as written in `DomainFeature.csv`)
    pub mod feature {
        /// Packages may be switched off
        pub const OPTIONAL_PACKAGES: &str = "feature#OptionalPackages";

        /// Controls, misbehaviours and TWAs expand into population triplets
        pub const POPULATION_MODEL: &str = "feature#PopulationModel";

        /// Secondary and normal-operation threats are flagged explicitly
        pub const THREAT_TYPE_FLAGS: &str = "feature#ThreatTypeFlags";

        /// Threats and CSGs are flagged for current/future risk
        pub const RISK_TYPE_FLAGS: &str = "feature#RiskTypeFlags";

        /// Threats may have both TWAS and MS causes
        pub const MIXED_THREAT_CAUSES: &str = "feature#MixedThreatCauses";

        /// Asset and relationship types carry construction-state flags
        pub const CONSTRUCTION_STATE_FLAGS: &str = "feature#ConstructionStateFlags";

        /// Construction pattern priorities come from predecessor/successor tables
        pub const CONSTRUCTION_DEPENDENCIES: &str = "feature#ConstructionDependencies";
    }

    /// SSM core vocabulary (full IRIs)
    pub mod core {
        // Domain model header
        pub const DOMAIN_GRAPH: &str = core_iri!("domainGraph");
        pub const REASONER_CLASS: &str = core_iri!("reasonerClass");
        pub const MODEL_FEATURE: &str = core_iri!("ModelFeature");
        pub const MODEL_PACKAGE: &str = core_iri!("ModelPackage");
        pub const ENABLED: &str = core_iri!("enabled");
        pub const LEVEL_VALUE: &str = core_iri!("levelValue");

        // Shared element properties
        pub const IN_PACKAGE: &str = core_iri!("inPackage");
        pub const IS_ASSERTABLE: &str = core_iri!("isAssertable");
        pub const IS_VISIBLE: &str = core_iri!("isVisible");
        pub const IS_CONSTRUCTION_STATE: &str = core_iri!("isConstructionState");
        pub const HIDDEN: &str = core_iri!("hidden");
        pub const META_LOCATED_AT: &str = core_iri!("metaLocatedAt");
        pub const LOCATED_AT: &str = core_iri!("locatedAt");

        // Roles, controls, misbehaviours, TWAs
        pub const ROLE: &str = core_iri!("Role");
        pub const CONTROL: &str = core_iri!("Control");
        pub const MISBEHAVIOUR: &str = core_iri!("Misbehaviour");
        pub const TRUSTWORTHINESS_ATTRIBUTE: &str = core_iri!("TrustworthinessAttribute");
        pub const UNIT_COST: &str = core_iri!("unitCost");
        pub const PERFORMANCE_IMPACT: &str = core_iri!("performanceImpact");

        // Population triplets
        pub const HAS_MIN: &str = core_iri!("hasMin");
        pub const HAS_MAX: &str = core_iri!("hasMax");
        pub const MIN_OF: &str = core_iri!("minOf");
        pub const MAX_OF: &str = core_iri!("maxOf");

        // Impact and inhibition sets
        pub const TRUSTWORTHINESS_IMPACT_SET: &str = core_iri!("TrustworthinessImpactSet");
        pub const AFFECTED_BY: &str = core_iri!("affectedBy");
        pub const AFFECTS: &str = core_iri!("affects");
        pub const MISBEHAVIOUR_INHIBITION_SET: &str = core_iri!("MisbehaviourInhibitionSet");
        pub const INHIBITED: &str = core_iri!("inhibited");
        pub const INHIBITED_BY: &str = core_iri!("inhibitedBy");

        // Patterns
        pub const ROOT_PATTERN: &str = core_iri!("RootPattern");
        pub const HAS_KEY_NODE: &str = core_iri!("hasKeyNode");
        pub const HAS_ROOT_NODE: &str = core_iri!("hasRootNode");
        pub const HAS_LINK: &str = core_iri!("hasLink");
        pub const MATCHING_PATTERN: &str = core_iri!("MatchingPattern");
        pub const HAS_ROOT_PATTERN: &str = core_iri!("hasRootPattern");
        pub const HAS_SUFFICIENT_NODE: &str = core_iri!("hasSufficientNode");
        pub const HAS_NECESSARY_NODE: &str = core_iri!("hasNecessaryNode");
        pub const HAS_PROHIBITED_NODE: &str = core_iri!("hasProhibitedNode");
        pub const HAS_OPTIONAL_NODE: &str = core_iri!("hasOptionalNode");
        pub const HAS_PROHIBITED_LINK: &str = core_iri!("hasProhibitedLink");
        pub const DISTINCT_NODE_GROUP: &str = core_iri!("DistinctNodeGroup");
        pub const HAS_DISTINCT_NODE_GROUP: &str = core_iri!("hasDistinctNodeGroup");
        pub const HAS_NODE: &str = core_iri!("hasNode");
        pub const CONSTRUCTION_PATTERN: &str = core_iri!("ConstructionPattern");
        pub const HAS_MATCHING_PATTERN: &str = core_iri!("hasMatchingPattern");
        pub const HAS_PRIORITY: &str = core_iri!("hasPriority");
        pub const ITERATE: &str = core_iri!("iterate");
        pub const MAX_ITERATIONS: &str = core_iri!("maxIterations");
        pub const HAS_INFERRED_NODE: &str = core_iri!("hasInferredNode");
        pub const HAS_INFERRED_NODE_SETTING: &str = core_iri!("hasInferredNodeSetting");
        pub const INFERRED_NODE_SETTING: &str = core_iri!("InferredNodeSetting");
        pub const DISPLAYED_AT_NODE: &str = core_iri!("displayedAtNode");
        pub const DISPLAYED_AT_LINK: &str = core_iri!("displayedAtLink");
        pub const INCLUDES_NODE_IN_URI: &str = core_iri!("includesNodeInURI");
        pub const HAS_INFERRED_LINK: &str = core_iri!("hasInferredLink");

        // Threats and compliance
        pub const THREAT_CATEGORY: &str = core_iri!("ThreatCategory");
        pub const COMPLIANCE_SET: &str = core_iri!("ComplianceSet");
        pub const REQUIRES_TREATMENT_OF: &str = core_iri!("requiresTreatmentOf");
        pub const THREAT: &str = core_iri!("Threat");
        pub const HAS_CATEGORY: &str = core_iri!("hasCategory");
        pub const APPLIES_TO: &str = core_iri!("appliesTo");
        pub const THREATENS: &str = core_iri!("threatens");
        pub const HAS_FREQUENCY: &str = core_iri!("hasFrequency");
        pub const IS_CURRENT_RISK: &str = core_iri!("isCurrentRisk");
        pub const IS_FUTURE_RISK: &str = core_iri!("isFutureRisk");
        pub const IS_SECONDARY_THREAT: &str = core_iri!("isSecondaryThreat");
        pub const IS_NORMAL_OP: &str = core_iri!("isNormalOp");
        pub const HAS_ENTRY_POINT: &str = core_iri!("hasEntryPoint");
        pub const HAS_SECONDARY_EFFECT_CONDITION: &str = core_iri!("hasSecondaryEffectCondition");
        pub const CAUSES_MISBEHAVIOUR: &str = core_iri!("causesMisbehaviour");

        // Control strategies
        pub const CONTROL_STRATEGY: &str = core_iri!("ControlStrategy");
        pub const HAS_BLOCKING_EFFECT: &str = core_iri!("hasBlockingEffect");
        pub const BLOCKS: &str = core_iri!("blocks");
        pub const MITIGATES: &str = core_iri!("mitigates");
        pub const TRIGGERS: &str = core_iri!("triggers");
        pub const HAS_OPTIONAL_CS: &str = core_iri!("hasOptionalCS");
        pub const HAS_MANDATORY_CS: &str = core_iri!("hasMandatoryCS");

        // Default settings
        pub const CA_SETTING: &str = core_iri!("CASetting");
        pub const HAS_CONTROL: &str = core_iri!("hasControl");
        pub const HAS_LEVEL: &str = core_iri!("hasLevel");
        pub const INDEPENDENT_LEVELS: &str = core_iri!("independentLevels");
        pub const MA_DEFAULT_SETTING: &str = core_iri!("MADefaultSetting");
        pub const HAS_MISBEHAVIOUR: &str = core_iri!("hasMisbehaviour");
        pub const TWAA_DEFAULT_SETTING: &str = core_iri!("TWAADefaultSetting");
        pub const HAS_TRUSTWORTHINESS_ATTRIBUTE: &str = core_iri!("hasTrustworthinessAttribute");

        // Derived structures
        pub const NODE: &str = core_iri!("Node");
        pub const META_HAS_ASSET: &str = core_iri!("metaHasAsset");
        pub const HAS_ROLE: &str = core_iri!("hasRole");
        pub const ROLE_LINK: &str = core_iri!("RoleLink");
        pub const LINK_TYPE: &str = core_iri!("linkType");
        pub const LINKS_FROM: &str = core_iri!("linksFrom");
        pub const LINKS_TO: &str = core_iri!("linksTo");
        pub const CONTROL_SET: &str = core_iri!("ControlSet");
        pub const MISBEHAVIOUR_SET: &str = core_iri!("MisbehaviourSet");
        pub const TRUSTWORTHINESS_ATTRIBUTE_SET: &str = core_iri!("TrustworthinessAttributeSet");

        // Scales
        pub const TRUSTWORTHINESS_LEVEL: &str = core_iri!("TrustworthinessLevel");
        pub const LIKELIHOOD: &str = core_iri!("Likelihood");
        pub const IMPACT_LEVEL: &str = core_iri!("ImpactLevel");
        pub const RISK_LEVEL: &str = core_iri!("RiskLevel");
        pub const POPULATION_LEVEL: &str = core_iri!("PopulationLevel");
        pub const COST_LEVEL: &str = core_iri!("CostLevel");
        pub const PERFORMANCE_IMPACT_LEVEL: &str = core_iri!("PerformanceImpactLevel");
    }
}
