//! Domain model builder
//!
//! Turns the loaded tables into a [`DomainModel`]. Every option-dependent
//! decision (header overrides, the unfiltered override, population
//! expansion, construction priorities) is made here, so the serializer only
//! walks records.

use crate::error::{ConvertError, ConvertResult};
use crate::features::{feature_resource, FeatureSet, Packages};
use crate::model::*;
use crate::registry::{Collected, Registries, ShortNames};
use crate::sequence::{ConstructionGraph, ConstructionSequence};
use crate::tables::{RowRef, TableSet};
use ssm_vocab::rdf;
use ssm_vocab::rdfs;
use ssm_vocab::ssm::{core, feature, names};
use std::collections::HashMap;

/// Options that change the generated model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Force misbehaviour, TWA and control visibility on and drop
    /// construction-state flags
    pub unfiltered: bool,
    /// Expand population triplets when the model supports them
    pub expanded: bool,
    /// `owl:versionInfo`; `-unfiltered` is appended when `unfiltered` is set
    pub version: String,
    /// Replaces the last `/` segment of the domain graph IRI
    pub name: Option<String>,
    /// Replaces the domain model label
    pub label: Option<String>,
}

/// Suffixes for the domain graph IRI and label of a population model that
/// is not being expanded
pub fn unexpanded_suffixes(
    supports_population: bool,
    expansion_requested: bool,
) -> (&'static str, &'static str) {
    if supports_population && !expansion_requested {
        ("-unexpanded", "-UNEXPANDED")
    } else {
        ("", "")
    }
}

/// Replace the last `/`-separated segment of `iri` with `name`
fn replace_last_segment(iri: &str, name: &str) -> String {
    match iri.rfind('/') {
        Some(idx) => format!("{}{}", &iri[..=idx], name),
        None => name.to_string(),
    }
}

impl ModelHeader {
    /// Resolve the header from `DomainModel.csv` and the overrides
    pub fn resolve(
        tables: &TableSet,
        options: &ConvertOptions,
        supports_population: bool,
    ) -> ConvertResult<Self> {
        let table = tables.table("DomainModel")?;
        let row = table
            .rows()
            .next()
            .ok_or_else(|| ConvertError::malformed(table.file(), 1, "table has no data row"))?;

        let mut domain_graph = match &options.name {
            Some(name) => replace_last_segment(row.get("domainGraph")?, name),
            None => row.get("domainGraph")?.to_string(),
        };
        let mut label = match &options.label {
            Some(label) => label.clone(),
            None => row.get("label")?.to_string(),
        };
        let (name_suffix, label_suffix) = unexpanded_suffixes(supports_population, options.expanded);
        domain_graph.push_str(name_suffix);
        label.push_str(label_suffix);

        let mut version_info = options.version.clone();
        if options.unfiltered {
            version_info.push_str("-unfiltered");
        }

        Ok(Self {
            ontology: row.get("URI")?.to_string(),
            domain_graph,
            label,
            comment: row.get("comment")?.to_string(),
            version_info,
            reasoner_class: row.get("reasonerClass")?.to_string(),
        })
    }
}

/// Min/max variants of `base`: the suffix is appended
pub fn suffixed(base: &str) -> Triplet {
    if base.is_empty() {
        return Triplet {
            min: String::new(),
            max: String::new(),
        };
    }
    Triplet {
        min: format!("{base}{}", names::MIN_SUFFIX),
        max: format!("{base}{}", names::MAX_SUFFIX),
    }
}

/// Min/max variants of `base` with the suffix inserted after the first
/// occurrence of `prefix`
pub fn suffixed_after(base: &str, prefix: &str) -> Result<Triplet, String> {
    if base.is_empty() {
        return Ok(suffixed(base));
    }
    let idx = base
        .find(prefix)
        .ok_or_else(|| format!("'{prefix}' cannot be found in '{base}'"))?;
    let (pre, post) = base.split_at(idx + prefix.len());
    let triplet = Triplet {
        min: format!("{pre}{}{post}", names::MIN_SUFFIX),
        max: format!("{pre}{}{post}", names::MAX_SUFFIX),
    };
    if post.contains(prefix) {
        tracing::warn!(
            uri = base,
            prefix,
            min = %triplet.min,
            "prefix occurs more than once, suffix inserted after the first"
        );
    }
    Ok(triplet)
}

/// Threat variants: the suffix goes after the first two `.`-separated parts
/// of the local name, which needs at least four parts
pub fn threat_triplet(uri: &str) -> Result<Triplet, String> {
    let local = uri.strip_prefix(names::DOMAIN).unwrap_or(uri);
    let bits: Vec<&str> = local.split('.').collect();
    if bits.len() < 4 {
        return Err(format!(
            "threat URI has invalid form (needs at least 3 full stops): {uri}"
        ));
    }
    suffixed_after(uri, &format!("{}.{}", bits[0], bits[1]))
}

/// Control strategy variants: the suffix goes after the first two
/// `-`-separated parts of the local name
pub fn control_strategy_triplet(uri: &str) -> Result<Triplet, String> {
    let local = uri.strip_prefix(names::DOMAIN).unwrap_or(uri);
    let bits: Vec<&str> = local.split('-').collect();
    if bits.len() < 2 {
        return Err(format!(
            "control strategy URI has invalid form (needs at least one hyphen): {uri}"
        ));
    }
    suffixed_after(uri, &format!("{}-{}", bits[0], bits[1]))
}

/// Build the domain model from loaded tables
pub fn build(tables: &TableSet, options: &ConvertOptions) -> ConvertResult<DomainModel> {
    Builder::new(tables, options)?.build()
}

struct Builder<'a> {
    tables: &'a TableSet,
    options: &'a ConvertOptions,
    features: FeatureSet,
    packages: Packages,
    expansion: bool,
    registries: Registries,
    /// TWA local name → misbehaviour local name, from the TWIS table
    twa_misbehaviour: HashMap<String, String>,
    nodes: Collected<Node>,
    links: Collected<RoleLink>,
    control_sets: Collected<EntitySet>,
    misbehaviour_sets: Collected<EntitySet>,
    twa_sets: Collected<EntitySet>,
}

impl<'a> Builder<'a> {
    fn new(tables: &'a TableSet, options: &'a ConvertOptions) -> ConvertResult<Self> {
        let features = FeatureSet::load(tables)?;
        let supports_population = features.supports_population();
        if options.expanded && !supports_population {
            tracing::warn!(
                "population expansion was requested, but the domain model does not support populations"
            );
        } else if supports_population && !options.expanded {
            tracing::info!("domain model supports populations, but expansion was not requested");
        }
        let expansion = supports_population && options.expanded;

        let packages = Packages::load(tables, features.has(feature::OPTIONAL_PACKAGES))?;
        tracing::info!(
            features = %features.iter().collect::<Vec<_>>().join(", "),
            packages = %packages.enabled().collect::<Vec<_>>().join(", "),
            expansion,
            unfiltered = options.unfiltered,
            "domain model configuration"
        );

        Ok(Self {
            tables,
            options,
            features,
            packages,
            expansion,
            registries: Registries::default(),
            twa_misbehaviour: HashMap::new(),
            nodes: Collected::default(),
            links: Collected::default(),
            control_sets: Collected::default(),
            misbehaviour_sets: Collected::default(),
            twa_sets: Collected::default(),
        })
    }

    fn build(mut self) -> ConvertResult<DomainModel> {
        let header =
            ModelHeader::resolve(self.tables, self.options, self.features.supports_population())?;
        let published_features = self
            .features
            .published(self.expansion)
            .iter()
            .map(|uri| feature_resource(uri))
            .collect();

        let scales = self.scales()?;
        let assets = self.assets()?;
        let asset_parents = self.relations("DomainAssetParents", "subClassOf", rdfs::SUB_CLASS_OF)?;
        let relationships = self.relationships()?;
        let relationship_links = vec![
            self.relations("ObjectPropertyParents", "subPropertyOf", rdfs::SUB_PROPERTY_OF)?,
            self.relations("ObjectPropertyDomains", "domain", rdfs::DOMAIN)?,
            self.relations("ObjectPropertyRanges", "range", rdfs::RANGE)?,
        ];
        let roles = self.roles()?;
        let role_locations = self.relations("RoleLocations", "metaLocatedAt", core::META_LOCATED_AT)?;

        let mut entities = Vec::with_capacity(3);
        for kind in [
            EntityKind::Control,
            EntityKind::Misbehaviour,
            EntityKind::TrustworthinessAttribute,
        ] {
            entities.push(self.entities(kind)?);
        }
        let impact_sets = self.impact_sets()?;
        let inhibition_sets = self.inhibition_sets()?;

        let root_patterns = self.root_patterns()?;
        let root_nodes = self.root_nodes()?;
        let root_links = self.pattern_links("RootPatternLinks", "hasLink", None)?;
        let matching_patterns = self.matching_patterns()?;
        let matching_nodes = self.matching_nodes()?;
        let matching_links = self.pattern_links("MatchingPatternLinks", "hasLink", Some("prohibited"))?;
        let distinct_node_groups = self.distinct_node_groups()?;
        let distinct_node_group_nodes = self.relations("DistinctNodeGroupNodes", "hasNode", core::HAS_NODE)?;
        let construction_patterns = self.construction_patterns()?;
        let inferred_node_settings = self.inferred_node_settings()?;
        let inferred_node_includes = self.relations(
            "InferredNodeSettingIncludes",
            "includesNodeInURI",
            core::INCLUDES_NODE_IN_URI,
        )?;
        let inferred_links =
            self.pattern_links("ConstructionPatternLinks", "hasInferredLink", None)?;

        let threat_categories = self.threat_categories()?;
        let compliance_sets = self.described("ComplianceSet")?;
        let compliance_threats = self.relations(
            "ComplianceSetThreats",
            "requiresTreatmentOf",
            core::REQUIRES_TREATMENT_OF,
        )?;
        let threats = self.threats()?;
        let threat_links = vec![
            self.entry_points()?,
            self.misbehaviour_links(
                "ThreatSEC",
                "hasSecondaryEffectCondition",
                core::HAS_SECONDARY_EFFECT_CONDITION,
            )?,
            self.misbehaviour_links("ThreatEffects", "causesMisbehaviour", core::CAUSES_MISBEHAVIOUR)?,
            self.relations("ControlStrategyBlocks", "blocks", core::BLOCKS)?,
            self.relations("ControlStrategyMitigates", "mitigates", core::MITIGATES)?,
            self.relations("ControlStrategyTriggers", "triggers", core::TRIGGERS)?,
        ];
        let control_strategies = self.control_strategies()?;
        let control_strategy_controls = self.control_strategy_controls()?;

        let mut settings = Vec::with_capacity(3);
        for kind in [
            SettingKind::CaSetting,
            SettingKind::MaDefault,
            SettingKind::TwaaDefault,
        ] {
            settings.push(self.settings(kind)?);
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            role_links = self.links.len(),
            control_sets = self.control_sets.len(),
            misbehaviour_sets = self.misbehaviour_sets.len(),
            twa_sets = self.twa_sets.len(),
            "derived resources collected"
        );

        Ok(DomainModel {
            header,
            published_features,
            optional_packages: self.features.has(feature::OPTIONAL_PACKAGES),
            expansion: self.expansion,
            features: self.features,
            packages: self.packages.into_vec(),
            scales,
            assets,
            asset_parents,
            relationships,
            relationship_links,
            roles,
            role_locations,
            entities,
            impact_sets,
            inhibition_sets,
            root_patterns,
            root_nodes,
            root_links,
            matching_patterns,
            matching_nodes,
            matching_links,
            distinct_node_groups,
            distinct_node_group_nodes,
            construction_patterns,
            inferred_node_settings,
            inferred_node_includes,
            inferred_links,
            threat_categories,
            compliance_sets,
            compliance_threats,
            threats,
            threat_links,
            control_strategies,
            control_strategy_controls,
            settings,
            nodes: self.nodes.into_vec(),
            role_links: self.links.into_vec(),
            sets: vec![
                SetTable {
                    kind: EntityKind::Control,
                    sets: self.control_sets.into_vec(),
                },
                SetTable {
                    kind: EntityKind::Misbehaviour,
                    sets: self.misbehaviour_sets.into_vec(),
                },
                SetTable {
                    kind: EntityKind::TrustworthinessAttribute,
                    sets: self.twa_sets.into_vec(),
                },
            ],
        })
    }

    /// Rows of a packaged table whose package is enabled
    fn packaged(&self, name: &str) -> ConvertResult<Vec<RowRef<'a>>> {
        let tables: &'a TableSet = self.tables;
        let table = tables.table(name)?;
        let mut rows = Vec::with_capacity(table.len());
        for row in table.rows() {
            if self.packages.is_enabled(row.get("package")?) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// One `(URI, predicate, column)` relation per enabled row
    fn relations(
        &self,
        table: &str,
        column: &str,
        predicate: &'static str,
    ) -> ConvertResult<Vec<Relation>> {
        self.packaged(table)?
            .into_iter()
            .map(|row| Ok(Relation::new(row.get("URI")?, predicate, row.get(column)?)))
            .collect()
    }

    fn scales(&self) -> ConvertResult<Vec<Scale>> {
        let mut scales = Vec::with_capacity(ScaleKind::ALL.len());
        for kind in ScaleKind::ALL {
            let table = self.tables.table(kind.table())?;
            let mut levels = Vec::with_capacity(table.len());
            for row in table.rows() {
                levels.push(Level {
                    uri: row.get("URI")?.to_string(),
                    label: row.get("label")?.to_string(),
                    comment: row.get("comment")?.to_string(),
                    value: row.get_int("levelValue")?,
                });
            }
            let scale = Scale { kind, levels };
            if let Some(end) = scale.end() {
                tracing::debug!(scale = kind.table(), level = %end.uri, value = end.value, "scale end");
            }
            scales.push(scale);
        }
        Ok(scales)
    }

    /// Whether the `constructionState` column is in use for `table`
    fn construction_state_column(&self, table: &str) -> ConvertResult<bool> {
        if self.features.has(feature::CONSTRUCTION_STATE_FLAGS) {
            self.tables.table(table)?.require("constructionState")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn construction_state(&self, row: &RowRef<'_>, in_use: bool) -> ConvertResult<bool> {
        if !in_use {
            return Ok(false);
        }
        let flagged = row.get_bool("constructionState")?;
        Ok(flagged && !self.options.unfiltered)
    }

    fn assets(&mut self) -> ConvertResult<Vec<ModelElement>> {
        let in_use = self.construction_state_column("DomainAsset")?;
        let mut assets = Vec::new();
        for row in self.packaged("DomainAsset")? {
            let uri = row.get("URI")?;
            assets.push(ModelElement {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
                flags: ElementFlags {
                    assertable: row.get_bool("isAssertable")?,
                    visible: row.get_bool("isVisible")?,
                    hidden: None,
                    construction_state: self.construction_state(&row, in_use)?,
                },
                icon: row.get_opt("icon").map(str::to_string),
            });
            self.registries.assets.register(uri, names::DOMAIN);
        }
        Ok(assets)
    }

    fn relationships(&mut self) -> ConvertResult<Vec<ModelElement>> {
        let in_use = self.construction_state_column("ObjectProperty")?;
        let mut relationships = Vec::new();
        for row in self.packaged("ObjectProperty")? {
            let uri = row.get("URI")?;
            relationships.push(ModelElement {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
                flags: ElementFlags {
                    assertable: row.get_bool("isAssertable")?,
                    visible: row.get_bool("isVisible")?,
                    hidden: Some(row.get_bool("hidden")?),
                    construction_state: self.construction_state(&row, in_use)?,
                },
                icon: None,
            });
            self.registries.relationships.register(uri, names::DOMAIN);
        }
        Ok(relationships)
    }

    fn roles(&mut self) -> ConvertResult<Vec<Role>> {
        let mut roles = Vec::new();
        for row in self.packaged("Role")? {
            let uri = row.get("URI")?;
            roles.push(Role {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
            });
            self.registries.roles.register(uri, names::ROLE);
        }
        Ok(roles)
    }

    fn entity_registry(&mut self, kind: EntityKind) -> &mut ShortNames {
        match kind {
            EntityKind::Control => &mut self.registries.controls,
            EntityKind::Misbehaviour => &mut self.registries.misbehaviours,
            EntityKind::TrustworthinessAttribute => &mut self.registries.twas,
        }
    }

    fn entities(&mut self, kind: EntityKind) -> ConvertResult<EntityTable> {
        let mut entities = Vec::new();
        for row in self.packaged(kind.table())? {
            let uri = row.get("URI")?;
            let label = row.get("label")?;
            let (visible, variant_visible) = if self.options.unfiltered {
                (true, true)
            } else {
                (row.get_bool("isVisible")?, false)
            };
            let costs = match kind {
                EntityKind::Control => Some(ControlCosts {
                    unit_cost: row.get("unitCost")?.to_string(),
                    performance_impact: row.get("performanceImpact")?.to_string(),
                }),
                _ => None,
            };
            let variants = self.expansion.then(|| PopulationVariants {
                uri: suffixed(uri),
                label: suffixed(label),
                visible: variant_visible,
            });

            entities.push(PopulationEntity {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: label.to_string(),
                comment: row.get("comment")?.to_string(),
                visible,
                costs,
                variants,
            });
            self.entity_registry(kind).register(uri, names::DOMAIN);
        }

        let mut locations = Vec::new();
        for row in self.packaged(kind.locations_table())? {
            let uri = row.get("URI")?;
            let location = row.get("metaLocatedAt")?;
            locations.push(Relation::new(uri, core::META_LOCATED_AT, location));
            if self.expansion {
                let triplet = suffixed(uri);
                locations.push(Relation::new(triplet.min, core::META_LOCATED_AT, location));
                locations.push(Relation::new(triplet.max, core::META_LOCATED_AT, location));
            }
        }

        Ok(EntityTable {
            kind,
            entities,
            locations,
        })
    }

    fn impact_sets(&mut self) -> ConvertResult<Vec<ImpactSet>> {
        let mut sets = Vec::new();
        for row in self.packaged("TWIS")? {
            let affected_by = row.get("affectedBy")?;
            let affects = row.get("affects")?;
            self.twa_misbehaviour
                .insert(affects.to_string(), affected_by.to_string());
            sets.push(ImpactSet {
                uri: row.get("URI")?.to_string(),
                affected_by: affected_by.to_string(),
                affects: affects.to_string(),
                variant: false,
            });

            if self.expansion {
                let misbehaviour = affected_by.strip_prefix(names::DOMAIN).unwrap_or(affected_by);
                let twa = affects.strip_prefix(names::DOMAIN).unwrap_or(affects);
                for (twa_suffix, misbehaviour_suffix) in [
                    (names::MIN_SUFFIX, names::MAX_SUFFIX),
                    (names::MAX_SUFFIX, names::MIN_SUFFIX),
                ] {
                    let twa = format!("{twa}{twa_suffix}");
                    let misbehaviour = format!("{misbehaviour}{misbehaviour_suffix}");
                    sets.push(ImpactSet {
                        uri: format!("{}{twa}-{misbehaviour}", names::TWIS),
                        affected_by: format!("{}{misbehaviour}", names::DOMAIN),
                        affects: format!("{}{twa}", names::DOMAIN),
                        variant: true,
                    });
                }
            }
        }
        Ok(sets)
    }

    fn inhibition_sets(&self) -> ConvertResult<Vec<InhibitionSet>> {
        self.packaged("MIS")?
            .into_iter()
            .map(|row| {
                Ok(InhibitionSet {
                    uri: row.get("URI")?.to_string(),
                    inhibited: row.get("inhibited")?.to_string(),
                    inhibited_by: row.get("inhibitedBy")?.to_string(),
                })
            })
            .collect()
    }

    fn collect_node(&mut self, row: &RowRef<'_>, uri: &str) -> ConvertResult<()> {
        let registries = &self.registries;
        self.nodes
            .insert_with(uri, |uri| registries.decode_node(uri))
            .map_err(|reason| row.malformed(reason))
    }

    fn collect_link(&mut self, row: &RowRef<'_>, uri: &str) -> ConvertResult<()> {
        let registries = &self.registries;
        self.links
            .insert_with(uri, |uri| registries.decode_link(uri))
            .map_err(|reason| row.malformed(reason))
    }

    fn root_patterns(&self) -> ConvertResult<Vec<RootPattern>> {
        self.packaged("RootPattern")?
            .into_iter()
            .map(|row| {
                Ok(RootPattern {
                    uri: row.get("URI")?.to_string(),
                    package: row.get("package")?.to_string(),
                    label: row.get("label")?.to_string(),
                })
            })
            .collect()
    }

    fn root_nodes(&mut self) -> ConvertResult<Vec<Relation>> {
        let mut nodes = Vec::new();
        for row in self.packaged("RootPatternNodes")? {
            let node = row.get("hasNode")?;
            let key_node = row.get("keyNode")?;
            let predicate = if key_node.eq_ignore_ascii_case("true") {
                core::HAS_KEY_NODE
            } else if key_node.eq_ignore_ascii_case("false") {
                core::HAS_ROOT_NODE
            } else {
                return Err(row.malformed(format!(
                    "root pattern {} has bad keyNode value '{key_node}'",
                    row.get("URI")?
                )));
            };
            nodes.push(Relation::new(row.get("URI")?, predicate, node));
            self.collect_node(&row, node)?;
        }
        Ok(nodes)
    }

    /// Pattern links, collecting the role links they reference. With a
    /// `prohibited_column`, rows flagged `true` use `hasProhibitedLink`.
    fn pattern_links(
        &mut self,
        table: &str,
        column: &str,
        prohibited_column: Option<&str>,
    ) -> ConvertResult<Vec<Relation>> {
        let default_predicate = if column == "hasInferredLink" {
            core::HAS_INFERRED_LINK
        } else {
            core::HAS_LINK
        };
        let mut links = Vec::new();
        for row in self.packaged(table)? {
            let link = row.get(column)?;
            let prohibited = match prohibited_column {
                Some(flag) => row.is_true(flag)?,
                None => false,
            };
            let predicate = if prohibited {
                core::HAS_PROHIBITED_LINK
            } else {
                default_predicate
            };
            links.push(Relation::new(row.get("URI")?, predicate, link));
            self.collect_link(&row, link)?;
        }
        Ok(links)
    }

    fn matching_patterns(&self) -> ConvertResult<Vec<MatchingPattern>> {
        self.packaged("MatchingPattern")?
            .into_iter()
            .map(|row| {
                Ok(MatchingPattern {
                    uri: row.get("URI")?.to_string(),
                    package: row.get("package")?.to_string(),
                    label: row.get("label")?.to_string(),
                    comment: row.get("comment")?.to_string(),
                    root_pattern: row.get("hasRootPattern")?.to_string(),
                })
            })
            .collect()
    }

    fn matching_nodes(&mut self) -> ConvertResult<Vec<Relation>> {
        let mut nodes = Vec::new();
        for row in self.packaged("MatchingPatternNodes")? {
            let node = row.get("hasNode")?;
            let predicate = if row.is_true("mandatoryNode")? {
                if row.is_true("sufficientNode")? {
                    core::HAS_SUFFICIENT_NODE
                } else {
                    core::HAS_NECESSARY_NODE
                }
            } else if row.is_true("prohibitedNode")? {
                core::HAS_PROHIBITED_NODE
            } else {
                core::HAS_OPTIONAL_NODE
            };
            nodes.push(Relation::new(row.get("URI")?, predicate, node));
            self.collect_node(&row, node)?;
        }
        Ok(nodes)
    }

    fn distinct_node_groups(&self) -> ConvertResult<Vec<Relation>> {
        let mut groups = Vec::new();
        for row in self.packaged("MatchingPatternDNG")? {
            let group = row.get("hasDistinctNodeGroup")?;
            groups.push(Relation::new(group, rdf::TYPE, "core#DistinctNodeGroup"));
            groups.push(Relation::new(row.get("URI")?, core::HAS_DISTINCT_NODE_GROUP, group));
        }
        Ok(groups)
    }

    /// Rank construction patterns from the predecessor and successor tables
    fn construction_sequence(&self) -> ConvertResult<ConstructionSequence> {
        let mut graph = ConstructionGraph::new();
        for row in self.packaged("ConstructionPattern")? {
            graph.add_pattern(row.get("URI")?);
        }

        for (table, column, successor_table) in [
            ("ConstructionPredecessor", "hasPredecessor", false),
            ("ConstructionSuccessor", "hasSuccessor", true),
        ] {
            for row in self.packaged(table)? {
                if row.is_true("fake")? {
                    continue;
                }
                let uri = row.get("URI")?;
                let other = row.get(column)?;
                let (before, after) = if successor_table {
                    (uri, other)
                } else {
                    (other, uri)
                };
                if !graph.add_precedence(before, after) {
                    return Err(row.malformed(format!(
                        "construction pattern {after} is not an enabled pattern in ConstructionPattern.csv"
                    )));
                }
            }
        }

        let sequence = graph.rank();
        sequence.log();
        Ok(sequence)
    }

    fn construction_patterns(&self) -> ConvertResult<Vec<ConstructionPattern>> {
        let table = self.tables.table("ConstructionPattern")?;
        let sequence = if self.features.has(feature::CONSTRUCTION_DEPENDENCIES) {
            Some(self.construction_sequence()?)
        } else {
            table.require("hasPriority")?;
            None
        };
        let use_marker = sequence.is_some() && table.has_column("marker");

        let mut patterns = Vec::new();
        for row in self.packaged("ConstructionPattern")? {
            let uri = row.get("URI")?;
            let priority = match &sequence {
                Some(sequence) => sequence.priority(uri).unwrap_or(0),
                None => row.get_int("hasPriority")?,
            };
            let iterate = row.get_bool("iterate")?;
            let max_iterations = row.get_int("maxIterations")?;
            if use_marker && row.is_true("marker")? {
                tracing::debug!(pattern = uri, priority, "marker pattern ranked but not emitted");
                continue;
            }
            patterns.push(ConstructionPattern {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
                matching_pattern: row.get("hasMatchingPattern")?.to_string(),
                priority,
                iterate,
                max_iterations,
            });
        }
        Ok(patterns)
    }

    fn inferred_node_settings(&mut self) -> ConvertResult<Vec<InferredNodeSetting>> {
        let mut settings = Vec::new();
        for row in self.packaged("InferredNodeSetting")? {
            let node = row.get("hasNode")?;
            let displayed_at = row.get("displayedAt")?.to_string();
            settings.push(InferredNodeSetting {
                pattern: row.get("inPattern")?.to_string(),
                node: node.to_string(),
                setting: row.get("hasSetting")?.to_string(),
                displayed_at: if row.is_true("displayedAtNode")? {
                    DisplayedAt::Node(displayed_at)
                } else {
                    DisplayedAt::Link(displayed_at)
                },
            });
            self.collect_node(&row, node)?;
        }
        Ok(settings)
    }

    fn threat_categories(&self) -> ConvertResult<Vec<Described>> {
        self.tables
            .table("ThreatCategory")?
            .rows()
            .map(|row| {
                Ok(Described {
                    uri: row.get("URI")?.to_string(),
                    label: row.get("label")?.to_string(),
                    comment: row.get("comment")?.to_string(),
                })
            })
            .collect()
    }

    fn described(&self, table: &str) -> ConvertResult<Vec<Described>> {
        self.packaged(table)?
            .into_iter()
            .map(|row| {
                Ok(Described {
                    uri: row.get("URI")?.to_string(),
                    label: row.get("label")?.to_string(),
                    comment: row.get("comment")?.to_string(),
                })
            })
            .collect()
    }

    fn risk_flags(&self, row: &RowRef<'_>) -> ConvertResult<Option<RiskFlags>> {
        if !self.features.has(feature::RISK_TYPE_FLAGS) {
            return Ok(None);
        }
        Ok(Some(RiskFlags {
            current: row.get_bool("currentRisk")?,
            future: row.get_bool("futureRisk")?,
        }))
    }

    fn threats(&self) -> ConvertResult<Vec<Threat>> {
        let type_flags = self.features.has(feature::THREAT_TYPE_FLAGS);
        if type_flags {
            let table = self.tables.table("Threat")?;
            table.require("secondaryThreat")?;
            table.require("normalOperation")?;
        }

        let mut threats = Vec::new();
        for row in self.packaged("Threat")? {
            let uri = row.get("URI")?;
            let risk = self.risk_flags(&row)?;
            let threat_type = if type_flags {
                Some(ThreatTypeFlags {
                    secondary: row.get_bool("secondaryThreat")?,
                    normal_op: row.get_bool("normalOperation")?,
                })
            } else {
                None
            };
            // The IRI shape is checked even when the variants are not written
            let triplet = threat_triplet(uri).map_err(|reason| row.malformed(reason))?;
            let triplet = self.expansion.then_some(triplet);

            let frequency = row.get_opt("hasFrequency").map(str::to_string);
            let has_frequency = frequency.is_some();
            threats.push(Threat {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
                category: row.get("hasCategory")?.to_string(),
                applies_to: row.get("appliesTo")?.to_string(),
                threatens: row.get("threatens")?.to_string(),
                frequency,
                risk: risk.filter(|_| has_frequency),
                threat_type: threat_type.filter(|_| has_frequency),
                triplet: triplet.filter(|_| has_frequency),
            });
        }
        Ok(threats)
    }

    /// Threat entry points. Each TWA set also implies the misbehaviour set
    /// of the misbehaviour that affects the TWA.
    fn entry_points(&mut self) -> ConvertResult<Vec<Relation>> {
        let mut links = Vec::new();
        for row in self.packaged("ThreatEntryPoints")? {
            let entry_point = row.get("hasEntryPoint")?;
            links.push(Relation::new(row.get("URI")?, core::HAS_ENTRY_POINT, entry_point));

            let twa_set = self
                .registries
                .decode_set(entry_point, names::TWA_SET, &self.registries.twas, "Trustworthiness Attribute")
                .map_err(|reason| row.malformed(reason))?;
            let misbehaviour = self.twa_misbehaviour.get(&twa_set.entity).ok_or_else(|| {
                row.malformed(format!(
                    "no TWIS row links trustworthiness attribute {} to a misbehaviour",
                    twa_set.entity
                ))
            })?;
            let twa_prefix = twa_set.entity.replacen(names::DOMAIN, names::TWA_SET, 1);
            let misbehaviour_prefix = misbehaviour.replacen(names::DOMAIN, names::MISBEHAVIOUR_SET, 1);
            let ms_uri = entry_point.replace(&twa_prefix, &misbehaviour_prefix);

            self.twa_sets
                .insert_with(entry_point, |_| Ok::<_, ConvertError>(twa_set))?;
            self.collect_misbehaviour_set(&row, &ms_uri)?;
        }
        Ok(links)
    }

    fn collect_misbehaviour_set(&mut self, row: &RowRef<'_>, uri: &str) -> ConvertResult<()> {
        let registries = &self.registries;
        self.misbehaviour_sets
            .insert_with(uri, |uri| {
                registries.decode_set(uri, names::MISBEHAVIOUR_SET, &registries.misbehaviours, "Misbehaviour")
            })
            .map_err(|reason| row.malformed(reason))
    }

    /// Threat relations whose object is a misbehaviour set
    fn misbehaviour_links(
        &mut self,
        table: &str,
        column: &str,
        predicate: &'static str,
    ) -> ConvertResult<Vec<Relation>> {
        let mut links = Vec::new();
        for row in self.packaged(table)? {
            let set = row.get(column)?;
            links.push(Relation::new(row.get("URI")?, predicate, set));
            self.collect_misbehaviour_set(&row, set)?;
        }
        Ok(links)
    }

    fn control_strategies(&self) -> ConvertResult<Vec<ControlStrategy>> {
        if self.features.has(feature::RISK_TYPE_FLAGS) {
            let table = self.tables.table("ControlStrategy")?;
            table.require("currentRisk")?;
            table.require("futureRisk")?;
        }

        let mut strategies = Vec::new();
        for row in self.packaged("ControlStrategy")? {
            let uri = row.get("URI")?;
            let triplet = control_strategy_triplet(uri).map_err(|reason| row.malformed(reason))?;
            let triplet = self.expansion.then_some(triplet);
            strategies.push(ControlStrategy {
                uri: uri.to_string(),
                package: row.get("package")?.to_string(),
                label: row.get("label")?.to_string(),
                comment: row.get("comment")?.to_string(),
                blocking_effect: row.get("hasBlockingEffect")?.to_string(),
                risk: self.risk_flags(&row)?,
                triplet,
            });
        }
        Ok(strategies)
    }

    fn control_strategy_controls(&mut self) -> ConvertResult<Vec<Relation>> {
        let mut links = Vec::new();
        for row in self.packaged("ControlStrategyControls")? {
            let set = row.get("hasControlSet")?;
            let predicate = if row.is_true("optional")? {
                core::HAS_OPTIONAL_CS
            } else {
                core::HAS_MANDATORY_CS
            };
            links.push(Relation::new(row.get("URI")?, predicate, set));

            let registries = &self.registries;
            self.control_sets
                .insert_with(set, |uri| {
                    registries.decode_set(uri, names::CONTROL_SET, &registries.controls, "Control")
                })
                .map_err(|reason| row.malformed(reason))?;
        }
        Ok(links)
    }

    fn settings(&self, kind: SettingKind) -> ConvertResult<SettingTable> {
        let mut settings = Vec::new();
        for row in self.packaged(kind.table())? {
            let uri = row.get("URI")?;
            let target = row.get(kind.target_column())?;
            let located_at = row.get("metaLocatedAt")?.to_string();
            let level = row.get("hasLevel")?.to_string();
            let assertable = match kind {
                SettingKind::CaSetting => Some(row.get_bool("isAssertable")?),
                _ => None,
            };
            let independent_levels = match kind {
                SettingKind::MaDefault => None,
                _ if self.expansion => Some(row.get_bool("independentLevels")?),
                _ => Some(false),
            };

            settings.push(Setting {
                uri: uri.to_string(),
                target: target.to_string(),
                located_at: located_at.clone(),
                assertable,
                level: level.clone(),
                independent_levels,
                variant: false,
            });

            if kind != SettingKind::CaSetting {
                continue;
            }
            let control = target.strip_prefix(names::DOMAIN).unwrap_or(target);
            let uris = suffixed_after(uri, control).map_err(|reason| row.malformed(reason))?;
            if self.expansion {
                let targets = suffixed(target);
                for (uri, target) in [(uris.min, targets.min), (uris.max, targets.max)] {
                    settings.push(Setting {
                        uri,
                        target,
                        located_at: located_at.clone(),
                        assertable,
                        level: level.clone(),
                        independent_levels,
                        variant: true,
                    });
                }
            }
        }
        Ok(SettingTable { kind, settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixture::Fixture;

    fn options() -> ConvertOptions {
        ConvertOptions {
            version: "2024-01-01T00:00:00".into(),
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_unexpanded_suffixes() {
        assert_eq!(unexpanded_suffixes(true, false), ("-unexpanded", "-UNEXPANDED"));
        assert_eq!(unexpanded_suffixes(true, true), ("", ""));
        assert_eq!(unexpanded_suffixes(false, false), ("", ""));
        assert_eq!(unexpanded_suffixes(false, true), ("", ""));
    }

    #[test]
    fn test_replace_last_segment() {
        assert_eq!(
            replace_last_segment("http://example.org/models/network", "cloud"),
            "http://example.org/models/cloud"
        );
        assert_eq!(replace_last_segment("ex:Model", "Other"), "Other");
    }

    #[test]
    fn test_suffixed() {
        let t = suffixed("domain#Patching");
        assert_eq!(t.min, "domain#Patching_Min");
        assert_eq!(t.max, "domain#Patching_Max");
        assert_eq!(suffixed("").min, "");

        let t = suffixed_after("domain#CAS-Patching-Host", "Patching").unwrap();
        assert_eq!(t.min, "domain#CAS-Patching_Min-Host");
        assert!(suffixed_after("domain#CAS-X", "Patching").is_err());

        // only the first occurrence gets the suffix
        let t = suffixed_after("domain#A-B-A-B", "A-B").unwrap();
        assert_eq!(t.max, "domain#A-B_Max-A-B");
    }

    #[test]
    fn test_threat_and_strategy_triplets() {
        let t = threat_triplet("domain#H.A.HDoS.1").unwrap();
        assert_eq!(t.min, "domain#H.A_Min.HDoS.1");
        assert_eq!(t.max, "domain#H.A_Max.HDoS.1");
        assert!(threat_triplet("domain#H.A.HDoS").is_err());

        let t = control_strategy_triplet("domain#CSG-Patching").unwrap();
        assert_eq!(t.min, "domain#CSG-Patching_Min");
        let t = control_strategy_triplet("domain#CSG-Patching-Host").unwrap();
        assert_eq!(t.max, "domain#CSG-Patching_Max-Host");
        assert!(control_strategy_triplet("domain#CSG").is_err());
    }

    #[test]
    fn test_header_overrides_and_suffix() {
        let fixture = Fixture::sample().feature("feature#PopulationModel");
        let tables = fixture.load();

        let header = ModelHeader::resolve(&tables, &options(), true).unwrap();
        assert_eq!(header.domain_graph, "http://example.org/models/network-unexpanded");
        assert_eq!(header.label, "Network-UNEXPANDED");
        assert_eq!(header.ontology, "http://example.org/models/network-ontology");

        let opts = ConvertOptions {
            unfiltered: true,
            name: Some("cloud".into()),
            label: Some("Cloud".into()),
            ..options()
        };
        let header = ModelHeader::resolve(&tables, &opts, true).unwrap();
        assert_eq!(header.domain_graph, "http://example.org/models/cloud-unexpanded");
        assert_eq!(header.label, "Cloud-UNEXPANDED");
        assert_eq!(header.version_info, "2024-01-01T00:00:00-unfiltered");

        let expanded = ConvertOptions {
            expanded: true,
            ..options()
        };
        let header = ModelHeader::resolve(&tables, &expanded, true).unwrap();
        assert_eq!(header.domain_graph, "http://example.org/models/network");
        assert_eq!(header.label, "Network");
    }

    #[test]
    fn test_package_filtering() {
        let tables = Fixture::sample().load();
        let model = build(&tables, &options()).unwrap();

        let assets: Vec<_> = model.assets.iter().map(|a| a.uri.as_str()).collect();
        assert_eq!(assets, vec!["domain#Host", "domain#Network"]);
        assert_eq!(model.packages.len(), 2);
        assert!(model.optional_packages);
        assert!(!model.packages[1].enabled);
    }

    #[test]
    fn test_unfiltered_visibility_and_construction_state() {
        let tables = Fixture::sample().load();

        let model = build(&tables, &options()).unwrap();
        let misbehaviour = &model.entities[1].entities[0];
        assert!(!misbehaviour.visible);
        assert!(model.assets[1].flags.construction_state);

        let unfiltered = ConvertOptions {
            unfiltered: true,
            ..options()
        };
        let model = build(&tables, &unfiltered).unwrap();
        assert!(model.entities.iter().all(|t| t.entities.iter().all(|e| e.visible)));
        assert!(model.assets.iter().all(|a| !a.flags.construction_state));
    }

    #[test]
    fn test_unfiltered_population_variants_are_visible() {
        let tables = Fixture::sample().feature("feature#PopulationModel").load();
        let expanded = ConvertOptions {
            expanded: true,
            ..options()
        };

        let model = build(&tables, &expanded).unwrap();
        let variants = || {
            model
                .entities
                .iter()
                .flat_map(|t| t.entities.iter())
                .filter_map(|e| e.variants.as_ref())
        };
        assert_eq!(variants().count(), 3);
        assert!(variants().all(|v| !v.visible));

        let unfiltered = ConvertOptions {
            unfiltered: true,
            ..expanded
        };
        let model = build(&tables, &unfiltered).unwrap();
        let entities: Vec<_> = model.entities.iter().flat_map(|t| t.entities.iter()).collect();
        assert_eq!(entities.len(), 3);
        for entity in entities {
            assert!(entity.visible, "{} should be visible", entity.uri);
            assert!(entity.variants.as_ref().unwrap().visible, "{} variants", entity.uri);
        }
    }

    #[test]
    fn test_population_expansion() {
        let fixture = Fixture::sample().feature("feature#PopulationModel");
        let tables = fixture.load();

        let model = build(&tables, &options()).unwrap();
        assert!(!model.expansion);
        assert!(model.entities[0].entities[0].variants.is_none());
        assert!(!model.published_features.iter().any(|f| f.ends_with("PopulationModel")));

        let expanded = ConvertOptions {
            expanded: true,
            ..options()
        };
        let model = build(&tables, &expanded).unwrap();
        assert!(model.expansion);
        assert!(model
            .published_features
            .contains(&"domain#Feature-PopulationModel".to_string()));

        let control = &model.entities[0].entities[0];
        let variants = control.variants.as_ref().unwrap();
        assert_eq!(variants.uri.min, "domain#Patching_Min");
        assert_eq!(variants.label.max, "Patching_Max");
        assert_eq!(model.entities[0].locations.len(), 3);

        let twis: Vec<_> = model.impact_sets.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(
            twis,
            vec![
                "domain#TWIS-Availability-LossOfAvailability",
                "domain#TWIS-Availability_Min-LossOfAvailability_Max",
                "domain#TWIS-Availability_Max-LossOfAvailability_Min",
            ]
        );

        let ca = &model.settings[0].settings;
        assert_eq!(ca.len(), 3);
        assert_eq!(ca[1].uri, "domain#CAS-Patching_Min-Host");
        assert_eq!(ca[2].target, "domain#Patching_Max");
        assert_eq!(ca[0].independent_levels, Some(true));

        let threat = &model.threats[0];
        assert_eq!(
            threat.triplet.as_ref().unwrap().min,
            "domain#H.A_Min.HDoS.1"
        );
        assert!(model.control_strategies[0].triplet.is_some());
    }

    #[test]
    fn test_derived_resources() {
        let tables = Fixture::sample().load();
        let model = build(&tables, &options()).unwrap();

        let nodes: Vec<_> = model.nodes.iter().map(|n| n.uri.as_str()).collect();
        assert_eq!(nodes, vec!["domain#Node-Host-Host", "domain#Node-Net-Network"]);
        assert_eq!(model.role_links.len(), 1);
        assert_eq!(model.role_links[0].link_type, "domain#connectedTo");

        let control_sets = &model.sets[0].sets;
        assert_eq!(control_sets[0].uri, "domain#CS-Patching-Host");
        let ms: Vec<_> = model.sets[1].sets.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(ms, vec!["domain#MS-LossOfAvailability-Host"]);
        assert_eq!(model.sets[2].sets[0].entity, "domain#Availability");
    }

    #[test]
    fn test_iri_shapes_are_checked_without_expansion() {
        let cases = [
            ("Threat", "domain#BadThreat", "3 full stops"),
            ("ControlStrategy", "domain#Patching", "at least one hyphen"),
            ("CASetting", "domain#CAS-Firewall-Host", "'Patching' cannot be found"),
        ];
        for (table, uri, expected) in cases {
            let tables = Fixture::sample().replace(table, "URI", uri).load();
            let err = build(&tables, &options()).unwrap_err();
            match err {
                ConvertError::MalformedRow { file, line, reason } => {
                    assert_eq!(file, format!("{table}.csv"));
                    assert_eq!(line, 2);
                    assert!(reason.contains(expected), "{table}: {reason}");
                }
                other => panic!("unexpected error for {table}: {other}"),
            }
        }
    }

    #[test]
    fn test_bad_node_is_malformed_row() {
        let tables = Fixture::sample()
            .row(
                "RootPatternNodes",
                &[
                    ("URI", "domain#RP-Host"),
                    ("package", "package#Core"),
                    ("hasNode", "domain#Node-Cloud-Host"),
                    ("keyNode", "false"),
                ],
            )
            .load();
        let err = build(&tables, &options()).unwrap_err();
        match err {
            ConvertError::MalformedRow { file, line, reason } => {
                assert_eq!(file, "RootPatternNodes.csv");
                assert_eq!(line, 3);
                assert!(reason.contains("valid role"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_construction_dependencies() {
        let tables = Fixture::sample()
            .feature("feature#ConstructionDependencies")
            .row(
                "ConstructionPattern",
                &[
                    ("URI", "domain#CP-Second"),
                    ("package", "package#Core"),
                    ("label", "Second"),
                    ("hasMatchingPattern", "domain#MP-Host"),
                    ("iterate", "false"),
                    ("maxIterations", "1"),
                ],
            )
            .row(
                "ConstructionPattern",
                &[
                    ("URI", "domain#CP-Marker"),
                    ("package", "package#Core"),
                    ("label", "Marker"),
                    ("hasMatchingPattern", "domain#MP-Host"),
                    ("iterate", "false"),
                    ("maxIterations", "1"),
                    ("marker", "TRUE"),
                ],
            )
            .row(
                "ConstructionPredecessor",
                &[
                    ("URI", "domain#CP-Second"),
                    ("package", "package#Core"),
                    ("hasPredecessor", "domain#CP-Marker"),
                    ("fake", "false"),
                ],
            )
            .row(
                "ConstructionSuccessor",
                &[
                    ("URI", "domain#CP-Host"),
                    ("package", "package#Core"),
                    ("hasSuccessor", "domain#CP-Marker"),
                    ("fake", "false"),
                ],
            )
            .row(
                "ConstructionSuccessor",
                &[
                    ("URI", "domain#CP-Second"),
                    ("package", "package#Core"),
                    ("hasSuccessor", "domain#CP-Host"),
                    ("fake", "true"),
                ],
            )
            .load();

        let model = build(&tables, &options()).unwrap();
        let priorities: Vec<_> = model
            .construction_patterns
            .iter()
            .map(|p| (p.uri.as_str(), p.priority))
            .collect();
        assert_eq!(priorities, vec![("domain#CP-Host", 1), ("domain#CP-Second", 3)]);
    }

    #[test]
    fn test_construction_dependencies_need_tables() {
        let tables = Fixture::sample()
            .feature("feature#ConstructionDependencies")
            .without("ConstructionPredecessor")
            .load();
        let err = build(&tables, &options()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingTable { ref file, .. } if file == "ConstructionPredecessor.csv"));
    }

    #[test]
    fn test_unknown_successor_is_malformed() {
        let tables = Fixture::sample()
            .feature("feature#ConstructionDependencies")
            .row(
                "ConstructionSuccessor",
                &[
                    ("URI", "domain#CP-Host"),
                    ("package", "package#Core"),
                    ("hasSuccessor", "domain#CP-Missing"),
                    ("fake", "false"),
                ],
            )
            .load();
        let err = build(&tables, &options()).unwrap_err();
        assert!(err.to_string().contains("domain#CP-Missing"));
    }

    #[test]
    fn test_bad_boolean_is_malformed() {
        let tables = Fixture::sample()
            .row(
                "DomainAsset",
                &[
                    ("URI", "domain#Data"),
                    ("package", "package#Core"),
                    ("label", "Data"),
                    ("isAssertable", "yes"),
                    ("isVisible", "true"),
                    ("constructionState", "false"),
                ],
            )
            .load();
        let err = build(&tables, &options()).unwrap_err();
        assert!(err.to_string().contains("DomainAsset.csv, line 5"));
    }
}
