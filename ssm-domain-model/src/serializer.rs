//! Domain model serializer
//!
//! Walks a built [`DomainModel`] and emits quads to a [`QuadSink`] in a
//! fixed section order. Each section opens with a heading comment framed by
//! empty comments; multi-quad resources are followed by an empty comment.
//!
//! Subjects and objects are SSM local names and are expanded against
//! [`ssm::BASE`](ssm_vocab::ssm::BASE). An empty local name has no IRI, so
//! the quad is dropped and logged at debug level.

use crate::features::package_resource;
use crate::model::*;
use ssm_graph_ir::{Quad, QuadSink, Term};
use ssm_vocab::ssm::{self, core};
use ssm_vocab::{owl, rdf, rdfs};
use std::io;

/// Object position of a quad
enum Object<'a> {
    /// SSM local name, expanded on output
    Local(&'a str),
    /// Absolute IRI
    Iri(&'a str),
    Literal(Term),
}

fn string(value: &str) -> Object<'static> {
    Object::Literal(Term::string(value))
}

fn boolean(value: bool) -> Object<'static> {
    Object::Literal(Term::boolean(value))
}

fn integer(value: i64) -> Object<'static> {
    Object::Literal(Term::integer(value))
}

/// True when `records[idx]` is the last record of its group, i.e. the next
/// record is not one of its variants
fn ends_group<T>(records: &[T], idx: usize, is_variant: impl Fn(&T) -> bool) -> bool {
    records.get(idx + 1).map_or(true, |next| !is_variant(next))
}

/// Write `model` to `sink`
pub fn serialize<S: QuadSink>(model: &DomainModel, sink: S) -> io::Result<()> {
    let mut serializer = Serializer {
        sink,
        graph: Term::iri(&model.header.domain_graph),
        skipped: 0,
    };
    serializer.header(model)?;
    serializer.scales(model)?;
    serializer.assets(model)?;
    serializer.relationships(model)?;
    serializer.roles(model)?;
    serializer.entities(model)?;
    serializer.impact_sets(model)?;
    serializer.root_patterns(model)?;
    serializer.matching_patterns(model)?;
    serializer.construction_patterns(model)?;
    serializer.threat_categories(model)?;
    serializer.compliance_sets(model)?;
    serializer.threats(model)?;
    serializer.control_strategies(model)?;
    serializer.settings(model)?;
    serializer.derived(model)?;

    if serializer.skipped > 0 {
        tracing::debug!(skipped = serializer.skipped, "quads with empty IRIs skipped");
    }
    Ok(())
}

struct Serializer<S> {
    sink: S,
    graph: Term,
    skipped: usize,
}

impl<S: QuadSink> Serializer<S> {
    fn heading(&mut self, text: &str) -> io::Result<()> {
        self.sink.on_comment("")?;
        self.sink.on_comment(text)?;
        self.sink.on_comment("")
    }

    fn spacer(&mut self) -> io::Result<()> {
        self.sink.on_comment("")
    }

    fn skip(&mut self, subject: &str, predicate: &str, object: &str) -> io::Result<()> {
        tracing::debug!(subject, predicate, object, "skipping quad with an empty IRI");
        self.skipped += 1;
        Ok(())
    }

    /// Emit a quad whose subject is an SSM local name
    fn quad(&mut self, subject: &str, predicate: &str, object: Object<'_>) -> io::Result<()> {
        match ssm::expand(subject) {
            Some(iri) => self.emit(Term::iri(iri), predicate, object),
            None => self.skip(subject, predicate, ""),
        }
    }

    fn emit(&mut self, subject: Term, predicate: &str, object: Object<'_>) -> io::Result<()> {
        let object = match object {
            Object::Local(local) => match ssm::expand(local) {
                Some(iri) => Term::iri(iri),
                None => {
                    let subject = subject.to_string();
                    return self.skip(&subject, predicate, local);
                }
            },
            Object::Iri(iri) => Term::iri(iri),
            Object::Literal(term) => term,
        };
        self.sink.emit_quad(Quad::new(
            subject,
            Term::iri(predicate),
            object,
            self.graph.clone(),
        ))
    }

    fn relations(&mut self, relations: &[Relation]) -> io::Result<()> {
        for relation in relations {
            self.quad(
                &relation.subject,
                relation.predicate,
                Object::Local(&relation.object),
            )?;
        }
        self.spacer()
    }

    fn labelled(&mut self, uri: &str, label: &str, comment: &str) -> io::Result<()> {
        self.quad(uri, rdfs::LABEL, string(label))?;
        self.quad(uri, rdfs::COMMENT, string(comment))
    }

    fn in_package(&mut self, uri: &str, package: &str) -> io::Result<()> {
        self.quad(uri, core::IN_PACKAGE, Object::Local(&package_resource(package)))
    }

    fn triplet_links(&mut self, uri: &str, triplet: &Triplet) -> io::Result<()> {
        self.quad(uri, core::HAS_MIN, Object::Local(&triplet.min))?;
        self.quad(uri, core::HAS_MAX, Object::Local(&triplet.max))
    }

    fn header(&mut self, model: &DomainModel) -> io::Result<()> {
        let header = &model.header;
        self.heading("Domain model namespace, graph and reasoning class")?;

        let ontology = Term::iri(&header.ontology);
        self.emit(ontology.clone(), owl::IMPORTS, Object::Iri(ssm::CORE_ONTOLOGY))?;
        self.emit(ontology.clone(), rdf::TYPE, Object::Iri(owl::ONTOLOGY))?;
        self.emit(ontology.clone(), core::DOMAIN_GRAPH, Object::Iri(&header.domain_graph))?;
        self.emit(ontology.clone(), owl::VERSION_INFO, string(&header.version_info))?;
        self.emit(ontology.clone(), core::REASONER_CLASS, string(&header.reasoner_class))?;
        self.emit(ontology.clone(), rdfs::LABEL, string(&header.label))?;
        self.emit(ontology, rdfs::COMMENT, string(&header.comment))?;
        self.spacer()?;

        for feature in &model.published_features {
            self.quad(feature, rdf::TYPE, Object::Iri(core::MODEL_FEATURE))?;
        }
        self.spacer()?;

        for package in &model.packages {
            let uri = package_resource(&package.uri);
            self.quad(&uri, rdf::TYPE, Object::Iri(core::MODEL_PACKAGE))?;
            self.labelled(&uri, &package.label, &package.comment)?;
            if model.optional_packages {
                self.quad(&uri, core::ENABLED, boolean(package.enabled))?;
            }
        }
        self.spacer()
    }

    fn scales(&mut self, model: &DomainModel) -> io::Result<()> {
        for scale in &model.scales {
            self.heading(scale.kind.heading())?;
            for level in &scale.levels {
                self.quad(&level.uri, rdf::TYPE, Object::Iri(scale.kind.class_iri()))?;
                self.labelled(&level.uri, &level.label, &level.comment)?;
                self.quad(&level.uri, core::LEVEL_VALUE, integer(level.value))?;
                self.spacer()?;
            }
            self.spacer()?;
        }
        Ok(())
    }

    fn element(&mut self, element: &ModelElement, class: &str) -> io::Result<()> {
        let uri = element.uri.as_str();
        self.quad(uri, rdf::TYPE, Object::Iri(class))?;
        self.in_package(uri, &element.package)?;
        self.labelled(uri, &element.label, &element.comment)?;
        self.quad(uri, core::IS_ASSERTABLE, boolean(element.flags.assertable))?;
        self.quad(uri, core::IS_VISIBLE, boolean(element.flags.visible))?;
        if let Some(hidden) = element.flags.hidden {
            self.quad(uri, core::HIDDEN, boolean(hidden))?;
        }
        if element.flags.construction_state {
            self.quad(uri, core::IS_CONSTRUCTION_STATE, boolean(true))?;
        }
        self.spacer()
    }

    fn assets(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Domain asset definitions")?;
        for asset in &model.assets {
            self.element(asset, owl::CLASS)?;
        }
        self.spacer()?;
        self.relations(&model.asset_parents)
    }

    fn relationships(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Asset relationship definitions")?;
        for relationship in &model.relationships {
            self.element(relationship, owl::OBJECT_PROPERTY)?;
        }
        self.spacer()?;
        for links in &model.relationship_links {
            self.relations(links)?;
        }
        Ok(())
    }

    fn roles(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Role definitions")?;
        for role in &model.roles {
            self.quad(&role.uri, rdf::TYPE, Object::Iri(core::ROLE))?;
            self.in_package(&role.uri, &role.package)?;
            self.labelled(&role.uri, &role.label, &role.comment)?;
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.role_locations)
    }

    /// The fields every member of a population triplet shares
    fn entity_body(
        &mut self,
        uri: &str,
        label: &str,
        comment: &str,
        visible: bool,
        costs: Option<&ControlCosts>,
    ) -> io::Result<()> {
        self.quad(uri, rdfs::COMMENT, string(comment))?;
        self.quad(uri, rdfs::LABEL, string(label))?;
        self.quad(uri, core::IS_VISIBLE, boolean(visible))?;
        if let Some(costs) = costs {
            self.quad(uri, core::UNIT_COST, Object::Local(&costs.unit_cost))?;
            self.quad(uri, core::PERFORMANCE_IMPACT, Object::Local(&costs.performance_impact))?;
        }
        Ok(())
    }

    fn entities(&mut self, model: &DomainModel) -> io::Result<()> {
        for table in &model.entities {
            let kind = table.kind;
            self.heading(kind.heading())?;
            for entity in &table.entities {
                let uri = entity.uri.as_str();
                let costs = entity.costs.as_ref();
                self.quad(uri, rdf::TYPE, Object::Iri(kind.class_iri()))?;
                self.in_package(uri, &entity.package)?;
                self.entity_body(uri, &entity.label, &entity.comment, entity.visible, costs)?;

                if let Some(variants) = &entity.variants {
                    for (variant, label) in [
                        (&variants.uri.min, &variants.label.min),
                        (&variants.uri.max, &variants.label.max),
                    ] {
                        self.quad(variant, rdf::TYPE, Object::Iri(kind.class_iri()))?;
                        self.entity_body(variant, label, &entity.comment, variants.visible, costs)?;
                    }
                    self.triplet_links(uri, &variants.uri)?;
                    self.quad(&variants.uri.min, core::MIN_OF, Object::Local(uri))?;
                    self.quad(&variants.uri.max, core::MAX_OF, Object::Local(uri))?;
                }
                self.spacer()?;
            }
            self.spacer()?;
            self.relations(&table.locations)?;
        }
        Ok(())
    }

    fn impact_sets(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading(
            "Trustworthiness Impact Set definitions (relationship between Misbehaviours and TWAs)",
        )?;
        for (idx, set) in model.impact_sets.iter().enumerate() {
            self.quad(&set.uri, rdf::TYPE, Object::Iri(core::TRUSTWORTHINESS_IMPACT_SET))?;
            // min/max variants name the attribute first
            if set.variant {
                self.quad(&set.uri, core::AFFECTS, Object::Local(&set.affects))?;
                self.quad(&set.uri, core::AFFECTED_BY, Object::Local(&set.affected_by))?;
            } else {
                self.quad(&set.uri, core::AFFECTED_BY, Object::Local(&set.affected_by))?;
                self.quad(&set.uri, core::AFFECTS, Object::Local(&set.affects))?;
            }
            if ends_group(&model.impact_sets, idx, |set| set.variant) {
                self.spacer()?;
            }
        }
        self.spacer()?;

        self.heading("Misbehaviour Inhibition Sets (relationship between Misbehaviours and Controls)")?;
        for set in &model.inhibition_sets {
            self.quad(&set.uri, rdf::TYPE, Object::Iri(core::MISBEHAVIOUR_INHIBITION_SET))?;
            self.quad(&set.uri, core::INHIBITED, Object::Local(&set.inhibited))?;
            self.quad(&set.uri, core::INHIBITED_BY, Object::Local(&set.inhibited_by))?;
        }
        self.spacer()
    }

    fn root_patterns(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Root pattern definitions")?;
        for pattern in &model.root_patterns {
            self.quad(&pattern.uri, rdf::TYPE, Object::Iri(core::ROOT_PATTERN))?;
            self.in_package(&pattern.uri, &pattern.package)?;
            self.quad(&pattern.uri, rdfs::LABEL, string(&pattern.label))?;
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.root_nodes)?;
        self.relations(&model.root_links)
    }

    fn matching_patterns(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Matching pattern definitions")?;
        for pattern in &model.matching_patterns {
            self.quad(&pattern.uri, rdf::TYPE, Object::Iri(core::MATCHING_PATTERN))?;
            self.in_package(&pattern.uri, &pattern.package)?;
            self.labelled(&pattern.uri, &pattern.label, &pattern.comment)?;
            self.quad(&pattern.uri, core::HAS_ROOT_PATTERN, Object::Local(&pattern.root_pattern))?;
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.matching_nodes)?;
        self.relations(&model.matching_links)?;
        self.relations(&model.distinct_node_groups)?;
        self.relations(&model.distinct_node_group_nodes)
    }

    fn construction_patterns(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Construction pattern definitions")?;
        for pattern in &model.construction_patterns {
            let uri = pattern.uri.as_str();
            self.quad(uri, rdf::TYPE, Object::Iri(core::CONSTRUCTION_PATTERN))?;
            self.in_package(uri, &pattern.package)?;
            self.labelled(uri, &pattern.label, &pattern.comment)?;
            self.quad(uri, core::HAS_MATCHING_PATTERN, Object::Local(&pattern.matching_pattern))?;
            self.quad(uri, core::HAS_PRIORITY, integer(pattern.priority))?;
            self.quad(uri, core::ITERATE, boolean(pattern.iterate))?;
            self.quad(uri, core::MAX_ITERATIONS, integer(pattern.max_iterations))?;
            self.spacer()?;
        }
        self.spacer()?;

        for setting in &model.inferred_node_settings {
            let uri = setting.setting.as_str();
            self.quad(&setting.pattern, core::HAS_INFERRED_NODE, Object::Local(&setting.node))?;
            self.quad(&setting.pattern, core::HAS_INFERRED_NODE_SETTING, Object::Local(uri))?;
            self.quad(uri, rdf::TYPE, Object::Iri(core::INFERRED_NODE_SETTING))?;
            self.quad(uri, core::HAS_NODE, Object::Local(&setting.node))?;
            match &setting.displayed_at {
                DisplayedAt::Node(node) => {
                    self.quad(uri, core::DISPLAYED_AT_NODE, Object::Local(node))?
                }
                DisplayedAt::Link(link) => {
                    self.quad(uri, core::DISPLAYED_AT_LINK, Object::Local(link))?
                }
            }
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.inferred_node_includes)?;
        self.relations(&model.inferred_links)
    }

    fn threat_categories(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Threat category definitions")?;
        for category in &model.threat_categories {
            self.quad(&category.uri, rdf::TYPE, Object::Iri(core::THREAT_CATEGORY))?;
            self.labelled(&category.uri, &category.label, &category.comment)?;
            self.spacer()?;
        }
        self.spacer()
    }

    fn compliance_sets(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Compliance Set definitions")?;
        for set in &model.compliance_sets {
            self.quad(&set.uri, rdf::TYPE, Object::Iri(core::COMPLIANCE_SET))?;
            self.labelled(&set.uri, &set.label, &set.comment)?;
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.compliance_threats)
    }

    fn risk_flags(&mut self, uri: &str, risk: Option<RiskFlags>) -> io::Result<()> {
        if let Some(risk) = risk {
            self.quad(uri, core::IS_CURRENT_RISK, boolean(risk.current))?;
            self.quad(uri, core::IS_FUTURE_RISK, boolean(risk.future))?;
        }
        Ok(())
    }

    fn threats(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Threat definitions")?;
        for threat in &model.threats {
            let uri = threat.uri.as_str();
            self.quad(uri, rdf::TYPE, Object::Iri(core::THREAT))?;
            self.in_package(uri, &threat.package)?;
            self.labelled(uri, &threat.label, &threat.comment)?;
            self.quad(uri, core::HAS_CATEGORY, Object::Local(&threat.category))?;
            self.quad(uri, core::APPLIES_TO, Object::Local(&threat.applies_to))?;
            self.quad(uri, core::THREATENS, Object::Local(&threat.threatens))?;
            if let Some(frequency) = &threat.frequency {
                self.quad(uri, core::HAS_FREQUENCY, Object::Local(frequency))?;
                self.risk_flags(uri, threat.risk)?;
                if let Some(flags) = threat.threat_type {
                    self.quad(uri, core::IS_SECONDARY_THREAT, boolean(flags.secondary))?;
                    self.quad(uri, core::IS_NORMAL_OP, boolean(flags.normal_op))?;
                }
                if let Some(triplet) = &threat.triplet {
                    self.triplet_links(uri, triplet)?;
                }
            }
            self.spacer()?;
        }
        self.spacer()?;
        for links in &model.threat_links {
            self.relations(links)?;
        }
        Ok(())
    }

    fn control_strategies(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Control Strategy definitions")?;
        for strategy in &model.control_strategies {
            let uri = strategy.uri.as_str();
            self.quad(uri, rdf::TYPE, Object::Iri(core::CONTROL_STRATEGY))?;
            self.in_package(uri, &strategy.package)?;
            self.quad(uri, rdfs::COMMENT, string(&strategy.comment))?;
            self.quad(uri, rdfs::LABEL, string(&strategy.label))?;
            self.quad(uri, core::HAS_BLOCKING_EFFECT, Object::Local(&strategy.blocking_effect))?;
            self.risk_flags(uri, strategy.risk)?;
            if let Some(triplet) = &strategy.triplet {
                self.triplet_links(uri, triplet)?;
            }
            self.spacer()?;
        }
        self.spacer()?;
        self.relations(&model.control_strategy_controls)
    }

    fn settings(&mut self, model: &DomainModel) -> io::Result<()> {
        for table in &model.settings {
            let kind = table.kind;
            self.heading(kind.heading())?;
            for (idx, setting) in table.settings.iter().enumerate() {
                let uri = setting.uri.as_str();
                self.quad(uri, rdf::TYPE, Object::Iri(kind.class_iri()))?;
                // control settings name their control first
                if kind == SettingKind::CaSetting {
                    self.quad(uri, kind.target_iri(), Object::Local(&setting.target))?;
                    self.quad(uri, core::META_LOCATED_AT, Object::Local(&setting.located_at))?;
                } else {
                    self.quad(uri, core::META_LOCATED_AT, Object::Local(&setting.located_at))?;
                    self.quad(uri, kind.target_iri(), Object::Local(&setting.target))?;
                }
                if let Some(assertable) = setting.assertable {
                    self.quad(uri, core::IS_ASSERTABLE, boolean(assertable))?;
                }
                self.quad(uri, core::HAS_LEVEL, Object::Local(&setting.level))?;
                if let Some(independent) = setting.independent_levels {
                    self.quad(uri, core::INDEPENDENT_LEVELS, boolean(independent))?;
                }
                if ends_group(&table.settings, idx, |setting| setting.variant) {
                    self.spacer()?;
                }
            }
            self.spacer()?;
        }
        Ok(())
    }

    /// Nodes, role links and entity sets collected while building
    fn derived(&mut self, model: &DomainModel) -> io::Result<()> {
        self.heading("Node definitions")?;
        for node in &model.nodes {
            self.quad(&node.uri, rdf::TYPE, Object::Iri(core::NODE))?;
            self.quad(&node.uri, core::META_HAS_ASSET, Object::Local(&node.asset))?;
            self.quad(&node.uri, core::HAS_ROLE, Object::Local(&node.role))?;
            self.spacer()?;
        }
        self.spacer()?;

        self.heading("Role Link definitions")?;
        for link in &model.role_links {
            self.quad(&link.uri, rdf::TYPE, Object::Iri(core::ROLE_LINK))?;
            self.quad(&link.uri, core::LINK_TYPE, Object::Local(&link.link_type))?;
            self.quad(&link.uri, core::LINKS_FROM, Object::Local(&link.from))?;
            self.quad(&link.uri, core::LINKS_TO, Object::Local(&link.to))?;
            self.spacer()?;
        }
        self.spacer()?;

        for table in &model.sets {
            let kind = table.kind;
            self.heading(kind.set_heading())?;
            for set in &table.sets {
                self.quad(&set.uri, rdf::TYPE, Object::Iri(kind.set_class_iri()))?;
                self.quad(&set.uri, kind.set_member_iri(), Object::Local(&set.entity))?;
                self.quad(&set.uri, core::LOCATED_AT, Object::Local(&set.located_at))?;
                self.spacer()?;
            }
            self.spacer()?;
        }
        Ok(())
    }
}
