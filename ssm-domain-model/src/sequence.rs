//! Construction pattern sequencing
//!
//! When a domain model declares construction dependencies, patterns carry
//! no explicit priority. Instead each pattern lists the patterns that must
//! run before it, and priorities are assigned in rounds: every pattern whose
//! predecessors have all been ranked in earlier rounds gets the current
//! round number.

use std::collections::{BTreeMap, HashMap};

/// Precedence constraints between construction patterns
#[derive(Debug, Clone, Default)]
pub struct ConstructionGraph {
    order: Vec<String>,
    predecessors: HashMap<String, Vec<String>>,
}

impl ConstructionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern; registration order is the ranking order
    pub fn add_pattern(&mut self, uri: &str) {
        if !self.predecessors.contains_key(uri) {
            self.order.push(uri.to_string());
            self.predecessors.insert(uri.to_string(), Vec::new());
        }
    }

    /// Record that `before` must precede `after`. Duplicates collapse.
    ///
    /// Returns `false` when `after` is not a registered pattern.
    pub fn add_precedence(&mut self, before: &str, after: &str) -> bool {
        let Some(list) = self.predecessors.get_mut(after) else {
            return false;
        };
        if !list.iter().any(|known| known == before) {
            list.push(before.to_string());
        }
        true
    }

    /// Assign priorities in rounds, starting at 1
    ///
    /// Predecessors that are not registered patterns can never be ranked;
    /// they are dropped with a warning so they do not stall their
    /// successors. Patterns left in a cycle keep priority 0.
    pub fn rank(&self) -> ConstructionSequence {
        let mut remaining = self.predecessors.clone();
        for (uri, list) in remaining.iter_mut() {
            list.retain(|before| {
                let known = self.predecessors.contains_key(before);
                if !known {
                    tracing::warn!(
                        pattern = %uri,
                        predecessor = %before,
                        "ignoring predecessor that is not an enabled construction pattern"
                    );
                }
                known
            });
        }

        let mut priorities: HashMap<String, i64> =
            self.order.iter().map(|uri| (uri.clone(), 0)).collect();
        let mut round = 1;
        loop {
            let ready: Vec<&String> = self
                .order
                .iter()
                .filter(|uri| {
                    priorities.get(uri.as_str()) == Some(&0)
                        && remaining.get(uri.as_str()).is_some_and(Vec::is_empty)
                })
                .collect();
            if ready.is_empty() {
                break;
            }
            for uri in &ready {
                priorities.insert((*uri).clone(), round);
            }
            for list in remaining.values_mut() {
                list.retain(|before| !ready.contains(&before));
            }
            round += 1;
        }

        let unranked: Vec<String> = self
            .order
            .iter()
            .filter(|uri| priorities.get(uri.as_str()) == Some(&0))
            .cloned()
            .collect();
        if !unranked.is_empty() {
            tracing::warn!(
                patterns = %unranked.join(", "),
                "construction patterns in a predecessor cycle keep priority 0"
            );
        }

        ConstructionSequence {
            priorities,
            predecessors: self.predecessors.clone(),
            unranked,
        }
    }
}

/// Ranked construction patterns
#[derive(Debug, Clone)]
pub struct ConstructionSequence {
    priorities: HashMap<String, i64>,
    predecessors: HashMap<String, Vec<String>>,
    unranked: Vec<String>,
}

impl ConstructionSequence {
    pub fn priority(&self, uri: &str) -> Option<i64> {
        self.priorities.get(uri).copied()
    }

    /// Patterns that could not be ranked
    pub fn unranked(&self) -> &[String] {
        &self.unranked
    }

    /// Write the sequence at debug level, sorted by pattern IRI
    pub fn log(&self) {
        let sorted: BTreeMap<&str, i64> = self
            .priorities
            .iter()
            .map(|(uri, priority)| (uri.as_str(), *priority))
            .collect();
        tracing::debug!(patterns = sorted.len(), "construction sequence");
        for (uri, priority) in sorted {
            match self.predecessors.get(uri).filter(|list| !list.is_empty()) {
                Some(list) => tracing::debug!(
                    pattern = uri,
                    priority,
                    predecessors = %list.join(", "),
                    "construction pattern ranked"
                ),
                None => tracing::debug!(pattern = uri, priority, "construction pattern ranked, no predecessors"),
            }
        }
    }
}
