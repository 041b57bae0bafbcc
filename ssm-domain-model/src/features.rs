//! Domain model features and packages

use crate::error::ConvertResult;
use crate::tables::TableSet;
use ssm_vocab::ssm::{feature, names};
use std::collections::HashSet;

/// Features a domain model declares as supported, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    supported: Vec<String>,
}

impl FeatureSet {
    /// Read `DomainFeature.csv`, if present
    ///
    /// Features whose `supported` cell is not `true` are logged and dropped.
    pub fn load(tables: &TableSet) -> ConvertResult<Self> {
        let Some(table) = tables.optional("DomainFeature") else {
            return Ok(Self::default());
        };

        let mut supported = Vec::new();
        for row in table.rows() {
            let uri = row.get("URI")?;
            if row.is_true("supported")? {
                if !supported.iter().any(|known| known == uri) {
                    supported.push(uri.to_string());
                }
            } else {
                tracing::info!(feature = uri, "feature is included but not supported");
            }
        }
        Ok(Self { supported })
    }

    pub fn has(&self, feature: &str) -> bool {
        self.supported.iter().any(|known| known == feature)
    }

    pub fn supports_population(&self) -> bool {
        self.has(feature::POPULATION_MODEL)
    }

    /// Features to publish; population support is hidden when not expanding
    pub fn published(&self, expansion: bool) -> Vec<String> {
        self.supported
            .iter()
            .filter(|uri| expansion || uri.as_str() != feature::POPULATION_MODEL)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            supported: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// `package#X` → `domain#Package-X`
pub fn package_resource(package: &str) -> String {
    package.replace(names::PACKAGE, names::DOMAIN_PACKAGE)
}

/// `feature#X` → `domain#Feature-X`
pub fn feature_resource(feature: &str) -> String {
    feature.replace(names::FEATURE, names::DOMAIN_FEATURE)
}

/// A row of `Packages.csv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// `package#X` identifier used by other tables
    pub uri: String,
    pub label: String,
    pub comment: String,
    pub enabled: bool,
}

/// All packages, with a fast enabled-package lookup
#[derive(Debug, Clone, Default)]
pub struct Packages {
    list: Vec<Package>,
    enabled: HashSet<String>,
}

impl Packages {
    /// Read `Packages.csv`
    ///
    /// Every package is enabled unless `optional` is set and its `Enabled`
    /// cell is not `true`.
    pub fn load(tables: &TableSet, optional: bool) -> ConvertResult<Self> {
        let table = tables.table("Packages")?;
        if optional {
            table.require("Enabled")?;
        }

        let mut packages = Self::default();
        for row in table.rows() {
            let enabled = !optional || row.is_true("Enabled")?;
            let package = Package {
                uri: row.get("URI")?.to_string(),
                label: row.get("Label")?.to_string(),
                comment: row.get("Description")?.to_string(),
                enabled,
            };
            if !enabled {
                tracing::info!(package = %package.uri, "package is included but not enabled");
            }
            packages.push(package);
        }
        Ok(packages)
    }

    pub fn push(&mut self, package: Package) {
        if package.enabled {
            self.enabled.insert(package.uri.clone());
        }
        self.list.push(package);
    }

    pub fn is_enabled(&self, package: &str) -> bool {
        self.enabled.contains(package)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.list
            .iter()
            .filter(|package| package.enabled)
            .map(|package| package.uri.as_str())
    }

    pub fn into_vec(self) -> Vec<Package> {
        self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_features_hide_population_without_expansion() {
        let features: FeatureSet = [feature::OPTIONAL_PACKAGES, feature::POPULATION_MODEL]
            .into_iter()
            .collect();
        assert!(features.supports_population());
        assert_eq!(features.published(false), vec![feature::OPTIONAL_PACKAGES]);
        assert_eq!(features.published(true).len(), 2);
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(package_resource("package#Network"), "domain#Package-Network");
        assert_eq!(feature_resource("feature#ThreatTypeFlags"), "domain#Feature-ThreatTypeFlags");
    }

    #[test]
    fn test_packages_track_enabled() {
        let mut packages = Packages::default();
        packages.push(Package {
            uri: "package#Core".into(),
            label: "Core".into(),
            comment: String::new(),
            enabled: true,
        });
        packages.push(Package {
            uri: "package#Cloud".into(),
            label: "Cloud".into(),
            comment: String::new(),
            enabled: false,
        });

        assert!(packages.is_enabled("package#Core"));
        assert!(!packages.is_enabled("package#Cloud"));
        assert_eq!(packages.enabled().collect::<Vec<_>>(), vec!["package#Core"]);
        assert_eq!(packages.into_vec().len(), 2);
    }
}
