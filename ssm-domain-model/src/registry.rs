//! Registries of known resources and decoders for composite IRIs
//!
//! Node, role link and set IRIs embed the short names of other resources,
//! separated by `-`. Short names may contain `-` themselves, so decoding
//! tries the registered names in registration order and takes the first
//! one that matches.

use crate::model::{EntitySet, Node, RoleLink};
use ssm_vocab::ssm::names;
use std::collections::{HashMap, HashSet};

/// Resources of one kind keyed by local name, remembering their short name
/// and registration order
#[derive(Debug, Clone, Default)]
pub struct ShortNames {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ShortNames {
    /// Register `uri` with the short name left after stripping `prefix`
    pub fn register(&mut self, uri: &str, prefix: &str) {
        let short = uri.strip_prefix(prefix).unwrap_or(uri).to_string();
        match self.index.get(uri) {
            Some(&idx) => self.entries[idx].1 = short,
            None => {
                self.index.insert(uri.to_string(), self.entries.len());
                self.entries.push((uri.to_string(), short));
            }
        }
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.index.contains_key(uri)
    }

    /// Find the first entry whose short name followed by `-` starts `text`.
    /// Returns the entry's local name and the rest of `text`.
    pub fn split_prefix<'t>(&self, text: &'t str) -> Option<(&str, &'t str)> {
        self.entries.iter().find_map(|(uri, short)| {
            text.strip_prefix(short.as_str())
                .and_then(|rest| rest.strip_prefix('-'))
                .map(|rest| (uri.as_str(), rest))
        })
    }
}

/// Records collected in first-seen order, keyed by IRI
#[derive(Debug, Clone)]
pub struct Collected<T> {
    items: Vec<T>,
    seen: HashSet<String>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T> Collected<T> {
    pub fn contains(&self, uri: &str) -> bool {
        self.seen.contains(uri)
    }

    /// Decode and add `uri` unless it was seen before
    pub fn insert_with<E>(
        &mut self,
        uri: &str,
        decode: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<(), E> {
        if !self.seen.contains(uri) {
            let item = decode(uri)?;
            self.seen.insert(uri.to_string());
            self.items.push(item);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Registered roles, assets and relationships used to decode nodes and links
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub assets: ShortNames,
    pub relationships: ShortNames,
    pub roles: ShortNames,
    pub controls: ShortNames,
    pub misbehaviours: ShortNames,
    pub twas: ShortNames,
}

impl Registries {
    /// Decode `domain#Node-{role}-{asset}`
    pub fn decode_node(&self, uri: &str) -> Result<Node, String> {
        let short = uri
            .strip_prefix(names::NODE)
            .ok_or_else(|| format!("bad node URI {uri}: expected the '{}' prefix", names::NODE))?;
        let (role, rest) = self
            .roles
            .split_prefix(short)
            .ok_or_else(|| format!("bad node URI {uri}: does not have a valid role"))?;
        let asset = format!("{}{}", names::DOMAIN, rest);
        if !self.assets.contains(&asset) {
            return Err(format!("bad node URI {uri}: does not have a valid asset type"));
        }
        Ok(Node {
            uri: uri.to_string(),
            role: role.to_string(),
            asset,
        })
    }

    /// Decode `domain#Link-{fromRole}-{relationship}-{toRole}`
    pub fn decode_link(&self, uri: &str) -> Result<RoleLink, String> {
        let short = uri
            .strip_prefix(names::LINK)
            .ok_or_else(|| format!("bad role link URI {uri}: expected the '{}' prefix", names::LINK))?;
        let (from, rest) = self
            .roles
            .split_prefix(short)
            .ok_or_else(|| format!("bad role link URI {uri}: is not from a valid role"))?;
        let (link_type, rest) = self
            .relationships
            .split_prefix(rest)
            .ok_or_else(|| format!("bad role link URI {uri}: does not have a valid relationship type"))?;
        let to = format!("{}{}", names::ROLE, rest);
        if !self.roles.contains(&to) {
            return Err(format!("bad role link URI {uri}: is not to a valid role"));
        }
        Ok(RoleLink {
            uri: uri.to_string(),
            from: from.to_string(),
            link_type: link_type.to_string(),
            to,
        })
    }

    /// Decode `{prefix}{entity}-{role}` against the given entity registry
    pub fn decode_set(
        &self,
        uri: &str,
        prefix: &str,
        entities: &ShortNames,
        what: &str,
    ) -> Result<EntitySet, String> {
        let short = uri.strip_prefix(prefix).ok_or_else(|| {
            format!("bad {what} set URI {uri}: expected the '{prefix}' prefix")
        })?;
        let (entity, rest) = entities
            .split_prefix(short)
            .ok_or_else(|| format!("bad {what} set URI {uri}: does not relate to a valid {what}"))?;
        let role = format!("{}{}", names::ROLE, rest);
        if !self.roles.contains(&role) {
            return Err(format!("bad {what} set URI {uri}: does not relate to a valid role"));
        }
        Ok(EntitySet {
            uri: uri.to_string(),
            entity: entity.to_string(),
            located_at: role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registries() -> Registries {
        let mut reg = Registries::default();
        for role in ["domain#Role_Host", "domain#Role_Host-Extra", "domain#Role_Net"] {
            reg.roles.register(role, names::ROLE);
        }
        for asset in ["domain#Host", "domain#Network"] {
            reg.assets.register(asset, names::DOMAIN);
        }
        reg.relationships.register("domain#connectedTo", names::DOMAIN);
        reg.controls.register("domain#Patching", names::DOMAIN);
        reg.twas.register("domain#Auth", names::DOMAIN);
        reg
    }

    #[test]
    fn test_decode_node() {
        let reg = registries();
        let node = reg.decode_node("domain#Node-Host-Host").unwrap();
        assert_eq!(node.role, "domain#Role_Host");
        assert_eq!(node.asset, "domain#Host");

        // first registered role wins even if a longer one would also match
        let err = reg.decode_node("domain#Node-Host-Extra-Host").unwrap_err();
        assert!(err.contains("valid asset type"));

        assert!(reg.decode_node("domain#Node-Cloud-Host").unwrap_err().contains("valid role"));
        assert!(reg.decode_node("domain#Host").is_err());
    }

    #[test]
    fn test_decode_link() {
        let reg = registries();
        let link = reg.decode_link("domain#Link-Host-connectedTo-Net").unwrap();
        assert_eq!(link.from, "domain#Role_Host");
        assert_eq!(link.link_type, "domain#connectedTo");
        assert_eq!(link.to, "domain#Role_Net");

        assert!(reg
            .decode_link("domain#Link-Host-uses-Net")
            .unwrap_err()
            .contains("relationship type"));
        assert!(reg
            .decode_link("domain#Link-Host-connectedTo-Cloud")
            .unwrap_err()
            .contains("not to a valid role"));
    }

    #[test]
    fn test_decode_set() {
        let reg = registries();
        let set = reg
            .decode_set("domain#CS-Patching-Host", names::CONTROL_SET, &reg.controls, "Control")
            .unwrap();
        assert_eq!(set.entity, "domain#Patching");
        assert_eq!(set.located_at, "domain#Role_Host");

        assert!(reg
            .decode_set("domain#MS-Patching-Host", names::CONTROL_SET, &reg.controls, "Control")
            .is_err());
        assert!(reg
            .decode_set("domain#TWAS-Auth-Cloud", names::TWA_SET, &reg.twas, "TWA")
            .unwrap_err()
            .contains("valid role"));
    }

    #[test]
    fn test_collected_keeps_first_seen_order() {
        let reg = registries();
        let mut nodes = Collected::default();
        for uri in ["domain#Node-Net-Network", "domain#Node-Host-Host", "domain#Node-Net-Network"] {
            nodes.insert_with(uri, |uri| reg.decode_node(uri)).unwrap();
        }
        assert!(nodes.contains("domain#Node-Host-Host"));
        let uris: Vec<_> = nodes.into_vec().into_iter().map(|node| node.uri).collect();
        assert_eq!(uris, vec!["domain#Node-Net-Network", "domain#Node-Host-Host"]);
    }
}
