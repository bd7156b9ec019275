use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{RegistryError, ResolveError};

use super::types::{ChannelSpec, Provider};

/// Registry document shipped with the binary.
const DEFAULT_CHANNELS: &str = include_str!("../../registry/channels.yaml");

/**
    The static channel registry: an ordered mapping from provider to an
    ordered mapping from display name to entry.

    Group order and entry order are significant (they are the playlist
    rendering order and drive positional numbering), so both levels use
    insertion-ordered maps. The registry is immutable once loaded and is
    shared read-only across the assembler, the resolver, and the proxy.
*/
#[derive(Debug, Clone)]
pub struct Registry {
    groups: IndexMap<Provider, IndexMap<String, ChannelSpec>>,
}

impl Registry {
    /// Load the registry embedded in the binary.
    pub fn embedded() -> Result<Self, RegistryError> {
        Self::from_yaml(DEFAULT_CHANNELS)
    }

    /// Load a registry from an external YAML file.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parse a registry from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        let groups: IndexMap<Provider, IndexMap<String, ChannelSpec>> =
            serde_yaml::from_str(text)?;
        let registry = Self { groups };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for (name, spec) in self.group(Provider::Direct) {
            if spec.url.is_none() {
                return Err(RegistryError::MissingUrl {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Entries of one provider group, in registry order. Absent groups are
    /// empty, not an error.
    pub fn group(&self, provider: Provider) -> impl Iterator<Item = (&str, &ChannelSpec)> {
        self.groups
            .get(&provider)
            .into_iter()
            .flatten()
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Look up one entry by display name within a provider group.
    pub fn find(&self, provider: Provider, name: &str) -> Result<&ChannelSpec, ResolveError> {
        self.groups
            .get(&provider)
            .and_then(|group| group.get(name))
            .ok_or_else(|| ResolveError::UnknownChannel {
                provider,
                name: name.to_string(),
            })
    }

    /// All entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &str, &ChannelSpec)> {
        self.groups.iter().flat_map(|(provider, group)| {
            group
                .iter()
                .map(move |(name, spec)| (*provider, name.as_str(), spec))
        })
    }

    /// Scan the proxy-delegated groups for an entry with the given id.
    ///
    /// This is the lookup behind the redirect proxy's `?id=` parameter.
    pub fn find_proxied(&self, id: &str) -> Option<Provider> {
        [Provider::Sky, Provider::Paramount]
            .into_iter()
            .find(|provider| {
                self.group(*provider)
                    .any(|(name, spec)| spec.effective_id(name) == id)
            })
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_registry_loads() {
        let registry = Registry::embedded().expect("embedded registry must parse");
        assert!(!registry.is_empty());

        // The first group is Rai and its first entry is Rai 1.
        let (provider, name, spec) = registry.iter().next().unwrap();
        assert_eq!(provider, Provider::Rai);
        assert_eq!(name, "Rai 1");
        assert_eq!(spec.id.as_deref(), Some("rai1"));
    }

    #[test]
    fn test_order_is_preserved() {
        let registry = Registry::from_yaml(
            "rai:\n  Rai 3: { id: rai3 }\n  Rai 1: { id: rai1 }\n  Rai 2: { id: rai2 }\n",
        )
        .unwrap();
        let names: Vec<_> = registry.iter().map(|(_, name, _)| name).collect();
        assert_eq!(names, ["Rai 3", "Rai 1", "Rai 2"]);
    }

    #[test]
    fn test_missing_group_is_empty() {
        let registry = Registry::from_yaml("rai:\n  Rai 1: { id: rai1 }\n").unwrap();
        assert_eq!(registry.group(Provider::Sky).count(), 0);
    }

    #[test]
    fn test_find_unknown_channel() {
        let registry = Registry::from_yaml("rai:\n  Rai 1: { id: rai1 }\n").unwrap();
        let err = registry.find(Provider::Rai, "Rai 7").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownChannel { .. }));
    }

    #[test]
    fn test_direct_entry_requires_url() {
        let err = Registry::from_yaml("direct:\n  Nameless: { number: 9 }\n").unwrap_err();
        assert!(matches!(err, RegistryError::MissingUrl { .. }));
    }

    #[test]
    fn test_find_proxied_scans_sky_and_paramount() {
        let registry = Registry::from_yaml(
            "sky:\n  Sky TG24: { id: \"1\" }\nparamount:\n  Paramount Network: { id: paramount }\n",
        )
        .unwrap();
        assert_eq!(registry.find_proxied("1"), Some(Provider::Sky));
        assert_eq!(registry.find_proxied("paramount"), Some(Provider::Paramount));
        assert_eq!(registry.find_proxied("nope"), None);
    }
}
