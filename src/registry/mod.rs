//! The dispatch table from node-type identifiers to converters.
//!
//! A registry is built once, validated at build time and read-only afterwards,
//! so a single instance can be shared (behind an `Arc`) by any number of
//! concurrent conversion runs. It knows nothing about node families; it is a
//! flat table plus alias resolution.

use crate::error::RegistryError;
use crate::ir::IrNode;
use ahash::AHashMap;
use std::sync::Arc;

mod converter;

pub use converter::{BoundNode, Converter};

pub struct ConverterRegistry {
    converters: Vec<Arc<dyn Converter>>,
    by_type: AHashMap<String, usize>,
    aliases: AHashMap<String, String>,
}

/// Collects converters and aliases; `build` validates them.
#[derive(Default)]
pub struct RegistryBuilder {
    converters: Vec<Arc<dyn Converter>>,
    aliases: Vec<(String, String)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the built-in converter catalogue and its default aliases.
    pub fn with_defaults(self) -> Self {
        crate::converters::register_defaults(self)
    }

    pub fn with_converter<C: Converter + 'static>(self, converter: C) -> Self {
        self.with_shared_converter(Arc::new(converter))
    }

    pub fn with_shared_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converters.push(converter);
        self
    }

    /// Maps an alternative type name (e.g. a fully-qualified class name) onto a
    /// registered node type.
    pub fn with_alias(mut self, alias: &str, node_type: &str) -> Self {
        self.aliases.push((alias.to_string(), node_type.to_string()));
        self
    }

    pub fn build(self) -> Result<ConverterRegistry, RegistryError> {
        let mut by_type = AHashMap::new();
        for (slot, converter) in self.converters.iter().enumerate() {
            for node_type in converter.node_types() {
                if by_type.insert(node_type.to_string(), slot).is_some() {
                    return Err(RegistryError::DuplicateType(node_type.to_string()));
                }
            }
        }

        let mut aliases: AHashMap<String, String> = AHashMap::new();
        for (alias, target) in self.aliases {
            if by_type.contains_key(&alias) {
                return Err(RegistryError::AliasShadowsType { alias });
            }
            if !by_type.contains_key(&target) {
                return Err(RegistryError::UnknownAliasTarget { alias, target });
            }
            if let Some(existing) = aliases.get(&alias) {
                if *existing != target {
                    return Err(RegistryError::ConflictingAlias {
                        first: existing.clone(),
                        second: target,
                        alias,
                    });
                }
                continue;
            }
            aliases.insert(alias, target);
        }

        tracing::debug!(
            converters = self.converters.len(),
            types = by_type.len(),
            aliases = aliases.len(),
            "converter registry built"
        );
        Ok(ConverterRegistry {
            converters: self.converters,
            by_type,
            aliases,
        })
    }
}

impl ConverterRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry holding the built-in catalogue.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::builder().with_defaults().build()
    }

    /// Resolves an alias to its registered type; registered types map to themselves.
    pub fn canonical_type<'a>(&'a self, type_id: &'a str) -> Option<&'a str> {
        if self.by_type.contains_key(type_id) {
            Some(type_id)
        } else {
            self.aliases.get(type_id).map(String::as_str)
        }
    }

    /// Exact type match first, then the alias table.
    pub fn get(&self, type_id: &str) -> Option<&dyn Converter> {
        let canonical = self.canonical_type(type_id)?;
        self.by_type
            .get(canonical)
            .map(|&slot| self.converters[slot].as_ref())
    }

    /// The converter responsible for a node, if any accepts it.
    pub fn resolve(&self, node: &IrNode) -> Option<&dyn Converter> {
        self.get(&node.node_type).filter(|c| c.can_convert(node))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.canonical_type(type_id).is_some()
    }

    /// Registered node types (aliases excluded), sorted.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.by_type.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("types", &self.registered_types())
            .field("aliases", &self.aliases.len())
            .finish()
    }
}
