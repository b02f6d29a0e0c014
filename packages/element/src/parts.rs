//! Part declarations, per-instance routing and the per-pass Part Index.

use crate::error::ConfigError;
use crate::reprojection::PARTS_ROOT_TAG;
use crate::schema::ElementDefinition;
use indexmap::IndexMap;
use shade_dom::{Document, NodeId};
use std::collections::HashMap;

/// Marker attribute listing the part names an element plays.
pub const PART_ATTRIBUTE: &str = "part-of";

/// Part key -> expected tag names. An empty tag list accepts any element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartDeclaration {
    entries: IndexMap<String, Vec<String>>,
}

impl PartDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part<I, S>(mut self, key: impl Into<String>, expect: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(ConfigError::DuplicatePart { key });
        }
        let expect = expect
            .into_iter()
            .map(|tag| tag.into().to_ascii_lowercase())
            .collect();
        self.entries.insert(key, expect);
        Ok(self)
    }

    /// Derive from a definition's `part-data-attributes`: kebab-case keys
    /// become camelCase, `expect` keys become the tag filter.
    pub fn from_definition(definition: &ElementDefinition) -> Result<Self, ConfigError> {
        definition
            .part_data_attributes
            .iter()
            .try_fold(Self::new(), |declaration, (name, part)| {
                let expect: Vec<&str> = part
                    .expect
                    .as_ref()
                    .map(|tags| tags.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                declaration.part(kebab_to_camel(name), expect)
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.expected_tags(key).is_some()
    }

    pub fn expected_tags(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Whether an element named `local_name` may be bound to `key`.
    /// Undeclared keys carry no filter.
    pub fn accepts(&self, key: &str, local_name: &str) -> bool {
        match self.expected_tags(key) {
            Some(tags) if !tags.is_empty() => tags.iter().any(|t| t == local_name),
            _ => true,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive a [`PartDeclaration`] from a component definition.
pub fn parts_record(definition: &ElementDefinition) -> Result<PartDeclaration, ConfigError> {
    PartDeclaration::from_definition(definition)
}

/// `title-el` -> `titleEl`. Empty segments are dropped.
pub fn kebab_to_camel(name: &str) -> String {
    let mut segments = name.split('-');
    let mut camel = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            camel.extend(first.to_uppercase());
            camel.push_str(chars.as_str());
        }
    }
    camel
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingEntry {
    /// Dataset key, which also names the handler.
    pub key: String,
    /// Part names bound to the handler.
    pub parts: Vec<String>,
}

/// Per-instance routing derived from the element's dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingTable {
    entries: Vec<RoutingEntry>,
}

impl RoutingTable {
    /// An empty value routes the part named like the key itself.
    pub fn from_dataset(dataset: &[(String, String)]) -> Self {
        let entries = dataset
            .iter()
            .map(|(key, value)| {
                let mut parts: Vec<String> = Vec::new();
                for part in value.split_ascii_whitespace() {
                    if !parts.iter().any(|p| p == part) {
                        parts.push(part.to_string());
                    }
                }
                if parts.is_empty() {
                    parts.push(key.clone());
                }
                RoutingEntry {
                    key: key.clone(),
                    parts,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RoutingEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Elements a hydration pass may bind for `host`: its light-DOM descendants
/// followed by its own shadow tree, in document order, never looking
/// beneath a `<parts-root>` boundary.
pub fn part_candidates(doc: &Document, host: NodeId) -> Vec<NodeId> {
    let descend = |node: NodeId| !doc.is_element_named(node, PARTS_ROOT_TAG);
    let mut nodes = doc.descendants_pruned(host, &descend);
    if let Some(shadow) = doc.shadow_root(host) {
        nodes.extend(doc.descendants_pruned(shadow, &descend));
    }
    nodes.retain(|&node| doc.has_attribute(node, PART_ATTRIBUTE));
    nodes
}

/// Routing key -> matched elements for a single hydration pass. Keys keep
/// routing order; elements keep document order and appear once per key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartIndex {
    matched: IndexMap<String, Vec<NodeId>>,
}

impl PartIndex {
    pub fn build(
        doc: &Document,
        host: NodeId,
        routing: &RoutingTable,
        declaration: &PartDeclaration,
    ) -> Self {
        let mut by_part: HashMap<&str, Vec<&str>> = HashMap::new();
        for entry in routing.entries() {
            for part in &entry.parts {
                by_part.entry(part.as_str()).or_default().push(entry.key.as_str());
            }
        }

        let mut matched: IndexMap<String, Vec<NodeId>> = routing
            .entries()
            .iter()
            .map(|entry| (entry.key.clone(), Vec::new()))
            .collect();

        for element in part_candidates(doc, host) {
            let names = doc.get_attribute(element, PART_ATTRIBUTE).unwrap_or_default();
            let local_name = doc.local_name(element).unwrap_or_default();
            for name in names.split_ascii_whitespace() {
                let Some(keys) = by_part.get(name) else {
                    continue;
                };
                for &key in keys {
                    if !declaration.accepts(key, local_name) {
                        continue;
                    }
                    if let Some(elements) = matched.get_mut(key) {
                        if !elements.contains(&element) {
                            elements.push(element);
                        }
                    }
                }
            }
        }

        Self { matched }
    }

    pub fn get(&self, key: &str) -> &[NodeId] {
        self.matched.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.matched
            .iter()
            .map(|(key, elements)| (key.as_str(), elements.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.matched.iter().map(|(_, elements)| elements.len()).sum()
    }
}
