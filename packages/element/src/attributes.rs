//! Attribute Record: which attributes a component declares, which of them
//! are observed, and the values each accepts.
//!
//! Allowed values document the attribute for tooling. They are not enforced
//! when an attribute is written.

use crate::error::ConfigError;
use crate::schema::ElementDefinition;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeSpec {
    pub observe: bool,
    /// Accepted values, in declaration order. Empty means any string.
    pub values: Vec<String>,
}

impl AttributeSpec {
    pub fn observed<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            observe: true,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignored<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            observe: false,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == value)
    }
}

/// Read-only attribute schema of a component type. Names keep their
/// declared casing; lookups are ASCII case-insensitive like DOM attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeRecord {
    /// Lowercased name -> (declared name, spec).
    entries: IndexMap<String, (String, AttributeSpec)>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, spec: AttributeSpec) -> Result<Self, ConfigError> {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Err(ConfigError::DuplicateAttribute { name });
        }
        self.entries.insert(key, (name, spec));
        Ok(self)
    }

    /// Derive the record from a definition's `attributes` section.
    pub fn from_definition(definition: &ElementDefinition) -> Result<Self, ConfigError> {
        definition
            .attributes
            .iter()
            .try_fold(Self::new(), |record, (name, config)| {
                let values = config.definition().values.keys().cloned().collect();
                record.with(
                    name,
                    AttributeSpec {
                        observe: config.observe(),
                        values,
                    },
                )
            })
    }

    /// Entries of `other` are added; an entry with the same name replaces
    /// the existing spec in place.
    pub fn merge(&mut self, other: AttributeRecord) {
        for (key, (name, spec)) in other.entries {
            match self.entries.get_mut(&key) {
                Some(existing) => existing.1 = spec,
                None => {
                    self.entries.insert(key, (name, spec));
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.get(name).is_some_and(|spec| spec.observe)
    }

    /// Names marked as observed, in declaration order.
    pub fn observed_attributes(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, spec)| spec.observe)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn allowed_values(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|spec| spec.values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSpec)> {
        self.entries.values().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive an [`AttributeRecord`] from a component definition.
pub fn attribute_record(definition: &ElementDefinition) -> Result<AttributeRecord, ConfigError> {
    AttributeRecord::from_definition(definition)
}
