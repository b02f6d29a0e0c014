//! Custom element registry.
//!
//! One registry per [`Runtime`](crate::Runtime). Entries are added by
//! registration and never removed.

use crate::builder::ComponentDefinition;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::rc::Rc;

/// Outcome of an idempotent `register()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Defined,
    AlreadyDefined,
}

#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, Rc<ComponentDefinition>>,
    order: Vec<String>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rc<ComponentDefinition>> {
        self.definitions.get(name)
    }

    /// Defined names, in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn define(&mut self, definition: ComponentDefinition) -> Result<Rc<ComponentDefinition>, ConfigError> {
        let name = definition.tag().to_string();
        validate_tag_name(&name)?;
        if self.is_defined(&name) {
            return Err(ConfigError::AlreadyDefined { name });
        }
        let definition = Rc::new(definition);
        self.definitions.insert(name.clone(), definition.clone());
        self.order.push(name);
        Ok(definition)
    }
}

const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// A valid custom element name starts with a lowercase ASCII letter,
/// contains a hyphen, has no uppercase ASCII letters and is not reserved.
pub fn validate_tag_name(name: &str) -> Result<(), ConfigError> {
    let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && !name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace())
        && !RESERVED_NAMES.contains(&name);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTagName {
            name: name.to_string(),
        })
    }
}
