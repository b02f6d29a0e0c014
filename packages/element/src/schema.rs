//! Component definition schema, as authored in `*.def.json` files.
//!
//! ```json
//! {
//!   "name": "my-root",
//!   "description": "Page root",
//!   "attributes": {
//!     "title-text": {
//!       "observe-change": { "description": "Heading", "values": {} }
//!     }
//!   },
//!   "part-data-attributes": {
//!     "title-el": { "description": "Heading slot", "expect": { "h1": "Level one heading" } }
//!   }
//! }
//! ```
//!
//! Object key order is significant (observed attributes and part keys are
//! reported in declaration order), so maps deserialize into [`IndexMap`].
//! A key repeated within one object is rejected.

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Object map in declaration order.
pub type DeclaredMap<V> = IndexMap<String, V>;

struct UniqueKeys<V>(DeclaredMap<V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueKeys<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UniqueKeysVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeysVisitor<V> {
            type Value = UniqueKeys<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = DeclaredMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if map.contains_key(&key) {
                        return Err(serde::de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    map.insert(key, value);
                }
                Ok(UniqueKeys(map))
            }
        }

        deserializer.deserialize_map(UniqueKeysVisitor(PhantomData))
    }
}

fn unique_keys<'de, D, V>(deserializer: D) -> Result<DeclaredMap<V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    UniqueKeys::deserialize(deserializer).map(|keys| keys.0)
}

fn optional_unique_keys<'de, D, V>(deserializer: D) -> Result<Option<DeclaredMap<V>>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Option::<UniqueKeys<V>>::deserialize(deserializer).map(|keys| keys.map(|k| k.0))
}

/// One component definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// The custom element tag name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "unique_keys",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub attributes: DeclaredMap<AttributeConfig>,

    #[serde(
        rename = "part-data-attributes",
        default,
        deserialize_with = "unique_keys",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub part_data_attributes: DeclaredMap<PartDataAttribute>,
}

impl ElementDefinition {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Whether changes to an attribute reach `attributeChangedCallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeConfig {
    #[serde(rename = "observe-change")]
    ObserveChange(AttributeDefinition),

    #[serde(rename = "ignore-change")]
    IgnoreChange(AttributeDefinition),
}

impl AttributeConfig {
    pub fn observe(&self) -> bool {
        matches!(self, AttributeConfig::ObserveChange(_))
    }

    pub fn definition(&self) -> &AttributeDefinition {
        match self {
            AttributeConfig::ObserveChange(def) | AttributeConfig::IgnoreChange(def) => def,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(default)]
    pub description: String,

    /// Accepted values and their descriptions. Empty means any string.
    #[serde(default, deserialize_with = "unique_keys")]
    pub values: DeclaredMap<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartDataAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Expected tag names and their descriptions. Absent means any element.
    #[serde(
        default,
        deserialize_with = "optional_unique_keys",
        skip_serializing_if = "Option::is_none"
    )]
    pub expect: Option<DeclaredMap<String>>,
}
