//! Editor HTML-data generation.
//!
//! Produces the custom-data format editors read for HTML completions: one
//! tag per definition, with a `data-<key>` attribute for each part key.

use crate::error::{DefinitionError, DefinitionResult};
use crate::filesystem::FileSystem;
use crate::loader::load_definitions;
use serde::{Deserialize, Serialize};
use shade_element::{AttributeConfig, ElementDefinition, PartDataAttribute};
use std::path::Path;
use tracing::info;

pub const HTML_DATA_VERSION: f64 = 1.1;
pub const DEFAULT_OUT_DIR: &str = ".html-data";
pub const DEFAULT_OUT_FILE: &str = "part-elements.html-data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlData {
    pub version: f64,
    pub tags: Vec<TagData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// `<description>\nExpected Elements: h1, h2`, or `any element` when the
/// part accepts every tag.
pub fn part_description(part: &PartDataAttribute) -> String {
    let expected = match &part.expect {
        Some(tags) if !tags.is_empty() => {
            tags.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        }
        _ => "any element".to_string(),
    };
    match part.description.as_deref() {
        Some(description) => format!("{description}\nExpected Elements: {expected}"),
        None => format!("Expected Elements: {expected}"),
    }
}

impl TagData {
    pub fn from_definition(definition: &ElementDefinition) -> Self {
        let parts = definition
            .part_data_attributes
            .iter()
            .map(|(key, part)| AttributeData {
                name: format!("data-{key}"),
                description: Some(part_description(part)),
                values: Vec::new(),
            });

        let declared = definition.attributes.iter().map(|(name, config)| {
            let spec = config.definition();
            AttributeData {
                name: name.to_string(),
                description: non_empty(&spec.description),
                values: spec
                    .values
                    .iter()
                    .map(|(value, description)| ValueData {
                        name: value.to_string(),
                        description: non_empty(description),
                    })
                    .collect(),
            }
        });

        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            attributes: parts.chain(declared).collect(),
        }
    }
}

impl HtmlData {
    pub fn from_definitions<'a>(definitions: impl IntoIterator<Item = &'a ElementDefinition>) -> Self {
        Self {
            version: HTML_DATA_VERSION,
            tags: definitions.into_iter().map(TagData::from_definition).collect(),
        }
    }

    pub fn to_json(&self) -> DefinitionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Number of declared attributes whose changes are observed.
pub fn observed_count(definition: &ElementDefinition) -> usize {
    definition
        .attributes
        .iter()
        .filter(|(_, config)| matches!(config, AttributeConfig::ObserveChange(_)))
        .count()
}

/// Load every definition under `components_dir` and write the HTML data to
/// `out_path`. Returns what was written.
pub fn generate_html_data(
    fs: &dyn FileSystem,
    components_dir: &Path,
    out_path: &Path,
) -> DefinitionResult<HtmlData> {
    let files = load_definitions(fs, components_dir)?;
    let data = HtmlData::from_definitions(files.iter().map(|file| &file.definition));
    fs.write(out_path, &data.to_json()?)
        .map_err(|source| DefinitionError::Write {
            path: out_path.to_path_buf(),
            source,
        })?;
    info!(
        tags = data.tags.len(),
        out = %out_path.display(),
        "HTML data written"
    );
    Ok(data)
}
