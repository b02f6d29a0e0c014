//! # Shade Definitions
//!
//! Loads component definition files (`*.def.json`) from a directory and
//! turns them into editor HTML data.

pub mod error;
pub mod filesystem;
pub mod html_data;
pub mod loader;

pub use error::{DefinitionError, DefinitionResult};
pub use filesystem::{FileSystem, MockFileSystem, RealFileSystem};
pub use html_data::{
    generate_html_data, observed_count, part_description, AttributeData, HtmlData, TagData,
    ValueData, DEFAULT_OUT_DIR, DEFAULT_OUT_FILE, HTML_DATA_VERSION,
};
pub use shade_element::{AttributeConfig, ElementDefinition, PartDataAttribute};
pub use loader::{is_definition_file, load_definitions, DefinitionFile, DEFINITION_SUFFIX};
