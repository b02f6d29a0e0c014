use crate::error::{DefinitionError, DefinitionResult};
use crate::filesystem::FileSystem;
use shade_element::registry::validate_tag_name;
use shade_element::{attribute_record, parts_record, ElementDefinition};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFINITION_SUFFIX: &str = ".def.json";

/// A parsed `*.def.json` file.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    pub path: PathBuf,
    pub definition: ElementDefinition,
}

impl DefinitionFile {
    /// File name without the `.def.json` suffix.
    pub fn stem(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(DEFINITION_SUFFIX))
            .unwrap_or_default()
    }

    /// Checks the tag name and derives both records the runtime would build
    /// from this definition.
    pub fn validate(&self) -> DefinitionResult<()> {
        let config_error = |source| DefinitionError::Config {
            path: self.path.clone(),
            source,
        };
        validate_tag_name(&self.definition.name).map_err(config_error)?;
        attribute_record(&self.definition).map_err(config_error)?;
        parts_record(&self.definition).map_err(config_error)?;
        Ok(())
    }
}

pub fn is_definition_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DEFINITION_SUFFIX))
}

/// Read every definition directly inside `dir`, ordered by file name.
pub fn load_definitions(fs: &dyn FileSystem, dir: &Path) -> DefinitionResult<Vec<DefinitionFile>> {
    if !fs.is_dir(dir) {
        return Err(DefinitionError::MissingDirectory(dir.to_path_buf()));
    }

    let mut paths = fs
        .list_files(dir)
        .map_err(|source| DefinitionError::Read {
            path: dir.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|path| is_definition_file(path))
        .collect::<Vec<_>>();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = fs.read_to_string(&path).map_err(|source| DefinitionError::Read {
            path: path.clone(),
            source,
        })?;
        let definition: ElementDefinition =
            serde_json::from_str(&source).map_err(|source| DefinitionError::Json {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), tag = %definition.name, "Loaded definition");
        files.push(DefinitionFile { path, definition });
    }
    Ok(files)
}
