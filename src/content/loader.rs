//! Loader for RON content files at startup.

use bevy::prelude::*;
use ron::Options;
use std::fs;
use std::path::Path;

use super::data::*;
use super::registry::ContentRegistry;

/// Error type for content loading failures.
#[derive(Debug)]
pub struct ContentLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

fn read_file(path: &Path) -> Result<String, ContentLoadError> {
    fs::read_to_string(path).map_err(|e| ContentLoadError {
        file: path.display().to_string(),
        message: format!("IO error: {}", e),
    })
}

/// Parse the contents of a RON file containing a DataFile<T> wrapper.
pub fn parse_data_file<T>(file: &str, contents: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> = ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file.to_string(),
            message: format!("Parse error: {}", e),
        })?;

    Ok(data.items)
}

/// Parse a single RON struct (not wrapped in DataFile).
pub fn parse_single_file<T>(file: &str, contents: &str) -> Result<T, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file.to_string(),
            message: format!("Parse error: {}", e),
        })
}

fn load_data_file<T>(path: &Path) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = read_file(path)?;
    parse_data_file(&path.display().to_string(), &contents)
}

fn load_single_file<T>(path: &Path) -> Result<T, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = read_file(path)?;
    parse_single_file(&path.display().to_string(), &contents)
}

/// Load all content from assets/data/*.ron into a ContentRegistry.
/// Returns errors for any files that fail to load.
pub fn load_all_content(
    base_path: &Path,
) -> Result<(ContentRegistry, GameplayDefaults), Vec<ContentLoadError>> {
    let mut registry = ContentRegistry::default();
    let mut errors = Vec::new();

    macro_rules! load_into {
        ($registry_field:expr, $file:expr, $type:ty, $key:expr) => {
            let path = base_path.join($file);
            match load_data_file::<$type>(&path) {
                Ok(items) => {
                    for item in items {
                        $registry_field.insert($key(&item), item);
                    }
                }
                Err(e) => errors.push(e),
            }
        };
    }

    load_into!(registry.roles, "roles.ron", RoleDef, |def: &RoleDef| def.role);
    load_into!(
        registry.tuning,
        "tuning.ron",
        TuningDef,
        |def: &TuningDef| def.id.clone()
    );
    load_into!(
        registry.characters,
        "characters.ron",
        CharacterDef,
        |def: &CharacterDef| def.id.clone()
    );

    // Gameplay defaults are required.
    let defaults_path = base_path.join("gameplay_defaults.ron");
    let gameplay_defaults = match load_single_file::<GameplayDefaults>(&defaults_path) {
        Ok(defaults) => defaults,
        Err(e) => {
            errors.push(e);
            return Err(errors);
        }
    };

    if errors.is_empty() {
        debug!("Loaded content from {}", base_path.display());
        Ok((registry, gameplay_defaults))
    } else {
        Err(errors)
    }
}
