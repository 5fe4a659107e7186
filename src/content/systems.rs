//! Content domain: startup loading into resources.

use bevy::prelude::*;
use std::path::Path;

use crate::content::{
    CONTENT_DIR, ContentRegistry, GameplayDefaults, load_all_content, validate_content,
};

/// Load every data file, validate cross-references, and publish the
/// registry. Any failure falls back to built-in content.
pub(crate) fn load_content(mut commands: Commands) {
    let (registry, defaults) = match load_all_content(Path::new(CONTENT_DIR)) {
        Ok(loaded) => loaded,
        Err(errors) => {
            for error in &errors {
                error!("{}", error);
            }
            warn!(
                "{} content file(s) failed to load, using built-in content",
                errors.len()
            );
            (ContentRegistry::builtin(), GameplayDefaults::default())
        }
    };

    let errors = validate_content(&registry);
    let registry = if errors.is_empty() {
        registry
    } else {
        for error in &errors {
            error!("Content validation: {}", error);
        }
        warn!(
            "{} validation error(s), using built-in content",
            errors.len()
        );
        ContentRegistry::builtin()
    };

    info!(
        "{}\n- Total: {}",
        registry.summary(),
        registry.total_count()
    );
    commands.insert_resource(registry);
    commands.insert_resource(defaults);
}
