//! Content domain: RON data files for roles, tuning tables, and the roster.

mod data;
mod loader;
mod registry;
mod systems;
mod validation;


use bevy::prelude::*;

pub use data::{CharacterDef, DataFile, GameplayDefaults, RoleDef, TuningDef};
pub use loader::{ContentLoadError, load_all_content, parse_data_file, parse_single_file};
pub use registry::ContentRegistry;
pub use validation::{ValidationError, validate_content};

/// Directory the data files are read from, relative to the working directory.
pub const CONTENT_DIR: &str = "assets/data";

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, systems::load_content);
    }
}
