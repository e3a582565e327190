pub mod directives;
pub mod loader;
pub mod schema;

pub use directives::{PatchDirectives, PROPERTY_FORCE_UPDATE_PARENT, PROPERTY_UPDATE_POM};
pub use loader::{
    config_path, discover, load_from_path, load_from_str, ConfigError, ConfigOrigin, CONFIG_FILE,
};
pub use schema::{
    EngineConfig, EngineSettings, ValidationError, ValidationIssue, DEFAULT_COMPONENT_NAME,
    DEFAULT_SIDECAR_NAME,
};
