pub mod identity;
pub mod project;
pub mod sanitizer;

pub use identity::PluginIdentity;
pub use project::{Gav, ModelError, Plugin, ProjectModel, DEFAULT_PLUGIN_GROUP_ID};
pub use sanitizer::{sanitize, SanitizeReport};
