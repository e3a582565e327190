//! Reading [`EngineConfig`] from TOML.
//!
//! A project carries its config beside the root manifest, in
//! [`CONFIG_FILE`]. Projects without one run on defaults.

use crate::config::schema::{EngineConfig, ValidationError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file location relative to a manifest's directory.
pub const CONFIG_FILE: &str = ".mvn/pom-versioner.toml";

/// Where config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Inline => f.write_str("inline config"),
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {origin}")]
    Toml {
        origin: ConfigOrigin,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid settings in {origin}")]
    Validation {
        origin: ConfigOrigin,
        #[source]
        source: ValidationError,
    },
}

fn parse(input: &str, origin: ConfigOrigin) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Toml { origin, source }),
    };
    config
        .validate()
        .map_err(|source| ConfigError::Validation { origin, source })?;
    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<EngineConfig, ConfigError> {
    parse(input, ConfigOrigin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, ConfigOrigin::File(path.to_path_buf()))
}

/// Config file belonging to `manifest`, whether or not it exists.
pub fn config_path(manifest: &Path) -> PathBuf {
    manifest
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE)
}

/// Load the config belonging to `manifest`, falling back to defaults when
/// the project has none.
pub fn discover(manifest: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let candidate = config_path(manifest.as_ref());
    if candidate.is_file() {
        debug!(path = %candidate.display(), "using project config");
        load_from_path(candidate)
    } else {
        debug!(path = %candidate.display(), "no project config, using defaults");
        Ok(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        assert_eq!(load_from_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let config = load_from_str("[plugin]\nversion = \"9.4.0\"\n").unwrap();
        assert_eq!(config.plugin.version, "9.4.0");
        assert_eq!(config.plugin.group_id, "me.qoomon");
        assert_eq!(config.engine.sidecar_name, ".git-versioned-pom.xml");
    }

    #[test]
    fn config_path_is_manifest_relative() {
        assert_eq!(
            config_path(Path::new("modules/core/pom.xml")),
            Path::new("modules/core/.mvn/pom-versioner.toml")
        );
        assert_eq!(
            config_path(Path::new("pom.xml")),
            Path::new("./.mvn/pom-versioner.toml")
        );
    }

    #[test]
    fn validation_errors_name_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[engine]\nsidecar_name = \"a/b.xml\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::Validation { origin: ConfigOrigin::File(file), .. } if file == &path
        ));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn inline_errors_say_inline() {
        let err = load_from_str("[plugin").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { origin: ConfigOrigin::Inline, .. }));
        assert_eq!(err.to_string(), "failed to parse inline config");
    }

    #[test]
    fn discover_reads_project_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manifest = temp_dir.path().join("pom.xml");
        let config_file = config_path(&manifest);
        fs::create_dir_all(config_file.parent().unwrap()).unwrap();
        fs::write(&config_file, "[engine]\nsidecar_name = \"versioned.xml\"\n").unwrap();

        let config = discover(&manifest).unwrap();
        assert_eq!(config.engine.sidecar_name, "versioned.xml");
    }
}
