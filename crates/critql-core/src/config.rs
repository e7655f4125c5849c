use crate::error::InternalError;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable overriding `database.path`.
pub const DATABASE_PATH_ENV: &str = "CRITQL_DATABASE_PATH";

///
/// SessionConfig
///
/// Session-level configuration, loaded from TOML:
///
/// ```toml
/// unit = "default"
/// debug = false
/// max_rows = 10000
///
/// [database]
/// path = "app.db"
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Persistence unit name, used in log fields.
    pub unit: String,
    /// Emit SQL at `info` instead of `debug`.
    pub debug: bool,
    /// Fail a load whose result exceeds this many rows.
    pub max_rows: Option<usize>,
    pub database: DatabaseConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            unit: "default".to_string(),
            debug: false,
            max_rows: None,
            database: DatabaseConfig::default(),
        }
    }
}

///
/// DatabaseConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file; in-memory when absent.
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        toml::from_str(source)
            .map_err(|err| InternalError::config_invalid(format!("invalid session config: {err}")))
    }

    /// Read a TOML file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InternalError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            InternalError::config_invalid(format!("cannot read {}: {err}", path.display()))
        })?;

        Ok(Self::from_toml_str(&source)?.with_env_overrides())
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(DATABASE_PATH_ENV).filter(|p| !p.is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorClass, ErrorOrigin};

    #[test]
    fn empty_source_yields_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();

        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.unit, "default");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn full_source_parses() {
        let config = SessionConfig::from_toml_str(
            r#"
            unit = "regression"
            debug = true
            max_rows = 50

            [database]
            path = "/tmp/critql.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.unit, "regression");
        assert!(config.debug);
        assert_eq!(config.max_rows, Some(50));
        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/tmp/critql.db"))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SessionConfig::from_toml_str("maxrows = 5").unwrap_err();

        assert_eq!(err.class, ErrorClass::InvalidInput);
        assert_eq!(err.origin, ErrorOrigin::Config);
    }

    #[test]
    fn overrides_replace_database_path() {
        let config = SessionConfig::default().with_overrides(|key| {
            (key == DATABASE_PATH_ENV).then(|| "override.db".to_string())
        });

        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("override.db"))
        );

        let untouched = SessionConfig::default().with_overrides(|_| Some(String::new()));
        assert!(untouched.database.path.is_none());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = SessionConfig::load("/nonexistent/critql.toml").unwrap_err();

        assert_eq!(err.origin, ErrorOrigin::Config);
    }
}
