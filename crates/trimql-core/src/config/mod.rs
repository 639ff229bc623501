//! Projection configuration.
//!
//! Loaded from the `[projection]` table of a TOML document; every key is
//! optional and falls back to [`ProjectionConfig::default`].


use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid projection config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("projection config key '{key}' {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Schema, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ProjectionConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Argument name carrying a list field's filter literal.
    pub filter_argument: String,

    /// Field of a connection type that holds the page's nodes.
    pub nodes_field: String,

    /// Deepest nesting of list properties accepted; `None` is unbounded.
    pub max_depth: Option<usize>,

    /// Reuse compiled projections across requests with identical trees.
    pub cache: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            filter_argument: "where".to_string(),
            nodes_field: "nodes".to_string(),
            max_depth: None,
            cache: false,
        }
    }
}

impl ProjectionConfig {
    /// Parse the `[projection]` table out of a TOML document.
    /// Other top-level tables are ignored.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            projection: ProjectionConfig,
        }

        let document: Document = toml::from_str(source)?;
        document.projection.validate()?;

        Ok(document.projection)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_argument.is_empty() {
            return Err(ConfigError::Invalid {
                key: "filter_argument",
                reason: "must not be empty",
            });
        }
        if self.nodes_field.is_empty() {
            return Err(ConfigError::Invalid {
                key: "nodes_field",
                reason: "must not be empty",
            });
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::Invalid {
                key: "max_depth",
                reason: "must be at least 1",
            });
        }

        Ok(())
    }
}
