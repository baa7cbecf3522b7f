//! Namespaced identifiers (`namespace:path`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an identifier fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier '{0}' is missing a ':' separator")]
    MissingSeparator(String),
    #[error("invalid namespace '{namespace}' in '{id}': use only [a-z0-9_.-]")]
    InvalidNamespace { id: String, namespace: String },
    #[error("invalid path '{path}' in '{id}': use only [a-z0-9_./-]")]
    InvalidPath { id: String, path: String },
}

/// A namespaced identifier such as `demo:torch`.
///
/// Entries are declared by path; the owning registrar supplies the namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    namespace: String,
    path: String,
}

impl ResourceId {
    /// Create an identifier from a namespace and a path, validating both.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, IdError> {
        let namespace = namespace.into();
        let path = path.into();

        if namespace.is_empty() || !namespace.chars().all(is_namespace_char) {
            return Err(IdError::InvalidNamespace {
                id: format!("{namespace}:{path}"),
                namespace,
            });
        }
        if path.is_empty() || !path.chars().all(is_path_char) {
            return Err(IdError::InvalidPath {
                id: format!("{namespace}:{path}"),
                path,
            });
        }

        Ok(Self { namespace, path })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Translation-key form, e.g. `block.demo.torch` for prefix `block`.
    pub fn translation_key(&self, prefix: &str) -> String {
        format!(
            "{}.{}.{}",
            prefix,
            self.namespace,
            self.path.replace('/', ".")
        )
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| IdError::MissingSeparator(s.to_string()))?;
        Self::new(namespace, path)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}
