//! Hub entity identifiers (`domain.object_id`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Separator between the domain and the object id.
const SEPARATOR: char = '.';

/// Identifier of a hub entity, e.g. `light.kitchen`.
///
/// Always holds a non-empty domain and a non-empty object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Validate and wrap an entity id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyEntityId`] for an empty string and
    /// [`ValidationError::MalformedEntityId`] when the domain or object id is
    /// missing.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyEntityId);
        }
        match value.split_once(SEPARATOR) {
            Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => {
                Ok(Self(value))
            }
            _ => Err(ValidationError::MalformedEntityId(value)),
        }
    }

    /// Entity type prefix before the first separator (`light`, `switch`, …).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once(SEPARATOR).map_or(&self.0, |(domain, _)| domain)
    }

    /// Everything after the first separator.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once(SEPARATOR).map_or("", |(_, object_id)| object_id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
