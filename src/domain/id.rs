//! Task identifiers
//!
//! IDs are opaque strings owned by whatever store supplies the tasks.
//! The only rule enforced here is that an ID is non-empty once trimmed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID: must not be empty")]
    Empty,

    #[error("Invalid task ID '{0}': must not contain whitespace")]
    Whitespace(String),
}

/// Identifier of a task, unique within a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for TaskId {
    type Error = IdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_input() {
        let id: TaskId = "  design-api ".parse().unwrap();
        assert_eq!(id.as_str(), "design-api");
        assert_eq!(id.to_string(), "design-api");
    }

    #[test]
    fn empty_id_rejected() {
        assert_eq!("".parse::<TaskId>(), Err(IdError::Empty));
        assert_eq!("   ".parse::<TaskId>(), Err(IdError::Empty));
    }

    #[test]
    fn inner_whitespace_rejected() {
        assert!(matches!(
            "two words".parse::<TaskId>(),
            Err(IdError::Whitespace(_))
        ));
    }

    #[test]
    fn serde_as_plain_string() {
        let id: TaskId = "t-1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""t-1""#);

        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<TaskId>(r#""""#).is_err());
    }
}
