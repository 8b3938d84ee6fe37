//! Conversation identity map.
//!
//! Maps `chat_id` keys to human-readable contact labels. The on-disk format is
//! a flat YAML mapping:
//!
//! ```yaml
//! 12: Mom
//! 31: Dad
//! "chat4432": Book Club
//! ```
//!
//! Keys may be written as integers or strings; both are normalized to strings.
//! Any `chat_id` not present in the map resolves to [`DEFAULT_CONTACT`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{AmatError, ConfigErrorKind, Result};

/// Label for conversations missing from the identity map.
pub const DEFAULT_CONTACT: &str = "other";

/// Lookup table from conversation id to contact label.
///
/// # Example
///
/// ```
/// use amat::IdentityMap;
///
/// # fn main() -> amat::Result<()> {
/// let ids = IdentityMap::from_yaml_str("12: Mom\n31: Dad\n")?;
/// assert_eq!(ids.lookup("12"), "Mom");
/// assert_eq!(ids.lookup("99"), "other");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: BTreeMap<String, String>,
}

impl IdentityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping.
    ///
    /// An empty document yields an empty map. Anything other than a flat
    /// mapping of scalar keys to string labels is rejected.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| AmatError::config(e, None))?;

        let mapping = match doc {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(m) => m,
            other => {
                return Err(invalid_map(format!(
                    "expected a mapping of chat ids to names, found {}",
                    kind_of(&other)
                )));
            }
        };

        let mut entries = BTreeMap::new();
        for (key, value) in mapping {
            let key = scalar_key(&key).ok_or_else(|| {
                invalid_map(format!("chat id keys must be scalars, found {}", kind_of(&key)))
            })?;
            let label = match value {
                Value::String(s) => s,
                other => {
                    return Err(invalid_map(format!(
                        "label for chat id '{}' must be a string, found {}",
                        key,
                        kind_of(&other)
                    )));
                }
            };
            entries.insert(key, label);
        }

        Ok(Self { entries })
    }

    /// Reads and parses a YAML identity map file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AmatError::config(e, Some(path.to_path_buf())))?;
        let map = Self::from_yaml_str(&content).map_err(|e| e.with_path(path))?;
        tracing::debug!(path = %path.display(), entries = map.len(), "Loaded identity map");
        Ok(map)
    }

    /// Returns the label for `chat_id`, or [`DEFAULT_CONTACT`].
    pub fn lookup(&self, chat_id: &str) -> &str {
        self.get(chat_id).unwrap_or(DEFAULT_CONTACT)
    }

    /// Returns the label for `chat_id`, if mapped.
    pub fn get(&self, chat_id: &str) -> Option<&str> {
        self.entries.get(chat_id).map(String::as_str)
    }

    /// Adds or replaces a mapping.
    pub fn insert(&mut self, chat_id: impl Into<String>, label: impl Into<String>) {
        self.entries.insert(chat_id.into(), label.into());
    }

    /// Number of mapped conversations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn invalid_map(message: String) -> AmatError {
    AmatError::config(ConfigErrorKind::InvalidMap(message), None)
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
