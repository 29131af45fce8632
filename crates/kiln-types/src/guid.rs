use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// A platform GUID.
///
/// GUIDs are random v4 UUIDs rendered in hyphenated lowercase form. A record's
/// GUID is the name of its backing store object, so it is only unique within
/// that object's namespace as far as the store is concerned.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Generate a fresh random GUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the GUID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the GUID, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Guid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Uuid::parse_str(s).map_err(|e| TypeError::InvalidGuid(format!("{s}: {e}")))?;
        Ok(Self(parsed.hyphenated().to_string()))
    }
}

impl From<Guid> for String {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self.0)
    }
}
