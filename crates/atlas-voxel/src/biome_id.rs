//! Biome identifiers carried by chunks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A namespaced biome name such as `"atlas:plains"`.
///
/// Cloning shares the underlying string, so grids of biome ids stay cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeId(Arc<str>);

impl BiomeId {
    /// Creates an id from any string-like value.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BiomeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BiomeId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl PartialEq<str> for BiomeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for BiomeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compares_with_str() {
        let id = BiomeId::new("atlas:plains");
        assert_eq!(id, "atlas:plains");
        assert_eq!(id.to_string(), "atlas:plains");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = BiomeId::from("atlas:tundra");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"atlas:tundra\"");
        let back: BiomeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
