//! Short surrogate keys for locations and values.

use crate::error::QueryError;
use serde::Serialize;
use std::collections::HashMap;

/// Hands out dense numeric keys for `(namespace, content)` pairs. A pair seen before
/// gets its earlier key back; a new pair gets the next number, starting at `1`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurrogateKeyGenerator {
    key_map: HashMap<String, String>,
    next_key: u64,
}

impl SurrogateKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn starting_at(next_key: u64) -> Self {
        Self {
            key_map: HashMap::new(),
            next_key,
        }
    }

    pub fn get_key(&mut self, namespace: &str, content: &str) -> Result<String, QueryError> {
        let composite = format!("{}:{}", namespace, content);
        if let Some(key) = self.key_map.get(&composite) {
            return Ok(key.clone());
        }
        let next = self
            .next_key
            .checked_add(1)
            .ok_or_else(|| QueryError::KeySpaceExhausted {
                namespace: namespace.to_string(),
            })?;
        self.next_key = next;
        let key = next.to_string();
        log::trace!("New surrogate key {} for '{}'", key, composite);
        self.key_map.insert(composite, key.clone());
        Ok(key)
    }

    /// The number of distinct pairs seen so far.
    pub fn len(&self) -> usize {
        self.key_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_map.is_empty()
    }

    /// The key already assigned to a pair, without assigning one.
    pub fn lookup(&self, namespace: &str, content: &str) -> Option<&str> {
        self.key_map
            .get(&format!("{}:{}", namespace, content))
            .map(String::as_str)
    }
}

/// The two independent key spaces a processor uses: one for cells keyed by
/// location and one for cells keyed by value.
#[derive(Debug, Default, Clone, Serialize)]
pub struct KeySpaces {
    pub location: SurrogateKeyGenerator,
    pub value: SurrogateKeyGenerator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_dense_and_stable() {
        let mut keys = SurrogateKeyGenerator::new();
        assert_eq!(keys.get_key("src", "a").unwrap(), "1");
        assert_eq!(keys.get_key("src", "b").unwrap(), "2");
        assert_eq!(keys.get_key("src", "a").unwrap(), "1");
        assert_eq!(keys.get_key("src", "c").unwrap(), "3");
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.lookup("src", "b"), Some("2"));
        assert_eq!(keys.lookup("src", "z"), None);
    }

    #[test]
    fn test_namespace_is_part_of_the_key() {
        let mut keys = SurrogateKeyGenerator::new();
        assert_eq!(keys.get_key("one", "x").unwrap(), "1");
        assert_eq!(keys.get_key("two", "x").unwrap(), "2");
    }

    #[test]
    fn test_key_spaces_are_independent() {
        let mut spaces = KeySpaces::default();
        assert_eq!(spaces.location.get_key("src", "/r/a[1]").unwrap(), "1");
        assert_eq!(spaces.value.get_key("src", "/r/a[1]").unwrap(), "1");
        assert_eq!(spaces.value.get_key("src", "7").unwrap(), "2");
        assert_eq!(spaces.location.len(), 1);
    }

    #[test]
    fn test_exhaustion() {
        let mut keys = SurrogateKeyGenerator::starting_at(u64::MAX - 1);
        assert_eq!(keys.get_key("src", "last").unwrap(), u64::MAX.to_string());
        // Known pairs still resolve once the counter is spent.
        assert_eq!(keys.get_key("src", "last").unwrap(), u64::MAX.to_string());
        let err = keys.get_key("src", "overflow").unwrap_err();
        assert!(matches!(err, QueryError::KeySpaceExhausted { namespace } if namespace == "src"));
    }
}
