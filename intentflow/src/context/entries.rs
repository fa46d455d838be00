//! Thread-safe entry bag with key-ownership enforcement.

use crate::errors::KeyConflictError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// The key/value store threaded through one workflow run.
///
/// Keys are unique per context. A plain write to an existing key is a
/// conflict; overwriting requires the writer to declare ownership via
/// [`EntryBag::set_owned`]. Insertion order is tracked for diagnostics
/// only and carries no correctness weight.
#[derive(Debug, Default)]
pub struct EntryBag {
    inner: RwLock<EntryBagInner>,
}

#[derive(Debug, Default)]
struct EntryBagInner {
    data: HashMap<String, serde_json::Value>,
    insertion_order: Vec<String>,
}

impl EntryBag {
    /// Creates a new empty entry bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entry bag seeded with initial inputs.
    #[must_use]
    pub fn from_initial(initial: HashMap<String, serde_json::Value>) -> Self {
        let bag = Self::new();
        {
            let mut inner = bag.inner.write();
            for (key, value) in initial {
                if !inner.data.contains_key(&key) {
                    inner.insertion_order.push(key.clone());
                }
                inner.data.insert(key, value);
            }
        }
        bag
    }

    /// Gets a value from the bag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.read().data.get(key).cloned()
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().data.contains_key(key)
    }

    /// Writes a value on behalf of a stage.
    ///
    /// # Errors
    ///
    /// Returns `KeyConflictError` if the key already exists.
    pub fn set(
        &self,
        stage: &str,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), KeyConflictError> {
        let key = key.into();
        let mut inner = self.inner.write();

        if inner.data.contains_key(&key) {
            return Err(KeyConflictError::new(stage, key));
        }

        inner.insertion_order.push(key.clone());
        inner.data.insert(key, value);
        Ok(())
    }

    /// Writes a value for a key the stage has declared ownership of,
    /// overwriting any existing entry.
    pub fn set_owned(&self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        let mut inner = self.inner.write();
        if !inner.data.contains_key(&key) {
            inner.insertion_order.push(key.clone());
        }
        inner.data.insert(key, value);
    }

    /// Returns a copy of all entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, serde_json::Value> {
        self.inner.read().data.clone()
    }

    /// Returns all keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().insertion_order.clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let bag = EntryBag::new();
        bag.set("clone-repository", "repo_path", serde_json::json!("/tmp/r"))
            .unwrap();

        assert_eq!(bag.get("repo_path"), Some(serde_json::json!("/tmp/r")));
        assert!(bag.contains_key("repo_path"));
        assert!(!bag.contains_key("other"));
    }

    #[test]
    fn test_conflict_on_existing_key() {
        let bag = EntryBag::new();
        bag.set("a", "key", serde_json::json!(1)).unwrap();

        let err = bag.set("b", "key", serde_json::json!(2)).unwrap_err();
        assert_eq!(err.stage, "b");
        assert_eq!(err.key, "key");
        // Original value untouched.
        assert_eq!(bag.get("key"), Some(serde_json::json!(1)));
    }

    #[test]
    fn test_owned_overwrite() {
        let bag = EntryBag::new();
        bag.set("a", "key", serde_json::json!(1)).unwrap();
        bag.set_owned("key", serde_json::json!(2));

        assert_eq!(bag.get("key"), Some(serde_json::json!(2)));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let bag = EntryBag::new();
        bag.set("s", "first", serde_json::json!(1)).unwrap();
        bag.set("s", "second", serde_json::json!(2)).unwrap();
        bag.set_owned("first", serde_json::json!(3));

        assert_eq!(bag.keys(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_from_initial() {
        let mut initial = HashMap::new();
        initial.insert("repository_url".to_string(), serde_json::json!("https://x"));

        let bag = EntryBag::from_initial(initial);
        assert_eq!(bag.len(), 1);
        assert!(bag.contains_key("repository_url"));
    }
}
