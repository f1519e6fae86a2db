//! Session storage abstraction

/// A keyed session store holding one JSON bucket per grid hash.
///
/// Methods take `&self`; implementations carry their own interior
/// mutability, matching how framework session handles behave. The grid
/// treats each call as atomic and performs no locking of its own.
pub trait SessionStorage {
    /// Returns the value stored under the given key.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores a value under the given key.
    fn set(&self, key: &str, value: serde_json::Value);

    /// Removes the value stored under the given key.
    fn remove(&self, key: &str);
}
