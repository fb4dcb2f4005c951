//! Raw key lister port

/// Source of raw storage keys (file paths, object keys, blob names)
pub trait KeyLister: Send + Sync {
    /// List every key currently under `prefix`
    ///
    /// The listing is total: no pagination state is carried between calls.
    /// Keys are returned in full, prefix included, in whatever order the
    /// backend produces.
    fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>>;
}
