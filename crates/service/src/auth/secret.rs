/// Compares a presented secret with a stored opaque hash. The hashing scheme
/// belongs to the identity collaborator.
pub trait SecretMatcher: Send + Sync {
    fn matches(&self, presented: &str, stored_hash: &str) -> bool;
}

/// Simple in-memory matcher for tests and doc examples
pub mod mock {
    use super::SecretMatcher;

    /// Treats the stored hash as `plain:<secret>`.
    #[derive(Default)]
    pub struct PlainSecretMatcher;

    impl SecretMatcher for PlainSecretMatcher {
        fn matches(&self, presented: &str, stored_hash: &str) -> bool {
            stored_hash.strip_prefix("plain:") == Some(presented)
        }
    }
}
