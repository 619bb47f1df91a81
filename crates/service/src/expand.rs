//! Relationship expansion requested through `?expand=a,b`.

use std::collections::BTreeSet;

use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion(BTreeSet<String>);

impl Expansion {
    pub fn none() -> Self { Self::default() }

    /// Parse a comma separated list, rejecting keys not in `allowed`.
    pub fn parse(raw: Option<&str>, allowed: &[&str]) -> Result<Self, ServiceError> {
        let mut keys = BTreeSet::new();
        for key in raw.unwrap_or_default().split(',').map(str::trim).filter(|k| !k.is_empty()) {
            if !allowed.contains(&key) {
                let reason = if allowed.is_empty() {
                    format!("unknown expansion '{key}'; nothing can be expanded here")
                } else {
                    format!("unknown expansion '{key}'; allowed: {}", allowed.join(", "))
                };
                return Err(ServiceError::invalid("expand", reason));
            }
            keys.insert(key.to_string());
        }
        Ok(Self(keys))
    }

    pub fn has(&self, key: &str) -> bool { self.0.contains(key) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
