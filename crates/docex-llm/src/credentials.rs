//! API credential resolution
//!
//! Keys are read from a named environment variable at startup and never
//! printed: `Debug` is redacted.

use std::fmt;

/// Bearer credential for authenticating to a model service
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Wrap an explicit key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Resolve a key from the named environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// The raw key, for building an `Authorization` header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = ApiCredential::new("sk-secret");
        assert_eq!(format!("{:?}", cred), "ApiCredential(***)");
        assert_eq!(cred.expose(), "sk-secret");
    }

    #[test]
    fn test_missing_env_var_is_none() {
        assert!(ApiCredential::from_env("DOCEX_TEST_CREDENTIAL_THAT_IS_NEVER_SET").is_none());
    }
}
