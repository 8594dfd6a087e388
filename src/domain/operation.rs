//! Rate-limit keys: which operation, performed by whom.

use std::borrow::Cow;
use std::fmt;

/// Kind of operation being throttled.
///
/// The three built-in kinds have stock limits (see `WindowConfig`);
/// `Custom` kinds use whatever the limiter was configured with, or its
/// default window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    /// Starting a checkout session
    Checkout,
    /// Sign-in, sign-up and password flows
    Auth,
    /// Generic backend API calls
    Api,
    /// Application-defined operation
    Custom(Cow<'static, str>),
}

impl OperationKind {
    /// Create a custom operation kind.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        OperationKind::Custom(name.into())
    }

    /// Stable name used in composed keys and logs.
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Checkout => "checkout",
            OperationKind::Auth => "auth",
            OperationKind::Api => "api",
            OperationKind::Custom(name) => name,
        }
    }

    /// Parse a configuration name. Unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "checkout" => OperationKind::Checkout,
            "auth" => OperationKind::Auth,
            "api" => OperationKind::Api,
            other => OperationKind::Custom(Cow::Owned(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key identifying one rate-limit record: an operation kind plus a caller.
///
/// # Example
/// ```
/// use client_governance::{OperationKind, RateLimitKey};
///
/// let key = RateLimitKey::new(OperationKind::Checkout, "user-42");
/// assert_eq!(key.to_string(), "checkout:user-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    operation: OperationKind,
    caller: String,
}

impl RateLimitKey {
    /// Compose a key from an operation kind and a caller identifier.
    pub fn new(operation: OperationKind, caller: impl Into<String>) -> Self {
        Self {
            operation,
            caller: caller.into(),
        }
    }

    /// Shorthand for a checkout key.
    pub fn checkout(caller: impl Into<String>) -> Self {
        Self::new(OperationKind::Checkout, caller)
    }

    /// Shorthand for an authentication key.
    pub fn auth(caller: impl Into<String>) -> Self {
        Self::new(OperationKind::Auth, caller)
    }

    /// Shorthand for a generic API key.
    pub fn api(caller: impl Into<String>) -> Self {
        Self::new(OperationKind::Api, caller)
    }

    /// The operation kind.
    pub fn operation(&self) -> &OperationKind {
        &self.operation
    }

    /// The caller identifier.
    pub fn caller(&self) -> &str {
        &self.caller
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_operation_names_round_trip() {
        for kind in [
            OperationKind::Checkout,
            OperationKind::Auth,
            OperationKind::Api,
            OperationKind::custom("export"),
        ] {
            assert_eq!(OperationKind::from_name(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_keys_differ_by_operation_and_caller() {
        let keys: HashSet<_> = [
            RateLimitKey::checkout("alice"),
            RateLimitKey::auth("alice"),
            RateLimitKey::checkout("bob"),
            RateLimitKey::checkout("alice"),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_custom_and_builtin_do_not_collide() {
        // A custom kind spelled like a built-in is still parsed to the built-in
        assert_eq!(OperationKind::from_name("auth"), OperationKind::Auth);
        assert_ne!(OperationKind::custom("auth"), OperationKind::Auth);
    }

    #[test]
    fn test_display() {
        assert_eq!(RateLimitKey::api("10.0.0.1").to_string(), "api:10.0.0.1");
        assert_eq!(
            RateLimitKey::new(OperationKind::custom("export"), "u1").to_string(),
            "export:u1"
        );
    }
}
