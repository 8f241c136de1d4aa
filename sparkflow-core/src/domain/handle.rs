//! Opaque resource identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Returned when an identifier is empty or only whitespace
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} identifier cannot be empty")]
pub struct InvalidHandle {
    pub kind: &'static str,
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a handle, rejecting blank identifiers
            pub fn new(id: impl Into<String>) -> Result<Self, InvalidHandle> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(InvalidHandle { kind: $kind });
                }
                Ok(Self(id))
            }

            /// Returns the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidHandle;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = InvalidHandle;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }
    };
}

handle_type!(
    /// Identifier of a provisioned cluster
    ///
    /// Returned by cluster creation and passed by reference to every later
    /// call that touches the cluster. Never mutated.
    ClusterHandle,
    "cluster"
);

handle_type!(
    /// Identifier of a step submitted to a cluster
    StepHandle,
    "step"
);
