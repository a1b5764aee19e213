//! Typed ID wrappers for the store-assigned integer identifiers.
//!
//! Both relational tables hand out positive `INTEGER PRIMARY KEY` values.
//! The newtypes keep a recipe id from being passed where a category id is
//! expected, and centralise parsing of ids arriving as path segments.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw integer value.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            /// Accepts a positive decimal integer and nothing else.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let invalid = || Error::validation(format!("Invalid {} ID: {:?}", $entity, s));
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                match s.parse::<i64>() {
                    Ok(n) if n > 0 => Ok(Self(n)),
                    _ => Err(invalid()),
                }
            }
        }
    };
}

integer_id!(
    /// Identifier of a recipe row.
    RecipeId,
    "recipe"
);

integer_id!(
    /// Identifier of a category row.
    CategoryId,
    "category"
);
