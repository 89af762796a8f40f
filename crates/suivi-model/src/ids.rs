//! Identifier newtypes
//!
//! The API is loose about identifier types: the same field may come back as
//! `"12"` from one endpoint and `12` from another. Every identifier is
//! normalized to its string form at decode time so that joins between
//! endpoints compare like with like.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Accepts a JSON string or number and yields its string form.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s.trim().to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like
            #[inline]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the string form
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                StringOrNumber::deserialize(deserializer).map(|v| Self(v.into_string()))
            }
        }
    };
}

string_id! {
    /// Project reference (`ref_projet`)
    ProjectRef
}

string_id! {
    /// Phase definition identifier (`id_phase`)
    PhaseId
}

string_id! {
    /// Employee number identifying a user (`matricule`)
    Matricule
}

string_id! {
    /// Access-controlled module identifier (`id_module`)
    ModuleId
}

/// Deserialize a count that may arrive as a number or a numeric string.
///
/// Negative or unparsable values are rejected so the enclosing record is
/// treated as malformed.
pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    use serde::de::Error;

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Int(n) => u32::try_from(n).map_err(D::Error::custom),
        StringOrNumber::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
            Ok(f as u32)
        }
        StringOrNumber::Float(f) => Err(D::Error::custom(format!("invalid count: {f}"))),
        StringOrNumber::Str(s) => s.trim().parse::<u32>().map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let a: PhaseId = serde_json::from_str("3").unwrap();
        let b: PhaseId = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "3");
    }

    #[test]
    fn string_ids_are_trimmed() {
        let r: ProjectRef = serde_json::from_str("\" P1 \"").unwrap();
        assert_eq!(r, ProjectRef::from("P1"));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let m = Matricule::new("M042");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"M042\"");
    }

    #[derive(Deserialize)]
    struct Counted {
        #[serde(deserialize_with = "count")]
        n: u32,
    }

    #[test]
    fn counts_accept_numeric_strings() {
        let c: Counted = serde_json::from_str(r#"{"n":"7"}"#).unwrap();
        assert_eq!(c.n, 7);
        let c: Counted = serde_json::from_str(r#"{"n":4}"#).unwrap();
        assert_eq!(c.n, 4);
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(serde_json::from_str::<Counted>(r#"{"n":-1}"#).is_err());
        assert!(serde_json::from_str::<Counted>(r#"{"n":"abc"}"#).is_err());
    }
}
