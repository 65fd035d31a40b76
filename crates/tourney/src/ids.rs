//! Identifier newtypes shared by every record kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random identifier carrying the record kind as a prefix.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::new_v4().simple()))
            }

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
    };
}

record_id!(
    /// Tournament identifiers come from the tournament catalog and are never generated here.
    TournamentId,
    "trn"
);
record_id!(TeamId, "team");
record_id!(PlayerId, "player");
record_id!(ApplicationId, "app");
record_id!(RosterId, "roster");
record_id!(DivisionId, "div");
record_id!(MatchId, "match");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let first = DivisionId::generate();
        let second = DivisionId::generate();
        assert!(first.as_str().starts_with("div-"));
        assert_ne!(first, second);
    }

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = TeamId::from("T1");
        assert_eq!(serde_json::to_value(&id).expect("serialize"), "T1");
    }
}
