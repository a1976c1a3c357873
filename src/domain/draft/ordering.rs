//! Sibling ordering policy for draft mutations.

use serde::Serialize;
use std::str::FromStr;

/// How sibling `order` values are maintained after structural edits.
///
/// - `Preserve` keeps the values assigned at creation time. Deleting a node
///   leaves a gap and a later add may duplicate an existing value.
/// - `Renumber` rewrites siblings to `0..n` after every add or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    #[default]
    Preserve,
    Renumber,
}

impl OrderingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingPolicy::Preserve => "preserve",
            OrderingPolicy::Renumber => "renumber",
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(OrderingPolicy::Preserve),
            "renumber" => Ok(OrderingPolicy::Renumber),
            other => Err(format!(
                "ORDERING_POLICY must be 'preserve' or 'renumber', got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("preserve".parse(), Ok(OrderingPolicy::Preserve));
        assert_eq!("RENUMBER".parse(), Ok(OrderingPolicy::Renumber));
        assert!("sparse".parse::<OrderingPolicy>().is_err());
        assert_eq!(OrderingPolicy::default(), OrderingPolicy::Preserve);
    }
}
