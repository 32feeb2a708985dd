//! Censoring classes and their pseudonym shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class of sensitive value, which fixes the pseudonym prefix and length.
///
/// Profiles tag columns with one of these. Several historical tag names map
/// onto the identifier class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensorKind {
    /// Customer, dealer and other opaque identifiers.
    #[serde(alias = "customer_id", alias = "dealer_code", alias = "dealer")]
    Identifier,
    /// Street addresses.
    Address,
}

impl CensorKind {
    pub const ALL: [CensorKind; 2] = [CensorKind::Identifier, CensorKind::Address];

    /// Prefix prepended to every pseudonym of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            CensorKind::Identifier => "DEALER_",
            CensorKind::Address => "ADDR_",
        }
    }

    /// Number of hex digest characters kept.
    pub fn digest_len(&self) -> usize {
        match self {
            CensorKind::Identifier => 6,
            CensorKind::Address => 8,
        }
    }

    /// Parse a profile tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "identifier" | "customer_id" | "dealer_code" | "dealer" => Some(CensorKind::Identifier),
            "address" => Some(CensorKind::Address),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CensorKind::Identifier => "identifier",
            CensorKind::Address => "address",
        }
    }
}

impl fmt::Display for CensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(CensorKind::from_tag("customer_id"), Some(CensorKind::Identifier));
        assert_eq!(CensorKind::from_tag("Address"), Some(CensorKind::Address));
        assert_eq!(CensorKind::from_tag("vin"), None);
    }

    #[test]
    fn test_serde_aliases() {
        let kind: CensorKind = serde_json::from_str("\"dealer_code\"").unwrap();
        assert_eq!(kind, CensorKind::Identifier);
        assert!(serde_json::from_str::<CensorKind>("\"ssn\"").is_err());
    }
}
