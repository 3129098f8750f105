//! Closed Rank Enumeration
//!
//! The fixed set of competitive tiers, ordered low to high. Parsing is
//! total: names outside the enumeration map to [`Rank::Unranked`], which is
//! also how absent values are treated everywhere downstream.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Competitive rank, ordered low to high.
///
/// `Unranked` and `Radiant` are the saturating endpoints: neither carries
/// divisions, and each resolves to a single fixed tier id regardless of any
/// division input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Default)]
#[repr(u8)]
pub enum Rank {
    /// No placement yet. The universal fallback.
    #[default]
    Unranked = 0,
    /// Lowest placed tier.
    Iron = 1,
    /// Bronze tier.
    Bronze = 2,
    /// Silver tier.
    Silver = 3,
    /// Gold tier.
    Gold = 4,
    /// Platinum tier.
    Platinum = 5,
    /// Diamond tier.
    Diamond = 6,
    /// Ascendant tier.
    Ascendant = 7,
    /// Second-highest tier.
    Immortal = 8,
    /// Highest tier. No divisions.
    Radiant = 9,
}

impl Rank {
    /// All ranks in display order, low to high.
    pub const ALL: [Rank; 10] = [
        Rank::Unranked,
        Rank::Iron,
        Rank::Bronze,
        Rank::Silver,
        Rank::Gold,
        Rank::Platinum,
        Rank::Diamond,
        Rank::Ascendant,
        Rank::Immortal,
        Rank::Radiant,
    ];

    /// Canonical name, as stored and displayed.
    pub const fn name(self) -> &'static str {
        match self {
            Rank::Unranked => "Unranked",
            Rank::Iron => "Iron",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
            Rank::Ascendant => "Ascendant",
            Rank::Immortal => "Immortal",
            Rank::Radiant => "Radiant",
        }
    }

    /// Parse a canonical rank name. Total: unrecognized names fall back to
    /// `Unranked` rather than failing.
    pub fn from_name(name: &str) -> Rank {
        match name {
            "Iron" => Rank::Iron,
            "Bronze" => Rank::Bronze,
            "Silver" => Rank::Silver,
            "Gold" => Rank::Gold,
            "Platinum" => Rank::Platinum,
            "Diamond" => Rank::Diamond,
            "Ascendant" => Rank::Ascendant,
            "Immortal" => Rank::Immortal,
            "Radiant" => Rank::Radiant,
            _ => Rank::Unranked,
        }
    }

    /// Whether this rank carries divisions 1-3.
    ///
    /// False exactly for the two endpoints; division values on those ranks
    /// are ignored, never an error.
    #[inline]
    pub const fn has_divisions(self) -> bool {
        !matches!(self, Rank::Unranked | Rank::Radiant)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Rank {
    // Lenient on purpose: rank values arrive from an external store and an
    // unknown name must degrade to Unranked, not reject the record.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Rank::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Unranked < Rank::Iron);
        assert!(Rank::Iron < Rank::Bronze);
        assert!(Rank::Immortal < Rank::Radiant);
    }

    #[test]
    fn test_name_round_trip() {
        for rank in Rank::ALL {
            assert_eq!(Rank::from_name(rank.name()), rank);
        }
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Rank::from_name("NotARealRank"), Rank::Unranked);
        assert_eq!(Rank::from_name(""), Rank::Unranked);
        // Case-sensitive match on canonical names
        assert_eq!(Rank::from_name("gold"), Rank::Unranked);
    }

    #[test]
    fn test_has_divisions() {
        assert!(!Rank::Unranked.has_divisions());
        assert!(!Rank::Radiant.has_divisions());
        for rank in [
            Rank::Iron,
            Rank::Bronze,
            Rank::Silver,
            Rank::Gold,
            Rank::Platinum,
            Rank::Diamond,
            Rank::Ascendant,
            Rank::Immortal,
        ] {
            assert!(rank.has_divisions(), "{rank} should carry divisions");
        }
    }

    #[test]
    fn test_serde_lenient() {
        let gold: Rank = serde_json::from_str("\"Gold\"").unwrap();
        assert_eq!(gold, Rank::Gold);

        let unknown: Rank = serde_json::from_str("\"Mythril\"").unwrap();
        assert_eq!(unknown, Rank::Unranked);

        assert_eq!(serde_json::to_string(&Rank::Radiant).unwrap(), "\"Radiant\"");
    }
}
