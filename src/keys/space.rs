//! Typed key spaces and relation index names.

use crate::error::{ContractError, Result};
use crate::keys::codec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity kinds and the simple-key prefix each one owns.
///
/// A key belongs to a space when it starts with the prefix and the next
/// character is an ASCII digit, so `CARDITEM7` never reads as a `CARD` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpace {
    User,
    Company,
    Card,
    CardItem,
    Research,
    ResearchUser,
}

impl KeySpace {
    pub fn prefix(self) -> &'static str {
        match self {
            KeySpace::User => "USER",
            KeySpace::Company => "COMPANY",
            KeySpace::Card => "CARD",
            KeySpace::CardItem => "CARDITEM",
            KeySpace::Research => "RESEARCH",
            KeySpace::ResearchUser => "RESEARCHUSER",
        }
    }

    /// Key for a numeric id, e.g. `KeySpace::Card.key(3) == "CARD3"`.
    pub fn key(self, id: u64) -> String {
        format!("{}{}", self.prefix(), id)
    }

    /// Whether `key` lives in this space.
    pub fn owns(self, key: &str) -> bool {
        key.strip_prefix(self.prefix())
            .and_then(|rest| rest.chars().next())
            .map_or(false, |c| c.is_ascii_digit())
    }

    /// Validate a caller-supplied key for this space.
    ///
    /// Keys are also checked against the composite-key reserved code points,
    /// since record keys end up as index parts.
    pub fn check<'k>(self, key: &'k str) -> Result<&'k str> {
        if !self.owns(key) {
            return Err(ContractError::InvalidArgument(format!(
                "{:?} is not a {} key (expected {}<digits...>)",
                key,
                self,
                self.prefix()
            )));
        }
        codec::validate_part(key)?;
        Ok(key)
    }

    /// Scan bounds `[PREFIX0, PREFIX:)` covering every key of the space.
    pub fn range(self) -> (String, String) {
        (
            format!("{}0", self.prefix()),
            format!("{}:", self.prefix()),
        )
    }
}

impl fmt::Display for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeySpace::User => "user",
            KeySpace::Company => "company",
            KeySpace::Card => "card",
            KeySpace::CardItem => "card item",
            KeySpace::Research => "research",
            KeySpace::ResearchUser => "research subscription",
        };
        f.write_str(name)
    }
}

/// Relationship indexes maintained through composite keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationIndex {
    /// card id -> card item ids
    CardItemByCard,
    /// user id -> card ids
    CardByUser,
    /// research id -> subscription ids
    SubscriptionByResearch,
}

impl RelationIndex {
    pub fn name(self) -> &'static str {
        match self {
            RelationIndex::CardItemByCard => "carditem~card",
            RelationIndex::CardByUser => "card~user",
            RelationIndex::SubscriptionByResearch => "researchuser~research",
        }
    }
}

impl fmt::Display for RelationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
