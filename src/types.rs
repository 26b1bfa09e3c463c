//! Core types for the card ledger.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A person holding cards and subscribing to research.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
    pub hash: String,
}

/// A clinic or other organisation issuing cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
}

/// A card owned by a user and issued by a company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "companyID")]
    pub company_id: String,
    pub name: String,
}

/// One entry on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardItem {
    #[serde(rename = "cardID")]
    pub card_id: String,
    pub key: String,
    pub value: String,
    /// Wire name keeps the historical spelling.
    #[serde(rename = "aditionalData")]
    pub additional_data: String,
    pub date: String,
}

/// A research programme users can subscribe to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
    pub name: String,
    pub status: String,
    pub date_from: String,
    pub date_to: String,
}

/// A user's subscription to a research programme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchUser {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "researchID")]
    pub research_id: String,
}

/// SHA-256 digest over a sequence of string fields.
///
/// Fields are length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    pub fn of_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for field in fields {
            let field = field.as_ref();
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Digest32(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight bytes as a big-endian integer.
    pub fn leading_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(bytes)
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Identifier of one invocation, derived from its function name and arguments.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub Digest32);

impl TxId {
    pub fn for_invocation(function: &str, args: &[String]) -> Self {
        TxId(Digest32::of_fields(
            std::iter::once(function).chain(args.iter().map(String::as_str)),
        ))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}...)", &self.0.to_hex()[..8])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
