//! Member directory
//!
//! The public profile table (`id`, `username`, `phone_number`). The ledger
//! uses it to recognise identities and to label counterparties.

use crate::types::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendered when a member has no phone number
pub const MISSING_PHONE: &str = "—";

/// Public profile of a group member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member ID
    pub id: MemberId,

    /// Display name
    pub username: String,

    /// Phone number as stored (digits, leading zero dropped). The hosted
    /// column is numeric, so a JSON number is accepted too.
    #[serde(default, deserialize_with = "phone::deserialize")]
    pub phone_number: Option<String>,
}

impl Member {
    /// Create a member without phone number
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            username: username.into(),
            phone_number: None,
        }
    }

    /// Set phone number
    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Phone number formatted for display
    pub fn formatted_phone(&self) -> String {
        format_phone_number(self.phone_number.as_deref())
    }
}

/// Snapshot of the member directory
#[derive(Debug, Clone, Default)]
pub struct Directory {
    members: BTreeMap<MemberId, Member>,
}

impl Directory {
    /// Build from a member listing. Later duplicates replace earlier ones.
    pub fn new(members: impl IntoIterator<Item = Member>) -> Self {
        Self {
            members: members.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    /// Whether `id` is a known member
    pub fn contains(&self, id: &MemberId) -> bool {
        self.members.contains_key(id)
    }

    /// Look up a member
    pub fn get(&self, id: &MemberId) -> Option<&Member> {
        self.members.get(id)
    }

    /// Username of `id`, if known
    pub fn username_of(&self, id: &MemberId) -> Option<&str> {
        self.members.get(id).map(|m| m.username.as_str())
    }

    /// Everyone except `me`, sorted by username
    pub fn others<'a>(&'a self, me: &MemberId) -> Vec<&'a Member> {
        let mut others: Vec<_> = self.members.values().filter(|m| &m.id != me).collect();
        others.sort_by(|a, b| a.username.cmp(&b.username));
        others
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// No members at all
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Format a stored phone number for display.
///
/// Whitespace is stripped, the leading zero the store drops is restored and
/// digits are grouped by two: `"612345678"` → `"06 12 34 56 78"`.
pub fn format_phone_number(raw: Option<&str>) -> String {
    let digits: String = match raw {
        Some(raw) => raw.chars().filter(|c| !c.is_whitespace()).collect(),
        None => return MISSING_PHONE.to_string(),
    };

    if digits.is_empty() {
        return MISSING_PHONE.to_string();
    }

    let full: Vec<char> = std::iter::once('0').chain(digits.chars()).collect();
    full.chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

mod phone {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        }))
    }
}
