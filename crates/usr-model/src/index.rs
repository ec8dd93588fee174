//! Token indices and entry identities
//!
//! [`TokenIndex`] is the positional key shared by all four layers.
//! [`EntryId`] is the stable identity of a token's entries, independent of
//! the index, so renames follow the entry rather than its position.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use ulid::Ulid;

/// Token or constituent position within a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenIndex(u32);

impl TokenIndex {
    /// Wrap a raw index
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The following index
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Display for TokenIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenIndex {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u32> for TokenIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Opaque identity shared by the entries describing one token
///
/// Identities coming from the external service may be numeric database keys
/// or strings; both are kept verbatim. Fresh identities are ULIDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh identity
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("new-{}", Ulid::new()))
    }

    /// Use an existing identity
    #[inline]
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Identity as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::generate()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match Option::<RawId>::deserialize(deserializer)? {
            Some(RawId::Number(n)) => Self(n.to_string()),
            Some(RawId::Text(s)) if !s.is_empty() => Self(s),
            _ => Self::generate(),
        })
    }
}

/// Serde helpers for the lenient JSON transport
///
/// The external service and hand-written uploads use `null`, `""` or a number
/// (sometimes quoted) for nullable references, and `""`/`"-"`/`null` for
/// unset enum fields.
pub mod lenient {
    use super::TokenIndex;
    use crate::vocab::normalize_unset;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRef {
        Number(u32),
        Text(String),
    }

    /// Deserialize a nullable token reference
    pub fn deserialize_target<'de, D>(deserializer: D) -> Result<Option<TokenIndex>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawRef>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawRef::Number(n)) => Ok(Some(TokenIndex::new(n))),
            Some(RawRef::Text(s)) => {
                let s = s.trim();
                if s.is_empty() || s == "null" || s == "-" {
                    Ok(None)
                } else {
                    s.parse()
                        .map(Some)
                        .map_err(|_| serde::de::Error::custom(format!("invalid index: '{s}'")))
                }
            }
        }
    }

    /// Deserialize an optional enum-typed field, folding the sentinels into `None`
    pub fn deserialize_unset<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?
            .as_deref()
            .and_then(normalize_unset))
    }

    /// Deserialize a field whose explicit `null` means its default
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Serialize an optional enum-typed field as the service expects (`""` when unset)
    pub fn serialize_unset<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }
}
