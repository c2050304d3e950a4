//! Record identifier type for the catalog ID space
//!
//! Sierra bib records are addressed by a numeric record number. The tracker,
//! the planner and the range requests all speak in terms of [`RangeId`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Record identifier newtype wrapper
///
/// Totally ordered, `Copy`, and cheap to do arithmetic on. The textual form
/// accepts an optional leading `b` (Sierra's bib prefix), so both `"1000123"`
/// and `"b1000123"` parse to the same id.
///
/// # Examples
///
/// ```
/// use sierra_export::domain::ids::RangeId;
/// use std::str::FromStr;
///
/// let id = RangeId::from_str("b1000123").unwrap();
/// assert_eq!(id, RangeId::new(1_000_123));
/// assert_eq!(id.to_string(), "1000123");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeId(u64);

impl RangeId {
    /// Creates a new RangeId
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Number of ids from `self` up to `other`, i.e. `other - self`
    ///
    /// Returns `None` when `other < self`.
    pub fn distance_to(self, other: RangeId) -> Option<u64> {
        other.0.checked_sub(self.0)
    }

    /// Returns the id `offset` positions after this one, saturating at `u64::MAX`
    pub fn offset(self, offset: u64) -> RangeId {
        RangeId(self.0.saturating_add(offset))
    }
}

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RangeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('b').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err("Record id cannot be empty".to_string());
        }
        digits
            .parse::<u64>()
            .map(RangeId)
            .map_err(|e| format!("Invalid record id '{s}': {e}"))
    }
}

impl From<u64> for RangeId {
    fn from(value: u64) -> Self {
        RangeId(value)
    }
}

impl Serialize for RangeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for RangeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(RangeId(n)),
            Raw::Text(s) => RangeId::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Serde helpers for the tracker's `last_bib` field, which is written as a
/// string (or `null`) but read from either a string or a number.
pub mod as_string_opt {
    use super::RangeId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<RangeId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RangeId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RangeId>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_id_parse_plain_and_prefixed() {
        assert_eq!(RangeId::from_str("1000000").unwrap(), RangeId::new(1_000_000));
        assert_eq!(RangeId::from_str("b1000000").unwrap(), RangeId::new(1_000_000));
        assert_eq!(RangeId::from_str(" 42 ").unwrap(), RangeId::new(42));
    }

    #[test]
    fn test_range_id_parse_invalid() {
        assert!(RangeId::from_str("").is_err());
        assert!(RangeId::from_str("b").is_err());
        assert!(RangeId::from_str("abc").is_err());
        assert!(RangeId::from_str("-5").is_err());
    }

    #[test]
    fn test_range_id_ordering() {
        assert!(RangeId::new(1) < RangeId::new(2));
        assert_eq!(RangeId::new(10).max(RangeId::new(3)), RangeId::new(10));
    }

    #[test]
    fn test_distance_and_offset() {
        let a = RangeId::new(1_000_000);
        let b = RangeId::new(1_000_100);
        assert_eq!(a.distance_to(b), Some(100));
        assert_eq!(b.distance_to(a), None);
        assert_eq!(a.offset(50), RangeId::new(1_000_050));
        assert_eq!(RangeId::new(u64::MAX).offset(1), RangeId::new(u64::MAX));
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: RangeId = serde_json::from_str("1000001").unwrap();
        let from_string: RangeId = serde_json::from_str("\"1000001\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_as_string_opt_round_trip() {
        #[derive(Serialize, Deserialize)]
        struct Doc {
            #[serde(with = "as_string_opt")]
            last_bib: Option<RangeId>,
        }

        let json = serde_json::to_string(&Doc {
            last_bib: Some(RangeId::new(3_456_789)),
        })
        .unwrap();
        assert_eq!(json, r#"{"last_bib":"3456789"}"#);

        let empty = serde_json::to_string(&Doc { last_bib: None }).unwrap();
        assert_eq!(empty, r#"{"last_bib":null}"#);

        let legacy: Doc = serde_json::from_str(r#"{"last_bib": 3456789}"#).unwrap();
        assert_eq!(legacy.last_bib, Some(RangeId::new(3_456_789)));
    }
}
