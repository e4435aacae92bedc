use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, ParseError};
use serde::{Deserialize, Deserializer, Serialize, de};

/// The direction a temperature took over a record's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempChange {
    Fell,
    Flat,
    Rose,
}

impl TempChange {
    /// The sign of the change, `-1`, `0` or `1`.
    pub fn sign(self) -> i8 {
        match self {
            Self::Fell => -1,
            Self::Flat => 0,
            Self::Rose => 1,
        }
    }
}

/// A single temperature reading: where it started and ended, and its extremes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempRecord {
    #[serde(deserialize_with = "timestamp")]
    pub rec_time: NaiveDateTime,
    #[serde(default, deserialize_with = "number")]
    pub start: f64,
    #[serde(default, deserialize_with = "number")]
    pub end: f64,
    #[serde(default, deserialize_with = "number")]
    pub high: f64,
    #[serde(default, deserialize_with = "number")]
    pub low: f64,
}

impl TempRecord {
    pub fn new(rec_time: NaiveDateTime, start: f64, end: f64, high: f64, low: f64) -> Self {
        Self {
            rec_time,
            start,
            end,
            high,
            low,
        }
    }

    /// Compares `end` against `start`. Incomparable values count as flat.
    pub fn temp_change(&self) -> TempChange {
        match self.end.partial_cmp(&self.start) {
            Some(Ordering::Greater) => TempChange::Rose,
            Some(Ordering::Less) => TempChange::Fell,
            _ => TempChange::Flat,
        }
    }
}

/// Parses an RFC 3339 timestamp, keeping its local wall time, or a naive ISO 8601 one.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ParseError> {
    let s = s.trim();

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .or_else(|_| s.parse::<NaiveDateTime>())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
}

fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(|e| de::Error::custom(format!("invalid timestamp {s:?}: {e}")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid number {s:?}: {e}"))),
    }
}
