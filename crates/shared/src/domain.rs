use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UnknownSortKey;

/// One roster entry.
///
/// Only `id` is required when a record is read back from storage or a seed
/// document; the other fields may be absent in hand-edited data and are
/// rendered with placeholders. Scalars of the wrong type are kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "loose_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "loose_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_age",
        serialize_with = "compact_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<f64>,
    #[serde(
        default,
        deserialize_with = "loose_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub course: Option<String>,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: f64,
        course: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            age: Some(age),
            course: Some(course.into()),
        }
    }

    /// Identity key used for duplicate detection.
    pub fn key(&self) -> String {
        normalize_id(&self.id)
    }

    /// Age used for ordering; absent ages sort as zero.
    pub fn sort_age(&self) -> f64 {
        self.age.unwrap_or(0.0)
    }
}

pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Formats an age the way it was entered: `21` rather than `21.0`.
pub fn format_age(age: Option<f64>) -> String {
    age.map(|value| value.to_string()).unwrap_or_default()
}

fn loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(D::Error::custom(format_args!(
            "id must be a string or number, got {other}"
        ))),
    }
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn loose_age<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let age = match value {
        Some(serde_json::Value::Number(number)) => number.as_f64(),
        Some(serde_json::Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(age.filter(|value| value.is_finite()))
}

fn compact_age<S>(age: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match age {
        Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            serializer.serialize_i64(*value as i64)
        }
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Age,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Age => "age",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "name" => Ok(SortKey::Name),
            "age" => Ok(SortKey::Age),
            _ => Err(UnknownSortKey(raw.trim().to_string())),
        }
    }
}

/// Single user persisted by the registration page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "blank_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub interest: String,
}

impl RegisteredUser {
    pub fn is_registered(&self) -> bool {
        !self.first_name.trim().is_empty()
    }
}

/// Dates travel as `YYYY-MM-DD`, with an empty string for "not given".
mod blank_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(NaiveDate::parse_from_str(raw.trim(), FORMAT).ok())
    }
}
