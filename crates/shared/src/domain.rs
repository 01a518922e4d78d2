use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Server-assigned workout identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(pub String);

impl WorkoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutStatus {
    #[default]
    Planned,
    Completed,
}

impl WorkoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::Planned => "Planned",
            WorkoutStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid workout status '{0}', expected Planned or Completed")]
pub struct InvalidStatus(pub String);

impl std::str::FromStr for WorkoutStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("planned") {
            Ok(WorkoutStatus::Planned)
        } else if s.eq_ignore_ascii_case("completed") {
            Ok(WorkoutStatus::Completed)
        } else {
            Err(InvalidStatus(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: WorkoutId,
    pub name: String,
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: f64,
    #[serde(default)]
    pub status: WorkoutStatus,
}

impl WorkoutEntry {
    pub fn is_completed(&self) -> bool {
        self.status == WorkoutStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDuration {
    #[error("duration is required")]
    Missing,
    #[error("duration '{0}' is not a number of minutes")]
    NotANumber(String),
    #[error("duration must be positive")]
    NotPositive,
}

/// Parses a user-entered duration in minutes.
pub fn parse_duration_minutes(raw: &str) -> Result<f64, InvalidDuration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InvalidDuration::Missing);
    }
    let minutes: f64 = raw
        .parse()
        .map_err(|_| InvalidDuration::NotANumber(raw.to_string()))?;
    if !minutes.is_finite() {
        return Err(InvalidDuration::NotANumber(raw.to_string()));
    }
    if minutes <= 0.0 {
        return Err(InvalidDuration::NotPositive);
    }
    Ok(minutes)
}

/// Whole durations go out as JSON integers.
pub fn serialize_duration<S>(minutes: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if minutes.fract() == 0.0 && *minutes >= 0.0 && *minutes <= u32::MAX as f64 {
        serializer.serialize_u64(*minutes as u64)
    } else {
        serializer.serialize_f64(*minutes)
    }
}

// The API has been seen returning durations both as numbers and as the raw
// form string.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Number(f64),
        Text(String),
    }

    match RawDuration::deserialize(deserializer)? {
        RawDuration::Number(minutes) => Ok(minutes),
        RawDuration::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
