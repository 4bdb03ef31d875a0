use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Condition types a Node may report in `status.conditions`.
///
/// Types the kubelet may add in the future are carried verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ConditionType {
    Ready,
    OutOfDisk,
    NetworkUnavailable,
    MemoryPressure,
    DiskPressure,
    PIDPressure,
    Other(String),
}

impl ConditionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "Ready",
            Self::OutOfDisk => "OutOfDisk",
            Self::NetworkUnavailable => "NetworkUnavailable",
            Self::MemoryPressure => "MemoryPressure",
            Self::DiskPressure => "DiskPressure",
            Self::PIDPressure => "PIDPressure",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for ConditionType {
    fn from(text: &str) -> Self {
        match text {
            "Ready" => Self::Ready,
            "OutOfDisk" => Self::OutOfDisk,
            "NetworkUnavailable" => Self::NetworkUnavailable,
            "MemoryPressure" => Self::MemoryPressure,
            "DiskPressure" => Self::DiskPressure,
            "PIDPressure" => Self::PIDPressure,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ConditionType {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<ConditionType> for String {
    fn from(r#type: ConditionType) -> Self {
        r#type.to_string()
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status values a condition may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid condition status {0:?}, expected one of True, False, Unknown")]
pub struct ParseConditionError(pub String);

impl FromStr for ConditionStatus {
    type Err = ParseConditionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "True" => Ok(Self::True),
            "False" => Ok(Self::False),
            "Unknown" => Ok(Self::Unknown),
            other => Err(ParseConditionError(other.to_string())),
        }
    }
}
