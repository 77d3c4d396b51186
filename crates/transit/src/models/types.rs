//! Core data types and enums for transit data.

use std::path::PathBuf;

// ============================================================================
// Enums
// ============================================================================

/// Trip direction (0 = outbound, 1 = inbound per GTFS)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DirectionId {
    #[default]
    Outbound = 0,
    Inbound = 1,
}

impl DirectionId {
    /// Blank `direction_id` is legal GTFS and reads as outbound.
    pub fn from_gtfs(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "0" => Some(Self::Outbound),
            "1" => Some(Self::Inbound),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DirectionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DirectionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Outbound),
            1 => Ok(Self::Inbound),
            other => Err(serde::de::Error::custom(format!(
                "direction must be 0 or 1, got {other}"
            ))),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("No GTFS directory matching '{pattern}' found in {}", searched.display())]
    MissingSource { pattern: String, searched: PathBuf },

    #[error("Required GTFS table {table}.txt not found in {}", directory.display())]
    MissingTable { table: String, directory: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "compiler")]
    #[error("Failed to parse table {table}.txt: {source}")]
    Table {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
