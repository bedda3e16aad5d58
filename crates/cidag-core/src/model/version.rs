use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// SchemaVersionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaVersionError {
    #[error("schema version {version} has unsupported major (supported {min}..={max})")]
    UnsupportedMajor {
        version: SchemaVersion,
        min: u32,
        max: u32,
    },

    #[error("schema version {version} is below minor floor {floor}")]
    MinorBelowFloor { version: SchemaVersion, floor: u32 },
}

///
/// SchemaVersion
/// (major, minor) pair attached to one batch of raw input.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

///
/// SchemaSupport
/// Range of schema versions the object model understands.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchemaSupport {
    pub min_major: u32,
    pub max_major: u32,
    pub minor_floor: u32,
}

impl SchemaSupport {
    #[must_use]
    pub const fn new(min_major: u32, max_major: u32, minor_floor: u32) -> Self {
        Self {
            min_major,
            max_major,
            minor_floor,
        }
    }

    /// Reject unknown majors and minors below the declared floor.
    pub const fn check(&self, version: SchemaVersion) -> Result<(), SchemaVersionError> {
        if version.major < self.min_major || version.major > self.max_major {
            return Err(SchemaVersionError::UnsupportedMajor {
                version,
                min: self.min_major,
                max: self.max_major,
            });
        }
        if version.minor < self.minor_floor {
            return Err(SchemaVersionError::MinorBelowFloor {
                version,
                floor: self.minor_floor,
            });
        }

        Ok(())
    }

    /// Newest version accepted by this range, at the minor floor.
    #[must_use]
    pub const fn newest(&self) -> SchemaVersion {
        SchemaVersion::new(self.max_major, self.minor_floor)
    }
}
