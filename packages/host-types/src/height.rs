//! This module defines [`Height`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// A block height qualified by the chain revision. Heights order by revision number first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height {
    /// Revision (chain upgrade epoch)
    pub revision_number: u64,
    /// Block height within the revision
    pub revision_height: u64,
}

impl Height {
    /// Creates a new height.
    #[must_use]
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// The zero height.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Returns true if both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Returns the next height in the same revision.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self::new(self.revision_number, self.revision_height + 1)
    }

    /// Returns the previous height in the same revision, or `None` at revision height zero.
    #[must_use]
    pub const fn decrement(self) -> Option<Self> {
        match self.revision_height {
            0 => None,
            h => Some(Self::new(self.revision_number, h - 1)),
        }
    }

    /// Big-endian `revision_number ‖ revision_height`, which sorts like the height.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 16] {
        let mut bytes = [0; 16];
        bytes[..8].copy_from_slice(&self.revision_number.to_be_bytes());
        bytes[8..].copy_from_slice(&self.revision_height.to_be_bytes());
        bytes
    }

    /// Inverse of [`Self::to_be_bytes`].
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        let mut revision_number = [0; 8];
        let mut revision_height = [0; 8];
        revision_number.copy_from_slice(&bytes[..8]);
        revision_height.copy_from_slice(&bytes[8..]);
        Self::new(
            u64::from_be_bytes(revision_number),
            u64::from_be_bytes(revision_height),
        )
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl FromStr for Height {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (revision_number, revision_height) = s
            .split_once('-')
            .ok_or_else(|| HostError::InvalidHeight(s.to_string()))?;

        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| HostError::InvalidHeight(s.to_string()))
        };
        Ok(Self::new(parse(revision_number)?, parse(revision_height)?))
    }
}
