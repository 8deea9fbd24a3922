//! This module defines [`Status`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// The status of a light client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The client can be updated and used for verification
    Active,
    /// The latest consensus state is outside the trusting period
    Expired,
    /// Misbehaviour was detected
    Frozen,
    /// The client type is not in the allow-list
    Unauthorized,
}

impl Status {
    /// Returns true for [`Status::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Expired => write!(f, "Expired"),
            Self::Frozen => write!(f, "Frozen"),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}
