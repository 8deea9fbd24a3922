//! Host-side types shared by the IBC light clients: heights, client status, identifiers,
//! ICS-24 store paths, connection and channel ends, and the `Any` codec.
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod channel;
pub mod codec;
pub mod connection;
pub mod error;
pub mod height;
pub mod identifiers;
pub mod path;
pub mod status;

pub use codec::TypedState;
pub use error::{CodecError, HostError};
pub use height::Height;
pub use status::Status;
