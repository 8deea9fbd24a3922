//! A collection of utilities shared by the IBC verification crates.
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod serde;

/// Ensure that a condition is true, otherwise return an error.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

#[cfg(test)]
mod tests {
    #[derive(Debug, PartialEq, Eq)]
    struct Rejected(u8);

    fn check(value: u8) -> Result<u8, Rejected> {
        ensure!(value > 10, Rejected(value));
        Ok(value)
    }

    #[test]
    fn ensure_returns_the_error_when_condition_fails() {
        assert_eq!(check(3), Err(Rejected(3)));
        assert_eq!(check(11), Ok(11));
    }
}
