//! Client, connection and channel identifiers, and chain id revisions.

use ibc_eureka_utils::ensure;

use crate::error::HostError;

/// Prefix of connection identifiers.
pub const CONNECTION_PREFIX: &str = "connection";
/// Prefix of channel identifiers.
pub const CHANNEL_PREFIX: &str = "channel";

const CLIENT_ID_MIN_LEN: usize = 9;
const CLIENT_ID_MAX_LEN: usize = 64;
const CONNECTION_ID_MIN_LEN: usize = 10;
const CHANNEL_ID_MIN_LEN: usize = 8;
const PORT_ID_MIN_LEN: usize = 2;
const PORT_ID_MAX_LEN: usize = 128;
const DEFAULT_MAX_LEN: usize = 64;

/// Checks the length and alphabet of an identifier. Allowed characters are ASCII
/// alphanumerics and `._+-#[]<>`.
/// # Errors
/// Returns an error if the identifier is too short, too long or has invalid characters.
pub fn validate_identifier(id: &str, min: usize, max: usize) -> Result<(), HostError> {
    ensure!(
        (min..=max).contains(&id.len()),
        HostError::InvalidIdentifierLength {
            id: id.to_string(),
            len: id.len(),
            min,
            max,
        }
    );
    ensure!(
        id.chars()
            .all(|c| c.is_ascii_alphanumeric() || "._+-#[]<>".contains(c)),
        HostError::InvalidIdentifierCharacters(id.to_string())
    );
    Ok(())
}

/// Validates a client identifier.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn validate_client_identifier(id: &str) -> Result<(), HostError> {
    validate_identifier(id, CLIENT_ID_MIN_LEN, CLIENT_ID_MAX_LEN)
}

/// Validates a connection identifier.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn validate_connection_identifier(id: &str) -> Result<(), HostError> {
    validate_identifier(id, CONNECTION_ID_MIN_LEN, DEFAULT_MAX_LEN)
}

/// Validates a channel identifier.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn validate_channel_identifier(id: &str) -> Result<(), HostError> {
    validate_identifier(id, CHANNEL_ID_MIN_LEN, DEFAULT_MAX_LEN)
}

/// Validates a port identifier.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn validate_port_identifier(id: &str) -> Result<(), HostError> {
    validate_identifier(id, PORT_ID_MIN_LEN, PORT_ID_MAX_LEN)
}

/// Validates a client type: non-blank, no trailing `-`, and short enough to leave room for
/// a sequence in the client identifier.
/// # Errors
/// Returns an error if the client type is invalid.
pub fn validate_client_type(client_type: &str) -> Result<(), HostError> {
    let trimmed = client_type.trim();
    ensure!(
        !trimmed.is_empty() && trimmed == client_type,
        HostError::InvalidClientType(client_type.to_string())
    );
    ensure!(
        !client_type.ends_with('-'),
        HostError::InvalidClientType(client_type.to_string())
    );
    // room for "-{sequence}" with at least one digit
    ensure!(
        client_type.len() + 2 <= CLIENT_ID_MAX_LEN,
        HostError::InvalidClientType(client_type.to_string())
    );
    Ok(())
}

/// Formats the identifier of the `sequence`-th client of `client_type`.
#[must_use]
pub fn format_client_identifier(client_type: &str, sequence: u64) -> String {
    format!("{client_type}-{sequence}")
}

/// Splits a client identifier into its client type and sequence.
/// # Errors
/// Returns an error if the identifier is not of the form `{client_type}-{sequence}`.
pub fn parse_client_identifier(client_id: &str) -> Result<(&str, u64), HostError> {
    validate_client_identifier(client_id)?;

    let invalid = || HostError::InvalidClientIdentifier(client_id.to_string());
    let (client_type, sequence) = client_id.rsplit_once('-').ok_or_else(invalid)?;
    validate_client_type(client_type).map_err(|_| invalid())?;
    let sequence = parse_sequence(sequence).ok_or_else(invalid)?;
    Ok((client_type, sequence))
}

/// Returns the client type embedded in a client identifier.
/// # Errors
/// Returns an error if the identifier is malformed.
pub fn client_type_of(client_id: &str) -> Result<&str, HostError> {
    parse_client_identifier(client_id).map(|(client_type, _)| client_type)
}

/// Formats the identifier of the `sequence`-th connection.
#[must_use]
pub fn format_connection_identifier(sequence: u64) -> String {
    format!("{CONNECTION_PREFIX}-{sequence}")
}

/// Formats the identifier of the `sequence`-th channel.
#[must_use]
pub fn format_channel_identifier(sequence: u64) -> String {
    format!("{CHANNEL_PREFIX}-{sequence}")
}

/// Parses the revision number of a chain id of the form `{name}-{N}` with `N` a decimal
/// without leading zero. Any other chain id has revision 0.
#[must_use]
pub fn parse_chain_id_revision(chain_id: &str) -> u64 {
    let Some((name, revision)) = chain_id.rsplit_once('-') else {
        return 0;
    };
    if name.is_empty() || name.ends_with(|c: char| c == '-' || c == '\n') || revision.starts_with('0') {
        return 0;
    }
    parse_sequence(revision).unwrap_or(0)
}

/// Formats a chain id with the given revision, replacing any existing revision suffix.
#[must_use]
pub fn set_chain_id_revision(chain_id: &str, revision: u64) -> String {
    if parse_chain_id_revision(chain_id) == 0 {
        return format!("{chain_id}-{revision}");
    }
    chain_id.rsplit_once('-').map_or_else(
        || format!("{chain_id}-{revision}"),
        |(name, _)| format!("{name}-{revision}"),
    )
}

fn parse_sequence(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("07-tendermint-0", "07-tendermint", 0)]
    #[case("07-tendermint-42", "07-tendermint", 42)]
    #[case("09-localhost-1", "09-localhost", 1)]
    fn parse_valid_client_identifier(
        #[case] id: &str,
        #[case] client_type: &str,
        #[case] sequence: u64,
    ) {
        assert_eq!(parse_client_identifier(id).unwrap(), (client_type, sequence));
        assert_eq!(format_client_identifier(client_type, sequence), id);
    }

    #[rstest]
    #[case("tendermint")]
    #[case("07-tendermint-")]
    #[case("07-tendermint-x")]
    #[case("07-tendermint--1")]
    #[case("07/tendermint-0")]
    fn parse_invalid_client_identifier(#[case] id: &str) {
        assert!(parse_client_identifier(id).is_err());
    }

    #[rstest]
    #[case("cosmoshub-4", 4)]
    #[case("evmos_9001-2", 2)]
    #[case("gaia", 0)]
    #[case("gaia-0", 0)]
    #[case("gaia-01", 0)]
    #[case("gaia--1", 0)]
    #[case("-1", 0)]
    #[case("chain-a-10", 10)]
    fn chain_id_revision(#[case] chain_id: &str, #[case] revision: u64) {
        assert_eq!(parse_chain_id_revision(chain_id), revision);
    }

    #[test]
    fn set_revision_replaces_the_suffix() {
        assert_eq!(set_chain_id_revision("cosmoshub-4", 5), "cosmoshub-5");
        assert_eq!(set_chain_id_revision("gaia", 1), "gaia-1");
    }

    #[test]
    fn identifier_alphabet_and_length() {
        validate_connection_identifier(&format_connection_identifier(0)).unwrap();
        validate_channel_identifier(&format_channel_identifier(7)).unwrap();
        validate_port_identifier("transfer").unwrap();
        assert!(matches!(
            validate_port_identifier("t"),
            Err(HostError::InvalidIdentifierLength { len: 1, .. })
        ));
        assert_eq!(
            validate_channel_identifier("channel/0"),
            Err(HostError::InvalidIdentifierCharacters("channel/0".to_string()))
        );
    }
}
