//! Header verification against a trusted consensus state.

use cosmwasm_std::Env;
use ibc_eureka_client_store::{self as store, ReadonlyStorage};
use ibc_eureka_utils::ensure;
use tendermint::{block, chain, hash::Algorithm, Hash, Time};
use tendermint_light_client_verifier::{
    operations::{ProdVotingPowerCalculator, VotingPowerCalculator},
    options::Options,
    types::{TrustedBlockState, UntrustedBlockState},
    ProdVerifier, Verdict, Verifier,
};

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::TendermintClientError,
    header::Header, trust_threshold::TrustThreshold,
};

/// Checks that the consensus state taken at `trusted_timestamp` is still trusted at `now`.
/// # Errors
/// Returns [`TendermintClientError::TrustingPeriodExpired`] otherwise.
pub fn check_trusting_period(
    client_state: &ClientState,
    trusted_timestamp: u64,
    now: u64,
) -> Result<(), TendermintClientError> {
    let expired_at = client_state.trusting_period_end(trusted_timestamp);
    ensure!(
        expired_at > now,
        TendermintClientError::TrustingPeriodExpired {
            trusted_timestamp,
            expired_at,
            now,
        }
    );
    Ok(())
}

/// Converts nanoseconds since the Unix epoch to a Tendermint [`Time`].
/// # Errors
/// Returns an error if the time is out of the representable range.
pub fn tendermint_time(nanos: u64) -> Result<Time, TendermintClientError> {
    let secs = i64::try_from(nanos / 1_000_000_000)
        .map_err(|e| TendermintClientError::InvalidHeader(e.to_string()))?;
    // always below one billion
    #[allow(clippy::cast_possible_truncation)]
    let subsec = (nanos % 1_000_000_000) as u32;
    Time::from_unix_timestamp(secs, subsec)
        .map_err(|e| TendermintClientError::InvalidHeader(format!("invalid time {nanos}: {e}")))
}

fn trusted_next_validators_hash(
    consensus_state: &ConsensusState,
) -> Result<Hash, TendermintClientError> {
    Hash::from_bytes(Algorithm::Sha256, &consensus_state.next_validators_hash)
        .map_err(|e| TendermintClientError::InvalidConsensus(e.to_string()))
}

/// Checks that the header names the trusted consensus state it is verified from, is well
/// formed for the client's chain and that the trusted state has not expired.
fn check_against_trusted(
    client_state: &ClientState,
    trusted: &ConsensusState,
    header: &Header,
    now: u64,
) -> Result<(), TendermintClientError> {
    header.check_trusted_next_validator_set(&trusted.next_validators_hash)?;
    header.validate_basic(&client_state.chain_id)?;
    check_trusting_period(client_state, trusted.timestamp, now)
}

/// Verifies `header` from the trusted consensus state it names, without looking at the other
/// consensus states of the store.
///
/// Adjacent headers must be signed by the trusted next validators. Non-adjacent headers must
/// carry more than the client's trust level of the trusted validators. Both must carry more
/// than two thirds of their own validator set, lie after the trusted time and within the max
/// clock drift of `now`.
/// # Errors
/// Returns an error on the first failed check.
pub fn verify_header_against_trusted(
    client_state: &ClientState,
    trusted: &ConsensusState,
    header: &Header,
    now: u64,
) -> Result<(), TendermintClientError> {
    check_against_trusted(client_state, trusted, header, now)?;

    let chain_id = chain::Id::try_from(client_state.chain_id.clone())
        .map_err(|e| TendermintClientError::InvalidClient(e.to_string()))?;
    let trusted_height = block::Height::try_from(header.trusted_height.revision_height)
        .map_err(|e| TendermintClientError::InvalidHeader(e.to_string()))?;
    let trusted_state = TrustedBlockState {
        chain_id: &chain_id,
        header_time: tendermint_time(trusted.timestamp)?,
        height: trusted_height,
        next_validators: &header.trusted_validators,
        next_validators_hash: trusted_next_validators_hash(trusted)?,
    };
    let untrusted_state = UntrustedBlockState {
        signed_header: &header.signed_header,
        validators: &header.validator_set,
        next_validators: None,
    };
    let options = Options {
        trust_threshold: client_state.trust_level.to_fraction()?,
        trusting_period: client_state.trusting_period,
        clock_drift: client_state.max_clock_drift,
    };

    match ProdVerifier::default().verify_update_header(
        untrusted_state,
        trusted_state,
        &options,
        tendermint_time(now)?,
    ) {
        Verdict::Success => Ok(()),
        Verdict::NotEnoughTrust(tally) => Err(TendermintClientError::InsufficientVotingPower {
            signed: tally.tallied,
            total: tally.total,
            numerator: tally.trust_threshold.numerator(),
            denominator: tally.trust_threshold.denominator(),
        }),
        Verdict::Invalid(detail) => Err(TendermintClientError::InvalidHeader(format!(
            "header at {} failed verification: {detail:?}",
            header.height()
        ))),
    }
}

/// Checks that more than `threshold` of the voting power of `validators` signed the header.
fn check_voting_power(
    header: &Header,
    validators: &tendermint::validator::Set,
    threshold: TrustThreshold,
) -> Result<(), TendermintClientError> {
    let tally = ProdVotingPowerCalculator::default()
        .voting_power_in(&header.signed_header, validators, threshold.to_fraction()?)
        .map_err(|e| TendermintClientError::InvalidHeader(e.to_string()))?;
    ensure!(
        threshold.is_exceeded_by(tally.tallied, tally.total),
        TendermintClientError::InsufficientVotingPower {
            signed: tally.tallied,
            total: tally.total,
            numerator: threshold.numerator,
            denominator: threshold.denominator,
        }
    );
    Ok(())
}

/// Verifies a misbehaviour header from the trusted consensus state it names.
///
/// Evidence is checked by signatures only: the header may be dated before its trusted state
/// or beyond the clock drift, since either is how a time violation shows. The trusted
/// validators must still carry the client's trust level of the commit and the header's own
/// validator set more than two thirds.
/// # Errors
/// Returns an error on the first failed check.
pub fn verify_misbehaviour_header(
    client_state: &ClientState,
    trusted: &ConsensusState,
    header: &Header,
    now: u64,
) -> Result<(), TendermintClientError> {
    check_against_trusted(client_state, trusted, header, now)?;
    check_voting_power(header, &header.trusted_validators, client_state.trust_level)?;
    check_voting_power(header, &header.validator_set, TrustThreshold::TWO_THIRDS)
}

/// Verifies an update `header` against the client store: the header must verify from its
/// trusted consensus state and fit between the consensus states already stored.
/// # Errors
/// Returns an error on the first failed check.
pub fn verify_header(
    storage: &(impl ReadonlyStorage + ?Sized),
    env: &Env,
    client_state: &ClientState,
    header: &Header,
) -> Result<(), TendermintClientError> {
    let trusted =
        store::get_consensus_state::<ConsensusState>(storage, header.trusted_height)?;
    verify_header_against_trusted(client_state, &trusted, header, env.block.time.nanos())?;

    let height = header.height();
    let header_consensus_state = ConsensusState::from(header);
    if store::has_consensus_state(storage, height) {
        let existing = store::get_consensus_state::<ConsensusState>(storage, height)?;
        ensure!(
            existing == header_consensus_state,
            TendermintClientError::ConflictingHeader(height)
        );
    }

    if let Some((_, prev)) = store::get_previous_consensus_state::<ConsensusState>(storage, height)? {
        ensure!(
            prev.timestamp < header_consensus_state.timestamp,
            TendermintClientError::ConflictingHeader(height)
        );
    }
    if let Some((_, next)) = store::get_next_consensus_state::<ConsensusState>(storage, height)? {
        ensure!(
            next.timestamp > header_consensus_state.timestamp,
            TendermintClientError::ConflictingHeader(height)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_conversion_keeps_nanoseconds() {
        let time = tendermint_time(1_700_000_000_000_000_123).unwrap();
        assert_eq!(time.unix_timestamp_nanos(), 1_700_000_000_000_000_123);
    }
}
