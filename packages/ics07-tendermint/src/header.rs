//! The Tendermint update [`Header`]: a signed block header with the validator sets needed to
//! verify it.

use ibc_eureka_host_types::{identifiers::parse_chain_id_revision, Height, TypedState};
use ibc_eureka_utils::ensure;
use serde::{Deserialize, Serialize};
use tendermint::{block::signed_header::SignedHeader, validator::Set as ValidatorSet, Hash};

use crate::error::TendermintClientError;

/// The update message of the Tendermint client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The new signed header
    pub signed_header: SignedHeader,
    /// The validator set that signed the new header
    pub validator_set: ValidatorSet,
    /// Height of the trusted consensus state the header is verified from
    pub trusted_height: Height,
    /// The validator set committed as `next_validators` at the trusted height
    pub trusted_validators: ValidatorSet,
}

impl Header {
    /// The header height, qualified by the revision of its chain id.
    #[must_use]
    pub fn height(&self) -> Height {
        let header = &self.signed_header.header;
        Height::new(
            parse_chain_id_revision(header.chain_id.as_str()),
            header.height.value(),
        )
    }

    /// The header time in nanoseconds since the Unix epoch. Pre-epoch times map to zero.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        u64::try_from(self.signed_header.header.time.unix_timestamp_nanos()).unwrap_or_default()
    }

    /// The block hash of the header.
    #[must_use]
    pub fn block_hash(&self) -> Hash {
        self.signed_header.header.hash()
    }

    /// Checks the header for internal consistency against the client's chain id: the commit
    /// commits to this header and the validator set hashes to the header's validators hash.
    /// # Errors
    /// Returns an error describing the first inconsistency.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), TendermintClientError> {
        let header = &self.signed_header.header;
        let commit = &self.signed_header.commit;

        ensure!(
            header.chain_id.as_str() == chain_id,
            TendermintClientError::InvalidHeader(format!(
                "header chain id {} does not match client chain id {chain_id}",
                header.chain_id
            ))
        );
        ensure!(
            self.height().revision_number == self.trusted_height.revision_number,
            TendermintClientError::InvalidHeader(format!(
                "header revision {} does not match trusted revision {}",
                self.height().revision_number,
                self.trusted_height.revision_number
            ))
        );
        ensure!(
            self.height() > self.trusted_height,
            TendermintClientError::InvalidHeaderHeight {
                header: self.height(),
                trusted: self.trusted_height,
            }
        );
        ensure!(
            commit.height == header.height,
            TendermintClientError::InvalidHeader(format!(
                "commit height {} does not match header height {}",
                commit.height, header.height
            ))
        );
        ensure!(
            commit.block_id.hash == header.hash(),
            TendermintClientError::InvalidHeader(format!(
                "commit signs block {} instead of header {}",
                commit.block_id.hash,
                header.hash()
            ))
        );
        ensure!(
            !self.validator_set.validators().is_empty(),
            TendermintClientError::InvalidHeader("validator set cannot be empty".to_string())
        );
        ensure!(
            self.validator_set.hash() == header.validators_hash,
            TendermintClientError::InvalidHeader(format!(
                "validator set hash {} does not match header validators hash {}",
                self.validator_set.hash(),
                header.validators_hash
            ))
        );
        Ok(())
    }

    /// Checks that the trusted validators hash to the next validators hash committed at the
    /// trusted height.
    /// # Errors
    /// Returns an error if the hashes differ.
    pub fn check_trusted_next_validator_set(
        &self,
        next_validators_hash: &[u8],
    ) -> Result<(), TendermintClientError> {
        let hash = self.trusted_validators.hash();
        ensure!(
            hash.as_bytes() == next_validators_hash,
            TendermintClientError::InvalidHeader(format!(
                "trusted validators hash {hash} does not match trusted next validators hash {}",
                hex::encode_upper(next_validators_hash)
            ))
        );
        Ok(())
    }
}

impl TypedState for Header {
    const TYPE_URL: &'static str = "/ibc.lightclients.tendermint.v1.Header";
}

#[cfg(test)]
mod tests {
    use tendermint::{block::CommitSig, AppHash};

    use super::*;
    use crate::test_utils::{HeaderBuilder, TestValidators, SECOND};

    #[test]
    fn validate_basic_checks_the_validator_set() {
        let validators = TestValidators::new(1, &[5, 7]);
        let mut header = HeaderBuilder::new("gaia-1", 3, SECOND, &validators).build();
        header.validate_basic("gaia-1").unwrap();

        header.validator_set = TestValidators::new(1, &[5]).validator_set();
        assert!(matches!(
            header.validate_basic("gaia-1"),
            Err(TendermintClientError::InvalidHeader(_))
        ));
    }

    #[test]
    fn validate_basic_binds_the_commit_to_the_header() {
        let validators = TestValidators::new(1, &[5]);
        let mut header = HeaderBuilder::new("gaia-1", 3, SECOND, &validators).build();
        header.signed_header.header.app_hash = AppHash::try_from(b"forged".to_vec()).unwrap();

        assert!(matches!(
            header.validate_basic("gaia-1"),
            Err(TendermintClientError::InvalidHeader(_))
        ));
        assert!(matches!(
            HeaderBuilder::new("gaia-1", 3, SECOND, &validators)
                .build()
                .validate_basic("gaia-2"),
            Err(TendermintClientError::InvalidHeader(_))
        ));
    }

    #[test]
    fn non_signers_are_absent_from_the_commit() {
        let validators = TestValidators::new(1, &[5, 7, 9]);
        let header = HeaderBuilder::new("gaia-1", 3, SECOND, &validators)
            .signers(vec![1])
            .build();
        let signatures = &header.signed_header.commit.signatures;

        assert_eq!(signatures.len(), 3);
        assert_eq!(
            signatures
                .iter()
                .filter(|sig| matches!(sig, CommitSig::BlockIdFlagCommit { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn trusted_validators_are_checked_by_hash() {
        let validators = TestValidators::new(1, &[5]);
        let header = HeaderBuilder::new("gaia-1", 3, SECOND, &validators).build();

        header
            .check_trusted_next_validator_set(validators.validator_set().hash().as_bytes())
            .unwrap();
        assert!(header.check_trusted_next_validator_set(&[0; 32]).is_err());
    }

    #[test]
    fn height_and_time_carry_the_chain_revision() {
        let validators = TestValidators::new(1, &[5]);
        let header = HeaderBuilder::new("gaia-1", 3, 7 * SECOND + 5, &validators).build();
        assert_eq!(header.height(), Height::new(1, 3));
        assert_eq!(header.trusted_height, Height::new(1, 2));
        assert_eq!(header.timestamp(), 7 * SECOND + 5);
    }
}
