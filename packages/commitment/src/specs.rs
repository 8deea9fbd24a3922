//! This module defines [`ProofSpecs`].

use ics23::ProofSpec;
use prost::Message;
use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CommitmentError;

/// The ordered ICS-23 proof specs, one per commitment tree, from the innermost tree up.
#[derive(Clone, Debug, PartialEq)]
pub struct ProofSpecs(Vec<ProofSpec>);

impl ProofSpecs {
    /// The specs of a Cosmos SDK chain: an IAVL application store inside a Tendermint
    /// simple-Merkle multistore.
    #[must_use]
    pub fn cosmos() -> Self {
        Self(vec![ics23::iavl_spec(), ics23::tendermint_spec()])
    }

    /// Returns the number of layers covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the specs, innermost first.
    pub fn iter(&self) -> impl Iterator<Item = &ProofSpec> {
        self.0.iter()
    }

    /// Returns the spec of layer `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ProofSpec> {
        self.0.get(index)
    }

    /// Checks that every spec has both a leaf spec and an inner spec.
    /// # Errors
    /// Returns [`CommitmentError::IncompleteProofSpec`] with the first incomplete position.
    pub fn validate(&self) -> Result<(), CommitmentError> {
        self.0
            .iter()
            .position(|spec| spec.leaf_spec.is_none() || spec.inner_spec.is_none())
            .map_or(Ok(()), |i| Err(CommitmentError::IncompleteProofSpec(i)))
    }
}

impl Default for ProofSpecs {
    fn default() -> Self {
        Self::cosmos()
    }
}

impl From<Vec<ProofSpec>> for ProofSpecs {
    fn from(specs: Vec<ProofSpec>) -> Self {
        Self(specs)
    }
}

impl From<ProofSpecs> for Vec<ProofSpec> {
    fn from(specs: ProofSpecs) -> Self {
        specs.0
    }
}

// Specs are serialized as their hex-encoded protobuf bytes.
impl Serialize for ProofSpecs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for spec in &self.0 {
            seq.serialize_element(&hex::encode(spec.encode_to_vec()))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ProofSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| {
                let bytes = hex::decode(s).map_err(de::Error::custom)?;
                ProofSpec::decode(bytes.as_slice()).map_err(de::Error::custom)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmos_specs_are_complete() {
        let specs = ProofSpecs::cosmos();
        assert_eq!(specs.len(), 2);
        specs.validate().unwrap();
    }

    #[test]
    fn missing_inner_spec_is_reported_by_position() {
        let mut tendermint = ics23::tendermint_spec();
        tendermint.inner_spec = None;
        let specs = ProofSpecs::from(vec![ics23::iavl_spec(), tendermint]);

        assert_eq!(
            specs.validate(),
            Err(CommitmentError::IncompleteProofSpec(1))
        );
    }

    #[test]
    fn specs_survive_json() {
        let specs = ProofSpecs::cosmos();
        let json = serde_json::to_string(&specs).unwrap();
        assert_eq!(serde_json::from_str::<ProofSpecs>(&json).unwrap(), specs);
    }
}
