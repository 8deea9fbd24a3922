//! This module provides custom serde implementations.

/// Serialize bytes as a lowercase hex string.
///
/// Works for any type that can be viewed as a byte slice and rebuilt from a `Vec<u8>`,
/// so both `Vec<u8>` and fixed size arrays such as `[u8; 32]` are supported.
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for bytes.
    /// # Errors
    /// Returns an error if the serializer rejects the string.
    pub fn serialize<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Implements the serde `deserialize` function for bytes.
    /// # Errors
    /// Returns an error if the string is not valid hex or has the wrong length.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: TryFrom<Vec<u8>>,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(de::Error::custom)?;
        let len = bytes.len();
        T::try_from(bytes)
            .map_err(|_| de::Error::custom(format!("unexpected byte length {len}")))
    }
}

/// Serialize a list of byte strings as a list of hex strings.
pub mod hex_bytes_list {
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a list of byte strings.
    /// # Errors
    /// Returns an error if the serializer rejects the sequence.
    pub fn serialize<S>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(list.len()))?;
        for bytes in list {
            seq.serialize_element(&hex::encode(bytes))?;
        }
        seq.end()
    }

    /// Implements the serde `deserialize` function for a list of byte strings.
    /// # Errors
    /// Returns an error if any entry is not valid hex.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| hex::decode(s).map_err(de::Error::custom))
            .collect()
    }
}

/// Serialize a number as a string.
pub mod number_as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a number.
    /// # Errors
    /// Returns an error if the number cannot be serialized.
    pub fn serialize<T, S>(number: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ToString,
        S: Serializer,
    {
        serializer.serialize_str(&number.to_string())
    }

    /// Implements the serde `deserialize` function for a number.
    /// # Errors
    /// Returns an error if the string cannot be deserialized to a number.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Fixture {
        #[serde(with = "super::hex_bytes")]
        hash: [u8; 4],
        #[serde(with = "super::hex_bytes")]
        data: Vec<u8>,
        #[serde(with = "super::hex_bytes_list")]
        path: Vec<Vec<u8>>,
        #[serde(with = "super::number_as_string")]
        timestamp: u64,
    }

    #[test]
    fn fixture_serializes_to_hex_strings() {
        let fixture = Fixture {
            hash: [0xde, 0xad, 0xbe, 0xef],
            data: vec![1, 2],
            path: vec![b"ibc".to_vec(), vec![]],
            timestamp: u64::MAX,
        };

        let json = serde_json::to_value(&fixture).unwrap();
        assert_eq!(json["hash"], "deadbeef");
        assert_eq!(json["data"], "0102");
        assert_eq!(json["path"], serde_json::json!(["696263", ""]));
        assert_eq!(json["timestamp"], "18446744073709551615");

        let decoded: Fixture = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, fixture);
    }

    #[test]
    fn fixed_size_bytes_reject_wrong_length() {
        let json = serde_json::json!({
            "hash": "deadbeefff",
            "data": "",
            "path": [],
            "timestamp": "1",
        });

        let err = serde_json::from_value::<Fixture>(json).unwrap_err();
        assert!(err.to_string().contains("unexpected byte length 5"));
    }
}
