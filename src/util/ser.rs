//! Helpful serialization tools.
//!
//! Binary serialization is DER (via rasn) because it's deterministic: the same
//! logical block always produces the same bytes, which is what lets two
//! parties agree on a block's hash and on the bytes an inviter signed. The
//! human-readable format is YAML, with any binary data base64 encoded.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rasn::{types::OctetString, AsnType, Decode, Encode};
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

pub(crate) fn serialize<T: Encode>(obj: &T) -> Result<Vec<u8>> {
    rasn::der::encode(obj).map_err(|e| Error::Serialize(format!("{:?}", e)))
}

pub(crate) fn deserialize<T: Decode>(bytes: &[u8]) -> Result<T> {
    rasn::der::decode(bytes).map_err(|e| Error::Deserialize(format!("{:?}", e)))
}

pub(crate) fn serialize_text<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_yaml::to_string(obj)?)
}

pub(crate) fn deserialize_text<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_yaml::from_slice(bytes)?)
}

/// Convert bytes to base64
pub fn base64_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    URL_SAFE_NO_PAD.encode(bytes.as_ref())
}

/// Convert base64 to bytes
pub fn base64_decode<T: AsRef<[u8]>>(bytes: T) -> Result<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(bytes.as_ref())?)
}

/// A variable-length byte container: public keys, key ids, hashes and
/// signatures all travel as one of these.
///
/// Encodes as an ASN.1 OCTET STRING in binary form and as base64 in
/// human-readable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, AsnType, Encode, Decode)]
#[rasn(delegate)]
pub struct BinaryVec(OctetString);

impl BinaryVec {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab the inner bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Deref for BinaryVec {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for BinaryVec {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for BinaryVec {
    fn from(vec: Vec<u8>) -> Self {
        Self(OctetString::from(vec))
    }
}

impl From<&[u8]> for BinaryVec {
    fn from(slice: &[u8]) -> Self {
        Self(OctetString::copy_from_slice(slice))
    }
}

impl<const N: usize> From<[u8; N]> for BinaryVec {
    fn from(arr: [u8; N]) -> Self {
        Self::from(&arr[..])
    }
}

impl std::fmt::Display for BinaryVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", base64_encode(self.as_slice()))
    }
}

impl Serialize for BinaryVec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&base64_encode(self.as_slice()))
        } else {
            self.as_slice().serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for BinaryVec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = <String>::deserialize(deserializer)?;
            let bytes = base64_decode(s).map_err(de::Error::custom)?;
            Ok(Self::from(bytes))
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Ok(Self::from(bytes))
        }
    }
}
