//! Institution signature attached to a verified proof.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 65-byte recoverable signature produced by a verifying institution.
///
/// The ledger only checks the length. Semantic verification of the signature
/// against the proof is delegated to an external verifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InstitutionSignature([u8; 65]);

impl InstitutionSignature {
    /// Required length of an institution signature in bytes.
    pub const LEN: usize = 65;

    pub fn new(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Build a signature from an untrusted byte slice. Returns `None` unless
    /// the slice is exactly [`InstitutionSignature::LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 65] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl fmt::Debug for InstitutionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstitutionSignature(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..)")
    }
}

impl Serialize for InstitutionSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for InstitutionSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SigVisitor;

        impl<'de> serde::de::Visitor<'de> for SigVisitor {
            type Value = InstitutionSignature;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "65 bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                InstitutionSignature::from_slice(v).ok_or_else(|| E::invalid_length(v.len(), &self))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut arr = [0u8; 65];
                for (i, byte) in arr.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(InstitutionSignature(arr))
            }
        }

        deserializer.deserialize_bytes(SigVisitor)
    }
}
