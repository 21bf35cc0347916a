//! Codec trait and the CBOR implementation.
//!
//! The dispatcher doesn't care how records become bytes — it goes
//! through the [`WireCodec`] trait, and the concrete format lives
//! behind a feature flag. [`CborCodec`] is the production codec: the
//! protocol's "compact binary map" is a CBOR map with single-character
//! text keys.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes request records to bytes and decodes notification payloads
/// back into typed records.
pub trait WireCodec: Send + Sync + 'static {
    /// Serializes a record into its wire form.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] when the record cannot be
    /// represented on the wire (the caller's input is malformed).
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a notification payload into a record.
    ///
    /// # Errors
    /// Returns [`ProtocolError::EmptyPayload`] for zero-length input
    /// and [`ProtocolError::Decode`] for structurally malformed bytes.
    /// Absent map tags are NOT an error — record types default them.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`WireCodec`] producing CBOR via `ciborium`.
#[cfg(feature = "cbor")]
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

#[cfg(feature = "cbor")]
impl WireCodec for CborCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out)
            .map_err(ProtocolError::Encode)?;
        Ok(out)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        ciborium::de::from_reader(data).map_err(ProtocolError::Decode)
    }
}
