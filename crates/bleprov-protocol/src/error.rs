//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire records.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed — the caller's record cannot be
    /// represented on the wire. Reported synchronously; nothing is
    /// written to the transport.
    #[cfg(feature = "cbor")]
    #[error("encode failed: {0}")]
    Encode(ciborium::ser::Error<std::io::Error>),

    /// A notification payload was structurally malformed (not a CBOR
    /// map, truncated, or otherwise unparseable).
    #[cfg(feature = "cbor")]
    #[error("decode failed: {0}")]
    Decode(ciborium::de::Error<std::io::Error>),

    /// A notification arrived with a zero-length payload.
    #[error("empty notification payload")]
    EmptyPayload,
}
