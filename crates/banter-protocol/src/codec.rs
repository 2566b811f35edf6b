//! Codec trait and implementations for the transport edge.
//!
//! The coordinator core never touches bytes; the transport picks a
//! [`Codec`] to turn [`crate::Command`] and [`crate::Notification`]
//! values into whatever goes on the wire. [`JsonCodec`] is the default;
//! a binary codec can be swapped in without touching any other code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts message types to bytes and back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Human-readable, which is what the browser clients consume anyway.
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use banter_protocol::{Codec, Command, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let cmd = Command::StartGame { code: RoomCode::from("Apple1") };
///
/// let bytes = codec.encode(&cmd).unwrap();
/// let decoded: Command = codec.decode(&bytes).unwrap();
/// assert_eq!(cmd, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
