//! Typed payload helpers.
//!
//! The protocol core treats payloads as opaque bytes. Callers that prefer
//! structured payloads can derive bincode's [`Encode`] and [`BorrowDecode`]
//! and use the blanket [`Payload`] implementation to move between values and
//! payload bytes.

use bincode::{BorrowDecode, Encode, borrow_decode_from_slice, config, encode_to_vec};
use bytes::Bytes;

use super::{DecodeError, EncodeError};

/// Value that can travel as a message payload.
///
/// # Examples
///
/// ```
/// use mgmtwire::message::Payload;
///
/// #[derive(bincode::Encode, bincode::BorrowDecode, Debug, PartialEq)]
/// struct Echo {
///     data: String,
/// }
///
/// let bytes = Echo { data: "hi".into() }.to_payload().expect("encode");
/// assert_eq!(Echo::from_payload(&bytes).expect("decode").data, "hi");
/// ```
pub trait Payload: Encode + for<'de> BorrowDecode<'de, ()> {
    /// Encode the value using bincode's standard configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Payload`] if encoding fails.
    fn to_payload(&self) -> Result<Bytes, EncodeError> {
        encode_to_vec(self, config::standard())
            .map(Bytes::from)
            .map_err(EncodeError::Payload)
    }

    /// Decode a value from payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Payload`] if the bytes are not a valid encoding.
    fn from_payload(bytes: &[u8]) -> Result<Self, DecodeError>
    where
        Self: Sized,
    {
        let (value, _consumed) =
            borrow_decode_from_slice(bytes, config::standard()).map_err(DecodeError::Payload)?;
        Ok(value)
    }
}

impl<T> Payload for T where for<'de> T: Encode + BorrowDecode<'de, ()> {}
