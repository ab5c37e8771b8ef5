//! In-memory management message and its canonical byte encoding.

use bytes::{Bytes, BytesMut};

use super::{DecodeError, EncodeError, Group, HEADER_LEN, Header, MAX_PAYLOAD_LEN, Op, Payload};
use crate::correlation::{Correlatable, CorrelationKey};

/// One logical request or response: header fields plus an opaque payload.
///
/// The payload length is not stored; it is taken from the payload whenever
/// the message is serialized.
///
/// # Examples
///
/// ```
/// use mgmtwire::message::{Group, Message, Op};
///
/// let request = Message::new(Op::Read, Group::DEFAULT, 0, &b"hi"[..]).with_seq(5);
/// let bytes = request.serialize().expect("serialize");
/// assert_eq!(Message::deserialize(&bytes).expect("deserialize"), request);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    op: Op,
    flags: u8,
    group: Group,
    seq: u8,
    id: u8,
    payload: Bytes,
}

impl Message {
    /// Create a message with zero flags and sequence number zero.
    #[must_use]
    pub fn new(op: Op, group: Group, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            op,
            flags: 0,
            group,
            seq: 0,
            id,
            payload: payload.into(),
        }
    }

    /// Create a message whose payload is `value` encoded with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Payload`] if the value cannot be encoded.
    pub fn with_payload<T: Payload>(
        op: Op,
        group: Group,
        id: u8,
        value: &T,
    ) -> Result<Self, EncodeError> {
        Ok(Self::new(op, group, id, value.to_payload()?))
    }

    /// Build the response matching `request`: same group, sequence number and
    /// command identifier, with the response operation.
    #[must_use]
    pub fn response_to(request: &Self, payload: impl Into<Bytes>) -> Self {
        Self {
            op: request.op.response(),
            flags: request.flags,
            group: request.group,
            seq: request.seq,
            id: request.id,
            payload: payload.into(),
        }
    }

    /// Reassemble a message from a decoded header and its payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LengthMismatch`] if the header's declared length
    /// differs from the payload length.
    pub fn from_parts(header: Header, payload: impl Into<Bytes>) -> Result<Self, DecodeError> {
        let payload = payload.into();
        let declared = usize::from(header.payload_len());
        if declared != payload.len() {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }
        Ok(Self {
            op: header.op(),
            flags: header.flags(),
            group: header.group(),
            seq: header.seq(),
            id: header.id(),
            payload,
        })
    }

    /// Replace the flag bits.
    #[must_use]
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the sequence number.
    #[must_use]
    pub fn with_seq(mut self, seq: u8) -> Self {
        self.seq = seq;
        self
    }

    /// Operation kind.
    #[must_use]
    pub const fn op(&self) -> Op { self.op }

    /// Flag bits.
    #[must_use]
    pub const fn flags(&self) -> u8 { self.flags }

    /// Command family.
    #[must_use]
    pub const fn group(&self) -> Group { self.group }

    /// Correlation sequence number.
    #[must_use]
    pub const fn seq(&self) -> u8 { self.seq }

    /// Command identifier within the group.
    #[must_use]
    pub const fn id(&self) -> u8 { self.id }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Consume the message, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Decode the payload with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Payload`] if the payload is not a valid `T`.
    pub fn decode_payload<T: Payload>(&self) -> Result<T, DecodeError> {
        T::from_payload(&self.payload)
    }

    /// Header describing this message.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Overflow`] if the payload is longer than
    /// [`MAX_PAYLOAD_LEN`].
    pub fn header(&self) -> Result<Header, EncodeError> {
        let len = u16::try_from(self.payload.len()).map_err(|_| EncodeError::Overflow {
            len: self.payload.len(),
            max: MAX_PAYLOAD_LEN,
        })?;
        Ok(Header::new(
            self.op, self.flags, len, self.group, self.seq, self.id,
        ))
    }

    /// Append the encoded message to `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Overflow`] if the payload is longer than
    /// [`MAX_PAYLOAD_LEN`]; `dst` is left unchanged.
    pub fn serialize_into(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let header = self.header()?;
        dst.reserve(HEADER_LEN + self.payload.len());
        dst.extend_from_slice(&header.encode());
        dst.extend_from_slice(&self.payload);
        Ok(())
    }

    /// Encode the message as header followed by payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Overflow`] if the payload is longer than
    /// [`MAX_PAYLOAD_LEN`].
    pub fn serialize(&self) -> Result<Bytes, EncodeError> {
        let mut dst = BytesMut::with_capacity(HEADER_LEN + self.payload.len());
        self.serialize_into(&mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode a message from exactly one serialized message's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteHeader`] for short input,
    /// [`DecodeError::LengthMismatch`] if the declared payload length differs
    /// from the bytes after the header, and [`DecodeError::UnknownField`] for
    /// an undefined operation or reserved group.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(bytes)?;
        Self::from_parts(header, Bytes::copy_from_slice(&bytes[HEADER_LEN..]))
    }
}

impl Correlatable for Message {
    fn correlation_key(&self) -> CorrelationKey { CorrelationKey::new(self.group, self.seq) }

    fn set_seq(&mut self, seq: u8) { self.seq = seq; }
}

/// Serialize `message` into its wire encoding.
///
/// # Errors
///
/// See [`Message::serialize`].
pub fn serialize_request(message: &Message) -> Result<Bytes, EncodeError> { message.serialize() }

/// Deserialize one message from its wire encoding.
///
/// # Errors
///
/// See [`Message::deserialize`].
pub fn deserialize_nmgr_req(bytes: &[u8]) -> Result<Message, DecodeError> {
    Message::deserialize(bytes)
}
