//! Fixed-width management header.
//!
//! ```text
//! ┌────┬───────┬──────────┬──────────┬─────┬────┐
//! │ op │ flags │ len      │ group    │ seq │ id │
//! │ u8 │ u8    │ u16 BE   │ u16 BE   │ u8  │ u8 │
//! └────┴───────┴──────────┴──────────┴─────┴────┘
//! ```
//!
//! No padding separates the fields; the header is exactly [`HEADER_LEN`]
//! bytes.

use std::fmt;

use derive_more::Into;

use super::DecodeError;
use crate::byte_order::{read_network_u16_at, write_network_u16};

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 8;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Operation carried by a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Request to read state from the device.
    Read = 0,
    /// Response to [`Op::Read`].
    ReadRsp = 1,
    /// Request to change state on the device.
    Write = 2,
    /// Response to [`Op::Write`].
    WriteRsp = 3,
}

impl Op {
    /// Whether this operation is a response.
    #[must_use]
    pub const fn is_response(self) -> bool { matches!(self, Self::ReadRsp | Self::WriteRsp) }

    /// The response operation answering this one.
    ///
    /// Response operations map to themselves.
    #[must_use]
    pub const fn response(self) -> Self {
        match self {
            Self::Read | Self::ReadRsp => Self::ReadRsp,
            Self::Write | Self::WriteRsp => Self::WriteRsp,
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::ReadRsp),
            2 => Ok(Self::Write),
            3 => Ok(Self::WriteRsp),
            other => Err(DecodeError::UnknownField {
                field: "op",
                value: u16::from(other),
            }),
        }
    }
}

impl From<Op> for u8 {
    fn from(op: Op) -> Self { op as u8 }
}

/// Command family a message belongs to.
///
/// Groups `0..=9` are the standard management families, groups from
/// [`Group::PER_USER_MIN`] upwards belong to applications, and the values in
/// between are reserved.
///
/// # Examples
///
/// ```
/// use mgmtwire::message::Group;
///
/// assert_eq!(Group::try_from(1).expect("image group"), Group::IMAGE);
/// assert!(Group::try_from(12).is_err());
/// assert!(Group::try_from(64).expect("per-user group").is_per_user());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Into)]
pub struct Group(u16);

impl Group {
    /// Default group: echo, console, task and memory statistics, reset.
    pub const DEFAULT: Self = Self(0);
    /// Image upload and slot management.
    pub const IMAGE: Self = Self(1);
    /// Statistics.
    pub const STATS: Self = Self(2);
    /// Configuration.
    pub const CONFIG: Self = Self(3);
    /// Logs.
    pub const LOGS: Self = Self(4);
    /// Crash test.
    pub const CRASH: Self = Self(5);
    /// Split image.
    pub const SPLIT: Self = Self(6);
    /// Test runner.
    pub const RUN: Self = Self(7);
    /// File system.
    pub const FS: Self = Self(8);
    /// Shell.
    pub const SHELL: Self = Self(9);
    /// First group number available to applications.
    pub const PER_USER_MIN: u16 = 64;

    const LAST_STANDARD: u16 = 9;

    /// Application-defined group at `PER_USER_MIN + offset`.
    ///
    /// Returns `None` if the group number would overflow `u16`.
    #[must_use]
    pub const fn per_user(offset: u16) -> Option<Self> {
        match Self::PER_USER_MIN.checked_add(offset) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Raw group number.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Whether this group belongs to applications rather than the standard set.
    #[must_use]
    pub const fn is_per_user(self) -> bool { self.0 >= Self::PER_USER_MIN }

    const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "default",
            1 => "image",
            2 => "stats",
            3 => "config",
            4 => "logs",
            5 => "crash",
            6 => "split",
            7 => "run",
            8 => "fs",
            9 => "shell",
            _ => return None,
        })
    }
}

impl TryFrom<u16> for Group {
    type Error = DecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= Self::LAST_STANDARD || value >= Self::PER_USER_MIN {
            Ok(Self(value))
        } else {
            Err(DecodeError::UnknownField {
                field: "group",
                value,
            })
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "per-user({})", self.0),
        }
    }
}

/// Decoded message header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    op: Op,
    flags: u8,
    len: u16,
    group: Group,
    seq: u8,
    id: u8,
}

impl Header {
    /// Create a header.
    #[must_use]
    pub const fn new(op: Op, flags: u8, len: u16, group: Group, seq: u8, id: u8) -> Self {
        Self {
            op,
            flags,
            len,
            group,
            seq,
            id,
        }
    }

    /// Operation kind.
    #[must_use]
    pub const fn op(&self) -> Op { self.op }

    /// Flag bits.
    #[must_use]
    pub const fn flags(&self) -> u8 { self.flags }

    /// Declared payload length.
    #[must_use]
    pub const fn payload_len(&self) -> u16 { self.len }

    /// Command family.
    #[must_use]
    pub const fn group(&self) -> Group { self.group }

    /// Correlation sequence number.
    #[must_use]
    pub const fn seq(&self) -> u8 { self.seq }

    /// Command identifier within the group.
    #[must_use]
    pub const fn id(&self) -> u8 { self.id }

    /// Encode the header in network byte order.
    ///
    /// # Examples
    ///
    /// ```
    /// use mgmtwire::message::{Group, Header, Op};
    ///
    /// let header = Header::new(Op::Write, 0, 0x0102, Group::IMAGE, 5, 1);
    /// assert_eq!(header.encode(), [2, 0, 0x01, 0x02, 0x00, 0x01, 5, 1]);
    /// ```
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let [len_hi, len_lo] = write_network_u16(self.len);
        let [group_hi, group_lo] = write_network_u16(self.group.get());
        [
            u8::from(self.op),
            self.flags,
            len_hi,
            len_lo,
            group_hi,
            group_lo,
            self.seq,
            self.id,
        ]
    }

    /// Decode a header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteHeader`] if `buf` is shorter than
    /// [`HEADER_LEN`], and [`DecodeError::UnknownField`] for an undefined
    /// operation or a reserved group.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let incomplete = DecodeError::IncompleteHeader {
            have: buf.len(),
            need: HEADER_LEN,
        };
        let Some(&[op, flags, _, _, _, _, seq, id]) = buf.get(..HEADER_LEN) else {
            return Err(incomplete);
        };
        let (Some(len), Some(group)) = (read_network_u16_at(buf, 2), read_network_u16_at(buf, 4))
        else {
            return Err(incomplete);
        };

        Ok(Self {
            op: Op::try_from(op)?,
            flags,
            len,
            group: Group::try_from(group)?,
            seq,
            id,
        })
    }
}
