//! Helpers for explicit network byte-order conversions.
//!
//! Every multi-byte field on the wire (frame lengths, checksums, header
//! lengths and groups) is big-endian. Keeping the conversions here scopes the
//! Clippy expectations to a single place so codec code stays free of lint
//! annotations.

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use mgmtwire::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use mgmtwire::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x12, 0x34]), 0x1234);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u16::from_be_bytes(bytes)
}

/// Read a network-order `u16` starting at `offset`, if two bytes are present.
///
/// # Examples
///
/// ```
/// use mgmtwire::byte_order::read_network_u16_at;
///
/// assert_eq!(read_network_u16_at(&[0xff, 0x01, 0x02], 1), Some(0x0102));
/// assert_eq!(read_network_u16_at(&[0xff, 0x01], 1), None);
/// ```
#[must_use]
pub fn read_network_u16_at(buf: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    let pair: [u8; 2] = buf.get(offset..end)?.try_into().ok()?;
    Some(read_network_u16(pair))
}
