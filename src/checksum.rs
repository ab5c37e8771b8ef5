//! CRC-16 integrity check carried by the final frame of every message.
//!
//! The variant is CRC-16/XMODEM (polynomial `0x1021`, initial value `0`, no
//! reflection, no final XOR), which is what small management agents on
//! serial links already compute.

use std::fmt;

use crc::{CRC_16_XMODEM, Crc, Digest};

static XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Incremental CRC-16/XMODEM state.
///
/// # Examples
///
/// ```
/// use mgmtwire::checksum::Crc16;
///
/// let mut crc = Crc16::new();
/// crc.update(b"1234");
/// crc.update(b"56789");
/// assert_eq!(crc.finish(), 0x31c3);
/// ```
#[derive(Clone)]
pub struct Crc16(Digest<'static, u16>);

impl Crc16 {
    /// Start a fresh checksum.
    #[must_use]
    pub fn new() -> Self { Self(XMODEM.digest()) }

    /// Fold `data` into the running checksum.
    pub fn update(&mut self, data: &[u8]) { self.0.update(data); }

    /// Return the checksum of everything folded in so far.
    #[must_use]
    pub fn finish(self) -> u16 { self.0.finalize() }
}

impl Default for Crc16 {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Crc16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Crc16").field(&self.0.clone().finalize()).finish()
    }
}

/// Compute the checksum of `data` in one call.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 { XMODEM.checksum(data) }
