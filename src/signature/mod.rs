//! Block-signature primitives (spec section 4.1): a fast weak checksum, a
//! strong digest that disambiguates weak-checksum collisions, and the
//! signature equality rule the sync engine diffs against.

mod strong;
mod weak;


pub use strong::{strong, StrongDigest};
pub use weak::weak;

use byteorder::{ByteOrder, LittleEndian};

use crate::wire::SIG_WIRE_LEN;

/// A block signature: a weak checksum paired with a strong digest.
///
/// Two signatures are [`sig_eq`] iff both fields match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub weak: u32,
    pub strong: StrongDigest,
}

impl Signature {
    /// Computes the signature of `block`.
    pub fn of(block: &[u8]) -> Self {
        Self { weak: weak(block), strong: strong(block) }
    }

    /// Decodes one signature from its fixed 20-byte little-endian wire layout.
    pub fn from_wire(buf: &[u8; SIG_WIRE_LEN]) -> Self {
        let weak = LittleEndian::read_u32(&buf[0..4]);
        let mut strong = [0u8; 16];
        strong.copy_from_slice(&buf[4..20]);
        Self { weak, strong }
    }

    /// Encodes this signature into its fixed 20-byte little-endian wire layout.
    pub fn to_wire(self) -> [u8; SIG_WIRE_LEN] {
        let mut buf = [0u8; SIG_WIRE_LEN];
        LittleEndian::write_u32(&mut buf[0..4], self.weak);
        buf[4..20].copy_from_slice(&self.strong);
        buf
    }
}

/// True iff `s1` and `s2` describe the same block content.
pub fn sig_eq(s1: &Signature, s2: &Signature) -> bool {
    s1.weak == s2.weak && s1.strong == s2.strong
}

/// Computes the signature vector for `data` over the fixed `BLOCK_SIZE`
/// partition used throughout the protocol.
pub fn signatures_for(data: &[u8], block_size: usize) -> Vec<Signature> {
    if data.is_empty() {
        return vec![Signature::of(&[])];
    }
    data.chunks(block_size).map(Signature::of).collect()
}

/// Number of blocks a file of `filesize` bytes is partitioned into
/// (spec section 3: `ceil(filesize / BLOCK_SIZE)`, or 1 if `filesize == 0`).
pub fn nblocks_for(filesize: u64, block_size: usize) -> u64 {
    if filesize == 0 {
        return 1;
    }
    filesize.div_ceil(block_size as u64)
}
