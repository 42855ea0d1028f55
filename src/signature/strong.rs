//! The strong digest: a 16-byte cryptographic hash that disambiguates the
//! weak checksum's modest collision resistance. MD5 is used here, matching
//! the classic rsync-family choice and giving exactly the 16 bytes the wire
//! layout (spec section 6) requires.

use digest::Digest;
use md5::Md5;

/// A 16-byte strong digest.
pub type StrongDigest = [u8; 16];

/// Computes the strong digest of `buf`.
pub fn strong(buf: &[u8]) -> StrongDigest {
    let mut hasher = Md5::new();
    hasher.update(buf);
    hasher.finalize().into()
}
