//! Compression glue for the `BLOCK_DATA` payload (spec section 1 and 6).
//!
//! The protocol is agnostic to the codec as long as it is lossless and
//! byte-preserving; this crate uses `flate2`'s pure-Rust `miniz_oxide`
//! backend (no C toolchain required), the same default fallback the
//! `compress`/`protocol` crates in the wider rsync-family pack example ship
//! when no SIMD/zlib-ng feature is enabled.

use std::io::{self, Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

/// Compresses `block`. Per spec section 4.4, if compression would expand the
/// buffer the caller may fall back to sending the raw bytes with
/// `clen == olen`; this function always compresses and lets the caller
/// compare lengths and decide.
pub fn compress_block(block: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(block)?;
    encoder.finish()
}

/// Decompresses `compressed` into `out[..olen]` in place, verifying that
/// the stream produces exactly `olen` bytes and nothing more. Returns
/// `false` (not an I/O error) on any mismatch or malformed stream — this is
/// the `DecompressionFailure` case from spec section 7, which the caller
/// recovers from by skipping the block rather than aborting the session.
///
/// Writing into a caller-supplied buffer (rather than returning a fresh
/// `Vec`) lets callers route block-sized scratch space through a
/// [`crate::pool::Pool`] instead of allocating per block.
pub fn decompress_block_into(compressed: &[u8], olen: usize, out: &mut [u8]) -> bool {
    if olen > out.len() {
        return false;
    }
    let mut decoder = DeflateDecoder::new(compressed);
    if decoder.read_exact(&mut out[..olen]).is_err() {
        return false;
    }
    // Any byte still readable past `olen` means the stream decompressed to
    // more than the declared length.
    let mut trailing = [0u8; 1];
    matches!(decoder.read(&mut trailing), Ok(0))
}

/// Convenience wrapper over [`decompress_block_into`] for callers that do
/// not have a pooled buffer on hand (tests, and the occasional one-off
/// decode).
pub fn decompress_block(compressed: &[u8], olen: usize) -> Option<Vec<u8>> {
    let mut out = vec![0u8; olen];
    if decompress_block_into(compressed, olen, &mut out) {
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let block = b"hello hello hello hello hello hello world world world";
        let compressed = compress_block(block).unwrap();
        let decompressed = decompress_block(&compressed, block.len()).unwrap();
        assert_eq!(decompressed, block);
    }

    #[test]
    fn round_trips_empty_block() {
        let compressed = compress_block(&[]).unwrap();
        let decompressed = decompress_block(&compressed, 0).unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn mismatched_declared_length_fails_softly() {
        let block = vec![7u8; 200];
        let compressed = compress_block(&block).unwrap();
        assert!(decompress_block(&compressed, 199).is_none());
    }

    #[test]
    fn garbage_input_fails_softly() {
        assert!(decompress_block(b"not deflate data", 10).is_none());
    }
}
