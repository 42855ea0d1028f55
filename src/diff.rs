//! The DIFF phase (spec section 4.3): decides which blocks are stale given
//! the stored entry (if any) and the incoming signature vector. Pulled out
//! as a pure function so the policy — the part of this engine most likely
//! to be gotten subtly wrong — is unit-testable without any networking.

use crate::index::FileEntry;
use crate::signature::{sig_eq, Signature};

/// Returns the indices of blocks that must be requested from the client.
///
/// Policy (spec section 4.3):
/// - No prior entry: every block is stale.
/// - Prior entry's `nblocks` differs: every block is stale (no per-index
///   comparison is attempted — the file's layout changed).
/// - Otherwise: block `i` is stale unless `sig_eq(entry.sigs[i], incoming[i])`.
pub fn stale_blocks(prior: Option<&FileEntry>, incoming: &[Signature]) -> Vec<u64> {
    let nblocks = incoming.len() as u64;
    match prior {
        None => (0..nblocks).collect(),
        Some(entry) if entry.nblocks != nblocks => (0..nblocks).collect(),
        Some(entry) => (0..incoming.len())
            .filter(|&i| !sig_eq(&entry.sigs[i], &incoming[i]))
            .map(|i| i as u64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_of(sigs: Vec<Signature>) -> FileEntry {
        let nblocks = sigs.len() as u64;
        FileEntry { filename: "f".into(), filesize: 0, nblocks, sigs }
    }

    #[test]
    fn no_prior_entry_every_block_stale() {
        let incoming = vec![Signature::of(b"a"), Signature::of(b"b")];
        assert_eq!(stale_blocks(None, &incoming), vec![0, 1]);
    }

    #[test]
    fn identical_signatures_request_nothing() {
        let sigs = vec![Signature::of(b"a"), Signature::of(b"b")];
        let prior = entry_of(sigs.clone());
        assert_eq!(stale_blocks(Some(&prior), &sigs), Vec::<u64>::new());
    }

    #[test]
    fn single_differing_block_is_requested() {
        let prior = entry_of(vec![
            Signature::of(b"a"),
            Signature::of(b"b"),
            Signature::of(b"c"),
            Signature::of(b"d"),
        ]);
        let incoming =
            vec![Signature::of(b"a"), Signature::of(b"b"), Signature::of(b"X"), Signature::of(b"d")];
        assert_eq!(stale_blocks(Some(&prior), &incoming), vec![2]);
    }

    #[test]
    fn nblocks_mismatch_forces_every_block_stale() {
        let prior = entry_of(vec![Signature::of(b"a"); 4]);
        let incoming = vec![Signature::of(b"a"), Signature::of(b"b")];
        assert_eq!(stale_blocks(Some(&prior), &incoming), vec![0, 1]);
    }
}
