use crate::signature::Signature;

/// Per-file signature record (spec section 3).
///
/// `filename` is always a basename — no directory components — and is the
/// key other registry lookups are keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub filename: String,
    pub filesize: u64,
    pub nblocks: u64,
    pub sigs: Vec<Signature>,
}

impl FileEntry {
    /// Builds an entry from a filename, a filesize, and the signature vector
    /// computed over that file's blocks. `sigs.len()` must equal
    /// [`crate::signature::nblocks_for`]`(filesize, block_size)`.
    pub fn new(filename: String, filesize: u64, sigs: Vec<Signature>) -> Self {
        let nblocks = sigs.len() as u64;
        Self { filename, filesize, nblocks, sigs }
    }
}
