//! Wire-level constants shared by the client and server halves of the
//! delta-synchronization protocol (spec section 6).

/// Fixed block size, in bytes, that the whole protocol partitions files into.
pub const BLOCK_SIZE: usize = 1024;

/// Maximum length, in bytes, of a `basename` accepted in a header line.
pub const MAX_PATH_LEN: usize = 1024;

/// Default TCP port the server listens on.
pub const TCP_PORT: u16 = 9000;

/// Default directory synchronized files are written into.
pub const SYNC_DIR: &str = "syncedData";

/// Default file name of the persisted signature index.
pub const INDEX_FILE: &str = "index.db";

/// Size, in bytes, of one [`crate::signature::Signature`] on the wire.
pub const SIG_WIRE_LEN: usize = 20;
