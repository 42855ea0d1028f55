//! Semantic error kinds for the sync engine (spec section 7). These name
//! failure *causes*, not wire status codes — the protocol itself has no
//! error replies; a failed session simply closes or skips a block.

use std::io;

/// Failures that can occur while driving one sync session (client or server
/// side). Each variant documents the recovery policy spec section 7 assigns
/// it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Malformed header, unexpected message order, or a bad `BLOCK_DATA`
    /// prefix. Policy: log and close the connection; no index update.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The peer closed the connection (or the network failed) before a full
    /// message could be read. Policy: abort the session; no index update.
    #[error("short read: {0}")]
    ShortRead(#[source] io::Error),

    /// The peer disconnected (or the network failed) before a full message
    /// could be written. Policy: abort the session; no index update.
    #[error("short write: {0}")]
    ShortWrite(#[source] io::Error),

    /// A local disk failure touching the output file. Policy: abort the
    /// session.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Allocation or resource exhaustion. Policy: abort the session.
    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// The index store's own failure modes (spec section 4.2).
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The persistence file exists but could not be parsed.
    #[error("corrupt index file: {0}")]
    CorruptIndex(String),

    /// A durable-save or load operation failed at the filesystem layer.
    #[error("index I/O error: {0}")]
    IoError(#[from] io::Error),
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
