//! deltasync - a block delta-synchronization file service.
//!
//! A client and server exchange per-block signatures over a small
//! line-and-binary TCP protocol so that only the blocks of a file that
//! actually changed are re-sent, rsync-style.

pub mod client;
pub mod compress;
pub mod config;
pub mod diff;
pub mod error;
pub mod index;
pub mod pool;
pub mod protocol;
pub mod server;
pub mod session;
pub mod signature;
pub mod wire;

pub use config::Config;
pub use error::{IndexError, Result, SyncError};
pub use server::serve;
