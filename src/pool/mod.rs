//! A small fixed-size buffer pool for block-sized scratch space, adapted
//! from the teacher's `allocator` module.
//!
//! The teacher's `Allocator` additionally chains several pooled buffers
//! together so a single logical read can span more bytes than one buffer
//! holds — necessary there because NFS reads may request arbitrary sizes.
//! Every block in this protocol is bounded by the single constant
//! `BLOCK_SIZE`, so one pooled [`Buffer`] is always enough; the chaining
//! layer (`allocator::chain`, `allocator::list`) has no counterpart here.

mod buffer;

pub use buffer::Buffer;

use std::num::NonZeroUsize;

use tokio::sync::mpsc;

/// A pool of fixed-size buffers, borrowed and returned via a bounded
/// channel. `checkout` blocks (asynchronously) until a buffer is available,
/// guaranteeing the pool never grows unbounded under load.
pub struct Pool {
    sender: mpsc::Sender<Buffer>,
    receiver: mpsc::Receiver<Buffer>,
}

impl Pool {
    /// Creates a pool of `count` buffers, each `buffer_size` bytes.
    pub async fn new(buffer_size: NonZeroUsize, count: NonZeroUsize) -> Self {
        let (sender, receiver) = mpsc::channel(count.get());
        for _ in 0..count.get() {
            sender.send(Buffer::new(buffer_size)).await.expect("pool channel just created");
        }
        Self { sender, receiver }
    }

    /// Checks out a buffer, returning a guard that hands it back to the pool
    /// when dropped — released on every path, including early returns or
    /// panics unwinding through it (spec section 5's "scoped acquisition
    /// with guaranteed release").
    pub async fn checkout(&mut self) -> PooledBuffer {
        let buffer = self.receiver.recv().await.expect("pool sender outlives its receiver");
        PooledBuffer { buffer: Some(buffer), sender: self.sender.clone() }
    }
}

/// An RAII handle on a pooled [`Buffer`]. Returns the buffer to its pool on
/// drop.
pub struct PooledBuffer {
    buffer: Option<Buffer>,
    sender: mpsc::Sender<Buffer>,
}

impl std::ops::Deref for PooledBuffer {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        self.buffer.as_ref().expect("buffer taken only on drop")
    }
}

impl std::ops::DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Buffer {
        self.buffer.as_mut().expect("buffer taken only on drop")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            // A full channel or a closed receiver just means the pool is
            // already being torn down; dropping the buffer is fine.
            let _ = self.sender.try_send(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkout_and_drop_returns_buffer_to_pool() {
        let size = NonZeroUsize::new(crate::wire::BLOCK_SIZE).unwrap();
        let mut pool = Pool::new(size, NonZeroUsize::new(1).unwrap()).await;
        {
            let mut buf = pool.checkout().await;
            buf[0] = 42;
        }
        let buf = pool.checkout().await;
        assert_eq!(buf.len(), crate::wire::BLOCK_SIZE);
    }
}
