//! Pooled output buffers for the JSON writers.
//!
//! A [`PooledBuffer`] is borrowed exclusively by one encode call and returned
//! to its [`BufferPool`] when dropped, on every exit path.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;
use tracing::{trace, warn};

/// A bounded free list of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    initial_bytes: usize,
    max_retained_bytes: usize,
}

impl BufferPool {
    /// Creates an empty pool.
    ///
    /// * `capacity` - maximum number of idle buffers kept
    /// * `initial_bytes` - capacity of newly allocated buffers
    /// * `max_retained_bytes` - larger buffers are dropped on release
    #[must_use]
    pub fn new(capacity: usize, initial_bytes: usize, max_retained_bytes: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            initial_bytes,
            max_retained_bytes,
        }
    }

    /// Borrows an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_bytes));
        PooledBuffer { buf, pool: self }
    }

    /// Number of idle buffers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_retained_bytes {
            warn!(
                capacity = buf.capacity(),
                limit = self.max_retained_bytes,
                "dropping oversized pooled buffer"
            );
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(buf);
        } else {
            trace!(idle = free.len(), "buffer pool full, dropping buffer");
        }
    }
}

/// A buffer borrowed from a [`BufferPool`].
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl PooledBuffer<'_> {
    /// Copies the contents out; the buffer itself goes back to the pool.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
