use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

const MAX_POOLED: usize = 64;
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Pool of reusable line buffers shared by all producers of one logger.
///
/// A buffer is held by exactly one producer between [`checkout`](Self::checkout)
/// and the drop of the returned guard. Buffers lost to a panic are simply
/// reallocated later.
#[derive(Debug, Default)]
pub(crate) struct BufferPool {
    free: Mutex<Vec<String>>,
}

impl BufferPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn checkout(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_default();
        PooledBuffer { buf, pool: self }
    }

    fn give_back(&self, mut buf: String) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < MAX_POOLED {
            free.push(buf);
        }
    }

    #[cfg(test)]
    fn pooled(&self) -> usize {
        self.free.lock().len()
    }
}

/// A checked-out buffer; returns itself to the pool on drop.
pub(crate) struct PooledBuffer<'a> {
    buf: String,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}
