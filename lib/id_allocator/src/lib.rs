#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

/// Hands out `usize` ids and takes them back for reuse.
pub trait IdAllocator {
    /// Returns `None` once the id range is exhausted.
    fn alloc(&mut self) -> Option<usize>;

    /// Gives `id` back.
    ///
    /// # Safety
    ///
    /// `id` must come from `alloc` on this allocator and must not have been
    /// given back already.
    unsafe fn dealloc(&mut self, id: usize);

    /// Number of ids currently handed out.
    fn in_use(&self) -> usize;
}

/// Allocates ids from `from..to`, preferring recycled ids over fresh ones.
pub struct VecIdAllocator {
    start: usize,
    next: usize,
    end: usize,
    recycled: Vec<usize>,
}

impl VecIdAllocator {
    /// # Panics
    ///
    /// Panics in debug builds if `from >= to`.
    pub fn new(from: usize, to: usize) -> Self {
        debug_assert!(from < to);
        VecIdAllocator {
            start: from,
            next: from,
            end: to,
            recycled: Vec::new(),
        }
    }
}

impl IdAllocator for VecIdAllocator {
    fn alloc(&mut self) -> Option<usize> {
        if let Some(id) = self.recycled.pop() {
            return Some(id);
        }
        (self.next < self.end).then(|| {
            self.next += 1;
            self.next - 1
        })
    }

    unsafe fn dealloc(&mut self, id: usize) {
        debug_assert!(id >= self.start && id < self.next, "id {id} never allocated");
        debug_assert!(!self.recycled.contains(&id), "id {id} freed twice");
        self.recycled.push(id);
    }

    fn in_use(&self) -> usize {
        self.next - self.start - self.recycled.len()
    }
}
