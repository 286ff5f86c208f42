//! `GlobalAlloc` adapter, letting a [`Heap`] back the process allocator.
//!
//! Wraps the heap in a `Mutex` and forwards `GlobalAlloc::alloc`/`dealloc`
//! straight through to it.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::Mutex;

use crate::heap::Heap;

/// Wraps a [`Heap`] so it can be installed as `#[global_allocator]`.
///
/// A `Heap` has no internal locking of its own, so this adapter is the one
/// place concurrent callers are actually serialised, via a `Mutex`. Every
/// request is rounded up to 16-byte payload granularity regardless of
/// `layout.align()` — callers that need wider alignment than 16 bytes are
/// outside what this allocator supports.
pub struct Allocator(Mutex<Heap>);

impl Allocator {
  /// Creates an adapter around a fresh, uninitialised heap.
  pub const fn new() -> Self {
    Self(Mutex::new(Heap::new()))
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Self::new()
  }
}

unsafe impl GlobalAlloc for Allocator {
  unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
    let mut heap = self.0.lock().unwrap_or_else(|p| p.into_inner());
    heap.allocate(layout.size())
  }

  unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
    let mut heap = self.0.lock().unwrap_or_else(|p| p.into_inner());
    unsafe { heap.release(ptr) };
  }

  unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
    let mut heap = self.0.lock().unwrap_or_else(|p| p.into_inner());
    unsafe { heap.reallocate(ptr, new_size) }
  }

  unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
    let mut heap = self.0.lock().unwrap_or_else(|p| p.into_inner());
    heap.allocate_zeroed(1, layout.size())
  }
}
