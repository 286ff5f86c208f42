//! The raw memory provider: a thin `sbrk(2)` wrapper that also tracks the
//! provisioned region's bounds (`heap_low()`/`heap_high()`), needed for
//! boundary checks this allocator's heap checker performs.

use std::ptr::{self, NonNull};

/// Tracks the heap region handed out by `sbrk`, and the contiguous byte
/// range reported by `heap_low`/`heap_high`.
pub(crate) struct RawProvider {
  base: Option<NonNull<u8>>,
  len: usize,
}

impl RawProvider {
  pub(crate) const fn new() -> Self {
    Self { base: None, len: 0 }
  }

  /// Requests `bytes` additional, contiguous heap bytes from the OS.
  ///
  /// Returns the start of the newly-provisioned region (the old program
  /// break), or `None` if `sbrk` signals failure. Monotonic growth only:
  /// this never shrinks the heap.
  pub(crate) fn raw_extend(&mut self, bytes: usize) -> Option<NonNull<u8>> {
    let old_brk = unsafe { libc::sbrk(bytes as libc::intptr_t) };
    if old_brk as isize == -1 {
      log::debug!("sbrk({bytes}) failed: provider exhausted");
      return None;
    }

    let start = NonNull::new(old_brk as *mut u8)?;
    if self.base.is_none() {
      self.base = Some(start);
    }
    self.len += bytes;
    Some(start)
  }

  /// Inclusive lower bound of the currently-provisioned region.
  pub(crate) fn heap_low(&self) -> *const u8 {
    self.base.map_or(ptr::null(), |b| b.as_ptr())
  }

  /// Inclusive upper bound (the last valid byte) of the currently-provisioned
  /// region.
  pub(crate) fn heap_high(&self) -> *const u8 {
    self.base.map_or(ptr::null(), |b| unsafe { b.as_ptr().add(self.len - 1) })
  }
}
