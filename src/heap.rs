//! Heap lifecycle and public API: initialisation (prologue/epilogue
//! sentinels), growth via the raw provider, and the four public entry
//! points.

use std::ptr::{self, NonNull};

use crate::align::round_up;
use crate::block::{BlockPtr, DSIZE, MIN_BLOCK_SIZE, WSIZE};
use crate::check::check_heap;
use crate::coalesce::{coalesce, split};
use crate::list::FreeIndex;
use crate::placement::find_fit;
use crate::sbrk::RawProvider;

/// Minimum amount the heap is grown by when no free block satisfies a
/// request.
pub(crate) const EXTEND_CHUNK: usize = 4096;

/// A segregated free-list heap over a contiguous, `sbrk`-backed region.
///
/// Every public method restores the block-layout invariants before
/// returning. There is no internal locking: a single mutator is assumed,
/// and `&mut self` on every mutating method is how that assumption is
/// expressed in the type rather than enforced at runtime.
pub struct Heap {
  provider: RawProvider,
  heap_start: Option<BlockPtr>,
  index: FreeIndex,
}

impl Heap {
  /// Creates an uninitialised heap. No `sbrk` call happens until the first
  /// `allocate`.
  pub const fn new() -> Self {
    Self { provider: RawProvider::new(), heap_start: None, index: FreeIndex::new() }
  }

  /// Initialises the heap: writes the prologue/epilogue sentinels and
  /// performs the first extension.
  ///
  /// Idempotent-safe in the sense `allocate` relies on: calling `allocate`
  /// on a fresh `Heap` triggers this automatically.
  pub fn init(&mut self) -> bool {
    let Some(start) = self.provider.raw_extend(2 * WSIZE) else {
      return false;
    };

    unsafe {
      let prologue = BlockPtr::at(NonNull::new_unchecked(start.as_ptr()));
      prologue.write_epilogue(false, false);
      let epilogue = BlockPtr::at(NonNull::new_unchecked(start.as_ptr().add(WSIZE)));
      epilogue.write_epilogue(true, false);
      self.heap_start = Some(epilogue);
    }

    log::debug!("heap initialised at {:p}", start.as_ptr());
    self.extend(EXTEND_CHUNK).is_some()
  }

  /// Extends the heap by at least `size` bytes (rounded up to a multiple of
  /// 16), coalescing the new block with the former tail if it was free.
  fn extend(&mut self, size: usize) -> Option<BlockPtr> {
    let size = round_up(size, DSIZE);
    let raw = self.provider.raw_extend(size)?;

    // The new region starts exactly where the old epilogue stood; its
    // header overwrites that word, inheriting the old epilogue's prev_*
    // flags (the true state of the block that used to precede it).
    let block = unsafe { BlockPtr::at(NonNull::new_unchecked(raw.as_ptr().sub(WSIZE))) };
    let prev_alloc = block.is_prev_allocated();
    let prev_mini = block.is_prev_mini();
    block.write(size, false, prev_alloc, prev_mini);

    let epilogue = block.next();
    epilogue.write_epilogue(block.is_allocated(), block.is_mini());

    log::debug!("heap extended by {size} bytes at {:p}", block.as_ptr());
    Some(coalesce(&mut self.index, block))
  }

  /// Allocates at least `n` bytes, returning a 16-byte-aligned payload
  /// pointer, or null on provider failure or when `n == 0`.
  pub fn allocate(&mut self, n: usize) -> *mut u8 {
    debug_assert!(check_heap(self, line!()));

    if self.heap_start.is_none() && !self.init() {
      return ptr::null_mut();
    }

    if n == 0 {
      debug_assert!(check_heap(self, line!()));
      return ptr::null_mut();
    }

    let asize = round_up(n + WSIZE, DSIZE).max(MIN_BLOCK_SIZE);

    let block = match find_fit(&self.index, asize) {
      Some(block) => block,
      None => {
        let extend_size = asize.max(EXTEND_CHUNK);
        match self.extend(extend_size) {
          Some(block) => block,
          None => return ptr::null_mut(),
        }
      }
    };

    self.index.remove(block);
    let prev_alloc = block.is_prev_allocated();
    let prev_mini = block.is_prev_mini();
    block.write(block.size(), true, prev_alloc, prev_mini);
    block.next().write_prev_alloc(true);

    if let Some(remainder) = split(block, asize) {
      coalesce(&mut self.index, remainder);
    }

    log::trace!("allocate({n}) -> bucket asize={asize}, block at {:p}", block.as_ptr());
    debug_assert!(check_heap(self, line!()));
    block.payload().as_ptr()
  }

  /// Releases a previously-allocated payload pointer. A no-op for null.
  ///
  /// # Safety
  /// `p` must be null or a payload pointer previously returned by
  /// `allocate`/`reallocate`/`allocate_zeroed` on this `Heap`, not yet
  /// released.
  pub unsafe fn release(&mut self, p: *mut u8) {
    debug_assert!(check_heap(self, line!()));

    let Some(payload) = NonNull::new(p) else {
      return;
    };

    let block = BlockPtr::from_payload(payload);
    debug_assert!(block.is_allocated());
    let prev_alloc = block.is_prev_allocated();
    let prev_mini = block.is_prev_mini();
    block.write(block.size(), false, prev_alloc, prev_mini);
    block.next().write_prev_alloc(false);

    log::trace!("release: block at {:p}, size={}", block.as_ptr(), block.size());
    coalesce(&mut self.index, block);
    debug_assert!(check_heap(self, line!()));
  }

  /// Resizes an allocation, preserving its leading `min(old, new)` bytes.
  /// `p == null` behaves like `allocate(n)`; `n == 0` behaves like
  /// `release(p)` followed by returning null. Always allocates a fresh
  /// block and copies — there is no in-place optimisation.
  ///
  /// # Safety
  /// `p` must be null or a live payload pointer from this `Heap`.
  pub unsafe fn reallocate(&mut self, p: *mut u8, n: usize) -> *mut u8 {
    debug_assert!(check_heap(self, line!()));

    let Some(old_payload) = NonNull::new(p) else {
      return self.allocate(n);
    };

    if n == 0 {
      unsafe { self.release(p) };
      return ptr::null_mut();
    }

    let old_block = BlockPtr::from_payload(old_payload);
    let old_payload_size = old_block.size() - WSIZE;

    let new_ptr = self.allocate(n);
    if new_ptr.is_null() {
      return ptr::null_mut();
    }

    let copy_size = old_payload_size.min(n);
    unsafe { ptr::copy_nonoverlapping(p, new_ptr, copy_size) };
    unsafe { self.release(p) };
    new_ptr
  }

  /// Allocates `count * size` bytes and zero-fills them. Rejects `count ==
  /// 0` and overflow in `count * size` by returning null.
  pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> *mut u8 {
    if count == 0 {
      return ptr::null_mut();
    }

    let Some(total) = count.checked_mul(size) else {
      log::warn!("allocate_zeroed({count}, {size}) overflowed");
      return ptr::null_mut();
    };

    let p = self.allocate(total);
    if !p.is_null() {
      unsafe { ptr::write_bytes(p, 0, total) };
    }
    p
  }

  pub(crate) fn heap_start(&self) -> Option<BlockPtr> {
    self.heap_start
  }

  pub(crate) fn heap_low(&self) -> *const u8 {
    self.provider.heap_low()
  }

  pub(crate) fn heap_high(&self) -> *const u8 {
    self.provider.heap_high()
  }

  pub(crate) fn index(&self) -> &FreeIndex {
    &self.index
  }

  /// Walks the heap and every free-list index, checking boundary-tag and
  /// free-list invariants. Exposed as a public operation (not just the
  /// internal `debug_assert!` wiring in `allocate`/`release`/`reallocate`)
  /// so a caller can audit heap consistency on demand, e.g. from a test
  /// driver. `line` is only a caller-supplied hint folded into the log
  /// message on failure.
  pub fn check_heap(&self, line: u32) -> bool {
    check_heap(self, line)
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new()
  }
}
