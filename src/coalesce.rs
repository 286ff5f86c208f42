//! Coalesce/split engine: merges adjacent free blocks bidirectionally and
//! splits oversized allocations, maintaining header-bit invariants on every
//! affected neighbour.
//!
//! A merged free block is always at least 32 bytes (it absorbs at least one
//! neighbour), so the successor's `prev_is_mini` is unconditionally written
//! `false` after a merge rather than recomputed.

use crate::block::{BlockPtr, MIN_BLOCK_SIZE};
use crate::list::FreeIndex;

/// Coalesces a freshly-freed block with its free neighbours, if any, and
/// (re)inserts the resulting block into the index.
///
/// # Preconditions
/// `block` is free and not currently present in any index.
pub(crate) fn coalesce(index: &mut FreeIndex, block: BlockPtr) -> BlockPtr {
  let current_size = block.size();
  let prev = if block.is_prev_allocated() { None } else { Some(block.prev()) };
  let next = block.next();
  let next_alloc = next.is_allocated();
  let next_size = next.size();

  match (prev, next_alloc) {
    // Both neighbours allocated: nothing to merge, just index this block.
    // `block` itself is now free, so its successor's prev_allocated flips
    // to false.
    (None, true) => {
      next.write(next_size, true, false, block.is_mini());
      index.insert(block);
      block
    }

    // Predecessor free, successor allocated: merge into `prev`.
    (Some(prev), true) => {
      index.remove(prev);
      let total = current_size + prev.size();
      let prev_prev_alloc = prev.is_prev_allocated();
      let prev_prev_mini = prev.is_prev_mini();
      prev.write(total, false, prev_prev_alloc, prev_prev_mini);
      next.write(next_size, true, false, false);
      index.insert(prev);
      prev
    }

    // Predecessor allocated, successor free: merge into `block`.
    (None, false) => {
      index.remove(next);
      let total = current_size + next_size;
      let prev_mini = block.is_prev_mini();
      block.write(total, false, true, prev_mini);
      let next_next = next.next();
      let next_next_size = next_next.size();
      let next_next_alloc = next_next.is_allocated();
      next_next.write(next_next_size, next_next_alloc, false, false);
      index.insert(block);
      block
    }

    // Both neighbours free: merge all three into `prev`.
    (Some(prev), false) => {
      index.remove(prev);
      index.remove(next);
      let total = current_size + prev.size() + next_size;
      let prev_prev_alloc = prev.is_prev_allocated();
      let prev_prev_mini = prev.is_prev_mini();
      prev.write(total, false, prev_prev_alloc, prev_prev_mini);
      let next_next = next.next();
      let next_next_size = next_next.size();
      let next_next_alloc = next_next.is_allocated();
      next_next.write(next_next_size, next_next_alloc, false, false);
      index.insert(prev);
      prev
    }
  }
}

/// Splits an allocated block if the remainder after `asize` bytes would
/// still be a valid block (>= 16 bytes). Returns the new free remainder,
/// temporarily un-indexed, for the caller to coalesce.
///
/// # Preconditions
/// `block` is allocated and not currently present in any index.
pub(crate) fn split(block: BlockPtr, asize: usize) -> Option<BlockPtr> {
  let block_size = block.size();
  if block_size - asize < MIN_BLOCK_SIZE {
    return None;
  }

  let prev_alloc = block.is_prev_allocated();
  let prev_mini = block.is_prev_mini();
  block.write(asize, true, prev_alloc, prev_mini);

  let remainder = block.next();
  let remainder_size = block_size - asize;
  remainder.write(remainder_size, false, true, asize == MIN_BLOCK_SIZE);

  let after = remainder.next();
  after.write_prev_alloc(false);

  Some(remainder)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ptr::NonNull;

  fn make_buf(len: usize) -> Vec<u8> {
    vec![0u8; len]
  }

  fn block_at(buf: &mut [u8], offset: usize) -> BlockPtr {
    unsafe { BlockPtr::at(NonNull::new_unchecked(buf.as_mut_ptr().add(offset))) }
  }

  #[test]
  fn coalesce_both_neighbours_allocated_just_indexes() {
    let mut buf = make_buf(96);
    let a = block_at(&mut buf, 0);
    a.write(32, false, true, false);
    let epilogue = block_at(&mut buf, 32);
    epilogue.write_epilogue(false, false);

    let mut index = FreeIndex::new();
    let result = coalesce(&mut index, a);

    assert_eq!(result, a);
    assert_eq!(index.bucket_head(crate::list::bucket_of(32)), Some(a));
    assert!(!epilogue.is_prev_allocated());
  }

  #[test]
  fn coalesce_merges_with_free_predecessor() {
    let mut buf = make_buf(96);
    let p = block_at(&mut buf, 0);
    p.write(32, false, true, false);
    let b = block_at(&mut buf, 32);
    b.write(32, false, false, false);
    let epilogue = block_at(&mut buf, 64);
    epilogue.write_epilogue(false, false);

    let mut index = FreeIndex::new();
    index.insert(p);

    let merged = coalesce(&mut index, b);
    assert_eq!(merged, p);
    assert_eq!(merged.size(), 64);
    assert!(!epilogue.is_prev_allocated());
  }

  #[test]
  fn coalesce_merges_with_free_successor() {
    let mut buf = make_buf(96);
    let b = block_at(&mut buf, 0);
    b.write(32, false, true, false);
    let n = block_at(&mut buf, 32);
    n.write(32, false, false, false);
    let epilogue = block_at(&mut buf, 64);
    epilogue.write_epilogue(false, false);

    let mut index = FreeIndex::new();
    index.insert(n);

    let merged = coalesce(&mut index, b);
    assert_eq!(merged, b);
    assert_eq!(merged.size(), 64);
    assert!(!epilogue.is_prev_allocated());
  }

  #[test]
  fn coalesce_merges_both_sides() {
    let mut buf = make_buf(128);
    let p = block_at(&mut buf, 0);
    p.write(32, false, true, false);
    let b = block_at(&mut buf, 32);
    b.write(32, false, false, false);
    let n = block_at(&mut buf, 64);
    n.write(32, false, false, false);
    let epilogue = block_at(&mut buf, 96);
    epilogue.write_epilogue(false, false);

    let mut index = FreeIndex::new();
    index.insert(p);
    index.insert(n);

    let merged = coalesce(&mut index, b);
    assert_eq!(merged, p);
    assert_eq!(merged.size(), 96);
    assert!(!epilogue.is_prev_allocated());
  }

  #[test]
  fn split_leaves_no_remainder_when_too_small() {
    let mut buf = make_buf(64);
    let block = block_at(&mut buf, 0);
    block.write(32, true, true, false);

    assert!(split(block, 32).is_none());
    assert!(split(block, 24).is_none());
  }

  #[test]
  fn split_produces_free_remainder() {
    let mut buf = make_buf(96);
    let block = block_at(&mut buf, 0);
    block.write(64, true, true, false);
    let epilogue = block_at(&mut buf, 64);
    epilogue.write_epilogue(true, false);

    let remainder = split(block, 32).expect("remainder expected");
    assert_eq!(block.size(), 32);
    assert_eq!(remainder.size(), 32);
    assert!(!remainder.is_allocated());
    assert!(remainder.is_prev_allocated());
    assert!(!epilogue.is_prev_allocated());
  }
}
