//! Heap consistency checker: walks the implicit list and every segregated
//! bucket, verifying that the block-layout invariants still hold.

use std::ptr::NonNull;

use crate::block::{BlockPtr, MIN_BLOCK_SIZE, WSIZE};
use crate::heap::Heap;
use crate::list::{BUCKET_COUNT, bucket_of};

fn prologue(heap: &Heap) -> BlockPtr {
  unsafe { BlockPtr::at(NonNull::new_unchecked(heap.heap_low() as *mut u8)) }
}

fn epilogue(heap: &Heap) -> BlockPtr {
  unsafe { BlockPtr::at(NonNull::new_unchecked((heap.heap_high() as *mut u8).sub(WSIZE - 1))) }
}

fn check_prologue_epilogue(heap: &Heap) -> bool {
  let pro = prologue(heap);
  if !pro.is_allocated() {
    log::warn!("prologue not allocated");
    return false;
  }
  if pro.size() != 0 {
    log::warn!("incorrect prologue size");
    return false;
  }

  let epi = epilogue(heap);
  if !epi.is_allocated() {
    log::warn!("epilogue not allocated");
    return false;
  }
  if epi.size() != 0 {
    log::warn!("incorrect epilogue size");
    return false;
  }

  true
}

fn check_alignment(block: BlockPtr) -> bool {
  let aligned = block.payload().as_ptr() as usize % 16 == 0;
  if !aligned {
    log::warn!("misalignment at {:p}", block.as_ptr());
  }
  aligned
}

fn check_boundary(heap: &Heap, block: BlockPtr) -> bool {
  if block.as_ptr() as *const u8 > heap.heap_high() {
    log::warn!("block out of upper bound at {:p}", block.as_ptr());
    return false;
  }
  if (block.as_ptr() as *const u8) < heap.heap_low() {
    log::warn!("block out of lower bound at {:p}", block.as_ptr());
    return false;
  }
  true
}

fn check_non_consecutive_free(block: BlockPtr) -> bool {
  let next = block.next();
  if !block.is_allocated() && !next.is_allocated() {
    log::warn!("two consecutive free blocks at {:p} and {:p}", block.as_ptr(), next.as_ptr());
    return false;
  }
  true
}

fn check_header_footer_match(block: BlockPtr) -> bool {
  if block.is_allocated() || block.is_mini() {
    return true;
  }
  if block.raw_header_word() != block.raw_footer_word() {
    log::warn!("header and footer do not match at {:p}", block.as_ptr());
    return false;
  }
  true
}

fn check_block_size(block: BlockPtr) -> bool {
  let size = block.size();
  if size < MIN_BLOCK_SIZE || size % 16 != 0 {
    log::warn!("invalid block size at {:p}", block.as_ptr());
    return false;
  }
  true
}

fn general_heap_checker(heap: &Heap) -> bool {
  if !check_prologue_epilogue(heap) {
    return false;
  }

  let Some(mut curr) = heap.heap_start() else {
    return true;
  };
  let epi = epilogue(heap);

  while curr != epi {
    if !check_alignment(curr)
      || !check_boundary(heap, curr)
      || !check_block_size(curr)
      || !check_header_footer_match(curr)
      || !check_non_consecutive_free(curr)
    {
      return false;
    }
    curr = curr.next();
  }

  true
}

/// Walks every segregated bucket, checking link symmetry, heap bounds, and
/// that each block is filed under the bucket its size actually maps to.
/// The mini list is singly-linked and has no symmetric back-pointer to
/// check, so (matching the original) it is left out of this walk.
fn check_list(heap: &Heap) -> bool {
  for class in 0..BUCKET_COUNT {
    let mut curr = heap.index().bucket_head(class);

    while let Some(block) = curr {
      if (block.as_ptr() as *const u8) > heap.heap_high()
        || (block.as_ptr() as *const u8) < heap.heap_low()
      {
        log::warn!("free-list pointer out of heap bounds at {:p}", block.as_ptr());
        return false;
      }

      if let Some(next) = block.seg_next() {
        if next.seg_prev() != Some(block) {
          log::warn!("free list prev/next pointers are inconsistent at {:p}", block.as_ptr());
          return false;
        }
      }

      if bucket_of(block.size()) != class {
        log::warn!("block at {:p} is filed in the wrong bucket", block.as_ptr());
        return false;
      }

      curr = block.seg_next();
    }
  }

  true
}

/// Runs the full heap checker. Intended for `debug_assert!`-style use at the
/// entry/exit of every mutating `Heap` method, gated on `cfg(debug_assertions)`
/// by the caller so it imposes no cost in release builds.
pub(crate) fn check_heap(heap: &Heap, line: u32) -> bool {
  if heap.heap_start().is_none() {
    return true;
  }

  let ok = general_heap_checker(heap) && check_list(heap);
  if !ok {
    log::error!("heap check failed at line {line}");
  }
  ok
}
