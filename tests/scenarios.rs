//! End-to-end allocator scenarios, exercised through the public `Heap` API
//! rather than its internal modules.

use std::ptr;

use segalloc::Heap;

#[test]
fn fresh_heap_reuses_a_released_block_of_the_same_size() {
  let mut heap = Heap::new();

  let a = heap.allocate(40);
  assert!(!a.is_null());
  unsafe { heap.release(a) };

  let b = heap.allocate(40);
  assert_eq!(a, b, "a same-sized request should reuse the just-freed block");
}

#[test]
fn splitting_a_large_free_block_leaves_a_usable_remainder() {
  let mut heap = Heap::new();

  let big = heap.allocate(512);
  unsafe { heap.release(big) };

  // A much smaller request should be served out of the freed block, leaving
  // a free remainder behind rather than growing the heap again.
  let small = heap.allocate(32);
  assert_eq!(small, big);

  let also_small = heap.allocate(32);
  assert!(!also_small.is_null());
  assert_ne!(also_small, small);

  unsafe {
    heap.release(small);
    heap.release(also_small);
  }
}

#[test]
fn adjacent_released_blocks_coalesce_into_one() {
  let mut heap = Heap::new();

  let a = heap.allocate(64);
  let b = heap.allocate(64);
  let c = heap.allocate(64);

  unsafe {
    heap.release(a);
    heap.release(b);
  }

  // a and b are now one coalesced free block at least 128 bytes; a request
  // too big for either half alone should be served from the merged block.
  let d = heap.allocate(100);
  assert_eq!(d, a);

  unsafe {
    heap.release(c);
    heap.release(d);
  }
}

#[test]
fn mini_blocks_round_trip_through_the_sidelist() {
  let mut heap = Heap::new();

  let ptrs: Vec<*mut u8> = (0..20).map(|_| heap.allocate(1)).collect();
  assert!(ptrs.iter().all(|p| !p.is_null()));
  assert!(ptrs.iter().all(|p| (*p as usize) % 16 == 0));

  for &p in &ptrs {
    unsafe { heap.release(p) };
  }

  // All sixteen-byte blocks freed; a burst of same-sized requests should be
  // served from the mini sidelist without growing the heap.
  let reused: Vec<*mut u8> = (0..20).map(|_| heap.allocate(1)).collect();
  assert!(reused.iter().all(|p| !p.is_null()));
}

#[test]
fn reallocate_to_a_smaller_size_truncates_without_corrupting_survivors() {
  let mut heap = Heap::new();

  let p = heap.allocate(200) as *mut u8;
  unsafe { ptr::write_bytes(p, 0x7E, 200) };

  let q = unsafe { heap.reallocate(p, 50) } as *mut u8;
  assert!(!q.is_null());
  let bytes = unsafe { std::slice::from_raw_parts(q, 50) };
  assert!(bytes.iter().all(|&b| b == 0x7E));

  unsafe { heap.release(q) };
}

#[test]
fn check_heap_is_reachable_as_a_public_operation() {
  let mut heap = Heap::new();
  assert!(heap.check_heap(line!()));

  let ptrs: Vec<*mut u8> = (0..8).map(|n| heap.allocate(16 * (n + 1))).collect();
  assert!(ptrs.iter().all(|p| !p.is_null()));
  assert!(heap.check_heap(line!()));

  for p in ptrs {
    unsafe { heap.release(p) };
  }
  assert!(heap.check_heap(line!()));
}

#[test]
fn allocate_zeroed_array_is_fully_zero_and_usable() {
  let mut heap = Heap::new();

  let p = heap.allocate_zeroed(100, 8) as *mut u64;
  assert!(!p.is_null());

  let slice = unsafe { std::slice::from_raw_parts(p, 100) };
  assert!(slice.iter().all(|&w| w == 0));

  unsafe {
    p.write(0xABCD);
    assert_eq!(p.read(), 0xABCD);
    heap.release(p as *mut u8);
  }
}
