use std::io::Read;
use std::ptr;

use libc::sbrk;
use segalloc::Heap;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, `gdb`, or just visually track how allocations change the program
/// break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn print_alloc(n: usize, p: *mut u8) {
  println!("  requested {n} bytes -> payload at {:p}", p);
}

fn main() {
  env_logger::init();

  // Our segregated free-list heap. Internally it tracks 14 size-class
  // buckets plus a mini-block sidelist, and grows the process break only
  // when none of them can satisfy a request.
  let mut heap = Heap::new();

  unsafe {
    print_program_break("start");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 1) Allocate space for a u32.
    // ------------------------------------------------------------------
    let first_block = heap.allocate(4);
    println!("\n[1] Allocate 4 bytes (u32)");
    print_alloc(4, first_block);

    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 2) Allocate 12 bytes, rounding up to a 32-byte block.
    // ------------------------------------------------------------------
    let second_block = heap.allocate(12);
    println!("\n[2] Allocate 12 bytes");
    print_alloc(12, second_block);

    ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 3) Allocate a u64 to observe 16-byte payload alignment.
    // ------------------------------------------------------------------
    let third_block = heap.allocate(8);
    println!("\n[3] Allocate 8 bytes (u64), observe alignment");
    print_alloc(8, third_block);

    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!("[3] Value written = 0x{:X}", third_ptr.read());

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 4) Allocate an array of 16 u16 values.
    // ------------------------------------------------------------------
    let fourth_block = heap.allocate(32) as *mut u16;
    println!("\n[4] Allocate [u16; 16]");
    for i in 0..16u16 {
      fourth_block.add(i as usize).write(i);
    }
    println!("[4] Wrote 0..15 into the u16 array");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 5) Release the first block.
    //
    //    Unlike a bump allocator, this allocator files the freed block
    //    into its segregated bucket (or the mini sidelist) for reuse.
    // ------------------------------------------------------------------
    heap.release(first_block);
    println!("\n[5] Released first_block at {:?}", first_block);
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 6) Allocate a small block to see if the freed block gets reused.
    // ------------------------------------------------------------------
    let fifth_block = heap.allocate(2);
    println!("\n[6] Allocate 2 bytes (check reuse of freed block)");
    print_alloc(2, fifth_block);

    println!(
      "[6] fifth_block == first_block? {}",
      if fifth_block == first_block { "Yes, it reused the freed block" } else { "No, it allocated somewhere else" }
    );

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 7) Allocate a large block to observe heap growth.
    // ------------------------------------------------------------------
    print_program_break("before large alloc");

    let big_block = heap.allocate(64 * 1024);
    println!("\n[7] Allocate large 64 KiB block");
    print_alloc(64 * 1024, big_block);

    print_program_break("after large alloc");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 8) Reallocate the u16 array to double its size, preserving contents.
    // ------------------------------------------------------------------
    let grown = heap.reallocate(fourth_block as *mut u8, 64) as *mut u16;
    println!("\n[8] Reallocated [u16; 16] -> [u16; 32]");
    for i in 0..16u16 {
      assert_eq!(grown.add(i as usize).read(), i);
    }
    println!("[8] First 16 entries survived the reallocation unchanged");

    block_until_enter_pressed();

    println!("\n[9] End of example. Process will exit and the OS will reclaim all memory.");
  }
}
