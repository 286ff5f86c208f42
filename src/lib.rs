//! # segalloc - A Segregated Free-List Memory Allocator
//!
//! This crate provides a **segregated free-list** allocator implementation in
//! Rust that manages a single, monotonically-growable heap using the `sbrk`
//! system call.
//!
//! ## Overview
//!
//! Rather than bumping a single pointer forward, freed memory is tracked in
//! size-class buckets and reused by later allocations:
//!
//! ```text
//!   Segregated Free List Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌─────┬─────┬─────┬─────┬───────────────────────────────────────┐  │
//!   │   │ A1  │ F1  │ A2  │ F2  │            Free Space                 │  │
//!   │   └─────┴──┬──┴─────┴──┬──┴───────────────────────────────────────┘  │
//!   │            │           │                                    ▲       │
//!   │            ▼           ▼                                Program    │
//!   │     bucket[k] head  bucket[j] head                        Break    │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Freed blocks (F1, F2, ...) are filed by size class instead of discarded.
//!   Allocation walks the matching bucket before ever extending the heap.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segalloc
//!   ├── align      - Size-rounding helper (internal)
//!   ├── block      - Boundary-tag block layout (internal)
//!   ├── list       - Segregated bucket + mini-block index (internal)
//!   ├── coalesce   - Neighbour merging and splitting (internal)
//!   ├── placement  - Size-class lookup and fit search (internal)
//!   ├── sbrk       - Raw `sbrk`-backed memory provider (internal)
//!   ├── heap       - Heap: the public allocate/release/reallocate API
//!   ├── check      - Heap consistency checker (internal, debug builds)
//!   └── global     - `GlobalAlloc` adapter
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segalloc::Heap;
//!
//! fn main() {
//!     let mut heap = Heap::new();
//!
//!     unsafe {
//!         let p = heap.allocate(64) as *mut u64;
//!         *p = 42;
//!         println!("Value: {}", *p);
//!         heap.release(p as *mut u8);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! The allocator uses `sbrk(2)` to extend the program's data segment, the
//! same way the process heap always has:
//!
//! ```text
//!   Program Memory Layout:
//!
//!   High Address ┌─────────────────────┐
//!                │       Stack         │ ↓ grows down
//!                │         │           │
//!                │         ▼           │
//!                │                     │
//!                │         ▲           │
//!                │         │           │
//!                │       Heap          │ ↑ grows up (sbrk)
//!                ├─────────────────────┤ ← Program Break
//!                │   Uninitialized     │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │   Initialized       │
//!                │       Data          │
//!                ├─────────────────────┤
//!                │       Text          │
//!   Low Address  └─────────────────────┘
//! ```
//!
//! Each block carries its boundary tags inline with the user data:
//!
//! ```text
//!   Single Free Block:
//!   ┌──────────┬───────────────────────────────┬──────────┐
//!   │  Header  │        Payload / links         │  Footer  │
//!   │  8 bytes │   size - 16 bytes              │  8 bytes │
//!   └──────────┴───────────────────────────────┴──────────┘
//!              ▲
//!              └── Free blocks reuse this space for seg_prev/seg_next
//! ```
//!
//! ## Features
//!
//! - **Size-class reuse**: 14 segregated buckets plus a mini-block sidelist
//! - **Coalescing**: adjacent free blocks merge in both directions
//! - **Bounded better-fit placement**: no unbounded best-fit scan
//! - **Direct OS interaction**: uses `sbrk` for heap growth, never shrinks
//!
//! ## Limitations
//!
//! - **16-byte payload alignment only**: requests needing wider alignment
//!   are outside this allocator's scope
//! - **No heap shrinking**: freed memory is reused in place, never returned
//!   to the OS
//! - **Unix-only**: requires `libc` and `sbrk` (POSIX systems)
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! `release` and `reallocate` require `unsafe` blocks; `allocate` and
//! `allocate_zeroed` do not take a pointer argument and so are safe to call,
//! though using their result still requires `unsafe`.

mod align;
mod block;
mod check;
mod coalesce;
mod global;
mod heap;
mod list;
mod placement;
mod sbrk;

pub use global::Allocator;
pub use heap::Heap;
