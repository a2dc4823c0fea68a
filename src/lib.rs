#![no_std]
#![warn(missing_docs)]

//! A growable double-ended queue built from fixed-capacity storage buckets.
//!
//! Unlike a ring buffer, [`Deque`] never moves elements to make room:
//! storage is a table of pointers to fixed-size buckets, and running out of
//! space reallocates only the table. Element addresses are therefore stable
//! for as long as the elements themselves stay in the queue, and growth
//! costs O(buckets), not O(elements).

extern crate alloc;

mod cursor;
mod pool;

pub mod deque;
pub mod storage;

pub use crate::deque::Deque;
pub use crate::storage::{AllocError, Global, RawAlloc};

/// The result type for operations that acquire storage.
pub type Result<T = (), E = AllocError> = core::result::Result<T, E>;

/// The number of element slots in each storage bucket.
pub const BUCKET_CAPACITY: usize = 32;
