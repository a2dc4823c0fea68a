//! Position arithmetic over the two-level bucket layout.

use crate::BUCKET_CAPACITY;

/// A normalized position in bucket storage: a bucket index paired with a
/// slot offset inside that bucket.
///
/// `slot` is always in `0..BUCKET_CAPACITY`. The bucket coordinate is an
/// index into the pointer table rather than a pointer, so reallocating the
/// table cannot leave a cursor dangling.
///
/// Cursor arithmetic performs no bounds checking against the live element
/// range; callers must only step within the storage they own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Cursor {
    bucket: usize,
    slot: usize,
}

impl Cursor {
    /// The position of the first slot in the first bucket.
    pub const ZERO: Cursor = Cursor { bucket: 0, slot: 0 };

    /// Builds the cursor for the `pos`th slot of the pool, counting across
    /// bucket boundaries.
    #[inline]
    pub fn at_linear(pos: usize) -> Cursor {
        Cursor {
            bucket: pos / BUCKET_CAPACITY,
            slot: pos % BUCKET_CAPACITY,
        }
    }

    /// Returns the absolute slot position, the inverse of [`at_linear`](Cursor::at_linear).
    #[inline]
    pub fn linear(self) -> usize {
        self.bucket * BUCKET_CAPACITY + self.slot
    }

    #[inline]
    pub fn bucket(self) -> usize {
        self.bucket
    }

    #[inline]
    pub fn slot(self) -> usize {
        self.slot
    }

    /// Returns the cursor `n` slots away, in either direction.
    ///
    /// Whole buckets to cross and the residual in-bucket offset come from
    /// euclidean division, so the residual is non-negative; a residual
    /// reaching past the bucket end carries into the next bucket.
    pub fn offset(self, n: isize) -> Cursor {
        let cap = BUCKET_CAPACITY as isize;
        let mut bucket = self.bucket as isize + n.div_euclid(cap);
        let mut slot = self.slot as isize + n.rem_euclid(cap);
        if slot >= cap {
            bucket += 1;
            slot -= cap;
        }
        debug_assert!(bucket >= 0);
        Cursor {
            bucket: bucket as usize,
            slot: slot as usize,
        }
    }

    /// Steps forward by one slot, wrapping into the next bucket.
    #[inline]
    pub fn advance(&mut self) {
        self.slot += 1;
        if self.slot == BUCKET_CAPACITY {
            self.bucket += 1;
            self.slot = 0;
        }
    }

    /// Steps backward by one slot, borrowing from the previous bucket.
    #[inline]
    pub fn retreat(&mut self) {
        if self.slot == 0 {
            debug_assert!(self.bucket > 0);
            self.bucket -= 1;
            self.slot = BUCKET_CAPACITY - 1;
        } else {
            self.slot -= 1;
        }
    }

    /// Returns this position moved `buckets` whole buckets toward the back,
    /// as happens to all cursors when the pool recenters its table.
    #[inline]
    pub fn shifted(self, buckets: usize) -> Cursor {
        Cursor {
            bucket: self.bucket + buckets,
            slot: self.slot,
        }
    }

    /// Signed number of slots from `origin` to `self`.
    #[inline]
    pub fn distance(self, origin: Cursor) -> isize {
        self.linear() as isize - origin.linear() as isize
    }
}
