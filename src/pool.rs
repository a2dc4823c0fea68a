//! The bucket pool: a pointer table over separately allocated buckets.
//!
//! Every table slot owns exactly one bucket of `BUCKET_CAPACITY` raw element
//! slots at all times, so insertion at a pool edge never has to allocate a
//! bucket on the spot. Growing the pool reallocates only the pointer table;
//! the buckets themselves, and the elements inside them, never move.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use crate::cursor::Cursor;
use crate::storage::RawAlloc;
use crate::BUCKET_CAPACITY;

#[cold]
#[inline(never)]
fn layout_overflow() -> ! {
    panic!("element type too large for bucket storage")
}

fn bucket_layout<T>() -> Layout {
    match Layout::array::<T>(BUCKET_CAPACITY) {
        Ok(layout) => layout,
        Err(_) => layout_overflow(),
    }
}

fn table_layout<T>(len: usize) -> Layout {
    match Layout::array::<NonNull<T>>(len) {
        Ok(layout) => layout,
        Err(_) => layout_overflow(),
    }
}

/// A contiguous table of bucket pointers, owning the buckets it points to.
///
/// An empty pool holds no allocation at all. A non-empty pool owns its table
/// and one bucket per table slot, all acquired from `A` and released on drop.
pub(crate) struct Pool<T, A: RawAlloc> {
    table: NonNull<NonNull<T>>,
    table_len: usize,
    alloc: A,
    elem: PhantomData<T>,
}

// The pool is a uniquely owned allocation like Box; sharing rules come from
// the element type and the allocator.
unsafe impl<T: Send, A: RawAlloc + Send> Send for Pool<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for Pool<T, A> {}

impl<T, A: RawAlloc> Pool<T, A> {
    /// Creates a pool of zero buckets without allocating.
    pub fn empty_in(alloc: A) -> Self {
        Pool {
            table: NonNull::dangling(),
            table_len: 0,
            alloc,
            elem: PhantomData,
        }
    }

    /// Creates a pool of `table_len` buckets, all allocated up front.
    ///
    /// On failure, everything acquired for this call is released again
    /// before the error is returned.
    pub fn with_table(alloc: A, table_len: usize) -> crate::Result<Self> {
        if table_len == 0 {
            return Ok(Self::empty_in(alloc));
        }

        let layout = table_layout::<T>(table_len);
        let table = alloc.allocate(layout)?.cast::<NonNull<T>>();
        for i in 0..table_len {
            match Self::allocate_bucket(&alloc) {
                Ok(bucket) => unsafe { table.as_ptr().add(i).write(bucket) },
                Err(e) => {
                    for j in 0..i {
                        unsafe { Self::release_bucket(&alloc, table.as_ptr().add(j).read()) };
                    }
                    unsafe { alloc.deallocate(table.cast(), layout) };
                    return Err(e);
                }
            }
        }

        Ok(Pool {
            table,
            table_len,
            alloc,
            elem: PhantomData,
        })
    }

    /// Grows the table by the symmetric doubling rule and recenters it.
    ///
    /// The new table is at least one bucket larger on each side: existing
    /// bucket pointers are copied into its middle, the outer slots receive
    /// freshly allocated buckets, and only then is the old table released.
    /// Returns the number of whole buckets every existing position moved
    /// toward the back, so callers can shift their cursors.
    ///
    /// On failure the pool is unchanged and nothing is leaked.
    pub fn grow(&mut self) -> crate::Result<usize> {
        let old_len = self.table_len;
        let new_len = (old_len * 2).max(old_len + 2);
        let shift = (new_len - old_len) / 2;

        let new_layout = table_layout::<T>(new_len);
        let new_table = self.alloc.allocate(new_layout)?.cast::<NonNull<T>>();

        let outer = (0..shift).chain(shift + old_len..new_len);
        let mut fresh = 0;
        for i in outer.clone() {
            match Self::allocate_bucket(&self.alloc) {
                Ok(bucket) => {
                    unsafe { new_table.as_ptr().add(i).write(bucket) };
                    fresh += 1;
                }
                Err(e) => {
                    for j in outer.take(fresh) {
                        unsafe {
                            Self::release_bucket(&self.alloc, new_table.as_ptr().add(j).read());
                        }
                    }
                    unsafe { self.alloc.deallocate(new_table.cast(), new_layout) };
                    return Err(e);
                }
            }
        }

        // All storage for the grown pool exists; commit.
        unsafe {
            core::ptr::copy_nonoverlapping(
                self.table.as_ptr(),
                new_table.as_ptr().add(shift),
                old_len,
            );
        }
        if old_len > 0 {
            unsafe {
                self.alloc
                    .deallocate(self.table.cast(), table_layout::<T>(old_len));
            }
        }
        self.table = new_table;
        self.table_len = new_len;
        Ok(shift)
    }

    /// Rotates the pointer table by `n` slots, negative values toward the
    /// front.
    ///
    /// Buckets and the elements inside them do not move; only which table
    /// slot refers to which bucket changes, so callers must shift their
    /// cursors by the same number of whole buckets.
    pub fn rotate(&mut self, n: isize) {
        let table =
            unsafe { core::slice::from_raw_parts_mut(self.table.as_ptr(), self.table_len) };
        if n < 0 {
            table.rotate_left(n.unsigned_abs());
        } else {
            table.rotate_right(n as usize);
        }
    }

    /// Returns the pointer to the start of bucket `index`.
    pub fn bucket(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < self.table_len);
        unsafe { self.table.as_ptr().add(index).read() }
    }

    /// Returns the raw pointer to the slot `at` designates.
    ///
    /// The slot may hold uninitialized storage; the caller tracks liveness.
    pub fn slot_ptr(&self, at: Cursor) -> *mut T {
        unsafe { self.bucket(at.bucket()).as_ptr().add(at.slot()) }
    }

    pub fn table_len(&self) -> usize {
        self.table_len
    }

    /// Total element slots across all buckets.
    pub fn capacity(&self) -> usize {
        self.table_len * BUCKET_CAPACITY
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    fn allocate_bucket(alloc: &A) -> crate::Result<NonNull<T>> {
        if mem::size_of::<T>() == 0 {
            return Ok(NonNull::dangling());
        }
        alloc.allocate(bucket_layout::<T>()).map(NonNull::cast)
    }

    /// # Safety
    /// `bucket` must have come from `allocate_bucket` on `alloc` and must
    /// not be used again.
    unsafe fn release_bucket(alloc: &A, bucket: NonNull<T>) {
        if mem::size_of::<T>() == 0 {
            return;
        }
        unsafe { alloc.deallocate(bucket.cast(), bucket_layout::<T>()) };
    }
}

impl<T, A: RawAlloc> Drop for Pool<T, A> {
    fn drop(&mut self) {
        if self.table_len == 0 {
            return;
        }
        for i in 0..self.table_len {
            unsafe { Self::release_bucket(&self.alloc, self.table.as_ptr().add(i).read()) };
        }
        unsafe {
            self.alloc
                .deallocate(self.table.cast(), table_layout::<T>(self.table_len));
        }
    }
}
