//! Traits providing genericity over allocation strategies.

use core::alloc::Layout;
use core::fmt::{self, Debug, Display, Formatter};
use core::ptr::NonNull;

/// The error returned when the configured allocator cannot provide storage.
///
/// Carries the [`Layout`] of the failed request. Operations returning this
/// error give the strong guarantee: the container is left exactly as it was
/// before the call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    pub(crate) fn new(layout: Layout) -> Self {
        AllocError { layout }
    }

    /// Returns the layout of the allocation request that failed.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Aborts in the manner of the global allocation error handler.
    ///
    /// Used by the panicking counterparts of the `try_` methods.
    #[cold]
    #[inline(never)]
    pub(crate) fn handle(self) -> ! {
        alloc::alloc::handle_alloc_error(self.layout)
    }
}

impl Debug for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocError")
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

impl Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocator failed to provide {} bytes (alignment {})",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl core::error::Error for AllocError {}

/// An interface for acquiring and releasing blocks of raw memory.
///
/// Every allocation the container makes, for element buckets as well as for
/// the bucket pointer table, goes through an implementor of this trait.
///
/// # Safety
/// Implementors must ensure that a block returned from [`allocate`] is valid
/// for reads and writes of `layout.size()` bytes at `layout.align()`
/// alignment, and remains valid until it is passed to [`deallocate`] with
/// the same layout. Live blocks must not alias each other.
///
/// Callers must never request a zero-sized layout; the container guarantees
/// this itself (zero-sized element types bypass the allocator entirely).
///
/// [`allocate`]: RawAlloc::allocate
/// [`deallocate`]: RawAlloc::deallocate
pub unsafe trait RawAlloc {
    /// Acquires a block of memory fitting `layout`.
    fn allocate(&self, layout: Layout) -> crate::Result<NonNull<u8>>;

    /// Releases a block previously acquired from this allocator.
    ///
    /// # Safety
    /// `ptr` must have been returned by [`allocate`](RawAlloc::allocate) on
    /// this allocator with this exact `layout`, and must not be used again
    /// afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The default allocation strategy, deferring to the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

unsafe impl RawAlloc for Global {
    fn allocate(&self, layout: Layout) -> crate::Result<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layout is non-zero-sized per the trait contract
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    fn allocate(&self, layout: Layout) -> crate::Result<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
