//! A double-ended queue implemented with a segmented array of buckets.
//!
//! This queue has amortized O(1) inserts and removals from both ends of the
//! sequence and O(1) indexing like a vector, without ever relocating its
//! elements: when it runs out of room, only the internal table of bucket
//! pointers is reallocated.

use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};

use crate::cursor::Cursor;
use crate::pool::Pool;
use crate::storage::{Global, RawAlloc};
use crate::BUCKET_CAPACITY;

/// A double-ended queue implemented with a segmented array of buckets.
///
/// The "default" usage of this type as a queue is to use
/// [`push_back`](Deque::push_back) to add to the queue, and
/// [`pop_front`](Deque::pop_front) to remove from it.
///
/// Storage is two-level: a growable table of pointers, each to a bucket of
/// [`BUCKET_CAPACITY`] element slots. The live elements occupy a contiguous
/// run of slots somewhere in the middle of that space, delimited by a start
/// and finish cursor, so pushing at either end only moves a cursor. When a
/// cursor reaches the edge of the table, free buckets that accumulated at
/// the opposite edge are rotated over if there are any; otherwise the table
/// is reallocated at double the size and the surviving bucket pointers are
/// copied into its middle. Elements never move during growth,
/// so references read before a push are still addressing the same memory
/// afterwards (though the borrow rules require re-borrowing, the *addresses*
/// are stable).
///
/// The allocator is a construction-time parameter; see
/// [`new_in`](Deque::new_in) and the [`RawAlloc`] trait.
///
/// # Examples
/// ```
/// let mut deque = bucketdeque::Deque::new();
/// deque.push_back('b');
/// deque.push_back('c');
/// deque.push_front('a');
/// assert_eq!(deque.len(), 3);
/// assert_eq!(deque.pop_front(), Some('a'));
/// assert_eq!(deque.pop_back(), Some('c'));
/// ```
pub struct Deque<T, A: RawAlloc = Global> {
    len: usize,
    start: Cursor,
    finish: Cursor,
    pool: Pool<T, A>,
}

#[cold]
#[inline(never)]
#[track_caller]
fn insert_index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("insertion index (is {index}) should be <= len (is {len})")
}

impl<T> Deque<T> {
    /// Creates an empty deque. No memory is allocated until the first
    /// insertion.
    ///
    /// # Examples
    /// ```
    /// let deque = bucketdeque::Deque::<u32>::new();
    /// assert!(deque.is_empty());
    /// assert_eq!(deque.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty deque with room for at least `capacity` elements.
    ///
    /// The reserved slots are centered in the allocated space, so pushes at
    /// either end share the margin evenly.
    ///
    /// # Panics
    /// Panics if the allocator fails. See
    /// [`try_with_capacity_in`](Deque::try_with_capacity_in) for a checked
    /// version.
    ///
    /// # Examples
    /// ```
    /// let deque = bucketdeque::Deque::<u32>::with_capacity(10);
    /// assert!(deque.capacity() >= 10);
    /// assert!(deque.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// Creates a deque holding `n` clones of `value`.
    ///
    /// # Examples
    /// ```
    /// let deque = bucketdeque::Deque::from_elem('x', 5);
    /// assert_eq!(deque.len(), 5);
    /// assert!(deque.iter().all(|&c| c == 'x'));
    /// ```
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut deque = Self::with_capacity(n);
        for _ in 0..n {
            deque.push_back(value.clone());
        }
        deque
    }
}

impl<T, A: RawAlloc> Deque<T, A> {
    /// Creates an empty deque using the given allocator. No memory is
    /// allocated until the first insertion.
    pub fn new_in(alloc: A) -> Self {
        Deque {
            len: 0,
            start: Cursor::ZERO,
            finish: Cursor::ZERO,
            pool: Pool::empty_in(alloc),
        }
    }

    /// Creates an empty deque with room for at least `capacity` elements,
    /// using the given allocator.
    ///
    /// # Panics
    /// Panics if the allocator fails. See
    /// [`try_with_capacity_in`](Deque::try_with_capacity_in) for a checked
    /// version.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        match Self::try_with_capacity_in(capacity, alloc) {
            Ok(deque) => deque,
            Err(e) => e.handle(),
        }
    }

    /// Creates an empty deque with room for at least `capacity` elements,
    /// returning an error if the allocator fails.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> crate::Result<Self> {
        if capacity == 0 {
            return Ok(Self::new_in(alloc));
        }

        let buckets = capacity.div_ceil(BUCKET_CAPACITY);
        let pool = Pool::with_table(alloc, buckets)?;
        let mid = Cursor::at_linear((pool.capacity() - capacity) / 2);
        Ok(Deque {
            len: 0,
            start: mid,
            finish: mid,
            pool,
        })
    }

    /// Returns a reference to the configured allocator.
    pub fn allocator(&self) -> &A {
        self.pool.allocator()
    }

    /// Returns the number of elements the deque can hold without
    /// reallocating its bucket table.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Returns the number of elements currently in the deque.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` exactly when the deque contains zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the deque contains an element equal to the given
    /// value.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|elem| elem == x)
    }

    /// Returns a reference to the element at the given index, or [`None`]
    /// if the index is out of bounds.
    ///
    /// The element at index 0 is the front of the queue.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_back(3);
    /// deque.push_back(5);
    /// assert_eq!(deque.get(1), Some(&5));
    /// assert_eq!(deque.get(2), None);
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let at = self.start.offset(index as isize);
        unsafe { Some(&*self.pool.slot_ptr(at)) }
    }

    /// Returns a mutable reference to the element at the given index, or
    /// [`None`] if the index is out of bounds.
    ///
    /// The element at index 0 is the front of the queue.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let at = self.start.offset(index as isize);
        unsafe { Some(&mut *self.pool.slot_ptr(at)) }
    }

    /// Returns a reference to the front element, or [`None`] if the deque
    /// is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the front element, or [`None`] if the
    /// deque is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the back element, or [`None`] if the deque is
    /// empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.wrapping_sub(1))
    }

    /// Returns a mutable reference to the back element, or [`None`] if the
    /// deque is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.wrapping_sub(1))
    }

    /// Ensures the next [`push_back`](Deque::push_back) will not allocate.
    ///
    /// When the finish cursor sits at the table edge, free buckets that
    /// accumulated in front of `start` are rotated over to the back; the
    /// table only grows when there is no such slack. Either way, elements
    /// keep their addresses.
    ///
    /// On error the deque is unchanged.
    pub fn try_reserve_back(&mut self) -> crate::Result {
        if self.finish.bucket() < self.pool.table_len() {
            return Ok(());
        }

        let slack = self.start.bucket();
        if slack >= 2 {
            let buckets = slack / 2;
            self.pool.rotate(-(buckets as isize));
            let step = -((buckets * BUCKET_CAPACITY) as isize);
            self.start = self.start.offset(step);
            self.finish = self.finish.offset(step);
        } else {
            let shift = self.pool.grow()?;
            self.start = self.start.shifted(shift);
            self.finish = self.finish.shifted(shift);
        }
        Ok(())
    }

    /// Ensures the next [`push_front`](Deque::push_front) will not
    /// allocate.
    ///
    /// When the start cursor sits at the table edge, free buckets that
    /// accumulated behind `finish` are rotated over to the front; the
    /// table only grows when there is no such slack. Either way, elements
    /// keep their addresses.
    ///
    /// On error the deque is unchanged.
    pub fn try_reserve_front(&mut self) -> crate::Result {
        if self.start.linear() > 0 {
            return Ok(());
        }

        let used = self.finish.linear().div_ceil(BUCKET_CAPACITY);
        let slack = self.pool.table_len() - used;
        if slack >= 2 {
            let buckets = slack / 2;
            self.pool.rotate(buckets as isize);
            let step = (buckets * BUCKET_CAPACITY) as isize;
            self.start = self.start.offset(step);
            self.finish = self.finish.offset(step);
        } else {
            let shift = self.pool.grow()?;
            self.start = self.start.shifted(shift);
            self.finish = self.finish.shifted(shift);
        }
        Ok(())
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Panics
    /// Panics via the global allocation error handler if growing fails.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_back(1);
    /// deque.push_back(3);
    /// assert_eq!(deque.back(), Some(&3));
    /// ```
    pub fn push_back(&mut self, value: T) {
        if let Err(e) = self.try_reserve_back() {
            e.handle()
        }
        unsafe { self.pool.slot_ptr(self.finish).write(value) };
        self.finish.advance();
        self.len += 1;
        debug_assert_eq!(self.finish.distance(self.start), self.len as isize);
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Panics
    /// Panics via the global allocation error handler if growing fails.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_front(1);
    /// deque.push_front(2);
    /// assert_eq!(deque.front(), Some(&2));
    /// ```
    pub fn push_front(&mut self, value: T) {
        if let Err(e) = self.try_reserve_front() {
            e.handle()
        }
        self.start.retreat();
        unsafe { self.pool.slot_ptr(self.start).write(value) };
        self.len += 1;
        debug_assert_eq!(self.finish.distance(self.start), self.len as isize);
    }

    /// Removes the last element and returns it, or [`None`] if the deque is
    /// empty.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.pop_back(), Some(2));
    /// assert_eq!(deque.pop_back(), Some(1));
    /// assert_eq!(deque.pop_back(), None);
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.finish.retreat();
        self.len -= 1;
        Some(unsafe { self.pool.slot_ptr(self.finish).read() })
    }

    /// Removes the first element and returns it, or [`None`] if the deque
    /// is empty.
    ///
    /// # Examples
    /// ```
    /// let mut deque = bucketdeque::Deque::new();
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.pop_front(), Some(1));
    /// assert_eq!(deque.pop_front(), Some(2));
    /// assert_eq!(deque.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = unsafe { self.pool.slot_ptr(self.start).read() };
        self.start.advance();
        self.len -= 1;
        Some(value)
    }

    /// Inserts an element at `index`, shifting all elements from `index`
    /// onward one slot toward the back.
    ///
    /// The element at index 0 is the front of the queue; `insert(0, v)` is
    /// equivalent to [`push_front`](Deque::push_front) and
    /// `insert(len(), v)` to [`push_back`](Deque::push_back).
    ///
    /// This runs in O(`len` − `index`) time.
    ///
    /// # Panics
    /// Panics if `index` is greater than the deque's length, or via the
    /// global allocation error handler if growing fails.
    ///
    /// # Examples
    /// ```
    /// let mut deque: bucketdeque::Deque<_> = [1, 2, 4].into();
    /// deque.insert(2, 3);
    /// assert_eq!(deque, [1, 2, 3, 4]);
    /// ```
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        if index > self.len {
            insert_index_out_of_bounds(index, self.len);
        }
        if index == 0 {
            return self.push_front(value);
        }
        if index == self.len {
            return self.push_back(value);
        }

        if let Err(e) = self.try_reserve_back() {
            e.handle()
        }

        // Open a slot by moving [index, len) one step toward the back,
        // working from the back so nothing is overwritten before it is
        // read out.
        let mut src = self.finish;
        let mut dst = self.finish.offset(1);
        for _ in index..self.len {
            src.retreat();
            dst.retreat();
            unsafe {
                self.pool
                    .slot_ptr(dst)
                    .write(self.pool.slot_ptr(src).read());
            }
        }
        let at = self.start.offset(index as isize);
        unsafe { self.pool.slot_ptr(at).write(value) };
        self.finish.advance();
        self.len += 1;
    }

    /// Removes and returns the element at `index`, shifting all elements
    /// after it one slot toward the front. Returns [`None`] if `index` is
    /// out of bounds.
    ///
    /// This runs in O(`len` − `index`) time.
    ///
    /// # Examples
    /// ```
    /// let mut deque: bucketdeque::Deque<_> = [1, 2, 3].into();
    /// assert_eq!(deque.remove(1), Some(2));
    /// assert_eq!(deque.remove(5), None);
    /// assert_eq!(deque, [1, 3]);
    /// ```
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        let at = self.start.offset(index as isize);
        let value = unsafe { self.pool.slot_ptr(at).read() };

        // Close the gap by moving (index, len) one step toward the front.
        let mut dst = at;
        let mut src = at.offset(1);
        for _ in index + 1..self.len {
            unsafe {
                self.pool
                    .slot_ptr(dst)
                    .write(self.pool.slot_ptr(src).read());
            }
            dst.advance();
            src.advance();
        }
        self.finish.retreat();
        self.len -= 1;
        Some(value)
    }

    /// Shortens the deque, keeping the first `len` elements and dropping
    /// the rest.
    ///
    /// If `len` is greater than the deque's current length, this has no
    /// effect.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            self.finish.retreat();
            self.len -= 1;
            unsafe { self.pool.slot_ptr(self.finish).drop_in_place() };
        }
    }

    /// Clears the deque, dropping all values and recentering the cursors in
    /// the allocated space. The bucket table is kept.
    ///
    /// # Examples
    /// ```
    /// let mut deque: bucketdeque::Deque<_> = [1, 2, 3].into();
    /// deque.clear();
    /// assert!(deque.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.truncate(0);
        let mid = Cursor::at_linear(self.pool.capacity() / 2);
        self.start = mid;
        self.finish = mid;
    }

    /// Resizes the deque in place so that its length equals `new_len`,
    /// filling the back with the results of calling `f`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) {
        if new_len <= self.len {
            self.truncate(new_len);
        } else {
            for _ in 0..new_len - self.len {
                self.push_back(f());
            }
        }
    }

    /// Resizes the deque in place so that its length equals `new_len`,
    /// filling the back with clones of `value`.
    ///
    /// # Examples
    /// ```
    /// let mut deque: bucketdeque::Deque<_> = [1, 2].into();
    /// deque.resize(4, 0);
    /// assert_eq!(deque, [1, 2, 0, 0]);
    /// deque.resize(1, 0);
    /// assert_eq!(deque, [1]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone());
    }

    /// Returns a front-to-back iterator.
    ///
    /// # Examples
    /// ```
    /// let deque: bucketdeque::Deque<_> = [5, 3, 4].into();
    /// let mut it = deque.iter();
    /// assert_eq!(it.next(), Some(&5));
    /// assert_eq!(it.next_back(), Some(&4));
    /// assert_eq!(it.next(), Some(&3));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            cur: self.start,
            len: self.len,
            pool: &self.pool,
        }
    }

    /// Returns a front-to-back iterator that returns mutable references.
    ///
    /// # Examples
    /// ```
    /// let mut deque: bucketdeque::Deque<_> = [1, 2, 3].into();
    /// for x in deque.iter_mut() {
    ///     *x *= 10;
    /// }
    /// assert_eq!(deque, [10, 20, 30]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, T, A> {
        IterMut {
            cur: self.start,
            len: self.len,
            pool: &mut self.pool,
        }
    }
}

impl<T, A: RawAlloc> Index<usize> for Deque<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        self.get(index).expect("out of bounds access")
    }
}

impl<T, A: RawAlloc> IndexMut<usize> for Deque<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index).expect("out of bounds access")
    }
}

impl<T, A: RawAlloc> Drop for Deque<T, A> {
    fn drop(&mut self) {
        self.truncate(0);
        // the pool frees its buckets and table
    }
}

impl<T: Debug, A: RawAlloc> Debug for Deque<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for Deque<T, A> {
    fn clone(&self) -> Self {
        let mut result =
            match Self::try_with_capacity_in(self.len, self.pool.allocator().clone()) {
                Ok(deque) => deque,
                Err(e) => e.handle(),
            };
        result.extend(self.iter().cloned());
        result
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend(source.iter().cloned());
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash, A: RawAlloc> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elem in self {
            elem.hash(state);
        }
    }
}

impl<AT, AA, BT, BA> PartialEq<Deque<BT, BA>> for Deque<AT, AA>
where
    AT: PartialEq<BT>,
    AA: RawAlloc,
    BA: RawAlloc,
{
    fn eq(&self, other: &Deque<BT, BA>) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, A: RawAlloc> Eq for Deque<T, A> {}

impl<T: PartialEq, A: RawAlloc, R: AsRef<[T]>> PartialEq<R> for Deque<T, A> {
    fn eq(&self, other: &R) -> bool {
        let other = other.as_ref();
        self.len == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<T, AA, BA> PartialOrd<Deque<T, BA>> for Deque<T, AA>
where
    T: PartialOrd,
    AA: RawAlloc,
    BA: RawAlloc,
{
    fn partial_cmp(&self, other: &Deque<T, BA>) -> Option<core::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: RawAlloc> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, A: RawAlloc> Extend<T> for Deque<T, A> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        iter.into_iter().for_each(|item| self.push_back(item));
    }
}

impl<'a, T: 'a + Clone, A: RawAlloc> Extend<&'a T> for Deque<T, A> {
    fn extend<It: IntoIterator<Item = &'a T>>(&mut self, iter: It) {
        iter.into_iter()
            .for_each(|item| self.push_back(item.clone()));
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut deque = Self::with_capacity(lower);
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    /// Converts the array into a deque, front to back.
    ///
    /// # Examples
    /// ```
    /// let deque: bucketdeque::Deque<_> = [1, 2, 3].into();
    /// assert_eq!(deque.front(), Some(&1));
    /// assert_eq!(deque.back(), Some(&3));
    /// ```
    fn from(array: [T; N]) -> Self {
        array.into_iter().collect()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Iter<'a, T, A> {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, A>;

    fn into_iter(self) -> IterMut<'a, T, A> {
        self.iter_mut()
    }
}

impl<T, A: RawAlloc> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Consumes the deque into a front-to-back iterator yielding elements
    /// by value.
    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter { deque: self }
    }
}

/// An iterator over the elements of a deque.
///
/// This `struct` is created by the [`iter`](Deque::iter) method on
/// [`Deque`]. See its documentation for more.
pub struct Iter<'a, T, A: RawAlloc = Global> {
    cur: Cursor,
    len: usize,
    pool: &'a Pool<T, A>,
}

impl<'a, T, A: RawAlloc> Clone for Iter<'a, T, A> {
    fn clone(&self) -> Self {
        Iter {
            cur: self.cur,
            len: self.len,
            pool: self.pool,
        }
    }
}

impl<'a, T: Debug, A: RawAlloc> Debug for Iter<'a, T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, A: RawAlloc> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let item = unsafe { &*self.pool.slot_ptr(self.cur) };
        self.cur.advance();
        self.len -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.len {
            self.cur = self.cur.offset(self.len as isize);
            self.len = 0;
            return None;
        }
        self.cur = self.cur.offset(n as isize);
        self.len -= n;
        self.next()
    }

    fn count(self) -> usize {
        self.len
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T, A: RawAlloc> DoubleEndedIterator for Iter<'a, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let at = self.cur.offset(self.len as isize);
        Some(unsafe { &*self.pool.slot_ptr(at) })
    }

    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.len {
            self.len = 0;
            return None;
        }
        self.len -= n;
        self.next_back()
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for Iter<'_, T, A> {}
impl<T, A: RawAlloc> FusedIterator for Iter<'_, T, A> {}

/// A mutable iterator over the elements of a deque.
///
/// This `struct` is created by the [`iter_mut`](Deque::iter_mut) method on
/// [`Deque`]. See its documentation for more.
pub struct IterMut<'a, T, A: RawAlloc = Global> {
    cur: Cursor,
    len: usize,
    pool: &'a mut Pool<T, A>,
}

impl<'a, T: Debug, A: RawAlloc> Debug for IterMut<'a, T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let remaining = Iter {
            cur: self.cur,
            len: self.len,
            pool: &*self.pool,
        };
        f.debug_list().entries(remaining).finish()
    }
}

impl<'a, T, A: RawAlloc> Iterator for IterMut<'a, T, A> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        let ptr = self.pool.slot_ptr(self.cur);
        self.cur.advance();
        self.len -= 1;
        // SAFETY: each slot is yielded at most once, so the references
        // handed out never alias
        Some(unsafe { &mut *ptr })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        if n >= self.len {
            self.cur = self.cur.offset(self.len as isize);
            self.len = 0;
            return None;
        }
        self.cur = self.cur.offset(n as isize);
        self.len -= n;
        self.next()
    }
}

impl<'a, T, A: RawAlloc> DoubleEndedIterator for IterMut<'a, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let at = self.cur.offset(self.len as isize);
        let ptr = self.pool.slot_ptr(at);
        // SAFETY: as above, slots are yielded at most once
        Some(unsafe { &mut *ptr })
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for IterMut<'_, T, A> {}
impl<T, A: RawAlloc> FusedIterator for IterMut<'_, T, A> {}

/// An owning iterator over the elements of a deque.
///
/// This `struct` is created by the `into_iter` method on [`Deque`] (provided
/// by the [`IntoIterator`] trait). Remaining elements are dropped with the
/// iterator.
pub struct IntoIter<T, A: RawAlloc = Global> {
    deque: Deque<T, A>,
}

impl<T: Debug, A: RawAlloc> Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.deque.iter()).finish()
    }
}

impl<T, A: RawAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len, Some(self.deque.len))
    }
}

impl<T, A: RawAlloc> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: RawAlloc> FusedIterator for IntoIter<T, A> {}

#[cfg(test)]
mod tests {
    use super::*;

    use alloc::string::String;
    use alloc::vec::Vec;
    use core::alloc::Layout;
    use core::cell::Cell;
    use core::ptr::NonNull;

    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn starts_empty_without_allocating() {
        let mut deque = Deque::<u32>::new();
        assert!(deque.is_empty());
        assert_eq!(deque.len(), 0);
        assert_eq!(deque.capacity(), 0);
        assert_eq!(deque.front(), None);
        assert_eq!(deque.back(), None);
        assert_eq!(deque.pop_front(), None);
        assert_eq!(deque.pop_back(), None);
        assert_eq!(deque.iter().next(), None);
    }

    #[test]
    fn push_front_reverses_order() {
        let mut deque = Deque::new();
        deque.push_front('a');
        deque.push_front('b');
        deque.push_front('c');
        assert_eq!(deque, ['c', 'b', 'a']);
    }

    #[test]
    fn hundred_back_fifty_front() {
        let mut deque = Deque::new();
        for x in 1..=100 {
            deque.push_back(x);
        }
        for _ in 0..50 {
            deque.pop_front();
        }
        assert_eq!(deque.len(), 50);
        assert_eq!(deque.front(), Some(&51));
        assert_eq!(deque.back(), Some(&100));
    }

    #[test]
    fn remove_middle_of_five() {
        let mut deque = Deque::from_elem(String::from("x"), 5);
        assert_eq!(deque.remove(2).as_deref(), Some("x"));
        assert_eq!(deque.len(), 4);
        assert!(deque.iter().all(|s| s == "x"));
    }

    #[test]
    fn growth_is_boundary_exact_and_moves_no_elements() {
        let mut deque = Deque::new();
        deque.push_back(0);
        // first push allocates the initial two-bucket pool
        assert_eq!(deque.capacity(), 2 * BUCKET_CAPACITY);

        for x in 1..BUCKET_CAPACITY as i32 {
            deque.push_back(x);
        }
        // one whole bucket of slots consumed, none left at the back
        assert_eq!(deque.len(), BUCKET_CAPACITY);
        assert_eq!(deque.capacity(), 2 * BUCKET_CAPACITY);

        let front_addr = &deque[0] as *const i32;
        deque.push_back(BUCKET_CAPACITY as i32);
        assert_eq!(deque.capacity(), 4 * BUCKET_CAPACITY);
        // the bucket table was reallocated, the elements were not
        assert_eq!(&deque[0] as *const i32, front_addr);
        assert_eq!(deque.front(), Some(&0));
        assert_eq!(deque.back(), Some(&(BUCKET_CAPACITY as i32)));
    }

    #[test]
    fn front_growth_is_boundary_exact() {
        let mut deque = Deque::with_capacity(1);
        assert_eq!(deque.capacity(), BUCKET_CAPACITY);

        // the reserved slot sits at (capacity - 1) / 2, leaving 15 free
        // slots in front of it
        for x in 0..15 {
            deque.push_front(x);
        }
        assert_eq!(deque.capacity(), BUCKET_CAPACITY);

        deque.push_front(15);
        assert_eq!(deque.capacity(), 3 * BUCKET_CAPACITY);
        let expected: Vec<i32> = (0..=15).rev().collect();
        assert_eq!(deque, expected);
    }

    #[test]
    fn bounded_fifo_reuses_buckets_instead_of_growing() {
        let mut deque = Deque::new();
        for x in 0..32 {
            deque.push_back(x);
        }

        let mut next = 32;
        for _ in 0..10_000 {
            let back_addr = &deque[31] as *const i32;
            deque.push_back(next);
            next += 1;
            deque.pop_front();
            // the old back is one slot closer to the front now, at the
            // same address, whether or not the table was touched
            assert_eq!(&deque[30] as *const i32, back_addr);
        }

        assert_eq!(deque.len(), 32);
        assert!(deque.iter().copied().eq(next - 32..next));
        assert!(deque.capacity() <= 8 * BUCKET_CAPACITY);
    }

    #[test]
    fn bounded_reverse_fifo_reuses_buckets() {
        let mut deque = Deque::new();
        let mut next = 0;
        for _ in 0..32 {
            deque.push_front(next);
            next += 1;
        }

        for _ in 0..10_000 {
            deque.push_front(next);
            next += 1;
            deque.pop_back();
        }

        assert_eq!(deque.len(), 32);
        assert!(deque.iter().rev().copied().eq(next - 32..next));
        assert!(deque.capacity() <= 8 * BUCKET_CAPACITY);
    }

    #[test]
    fn alternating_growth_preserves_order() {
        let mut deque = Deque::with_capacity(1);
        let mut model: Vec<i32> = Vec::new();
        let mut growth_events = 0;
        let mut capacity = deque.capacity();

        for x in 0..200 {
            if x % 2 == 0 {
                deque.push_front(x);
                model.insert(0, x);
            } else {
                deque.push_back(x);
                model.push(x);
            }
            if deque.capacity() != capacity {
                capacity = deque.capacity();
                growth_events += 1;
            }
            assert_eq!(deque.len(), model.len());
        }

        assert!(growth_events >= 2);
        assert_eq!(deque, model);
    }

    #[test]
    fn randomized_ends_match_reference_model() {
        let mut rng = SmallRng::seed_from_u64(0x5432_1012_3454_3210);
        let mut deque = Deque::new();
        let mut model: Vec<u32> = Vec::new();

        for _ in 0..10_000 {
            match rng.next_u32() % 4 {
                0 => {
                    let v = rng.next_u32();
                    deque.push_back(v);
                    model.push(v);
                }
                1 => {
                    let v = rng.next_u32();
                    deque.push_front(v);
                    model.insert(0, v);
                }
                2 => assert_eq!(deque.pop_back(), model.pop()),
                _ => {
                    let expected = if model.is_empty() {
                        None
                    } else {
                        Some(model.remove(0))
                    };
                    assert_eq!(deque.pop_front(), expected);
                }
            }
            assert_eq!(deque.len(), model.len());
        }

        assert!(deque.iter().eq(model.iter()));
    }

    #[test]
    fn randomized_insert_remove_match_reference_model() {
        let mut rng = SmallRng::seed_from_u64(0x0123_4567_89AB_CDEF);
        let mut deque = Deque::new();
        let mut model: Vec<u32> = Vec::new();

        for _ in 0..2_000 {
            if model.is_empty() || rng.next_u32() % 3 != 0 {
                let v = rng.next_u32();
                let at = rng.next_u32() as usize % (model.len() + 1);
                deque.insert(at, v);
                model.insert(at, v);
            } else {
                let at = rng.next_u32() as usize % model.len();
                assert_eq!(deque.remove(at), Some(model.remove(at)));
            }
        }

        assert!(deque.iter().eq(model.iter()));
    }

    #[test]
    fn clone_is_deep() {
        let original: Deque<i32> = (0..100).collect();
        let mut copy = original.clone();
        assert_eq!(copy.len(), original.len());
        assert_eq!(copy, original);

        copy.push_back(100);
        *copy.get_mut(0).unwrap() = -1;
        assert_eq!(original.len(), 100);
        assert_eq!(original[0], 0);
        assert_eq!(copy[0], -1);
    }

    #[test]
    fn clear_on_empty_is_a_no_op() {
        let mut deque = Deque::<u8>::new();
        deque.clear();
        assert!(deque.is_empty());
        assert_eq!(deque.capacity(), 0);
        deque.push_back(1);
        assert_eq!(deque.front(), Some(&1));
    }

    #[test]
    fn clear_keeps_storage_and_recenters() {
        let mut deque: Deque<i32> = (0..100).collect();
        let capacity = deque.capacity();
        deque.clear();
        assert!(deque.is_empty());
        assert_eq!(deque.capacity(), capacity);
        deque.push_front(1);
        deque.push_back(2);
        assert_eq!(deque, [1, 2]);
        assert_eq!(deque.capacity(), capacity);
    }

    #[test]
    fn insert_at_ends_matches_pushes() {
        let mut a: Deque<i32> = [1, 2, 3].into();
        let mut b = a.clone();

        a.insert(0, 0);
        b.push_front(0);
        assert_eq!(a, b);

        a.insert(a.len(), 9);
        b.push_back(9);
        assert_eq!(a, b);
    }

    #[test]
    fn insert_shifts_toward_the_back() {
        let mut deque: Deque<i32> = [1, 2, 3, 4].into();
        deque.insert(2, 9);
        assert_eq!(deque, [1, 2, 9, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn insert_past_len_panics() {
        let mut deque: Deque<i32> = [1].into();
        deque.insert(2, 0);
    }

    #[test]
    fn indexing() {
        let mut deque: Deque<i32> = [1, 2, 3].into();
        assert_eq!(deque[2], 3);
        deque[1] = 5;
        assert_eq!(deque, [1, 5, 3]);
        assert_eq!(deque.get(3), None);
    }

    #[derive(Clone)]
    struct Droppable<'a> {
        counter: &'a Cell<usize>,
    }

    impl Drop for Droppable<'_> {
        fn drop(&mut self) {
            self.counter.set(self.counter.get() + 1);
        }
    }

    #[test]
    fn all_elements_drop_exactly_once() {
        let drop_count = Cell::new(0);
        let mut deque = Deque::new();
        for _ in 0..50 {
            deque.push_back(Droppable {
                counter: &drop_count,
            });
        }

        deque.remove(10);
        assert_eq!(drop_count.get(), 1);

        deque.truncate(40);
        assert_eq!(drop_count.get(), 10);

        deque.clear();
        assert_eq!(drop_count.get(), 50);

        for _ in 0..8 {
            deque.push_front(Droppable {
                counter: &drop_count,
            });
        }
        drop(deque);
        assert_eq!(drop_count.get(), 58);
    }

    #[test]
    fn into_iter_drops_unconsumed_elements() {
        let drop_count = Cell::new(0);
        let mut deque = Deque::new();
        for _ in 0..10 {
            deque.push_back(Droppable {
                counter: &drop_count,
            });
        }

        let mut it = deque.into_iter();
        it.next();
        it.next_back();
        assert_eq!(drop_count.get(), 2);
        drop(it);
        assert_eq!(drop_count.get(), 10);
    }

    #[test]
    fn zero_sized_elements() {
        let mut deque = Deque::new();
        for _ in 0..100 {
            deque.push_back(());
            deque.push_front(());
        }
        assert_eq!(deque.len(), 200);
        assert_eq!(deque.iter().count(), 200);
        assert_eq!(deque.pop_back(), Some(()));
        assert_eq!(deque.len(), 199);
    }

    #[test]
    fn iterators_step_from_both_ends() {
        let deque: Deque<i32> = (0..100).collect();

        assert_eq!(deque.iter().nth(64), Some(&64));
        assert_eq!(deque.iter().nth(100), None);
        assert_eq!(deque.iter().nth_back(1), Some(&98));
        assert_eq!(deque.iter().count(), 100);
        assert_eq!(deque.iter().last(), Some(&99));

        let mut it = deque.iter();
        assert_eq!(it.len(), 100);
        it.next();
        it.next_back();
        assert_eq!(it.len(), 98);
        assert!(it.copied().eq(1..=98));

        let total: i32 = deque.iter().rev().sum();
        assert_eq!(total, (0..100).sum::<i32>());
    }

    #[test]
    fn iter_mut_reaches_every_element() {
        let mut deque: Deque<i32> = (0..40).collect();
        for x in deque.iter_mut().rev() {
            *x += 1;
        }
        let expected: Vec<i32> = (1..=40).collect();
        assert_eq!(deque, expected);
    }

    #[test]
    fn comparisons() {
        let a: Deque<i32> = [1, 2, 3].into();
        let mut b = Deque::new();
        b.push_front(3);
        b.push_front(2);
        b.push_front(1);
        assert_eq!(a, b);

        b.push_back(4);
        assert_ne!(a, b);
        assert!(a < b);

        let c: Deque<i32> = [1, 2, 4].into();
        assert!(a < c);
        assert!(a.contains(&2));
        assert!(!a.contains(&4));
    }

    #[test]
    fn hash_agrees_with_equality() {
        use core::hash::{Hash, Hasher};

        struct XorHasher(u64);
        impl Hasher for XorHasher {
            fn finish(&self) -> u64 {
                self.0
            }
            fn write(&mut self, bytes: &[u8]) {
                for &b in bytes {
                    self.0 = self.0.rotate_left(7) ^ u64::from(b);
                }
            }
        }

        let a: Deque<u16> = [1, 2, 3].into();
        let mut b: Deque<u16> = Deque::new();
        b.push_front(2);
        b.push_front(1);
        b.push_back(3);
        assert_eq!(a, b);

        let mut ha = XorHasher(0);
        let mut hb = XorHasher(0);
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn extend_and_resize() {
        let mut deque: Deque<i32> = Deque::new();
        deque.extend([1, 2]);
        deque.extend(&[3, 4]);
        assert_eq!(deque, [1, 2, 3, 4]);

        deque.resize(6, 0);
        assert_eq!(deque, [1, 2, 3, 4, 0, 0]);
        deque.resize(2, 0);
        assert_eq!(deque, [1, 2]);

        let mut next = 10;
        deque.resize_with(4, || {
            next += 1;
            next
        });
        assert_eq!(deque, [1, 2, 11, 12]);
    }

    #[test]
    fn reserve_then_push_does_not_grow() {
        let mut deque = Deque::<u32>::new();
        deque.try_reserve_back().unwrap();
        let capacity = deque.capacity();
        deque.push_back(1);
        assert_eq!(deque.capacity(), capacity);

        deque.try_reserve_front().unwrap();
        let capacity = deque.capacity();
        deque.push_front(0);
        assert_eq!(deque.capacity(), capacity);
        assert_eq!(deque, [0, 1]);
    }

    #[derive(Default)]
    struct CountingAlloc {
        live: Cell<isize>,
    }

    unsafe impl RawAlloc for CountingAlloc {
        fn allocate(&self, layout: Layout) -> crate::Result<NonNull<u8>> {
            self.live.set(self.live.get() + 1);
            Global.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.set(self.live.get() - 1);
            unsafe { Global.deallocate(ptr, layout) };
        }
    }

    #[test]
    fn custom_allocator_sees_every_allocation() {
        let counting = CountingAlloc::default();
        let mut deque = Deque::new_in(&counting);
        for x in 0..1000 {
            if x % 3 == 0 {
                deque.push_front(x);
            } else {
                deque.push_back(x);
            }
        }
        assert!(counting.live.get() > 0);
        assert_eq!(deque.len(), 1000);

        drop(deque);
        assert_eq!(counting.live.get(), 0);
    }

    #[test]
    fn pops_drain_from_alternating_ends() {
        let mut deque: Deque<i32> = (0..10).collect();
        let mut collected = Vec::new();
        loop {
            match (deque.pop_front(), deque.pop_back()) {
                (Some(f), Some(b)) => {
                    collected.push(f);
                    collected.push(b);
                }
                (Some(f), None) => collected.push(f),
                (None, _) => break,
            }
        }
        assert_eq!(collected, [0, 9, 1, 8, 2, 7, 3, 6, 4, 5]);
        assert!(deque.is_empty());
    }
}
