//! Fixed-capacity buffers
//!
//! Every enumeration and selection helper in this crate works into storage
//! whose size is known at compile time. Nothing grows and nothing touches the
//! heap, so "out of room" is a normal outcome rather than an allocation error.

use std::fmt;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::ptr;

/// Inline vector with a compile-time capacity of `N` elements.
pub struct FixedVec<T, const N: usize> {
    buf: [MaybeUninit<T>; N],
    len: usize,
}

impl<T, const N: usize> FixedVec<T, N> {
    pub fn new() -> Self {
        Self {
            buf: [const { MaybeUninit::uninit() }; N],
            len: 0,
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Append `value`, handing it back if the buffer is already full.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.buf[self.len].write(value);
        self.len += 1;
        Ok(())
    }

    /// Insert `value` at `index`, shifting the tail one slot towards the end.
    ///
    /// When the buffer is full the last element is pushed out and returned as
    /// `Ok(Some(evicted))`. An `index` at or past the capacity, or past the
    /// current length, rejects the value and returns it as `Err`.
    pub fn insert_evicting(&mut self, index: usize, value: T) -> Result<Option<T>, T> {
        if index >= N || index > self.len {
            return Err(value);
        }

        let evicted = if self.is_full() {
            self.len -= 1;
            // SAFETY: slot `len` was initialized and is now outside the live range.
            Some(unsafe { self.buf[self.len].assume_init_read() })
        } else {
            None
        };

        unsafe {
            // SAFETY: `index <= len < N`, so both ranges stay inside `buf`.
            let base = self.buf.as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + 1), self.len - index);
            ptr::write(base.add(index), MaybeUninit::new(value));
        }
        self.len += 1;
        Ok(evicted)
    }

    /// Drop every element and reset the length to zero.
    pub fn clear(&mut self) {
        let len = self.len;
        // Length first so a panicking destructor cannot cause a double drop.
        self.len = 0;
        for slot in &mut self.buf[..len] {
            // SAFETY: entries `0..len` were initialized.
            unsafe { slot.assume_init_drop() };
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: entries `0..len` are initialized and `MaybeUninit<T>` has the layout of `T`.
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr() as *const T, self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: see `as_slice`.
        unsafe { std::slice::from_raw_parts_mut(self.buf.as_mut_ptr() as *mut T, self.len) }
    }
}

impl<T, const N: usize> Default for FixedVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for FixedVec<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, const N: usize> Deref for FixedVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for FixedVec<T, N> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FixedVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for FixedVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Outcome of filling a caller-owned buffer.
///
/// `capacity` is what the caller offered, `written` is what ended up in the
/// buffer. `dropped` counts qualifying entries that did not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    pub capacity: usize,
    pub written: usize,
    pub dropped: usize,
}

impl FillReport {
    /// Report for a call that produced nothing (failed or empty query).
    pub const fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            written: 0,
            dropped: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }
}
