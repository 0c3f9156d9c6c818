//! Running k-th largest value over an append-only stream.

use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;

use binary_heap_plus::BinaryHeap;
use tracing::{debug, trace};

use crate::comparator::{Compare, Natural, Rev, natural};
use crate::error::{Error, Result};

/// Tracks the `k`th largest value seen so far.
///
/// Keeps only the `k` largest values in a min-heap, so memory is O(k) and
/// each insert is O(log k) regardless of stream length.
///
/// # Examples
///
/// ```
/// use ordstat::KthLargest;
///
/// let mut tracker = KthLargest::new(3).unwrap();
/// assert_eq!(tracker.add(4), None);
/// assert_eq!(tracker.add(5), None);
/// assert_eq!(tracker.add(8), Some(&4));
/// assert_eq!(tracker.add(2), Some(&4));
/// assert_eq!(tracker.add(9), Some(&5));
/// ```
pub struct KthLargest<T, C = Natural<T>> {
    k: NonZeroUsize,
    cmp: C,
    // The k largest values so far; the top is the smallest of them.
    largest: BinaryHeap<T, Rev<C>>,
}

impl<T: Ord> KthLargest<T> {
    /// Creates a tracker for the `k`th largest value under `T`'s [`Ord`]
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `k` is zero.
    pub fn new(k: usize) -> Result<Self> {
        Self::from_comparators(k, natural(), natural::<T>().rev())
    }
}

impl<T, C: Compare<T> + Clone> KthLargest<T, C> {
    /// Creates a tracker for the `k`th largest value under `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `k` is zero.
    pub fn with_comparator(k: usize, cmp: C) -> Result<Self> {
        Self::from_comparators(k, cmp.clone(), cmp.rev())
    }
}

impl<T, C: Compare<T>> KthLargest<T, C> {
    fn from_comparators(k: usize, cmp: C, reversed: Rev<C>) -> Result<Self> {
        let Some(k) = NonZeroUsize::new(k) else {
            return Err(Error::InvalidConfig { parameter: "k", value: k });
        };
        debug!(k = k.get(), "creating k-th largest tracker");
        Ok(Self {
            k,
            cmp,
            largest: BinaryHeap::from_vec_cmp(Vec::with_capacity(k.get()), reversed),
        })
    }

    /// Adds `value` and returns the current `k`th largest value, or `None`
    /// while fewer than `k` values have been seen.
    ///
    /// # Complexity
    ///
    /// O(log k)
    pub fn add(&mut self, value: T) -> Option<&T> {
        if self.largest.len() < self.k.get() {
            self.largest.push(value);
        } else if let Some(mut smallest) = self.largest.peek_mut()
            && self.cmp.compare(&value, &*smallest).is_gt()
        {
            trace!("displacing smallest of the k largest");
            *smallest = value;
        }
        self.kth_largest().ok()
    }

    /// Returns the current `k`th largest value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] while fewer than `k` values have been
    /// seen.
    pub fn kth_largest(&self) -> Result<&T> {
        match self.largest.peek() {
            Some(value) if self.largest.len() == self.k.get() => Ok(value),
            _ => Err(Error::OutOfRange {
                requested: self.k.get(),
                available: self.largest.len(),
            }),
        }
    }

    /// Returns `k`.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k.get()
    }

    /// Returns how many values are retained, at most `k`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.largest.len()
    }

    /// Returns true before the first value arrives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.largest.is_empty()
    }
}

impl<T, C: Compare<T>> Extend<T> for KthLargest<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T, C: Compare<T>> fmt::Debug for KthLargest<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KthLargest")
            .field("k", &self.k)
            .field("len", &self.largest.len())
            .finish_non_exhaustive()
    }
}
