//! Running median over an append-only stream.
//!
//! [`StreamingMedian`] splits the values seen so far into two heaps: a
//! max-heap holding the lower half and a min-heap holding the upper half.
//! The lower half is never smaller than the upper half and never more than
//! one value larger, so the median always sits at one or both heap tops.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use binary_heap_plus::BinaryHeap;
use tracing::{debug, trace};

use crate::comparator::{Compare, Natural, Rev, natural};
use crate::error::{Error, Result};
use crate::midpoint::Midpoint;

/// Tracks the median of every value inserted so far.
///
/// Insertion is O(log n); [`median`](StreamingMedian::median) is O(1).
///
/// # Examples
///
/// ```
/// use ordstat::StreamingMedian;
///
/// let mut median = StreamingMedian::new();
/// median.insert(5);
/// assert_eq!(median.median(), Ok(5.0));
/// median.insert(2);
/// assert_eq!(median.median(), Ok(3.5));
/// median.insert(8);
/// assert_eq!(median.median(), Ok(5.0));
/// ```
pub struct StreamingMedian<T, C = Natural<T>> {
    cmp: C,
    // Max-heap: the smaller half, including the median when the count is odd.
    lower: BinaryHeap<T, C>,
    // Min-heap: the larger half.
    upper: BinaryHeap<T, Rev<C>>,
}

impl<T: Ord> StreamingMedian<T> {
    /// Creates an empty tracker ordered by `T`'s [`Ord`] implementation.
    #[must_use]
    pub fn new() -> Self {
        Self::from_comparators(natural(), natural(), natural::<T>().rev())
    }
}

impl<T: Ord> Default for StreamingMedian<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Compare<T> + Clone> StreamingMedian<T, C> {
    /// Creates an empty tracker ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordstat::StreamingMedian;
    /// use ordstat::comparator::TotalOrder;
    ///
    /// let mut median = StreamingMedian::with_comparator(TotalOrder);
    /// median.insert(0.25_f64);
    /// median.insert(0.75);
    /// assert_eq!(median.median(), Ok(0.5));
    /// ```
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self::from_comparators(cmp.clone(), cmp.clone(), cmp.rev())
    }
}

impl<T, C: Compare<T>> StreamingMedian<T, C> {
    fn from_comparators(cmp: C, lower: C, upper: Rev<C>) -> Self {
        debug!("creating streaming median tracker");
        Self {
            cmp,
            lower: BinaryHeap::from_vec_cmp(Vec::new(), lower),
            upper: BinaryHeap::from_vec_cmp(Vec::new(), upper),
        }
    }

    /// Adds `value` to the stream.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) {
        let goes_low = self
            .lower
            .peek()
            .is_none_or(|max| self.cmp.compare(&value, max) != Ordering::Greater);

        if goes_low {
            self.lower.push(value);
        } else {
            self.upper.push(value);
        }

        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                trace!(lower = self.lower.len(), upper = self.upper.len(), "moving lower max to upper half");
                self.upper.push(moved);
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(moved) = self.upper.pop() {
                trace!(lower = self.lower.len(), upper = self.upper.len(), "moving upper min to lower half");
                self.lower.push(moved);
            }
        }
    }

    /// Returns the median of all inserted values.
    ///
    /// With an odd count this is the central value exactly; with an even
    /// count it is the mean of the two central values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyState`] if nothing has been inserted yet.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn median(&self) -> Result<T::Output>
    where
        T: Midpoint,
    {
        match (self.lower.peek(), self.upper.peek()) {
            (None, _) => Err(Error::EmptyState),
            (Some(low), Some(high)) if self.lower.len() == self.upper.len() => Ok(low.mean(high)),
            (Some(low), _) => Ok(low.exact()),
        }
    }

    /// Returns the number of values inserted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// Returns true if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Returns the size of the lower half.
    #[must_use]
    pub fn lower_len(&self) -> usize {
        self.lower.len()
    }

    /// Returns the size of the upper half.
    #[must_use]
    pub fn upper_len(&self) -> usize {
        self.upper.len()
    }

    /// Returns the largest value of the lower half.
    #[must_use]
    pub fn peek_lower(&self) -> Option<&T> {
        self.lower.peek()
    }

    /// Returns the smallest value of the upper half.
    #[must_use]
    pub fn peek_upper(&self) -> Option<&T> {
        self.upper.peek()
    }
}

impl<T, C: Compare<T>> Extend<T> for StreamingMedian<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for StreamingMedian<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut median = Self::new();
        median.extend(iter);
        median
    }
}

impl<T, C: Compare<T>> fmt::Debug for StreamingMedian<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingMedian")
            .field("lower_len", &self.lower.len())
            .field("upper_len", &self.upper.len())
            .finish_non_exhaustive()
    }
}
