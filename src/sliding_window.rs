//! Median and rank queries over the most recent `k` values of a stream.
//!
//! A heap cannot evict an arbitrary value, so [`SlidingWindow`] keeps the
//! window in an order-statistic B+tree: insert, evict and select-by-rank are
//! all O(log k). Each value is tagged with its arrival number, which makes
//! equal values distinct entries and lets an eviction remove exactly the
//! occurrence that is leaving the window.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::num::NonZeroUsize;

use tracing::{debug, error, trace};

use crate::comparator::{Compare, Natural, natural};
use crate::error::{Error, Result};
use crate::midpoint::Midpoint;
use crate::raw::RawOrderTree;

mod order_statistic;

/// A window value tagged with its arrival number.
#[derive(Clone)]
struct Entry<T> {
    value: T,
    seq: u64,
}

/// Orders entries by value, then by arrival.
#[derive(Clone)]
struct ArrivalOrder<C>(C);

impl<T, C: Compare<T>> Compare<Entry<T>> for ArrivalOrder<C> {
    fn compare(&self, a: &Entry<T>, b: &Entry<T>) -> Ordering {
        self.0.compare(&a.value, &b.value).then(a.seq.cmp(&b.seq))
    }
}

/// Order statistics over a fixed-size window of the most recent values.
///
/// The window warms up while fewer than `k` values have arrived; during
/// warm-up no median is reported. After that every new value evicts the
/// oldest one.
///
/// # Examples
///
/// ```
/// use ordstat::SlidingWindow;
///
/// let mut window = SlidingWindow::new(3).unwrap();
/// let medians: Vec<_> = [1, 3, -1, -3, 5, 3, 6, 7]
///     .into_iter()
///     .filter_map(|value| window.push(value))
///     .collect();
///
/// assert_eq!(medians, [1.0, -1.0, -1.0, 3.0, 5.0, 6.0]);
/// ```
pub struct SlidingWindow<T, C = Natural<T>> {
    window: NonZeroUsize,
    ordered: RawOrderTree<Entry<T>, ArrivalOrder<C>>,
    // Oldest first.
    arrivals: VecDeque<Entry<T>>,
    next_seq: u64,
}

impl<T: Ord + Clone> SlidingWindow<T> {
    /// Creates an empty window of `window` values ordered by `T`'s [`Ord`]
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `window` is zero.
    pub fn new(window: usize) -> Result<Self> {
        Self::with_comparator(window, natural())
    }
}

impl<T: Clone, C: Compare<T>> SlidingWindow<T, C> {
    /// Creates an empty window of `window` values ordered by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `window` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordstat::{Error, SlidingWindow};
    /// use ordstat::comparator::TotalOrder;
    ///
    /// assert!(SlidingWindow::<f64, _>::with_comparator(4, TotalOrder).is_ok());
    /// assert_eq!(
    ///     SlidingWindow::<f64, _>::with_comparator(0, TotalOrder).err(),
    ///     Some(Error::InvalidConfig { parameter: "window", value: 0 }),
    /// );
    /// ```
    pub fn with_comparator(window: usize, cmp: C) -> Result<Self> {
        let Some(window) = NonZeroUsize::new(window) else {
            return Err(Error::InvalidConfig {
                parameter: "window",
                value: window,
            });
        };
        debug!(window = window.get(), "creating sliding window");
        Ok(Self {
            window,
            ordered: RawOrderTree::new(ArrivalOrder(cmp)),
            arrivals: VecDeque::with_capacity(window.get()),
            next_seq: 0,
        })
    }

    /// Appends `value` as the newest window member and returns the value it
    /// evicted, if the window was already full.
    ///
    /// # Panics
    ///
    /// Panics if the evicted value cannot be found in the window index. That
    /// is a bookkeeping defect, not a recoverable condition: continuing would
    /// report wrong order statistics.
    ///
    /// # Complexity
    ///
    /// O(log k)
    pub fn observe(&mut self, value: T) -> Option<T> {
        let mut evicted = None;
        if self.arrivals.len() == self.window.get()
            && let Some(oldest) = self.arrivals.pop_front()
        {
            if self.ordered.remove(&oldest).is_none() {
                error!(seq = oldest.seq, "evicted value missing from window index");
                panic!("`SlidingWindow::observe()` - evicted value #{} is missing from the window index!", oldest.seq);
            }
            trace!(seq = oldest.seq, "evicted oldest window value");
            evicted = Some(oldest.value);
        }

        let entry = Entry {
            value,
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.arrivals.push_back(entry.clone());
        let inserted = self.ordered.insert(entry);
        debug_assert!(inserted, "arrival numbers must be unique within a window");
        debug_assert_eq!(self.ordered.len(), self.arrivals.len());

        evicted
    }

    /// Appends `value` and returns the median of the window once it is full,
    /// or `None` during warm-up.
    ///
    /// # Panics
    ///
    /// See [`observe`](SlidingWindow::observe).
    ///
    /// # Complexity
    ///
    /// O(log k)
    pub fn push(&mut self, value: T) -> Option<T::Output>
    where
        T: Midpoint,
    {
        self.observe(value);
        self.median()
    }

    /// Returns the median of the window, or `None` during warm-up.
    ///
    /// An odd-sized window reports its central value exactly; an even-sized
    /// one reports the mean of its two central values.
    ///
    /// # Complexity
    ///
    /// O(log k)
    #[must_use]
    pub fn median(&self) -> Option<T::Output>
    where
        T: Midpoint,
    {
        if !self.is_full() {
            return None;
        }
        let k = self.window.get();
        let low = self.select((k - 1) / 2)?;
        if k % 2 == 1 {
            Some(low.exact())
        } else {
            Some(low.mean(self.select(k / 2)?))
        }
    }
}

impl<T, C> SlidingWindow<T, C> {
    /// Returns the configured window size `k`.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window.get()
    }

    /// Returns how many values the window currently holds, at most `k`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns true before the first value arrives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Returns true once `k` values have arrived.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ordered.len() == self.window.get()
    }

    /// Iterates over the window in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator + '_ {
        self.ordered.iter().map(|entry| &entry.value)
    }

    /// Iterates over the window from the oldest value to the newest.
    pub fn iter_arrival(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator + '_ {
        self.arrivals.iter().map(|entry| &entry.value)
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SlidingWindow<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("window", &self.window)
            .field("values", &self.arrivals.iter().map(|entry| &entry.value).collect::<Vec<_>>())
            .finish()
    }
}

/// Returns the median of every full window of `window` consecutive values.
///
/// Produces `n - window + 1` medians for `n >= window` values, and none for
/// shorter inputs.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `window` is zero.
///
/// # Examples
///
/// ```
/// use ordstat::sliding_window::medians;
///
/// assert_eq!(medians([1, 2, 3, 4], 2).unwrap(), [1.5, 2.5, 3.5]);
/// ```
pub fn medians<T, I>(values: I, window: usize) -> Result<Vec<T::Output>>
where
    I: IntoIterator<Item = T>,
    T: Ord + Clone + Midpoint,
{
    let mut sliding = SlidingWindow::new(window)?;
    Ok(values.into_iter().filter_map(|value| sliding.push(value)).collect())
}
