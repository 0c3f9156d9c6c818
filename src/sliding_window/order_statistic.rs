use core::cmp::Ordering;
use core::ops::Index;

use super::{Entry, SlidingWindow};
use crate::Rank;
use crate::comparator::Compare;

impl<T, C> SlidingWindow<T, C> {
    /// Returns the value at zero-based position `rank` in ascending order of
    /// the current window, or `None` if `rank >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log k)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordstat::SlidingWindow;
    ///
    /// let mut window = SlidingWindow::new(2).unwrap();
    /// window.observe(9);
    /// window.observe(4);
    /// window.observe(6); // evicts 9
    ///
    /// assert_eq!(window.select(0), Some(&4));
    /// assert_eq!(window.select(1), Some(&6));
    /// assert_eq!(window.select(2), None);
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<&T> {
        self.ordered.get_by_rank(rank).map(|entry| &entry.value)
    }
}

impl<T: Clone, C: Compare<T>> SlidingWindow<T, C> {
    /// Returns the rank of the first occurrence of `value` in the window,
    /// which is the number of window values strictly below it. Returns `None`
    /// if `value` is not in the window.
    ///
    /// # Complexity
    ///
    /// O(log k)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordstat::SlidingWindow;
    ///
    /// let mut window = SlidingWindow::new(4).unwrap();
    /// for value in [5, 1, 5, 3] {
    ///     window.observe(value);
    /// }
    ///
    /// assert_eq!(window.rank_of(&5), Some(2));
    /// assert_eq!(window.rank_of(&4), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, value: &T) -> Option<usize> {
        let probe = Entry {
            value: value.clone(),
            seq: 0,
        };
        let rank = self.ordered.count_less(&probe);
        let candidate = self.select(rank)?;
        let cmp = &self.ordered.comparator().0;
        (cmp.compare(candidate, value) == Ordering::Equal).then_some(rank)
    }
}

/// Indexes into the window by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<T, C> Index<Rank> for SlidingWindow<T, C> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).expect("index out of bounds")
    }
}
