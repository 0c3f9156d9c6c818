//! Merging and selection across several ascending sources.
//!
//! [`KWayMerge`] keeps one frontier entry per non-exhausted source in a
//! heap, so memory stays proportional to the number of sources no matter how
//! long they are. Each pop refills the frontier from the source it came
//! from.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use binary_heap_plus::BinaryHeap;
use tracing::{debug, trace};

use crate::comparator::{Compare, Natural, natural};
use crate::error::{Error, Result};

mod source;

pub use source::{SliceSource, SortedSource};

/// The head of one source.
struct Frontier<T> {
    value: T,
    source: usize,
    position: usize,
}

/// Ranks the smallest value (then the lowest source id) highest.
struct FrontierOrder<C>(C);

impl<T, C: Compare<T>> Compare<Frontier<T>> for FrontierOrder<C> {
    fn compare(&self, a: &Frontier<T>, b: &Frontier<T>) -> Ordering {
        self.0.compare(&b.value, &a.value).then(b.source.cmp(&a.source))
    }
}

/// Emits the values of several ascending sources in ascending order.
///
/// Source ids are the zero-based positions of the sources as passed to the
/// constructor. Equal values from different sources are emitted lowest
/// source id first.
///
/// # Examples
///
/// ```
/// use ordstat::KWayMerge;
///
/// let sources = [vec![1, 5, 9], vec![2, 6], vec![3]];
/// let mut merge = KWayMerge::new(sources.into_iter().map(|s| s.into_iter().peekable()));
///
/// assert_eq!(merge.next_smallest(), Some((1, 0)));
/// assert_eq!(merge.next_smallest(), Some((2, 1)));
/// assert_eq!(merge.kth_smallest(2), Ok(5));
/// ```
pub struct KWayMerge<S: SortedSource, C = Natural<<S as SortedSource>::Item>> {
    sources: Vec<S>,
    frontier: BinaryHeap<Frontier<S::Item>, FrontierOrder<C>>,
}

impl<S> KWayMerge<S>
where
    S: SortedSource,
    S::Item: Ord + Clone,
{
    /// Creates a merge over `sources` ordered by the items' [`Ord`]
    /// implementation.
    #[must_use]
    pub fn new<I: IntoIterator<Item = S>>(sources: I) -> Self {
        Self::with_comparator(sources, natural())
    }
}

impl<S, C> KWayMerge<S, C>
where
    S: SortedSource,
    S::Item: Clone,
    C: Compare<S::Item>,
{
    /// Creates a merge over `sources` ordered by `cmp`, seeding the frontier
    /// with the head of every non-empty source.
    ///
    /// # Complexity
    ///
    /// O(k log k) for k sources.
    #[must_use]
    pub fn with_comparator<I: IntoIterator<Item = S>>(sources: I, cmp: C) -> Self {
        let mut sources: Vec<S> = sources.into_iter().collect();
        let mut frontier = BinaryHeap::from_vec_cmp(Vec::with_capacity(sources.len()), FrontierOrder(cmp));

        for (id, source) in sources.iter_mut().enumerate() {
            if let Some(head) = source.peek() {
                frontier.push(Frontier {
                    value: head.clone(),
                    source: id,
                    position: 0,
                });
            }
        }

        debug!(sources = sources.len(), frontier = frontier.len(), "creating k-way merge");
        Self { sources, frontier }
    }

    /// Removes and returns the smallest value not yet emitted, together with
    /// the id of the source it came from. Returns `None` once every source is
    /// exhausted.
    ///
    /// # Complexity
    ///
    /// O(log k) for k sources.
    pub fn next_smallest(&mut self) -> Option<(S::Item, usize)> {
        let top = self.frontier.peek()?;
        let (id, position) = (top.source, top.position);

        let source = &mut self.sources[id];
        source.advance();
        let emitted = match source.peek() {
            Some(next) => {
                trace!(source = id, position = position + 1, "refilling frontier");
                let refill = Frontier {
                    value: next.clone(),
                    source: id,
                    position: position + 1,
                };
                let mut top = self.frontier.peek_mut()?;
                core::mem::replace(&mut *top, refill)
            }
            None => {
                trace!(source = id, "source exhausted");
                self.frontier.pop()?
            }
        };

        Some((emitted.value, emitted.source))
    }

    /// Advances past `n - 1` values and returns the `n`th smallest value not
    /// yet emitted (`n` is one-based). On a fresh merge this is the `n`th
    /// smallest value across all sources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if fewer than `n` values remain, or if
    /// `n` is zero. The merge is left exhausted in the former case.
    ///
    /// # Complexity
    ///
    /// O(n log k) for k sources.
    pub fn kth_smallest(&mut self, n: usize) -> Result<S::Item> {
        let mut last = None;
        for produced in 0..n {
            match self.next_smallest() {
                Some((value, _)) => last = Some(value),
                None => {
                    return Err(Error::OutOfRange {
                        requested: n,
                        available: produced,
                    });
                }
            }
        }
        last.ok_or(Error::OutOfRange {
            requested: n,
            available: 0,
        })
    }
}

impl<S: SortedSource, C: Compare<S::Item>> KWayMerge<S, C> {
    /// Returns the number of sources that still have values to emit.
    #[must_use]
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of sources the merge was built from.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Returns true once every source is exhausted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }
}

impl<S, C> Iterator for KWayMerge<S, C>
where
    S: SortedSource,
    S::Item: Clone,
    C: Compare<S::Item>,
{
    type Item = (S::Item, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_smallest()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.frontier.len(), None)
    }
}

impl<S, C> FusedIterator for KWayMerge<S, C>
where
    S: SortedSource,
    S::Item: Clone,
    C: Compare<S::Item>,
{
}

impl<S: SortedSource, C: Compare<S::Item>> fmt::Debug for KWayMerge<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KWayMerge")
            .field("sources", &self.sources.len())
            .field("frontier", &self.frontier.len())
            .finish()
    }
}

/// Merges ascending sequences into one ascending vector.
///
/// # Examples
///
/// ```
/// use ordstat::kway_merge::merge_sorted;
///
/// let merged = merge_sorted([vec![1, 4, 5], vec![1, 3, 4], vec![2, 6]]);
/// assert_eq!(merged, [1, 1, 2, 3, 4, 4, 5, 6]);
/// ```
pub fn merge_sorted<T, I>(sources: I) -> Vec<T>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = T>,
    T: Ord + Clone,
{
    KWayMerge::new(sources.into_iter().map(|source| source.into_iter().peekable()))
        .map(|(value, _)| value)
        .collect()
}

/// Returns the `n`th smallest (one-based) value of a matrix whose rows are
/// each sorted ascending. The frontier holds at most one value per row.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if `n` is zero or exceeds the number of
/// values in the matrix.
///
/// # Examples
///
/// ```
/// use ordstat::kway_merge::kth_smallest_in_matrix;
///
/// let matrix = [[1, 5, 9], [10, 11, 13], [12, 13, 15]];
/// assert_eq!(kth_smallest_in_matrix(&matrix, 8), Ok(13));
/// ```
pub fn kth_smallest_in_matrix<T, R>(rows: &[R], n: usize) -> Result<T>
where
    R: AsRef<[T]>,
    T: Ord + Clone,
{
    KWayMerge::new(rows.iter().map(|row| SliceSource::new(row.as_ref()))).kth_smallest(n)
}
