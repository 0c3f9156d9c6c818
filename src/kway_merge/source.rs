use alloc::boxed::Box;
use core::iter::Peekable;

/// A lazy ascending sequence feeding a [`KWayMerge`](super::KWayMerge).
///
/// The merge only ever looks at the current head of a source and moves past
/// it once that head has been emitted, so sources may be backed by slices,
/// iterators, files or generators alike. Values must be produced in
/// ascending order under the merge's comparator; otherwise the merged output
/// is unspecified.
pub trait SortedSource {
    /// The values this source yields.
    type Item;

    /// Returns the current head without consuming it, or `None` once the
    /// source is exhausted.
    fn peek(&mut self) -> Option<&Self::Item>;

    /// Moves past the current head. Has no effect on an exhausted source.
    fn advance(&mut self);
}

impl<I: Iterator> SortedSource for Peekable<I> {
    type Item = I::Item;

    fn peek(&mut self) -> Option<&I::Item> {
        Peekable::peek(self)
    }

    fn advance(&mut self) {
        let _ = self.next();
    }
}

impl<S: SortedSource + ?Sized> SortedSource for Box<S> {
    type Item = S::Item;

    fn peek(&mut self) -> Option<&S::Item> {
        (**self).peek()
    }

    fn advance(&mut self) {
        (**self).advance();
    }
}

impl<S: SortedSource + ?Sized> SortedSource for &mut S {
    type Item = S::Item;

    fn peek(&mut self) -> Option<&S::Item> {
        (**self).peek()
    }

    fn advance(&mut self) {
        (**self).advance();
    }
}

/// A borrowed ascending slice with a read cursor, such as one row of a
/// row-sorted matrix.
///
/// # Examples
///
/// ```
/// use ordstat::kway_merge::{SliceSource, SortedSource};
///
/// let row = [2, 4, 8];
/// let mut source = SliceSource::new(&row);
/// assert_eq!(source.peek(), Some(&2));
/// source.advance();
/// assert_eq!(source.peek(), Some(&4));
/// assert_eq!(source.position(), 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'a, T> {
    slice: &'a [T],
    position: usize,
}

impl<'a, T> SliceSource<'a, T> {
    /// Creates a source positioned at the start of `slice`.
    #[must_use]
    pub fn new(slice: &'a [T]) -> Self {
        Self { slice, position: 0 }
    }

    /// Returns the index of the current head within the slice.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T> SortedSource for SliceSource<'_, T> {
    type Item = T;

    fn peek(&mut self) -> Option<&T> {
        self.slice.get(self.position)
    }

    fn advance(&mut self) {
        if self.position < self.slice.len() {
            self.position += 1;
        }
    }
}
