/// A zero-based rank into the ascending order of a container.
///
/// # Examples
///
/// ```
/// use ordstat::{Rank, SlidingWindow};
///
/// let mut window = SlidingWindow::new(3).unwrap();
/// for value in [30, 10, 20] {
///     window.push(value);
/// }
///
/// assert_eq!(window[Rank(0)], 10);
/// assert_eq!(window[Rank(2)], 30);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
