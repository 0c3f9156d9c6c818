//! Comparators injected into the order-statistic containers.
//!
//! Every container in this crate orders its values through a
//! [`Compare`] implementation rather than requiring [`Ord`] directly. This
//! lets floating point values (which are only [`PartialOrd`]), closures and
//! caller-defined orderings share the same machinery. Closures of the shape
//! `Fn(&T, &T) -> Ordering` are comparators as they are.

use core::cmp::Ordering;

pub use compare::{Compare, Natural, Rev, natural};

/// Orders floating point values by IEEE 754 `totalOrder`.
///
/// `-0.0` sorts before `+0.0` and NaNs sort at the extremes according to
/// their sign bit.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use ordstat::comparator::{Compare, TotalOrder};
///
/// assert_eq!(TotalOrder.compare(&1.5_f64, &-2.0), Ordering::Greater);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TotalOrder;

impl Compare<f64> for TotalOrder {
    #[inline]
    fn compare(&self, a: &f64, b: &f64) -> Ordering {
        a.total_cmp(b)
    }
}

impl Compare<f32> for TotalOrder {
    #[inline]
    fn compare(&self, a: &f32, b: &f32) -> Ordering {
        a.total_cmp(b)
    }
}
