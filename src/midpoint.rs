//! How values report a median.
//!
//! An odd-sized collection reports its central value exactly; an even-sized
//! one reports the arithmetic mean of its two central values. Both are
//! expressed through [`Midpoint`] so integer inputs can yield fractional
//! medians (`[1, 1, 2, 3]` has median `1.5`).
//!
//! Types that `f64` represents losslessly (`i8` through `i32`, `u8` through
//! `u32`, `f32` and `f64`) report an `f64`. Wider integers report a
//! [`HalfInteger`], which keeps every central value and every mean exact.

use core::cmp::Ordering;

/// A value that can act as, or contribute to, a median.
pub trait Midpoint {
    /// The type a median is reported in.
    type Output;

    /// Returns this value as a median on its own.
    fn exact(&self) -> Self::Output;

    /// Returns the arithmetic mean of `self` and `other`.
    fn mean(&self, other: &Self) -> Self::Output;
}

/// An integer or an integer plus one half, held without rounding.
///
/// This is the median type of 64 and 128-bit integers: the mean of two
/// integers is always one of these two shapes.
///
/// # Examples
///
/// ```
/// use ordstat::StreamingMedian;
/// use ordstat::midpoint::HalfInteger;
///
/// let big = (1_i64 << 53) + 1;
/// let mut median = StreamingMedian::new();
/// median.insert(big);
/// assert_eq!(median.median(), Ok(HalfInteger::from(big)));
///
/// median.insert(big + 1);
/// let mean = median.median().unwrap();
/// assert_eq!(mean.whole(), big);
/// assert!(mean.has_half());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HalfInteger<T> {
    // Rounded towards negative infinity.
    whole: T,
    half: bool,
}

impl<T: Copy> HalfInteger<T> {
    /// Returns the value rounded towards negative infinity.
    #[must_use]
    pub const fn whole(&self) -> T {
        self.whole
    }

    /// Returns true if the value lies exactly between two integers.
    #[must_use]
    pub const fn has_half(&self) -> bool {
        self.half
    }

    /// Returns the value as an integer, or `None` if it has a half.
    #[must_use]
    pub const fn to_integer(&self) -> Option<T> {
        if self.half { None } else { Some(self.whole) }
    }
}

impl<T> From<T> for HalfInteger<T> {
    fn from(whole: T) -> Self {
        Self { whole, half: false }
    }
}

impl<T: Ord> PartialOrd for HalfInteger<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for HalfInteger<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.whole.cmp(&other.whole).then(self.half.cmp(&other.half))
    }
}

macro_rules! midpoint_as_f64 {
    ($($t:ty),* $(,)?) => {
        $(
            #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
            impl Midpoint for $t {
                type Output = f64;

                #[inline]
                fn exact(&self) -> f64 {
                    *self as f64
                }

                #[inline]
                fn mean(&self, other: &Self) -> f64 {
                    (*self as f64 + *other as f64) / 2.0
                }
            }
        )*
    };
}

macro_rules! midpoint_as_half_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Midpoint for $t {
                type Output = HalfInteger<$t>;

                #[inline]
                fn exact(&self) -> HalfInteger<$t> {
                    HalfInteger::from(*self)
                }

                #[inline]
                fn mean(&self, other: &Self) -> HalfInteger<$t> {
                    let (a, b) = (*self, *other);
                    // Halve before adding so the sum cannot overflow.
                    HalfInteger {
                        whole: (a >> 1) + (b >> 1) + (a & b & 1),
                        half: (a ^ b) & 1 == 1,
                    }
                }
            }

            impl HalfInteger<$t> {
                /// Returns the nearest `f64`. Values above 2^53 may round.
                #[allow(clippy::cast_precision_loss)]
                #[must_use]
                pub fn to_f64(&self) -> f64 {
                    self.whole as f64 + if self.half { 0.5 } else { 0.0 }
                }
            }
        )*
    };
}

midpoint_as_f64!(i8, i16, i32, u8, u16, u32, f32, f64);
midpoint_as_half_integer!(i64, i128, isize, u64, u128, usize);
