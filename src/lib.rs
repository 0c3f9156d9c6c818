//! Order statistics over changing collections.
//!
//! This crate answers "what is the value at rank r?" cheaply after every
//! mutation of a multiset. Three containers cover three mutation patterns:
//!
//! - [`StreamingMedian`] - append-only stream, O(log n) insert, O(1) median.
//! - [`SlidingWindow`] - the most recent `k` values, O(log k) insert, evict
//!   and select-by-rank.
//! - [`KWayMerge`] - several ascending sources merged lazily, O(log k) per
//!   emitted value with memory bounded by the number of sources.
//!
//! [`KthLargest`] additionally tracks the `k`th largest value of a stream.
//!
//! # Example
//!
//! ```
//! use ordstat::{KWayMerge, SlidingWindow, StreamingMedian};
//!
//! let mut stream = StreamingMedian::new();
//! for value in [1, 1, 2, 3] {
//!     stream.insert(value);
//! }
//! assert_eq!(stream.median(), Ok(1.5));
//!
//! let mut window = SlidingWindow::new(2).unwrap();
//! assert_eq!(window.push(4), None);
//! assert_eq!(window.push(8), Some(6.0));
//!
//! let rows = [vec![1, 5, 9], vec![2, 6], vec![3]];
//! let merged: Vec<_> = KWayMerge::new(rows.iter().map(|row| row.iter().copied().peekable()))
//!     .map(|(value, _source)| value)
//!     .collect();
//! assert_eq!(merged, [1, 2, 3, 5, 6, 9]);
//! ```
//!
//! # Ordering
//!
//! Every container orders its values through an injected
//! [`Compare`](comparator::Compare) implementation from the `compare`
//! crate. `new` constructors use [`Natural`](comparator::Natural) for [`Ord`]
//! types; floats use [`TotalOrder`](comparator::TotalOrder) via
//! `with_comparator`, and closures work as they are.
//!
//! # Median types
//!
//! Narrow integers and floats report medians as `f64`. 64 and 128-bit
//! integers report a [`HalfInteger`](midpoint::HalfInteger) so values above
//! 2^53 come back exactly.
//!
//! # Concurrency
//!
//! Containers are plain single-owner values. Wrap one in a mutex if several
//! threads must share it.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod comparator;
pub mod kth_largest;
pub mod kway_merge;
pub mod midpoint;
pub mod sliding_window;
pub mod streaming_median;

pub use error::{Error, Result};
pub use kth_largest::KthLargest;
pub use kway_merge::KWayMerge;
pub use midpoint::Midpoint;
pub use order_statistic::Rank;
pub use sliding_window::SlidingWindow;
pub use streaming_median::StreamingMedian;
