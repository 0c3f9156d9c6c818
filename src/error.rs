use thiserror::Error;

/// Errors reported by the order-statistic containers.
///
/// Bookkeeping failures inside a container (for example an evicted window
/// value that cannot be found) are defects rather than errors and panic
/// instead of being reported here.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A query was issued before any value was inserted.
    #[error("no values have been inserted")]
    EmptyState,
    /// A constructor parameter was outside its valid range.
    #[error("`{parameter}` must be at least 1, got {value}")]
    InvalidConfig {
        /// The name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: usize,
    },
    /// A rank beyond the available values was requested.
    #[error("requested value #{requested} but only {available} are available")]
    OutOfRange {
        /// The one-based position that was requested.
        requested: usize,
        /// How many values could actually be produced.
        available: usize,
    },
}

/// A specialized [`Result`](core::result::Result) for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
