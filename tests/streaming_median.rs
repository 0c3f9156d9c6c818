use ordstat::comparator::TotalOrder;
use ordstat::midpoint::HalfInteger;
use ordstat::{Error, StreamingMedian};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of values fed into each proptest case.
const TEST_SIZE: usize = 2_000;

fn sorted_median(values: &[i32]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        f64::from(sorted[n / 2])
    } else {
        (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn medians_after_each_insert() {
    let mut median = StreamingMedian::new();
    let mut reported = Vec::new();
    for value in [5, 2, 8] {
        median.insert(value);
        reported.push(median.median().unwrap());
    }
    assert_eq!(reported, [5.0, 3.5, 5.0]);
}

#[test]
fn duplicates_average_central_pair() {
    let median: StreamingMedian<i32> = [1, 1, 2, 3].into_iter().collect();
    assert_eq!(median.median(), Ok(1.5));
    assert_eq!(median.len(), 4);
}

#[test]
fn empty_tracker_reports_empty_state() {
    let median: StreamingMedian<i32> = StreamingMedian::new();
    assert!(median.is_empty());
    assert_eq!(median.median(), Err(Error::EmptyState));
}

#[test]
fn negative_values_and_floats() {
    let mut median = StreamingMedian::with_comparator(TotalOrder);
    median.extend([-1.5_f64, -0.5, -3.0, 2.0]);
    assert_eq!(median.median(), Ok(-1.0));
    assert_eq!(median.peek_lower(), Some(&-1.5));
    assert_eq!(median.peek_upper(), Some(&-0.5));
}

#[test]
fn injected_comparator_decides_halves() {
    // Descending order: the "lower" half holds the larger numbers.
    let mut median = StreamingMedian::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    median.extend([10, 20, 30]);
    assert_eq!(median.peek_lower(), Some(&20));
    assert_eq!(median.lower_len(), 2);
    assert_eq!(median.upper_len(), 1);
}

#[test]
fn wide_integers_report_exact_medians() {
    let big = (1_i64 << 53) + 1;
    let mut median = StreamingMedian::new();
    median.insert(big);
    assert_eq!(median.median(), Ok(HalfInteger::from(big)));
    assert_eq!(median.median().unwrap().to_integer(), Some(big));

    median.insert(big + 2);
    assert_eq!(median.median().unwrap().to_integer(), Some(big + 1));

    let median: StreamingMedian<u64> = [u64::MAX, u64::MAX - 1].into_iter().collect();
    let mean = median.median().unwrap();
    assert_eq!((mean.whole(), mean.has_half()), (u64::MAX - 1, true));
}

// ─── Properties ──────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The halves stay balanced and partitioned after every insert.
    #[test]
    fn halves_stay_balanced(values in proptest::collection::vec(-1_000i32..1_000, 1..TEST_SIZE)) {
        let mut median = StreamingMedian::new();
        for value in values {
            median.insert(value);
            prop_assert!(median.lower_len() >= median.upper_len());
            prop_assert!(median.lower_len() - median.upper_len() <= 1);
            if let (Some(low), Some(high)) = (median.peek_lower(), median.peek_upper()) {
                prop_assert!(low <= high, "lower max {} above upper min {}", low, high);
            }
        }
    }

    /// The running median equals the median of the fully sorted prefix.
    #[test]
    fn median_matches_sort(values in proptest::collection::vec(any::<i32>(), 1..300)) {
        let mut median = StreamingMedian::new();
        for (i, &value) in values.iter().enumerate() {
            median.insert(value);
            prop_assert_eq!(median.median(), Ok(sorted_median(&values[..=i])));
        }
    }

    /// Querying does not disturb state.
    #[test]
    fn repeated_queries_agree(values in proptest::collection::vec(-50i32..50, 1..100)) {
        let median: StreamingMedian<i32> = values.into_iter().collect();
        let first = median.median();
        prop_assert_eq!(median.median(), first);
        prop_assert_eq!(median.median(), first);
    }

    /// Wide integers keep the central value exact far above 2^53.
    #[test]
    fn wide_median_is_exact(offsets in proptest::collection::vec(0i64..1_000, 1..200)) {
        let base = 1_i64 << 60;
        let values: Vec<i64> = offsets.iter().map(|offset| base + offset).collect();
        let median: StreamingMedian<i64> = values.iter().copied().collect();

        let mut sorted = values;
        sorted.sort_unstable();
        let n = sorted.len();
        let reported = median.median().unwrap();
        if n % 2 == 1 {
            prop_assert_eq!(reported.to_integer(), Some(sorted[n / 2]));
        } else {
            let sum = i128::from(sorted[n / 2 - 1]) + i128::from(sorted[n / 2]);
            prop_assert_eq!(i128::from(reported.whole()), sum.div_euclid(2));
            prop_assert_eq!(reported.has_half(), sum % 2 == 1);
        }
    }
}
