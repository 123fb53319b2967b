//! Train/test partitioning along the date axis.

use std::ops::Range;

use chrono::{Months, NaiveDate};

use crate::error::PrepError;

/// Index ranges of the train and test partitions along a date axis.
///
/// Train covers every date strictly before the test start; test covers
/// the configured number of calendar years from the test start, clipped
/// to the end of the data. Dates after the test window are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSplit {
    /// Training index range.
    pub trn: Range<usize>,
    /// Test index range.
    pub tst: Range<usize>,
}

impl DateSplit {
    /// Number of training dates.
    pub fn n_trn(&self) -> usize {
        self.trn.len()
    }

    /// Number of test dates.
    pub fn n_tst(&self) -> usize {
        self.tst.len()
    }
}

/// Partitions an ascending date axis at `test_start`.
///
/// # Errors
///
/// Returns [`PrepError::Config`] if the axis is empty, `test_start` lies
/// outside the data range, the test window cannot be computed, or either
/// partition comes out empty.
pub fn split_dates(
    dates: &[NaiveDate],
    test_start: NaiveDate,
    n_test_years: u32,
) -> Result<DateSplit, PrepError> {
    let (first, last) = match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(PrepError::Config {
                reason: "date axis is empty".to_string(),
            });
        }
    };

    if test_start < first || test_start > last {
        return Err(PrepError::Config {
            reason: format!(
                "test start {test_start} outside data range {first} to {last}"
            ),
        });
    }

    let test_end = test_start
        .checked_add_months(Months::new(12 * n_test_years))
        .ok_or_else(|| PrepError::Config {
            reason: format!("test window of {n_test_years} years overflows the calendar"),
        })?;

    let boundary = dates.partition_point(|d| *d < test_start);
    let end = dates.partition_point(|d| *d < test_end);

    let split = DateSplit {
        trn: 0..boundary,
        tst: boundary..end,
    };

    if split.n_trn() == 0 {
        return Err(PrepError::Config {
            reason: format!("no dates before test start {test_start}"),
        });
    }
    if split.n_tst() == 0 {
        return Err(PrepError::Config {
            reason: format!("no dates in test window starting {test_start}"),
        });
    }

    Ok(split)
}
