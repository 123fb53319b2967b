//! Shared (segment, date) axis labels with position lookup.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::GridError;

/// The fixed axis labels of a grid: segment ids and calendar dates.
///
/// Segment ids must be unique; dates must be strictly ascending. Once
/// constructed the labels never change, so every grid sharing an `Axes`
/// value is positionally comparable cell-for-cell.
#[derive(Debug, Clone)]
pub struct Axes {
    seg_ids: Vec<i64>,
    dates: Vec<NaiveDate>,
    seg_index: HashMap<i64, usize>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PartialEq for Axes {
    fn eq(&self, other: &Self) -> bool {
        self.seg_ids == other.seg_ids && self.dates == other.dates
    }
}

impl Axes {
    /// Creates a new `Axes` after validating the labels.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateSegment`] if a segment id repeats, or
    /// [`GridError::DatesNotAscending`] if the date sequence is not
    /// strictly increasing.
    pub fn new(seg_ids: Vec<i64>, dates: Vec<NaiveDate>) -> Result<Self, GridError> {
        let mut seg_index = HashMap::with_capacity(seg_ids.len());
        for (pos, &id) in seg_ids.iter().enumerate() {
            if seg_index.insert(id, pos).is_some() {
                return Err(GridError::DuplicateSegment { seg_id: id });
            }
        }

        for (pos, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(GridError::DatesNotAscending { position: pos + 1 });
            }
        }
        let date_index = dates.iter().enumerate().map(|(pos, &d)| (d, pos)).collect();

        Ok(Self {
            seg_ids,
            dates,
            seg_index,
            date_index,
        })
    }

    /// Returns the segment ids in axis order.
    pub fn seg_ids(&self) -> &[i64] {
        &self.seg_ids
    }

    /// Returns the dates in axis order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Returns the number of segments.
    pub fn n_segs(&self) -> usize {
        self.seg_ids.len()
    }

    /// Returns the number of dates.
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Returns `(n_segs, n_dates)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.seg_ids.len(), self.dates.len())
    }

    /// Returns the axis position of a segment id, if present.
    pub fn seg_pos(&self, seg_id: i64) -> Option<usize> {
        self.seg_index.get(&seg_id).copied()
    }

    /// Returns the axis position of a date, if present.
    pub fn date_pos(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Returns the earliest date on the axis, if any.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Returns the latest date on the axis, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
