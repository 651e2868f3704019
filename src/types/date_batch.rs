//! Splits an overall date range into consecutive sub-ranges short enough for
//! the ERDDAP server, which refuses single requests spanning more than roughly
//! nine years.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One bounded time-range sub-request within the overall desired range.
///
/// Batches are produced by [`partition_batches`] in ascending chronological
/// order; `index` is the ordinal position within that partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBatch {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Partitions `[start, end]` (inclusive) into consecutive, non-overlapping
/// [`DateBatch`] entries, each spanning at most `max_span_years` calendar
/// years, covering the full range with no gaps.
///
/// Each batch ends at `min(batch_start + max_span_years - 1 day, end)`, so a
/// range of exactly `max_span_years` yields a single batch.
///
/// `start` must not be after `end` and `max_span_years` must be at least 1;
/// both are enforced by the caller ([`crate::Oisst::fetch_all`]).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use oisst::partition_batches;
///
/// let batches = partition_batches(
///     NaiveDate::from_ymd_opt(1982, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(1998, 12, 31).unwrap(),
///     9,
/// );
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[0].end, NaiveDate::from_ymd_opt(1990, 12, 31).unwrap());
/// assert_eq!(batches[1].start, NaiveDate::from_ymd_opt(1991, 1, 1).unwrap());
/// ```
pub fn partition_batches(start: NaiveDate, end: NaiveDate, max_span_years: u32) -> Vec<DateBatch> {
    let mut batches = Vec::new();
    let mut cursor = start;
    let mut index = 0;

    while cursor <= end {
        let batch_end = cursor
            .checked_add_months(Months::new(max_span_years.saturating_mul(12)))
            .and_then(|next_start| next_start.pred_opt())
            .map_or(end, |span_end| span_end.min(end));

        batches.push(DateBatch {
            index,
            start: cursor,
            end: batch_end,
        });

        if batch_end >= end {
            break;
        }
        cursor = match batch_end.succ_opt() {
            Some(next) => next,
            None => break,
        };
        index += 1;
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_partition_properties(
        batches: &[DateBatch],
        start: NaiveDate,
        end: NaiveDate,
        max_span_years: u32,
    ) {
        assert!(!batches.is_empty());
        assert_eq!(batches.first().unwrap().start, start);
        assert_eq!(batches.last().unwrap().end, end);

        for (i, batch) in batches.iter().enumerate() {
            assert_eq!(batch.index, i);
            assert!(batch.start <= batch.end);
            // Span stays within the server limit: the batch must end before
            // its start shifted forward by max_span_years.
            let limit = batch
                .start
                .checked_add_months(Months::new(max_span_years * 12))
                .unwrap();
            assert!(batch.end < limit, "batch {i} spans more than the limit");
        }

        // Contiguous coverage: each batch picks up the day after the previous.
        for pair in batches.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
    }

    #[test]
    fn splits_seventeen_years_into_two_batches() {
        let start = date(1982, 1, 1);
        let end = date(1998, 12, 31);
        let batches = partition_batches(start, end, 9);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].start, date(1982, 1, 1));
        assert_eq!(batches[0].end, date(1990, 12, 31));
        assert_eq!(batches[1].start, date(1991, 1, 1));
        assert_eq!(batches[1].end, date(1998, 12, 31));
        assert_partition_properties(&batches, start, end, 9);
    }

    #[test]
    fn range_of_exactly_max_span_is_one_batch() {
        let start = date(1982, 1, 1);
        let end = date(1990, 12, 31);
        let batches = partition_batches(start, end, 9);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].start, start);
        assert_eq!(batches[0].end, end);
    }

    #[test]
    fn one_day_over_max_span_starts_a_second_batch() {
        let start = date(1982, 1, 1);
        let end = date(1991, 1, 1);
        let batches = partition_batches(start, end, 9);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].start, date(1991, 1, 1));
        assert_eq!(batches[1].end, date(1991, 1, 1));
        assert_partition_properties(&batches, start, end, 9);
    }

    #[test]
    fn single_day_range_is_one_batch() {
        let day = date(2000, 6, 15);
        let batches = partition_batches(day, day, 9);
        assert_eq!(
            batches,
            vec![DateBatch {
                index: 0,
                start: day,
                end: day
            }]
        );
    }

    #[test]
    fn long_range_stays_contiguous() {
        let start = date(1982, 1, 1);
        let end = date(2023, 12, 31);
        let batches = partition_batches(start, end, 9);

        // 42 years at 9 years per batch.
        assert_eq!(batches.len(), 5);
        assert_partition_properties(&batches, start, end, 9);
    }

    #[test]
    fn yearly_batches_align_with_calendar_years() {
        let start = date(2000, 1, 1);
        let end = date(2004, 12, 31);
        let batches = partition_batches(start, end, 1);

        assert_eq!(batches.len(), 5);
        for batch in &batches {
            assert_eq!(batch.start.month(), 1);
            assert_eq!(batch.end.month(), 12);
            assert_eq!(batch.start.year(), batch.end.year());
        }
        assert_partition_properties(&batches, start, end, 1);
    }

    #[test]
    fn mid_year_start_keeps_offsets() {
        let start = date(1985, 6, 10);
        let end = date(2001, 2, 3);
        let batches = partition_batches(start, end, 9);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].end, date(1994, 6, 9));
        assert_eq!(batches[1].start, date(1994, 6, 10));
        assert_partition_properties(&batches, start, end, 9);
    }
}
