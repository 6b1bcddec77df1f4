use std::cmp::Ordering;

use crate::domain::Dated;

/// Result of an ordered search, decoded from the raw signed encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// `series[idx]` compares equal to the key.
    Exact(usize),
    /// No exact match; the key would be inserted at this index.
    Insert(usize),
}

impl Location {
    /// Decodes `locate`'s return value.
    pub fn from_raw(raw: isize) -> Self {
        if raw >= 0 {
            Location::Exact(raw as usize)
        } else {
            Location::Insert(raw.unsigned_abs() - 1)
        }
    }

    pub fn to_raw(self) -> isize {
        match self {
            Location::Exact(idx) => idx as isize,
            Location::Insert(idx) => -(idx as isize) - 1,
        }
    }

    /// First index whose element is at or after the key.
    /// Equal to `len` when the key sorts after every element.
    pub fn at_or_after(self) -> usize {
        match self {
            Location::Exact(idx) | Location::Insert(idx) => idx,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, Location::Exact(_))
    }
}

/// Binary search over an ascending series.
///
/// Returns the index of an exact match (the lowest one when the key repeats),
/// otherwise the negative one-based insertion index `-(insert + 1)`:
/// an empty series or a key before the first element yields `-1`, a key after
/// the last element yields `-(len + 1)`.
///
/// Does not allocate.
pub fn locate<T, K, F>(series: &[T], key: &K, mut compare: F) -> isize
where
    K: ?Sized,
    F: FnMut(&T, &K) -> Ordering,
{
    let mut lo = 0usize;
    let mut hi = series.len();

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match compare(&series[mid], key) {
            Ordering::Less => lo = mid + 1,
            Ordering::Equal | Ordering::Greater => hi = mid,
        }
    }

    if lo < series.len() && compare(&series[lo], key) == Ordering::Equal {
        lo as isize
    } else {
        -(lo as isize) - 1
    }
}

/// `locate` specialised to date-keyed series.
pub fn locate_date<T: Dated>(series: &[T], date: &str) -> Location {
    Location::from_raw(locate(series, date, |item, key| item.date().cmp(key)))
}

/// Index of the exact sample for `date`, if present.
pub fn find_exact<T: Dated>(series: &[T], date: &str) -> Option<usize> {
    match locate_date(series, date) {
        Location::Exact(idx) => Some(idx),
        Location::Insert(_) => None,
    }
}

/// First index on or after `date`. `series.len()` when `date` is past the end.
pub fn window_start<T: Dated>(series: &[T], date: &str) -> usize {
    locate_date(series, date).at_or_after()
}
