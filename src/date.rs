use chrono::NaiveDate;

/// Raw day offset between `date` and `start_date`, equivalent to
/// `floor((date - start_date) / 1 day)` for dates normalized to midnight.
/// Negative or out-of-horizon results are not rejected here — bounds
/// checking against the configured horizon is the caller's job (see
/// `store::BitMatrixStore` and `ConnectionIndex::day_index`), since this
/// function has no notion of what horizon is in effect.
pub fn day_offset(date: NaiveDate, start_date: NaiveDate) -> i64 {
    (date - start_date).num_days()
}
