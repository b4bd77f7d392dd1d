//! Billable-hours arithmetic.
//!
//! All arithmetic is exact decimal: invoice amounts are never rounded, so
//! `amount == total_hours * hourly_rate` holds bit-for-bit. Only durations
//! measured from timestamps are rounded (to hundredths of an hour).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept when converting a measured duration into hours.
pub const HOURS_SCALE: u32 = 2;

const SECONDS_PER_HOUR: i64 = 3600;

/// The derived totals of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursTotals {
    /// Sum of the tracked hours.
    pub total_hours: Decimal,
    /// `total_hours * hourly_rate`.
    pub amount: Decimal,
}

impl HoursTotals {
    /// Sum `hours` and price the sum at `hourly_rate`.
    ///
    /// Returns `None` if the sum or the product overflows `Decimal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ledgerline_core::HoursTotals;
    /// use rust_decimal::Decimal;
    ///
    /// let totals = HoursTotals::compute(
    ///     [Decimal::new(15, 1), Decimal::new(225, 2)],
    ///     Decimal::new(80, 0),
    /// )
    /// .unwrap();
    /// assert_eq!(totals.total_hours, Decimal::new(375, 2));
    /// assert_eq!(totals.amount, Decimal::new(300, 0));
    /// ```
    #[must_use]
    pub fn compute<I>(hours: I, hourly_rate: Decimal) -> Option<Self>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let total_hours = checked_sum(hours)?;
        Some(Self {
            total_hours,
            amount: total_hours.checked_mul(hourly_rate)?,
        })
    }
}

/// Sum decimals, returning `None` on overflow.
#[must_use]
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Hours elapsed between two instants, rounded half away from zero to
/// [`HOURS_SCALE`] places. Returns `None` if `end` precedes `start`.
#[must_use]
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Decimal> {
    let elapsed = end.signed_duration_since(start);
    if elapsed < chrono::TimeDelta::zero() {
        return None;
    }

    let millis = Decimal::from(elapsed.num_milliseconds());
    let hours = millis / Decimal::from(SECONDS_PER_HOUR * 1000);
    Some(hours.round_dp_with_strategy(HOURS_SCALE, RoundingStrategy::MidpointAwayFromZero))
}
