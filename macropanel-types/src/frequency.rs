//! Sampling frequencies, their calendar arithmetic, and aggregation functions.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::PanelError;

/// Sampling frequency of a series or of a merged panel.
///
/// Every period is keyed by its first calendar day: weeks start on Monday,
/// months on the 1st, quarters on January/April/July/October 1st, years on
/// January 1st. Variants are ordered from finest to coarsest, so `a < b`
/// reads as "a is finer than b".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One period per calendar day.
    Daily,
    /// Monday-start weeks.
    Weekly,
    /// Calendar months.
    Monthly,
    /// Calendar quarters.
    Quarterly,
    /// Calendar years.
    Yearly,
}

impl Frequency {
    /// All frequencies from finest to coarsest.
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    /// Lowercase label used in column metadata and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Conventional number of periods per year, used as the year-over-year lag.
    #[must_use]
    pub const fn periods_per_year(self) -> u32 {
        match self {
            Self::Daily => 365,
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 1,
        }
    }

    /// Ordinal of the period containing `date`.
    ///
    /// Consecutive periods have consecutive ordinals, which turns contiguity
    /// checks into integer arithmetic.
    #[must_use]
    pub fn ordinal(self, date: NaiveDate) -> i64 {
        let year = i64::from(date.year());
        let month0 = i64::from(date.month0());
        match self {
            Self::Daily => i64::from(date.num_days_from_ce()),
            // 0001-01-01 (day 1 from CE) is a Monday.
            Self::Weekly => (i64::from(date.num_days_from_ce()) - 1).div_euclid(7),
            Self::Monthly => year * 12 + month0,
            Self::Quarterly => year * 4 + month0 / 3,
            Self::Yearly => year,
        }
    }

    /// First day of the period with the given ordinal, if representable.
    #[must_use]
    pub fn from_ordinal(self, ordinal: i64) -> Option<NaiveDate> {
        match self {
            Self::Daily => NaiveDate::from_num_days_from_ce_opt(i32::try_from(ordinal).ok()?),
            Self::Weekly => {
                let days = ordinal.checked_mul(7)?.checked_add(1)?;
                NaiveDate::from_num_days_from_ce_opt(i32::try_from(days).ok()?)
            }
            Self::Monthly => {
                let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
                let month = u32::try_from(ordinal.rem_euclid(12)).ok()? + 1;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            Self::Quarterly => {
                let year = i32::try_from(ordinal.div_euclid(4)).ok()?;
                let month = u32::try_from(ordinal.rem_euclid(4)).ok()? * 3 + 1;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            Self::Yearly => NaiveDate::from_ymd_opt(i32::try_from(ordinal).ok()?, 1, 1),
        }
    }

    /// First day of the period containing `date`.
    #[must_use]
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        self.from_ordinal(self.ordinal(date)).unwrap_or(date)
    }

    /// True when `date` is the first day of its period.
    #[must_use]
    pub fn is_period_start(self, date: NaiveDate) -> bool {
        self.period_start(date) == date
    }

    /// First day of the period following the one containing `date`.
    #[must_use]
    pub fn next_period(self, date: NaiveDate) -> Option<NaiveDate> {
        self.from_ordinal(self.ordinal(date).checked_add(1)?)
    }

    /// Last day of the period containing `date`.
    #[must_use]
    pub fn period_end(self, date: NaiveDate) -> Option<NaiveDate> {
        self.next_period(date)?.checked_sub_days(Days::new(1))
    }

    /// Signed number of periods from the period of `from` to the period of `to`.
    #[must_use]
    pub fn periods_between(self, from: NaiveDate, to: NaiveDate) -> i64 {
        self.ordinal(to) - self.ordinal(from)
    }

    /// Position of the period within its year: day of year, ISO week, month,
    /// quarter, or 1 for yearly data.
    #[must_use]
    pub fn period_in_year(self, date: NaiveDate) -> u32 {
        match self {
            Self::Daily => date.ordinal(),
            Self::Weekly => date.iso_week().week(),
            Self::Monthly => date.month(),
            Self::Quarterly => date.month0() / 3 + 1,
            Self::Yearly => 1,
        }
    }

    /// Complete sequence of period starts covering `[start, end]`.
    ///
    /// Both bounds are snapped to their period start; an inverted range yields
    /// an empty vector.
    #[must_use]
    pub fn range(self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let (lo, hi) = (self.ordinal(start), self.ordinal(end));
        if hi < lo {
            return Vec::new();
        }
        (lo..=hi).filter_map(|o| self.from_ordinal(o)).collect()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = PanelError;

    /// Accepts full names as well as the single-letter codes used by
    /// statistics portals (`D`, `W`, `M`, `Q`, `Y`/`A`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "daily" => Ok(Self::Daily),
            "w" | "weekly" => Ok(Self::Weekly),
            "m" | "monthly" => Ok(Self::Monthly),
            "q" | "quarterly" => Ok(Self::Quarterly),
            "y" | "a" | "yearly" | "annual" => Ok(Self::Yearly),
            other => Err(PanelError::invalid_arg(format!(
                "unknown frequency '{other}'"
            ))),
        }
    }
}

/// Function folding the observations of one target period into a single value.
///
/// There is deliberately no `Default`: the right choice depends on what the
/// indicator measures (average a rate, sum a flow, take the last stock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean; rates and indices.
    Mean,
    /// Sum; flow quantities.
    Sum,
    /// Latest observation in the period; end-of-period stocks.
    Last,
    /// Earliest observation in the period.
    First,
    /// Maximum.
    Max,
    /// Minimum.
    Min,
}

impl Aggregation {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Last => "last",
            Self::First => "first",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "last" => Ok(Self::Last),
            "first" => Ok(Self::First),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(PanelError::invalid_arg(format!(
                "unknown aggregation '{other}'"
            ))),
        }
    }
}
