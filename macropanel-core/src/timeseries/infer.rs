use chrono::NaiveDate;

use crate::Frequency;

/// Estimate a representative step (in days) from positive adjacent date
/// deltas.
///
/// Prefer the mode (most frequent positive delta); if there is no unique mode,
/// return the lower median.
///
/// Unique mode (a month of 31 days dominates):
///
/// ```
/// use chrono::NaiveDate;
/// use macropanel_core::estimate_step_days;
///
/// let d = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
/// // Deltas: 31,29,31,30,31 => unique mode is 31
/// assert_eq!(estimate_step_days(&[d(1), d(2), d(3), d(4), d(5), d(6)]), Some(31));
/// ```
///
/// No unique mode: fall back to lower median:
///
/// ```
/// use chrono::NaiveDate;
/// use macropanel_core::estimate_step_days;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2021, m, day).unwrap();
/// // Deltas: 7,7,14,14 => lower median is 7
/// let dates = [d(1, 4), d(1, 11), d(1, 18), d(2, 1), d(2, 15)];
/// assert_eq!(estimate_step_days(&dates), Some(7));
/// ```
///
/// The input order does not matter; duplicates are ignored. Returns `None` if
/// fewer than two distinct dates are present.
#[must_use]
pub fn estimate_step_days(dates: &[NaiveDate]) -> Option<i64> {
    if dates.len() < 2 {
        return None;
    }
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();

    let mut deltas: Vec<i64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|&d| d > 0)
        .collect();
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta = deltas[0];
    let mut best_count = 0usize;
    let mut num_best_candidates = 0usize;

    let mut cur_delta = deltas[0];
    let mut cur_count = 1usize;
    for &d in deltas.iter().skip(1) {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        if cur_count > best_count {
            best_count = cur_count;
            best_delta = cur_delta;
            num_best_candidates = 1;
        } else if cur_count == best_count {
            num_best_candidates = num_best_candidates.saturating_add(1);
        }
        cur_delta = d;
        cur_count = 1;
    }
    if cur_count > best_count {
        best_delta = cur_delta;
        num_best_candidates = 1;
    } else if cur_count == best_count {
        num_best_candidates = num_best_candidates.saturating_add(1);
    }

    if num_best_candidates == 1 {
        return Some(best_delta);
    }

    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

/// Map a typical step in days onto the closest calendar frequency.
///
/// Business-day series (steps of 1 to 3 days) classify as daily.
#[must_use]
pub const fn classify_step(days: i64) -> Frequency {
    match days {
        i64::MIN..=3 => Frequency::Daily,
        4..=10 => Frequency::Weekly,
        11..=45 => Frequency::Monthly,
        46..=135 => Frequency::Quarterly,
        _ => Frequency::Yearly,
    }
}

/// Infer the sampling frequency of a date sequence from its typical step.
///
/// Returns `None` when fewer than two distinct dates are present.
#[must_use]
pub fn infer_frequency(dates: &[NaiveDate]) -> Option<Frequency> {
    estimate_step_days(dates).map(classify_step)
}

/// True when a series sampled at `native` must be upsampled to reach `target`.
#[must_use]
pub fn is_coarser(native: Frequency, target: Frequency) -> bool {
    native > target
}
