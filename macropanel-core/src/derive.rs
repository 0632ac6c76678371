//! Derived features: percentage changes and calendar attributes.

use crate::panel::{CalendarColumns, ChangeColumns, DerivedFeatures, Panel};
use crate::timeseries::util::pct_change;
use crate::{Frequency, PanelError};

/// Return a copy of `panel` with percentage changes and calendar attributes.
///
/// For each dataset column, `pct_change` compares each row with the previous
/// row and `pct_change_yoy` with the row `periods_per_year` rows earlier. A
/// change is null when either value is null or the earlier value is zero.
/// Calendar attributes are computed from the last day of each period, except
/// that weekly panels pair the ISO week with its ISO year.
///
/// Existing columns are never changed.
///
/// # Errors
/// Returns `PanelError::InvalidArg` if `periods_per_year` is zero.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "macropanel_core::add_derived",
        skip(panel),
        fields(rows = panel.len()),
    )
)]
pub fn add_derived(panel: &Panel, periods_per_year: u32) -> Result<Panel, PanelError> {
    if periods_per_year == 0 {
        return Err(PanelError::invalid_arg("periods_per_year must be positive"));
    }
    let lag = usize::try_from(periods_per_year)
        .map_err(|_| PanelError::invalid_arg("periods_per_year out of range"))?;

    let changes = panel
        .columns()
        .iter()
        .map(|c| {
            let v = &c.values;
            ChangeColumns {
                dataset: c.name.clone(),
                pct_change: (0..v.len())
                    .map(|i| i.checked_sub(1).and_then(|j| pct_change(v[j], v[i])))
                    .collect(),
                pct_change_yoy: (0..v.len())
                    .map(|i| i.checked_sub(lag).and_then(|j| pct_change(v[j], v[i])))
                    .collect(),
            }
        })
        .collect();

    let freq = panel.frequency();
    let mut calendar = CalendarColumns::default();
    for &date in panel.index() {
        let end = freq.period_end(date).unwrap_or(date);
        let year = match freq {
            Frequency::Weekly => chrono::Datelike::iso_week(&date).year(),
            _ => chrono::Datelike::year(&end),
        };
        calendar.year.push(year);
        calendar.period.push(freq.period_in_year(date));
        calendar.quarter.push(Frequency::Quarterly.period_in_year(end));
        calendar.month.push(chrono::Datelike::month(&end));
        calendar
            .is_quarter_end
            .push(Frequency::Quarterly.period_end(end) == Some(end));
        calendar
            .is_month_end
            .push(Frequency::Monthly.period_end(end) == Some(end));
    }

    Ok(panel.clone().with_derived(DerivedFeatures {
        periods_per_year,
        changes,
        calendar,
    }))
}
