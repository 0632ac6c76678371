use chrono::{Days, NaiveDate};
use macropanel_core::timeseries::infer::{estimate_step_days, infer_frequency};
use macropanel_core::Frequency;
use proptest::prelude::*;

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap() + Days::new(n as u64)
}

proptest! {
    #[test]
    fn constant_step_with_noise(step_idx in 0usize..3, n in 5usize..100, rev in any::<bool>(), kinds in proptest::collection::vec(0u8..=3, 4..100)) {
        let steps = [1i64, 7, 91];
        let step = steps[step_idx];

        // A small bounded amount of noise (duplicates, short and long steps).
        let deltas = kinds.len().min(n.saturating_sub(1));
        let mut noise_budget: usize = (deltas / 5).min(3);
        let mut dates = vec![day(0)];
        let mut cur = 0i64;
        for &k in kinds.iter().take(n.saturating_sub(1)) {
            let delta = if noise_budget == 0 || k == 0 { step } else {
                noise_budget -= 1;
                match k {
                    1 => 0,
                    2 => step * 2,
                    _ => step + 1,
                }
            };
            cur += delta;
            dates.push(day(cur));
        }
        if rev {
            dates.reverse();
        }
        prop_assert_eq!(estimate_step_days(&dates), Some(step));
    }

    #[test]
    fn calendar_cadences_classify(start in 0i64..4000, n in 3usize..40) {
        for freq in [Frequency::Weekly, Frequency::Monthly, Frequency::Quarterly, Frequency::Yearly] {
            let first = freq.period_start(day(start));
            let mut dates = vec![first];
            for _ in 1..n {
                let next = freq.next_period(*dates.last().unwrap()).unwrap();
                dates.push(next);
            }
            prop_assert_eq!(infer_frequency(&dates), Some(freq));
        }
    }
}

#[test]
fn too_few_dates() {
    assert_eq!(estimate_step_days(&[]), None);
    assert_eq!(estimate_step_days(&[day(0)]), None);
    assert_eq!(estimate_step_days(&[day(0), day(0)]), None);
}

#[test]
fn business_days_are_daily() {
    // Mon..Fri for three weeks.
    let dates: Vec<NaiveDate> = (0..21).filter(|i| i % 7 < 5).map(day).collect();
    assert_eq!(infer_frequency(&dates), Some(Frequency::Daily));
}
