use chrono::{Datelike, NaiveDate, Weekday};
use macropanel_types::{Aggregation, Frequency};
use proptest::prelude::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn period_starts() {
    let x = d(2020, 5, 17); // a Sunday
    assert_eq!(Frequency::Daily.period_start(x), x);
    assert_eq!(Frequency::Weekly.period_start(x), d(2020, 5, 11));
    assert_eq!(Frequency::Monthly.period_start(x), d(2020, 5, 1));
    assert_eq!(Frequency::Quarterly.period_start(x), d(2020, 4, 1));
    assert_eq!(Frequency::Yearly.period_start(x), d(2020, 1, 1));
}

#[test]
fn period_ends_and_position_in_year() {
    assert_eq!(Frequency::Monthly.period_end(d(2020, 2, 10)), Some(d(2020, 2, 29)));
    assert_eq!(Frequency::Quarterly.period_end(d(2020, 11, 3)), Some(d(2020, 12, 31)));
    assert_eq!(Frequency::Quarterly.period_in_year(d(2020, 11, 3)), 4);
    assert_eq!(Frequency::Monthly.period_in_year(d(2020, 11, 3)), 11);
    assert_eq!(Frequency::Yearly.period_in_year(d(2020, 11, 3)), 1);
}

#[test]
fn range_is_complete_and_snapped() {
    let r = Frequency::Monthly.range(d(2019, 11, 20), d(2020, 2, 3));
    assert_eq!(r, vec![d(2019, 11, 1), d(2019, 12, 1), d(2020, 1, 1), d(2020, 2, 1)]);
    assert!(Frequency::Monthly.range(d(2020, 2, 1), d(2019, 2, 1)).is_empty());
}

#[test]
fn parses_portal_codes() {
    assert_eq!("M".parse::<Frequency>().unwrap(), Frequency::Monthly);
    assert_eq!("a".parse::<Frequency>().unwrap(), Frequency::Yearly);
    assert_eq!("quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
    assert!("fortnightly".parse::<Frequency>().is_err());
    assert_eq!("avg".parse::<Aggregation>().unwrap(), Aggregation::Mean);
    assert!("median".parse::<Aggregation>().is_err());
}

#[test]
fn ordering_is_finest_first() {
    assert!(Frequency::Daily < Frequency::Monthly);
    assert!(Frequency::Quarterly < Frequency::Yearly);
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (-200_000i32..900_000i32).prop_map(|n| NaiveDate::from_num_days_from_ce_opt(n).unwrap())
}

fn arb_freq() -> impl Strategy<Value = Frequency> {
    prop::sample::select(Frequency::ALL.to_vec())
}

proptest! {
    #[test]
    fn ordinal_roundtrips_through_period_start(date in arb_date(), f in arb_freq()) {
        let start = f.period_start(date);
        prop_assert!(start <= date);
        prop_assert_eq!(f.ordinal(start), f.ordinal(date));
        prop_assert_eq!(f.from_ordinal(f.ordinal(date)), Some(start));
        if f == Frequency::Weekly {
            prop_assert_eq!(start.weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn next_period_is_one_ordinal_later(date in arb_date(), f in arb_freq()) {
        let next = f.next_period(date).unwrap();
        prop_assert!(next > date);
        prop_assert_eq!(f.periods_between(date, next), 1);
        prop_assert!(f.is_period_start(next));
        let end = f.period_end(date).unwrap();
        prop_assert_eq!(f.ordinal(end), f.ordinal(date));
    }
}
