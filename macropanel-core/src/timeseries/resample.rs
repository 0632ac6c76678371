use chrono::NaiveDate;

use crate::series::{CanonicalSeries, Observation, Origin, ResampledPoint, ResampledSeries};
use crate::timeseries::infer::is_coarser;
use crate::{Aggregation, Frequency};

/// Running fold of the non-missing values of one bucket.
struct BucketAgg {
    first: f64,
    last: f64,
    sum: f64,
    max: f64,
    min: f64,
    count: usize,
}

impl BucketAgg {
    const fn new(v: f64) -> Self {
        Self {
            first: v,
            last: v,
            sum: v,
            max: v,
            min: v,
            count: 1,
        }
    }

    fn push(&mut self, v: f64) {
        self.last = v;
        self.sum += v;
        self.max = self.max.max(v);
        self.min = self.min.min(v);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, agg: Aggregation) -> f64 {
        match agg {
            Aggregation::Mean => self.sum / self.count as f64,
            Aggregation::Sum => self.sum,
            Aggregation::Last => self.last,
            Aggregation::First => self.first,
            Aggregation::Max => self.max,
            Aggregation::Min => self.min,
        }
    }
}

/// One populated bucket: period ordinal plus folded value.
///
/// `value` is `None` when every observation in the bucket was an explicit
/// missing marker.
struct Bucket {
    ordinal: i64,
    value: Option<f64>,
    count: usize,
}

/// Group date-sorted observations by a bucket function and fold each bucket.
fn resample_by<F>(entries: &[Observation], agg: Aggregation, bucket_of: F) -> Vec<Bucket>
where
    F: Fn(NaiveDate) -> i64,
{
    let mut out: Vec<Bucket> = Vec::new();
    let mut iter = entries.iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let mut cur_bucket = bucket_of(first.date);
    let mut fold = first.value.map(BucketAgg::new);
    let finalize = |ordinal: i64, fold: Option<BucketAgg>| Bucket {
        ordinal,
        value: fold.as_ref().map(|f| f.finish(agg)),
        count: fold.as_ref().map_or(0, |f| f.count),
    };

    for obs in iter {
        let bucket = bucket_of(obs.date);
        if bucket == cur_bucket {
            if let Some(v) = obs.value {
                match fold.as_mut() {
                    Some(f) => f.push(v),
                    None => fold = Some(BucketAgg::new(v)),
                }
            }
        } else {
            out.push(finalize(cur_bucket, fold.take()));
            cur_bucket = bucket;
            fold = obs.value.map(BucketAgg::new);
        }
    }
    out.push(finalize(cur_bucket, fold));
    out
}

/// Re-express a canonical series at `target` frequency.
///
/// - Observations are grouped by the target period containing their date and
///   folded with `agg`; `Last`/`First` follow date order. The output date is
///   the period start.
/// - When the series is natively coarser than `target`, each observation also
///   covers the following empty periods, up to `max_fill_periods` periods in
///   total including its own (`0` behaves like `1`). Carried values are
///   marked [`Origin::Filled`]. An explicit missing observation stops the
///   carry.
/// - The output spans the first observed period to the last one, or to the
///   end of the last observation's native period for a coarser series; it is
///   never extended further.
///
/// ```
/// use chrono::NaiveDate;
/// use macropanel_core::{Aggregation, CanonicalSeries, Frequency, Observation, resample};
///
/// let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
/// let q = CanonicalSeries::from_observations(
///     "gdp",
///     Some(Frequency::Quarterly),
///     [Observation::new(d(2020, 1), Some(1.5))],
/// );
/// let m = resample(&q, Frequency::Monthly, Aggregation::Last, 2);
/// assert_eq!(m.value_at(d(2020, 1)), Some(1.5));
/// assert_eq!(m.value_at(d(2020, 2)), Some(1.5));
/// assert_eq!(m.value_at(d(2020, 3)), None);
/// ```
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "macropanel_core::resample",
        skip(series),
        fields(dataset = %series.name, target = %target, agg = %agg),
    )
)]
#[must_use]
pub fn resample(
    series: &CanonicalSeries,
    target: Frequency,
    agg: Aggregation,
    max_fill_periods: u32,
) -> ResampledSeries {
    let upsample = series
        .native_frequency
        .is_some_and(|native| is_coarser(native, target));
    let fill_span = max_fill_periods.max(1);

    #[cfg(feature = "tracing")]
    if series.native_frequency.is_none() && !series.is_empty() {
        tracing::warn!("native frequency unknown; resampling without forward fill");
    }

    let buckets = resample_by(&series.entries, agg, |d| target.ordinal(d));
    let mut points: Vec<ResampledPoint> = Vec::new();

    if let (Some(first), Some(last_bucket), Some(last_obs)) =
        (buckets.first(), buckets.last(), series.entries.last())
    {
        let lo = first.ordinal;
        let hi = match series.native_frequency {
            Some(native) if upsample => native
                .period_end(last_obs.date)
                .map_or(last_bucket.ordinal, |end| target.ordinal(end)),
            _ => last_bucket.ordinal,
        };

        let mut pending = buckets.iter().peekable();
        // Value being carried and the distance from its observation.
        let mut carry: Option<(f64, u32)> = None;
        for ord in lo..=hi {
            let Some(date) = target.from_ordinal(ord) else {
                continue;
            };
            let (value, origin) = match pending.next_if(|b| b.ordinal == ord) {
                Some(b) => {
                    carry = b.value.map(|v| (v, 0));
                    match b.value {
                        Some(v) => (Some(v), Origin::Observed { count: b.count }),
                        None => (None, Origin::Missing),
                    }
                }
                None => match carry {
                    Some((v, k)) if upsample && k + 1 < fill_span => {
                        carry = Some((v, k + 1));
                        (Some(v), Origin::Filled { offset: k + 1 })
                    }
                    _ => {
                        carry = None;
                        (None, Origin::Missing)
                    }
                },
            };
            points.push(ResampledPoint {
                date,
                value,
                origin,
            });
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        upsample,
        periods = points.len(),
        buckets = buckets.len(),
        "resampled"
    );

    ResampledSeries {
        name: series.name.clone(),
        frequency: target,
        aggregation: agg,
        fill_limit: upsample.then_some(fill_span),
        points,
    }
}
