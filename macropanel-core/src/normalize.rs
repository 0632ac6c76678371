//! Schema normalization: raw source records to a [`CanonicalSeries`].
//!
//! Date decoding is strict for declared encodings so that a value never lands
//! on a date its source did not mean (e.g. a `YYYYMM` month read as a year).
//! `DateEncoding::Auto` picks the rule from the shape of each value.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::record::{RawRecord, RawValue};
use crate::series::{CanonicalSeries, NormalizeStats, Observation};
use crate::timeseries::infer::infer_frequency;
use crate::{DateEncoding, ParseError, SourceSpec};

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    let year = i32::try_from(digits(y)?).ok()?;
    NaiveDate::from_ymd_opt(year, digits(m)?, digits(d)?)
}

/// Guess the encoding of a raw date from its shape.
///
/// Checked in order: 8 digits, ISO, 6 digits, dotted month, quarter label,
/// 4 digits.
#[must_use]
pub fn detect_encoding(raw: &str) -> Option<DateEncoding> {
    let b = raw.as_bytes();
    let all_digits = |s: &[u8]| !s.is_empty() && s.iter().all(u8::is_ascii_digit);
    match b.len() {
        8 if all_digits(b) => Some(DateEncoding::FullDate),
        10 if b[4] == b'-' && b[7] == b'-' => Some(DateEncoding::Iso),
        6 if all_digits(b) => Some(DateEncoding::YearMonth),
        7 if b[4] == b'.' => Some(DateEncoding::DottedYearMonth),
        6 if b[4] == b'Q' => Some(DateEncoding::Quarter),
        4 if all_digits(b) => Some(DateEncoding::Year),
        _ => None,
    }
}

fn parse_strict(s: &str, encoding: DateEncoding) -> Option<NaiveDate> {
    if !s.is_ascii() {
        return None;
    }
    let b = s.as_bytes();
    match encoding {
        DateEncoding::FullDate if b.len() == 8 => ymd(&s[0..4], &s[4..6], &s[6..8]),
        DateEncoding::Iso if b.len() == 10 && b[4] == b'-' && b[7] == b'-' => {
            ymd(&s[0..4], &s[5..7], &s[8..10])
        }
        DateEncoding::YearMonth if b.len() == 6 => ymd(&s[0..4], &s[4..6], "1"),
        DateEncoding::DottedYearMonth if b.len() == 7 && b[4] == b'.' => {
            ymd(&s[0..4], &s[5..7], "1")
        }
        DateEncoding::Quarter if b.len() == 6 && b[4] == b'Q' => {
            let q = digits(&s[5..6])?;
            if !(1..=4).contains(&q) {
                return None;
            }
            let year = i32::try_from(digits(&s[0..4])?).ok()?;
            NaiveDate::from_ymd_opt(year, (q - 1) * 3 + 1, 1)
        }
        DateEncoding::Year if b.len() == 4 => ymd(s, "1", "1"),
        DateEncoding::Auto => parse_strict(s, detect_encoding(s)?),
        _ => None,
    }
}

/// Decode a raw date string with the given encoding.
///
/// Partial dates resolve to the first day of their period: `YYYYMM` and
/// `YYYY.MM` to the 1st of the month, `YYYYQn` to the first day of the
/// quarter, `YYYY` to January 1st.
///
/// # Errors
/// Returns `ParseError::InvalidDate` when the text does not match the rule or
/// names a nonexistent calendar day.
///
/// ```
/// use chrono::NaiveDate;
/// use macropanel_core::{DateEncoding, parse_date};
///
/// assert_eq!(
///     parse_date("202003", DateEncoding::YearMonth).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
/// );
/// assert!(parse_date("2020", DateEncoding::YearMonth).is_err());
/// assert!(parse_date("ABCDEFGH", DateEncoding::Auto).is_err());
/// ```
pub fn parse_date(raw: &str, encoding: DateEncoding) -> Result<NaiveDate, ParseError> {
    let s = raw.trim();
    parse_strict(s, encoding).ok_or_else(|| ParseError::InvalidDate {
        raw: s.to_string(),
        encoding,
    })
}

/// Render a date in a native encoding; the inverse of [`parse_date`] for
/// period-start dates.
///
/// `Auto` renders as ISO.
#[must_use]
pub fn format_date(date: NaiveDate, encoding: DateEncoding) -> String {
    let (y, m, d) = (date.year(), date.month(), date.day());
    match encoding {
        DateEncoding::FullDate => format!("{y:04}{m:02}{d:02}"),
        DateEncoding::Iso | DateEncoding::Auto => format!("{y:04}-{m:02}-{d:02}"),
        DateEncoding::YearMonth => format!("{y:04}{m:02}"),
        DateEncoding::DottedYearMonth => format!("{y:04}.{m:02}"),
        DateEncoding::Quarter => format!("{y:04}Q{}", date.month0() / 3 + 1),
        DateEncoding::Year => format!("{y:04}"),
    }
}

fn parse_value(raw: &RawValue, spec: &SourceSpec) -> Result<Option<f64>, ParseError> {
    match raw {
        RawValue::Null => Ok(None),
        RawValue::Number(n) if n.is_finite() => Ok(Some(*n)),
        RawValue::Number(n) => Err(ParseError::InvalidValue { raw: n.to_string() }),
        RawValue::Text(s) => {
            let t = s.trim();
            if spec.is_missing_token(t) {
                return Ok(None);
            }
            match t.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(ParseError::InvalidValue { raw: t.to_string() }),
            }
        }
    }
}

/// Date cell as text. A numeric `2020.10` loses its trailing zero as a float,
/// so dotted year-months keep two decimals.
fn date_text(value: &RawValue, encoding: DateEncoding) -> Option<String> {
    match (value, encoding) {
        (RawValue::Number(n), DateEncoding::DottedYearMonth) if n.is_finite() => {
            Some(format!("{n:.2}"))
        }
        _ => value.to_text(),
    }
}

fn parse_row(
    rec: &RawRecord,
    spec: &SourceSpec,
) -> Result<(Observation, Option<DateEncoding>), ParseError> {
    let missing_date = || ParseError::MissingField {
        field: spec.date_field.clone(),
    };
    let raw_date = rec
        .get(&spec.date_field)
        .and_then(|v| date_text(v, spec.encoding))
        .ok_or_else(missing_date)?;
    let date = parse_date(&raw_date, spec.encoding)?;
    let detected = match spec.encoding {
        DateEncoding::Auto => detect_encoding(&raw_date),
        declared => Some(declared),
    };

    let raw_value = spec
        .value_fields
        .iter()
        .find_map(|f| rec.get(f))
        .ok_or_else(|| ParseError::MissingField {
            field: spec.value_fields.join("|"),
        })?;
    let value = parse_value(raw_value, spec)?;

    let metadata = if spec.mapping.is_empty() {
        None
    } else {
        let map: BTreeMap<String, String> = spec
            .mapping
            .iter()
            .filter_map(|(native, canonical)| {
                rec.get(native)
                    .and_then(RawValue::to_text)
                    .map(|v| (canonical.to_string(), v))
            })
            .collect();
        (!map.is_empty()).then_some(map)
    };

    Ok((
        Observation {
            date,
            value,
            metadata,
        },
        detected,
    ))
}

/// Normalize raw records into a canonical series named after the source kind.
///
/// See [`normalize_named`].
#[must_use]
pub fn normalize(records: &[RawRecord], spec: &SourceSpec) -> CanonicalSeries {
    normalize_named(spec.kind.as_str(), records, spec)
}

/// Normalize raw records into a canonical series.
///
/// - Rows whose date or value cannot be decoded are dropped; each drop is
///   recorded with its row number and reason in `stats.rejected`.
/// - Missing-value tokens and nulls become `None`, never zero.
/// - Observations are sorted by date (stable); later rows repeating a date are
///   collapsed onto the first one and counted in `stats.duplicates`.
/// - The native frequency is the declared one, else inferred from the date
///   cadence, else implied by the date encoding.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "macropanel_core::normalize",
        skip_all,
        fields(dataset = %name.as_ref(), kind = %spec.kind, rows = records.len()),
    )
)]
pub fn normalize_named(
    name: impl AsRef<str>,
    records: &[RawRecord],
    spec: &SourceSpec,
) -> CanonicalSeries {
    let mut stats = NormalizeStats {
        rows_in: records.len(),
        ..NormalizeStats::default()
    };
    let mut parsed: Vec<Observation> = Vec::with_capacity(records.len());
    let mut detected: Option<DateEncoding> = None;

    for (row, rec) in records.iter().enumerate() {
        match parse_row(rec, spec) {
            Ok((obs, enc)) => {
                detected = detected.or(enc);
                parsed.push(obs);
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(row, error = %err, "skipping unparseable row");
                stats.skipped += 1;
                stats.rejected.push((row, err));
            }
        }
    }

    parsed.sort_by_key(|o| o.date);
    let mut entries: Vec<Observation> = Vec::with_capacity(parsed.len());
    for obs in parsed {
        match entries.last() {
            Some(prev) if prev.date == obs.date => {
                stats.duplicates += 1;
                if stats.duplicate_dates.last() != Some(&obs.date) {
                    stats.duplicate_dates.push(obs.date);
                }
            }
            _ => entries.push(obs),
        }
    }
    stats.missing = entries.iter().filter(|o| o.value.is_none()).count();

    let dates: Vec<NaiveDate> = entries.iter().map(|o| o.date).collect();
    let native_frequency = spec
        .native_frequency
        .or_else(|| infer_frequency(&dates))
        .or_else(|| detected.and_then(DateEncoding::implied_frequency));

    #[cfg(feature = "tracing")]
    if stats.skipped > 0 || stats.duplicates > 0 {
        tracing::warn!(
            skipped = stats.skipped,
            duplicates = stats.duplicates,
            kept = entries.len(),
            "normalization dropped rows"
        );
    }

    CanonicalSeries {
        name: name.as_ref().to_string(),
        entries,
        native_frequency,
        stats,
    }
}
