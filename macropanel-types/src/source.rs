//! Source descriptions: which fields hold the date and the value, and how the
//! date is encoded.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Frequency;

/// Fixed enumeration of the source families the normalizer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SourceKind {
    /// Bank of Korea ECOS statistics (`TIME` / `DATA_VALUE`).
    Bok,
    /// Statistics Korea KOSIS tables (`PRD_DE` / `DT`).
    Kosis,
    /// FRED observations (`date` / `value`, `.` for missing).
    Fred,
    /// KB Land housing price indices (`date` / `value`).
    KbLand,
    /// EIA energy series (`period` / `value`).
    Eia,
    /// Anything else; fields must be configured explicitly.
    Custom,
}

impl SourceKind {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bok => "bok",
            Self::Kosis => "kosis",
            Self::Fred => "fred",
            Self::KbLand => "kb_land",
            Self::Eia => "eia",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule used to decode a source's date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateEncoding {
    /// Eight digits, `YYYYMMDD`.
    FullDate,
    /// Six digits, `YYYYMM`; the first day of the month.
    YearMonth,
    /// Four digits, `YYYY`; January 1st.
    Year,
    /// ISO calendar date, `YYYY-MM-DD`.
    Iso,
    /// Quarter label, `YYYYQn`; the first day of the quarter.
    Quarter,
    /// Dotted month, `YYYY.MM`; the first day of the month.
    DottedYearMonth,
    /// Detect the rule from the shape of each value.
    Auto,
}

impl DateEncoding {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullDate => "full_date",
            Self::YearMonth => "year_month",
            Self::Year => "year",
            Self::Iso => "iso",
            Self::Quarter => "quarter",
            Self::DottedYearMonth => "dotted_year_month",
            Self::Auto => "auto",
        }
    }

    /// Sampling frequency implied by the encoding alone, when it implies one.
    #[must_use]
    pub const fn implied_frequency(self) -> Option<Frequency> {
        match self {
            Self::YearMonth | Self::DottedYearMonth => Some(Frequency::Monthly),
            Self::Quarter => Some(Frequency::Quarterly),
            Self::Year => Some(Frequency::Yearly),
            Self::FullDate | Self::Iso | Self::Auto => None,
        }
    }
}

impl fmt::Display for DateEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit mapping from a source's native field names to canonical English
/// metadata keys.
///
/// Only mapped fields are carried into an observation's metadata; everything
/// else in a raw record is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    fields: BTreeMap<String, String>,
}

impl ColumnMapping {
    /// Empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `native -> canonical` entry.
    #[must_use]
    pub fn with(mut self, native: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.fields.insert(native.into(), canonical.into());
        self
    }

    /// Canonical name for a native field, if mapped.
    #[must_use]
    pub fn canonical(&self, native: &str) -> Option<&str> {
        self.fields.get(native).map(String::as_str)
    }

    /// Iterate over `(native, canonical)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Descriptive fields published by a source kind.
    #[must_use]
    pub fn preset(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Bok => Self::new()
                .with("STAT_CODE", "stat_code")
                .with("STAT_NAME", "stat_name")
                .with("ITEM_CODE1", "item_code")
                .with("ITEM_NAME1", "item_name")
                .with("UNIT_NAME", "unit"),
            SourceKind::Kosis => Self::new()
                .with("C1_NM", "region")
                .with("C2_NM", "category")
                .with("UNIT_NM", "unit"),
            SourceKind::Fred => Self::new()
                .with("realtime_start", "realtime_start")
                .with("realtime_end", "realtime_end"),
            SourceKind::KbLand => Self::new().with("region", "region").with("category", "category"),
            SourceKind::Eia => Self::new().with("units", "unit").with("series", "series_id"),
            SourceKind::Custom => Self::new(),
        }
    }
}

/// How to read one source: where the date and value live and how they are
/// encoded.
///
/// `value_fields` lists alternatives; for each record the first one present
/// supplies the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Source family.
    pub kind: SourceKind,
    /// Name of the date field.
    pub date_field: String,
    /// Encoding of the date field.
    pub encoding: DateEncoding,
    /// Candidate value fields, in order of preference.
    pub value_fields: Vec<String>,
    /// Raw values that mean "no observation" for this source.
    pub missing_tokens: Vec<String>,
    /// Declared native sampling frequency; inferred when absent.
    pub native_frequency: Option<Frequency>,
    /// Descriptive fields to carry into observation metadata.
    pub mapping: ColumnMapping,
}

impl SourceSpec {
    /// Spec for a custom source with explicit field names and no metadata.
    pub fn new(
        kind: SourceKind,
        date_field: impl Into<String>,
        encoding: DateEncoding,
        value_field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            date_field: date_field.into(),
            encoding,
            value_fields: vec![value_field.into()],
            missing_tokens: vec![String::new()],
            native_frequency: None,
            mapping: ColumnMapping::new(),
        }
    }

    /// Strategy table for the known source kinds.
    #[must_use]
    pub fn preset(kind: SourceKind) -> Self {
        let (date_field, encoding, value_fields, missing): (&str, _, &[&str], &[&str]) = match kind
        {
            SourceKind::Bok => ("TIME", DateEncoding::Auto, &["DATA_VALUE"], &["", "-"]),
            SourceKind::Kosis => ("PRD_DE", DateEncoding::Auto, &["DT"], &["", "-"]),
            SourceKind::Fred => ("date", DateEncoding::Iso, &["value"], &[".", ""]),
            SourceKind::KbLand => (
                "date",
                DateEncoding::Iso,
                &["value", "total_index", "apartment_index"],
                &["", "-"],
            ),
            SourceKind::Eia => ("period", DateEncoding::Auto, &["value"], &["", "NA"]),
            SourceKind::Custom => ("date", DateEncoding::Auto, &["value"], &[""]),
        };
        Self {
            kind,
            date_field: date_field.to_string(),
            encoding,
            value_fields: value_fields.iter().map(|s| (*s).to_string()).collect(),
            missing_tokens: missing.iter().map(|s| (*s).to_string()).collect(),
            native_frequency: None,
            mapping: ColumnMapping::preset(kind),
        }
    }

    /// Override the date encoding.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: DateEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Declare the native sampling frequency instead of inferring it.
    #[must_use]
    pub const fn with_native_frequency(mut self, frequency: Frequency) -> Self {
        self.native_frequency = Some(frequency);
        self
    }

    /// Replace the candidate value fields with a single field.
    #[must_use]
    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_fields = vec![field.into()];
        self
    }

    /// Add a missing-value token.
    #[must_use]
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_tokens.push(token.into());
        self
    }

    /// Replace the metadata mapping.
    #[must_use]
    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// True when `raw` (already trimmed) is one of the missing-value tokens.
    #[must_use]
    pub fn is_missing_token(&self, raw: &str) -> bool {
        self.missing_tokens.iter().any(|t| t == raw)
    }
}
