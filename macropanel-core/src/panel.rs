//! The merged panel: one shared date index and one column per dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::series::{Origin, ResampledPoint, ResampledSeries};
use crate::{Aggregation, Frequency};

/// Name of the value column for a dataset.
#[must_use]
pub fn value_column_name(dataset: &str) -> String {
    format!("value_{dataset}")
}

/// Name of the presence column for a dataset.
#[must_use]
pub fn source_column_name(dataset: &str) -> String {
    format!("source_{dataset}")
}

/// One dataset's column in a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelColumn {
    /// Dataset name.
    pub name: String,
    /// Aggregation used when the dataset was resampled.
    pub aggregation: Aggregation,
    /// Forward-fill bound, when the dataset was upsampled.
    pub fill_limit: Option<u32>,
    /// Value per index row.
    pub values: Vec<Option<f64>>,
    /// True where the value was observed in that very period (not filled,
    /// not null).
    pub present: Vec<bool>,
}

impl PanelColumn {
    /// Rows whose value is observed.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.present.iter().filter(|p| **p).count()
    }

    /// Rows whose value was carried forward.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.values
            .iter()
            .zip(&self.present)
            .filter(|(v, p)| v.is_some() && !**p)
            .count()
    }
}

/// Percentage changes for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeColumns {
    /// Dataset name.
    pub dataset: String,
    /// Percent change against the previous row.
    pub pct_change: Vec<Option<f64>>,
    /// Percent change against the row one year earlier.
    pub pct_change_yoy: Vec<Option<f64>>,
}

/// Calendar attributes of each index row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarColumns {
    /// Calendar year.
    pub year: Vec<i32>,
    /// Position of the period within its year.
    pub period: Vec<u32>,
    /// Quarter (1-4).
    pub quarter: Vec<u32>,
    /// Month (1-12).
    pub month: Vec<u32>,
    /// The period closes a calendar quarter.
    pub is_quarter_end: Vec<bool>,
    /// The period closes a calendar month.
    pub is_month_end: Vec<bool>,
}

/// Columns added by feature derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Lag used for the year-over-year change.
    pub periods_per_year: u32,
    /// Percentage changes, one entry per dataset in column order.
    pub changes: Vec<ChangeColumns>,
    /// Calendar attributes.
    pub calendar: CalendarColumns,
}

/// Aligned multi-dataset table.
///
/// Panels produced by [`merge`](crate::merge) satisfy: the index is strictly
/// increasing and contiguous at `frequency`, every date is a period start,
/// and every column has one value and one presence flag per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    frequency: Frequency,
    index: Vec<NaiveDate>,
    columns: Vec<PanelColumn>,
    derived: Option<DerivedFeatures>,
}

impl Panel {
    /// Assemble a panel from parts without checking its invariants.
    ///
    /// Use [`validate`](crate::validate) to find structural problems in a
    /// panel built this way.
    #[must_use]
    pub const fn from_parts(
        frequency: Frequency,
        index: Vec<NaiveDate>,
        columns: Vec<PanelColumn>,
    ) -> Self {
        Self {
            frequency,
            index,
            columns,
            derived: None,
        }
    }

    pub(crate) fn with_derived(mut self, derived: DerivedFeatures) -> Self {
        self.derived = Some(derived);
        self
    }

    /// Panel frequency.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Shared date index.
    #[must_use]
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Dataset columns in name order.
    #[must_use]
    pub fn columns(&self) -> &[PanelColumn] {
        &self.columns
    }

    /// Derived features, when [`add_derived`](crate::add_derived) ran.
    #[must_use]
    pub const fn derived(&self) -> Option<&DerivedFeatures> {
        self.derived.as_ref()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the panel has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Dataset names in column order.
    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Column for a dataset.
    #[must_use]
    pub fn column(&self, dataset: &str) -> Option<&PanelColumn> {
        self.columns.iter().find(|c| c.name == dataset)
    }

    /// Row of `date` in the index.
    #[must_use]
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }

    /// Value of a dataset at a date.
    #[must_use]
    pub fn value(&self, dataset: &str, date: NaiveDate) -> Option<f64> {
        let row = self.position(date)?;
        self.column(dataset)?.values.get(row).copied().flatten()
    }

    /// Presence flag of a dataset at a date; `false` for unknown rows.
    #[must_use]
    pub fn is_present(&self, dataset: &str, date: NaiveDate) -> bool {
        self.position(date)
            .and_then(|row| self.column(dataset)?.present.get(row).copied())
            .unwrap_or(false)
    }

    /// Re-extract one column as a resampled series over the full index.
    ///
    /// Observed cells come back as single-observation periods, non-null
    /// absent cells as filled periods, null cells as missing. Merging the
    /// result alone reproduces a single-dataset panel.
    #[must_use]
    pub fn column_series(&self, dataset: &str) -> Option<ResampledSeries> {
        let col = self.column(dataset)?;
        let mut since_present = 0u32;
        let points = self
            .index
            .iter()
            .zip(col.values.iter().zip(&col.present))
            .map(|(&date, (&value, &present))| {
                let origin = match (value, present) {
                    (Some(_), true) => {
                        since_present = 0;
                        Origin::Observed { count: 1 }
                    }
                    (Some(_), false) => {
                        since_present = since_present.saturating_add(1);
                        Origin::Filled {
                            offset: since_present,
                        }
                    }
                    (None, _) => Origin::Missing,
                };
                ResampledPoint {
                    date,
                    value,
                    origin,
                }
            })
            .collect();
        Some(ResampledSeries {
            name: col.name.clone(),
            frequency: self.frequency,
            aggregation: col.aggregation,
            fill_limit: col.fill_limit,
            points,
        })
    }

    /// Flat column names in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["date".to_string()];
        for c in &self.columns {
            names.push(value_column_name(&c.name));
            names.push(source_column_name(&c.name));
        }
        if let Some(derived) = &self.derived {
            for ch in &derived.changes {
                let base = value_column_name(&ch.dataset);
                names.push(format!("{base}_pct_change"));
                names.push(format!("{base}_pct_change_yoy"));
            }
            names.extend(
                [
                    "year",
                    "period",
                    "quarter",
                    "month",
                    "is_quarter_end",
                    "is_month_end",
                ]
                .map(String::from),
            );
        }
        names
    }

    /// Flatten into a row-oriented table for persistence or display.
    #[must_use]
    pub fn to_table(&self) -> PanelTable {
        let rows = (0..self.index.len())
            .map(|i| {
                let mut row = vec![Cell::Date(self.index[i])];
                for c in &self.columns {
                    row.push(Cell::Float(c.values.get(i).copied().flatten()));
                    row.push(Cell::Bool(c.present.get(i).copied().unwrap_or(false)));
                }
                if let Some(derived) = &self.derived {
                    for ch in &derived.changes {
                        row.push(Cell::Float(ch.pct_change.get(i).copied().flatten()));
                        row.push(Cell::Float(ch.pct_change_yoy.get(i).copied().flatten()));
                    }
                    let cal = &derived.calendar;
                    let int = |v: Option<u32>| Cell::Int(v.map_or(0, i64::from));
                    row.push(Cell::Int(cal.year.get(i).copied().map_or(0, i64::from)));
                    row.push(int(cal.period.get(i).copied()));
                    row.push(int(cal.quarter.get(i).copied()));
                    row.push(int(cal.month.get(i).copied()));
                    row.push(Cell::Bool(cal.is_quarter_end.get(i).copied().unwrap_or(false)));
                    row.push(Cell::Bool(cal.is_month_end.get(i).copied().unwrap_or(false)));
                }
                row
            })
            .collect();
        PanelTable {
            columns: self.column_names(),
            rows,
        }
    }
}

/// One cell of a flattened panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Index date.
    Date(NaiveDate),
    /// Numeric value; `None` renders as null.
    Float(Option<f64>),
    /// Flag.
    Bool(bool),
    /// Integer attribute.
    Int(i64),
}

impl From<&Cell> for serde_json::Value {
    fn from(cell: &Cell) -> Self {
        match *cell {
            Cell::Date(d) => Self::String(d.to_string()),
            Cell::Float(v) => v
                .and_then(serde_json::Number::from_f64)
                .map_or(Self::Null, Self::Number),
            Cell::Bool(b) => Self::Bool(b),
            Cell::Int(i) => Self::from(i),
        }
    }
}

/// Row-oriented view of a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelTable {
    /// Column names; the first is `date`.
    pub columns: Vec<String>,
    /// Rows in index order, one cell per column.
    pub rows: Vec<Vec<Cell>>,
}

impl PanelTable {
    /// Rows as JSON objects keyed by column name.
    #[must_use]
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(serde_json::Value::from))
                    .collect()
            })
            .collect()
    }
}
