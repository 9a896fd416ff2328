//! The gapminder record table.
//!
//! Loaded once at startup by [`loader`] and never mutated afterwards. Every
//! chart recompute borrows the same [`Table`] and works on filtered views of
//! its rows.

pub mod loader;

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One row of the dataset: a country's figures for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub continent: String,
    pub year: i32,
    pub pop: f64,
    #[serde(rename = "gdpPercap")]
    pub gdp_percap: f64,
}

impl Record {
    /// Value of the given numeric column.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Pop => self.pop,
            Metric::GdpPercap => self.gdp_percap,
        }
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// Numeric column selectable as the Y axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    #[serde(rename = "pop")]
    Pop,
    #[serde(rename = "gdpPercap")]
    GdpPercap,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Pop, Metric::GdpPercap];

    /// Column name, also the dropdown value and the axis title.
    pub fn column(self) -> &'static str {
        match self {
            Self::Pop => "pop",
            Self::GdpPercap => "gdpPercap",
        }
    }

    /// Human-readable dropdown label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pop => "Population",
            Self::GdpPercap => "GDP per Capita",
        }
    }

    /// Parse a column name. Returns `None` for anything that is not a
    /// selectable metric.
    pub fn from_column(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.column() == s)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Immutable, ordered collection of records.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Record>,
}

impl Table {
    pub fn new(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct years.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.rows.iter().map(|r| r.year).collect();
        years.into_iter().collect()
    }

    /// Largest year present, `None` for an empty table.
    pub fn max_year(&self) -> Option<i32> {
        self.rows.iter().map(|r| r.year).max()
    }

    /// Distinct countries in order of first appearance.
    pub fn countries(&self) -> Vec<&str> {
        distinct_in_order(self.rows.iter().map(|r| r.country.as_str()))
    }

    /// Distinct continents in order of first appearance.
    pub fn continents(&self) -> Vec<&str> {
        distinct_in_order(self.rows.iter().map(|r| r.continent.as_str()))
    }

    /// Rows whose country is in `selection`, in table order.
    ///
    /// An empty selection yields no rows. Names not present in the table
    /// simply match nothing.
    pub fn filter_countries<S: AsRef<str>>(&self, selection: &[S]) -> Vec<&Record> {
        if selection.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = selection.iter().map(AsRef::as_ref).collect();
        self.rows
            .iter()
            .filter(|r| wanted.contains(r.country.as_str()))
            .collect()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
