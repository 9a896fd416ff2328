//! Chart recompute functions.
//!
//! Each builder is a pure function of the base table and the current selector
//! values: filter the table to the selected countries, optionally aggregate,
//! and describe the result as a [`Figure`]. Nothing is cached; every call
//! starts from the full table.

pub mod figure;

use std::collections::{BTreeMap, HashMap};

use crate::data::{Metric, Record, Table};

pub use figure::{Figure, Trace};
use figure::{
    BarTrace, FigureLayout, Line, Marker, PieTrace, ScatterMode, ScatterTrace, SizeMode,
    palette_color,
};

pub const LINE_TITLE: &str = "Comparison of Countries";
pub const BUBBLE_TITLE: &str = "Bubble Chart";
pub const TOP_POPULATION_TITLE: &str = "Top 15 Countries by Population";
pub const CONTINENT_TITLE: &str = "Population by Continent";

/// Number of bars in the top-population chart.
pub const TOP_N: usize = 15;

/// Diameter in pixels of the largest bubble.
const MAX_BUBBLE_SIZE: f64 = 20.0;

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// One line per selected country: `year` against `metric`.
pub fn line_chart<S: AsRef<str>>(table: &Table, countries: &[S], metric: Metric) -> Figure {
    let rows = table.filter_countries(countries);

    let data = group_by_country(&rows)
        .into_iter()
        .enumerate()
        .map(|(i, (country, group))| {
            Trace::Scatter(ScatterTrace {
                name: country.to_string(),
                legendgroup: country.to_string(),
                mode: ScatterMode::Lines,
                x: group.iter().map(|r| r.year).collect(),
                y: group.iter().map(|r| r.metric(metric)).collect(),
                line: Some(Line {
                    color: palette_color(i).to_string(),
                }),
                marker: None,
            })
        })
        .collect();

    Figure {
        data,
        layout: FigureLayout::with_axes(LINE_TITLE, "year", metric.column())
            .legend_title("country"),
    }
}

// ---------------------------------------------------------------------------
// Bubble chart
// ---------------------------------------------------------------------------

/// Markers per selected country: `year` against `metric`, area scaled by `pop`.
pub fn bubble_chart<S: AsRef<str>>(table: &Table, countries: &[S], metric: Metric) -> Figure {
    let rows = table.filter_countries(countries);
    let sizeref = bubble_sizeref(&rows);

    let data = group_by_country(&rows)
        .into_iter()
        .enumerate()
        .map(|(i, (country, group))| {
            Trace::Scatter(ScatterTrace {
                name: country.to_string(),
                legendgroup: country.to_string(),
                mode: ScatterMode::Markers,
                x: group.iter().map(|r| r.year).collect(),
                y: group.iter().map(|r| r.metric(metric)).collect(),
                line: None,
                marker: Some(Marker {
                    color: palette_color(i).to_string(),
                    size: Some(group.iter().map(|r| r.pop).collect()),
                    sizemode: Some(SizeMode::Area),
                    sizeref: Some(sizeref),
                }),
            })
        })
        .collect();

    Figure {
        data,
        layout: FigureLayout::with_axes(BUBBLE_TITLE, "year", metric.column())
            .legend_title("country"),
    }
}

/// Area `sizeref` so the largest `pop` in `rows` draws at [`MAX_BUBBLE_SIZE`].
fn bubble_sizeref(rows: &[&Record]) -> f64 {
    let max_pop = rows.iter().map(|r| r.pop).fold(0.0, f64::max);
    if max_pop > 0.0 {
        2.0 * max_pop / (MAX_BUBBLE_SIZE * MAX_BUBBLE_SIZE)
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Top population bar chart
// ---------------------------------------------------------------------------

/// Bars for the selected countries with the largest maximum `pop`.
pub fn top_population_chart<S: AsRef<str>>(table: &Table, countries: &[S]) -> Figure {
    let rows = table.filter_countries(countries);
    let top = top_max_population(&rows, TOP_N);

    let (x, y) = top
        .into_iter()
        .map(|(country, pop)| (country.to_string(), pop))
        .unzip();

    Figure {
        data: vec![Trace::Bar(BarTrace {
            x,
            y,
            marker: Marker::solid(palette_color(0)),
        })],
        layout: FigureLayout::with_axes(TOP_POPULATION_TITLE, "country", "pop"),
    }
}

/// Maximum `pop` per country, largest `n` in descending order.
///
/// Countries with equal maxima keep ascending name order.
pub fn top_max_population<'a>(rows: &[&'a Record], n: usize) -> Vec<(&'a str, f64)> {
    let mut max_by_country: BTreeMap<&str, f64> = BTreeMap::new();
    for &r in rows {
        max_by_country
            .entry(r.country.as_str())
            .and_modify(|m| *m = m.max(r.pop))
            .or_insert(r.pop);
    }

    let mut ranked: Vec<(&str, f64)> = max_by_country.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Continent pie chart
// ---------------------------------------------------------------------------

/// Pie of summed `pop` per continent for the selected countries.
pub fn continent_population_chart<S: AsRef<str>>(table: &Table, countries: &[S]) -> Figure {
    let rows = table.filter_countries(countries);

    let (labels, values) = population_by_continent(&rows)
        .into_iter()
        .map(|(continent, pop)| (continent.to_string(), pop))
        .unzip();

    Figure {
        data: vec![Trace::Pie(PieTrace { labels, values })],
        layout: FigureLayout::titled(CONTINENT_TITLE),
    }
}

/// Total `pop` per continent, in order of first appearance.
pub fn population_by_continent<'a>(rows: &[&'a Record]) -> Vec<(&'a str, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for &r in rows {
        let slot = *index.entry(r.continent.as_str()).or_insert_with(|| {
            totals.push((r.continent.as_str(), 0.0));
            totals.len() - 1
        });
        totals[slot].1 += r.pop;
    }
    totals
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Group rows by country, groups in first-appearance order, rows in table
/// order within each group.
fn group_by_country<'a>(rows: &[&'a Record]) -> Vec<(&'a str, Vec<&'a Record>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Record>)> = Vec::new();
    for &r in rows {
        let slot = *index.entry(r.country.as_str()).or_insert_with(|| {
            groups.push((r.country.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(r);
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
