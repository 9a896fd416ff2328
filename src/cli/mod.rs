//! CLI command implementations besides `serve`.
//!
//! - `gapdash summary` — shape of the loaded dataset, latest-year leaders
//! - `gapdash preview <chart>` — run one chart callback and print its figure
//! - `gapdash config show|init` — configuration management

use anyhow::{Context, Result};
use colored::Colorize;

use crate::callbacks::Selection;
use crate::charts;
use crate::config;
use crate::dashboard::Dashboard;
use crate::data::{Metric, Record, Table};
use crate::layout::GraphId;

// ---------------------------------------------------------------------------
// gapdash summary
// ---------------------------------------------------------------------------

/// Print a summary of the loaded table.
pub fn run_summary(dashboard: &Dashboard) -> Result<()> {
    let table = &dashboard.table;

    println!("{}", "Gapminder Dataset Summary".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Source:    ".bold(), dashboard.source);
    println!("  {} {}", "Rows:      ".bold(), format_number(table.len() as f64));
    println!("  {} {}", "Countries: ".bold(), table.countries().len());
    println!("  {} {}", "Continents:".bold(), table.continents().join(", "));

    let years = table.years();
    let (Some(first), Some(last)) = (years.first(), years.last()) else {
        println!();
        println!("{}", "Table is empty.".yellow());
        return Ok(());
    };
    println!("  {} {first}–{last} ({} distinct)", "Years:     ".bold(), years.len());
    println!();

    let latest = rows_for_year(table, *last);

    println!("{}", format!("Most Populous Countries in {last}").bold().cyan());
    println!("  {:<28} {:>16}", "Country", "Population");
    println!("  {}", "-".repeat(45));
    for (i, (country, pop)) in charts::top_max_population(&latest, 10).iter().enumerate() {
        let line = format!("  {:<28} {:>16}", truncate(country, 28), format_number(*pop));
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!();

    println!("{}", format!("Population by Continent in {last}").bold().cyan());
    for (continent, pop) in charts::population_by_continent(&latest) {
        println!("  {:<28} {:>16}", continent, format_number(pop));
    }

    Ok(())
}

fn rows_for_year(table: &Table, year: i32) -> Vec<&Record> {
    table.rows().iter().filter(|r| r.year == year).collect()
}

// ---------------------------------------------------------------------------
// gapdash preview
// ---------------------------------------------------------------------------

/// Run one chart callback and print the resulting figure as JSON.
pub fn run_preview(
    dashboard: &Dashboard,
    output: &str,
    countries: Vec<String>,
    metric: &str,
) -> Result<()> {
    let graph = GraphId::from_id(output).with_context(|| {
        let known: Vec<&str> = GraphId::ALL.iter().map(|g| g.as_str()).collect();
        format!("unknown chart \"{output}\" (expected one of: {})", known.join(", "))
    })?;
    let metric = Metric::from_column(metric)
        .with_context(|| format!("unknown metric \"{metric}\" (expected pop or gdpPercap)"))?;

    let selection = Selection { countries, metric };
    let figure = dashboard
        .registry
        .compute(&dashboard.table, graph, &selection)?;

    log::debug!("{graph}: {} points", figure.point_count());

    let json = serde_json::to_string_pretty(&figure).context("failed to serialize figure")?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// gapdash config
// ---------------------------------------------------------------------------

/// Print the effective configuration.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective gapdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.gapdash/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.gapdash/config.toml (not found)".dimmed()
        );
    }
    println!("  {} {}", "·".dimmed(), ".gapdash.toml, GAPDASH_* env".dimmed());

    Ok(())
}

/// Write the default config file.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a non-negative quantity with thousands separators, rounded to an
/// integer.
fn format_number(n: f64) -> String {
    let s = format!("{:.0}", n.max(0.0));
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(33_390_141.0), "33,390,141");
        assert_eq!(format_number(1_318_683_096.4), "1,318,683,096");
    }

    #[test]
    fn truncate_handles_multibyte_names() {
        assert_eq!(truncate("Canada", 10), "Canada");
        assert_eq!(truncate("Côte d'Ivoire", 6), "Côte …");
    }
}
