/// Dataset loader.
///
/// Fetches the gapminder CSV once at startup with the synchronous `ureq`
/// client (or reads a local file when `data.path` is set) and parses it with
/// `csv` + `serde` into a [`Table`]. Any failure aborts the load: there is no
/// retry, no fallback and no partial table.
use std::fs::File;
use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{Record, Table};
use crate::config::schema::DataConfig;

/// Load the table from the configured source.
pub fn load(config: &DataConfig) -> Result<Table> {
    match &config.path {
        Some(path) => {
            log::info!("reading dataset from {path}");
            let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
            from_reader(file).with_context(|| format!("failed to parse {path}"))
        }
        None => fetch(&config.url, Duration::from_millis(config.timeout_ms)),
    }
}

/// Human-readable description of where the table comes from.
pub fn source_name(config: &DataConfig) -> &str {
    config.path.as_deref().unwrap_or(&config.url)
}

/// Fetch and parse the CSV at `url`.
fn fetch(url: &str, timeout: Duration) -> Result<Table> {
    log::info!("fetching dataset from {url}");

    let resp = ureq::get(url)
        .timeout(timeout)
        .call()
        .with_context(|| format!("failed to fetch dataset from {url}"))?;

    from_reader(resp.into_reader()).with_context(|| format!("failed to parse dataset from {url}"))
}

/// Parse CSV text with a header row into a table.
///
/// Columns are matched by header name; columns other than `country`,
/// `continent`, `year`, `pop` and `gdpPercap` are ignored.
pub fn from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in csv_reader.deserialize::<Record>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = result.with_context(|| format!("malformed row at line {line}"))?;
        check_record(&record).with_context(|| format!("invalid row at line {line}"))?;
        rows.push(record);
    }

    Ok(Table::new(rows))
}

fn check_record(record: &Record) -> Result<()> {
    for (name, value) in [("pop", record.pop), ("gdpPercap", record.gdp_percap)] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!(
                "{name} for {} ({}) must be a non-negative number, got {value}",
                record.country,
                record.year
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
country,continent,year,lifeExp,pop,gdpPercap,iso_alpha,iso_num
Canada,Americas,1952,68.75,14785584,11367.16112,CAN,124
Canada,Americas,2007,80.653,33390141,36319.23501,CAN,124
Mexico,Americas,2007,76.195,108700891,11977.57496,MEX,484
";

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let table = from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.rows()[0];
        assert_eq!(first.country, "Canada");
        assert_eq!(first.continent, "Americas");
        assert_eq!(first.year, 1952);
        assert_eq!(first.pop, 14_785_584.0);
        assert!((first.gdp_percap - 11367.16112).abs() < 1e-9);
    }

    #[test]
    fn accepts_scientific_notation_population() {
        let csv = "country,continent,year,pop,gdpPercap\nChina,Asia,2007,1.318683096e9,4959.1\n";
        let table = from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].pop, 1_318_683_096.0);
    }

    #[test]
    fn malformed_row_fails_the_whole_load() {
        let csv = "country,continent,year,pop,gdpPercap\nCanada,Americas,nineteen,1,1\n";
        let err = from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn missing_column_fails() {
        let csv = "country,year,pop,gdpPercap\nCanada,1952,1,1\n";
        assert!(from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn negative_population_is_rejected() {
        let csv = "country,continent,year,pop,gdpPercap\nCanada,Americas,1952,-5,1\n";
        let err = from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("non-negative"));
    }

    #[test]
    fn header_only_yields_empty_table() {
        let table = from_reader("country,continent,year,pop,gdpPercap\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    // -- fetch over HTTP ----------------------------------------------------

    /// Serve one request on an ephemeral local port and return its URL.
    fn serve_once(status: u16, body: &'static str) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });
        format!("http://127.0.0.1:{port}/gapminder.csv")
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn fetch_parses_a_successful_response() {
        let url = serve_once(200, CSV);
        let table = fetch(&url, TIMEOUT).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.countries(), vec!["Canada", "Mexico"]);
    }

    #[test]
    fn fetch_fails_on_error_status() {
        let url = serve_once(404, "not found");
        let err = fetch(&url, TIMEOUT).unwrap_err();
        assert!(format!("{err:#}").contains("failed to fetch dataset"));
    }

    #[test]
    fn fetch_fails_on_malformed_body() {
        let url = serve_once(200, "country,continent,year,pop,gdpPercap\nCanada,Americas,1952,lots,1\n");
        let err = fetch(&url, TIMEOUT).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to parse dataset"), "{chain}");
        assert!(chain.contains("line 2"), "{chain}");
    }

    #[test]
    fn load_without_path_fetches_the_url() {
        let config = DataConfig {
            url: serve_once(200, CSV),
            timeout_ms: 5_000,
            path: None,
        };
        assert_eq!(load(&config).unwrap().len(), 3);
    }

    #[test]
    fn missing_local_file_is_an_error() {
        let config = DataConfig {
            path: Some("/nonexistent/gapminder.csv".to_string()),
            ..DataConfig::default()
        };
        assert!(load(&config).is_err());
        assert_eq!(source_name(&config), "/nonexistent/gapminder.csv");
    }
}
