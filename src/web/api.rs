//! JSON handlers for the dashboard endpoints.

use anyhow::Context;
use serde::Serialize;

use crate::callbacks::UpdateRequest;
use crate::dashboard::Dashboard;

use super::{ApiError, Reply};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    source: String,
    loaded_at: String,
    rows: usize,
    countries: usize,
    continents: usize,
    first_year: Option<i32>,
    last_year: Option<i32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Reply, ApiError> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(200, body))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /_dash-layout` — the static control tree.
pub(super) fn get_layout(dashboard: &Dashboard) -> Result<Reply, ApiError> {
    json_response(&dashboard.layout)
}

/// `GET /_dash-dependencies` — which inputs drive which chart.
pub(super) fn get_dependencies(dashboard: &Dashboard) -> Result<Reply, ApiError> {
    json_response(&dashboard.registry.dependencies())
}

/// `POST /_dash-update-component` — recompute one chart.
///
/// Expects `{ "output": "line-chart", "inputs": { "dropdown-selection": [...], ... } }`.
pub(super) fn post_update(dashboard: &Dashboard, body: &str) -> Result<Reply, ApiError> {
    let request: UpdateRequest = serde_json::from_str(body)
        .context("invalid JSON in update request")
        .map_err(ApiError::bad_request)?;

    let response = dashboard.registry.dispatch(&dashboard.table, &request)?;
    json_response(&response)
}

/// `GET /api/health` — what was loaded and when.
pub(super) fn get_health(dashboard: &Dashboard) -> Result<Reply, ApiError> {
    let table = &dashboard.table;
    let years = table.years();

    let resp = HealthResponse {
        status: "ok",
        source: dashboard.source.clone(),
        loaded_at: dashboard.loaded_at.to_rfc3339(),
        rows: table.len(),
        countries: table.countries().len(),
        continents: table.continents().len(),
        first_year: years.first().copied(),
        last_year: years.last().copied(),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::data::loader;

    fn dashboard() -> Dashboard {
        let csv = "country,continent,year,pop,gdpPercap\n\
                   Canada,Americas,1952,14785584,11367.2\n\
                   Canada,Americas,2007,33390141,36319.2\n\
                   Mexico,Americas,2007,108700891,11977.6\n\
                   Japan,Asia,2007,127467972,31656.1\n";
        Dashboard::from_table(loader::from_reader(csv.as_bytes()).unwrap(), "inline.csv")
    }

    fn body(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn layout_lists_the_three_selectors() {
        let json = body(&get_layout(&dashboard()).unwrap());
        let text = json.to_string();
        assert!(text.contains("\"year-selection\""));
        assert!(text.contains("\"dropdown-selection\""));
        assert!(text.contains("\"y-axis-selection\""));
        assert!(text.contains("dash country"));
    }

    #[test]
    fn dependencies_never_mention_year() {
        let json = body(&get_dependencies(&dashboard()).unwrap());
        let deps = json.as_array().unwrap();
        assert_eq!(deps.len(), 4);
        assert!(!json.to_string().contains("year-selection"));
    }

    #[test]
    fn update_returns_figure_for_output() {
        let req = r#"{"output": "line-chart", "inputs": {"dropdown-selection": ["Canada", "Mexico"], "y-axis-selection": "pop"}}"#;
        let json = body(&post_update(&dashboard(), req).unwrap());
        assert_eq!(json["output"], "line-chart");
        assert_eq!(json["figure"]["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["figure"]["layout"]["title"]["text"], "Comparison of Countries");
    }

    #[test]
    fn update_with_bad_metric_is_400() {
        let req = r#"{"output": "bubble-chart", "inputs": {"dropdown-selection": [], "y-axis-selection": "lifeExp"}}"#;
        let err = post_update(&dashboard(), req).unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn health_reports_table_shape() {
        let json = body(&get_health(&dashboard()).unwrap());
        assert_eq!(json["rows"], 4);
        assert_eq!(json["countries"], 3);
        assert_eq!(json["continents"], 2);
        assert_eq!(json["first_year"], 1952);
        assert_eq!(json["last_year"], 2007);
        assert_eq!(json["source"], "inline.csv");
    }
}
