/// Callback registry and dashboard wiring tests.
///
/// Drive the registry the way the browser does: decode JSON update requests,
/// dispatch them against a loaded dashboard and inspect the response JSON.
use serde_json::{Value, json};

use gapdash::callbacks::{DispatchError, Registry, Selection, UpdateRequest};
use gapdash::dashboard::Dashboard;
use gapdash::data::{Metric, loader};
use gapdash::layout::{GraphId, InputId};

const CSV: &str = "\
country,continent,year,pop,gdpPercap
Canada,Americas,1952,14785584,11367.16112
Canada,Americas,2007,33390141,36319.23501
Mexico,Americas,1952,30144317,3478.125529
Mexico,Americas,2007,108700891,11977.57496
Japan,Asia,2007,127467972,31656.06806
";

fn dashboard() -> Dashboard {
    Dashboard::from_table(loader::from_reader(CSV.as_bytes()).unwrap(), "fixture")
}

fn request(body: Value) -> UpdateRequest {
    serde_json::from_value(body).unwrap()
}

fn dispatch(dashboard: &Dashboard, body: Value) -> Value {
    let resp = dashboard
        .registry
        .dispatch(&dashboard.table, &request(body))
        .unwrap();
    serde_json::to_value(&resp).unwrap()
}

// ---------------------------------------------------------------------------
// Dependency graph
// ---------------------------------------------------------------------------

#[test]
fn dependencies_match_declared_inputs() {
    let deps = serde_json::to_value(Registry::new().dependencies()).unwrap();
    assert_eq!(
        deps,
        json!([
            {"output": "line-chart", "inputs": ["dropdown-selection", "y-axis-selection"]},
            {"output": "bubble-chart", "inputs": ["dropdown-selection", "y-axis-selection"]},
            {"output": "top-population-chart", "inputs": ["dropdown-selection"]},
            {"output": "continent-population-chart", "inputs": ["dropdown-selection"]},
        ])
    );
}

#[test]
fn year_selector_is_declared_but_inert() {
    let dashboard = dashboard();
    let year = dashboard.layout.dropdown(InputId::YearSelection).unwrap();
    assert_eq!(year.value, json!(2007));
    assert!(dashboard.registry.subscribers(InputId::YearSelection).is_empty());
}

#[test]
fn changing_year_does_not_change_any_figure() {
    let dashboard = dashboard();
    let base = json!({"dropdown-selection": ["Canada"], "y-axis-selection": "pop"});
    let mut with_year = base.clone();
    with_year["year-selection"] = json!(1952);

    for graph in GraphId::ALL {
        let a = dispatch(&dashboard, json!({"output": graph.as_str(), "inputs": base}));
        let b = dispatch(&dashboard, json!({"output": graph.as_str(), "inputs": with_year}));
        assert_eq!(a, b, "{graph}");
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn default_selection_renders_canada() {
    let dashboard = dashboard();
    let resp = dispatch(
        &dashboard,
        json!({"output": "line-chart", "inputs": {"dropdown-selection": ["Canada"], "y-axis-selection": "pop"}}),
    );

    assert_eq!(resp["output"], "line-chart");
    let data = resp["figure"]["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["type"], "scatter");
    assert_eq!(data[0]["mode"], "lines");
    assert_eq!(data[0]["name"], "Canada");
    assert_eq!(data[0]["x"], json!([1952, 2007]));
}

#[test]
fn cleared_country_dropdown_is_an_empty_selection() {
    let dashboard = dashboard();
    for graph in GraphId::ALL {
        let resp = dispatch(
            &dashboard,
            json!({"output": graph.as_str(), "inputs": {"dropdown-selection": null, "y-axis-selection": "gdpPercap"}}),
        );
        let text = resp["figure"]["data"].to_string();
        assert!(!text.contains("Canada"), "{graph}: {text}");
    }
}

#[test]
fn pie_response_is_plotly_shaped() {
    let dashboard = dashboard();
    let resp = dispatch(
        &dashboard,
        json!({"output": "continent-population-chart", "inputs": {"dropdown-selection": ["Canada", "Japan"]}}),
    );
    let pie = &resp["figure"]["data"][0];
    assert_eq!(pie["type"], "pie");
    assert_eq!(pie["labels"], json!(["Americas", "Asia"]));
    assert_eq!(pie["values"], json!([48_175_725.0, 127_467_972.0]));
}

#[test]
fn invalid_metric_is_an_input_error() {
    let dashboard = dashboard();
    let err = dashboard
        .registry
        .dispatch(
            &dashboard.table,
            &request(json!({"output": "bubble-chart", "inputs": {"dropdown-selection": [], "y-axis-selection": "lifeExp"}})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::InvalidInput {
            input: InputId::YAxisSelection,
            ..
        }
    ));
}

#[test]
fn compute_with_decoded_selection_matches_dispatch() {
    let dashboard = dashboard();
    let selection = Selection {
        countries: vec!["Mexico".to_string(), "Japan".to_string()],
        metric: Metric::GdpPercap,
    };
    let figure = dashboard
        .registry
        .compute(&dashboard.table, GraphId::BubbleChart, &selection)
        .unwrap();

    let resp = dispatch(
        &dashboard,
        json!({"output": "bubble-chart", "inputs": {"dropdown-selection": ["Mexico", "Japan"], "y-axis-selection": "gdpPercap"}}),
    );
    assert_eq!(serde_json::to_value(&figure).unwrap(), resp["figure"]);
}
