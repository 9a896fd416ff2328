//! Reactive callback registry.
//!
//! Maps each chart container to the selector values it subscribes to and the
//! pure function that recomputes its figure. The browser fetches the
//! dependency list once, then posts an update request for every output
//! subscribed to a changed input. Outputs are independent of each other, so
//! requests may arrive in any order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::charts::{self, Figure};
use crate::data::{Metric, Table};
use crate::layout::{GraphId, InputId};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /_dash-update-component`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub output: String,
    /// Current value of each input, keyed by input id.
    #[serde(default)]
    pub inputs: HashMap<String, Value>,
}

/// Response to an update request: the new figure for `output`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub output: GraphId,
    pub figure: Figure,
}

/// One entry of `GET /_dash-dependencies`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub output: GraphId,
    pub inputs: Vec<InputId>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown output \"{0}\"")]
    UnknownOutput(String),
    #[error("missing value for input \"{0}\"")]
    MissingInput(InputId),
    #[error("invalid value for input \"{input}\": {reason}")]
    InvalidInput { input: InputId, reason: String },
}

// ---------------------------------------------------------------------------
// Input decoding
// ---------------------------------------------------------------------------

/// Decoded selector values for one callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub countries: Vec<String>,
    pub metric: Metric,
}

/// Decode the country dropdown value.
///
/// `null` means nothing selected; a bare string is a single selection.
pub fn decode_countries(value: &Value) -> Result<Vec<String>, DispatchError> {
    let invalid = |reason: &str| DispatchError::InvalidInput {
        input: InputId::DropdownSelection,
        reason: reason.to_string(),
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("country names must be strings"))
            })
            .collect(),
        _ => Err(invalid("expected a list of country names")),
    }
}

/// Decode the Y-axis dropdown value.
pub fn decode_metric(value: &Value) -> Result<Metric, DispatchError> {
    value
        .as_str()
        .and_then(Metric::from_column)
        .ok_or_else(|| DispatchError::InvalidInput {
            input: InputId::YAxisSelection,
            reason: format!("{value} is not a selectable metric"),
        })
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type Compute = fn(&Table, &HashMap<String, Value>) -> Result<Figure, DispatchError>;

/// A single output with its declared inputs.
pub struct Callback {
    pub output: GraphId,
    pub inputs: &'static [InputId],
    compute: Compute,
}

pub struct Registry {
    callbacks: Vec<Callback>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// The dashboard's four chart callbacks. The year selector is declared in
    /// the layout but no callback subscribes to it.
    pub fn new() -> Self {
        Self {
            callbacks: vec![
                Callback {
                    output: GraphId::LineChart,
                    inputs: &[InputId::DropdownSelection, InputId::YAxisSelection],
                    compute: |table, inputs| {
                        let (countries, metric) = countries_and_metric(inputs)?;
                        Ok(charts::line_chart(table, &countries, metric))
                    },
                },
                Callback {
                    output: GraphId::BubbleChart,
                    inputs: &[InputId::DropdownSelection, InputId::YAxisSelection],
                    compute: |table, inputs| {
                        let (countries, metric) = countries_and_metric(inputs)?;
                        Ok(charts::bubble_chart(table, &countries, metric))
                    },
                },
                Callback {
                    output: GraphId::TopPopulationChart,
                    inputs: &[InputId::DropdownSelection],
                    compute: |table, inputs| {
                        let countries = countries_input(inputs)?;
                        Ok(charts::top_population_chart(table, &countries))
                    },
                },
                Callback {
                    output: GraphId::ContinentPopulationChart,
                    inputs: &[InputId::DropdownSelection],
                    compute: |table, inputs| {
                        let countries = countries_input(inputs)?;
                        Ok(charts::continent_population_chart(table, &countries))
                    },
                },
            ],
        }
    }

    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.callbacks
            .iter()
            .map(|cb| Dependency {
                output: cb.output,
                inputs: cb.inputs.to_vec(),
            })
            .collect()
    }

    /// Outputs that must be recomputed when `input` changes.
    pub fn subscribers(&self, input: InputId) -> Vec<GraphId> {
        self.callbacks
            .iter()
            .filter(|cb| cb.inputs.contains(&input))
            .map(|cb| cb.output)
            .collect()
    }

    /// Run the callback for `request.output` against `table`.
    pub fn dispatch(
        &self,
        table: &Table,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse, DispatchError> {
        let output = GraphId::from_id(&request.output)
            .ok_or_else(|| DispatchError::UnknownOutput(request.output.clone()))?;
        let callback = self
            .callbacks
            .iter()
            .find(|cb| cb.output == output)
            .ok_or_else(|| DispatchError::UnknownOutput(request.output.clone()))?;

        let figure = (callback.compute)(table, &request.inputs)?;
        Ok(UpdateResponse { output, figure })
    }

    /// Convenience for callers that already hold decoded values.
    pub fn compute(
        &self,
        table: &Table,
        output: GraphId,
        selection: &Selection,
    ) -> Result<Figure, DispatchError> {
        let request = UpdateRequest {
            output: output.as_str().to_string(),
            inputs: HashMap::from([
                (
                    InputId::DropdownSelection.as_str().to_string(),
                    Value::from(selection.countries.clone()),
                ),
                (
                    InputId::YAxisSelection.as_str().to_string(),
                    Value::from(selection.metric.column()),
                ),
            ]),
        };
        self.dispatch(table, &request).map(|resp| resp.figure)
    }
}

fn input(inputs: &HashMap<String, Value>, id: InputId) -> Result<&Value, DispatchError> {
    inputs
        .get(id.as_str())
        .ok_or(DispatchError::MissingInput(id))
}

fn countries_input(inputs: &HashMap<String, Value>) -> Result<Vec<String>, DispatchError> {
    // Absent and cleared are the same: nothing selected.
    inputs
        .get(InputId::DropdownSelection.as_str())
        .map_or(Ok(Vec::new()), decode_countries)
}

fn countries_and_metric(
    inputs: &HashMap<String, Value>,
) -> Result<(Vec<String>, Metric), DispatchError> {
    let countries = countries_input(inputs)?;
    let metric = decode_metric(input(inputs, InputId::YAxisSelection)?)?;
    Ok((countries, metric))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_countries_accepts_null_string_and_list() {
        assert!(decode_countries(&Value::Null).unwrap().is_empty());
        assert_eq!(decode_countries(&json!("Canada")).unwrap(), vec!["Canada"]);
        assert_eq!(
            decode_countries(&json!(["Canada", "Mexico"])).unwrap(),
            vec!["Canada", "Mexico"]
        );
    }

    #[test]
    fn decode_countries_rejects_non_strings() {
        assert!(decode_countries(&json!([1, 2])).is_err());
        assert!(decode_countries(&json!({"a": 1})).is_err());
    }

    #[test]
    fn decode_metric_only_accepts_known_columns() {
        assert_eq!(decode_metric(&json!("pop")).unwrap(), Metric::Pop);
        assert_eq!(decode_metric(&json!("gdpPercap")).unwrap(), Metric::GdpPercap);
        assert!(decode_metric(&json!("lifeExp")).is_err());
        assert!(decode_metric(&Value::Null).is_err());
    }

    #[test]
    fn update_request_deserializes() {
        let body = r#"{"output": "line-chart", "inputs": {"dropdown-selection": ["Canada"], "y-axis-selection": "pop"}}"#;
        let req: UpdateRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.output, "line-chart");
        assert_eq!(req.inputs.len(), 2);
    }

    #[test]
    fn year_selection_has_no_subscribers() {
        let registry = Registry::new();
        assert!(registry.subscribers(InputId::YearSelection).is_empty());
        assert_eq!(registry.subscribers(InputId::YAxisSelection).len(), 2);
        assert_eq!(registry.subscribers(InputId::DropdownSelection).len(), 4);
    }

    #[test]
    fn every_graph_has_exactly_one_callback() {
        let registry = Registry::new();
        for graph in GraphId::ALL {
            let n = registry.callbacks().iter().filter(|cb| cb.output == graph).count();
            assert_eq!(n, 1, "{graph}");
        }
    }

    #[test]
    fn unknown_output_is_rejected() {
        let req = UpdateRequest {
            output: "scatter-matrix".to_string(),
            inputs: HashMap::new(),
        };
        let err = Registry::new().dispatch(&Table::default(), &req).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOutput(_)));
    }

    #[test]
    fn missing_metric_is_rejected_for_line_chart() {
        let req = UpdateRequest {
            output: "line-chart".to_string(),
            inputs: HashMap::from([("dropdown-selection".to_string(), json!(["Canada"]))]),
        };
        let err = Registry::new().dispatch(&Table::default(), &req).unwrap_err();
        assert!(matches!(err, DispatchError::MissingInput(InputId::YAxisSelection)));
    }

    #[test]
    fn pie_ignores_metric_input() {
        let req = UpdateRequest {
            output: "continent-population-chart".to_string(),
            inputs: HashMap::from([("y-axis-selection".to_string(), json!("bogus"))]),
        };
        assert!(Registry::new().dispatch(&Table::default(), &req).is_ok());
    }
}
