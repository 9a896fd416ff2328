//! Static control tree of the dashboard page.
//!
//! Built once from the table at startup and served as JSON at
//! `/_dash-layout`; the browser renders it and wires every control change to
//! the callback registry.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::data::{Metric, Table};

pub const HEADING: &str = "dash country";
pub const METRIC_LABEL: &str = "Choose Y-axis:";
pub const DEFAULT_COUNTRY: &str = "Canada";

// ---------------------------------------------------------------------------
// Component ids
// ---------------------------------------------------------------------------

/// Selector controls whose values feed callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputId {
    #[serde(rename = "year-selection")]
    YearSelection,
    #[serde(rename = "dropdown-selection")]
    DropdownSelection,
    #[serde(rename = "y-axis-selection")]
    YAxisSelection,
}

impl InputId {
    pub const ALL: [InputId; 3] = [
        InputId::YearSelection,
        InputId::DropdownSelection,
        InputId::YAxisSelection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::YearSelection => "year-selection",
            Self::DropdownSelection => "dropdown-selection",
            Self::YAxisSelection => "y-axis-selection",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == id)
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart containers, each the target of exactly one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GraphId {
    #[serde(rename = "line-chart")]
    LineChart,
    #[serde(rename = "bubble-chart")]
    BubbleChart,
    #[serde(rename = "top-population-chart")]
    TopPopulationChart,
    #[serde(rename = "continent-population-chart")]
    ContinentPopulationChart,
}

impl GraphId {
    pub const ALL: [GraphId; 4] = [
        GraphId::LineChart,
        GraphId::BubbleChart,
        GraphId::TopPopulationChart,
        GraphId::ContinentPopulationChart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LineChart => "line-chart",
            Self::BubbleChart => "bubble-chart",
            Self::TopPopulationChart => "top-population-chart",
            Self::ContinentPopulationChart => "continent-population-chart",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == id)
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Component tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Div { children: Vec<Component> },
    Heading { text: String },
    Label { text: String },
    Dropdown(Dropdown),
    /// Empty until its callback delivers a figure.
    Graph { id: GraphId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: InputId,
    pub options: Vec<DropdownOption>,
    /// Initial value: a scalar for single-select, an array for multi-select.
    pub value: Value,
    pub multi: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub root: Component,
}

impl Layout {
    /// Build the dashboard layout from the loaded table.
    pub fn build(table: &Table) -> Self {
        let year = Dropdown {
            id: InputId::YearSelection,
            options: table
                .years()
                .into_iter()
                .map(|y| DropdownOption {
                    label: y.to_string(),
                    value: json!(y),
                })
                .collect(),
            value: table.max_year().map_or(Value::Null, |y| json!(y)),
            multi: false,
        };

        let countries = Dropdown {
            id: InputId::DropdownSelection,
            options: table
                .countries()
                .into_iter()
                .map(|c| DropdownOption {
                    label: c.to_string(),
                    value: json!(c),
                })
                .collect(),
            value: json!([DEFAULT_COUNTRY]),
            multi: true,
        };

        let metric = Dropdown {
            id: InputId::YAxisSelection,
            options: Metric::ALL
                .into_iter()
                .map(|m| DropdownOption {
                    label: m.label().to_string(),
                    value: json!(m.column()),
                })
                .collect(),
            value: json!(Metric::default().column()),
            multi: false,
        };

        let mut children = vec![
            Component::Heading {
                text: HEADING.to_string(),
            },
            Component::Dropdown(year),
            Component::Dropdown(countries),
            Component::Div {
                children: vec![
                    Component::Label {
                        text: METRIC_LABEL.to_string(),
                    },
                    Component::Dropdown(metric),
                ],
            },
        ];
        children.extend(GraphId::ALL.into_iter().map(|id| Component::Graph { id }));

        Self {
            root: Component::Div { children },
        }
    }

    /// Find a dropdown anywhere in the tree.
    pub fn dropdown(&self, id: InputId) -> Option<&Dropdown> {
        find_dropdown(&self.root, id)
    }

    /// Graph containers in document order.
    pub fn graphs(&self) -> Vec<GraphId> {
        let mut out = Vec::new();
        collect_graphs(&self.root, &mut out);
        out
    }
}

fn find_dropdown(component: &Component, id: InputId) -> Option<&Dropdown> {
    match component {
        Component::Dropdown(d) if d.id == id => Some(d),
        Component::Div { children } => children.iter().find_map(|c| find_dropdown(c, id)),
        _ => None,
    }
}

fn collect_graphs(component: &Component, out: &mut Vec<GraphId>) {
    match component {
        Component::Graph { id } => out.push(*id),
        Component::Div { children } => {
            for c in children {
                collect_graphs(c, out);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
