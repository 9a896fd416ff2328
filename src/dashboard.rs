//! Process-wide dashboard state: the loaded table plus everything derived
//! from it once at startup. Read-only after construction.

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::callbacks::Registry;
use crate::config::schema::DataConfig;
use crate::data::{Table, loader};
use crate::layout::Layout;

pub struct Dashboard {
    pub table: Table,
    pub layout: Layout,
    pub registry: Registry,
    /// URL or file the table was loaded from.
    pub source: String,
    pub loaded_at: DateTime<Local>,
}

impl Dashboard {
    /// Load the dataset and build the layout and callbacks.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let table = loader::load(config)?;
        let dashboard = Self::from_table(table, loader::source_name(config));
        log::info!(
            "loaded {} rows ({} countries, {} continents)",
            dashboard.table.len(),
            dashboard.table.countries().len(),
            dashboard.table.continents().len(),
        );
        Ok(dashboard)
    }

    /// Build the dashboard around an already loaded table.
    pub fn from_table(table: Table, source: &str) -> Self {
        let layout = Layout::build(&table);
        Self {
            table,
            layout,
            registry: Registry::new(),
            source: source.to_string(),
            loaded_at: Local::now(),
        }
    }
}
