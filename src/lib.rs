//! gapdash: an interactive gapminder dashboard served over HTTP.
//!
//! The dataset is loaded once into an immutable [`data::Table`]; the page is
//! described by [`layout::Layout`]; each chart is recomputed on demand by a
//! callback in [`callbacks::Registry`]; [`web::serve`] ties them together.

pub mod callbacks;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod layout;
pub mod web;
