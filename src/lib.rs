//! Exploration pipeline for CORD-19 paper metadata: load a metadata file,
//! derive analysis columns, filter and aggregate.
//!
//! The egui dashboard in the binary only renders what these modules compute.

pub mod config;
pub mod data;
pub mod report;
pub mod session;

pub use config::ExplorerConfig;
pub use data::model::{CleanPaper, CleanTable, Paper, RawTable};
pub use session::ExplorerSession;
