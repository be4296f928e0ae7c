//! Data layer: core types, loading, cleaning, aggregation and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cleaner  │  derive year, word counts, journal_clean → CleanTable
//!   └──────────┘
//!        │
//!        ├──────────────────────┐
//!        ▼                      ▼
//!   ┌──────────┐          ┌───────────┐
//!   │  filter   │ ──view─▶ │ aggregate │  grouped counts, word frequencies
//!   └──────────┘          └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  view → CSV
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod cleaner;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod text;
