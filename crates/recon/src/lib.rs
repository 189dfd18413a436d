//! `stockcheck-recon`: stock ledger reconciliation engine.
//!
//! Pure engine crate: receives the pre-loaded product catalog and stock
//! events, returns per-product balances, statuses and integrity findings.
//! CSV loading lives in [`load`]; rendering and export belong to callers.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod integrity;
pub mod load;
pub mod model;
pub mod movement;
pub mod serials;
pub mod totals;

pub use classify::{compute_summaries, group_by_category};
pub use config::StockConfig;
pub use engine::run;
pub use error::StockError;
pub use integrity::check_integrity;
pub use model::{
    FindingKind, IntegrityFinding, IntegrityReport, Product, ProductSummary, RunTotals, StockEvent,
    StockInput, StockReport, StockStatus,
};
