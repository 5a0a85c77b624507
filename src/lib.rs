//! # Transaction Health
//!
//! Data-preparation and cash-flow analytics pipeline behind a company
//! transaction dashboard. The crate loads four raw extracts, joins them
//! into one denormalized company × month table, and exposes pure
//! aggregation functions that a rendering layer turns into charts.
//!
//! ## Core Concepts
//!
//! - **Unified table**: per-company-per-month summary rows, left-joined
//!   with registry dates and network-centrality metrics, cleaned and typed
//! - **Calendar spine**: one row per day across the observed date range,
//!   enumerating every selectable `MM/YYYY` bucket
//! - **Segment aggregation**: pure group-by/sort table shapes per lifecycle
//!   stage (time series, ratios, top-N rankings, month-over-month deltas)
//! - **Negative streaks**: longest consecutive run of negative monthly net
//!   cash flow per company
//! - **Graceful degradation**: missing optional columns skip features,
//!   malformed cells coerce to null/zero; only missing files or a dataset
//!   with no dates at all stop the pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use transaction_health::*;
//! use std::path::PathBuf;
//!
//! let files = InputFiles {
//!     registry: PathBuf::from("data/Base1_ID.xlsx"),
//!     transactions: PathBuf::from("data/Base2_Transacoes.xlsx"),
//!     summary: PathBuf::from("data/dados_para_powerbi.csv"),
//!     network: PathBuf::from("data/dados_rede_para_powerbi.csv"),
//! };
//!
//! let mut cache = SessionCache::new();
//! let data = cache.load(&files)?;
//!
//! let selection = FilterSelection {
//!     momento: Some("DECLÍNIO".to_string()),
//!     ..Default::default()
//! };
//! let view = selection.apply(data);
//!
//! let flow = monthly_sum(&view.companies, Metric::FluxoCaixaLiquido);
//! let streaks = CashFlowMatrix::from_records(&view.companies).top_streaks(10);
//! ```

pub mod aggregate;
pub mod calendar;
pub mod clean;
pub mod detail;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingestion;
pub mod join;
pub mod loader;
pub mod recommend;
pub mod schema;
pub mod streak;
pub mod table;

pub use aggregate::{
    count_by_sector, count_by_stage, largest_drops, monthly_pair_mean, monthly_pair_sum,
    monthly_percent_change, monthly_ratio, monthly_sum, percent_change,
    pivot_with_trailing_delta, sum_by_transaction_type, top_month_over_month_growth, top_n,
    top_sectors_by_count, Dimension, GlobalKpis, Metric, PivotTable,
};
pub use calendar::{build_calendar, month_key, month_options, sort_month_keys, CalendarEntry};
pub use detail::{
    monthly_timeline, top_edges, transactions_for, CompanySnapshot, NetworkEdge,
};
pub use error::{AnalyticsError, Result};
pub use export::{export_to_path, write_filtered_csv};
pub use filter::{sector_options, stage_options, FilterSelection, FilteredView};
pub use loader::{
    build_dashboard_data, fingerprint_inputs, load_dashboard_data, DashboardData, InputFiles,
    SessionCache,
};
pub use recommend::{generate_recommendations, recommendations_for};
pub use schema::{CompanyRecord, LifecycleStage, SchemaCapabilities, TransactionRecord};
pub use streak::{longest_negative_streak, CashFlowMatrix, StreakEntry};
pub use table::RawTable;
