//! The load pipeline: read the four extracts, normalize, join, clean and
//! type the result, then derive the calendar spine.
//!
//! Loading is the only expensive operation in the crate, so a
//! [`SessionCache`] memoizes the result per input-file fingerprint for the
//! lifetime of the process. Every load error surfaces here; the aggregation
//! layer never sees a file or parse failure.

use crate::calendar::{self, CalendarEntry};
use crate::clean::clean_table;
use crate::error::Result;
use crate::ingestion::{read_delimited, read_spreadsheet};
use crate::join::left_join_columns;
use crate::schema::{
    self, CompanyRecord, SchemaCapabilities, TransactionRecord, COL_ID_EMPRESA,
};
use crate::table::{normalize_headers, RawTable};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// The four raw extracts the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    /// Company registry spreadsheet (identifier plus optional dates).
    pub registry: PathBuf,
    /// Transaction-level spreadsheet.
    pub transactions: PathBuf,
    /// Per-company-per-month summary, the base table (`;`-separated text).
    pub summary: PathBuf,
    /// Network-centrality metrics (`;`-separated text).
    pub network: PathBuf,
}

impl InputFiles {
    fn paths(&self) -> [&Path; 4] {
        [
            self.registry.as_path(),
            self.transactions.as_path(),
            self.summary.as_path(),
            self.network.as_path(),
        ]
    }
}

/// Everything the dashboard works with for one session. Immutable once
/// built; filters copy, they never mutate.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub companies: Vec<CompanyRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub calendar: Vec<CalendarEntry>,
}

/// Builds [`DashboardData`] from already-read raw tables. Split out from
/// the file layer so the pipeline is testable without fixture workbooks.
pub fn build_dashboard_data(
    mut registry: RawTable,
    mut transactions: RawTable,
    mut summary: RawTable,
    mut network: RawTable,
) -> Result<DashboardData> {
    normalize_headers(&mut [
        &mut registry,
        &mut transactions,
        &mut summary,
        &mut network,
    ]);

    let caps = SchemaCapabilities::detect(&registry, &transactions, &network);
    log::debug!(
        "Capabilities: registry columns {:?}, network columns {:?}",
        caps.registry_columns,
        caps.network_columns
    );

    if caps.registry_id {
        left_join_columns(&mut summary, &registry, COL_ID_EMPRESA, &caps.registry_columns);
    }
    if caps.network_id {
        left_join_columns(&mut summary, &network, COL_ID_EMPRESA, &caps.network_columns);
    }

    clean_table(&mut summary);
    clean_table(&mut transactions);

    let companies = schema::company_records(&summary);
    let transaction_records = schema::transaction_records(&transactions);

    let dates = companies
        .iter()
        .filter_map(|r| r.dt_refe)
        .chain(transaction_records.iter().filter_map(|t| t.dt_refe));
    let calendar = calendar::build_calendar(dates)?;

    log::info!(
        "Unified table ready: {} company rows, {} transactions, {} calendar days",
        companies.len(),
        transaction_records.len(),
        calendar.len()
    );

    Ok(DashboardData {
        companies,
        transactions: transaction_records,
        calendar,
    })
}

/// Reads the four extracts from disk and runs the full pipeline.
pub fn load_dashboard_data(files: &InputFiles) -> Result<DashboardData> {
    let registry = read_spreadsheet(&files.registry)?;
    let transactions = read_spreadsheet(&files.transactions)?;
    let summary = read_delimited(&files.summary)?;
    let network = read_delimited(&files.network)?;
    build_dashboard_data(registry, transactions, summary, network)
}

/// SHA-256 over the concatenated bytes of the input file set. Any content
/// change yields a new fingerprint and therefore a cache miss.
pub fn fingerprint_inputs(files: &InputFiles) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in files.paths() {
        if !path.is_file() {
            return Err(crate::error::AnalyticsError::MissingInput(path.to_path_buf()));
        }
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(std::fs::read(path)?);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Explicit once-per-session cache around the load pipeline. Reuses the
/// prepared tables while the input files are unchanged; `invalidate` forces
/// the next load to recompute.
#[derive(Debug, Default)]
pub struct SessionCache {
    entry: Option<(String, DashboardData)>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, files: &InputFiles) -> Result<&DashboardData> {
        let fingerprint = fingerprint_inputs(files)?;

        let fresh = match &self.entry {
            Some((cached, _)) if *cached == fingerprint => {
                log::debug!("Session cache hit for {}", fingerprint);
                false
            }
            _ => true,
        };
        if fresh {
            log::info!("Session cache miss; loading input files");
            let data = load_dashboard_data(files)?;
            self.entry = Some((fingerprint, data));
        }

        // The entry was just checked or stored above.
        Ok(&self.entry.as_ref().unwrap().1)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }
}
