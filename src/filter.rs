//! Copy-on-filter views over the loaded data.
//!
//! The unified table is immutable for the whole session; applying a filter
//! always allocates fresh vectors.

use crate::loader::DashboardData;
use crate::schema::{CompanyRecord, TransactionRecord};
use serde::{Deserialize, Serialize};

/// The global filter state: sector, lifecycle stage and a set of `MM/YYYY`
/// buckets. `None`/empty means "all".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub setor: Option<String>,
    pub momento: Option<String>,
    pub meses: Vec<String>,
}

/// Filtered copies of the company and transaction tables.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    pub companies: Vec<CompanyRecord>,
    pub transactions: Vec<TransactionRecord>,
}

impl FilterSelection {
    pub fn is_unrestricted(&self) -> bool {
        self.setor.is_none() && self.momento.is_none() && self.meses.is_empty()
    }

    fn month_matches(&self, key: Option<String>) -> bool {
        if self.meses.is_empty() {
            return true;
        }
        match key {
            Some(key) => self.meses.iter().any(|m| *m == key),
            None => false,
        }
    }

    pub fn matches_company(&self, record: &CompanyRecord) -> bool {
        if let Some(setor) = &self.setor {
            if record.setor_cnae != *setor {
                return false;
            }
        }
        if let Some(momento) = &self.momento {
            if record.momento_empresa != *momento {
                return false;
            }
        }
        self.month_matches(record.month_key())
    }

    /// Transactions only carry a date, so the month buckets are the only
    /// filter that applies to them.
    pub fn matches_transaction(&self, record: &TransactionRecord) -> bool {
        self.month_matches(record.month_key())
    }

    pub fn apply(&self, data: &DashboardData) -> FilteredView {
        FilteredView {
            companies: data
                .companies
                .iter()
                .filter(|r| self.matches_company(r))
                .cloned()
                .collect(),
            transactions: data
                .transactions
                .iter()
                .filter(|t| self.matches_transaction(t))
                .cloned()
                .collect(),
        }
    }
}

/// Distinct sorted sector labels, for the filter option list.
pub fn sector_options(records: &[CompanyRecord]) -> Vec<String> {
    let mut options: Vec<String> = records.iter().map(|r| r.setor_cnae.clone()).collect();
    options.sort();
    options.dedup();
    options
}

/// Distinct sorted lifecycle labels, for the filter option list.
pub fn stage_options(records: &[CompanyRecord]) -> Vec<String> {
    let mut options: Vec<String> = records.iter().map(|r| r.momento_empresa.clone()).collect();
    options.sort();
    options.dedup();
    options
}
