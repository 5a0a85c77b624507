//! Per-company drill-down tables.
//!
//! Feeds the detail view: headline figures for the selected company, its
//! received×paid timeline, its raw transactions and the strongest edges of
//! its transaction network (the renderer draws them; here we only select).

use crate::aggregate::{monthly_pair_sum, Metric, MonthlyPair};
use crate::schema::{CompanyRecord, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Edge cap mirroring what the network renderer can display comfortably.
pub const DEFAULT_EDGE_LIMIT: usize = 200;

/// Headline figures of a selected company, from its first filtered row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub id_empresa: String,
    pub setor_cnae: String,
    pub momento_empresa: String,
    pub total_recebido: f64,
    pub total_pago: f64,
    pub fluxo_caixa_liquido: f64,
}

impl CompanySnapshot {
    pub fn from_records(id_empresa: &str, records: &[CompanyRecord]) -> Option<Self> {
        let record = records.iter().find(|r| r.id_empresa == id_empresa)?;
        Some(Self {
            id_empresa: record.id_empresa.clone(),
            setor_cnae: record.setor_cnae.clone(),
            momento_empresa: record.momento_empresa.clone(),
            total_recebido: record.total_recebido,
            total_pago: record.total_pago,
            fluxo_caixa_liquido: record.fluxo_caixa_liquido,
        })
    }
}

/// One directed transaction edge, heaviest first in [`top_edges`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub origem: String,
    pub destino: String,
    pub valor: f64,
}

/// Received×paid per month for one company, chronologically ordered.
/// Computed over the full (unfiltered) table so the timeline shows the
/// whole history.
pub fn monthly_timeline(records: &[CompanyRecord], id_empresa: &str) -> Vec<MonthlyPair> {
    let company_rows: Vec<CompanyRecord> = records
        .iter()
        .filter(|r| r.id_empresa == id_empresa)
        .cloned()
        .collect();
    monthly_pair_sum(&company_rows, Metric::TotalRecebido, Metric::TotalPago)
}

/// Every transaction where the company pays or receives.
pub fn transactions_for(
    transactions: &[TransactionRecord],
    id_empresa: &str,
) -> Vec<TransactionRecord> {
    transactions
        .iter()
        .filter(|t| t.involves(id_empresa))
        .cloned()
        .collect()
}

/// The `limit` largest-by-value transaction edges touching the company,
/// descending by value.
pub fn top_edges(
    transactions: &[TransactionRecord],
    id_empresa: &str,
    limit: usize,
) -> Vec<NetworkEdge> {
    let mut edges: Vec<NetworkEdge> = transactions
        .iter()
        .filter(|t| t.involves(id_empresa))
        .map(|t| NetworkEdge {
            origem: t.id_pgto.clone(),
            destino: t.id_rcbe.clone(),
            valor: t.vl,
        })
        .collect();
    edges.sort_by(|a, b| {
        b.valor
            .partial_cmp(&a.valor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    edges.truncate(limit);
    edges
}
