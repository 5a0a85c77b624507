//! Canonical column names, schema capabilities and the typed data model.
//!
//! The raw extracts arrive with inconsistent headers and optional columns.
//! Everything downstream speaks the canonical names declared here, and the
//! set of optional fields actually present is determined once up front via
//! [`SchemaCapabilities`] instead of re-querying table structure at every
//! step.

use crate::clean;
use crate::table::RawTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Generic identifier header found in some extracts, unified on load.
pub const GENERIC_ID: &str = "ID";
/// Canonical company-identifier column.
pub const COL_ID_EMPRESA: &str = "id_empresa";

pub const COL_DT_REFE: &str = "DT_REFE";
pub const COL_DT_ABRT: &str = "DT_ABRT";
pub const COL_SETOR: &str = "setor_cnae";
pub const COL_MOMENTO: &str = "momento_empresa";
pub const COL_GRUPO: &str = "Grupo_Empresas";

pub const COL_ID_PGTO: &str = "ID_PGTO";
pub const COL_ID_RCBE: &str = "ID_RCBE";
pub const COL_VL: &str = "VL";
pub const COL_DS_TRAN: &str = "DS_TRAN";

/// Date columns parsed by the cleaning pass.
pub const DATE_COLUMNS: &[&str] = &[COL_DT_ABRT, COL_DT_REFE];

/// Categorical text columns normalized to trimmed uppercase, `N/A` when
/// missing.
pub const CATEGORICAL_COLUMNS: &[&str] = &[COL_SETOR, COL_MOMENTO, COL_DS_TRAN];

/// Numeric columns coerced to floating point, `0` on failure.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "total_recebido",
    "num_transacoes_recebidas",
    "num_clientes_unicos",
    "total_pago",
    "num_transacoes_pagas",
    "num_fornecedores_unicos",
    "fluxo_caixa_liquido",
    "ticket_medio_recebido",
    "ticket_medio_pago",
    "faturamento",
    "Centralidade_de_Conexoes",
    "Centralidade_de_Recebimentos",
    "Centralidade_de_Pagamentos",
    "Centralidade_de_Ponte",
    COL_VL,
];

/// Columns joined in from the network-metrics extract when present.
pub const NETWORK_JOIN_COLUMNS: &[&str] = &[
    "Centralidade_de_Conexoes",
    "Centralidade_de_Recebimentos",
    "Centralidade_de_Pagamentos",
    "Centralidade_de_Ponte",
    COL_GRUPO,
];

/// Columns joined in from the company-registry extract when present.
pub const REGISTRY_JOIN_COLUMNS: &[&str] = &[COL_DT_REFE, COL_DT_ABRT];

/// The set of optional fields actually available across the raw extracts,
/// detected once after header normalization. Join and cleaning steps consult
/// this instead of probing table structure repeatedly.
#[derive(Debug, Clone, Default)]
pub struct SchemaCapabilities {
    /// Registry extract carries the company identifier.
    pub registry_id: bool,
    /// Registry columns (besides the identifier) eligible for joining.
    pub registry_columns: Vec<&'static str>,
    /// Network extract carries the company identifier.
    pub network_id: bool,
    /// Network columns (besides the identifier) eligible for joining.
    pub network_columns: Vec<&'static str>,
    /// Transactions extract carries a reference date.
    pub transaction_dates: bool,
}

impl SchemaCapabilities {
    pub fn detect(registry: &RawTable, transactions: &RawTable, network: &RawTable) -> Self {
        let registry_id = registry.has_column(COL_ID_EMPRESA);
        let network_id = network.has_column(COL_ID_EMPRESA);

        let registry_columns = REGISTRY_JOIN_COLUMNS
            .iter()
            .copied()
            .filter(|c| registry.has_column(c))
            .collect();
        let network_columns = NETWORK_JOIN_COLUMNS
            .iter()
            .copied()
            .filter(|c| network.has_column(c))
            .collect();

        Self {
            registry_id,
            registry_columns,
            network_id,
            network_columns,
            transaction_dates: transactions.has_column(COL_DT_REFE),
        }
    }
}

/// Lifecycle stage of a company, parsed from the normalized
/// `momento_empresa` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleStage {
    Inicio,
    Maturidade,
    Expansao,
    Declinio,
    Desconhecido,
}

impl LifecycleStage {
    pub const KNOWN: [LifecycleStage; 4] = [
        LifecycleStage::Inicio,
        LifecycleStage::Maturidade,
        LifecycleStage::Expansao,
        LifecycleStage::Declinio,
    ];

    /// Expects an already-normalized (trimmed, uppercase) label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "INÍCIO" => LifecycleStage::Inicio,
            "MATURIDADE" => LifecycleStage::Maturidade,
            "EXPANSÃO" => LifecycleStage::Expansao,
            "DECLÍNIO" => LifecycleStage::Declinio,
            _ => LifecycleStage::Desconhecido,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleStage::Inicio => "INÍCIO",
            LifecycleStage::Maturidade => "MATURIDADE",
            LifecycleStage::Expansao => "EXPANSÃO",
            LifecycleStage::Declinio => "DECLÍNIO",
            LifecycleStage::Desconhecido => "N/A",
        }
    }
}

/// One row of the unified table: a company in a given reference month.
///
/// Numeric fields are always populated (0 when the source was missing or
/// malformed); dates and network fields stay optional. The precomputed
/// `fluxo_caixa_liquido` is carried as-is, never recomputed from
/// received/paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id_empresa: String,
    pub setor_cnae: String,
    pub momento_empresa: String,
    pub dt_refe: Option<NaiveDate>,
    pub dt_abrt: Option<NaiveDate>,
    pub total_recebido: f64,
    pub total_pago: f64,
    pub fluxo_caixa_liquido: f64,
    pub num_transacoes_recebidas: f64,
    pub num_transacoes_pagas: f64,
    pub num_clientes_unicos: f64,
    pub num_fornecedores_unicos: f64,
    pub ticket_medio_recebido: f64,
    pub ticket_medio_pago: f64,
    pub faturamento: f64,
    pub centralidade_conexoes: f64,
    pub centralidade_recebimentos: f64,
    pub centralidade_pagamentos: f64,
    pub centralidade_ponte: f64,
    pub grupo_empresas: Option<String>,
}

impl CompanyRecord {
    pub fn stage(&self) -> LifecycleStage {
        LifecycleStage::from_label(&self.momento_empresa)
    }

    /// `MM/YYYY` bucket of the reference date, when one exists.
    pub fn month_key(&self) -> Option<String> {
        self.dt_refe.map(crate::calendar::month_key)
    }
}

/// One raw transaction between a payer and a receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id_pgto: String,
    pub id_rcbe: String,
    pub dt_refe: Option<NaiveDate>,
    pub vl: f64,
    pub ds_tran: String,
}

impl TransactionRecord {
    pub fn month_key(&self) -> Option<String> {
        self.dt_refe.map(crate::calendar::month_key)
    }

    pub fn involves(&self, id_empresa: &str) -> bool {
        self.id_pgto == id_empresa || self.id_rcbe == id_empresa
    }
}

fn date_cell(table: &RawTable, row: &[String], column: &str) -> Option<NaiveDate> {
    clean::parse_date(table.cell(row, column))
}

fn numeric_cell(table: &RawTable, row: &[String], column: &str) -> f64 {
    clean::parse_number(table.cell(row, column)).unwrap_or(0.0)
}

fn optional_cell(table: &RawTable, row: &[String], column: &str) -> Option<String> {
    let value = table.cell(row, column).trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Builds the typed unified table from the cleaned, joined raw table.
pub fn company_records(table: &RawTable) -> Vec<CompanyRecord> {
    table
        .rows
        .iter()
        .map(|row| CompanyRecord {
            id_empresa: table.cell(row, COL_ID_EMPRESA).trim().to_string(),
            setor_cnae: clean::normalize_category(table.cell(row, COL_SETOR)),
            momento_empresa: clean::normalize_category(table.cell(row, COL_MOMENTO)),
            dt_refe: date_cell(table, row, COL_DT_REFE),
            dt_abrt: date_cell(table, row, COL_DT_ABRT),
            total_recebido: numeric_cell(table, row, "total_recebido"),
            total_pago: numeric_cell(table, row, "total_pago"),
            fluxo_caixa_liquido: numeric_cell(table, row, "fluxo_caixa_liquido"),
            num_transacoes_recebidas: numeric_cell(table, row, "num_transacoes_recebidas"),
            num_transacoes_pagas: numeric_cell(table, row, "num_transacoes_pagas"),
            num_clientes_unicos: numeric_cell(table, row, "num_clientes_unicos"),
            num_fornecedores_unicos: numeric_cell(table, row, "num_fornecedores_unicos"),
            ticket_medio_recebido: numeric_cell(table, row, "ticket_medio_recebido"),
            ticket_medio_pago: numeric_cell(table, row, "ticket_medio_pago"),
            faturamento: numeric_cell(table, row, "faturamento"),
            centralidade_conexoes: numeric_cell(table, row, "Centralidade_de_Conexoes"),
            centralidade_recebimentos: numeric_cell(table, row, "Centralidade_de_Recebimentos"),
            centralidade_pagamentos: numeric_cell(table, row, "Centralidade_de_Pagamentos"),
            centralidade_ponte: numeric_cell(table, row, "Centralidade_de_Ponte"),
            grupo_empresas: optional_cell(table, row, COL_GRUPO),
        })
        .collect()
}

/// Builds the typed transaction list from the cleaned transactions table.
pub fn transaction_records(table: &RawTable) -> Vec<TransactionRecord> {
    table
        .rows
        .iter()
        .map(|row| TransactionRecord {
            id_pgto: table.cell(row, COL_ID_PGTO).trim().to_string(),
            id_rcbe: table.cell(row, COL_ID_RCBE).trim().to_string(),
            dt_refe: date_cell(table, row, COL_DT_REFE),
            vl: numeric_cell(table, row, COL_VL),
            ds_tran: clean::normalize_category(table.cell(row, COL_DS_TRAN)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_round_trip() {
        for stage in LifecycleStage::KNOWN {
            assert_eq!(LifecycleStage::from_label(stage.label()), stage);
        }
        assert_eq!(
            LifecycleStage::from_label("QUALQUER COISA"),
            LifecycleStage::Desconhecido
        );
    }

    #[test]
    fn test_capabilities_detect_optional_columns() {
        let registry = RawTable::with_headers(
            "registry",
            vec![COL_ID_EMPRESA.to_string(), COL_DT_REFE.to_string()],
        );
        let transactions =
            RawTable::with_headers("transactions", vec![COL_ID_PGTO.to_string()]);
        let network = RawTable::with_headers(
            "network",
            vec![
                COL_ID_EMPRESA.to_string(),
                "Centralidade_de_Ponte".to_string(),
            ],
        );

        let caps = SchemaCapabilities::detect(&registry, &transactions, &network);
        assert!(caps.registry_id);
        assert_eq!(caps.registry_columns, vec![COL_DT_REFE]);
        assert!(caps.network_id);
        assert_eq!(caps.network_columns, vec!["Centralidade_de_Ponte"]);
        assert!(!caps.transaction_dates);
    }

    #[test]
    fn test_company_records_defaults() {
        let mut table = RawTable::with_headers(
            "main",
            vec![
                COL_ID_EMPRESA.to_string(),
                COL_MOMENTO.to_string(),
                "total_recebido".to_string(),
            ],
        );
        table.push_row(vec![
            "42".to_string(),
            "EXPANSÃO".to_string(),
            "100.5".to_string(),
        ]);
        table.push_row(vec!["43".to_string(), String::new(), "abc".to_string()]);

        let records = company_records(&table);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stage(), LifecycleStage::Expansao);
        assert_eq!(records[0].total_recebido, 100.5);
        // Malformed numeric and missing stage degrade, never fail.
        assert_eq!(records[1].momento_empresa, "N/A");
        assert_eq!(records[1].total_recebido, 0.0);
        assert_eq!(records[1].total_pago, 0.0);
        assert!(records[1].dt_refe.is_none());
    }
}
