//! Filtered-view export as delimited text.
//!
//! The export mirrors the input convention of the text extracts: `;`
//! separator, comma decimals, UTF-8. It is a pass-through of the in-memory
//! filtered view, no schema transformation.

use crate::clean::format_number;
use crate::error::Result;
use crate::ingestion::DELIMITER;
use crate::schema::CompanyRecord;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;

const EXPORT_HEADERS: &[&str] = &[
    "id_empresa",
    "setor_cnae",
    "momento_empresa",
    "DT_REFE",
    "DT_ABRT",
    "total_recebido",
    "total_pago",
    "fluxo_caixa_liquido",
    "num_transacoes_recebidas",
    "num_transacoes_pagas",
    "num_clientes_unicos",
    "num_fornecedores_unicos",
    "ticket_medio_recebido",
    "ticket_medio_pago",
    "faturamento",
    "Centralidade_de_Conexoes",
    "Centralidade_de_Recebimentos",
    "Centralidade_de_Pagamentos",
    "Centralidade_de_Ponte",
    "Grupo_Empresas",
];

fn decimal_comma(value: f64) -> String {
    format_number(value).replace('.', ",")
}

fn date_field(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Serializes the filtered company table to `;`-separated, comma-decimal
/// text.
pub fn write_filtered_csv<W: Write>(writer: W, records: &[CompanyRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        let row: [String; 20] = [
            record.id_empresa.clone(),
            record.setor_cnae.clone(),
            record.momento_empresa.clone(),
            date_field(record.dt_refe),
            date_field(record.dt_abrt),
            decimal_comma(record.total_recebido),
            decimal_comma(record.total_pago),
            decimal_comma(record.fluxo_caixa_liquido),
            decimal_comma(record.num_transacoes_recebidas),
            decimal_comma(record.num_transacoes_pagas),
            decimal_comma(record.num_clientes_unicos),
            decimal_comma(record.num_fornecedores_unicos),
            decimal_comma(record.ticket_medio_recebido),
            decimal_comma(record.ticket_medio_pago),
            decimal_comma(record.faturamento),
            decimal_comma(record.centralidade_conexoes),
            decimal_comma(record.centralidade_recebimentos),
            decimal_comma(record.centralidade_pagamentos),
            decimal_comma(record.centralidade_ponte),
            record.grupo_empresas.clone().unwrap_or_default(),
        ];
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the filtered view to a file, the download-button path.
pub fn export_to_path(path: &Path, records: &[CompanyRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_filtered_csv(file, records)?;
    log::info!(
        "Exported {} filtered rows to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
