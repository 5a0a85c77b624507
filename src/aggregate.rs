//! Chart-table preparation over the unified table.
//!
//! Every function here is pure: it takes a (possibly pre-filtered) slice of
//! records and allocates a fresh output table. Empty input yields an empty
//! result, never an error, so a view over a degenerate filter simply renders
//! nothing.

use crate::calendar::month_key;
use crate::schema::{CompanyRecord, LifecycleStage, TransactionRecord};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Bounds for the top-N slider.
pub const TOP_N_MIN: usize = 3;
pub const TOP_N_MAX: usize = 20;

/// Numeric field of the unified table selected for an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    TotalRecebido,
    TotalPago,
    FluxoCaixaLiquido,
    NumTransacoesRecebidas,
    NumTransacoesPagas,
    NumClientesUnicos,
    NumFornecedoresUnicos,
    TicketMedioRecebido,
    TicketMedioPago,
    Faturamento,
}

impl Metric {
    pub fn value(&self, record: &CompanyRecord) -> f64 {
        match self {
            Metric::TotalRecebido => record.total_recebido,
            Metric::TotalPago => record.total_pago,
            Metric::FluxoCaixaLiquido => record.fluxo_caixa_liquido,
            Metric::NumTransacoesRecebidas => record.num_transacoes_recebidas,
            Metric::NumTransacoesPagas => record.num_transacoes_pagas,
            Metric::NumClientesUnicos => record.num_clientes_unicos,
            Metric::NumFornecedoresUnicos => record.num_fornecedores_unicos,
            Metric::TicketMedioRecebido => record.ticket_medio_recebido,
            Metric::TicketMedioPago => record.ticket_medio_pago,
            Metric::Faturamento => record.faturamento,
        }
    }
}

/// Grouping dimension for rankings and pivots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Empresa,
    Setor,
}

impl Dimension {
    pub fn key<'a>(&self, record: &'a CompanyRecord) -> &'a str {
        match self {
            Dimension::Empresa => &record.id_empresa,
            Dimension::Setor => &record.setor_cnae,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    pub mes_ano: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPair {
    pub mes_ano: String,
    pub first: f64,
    pub second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRatio {
    pub mes_ano: String,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyChange {
    pub mes_ano: String,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedValue {
    pub label: String,
    pub value: f64,
}

/// One entity's value in the latest month alongside its month-over-month
/// delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDelta {
    pub label: String,
    pub last_value: f64,
    pub delta: f64,
}

/// Entity × month pivot with months as chronologically ordered columns and
/// missing combinations filled with 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub months: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub label: String,
    pub values: Vec<f64>,
    /// Difference between the two most recent month columns.
    pub delta: f64,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub fn clamp_top_n(n: usize) -> usize {
    n.clamp(TOP_N_MIN, TOP_N_MAX)
}

fn count_by<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    result
}

/// Companies per lifecycle stage, descending by count.
pub fn count_by_stage(records: &[CompanyRecord]) -> Vec<CategoryCount> {
    count_by(records.iter().map(|r| r.momento_empresa.as_str()))
}

/// Companies per sector, descending by count.
pub fn count_by_sector(records: &[CompanyRecord]) -> Vec<CategoryCount> {
    count_by(records.iter().map(|r| r.setor_cnae.as_str()))
}

/// Top-N sectors by company count, re-sorted ascending for horizontal bars.
pub fn top_sectors_by_count(records: &[CompanyRecord], top_n: usize) -> Vec<CategoryCount> {
    let mut counts = count_by_sector(records);
    counts.truncate(clamp_top_n(top_n));
    counts.reverse();
    counts
}

fn monthly_groups(records: &[CompanyRecord]) -> BTreeMap<NaiveDate, Vec<&CompanyRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&CompanyRecord>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.dt_refe {
            groups.entry(first_of_month(date)).or_default().push(record);
        }
    }
    groups
}

/// Monthly sum of one metric, chronologically ordered.
pub fn monthly_sum(records: &[CompanyRecord], metric: Metric) -> Vec<MonthlyValue> {
    monthly_groups(records)
        .into_iter()
        .map(|(month, group)| MonthlyValue {
            mes_ano: month_key(month),
            value: group.iter().map(|r| metric.value(r)).sum(),
        })
        .collect()
}

/// Monthly sums of two metrics side by side (e.g. received vs paid).
pub fn monthly_pair_sum(
    records: &[CompanyRecord],
    first: Metric,
    second: Metric,
) -> Vec<MonthlyPair> {
    monthly_groups(records)
        .into_iter()
        .map(|(month, group)| MonthlyPair {
            mes_ano: month_key(month),
            first: group.iter().map(|r| first.value(r)).sum(),
            second: group.iter().map(|r| second.value(r)).sum(),
        })
        .collect()
}

/// Monthly means of two metrics side by side (e.g. average tickets).
pub fn monthly_pair_mean(
    records: &[CompanyRecord],
    first: Metric,
    second: Metric,
) -> Vec<MonthlyPair> {
    monthly_groups(records)
        .into_iter()
        .map(|(month, group)| {
            let n = group.len() as f64;
            MonthlyPair {
                mes_ano: month_key(month),
                first: group.iter().map(|r| first.value(r)).sum::<f64>() / n,
                second: group.iter().map(|r| second.value(r)).sum::<f64>() / n,
            }
        })
        .collect()
}

/// Monthly ratio of two summed metrics. A zero denominator leaves the ratio
/// undefined, plotted as a gap.
pub fn monthly_ratio(
    records: &[CompanyRecord],
    numerator: Metric,
    denominator: Metric,
) -> Vec<MonthlyRatio> {
    monthly_groups(records)
        .into_iter()
        .map(|(month, group)| {
            let num: f64 = group.iter().map(|r| numerator.value(r)).sum();
            let den: f64 = group.iter().map(|r| denominator.value(r)).sum();
            MonthlyRatio {
                mes_ano: month_key(month),
                ratio: if den == 0.0 { None } else { Some(num / den) },
            }
        })
        .collect()
}

/// Sums a metric per dimension key, takes the N largest, then re-sorts
/// ascending so the largest value lands farthest from the bar origin.
pub fn top_n(
    records: &[CompanyRecord],
    dimension: Dimension,
    metric: Metric,
    top_n: usize,
) -> Vec<RankedValue> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *sums.entry(dimension.key(record)).or_insert(0.0) += metric.value(record);
    }

    let mut ranked: Vec<RankedValue> = sums
        .into_iter()
        .map(|(label, value)| RankedValue {
            label: label.to_string(),
            value,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    ranked.truncate(clamp_top_n(top_n));
    ranked.reverse();
    ranked
}

/// Standard percent change over a series: `(curr - prev) / prev * 100` with
/// a lag of `periods`. The first `periods` entries are undefined, as is any
/// entry whose reference value is zero.
pub fn percent_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            if idx < periods {
                return None;
            }
            let prev = values[idx - periods];
            if prev == 0.0 {
                None
            } else {
                Some((value - prev) / prev * 100.0)
            }
        })
        .collect()
}

/// Month-over-month (or, with `periods = 3`, quarter-over-quarter) percent
/// change of a summed metric.
pub fn monthly_percent_change(
    records: &[CompanyRecord],
    metric: Metric,
    periods: usize,
) -> Vec<MonthlyChange> {
    let series = monthly_sum(records, metric);
    let values: Vec<f64> = series.iter().map(|v| v.value).collect();
    series
        .into_iter()
        .zip(percent_change(&values, periods))
        .map(|(point, change_pct)| MonthlyChange {
            mes_ano: point.mes_ano,
            change_pct,
        })
        .collect()
}

/// Pivots (entity, month) sums into chronologically ordered month columns,
/// filling missing combinations with 0 and attaching the trailing delta.
/// Fewer than two month columns yields an empty pivot; a single month has
/// no trailing comparison.
pub fn pivot_with_trailing_delta(
    records: &[CompanyRecord],
    dimension: Dimension,
    metric: Metric,
) -> PivotTable {
    let mut months: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut sums: HashMap<&str, HashMap<NaiveDate, f64>> = HashMap::new();
    for record in records {
        if let Some(date) = record.dt_refe {
            let month = first_of_month(date);
            months.insert(month);
            *sums
                .entry(dimension.key(record))
                .or_default()
                .entry(month)
                .or_insert(0.0) += metric.value(record);
        }
    }
    if months.len() < 2 {
        return PivotTable::default();
    }

    let ordered_months: Vec<NaiveDate> = months.into_iter().collect();
    let mut rows: Vec<PivotRow> = sums
        .into_iter()
        .map(|(label, by_month)| {
            let values: Vec<f64> = ordered_months
                .iter()
                .map(|m| by_month.get(m).copied().unwrap_or(0.0))
                .collect();
            let delta = values[values.len() - 1] - values[values.len() - 2];
            PivotRow {
                label: label.to_string(),
                values,
                delta,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label));

    PivotTable {
        months: ordered_months.into_iter().map(month_key).collect(),
        rows,
    }
}

/// Entities with the largest percent growth between the two most recent
/// months, N largest re-sorted ascending. Undefined growth (zero reference
/// month) is excluded.
pub fn top_month_over_month_growth(
    records: &[CompanyRecord],
    dimension: Dimension,
    metric: Metric,
    n: usize,
) -> Vec<RankedValue> {
    let pivot = pivot_with_trailing_delta(records, dimension, metric);
    let mut growth: Vec<RankedValue> = pivot
        .rows
        .into_iter()
        .filter_map(|row| {
            let len = row.values.len();
            let prev = row.values[len - 2];
            if prev == 0.0 {
                return None;
            }
            Some(RankedValue {
                label: row.label,
                value: (row.values[len - 1] - prev) / prev * 100.0,
            })
        })
        .collect();
    growth.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    growth.truncate(clamp_top_n(n));
    growth.reverse();
    growth
}

/// Entities whose metric dropped the most between the two most recent
/// months: the N smallest trailing deltas, most negative first.
pub fn largest_drops(
    records: &[CompanyRecord],
    dimension: Dimension,
    metric: Metric,
    n: usize,
) -> Vec<RankedDelta> {
    let pivot = pivot_with_trailing_delta(records, dimension, metric);
    let mut drops: Vec<RankedDelta> = pivot
        .rows
        .into_iter()
        .map(|row| RankedDelta {
            label: row.label,
            last_value: *row.values.last().unwrap_or(&0.0),
            delta: row.delta,
        })
        .collect();
    drops.sort_by(|a, b| {
        a.delta
            .partial_cmp(&b.delta)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    drops.truncate(clamp_top_n(n));
    drops
}

/// Transaction value summed per transaction-type label, descending.
pub fn sum_by_transaction_type(transactions: &[TransactionRecord]) -> Vec<RankedValue> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for transaction in transactions {
        *sums.entry(transaction.ds_tran.as_str()).or_insert(0.0) += transaction.vl;
    }
    let mut result: Vec<RankedValue> = sums
        .into_iter()
        .map(|(label, value)| RankedValue {
            label: label.to_string(),
            value,
        })
        .collect();
    result.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    result
}

/// Headline figures for the sidebar, computed over the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalKpis {
    pub total_recebido: f64,
    pub total_pago: f64,
    pub saldo_caixa: f64,
    pub transacoes_recebidas: f64,
    pub transacoes_pagas: f64,
    pub empresas_unicas: usize,
    pub setores_unicos: usize,
    pub empresas_inicio: usize,
    pub empresas_maturidade: usize,
    pub empresas_expansao: usize,
    pub empresas_declinio: usize,
}

impl GlobalKpis {
    pub fn compute(records: &[CompanyRecord]) -> Self {
        let mut kpis = GlobalKpis::default();
        let mut empresas: std::collections::HashSet<&str> = std::collections::HashSet::new();
        let mut setores: std::collections::HashSet<&str> = std::collections::HashSet::new();

        for record in records {
            kpis.total_recebido += record.total_recebido;
            kpis.total_pago += record.total_pago;
            kpis.transacoes_recebidas += record.num_transacoes_recebidas;
            kpis.transacoes_pagas += record.num_transacoes_pagas;
            empresas.insert(&record.id_empresa);
            setores.insert(&record.setor_cnae);
            match record.stage() {
                LifecycleStage::Inicio => kpis.empresas_inicio += 1,
                LifecycleStage::Maturidade => kpis.empresas_maturidade += 1,
                LifecycleStage::Expansao => kpis.empresas_expansao += 1,
                LifecycleStage::Declinio => kpis.empresas_declinio += 1,
                LifecycleStage::Desconhecido => {}
            }
        }

        kpis.saldo_caixa = kpis.total_recebido - kpis.total_pago;
        kpis.empresas_unicas = empresas.len();
        kpis.setores_unicos = setores.len();
        kpis
    }
}
