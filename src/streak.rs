//! Longest run of consecutive negative-cash-flow months per company.

use crate::aggregate::clamp_top_n;
use crate::calendar::month_key;
use crate::schema::CompanyRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Net cash flow per (company, month), months as chronologically ordered
/// columns with 0 substituted for missing combinations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowMatrix {
    pub companies: Vec<String>,
    pub months: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakEntry {
    pub id_empresa: String,
    pub streak_months: usize,
}

impl CashFlowMatrix {
    /// Sums `fluxo_caixa_liquido` per company and month over the given
    /// records. Rows without a reference date contribute nothing.
    pub fn from_records(records: &[CompanyRecord]) -> Self {
        let mut months: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut sums: BTreeMap<&str, HashMap<NaiveDate, f64>> = BTreeMap::new();
        for record in records {
            if let Some(date) = record.dt_refe {
                let month = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                months.insert(month);
                *sums
                    .entry(record.id_empresa.as_str())
                    .or_default()
                    .entry(month)
                    .or_insert(0.0) += record.fluxo_caixa_liquido;
            }
        }

        let ordered_months: Vec<NaiveDate> = months.into_iter().collect();
        let mut companies = Vec::with_capacity(sums.len());
        let mut values = Vec::with_capacity(sums.len());
        for (company, by_month) in sums {
            companies.push(company.to_string());
            values.push(
                ordered_months
                    .iter()
                    .map(|m| by_month.get(m).copied().unwrap_or(0.0))
                    .collect(),
            );
        }

        Self {
            companies,
            months: ordered_months.into_iter().map(month_key).collect(),
            values,
        }
    }

    /// Longest negative streak per company, in company order.
    pub fn negative_streaks(&self) -> Vec<StreakEntry> {
        self.companies
            .iter()
            .zip(&self.values)
            .map(|(company, row)| StreakEntry {
                id_empresa: company.clone(),
                streak_months: longest_negative_streak(row),
            })
            .collect()
    }

    /// The N longest streaks, re-sorted ascending for horizontal rendering.
    pub fn top_streaks(&self, n: usize) -> Vec<StreakEntry> {
        let mut streaks = self.negative_streaks();
        streaks.sort_by(|a, b| {
            b.streak_months
                .cmp(&a.streak_months)
                .then_with(|| a.id_empresa.cmp(&b.id_empresa))
        });
        streaks.truncate(clamp_top_n(n));
        streaks.reverse();
        streaks
    }
}

/// Longest run of strictly negative values in a single left-to-right pass.
/// The final comparison catches a streak that runs to the end of the row.
pub fn longest_negative_streak(values: &[f64]) -> usize {
    let mut streak = 0usize;
    let mut max_streak = 0usize;
    for &value in values {
        if value < 0.0 {
            streak += 1;
        } else {
            max_streak = max_streak.max(streak);
            streak = 0;
        }
    }
    max_streak.max(streak)
}
