// Per-page volume totals and the ranked summary table

use crate::config::AggregateConfig;
use keyplan_client::KeywordTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const POTENTIAL_TRAFFIC_RATE: f64 = 0.10;
pub const EST_SIGNUP_RATE: f64 = 0.04;
pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub page_type: String,
    pub search_volume: u64,
    pub potential_traffic: u64,
    pub est_signups: u64,
}

impl SummaryRow {
    /// Derive traffic and signups from an already totalled volume.
    /// Rounding is half-to-even.
    pub fn from_volume(page_type: impl Into<String>, search_volume: u64) -> Self {
        let potential_traffic = (search_volume as f64 * POTENTIAL_TRAFFIC_RATE).round_ties_even() as u64;
        let est_signups = (potential_traffic as f64 * EST_SIGNUP_RATE).round_ties_even() as u64;
        Self {
            page_type: page_type.into(),
            search_volume,
            potential_traffic,
            est_signups,
        }
    }
}

/// Page rows sorted by volume, plus the totals row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryRow,
}

impl SummaryTable {
    /// Page rows followed by the totals row.
    pub fn iter_with_totals(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().chain(std::iter::once(&self.totals))
    }

    pub fn page_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read a cell as a number. Numeric strings count, with `,` separators.
fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Total volume of one table using the first alias present as a column.
pub fn page_volume(table: &KeywordTable, volume_aliases: &[String]) -> u64 {
    let Some(column) = volume_aliases.iter().find(|alias| table.has_column(alias)) else {
        return 0;
    };

    let total: f64 = table
        .column_values(column)
        .map(|cell| cell.and_then(numeric_value).unwrap_or(0.0))
        .sum();

    if total > 0.0 { total.trunc() as u64 } else { 0 }
}

/// Build the summary table for the fetched pages.
///
/// Rows are sorted by volume descending; equal volumes keep input order.
pub fn aggregate(pages: &[(String, KeywordTable)], config: &AggregateConfig) -> SummaryTable {
    let mut rows: Vec<SummaryRow> = pages
        .iter()
        .map(|(page, table)| SummaryRow::from_volume(page.clone(), page_volume(table, &config.volume_aliases)))
        .collect();

    rows.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));

    let totals = SummaryRow {
        page_type: TOTAL_LABEL.to_string(),
        search_volume: rows.iter().map(|r| r.search_volume).sum(),
        potential_traffic: rows.iter().map(|r| r.potential_traffic).sum(),
        est_signups: rows.iter().map(|r| r.est_signups).sum(),
    };

    SummaryTable { rows, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> KeywordTable {
        KeywordTable::from_json(value).unwrap()
    }

    #[test]
    fn test_derived_metrics_round_half_to_even() {
        // 25 * 0.10 = 2.5 -> 2
        assert_eq!(SummaryRow::from_volume("a", 25).potential_traffic, 2);
        // 35 * 0.10 = 3.5 -> 4
        assert_eq!(SummaryRow::from_volume("a", 35).potential_traffic, 4);
        let row = SummaryRow::from_volume("a", 12_345);
        assert_eq!(row.potential_traffic, 1_234);
        assert_eq!(row.est_signups, 49);
    }

    #[test]
    fn test_page_volume_uses_alias_order() {
        let aliases = AggregateConfig::default().volume_aliases;
        let t = table(json!([
            {"Search Volume": 5, "search_volume": 1000},
            {"Search Volume": 7, "search_volume": 1000}
        ]));
        assert_eq!(page_volume(&t, &aliases), 12);
    }

    #[test]
    fn test_page_volume_alias_is_case_sensitive() {
        let aliases = AggregateConfig::default().volume_aliases;
        let t = table(json!([{"Volume": 100}]));
        assert_eq!(page_volume(&t, &aliases), 0);
    }

    #[test]
    fn test_page_volume_skips_bad_cells() {
        let aliases = AggregateConfig::default().volume_aliases;
        let t = table(json!([
            {"volume": 100},
            {"volume": null},
            {"volume": "n/a"},
            {"volume": "1,200"},
            {"keyword": "no volume key"},
            {"volume": 2.5}
        ]));
        assert_eq!(page_volume(&t, &aliases), 1302);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let summary = aggregate(&[], &AggregateConfig::default());
        assert!(summary.rows.is_empty());
        assert_eq!(summary.totals, SummaryRow {
            page_type: "Total".to_string(),
            search_volume: 0,
            potential_traffic: 0,
            est_signups: 0,
        });
    }
}
