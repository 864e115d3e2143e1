//! Tabular export of a selection.
//!
//! The rows carry spreadsheet column names through serde renames, so any
//! serde-based writer (CSV, JSON) produces the familiar headers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::bill::{GRAND_TOTAL_LABEL, HOUSING_LABEL, INSURANCE_LABEL, UTILITY_LABEL};
use crate::selection::Selection;

/// One included line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    #[serde(rename = "Период")]
    pub period: String,
    #[serde(rename = "Категория")]
    pub category: String,
    #[serde(rename = "Услуга")]
    pub name: String,
    #[serde(rename = "Объем")]
    pub volume: Decimal,
    #[serde(rename = "Ед.изм.")]
    pub unit: String,
    #[serde(rename = "Тариф")]
    pub tariff: Decimal,
    #[serde(rename = "Сумма")]
    pub total: Decimal,
}

/// Per-document summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRow {
    #[serde(rename = "Период")]
    pub period: String,
    #[serde(rename = "Лицевой счет")]
    pub account_id: String,
    #[serde(rename = "Жилищные услуги")]
    pub housing_total: Decimal,
    #[serde(rename = "Коммунальные услуги")]
    pub utility_total: Decimal,
    #[serde(rename = "Страхование")]
    pub insurance: Decimal,
    #[serde(rename = "Итого")]
    pub grand_total: Decimal,
}

/// Statistics of one numeric column across documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRow {
    #[serde(rename = "Категория")]
    pub category: String,
    #[serde(rename = "Сумма за все периоды")]
    pub total: Decimal,
    #[serde(rename = "Среднее за период")]
    pub mean: Decimal,
    #[serde(rename = "Минимум")]
    pub min: Decimal,
    #[serde(rename = "Максимум")]
    pub max: Decimal,
}

/// Destination for exported tables.
pub trait ExportSink {
    /// Write the included line items.
    fn write_items(&mut self, rows: &[ItemRow]) -> Result<()>;

    /// Write one summary row per document.
    fn write_documents(&mut self, rows: &[DocumentRow]) -> Result<()>;

    /// Write column statistics.
    fn write_statistics(&mut self, rows: &[StatisticsRow]) -> Result<()>;
}

/// Rows for the included items, in load order.
pub fn item_rows(selection: &Selection) -> Vec<ItemRow> {
    selection
        .items()
        .filter(|(_, _, included)| *included)
        .filter_map(|(item_ref, item, _)| {
            let record = selection.document(item_ref.document)?;
            Some(ItemRow {
                period: selection.period_label(record).to_string(),
                category: item_ref.category.short_label().to_string(),
                name: item.name.clone(),
                volume: item.volume,
                unit: item.unit.clone(),
                tariff: item.tariff,
                total: item.total,
            })
        })
        .collect()
}

/// One summary row per loaded document, from its extracted totals.
pub fn document_rows(selection: &Selection) -> Vec<DocumentRow> {
    selection
        .documents()
        .map(|record| {
            let totals = &record.category_totals;
            DocumentRow {
                period: selection.period_label(record).to_string(),
                account_id: record
                    .account_id
                    .clone()
                    .unwrap_or_else(|| selection.unknown_period_label().to_string()),
                housing_total: totals.housing,
                utility_total: totals.utility,
                insurance: totals.insurance.unwrap_or(Decimal::ZERO),
                grand_total: totals.grand_total,
            }
        })
        .collect()
}

/// Sum, mean, minimum and maximum of each numeric document column.
pub fn statistics(rows: &[DocumentRow]) -> Vec<StatisticsRow> {
    if rows.is_empty() {
        return Vec::new();
    }

    let columns: [(&str, fn(&DocumentRow) -> Decimal); 4] = [
        (HOUSING_LABEL, |r| r.housing_total),
        (UTILITY_LABEL, |r| r.utility_total),
        (INSURANCE_LABEL, |r| r.insurance),
        (GRAND_TOTAL_LABEL, |r| r.grand_total),
    ];

    columns
        .iter()
        .map(|(label, value)| {
            let values: Vec<Decimal> = rows.iter().map(value).collect();
            let total: Decimal = values.iter().sum();
            let count = Decimal::from(values.len());

            StatisticsRow {
                category: label.to_string(),
                total,
                mean: (total / count).round_dp(2),
                min: values.iter().copied().min().unwrap_or_default(),
                max: values.iter().copied().max().unwrap_or_default(),
            }
        })
        .collect()
}

/// Write item, document and statistics tables of a selection to a sink.
pub fn export_selection<S: ExportSink + ?Sized>(selection: &Selection, sink: &mut S) -> Result<()> {
    let items = item_rows(selection);
    let documents = document_rows(selection);
    let stats = statistics(&documents);

    tracing::info!(
        "Exporting {} items from {} documents",
        items.len(),
        documents.len()
    );

    sink.write_items(&items)?;
    sink.write_documents(&documents)?;
    sink.write_statistics(&stats)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bill::{DocumentRecord, LineItem, ServiceCategory};
    use crate::selection::ItemRef;
    use pretty_assertions::assert_eq;

    fn item(name: &str, total: i64) -> LineItem {
        LineItem {
            name: name.to_string(),
            volume: Decimal::new(2, 0),
            unit: "куб. м.".to_string(),
            tariff: Decimal::new(total / 2, 2),
            total: Decimal::new(total, 2),
        }
    }

    fn selection() -> Selection {
        let mut selection = Selection::new();
        selection.load(
            DocumentRecord {
                period: Some("Март 2024".to_string()),
                account_id: Some("123".to_string()),
                housing_items: vec![item("Содержание жилья", 10000)],
                utility_items: vec![item("Холодное водоснабжение", 5000)],
                insurance_amount: Some(Decimal::new(3000, 2)),
                ..DocumentRecord::default()
            }
            .finalize(),
        );
        selection.load(
            DocumentRecord {
                housing_items: vec![item("Содержание жилья", 20000)],
                ..DocumentRecord::default()
            }
            .finalize(),
        );
        selection
    }

    #[derive(Default)]
    struct MemorySink {
        items: Vec<ItemRow>,
        documents: Vec<DocumentRow>,
        statistics: Vec<StatisticsRow>,
    }

    impl ExportSink for MemorySink {
        fn write_items(&mut self, rows: &[ItemRow]) -> Result<()> {
            self.items = rows.to_vec();
            Ok(())
        }

        fn write_documents(&mut self, rows: &[DocumentRow]) -> Result<()> {
            self.documents = rows.to_vec();
            Ok(())
        }

        fn write_statistics(&mut self, rows: &[StatisticsRow]) -> Result<()> {
            self.statistics = rows.to_vec();
            Ok(())
        }
    }

    #[test]
    fn test_item_rows_only_included() {
        let mut selection = selection();
        selection.toggle_item(ItemRef::new(0, ServiceCategory::Utility, 0));

        let rows = item_rows(&selection);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "Март 2024");
        assert_eq!(rows[0].category, "Жилищные");
        assert_eq!(rows[1].period, "Н/Д");
        assert_eq!(rows[1].total, Decimal::new(20000, 2));
    }

    #[test]
    fn test_document_rows() {
        let rows = document_rows(&selection());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].account_id, "123");
        assert_eq!(rows[0].insurance, Decimal::new(3000, 2));
        assert_eq!(rows[0].grand_total, Decimal::new(18000, 2));
        assert_eq!(rows[1].account_id, "Н/Д");
        assert_eq!(rows[1].insurance, Decimal::ZERO);
    }

    #[test]
    fn test_statistics() {
        let stats = statistics(&document_rows(&selection()));

        assert_eq!(stats.len(), 4);
        let housing = &stats[0];
        assert_eq!(housing.category, HOUSING_LABEL);
        assert_eq!(housing.total, Decimal::new(30000, 2));
        assert_eq!(housing.mean, Decimal::new(15000, 2));
        assert_eq!(housing.min, Decimal::new(10000, 2));
        assert_eq!(housing.max, Decimal::new(20000, 2));
        assert!(statistics(&[]).is_empty());
    }

    #[test]
    fn test_item_row_headers() {
        let row = &item_rows(&selection())[0];
        let json = serde_json::to_value(row).unwrap();

        assert_eq!(json["Услуга"], "Содержание жилья");
        assert_eq!(json["Ед.изм."], "куб. м.");
        assert_eq!(json["Сумма"], "100.00");
    }

    #[test]
    fn test_export_selection() {
        let mut sink = MemorySink::default();
        export_selection(&selection(), &mut sink).unwrap();

        assert_eq!(sink.items.len(), 3);
        assert_eq!(sink.documents.len(), 2);
        assert_eq!(sink.statistics.len(), 4);
    }
}
