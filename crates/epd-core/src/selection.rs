//! Item selection across loaded bills and recomputation of totals.
//!
//! A [`Selection`] owns the loaded records together with one inclusion flag
//! per line item and a single insurance flag shared by all documents. Every
//! mutation is O(1); [`Selection::compute_summary`] rebuilds the whole
//! [`SummaryView`] from scratch, so the view always reflects the current flags.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bill::rules::period_sort_key;
use crate::models::bill::{DocumentRecord, LineItem, ServiceCategory};
use crate::models::config::{ExportConfig, UNKNOWN_PERIOD_LABEL};

/// Reference to one line item of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// Index of the document in load order.
    pub document: usize,
    /// Section the item belongs to.
    pub category: ServiceCategory,
    /// Position of the item within its section.
    pub index: usize,
}

impl ItemRef {
    pub fn new(document: usize, category: ServiceCategory, index: usize) -> Self {
        Self {
            document,
            category,
            index,
        }
    }
}

/// Totals of one billing period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: String,
    pub housing: Decimal,
    pub utility: Decimal,
    pub insurance: Decimal,
    pub total: Decimal,
}

impl PeriodSummary {
    fn new(period: &str) -> Self {
        Self {
            period: period.to_string(),
            ..Self::default()
        }
    }
}

/// Totals of the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    /// Number of loaded documents.
    pub document_count: usize,
    /// Sum of included housing items.
    pub housing_total: Decimal,
    /// Sum of included utility items.
    pub utility_total: Decimal,
    /// Sum of document insurance charges, zero unless insurance is included.
    pub insurance_total: Decimal,
    /// Housing, utility and insurance combined.
    pub grand_total: Decimal,
    /// Breakdown per billing period.
    pub per_period: Vec<PeriodSummary>,
}

impl SummaryView {
    /// Look up the breakdown of one period.
    pub fn period(&self, label: &str) -> Option<&PeriodSummary> {
        self.per_period.iter().find(|p| p.period == label)
    }
}

#[derive(Debug, Clone)]
struct LoadedDocument {
    record: DocumentRecord,
    housing: Vec<bool>,
    utility: Vec<bool>,
}

impl LoadedDocument {
    fn new(record: DocumentRecord) -> Self {
        Self {
            housing: vec![true; record.housing_items.len()],
            utility: vec![true; record.utility_items.len()],
            record,
        }
    }

    fn flags(&self, category: ServiceCategory) -> &[bool] {
        match category {
            ServiceCategory::Housing => &self.housing,
            ServiceCategory::Utility => &self.utility,
        }
    }

    fn flags_mut(&mut self, category: ServiceCategory) -> &mut Vec<bool> {
        match category {
            ServiceCategory::Housing => &mut self.housing,
            ServiceCategory::Utility => &mut self.utility,
        }
    }

    fn included_total(&self, category: ServiceCategory) -> Decimal {
        self.record
            .items(category)
            .iter()
            .zip(self.flags(category))
            .filter(|(_, included)| **included)
            .map(|(item, _)| item.total)
            .sum()
    }
}

/// Selection state over a set of loaded bills.
///
/// Mutations take `&mut self`; hosts sharing a selection between threads
/// wrap it in a `Mutex`.
#[derive(Debug, Clone)]
pub struct Selection {
    documents: Vec<LoadedDocument>,
    insurance_included: bool,
    unknown_period_label: String,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            insurance_included: false,
            unknown_period_label: UNKNOWN_PERIOD_LABEL.to_string(),
        }
    }

    /// Create an empty selection from export configuration.
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut selection = Self::new().with_unknown_period_label(&config.unknown_period_label);
        selection.insurance_included = config.include_insurance;
        selection
    }

    /// Set the label used for documents without a period.
    pub fn with_unknown_period_label(mut self, label: &str) -> Self {
        self.unknown_period_label = label.to_string();
        self
    }

    /// Label used for documents without a period.
    pub fn unknown_period_label(&self) -> &str {
        &self.unknown_period_label
    }

    /// Period label of a record, or the unknown-period label.
    pub fn period_label<'a>(&'a self, record: &'a DocumentRecord) -> &'a str {
        record.period.as_deref().unwrap_or(&self.unknown_period_label)
    }

    /// Load a record with all of its items included. Returns its index.
    pub fn load(&mut self, record: DocumentRecord) -> usize {
        debug!(
            "Loading document {:?} with {} items",
            record.period,
            record.item_count()
        );
        self.documents.push(LoadedDocument::new(record));
        self.documents.len() - 1
    }

    /// Loaded records in load order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> + '_ {
        self.documents.iter().map(|d| &d.record)
    }

    /// A loaded record by index.
    pub fn document(&self, index: usize) -> Option<&DocumentRecord> {
        self.documents.get(index).map(|d| &d.record)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All items with their references and inclusion flags, in load order.
    pub fn items(&self) -> impl Iterator<Item = (ItemRef, &LineItem, bool)> + '_ {
        self.documents
            .iter()
            .enumerate()
            .flat_map(|(document, loaded)| {
                ServiceCategory::ALL.into_iter().flat_map(move |category| {
                    loaded
                        .record
                        .items(category)
                        .iter()
                        .zip(loaded.flags(category).iter().copied())
                        .enumerate()
                        .map(move |(index, (item, included))| {
                            (ItemRef::new(document, category, index), item, included)
                        })
                })
            })
    }

    /// The item behind a reference.
    pub fn item(&self, item: ItemRef) -> Option<&LineItem> {
        self.documents
            .get(item.document)?
            .record
            .items(item.category)
            .get(item.index)
    }

    /// Whether an item is included; `None` for an unknown reference.
    pub fn is_included(&self, item: ItemRef) -> Option<bool> {
        self.documents
            .get(item.document)?
            .flags(item.category)
            .get(item.index)
            .copied()
    }

    /// Flip one item's flag and return its new state.
    pub fn toggle_item(&mut self, item: ItemRef) -> Option<bool> {
        let flag = self.flag_mut(item)?;
        *flag = !*flag;
        Some(*flag)
    }

    /// Set one item's flag.
    pub fn set_item_included(&mut self, item: ItemRef, included: bool) -> Option<()> {
        *self.flag_mut(item)? = included;
        Some(())
    }

    /// Set the flag of every item of one category across all documents.
    pub fn set_all_included(&mut self, category: ServiceCategory, included: bool) {
        for document in &mut self.documents {
            document.flags_mut(category).fill(included);
        }
    }

    pub fn set_insurance_included(&mut self, included: bool) {
        self.insurance_included = included;
    }

    pub fn insurance_included(&self) -> bool {
        self.insurance_included
    }

    /// Drop all documents and reset the insurance flag.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.insurance_included = false;
    }

    /// Recompute all totals from the current flags.
    pub fn compute_summary(&self) -> SummaryView {
        let mut summary = SummaryView {
            document_count: self.documents.len(),
            ..SummaryView::default()
        };
        let mut groups: Vec<PeriodSummary> = Vec::new();
        let mut group_index: HashMap<&str, usize> = HashMap::new();

        for document in &self.documents {
            let housing = document.included_total(ServiceCategory::Housing);
            let utility = document.included_total(ServiceCategory::Utility);
            let insurance = if self.insurance_included {
                document.record.insurance_amount.unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };

            summary.housing_total += housing;
            summary.utility_total += utility;
            summary.insurance_total += insurance;

            let label = self.period_label(&document.record);
            let index = *group_index.entry(label).or_insert_with(|| {
                groups.push(PeriodSummary::new(label));
                groups.len() - 1
            });

            let group = &mut groups[index];
            group.housing += housing;
            group.utility += utility;
            group.insurance += insurance;
            group.total += housing + utility + insurance;
        }

        summary.grand_total =
            summary.housing_total + summary.utility_total + summary.insurance_total;

        // stable sort keeps first-appearance order among equal keys
        groups.sort_by_cached_key(|g| self.period_order(&g.period));
        summary.per_period = groups;
        summary
    }

    fn period_order(&self, label: &str) -> (bool, Option<NaiveDate>) {
        if label == self.unknown_period_label {
            return (true, None);
        }
        // dated periods first, undated ones after them
        match period_sort_key(label) {
            Some(date) => (false, Some(date)),
            None => (false, Some(NaiveDate::MAX)),
        }
    }

    fn flag_mut(&mut self, item: ItemRef) -> Option<&mut bool> {
        self.documents
            .get_mut(item.document)?
            .flags_mut(item.category)
            .get_mut(item.index)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}
