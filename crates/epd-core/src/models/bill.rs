//! Utility bill (EPD) data models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label of the housing services category total.
pub const HOUSING_LABEL: &str = "Жилищные услуги";
/// Label of the utility services category total.
pub const UTILITY_LABEL: &str = "Коммунальные услуги";
/// Label of the voluntary insurance category total.
pub const INSURANCE_LABEL: &str = "Добровольное страхование";
/// Label of the grand total.
pub const GRAND_TOTAL_LABEL: &str = "ИТОГО";

/// A single charge line from a bill section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Service name as printed.
    pub name: String,

    /// Consumed volume; zero when not recoverable.
    pub volume: Decimal,

    /// Unit of measure; empty when not recognized.
    #[serde(default)]
    pub unit: String,

    /// Tariff per unit; zero when not recoverable.
    pub tariff: Decimal,

    /// Chargeable amount for the line.
    pub total: Decimal,
}

/// Bill section a line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Maintenance-type charges.
    Housing,
    /// Metered consumption charges.
    Utility,
}

impl ServiceCategory {
    /// All categories in display order.
    pub const ALL: [ServiceCategory; 2] = [ServiceCategory::Housing, ServiceCategory::Utility];

    /// Category total label.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Housing => HOUSING_LABEL,
            ServiceCategory::Utility => UTILITY_LABEL,
        }
    }

    /// Short label used in tabular exports.
    pub fn short_label(&self) -> &'static str {
        match self {
            ServiceCategory::Housing => "Жилищные",
            ServiceCategory::Utility => "Коммунальные",
        }
    }

    /// Parse a category from user input.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();

        if s == "housing" || s.starts_with("жилищн") {
            Some(ServiceCategory::Housing)
        } else if s == "utility" || s == "utilities" || s.starts_with("коммунальн") {
            Some(ServiceCategory::Utility)
        } else {
            None
        }
    }
}

/// Fields recognized in the document header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFields {
    /// Billing period, e.g. "Январь 2024".
    pub period: Option<String>,
    /// Personal account number.
    pub account_id: Option<String>,
    /// Payer full name.
    pub payer_name: Option<String>,
    /// Service address.
    pub address: Option<String>,
    /// Printed total including voluntary insurance.
    pub total_with_insurance: Option<Decimal>,
    /// Printed total excluding voluntary insurance.
    pub total_without_insurance: Option<Decimal>,
}

/// Line items and the insurance charge found in the bill body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItems {
    /// Items of the housing section.
    pub housing: Vec<LineItem>,
    /// Items of the utility section.
    pub utility: Vec<LineItem>,
    /// Voluntary insurance charge.
    pub insurance: Option<Decimal>,
}

/// Per-category totals of a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    #[serde(rename = "Жилищные услуги")]
    pub housing: Decimal,

    #[serde(rename = "Коммунальные услуги")]
    pub utility: Decimal,

    /// Present only when the document carries an insurance charge.
    #[serde(
        rename = "Добровольное страхование",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub insurance: Option<Decimal>,

    #[serde(rename = "ИТОГО")]
    pub grand_total: Decimal,
}

impl CategoryTotals {
    /// Look up a total by its label.
    pub fn get(&self, label: &str) -> Option<Decimal> {
        match label {
            HOUSING_LABEL => Some(self.housing),
            UTILITY_LABEL => Some(self.utility),
            INSURANCE_LABEL => self.insurance,
            GRAND_TOTAL_LABEL => Some(self.grand_total),
            _ => None,
        }
    }

    /// Label/amount pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, Decimal)> {
        let mut entries = vec![(HOUSING_LABEL, self.housing), (UTILITY_LABEL, self.utility)];
        if let Some(insurance) = self.insurance {
            entries.push((INSURANCE_LABEL, insurance));
        }
        entries.push((GRAND_TOTAL_LABEL, self.grand_total));
        entries
    }
}

/// Structured record extracted from one bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Billing period, e.g. "Январь 2024".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    /// Personal account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Payer full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,

    /// Service address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Printed total including voluntary insurance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_with_insurance: Option<Decimal>,

    /// Printed total excluding voluntary insurance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_without_insurance: Option<Decimal>,

    /// Housing section items in document order.
    #[serde(default)]
    pub housing_items: Vec<LineItem>,

    /// Utility section items in document order.
    #[serde(default)]
    pub utility_items: Vec<LineItem>,

    /// Voluntary insurance charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_amount: Option<Decimal>,

    /// Totals computed by the aggregation pass.
    #[serde(default)]
    pub category_totals: CategoryTotals,
}

impl DocumentRecord {
    /// Start a record from the header pass.
    pub fn from_header(header: HeaderFields) -> Self {
        Self {
            period: header.period,
            account_id: header.account_id,
            payer_name: header.payer_name,
            address: header.address,
            total_with_insurance: header.total_with_insurance,
            total_without_insurance: header.total_without_insurance,
            ..Self::default()
        }
    }

    /// Attach the line-item pass result.
    pub fn with_items(self, items: ExtractedItems) -> Self {
        Self {
            housing_items: items.housing,
            utility_items: items.utility,
            insurance_amount: items.insurance,
            ..self
        }
    }

    /// Run the aggregation pass and store its totals.
    pub fn finalize(self) -> Self {
        let category_totals = crate::bill::aggregate(&self);
        Self {
            category_totals,
            ..self
        }
    }

    /// Items of one category.
    pub fn items(&self, category: ServiceCategory) -> &[LineItem] {
        match category {
            ServiceCategory::Housing => &self.housing_items,
            ServiceCategory::Utility => &self.utility_items,
        }
    }

    /// Sum of all item totals of one category.
    pub fn category_total(&self, category: ServiceCategory) -> Decimal {
        self.items(category).iter().map(|i| i.total).sum()
    }

    /// Number of line items in both sections.
    pub fn item_count(&self) -> usize {
        self.housing_items.len() + self.utility_items.len()
    }

    /// Check the record for gaps and printed-total mismatches.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.completeness_issues();
        issues.extend(self.total_mismatches());
        issues
    }

    /// Fields and sections the extraction could not fill.
    pub fn completeness_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.period.is_none() {
            issues.push("Missing billing period".to_string());
        }

        if self.account_id.is_none() {
            issues.push("Missing account id".to_string());
        }

        if self.item_count() == 0 {
            issues.push("No line items".to_string());
        }

        issues
    }

    /// Disagreements between printed totals and the extracted line items.
    pub fn total_mismatches(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.item_count() == 0 {
            return issues;
        }

        let tolerance = Decimal::new(1, 2);
        let services = self.category_total(ServiceCategory::Housing)
            + self.category_total(ServiceCategory::Utility);

        if let Some(printed) = self.total_without_insurance {
            if (printed - services).abs() > tolerance {
                issues.push(format!(
                    "Line item total ({}) differs from printed total without insurance ({})",
                    services, printed
                ));
            }
        }

        if let Some(printed) = self.total_with_insurance {
            let grand = services + self.insurance_amount.unwrap_or_default();
            if (printed - grand).abs() > tolerance {
                issues.push(format!(
                    "Grand total ({}) differs from printed total with insurance ({})",
                    grand, printed
                ));
            }
        }

        issues
    }
}
