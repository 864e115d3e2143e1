//! Per-category totals of a single document.

use rust_decimal::Decimal;

use crate::models::bill::{CategoryTotals, DocumentRecord, ServiceCategory};

/// Sum line items per category and add the insurance charge, if any.
///
/// An extracted insurance charge counts even when it is zero; only a missing
/// charge is left out.
pub fn aggregate(record: &DocumentRecord) -> CategoryTotals {
    let housing = record.category_total(ServiceCategory::Housing);
    let utility = record.category_total(ServiceCategory::Utility);
    let insurance = record.insurance_amount;

    CategoryTotals {
        housing,
        utility,
        insurance,
        grand_total: housing + utility + insurance.unwrap_or(Decimal::ZERO),
    }
}
