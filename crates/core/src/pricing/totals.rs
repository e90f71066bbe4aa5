use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::document::Document;
use crate::domain::job::JobId;
use crate::domain::line_item::{ItemType, LineItem};
use crate::money::round_money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub gross_profit: Decimal,
    pub margin_pct: Decimal,
}

/// Recompute subtotal/tax/total for a document from its line items.
///
/// Returns `None` for locked or paid documents: frozen financials are never
/// recomputed. Items tagged to a declined job are excluded from the sums but
/// remain in storage. Tax applies only to taxable, non-discount items.
/// Recomputing from scratch each time keeps the operation idempotent; there
/// is no incremental update to drift.
pub fn recalculate(
    document: &Document,
    items: &[LineItem],
    declined_jobs: &HashSet<JobId>,
    tax_rate: Decimal,
) -> Option<DocumentTotals> {
    if document.is_frozen() {
        return None;
    }

    let active: Vec<&LineItem> = items
        .iter()
        .filter(|item| item.job_id.as_ref().map_or(true, |job_id| !declined_jobs.contains(job_id)))
        .collect();

    let subtotal: Decimal = active.iter().map(|item| item.amount()).sum();
    let taxable_base: Decimal = active
        .iter()
        .filter(|item| item.taxable && item.item_type != ItemType::Discount)
        .map(|item| item.amount())
        .sum();

    let tax = round_money(taxable_base * tax_rate);
    let total = round_money(subtotal + tax);

    Some(DocumentTotals { subtotal: round_money(subtotal), tax, total })
}

/// Revenue, cost, and margin over every line item of a document. Discounts
/// reduce revenue but never carry cost; margin is zero when revenue is zero.
pub fn profit_summary(items: &[LineItem]) -> ProfitSummary {
    let mut revenue = Decimal::ZERO;
    let mut cost = Decimal::ZERO;

    for item in items {
        revenue += item.amount();
        if item.item_type != ItemType::Discount {
            if let Some(item_cost) = item.cost {
                cost += item.qty * item_cost;
            }
        }
    }

    let gross_profit = revenue - cost;
    let margin_pct = if revenue.is_zero() {
        Decimal::ZERO
    } else {
        gross_profit / revenue * Decimal::ONE_HUNDRED
    };

    ProfitSummary {
        revenue: round_money(revenue),
        cost: round_money(cost),
        gross_profit: round_money(gross_profit),
        margin_pct: round_money(margin_pct),
    }
}

/// Per-job subtotal map; items without a job tag land under `None`.
pub fn job_totals(items: &[LineItem]) -> HashMap<Option<JobId>, Decimal> {
    let mut totals: HashMap<Option<JobId>, Decimal> = HashMap::new();
    for item in items {
        *totals.entry(item.job_id.clone()).or_insert(Decimal::ZERO) += item.amount();
    }
    totals.values_mut().for_each(|total| *total = round_money(*total));
    totals
}

/// Billable labor hours recorded against one job. Falls back to the labor
/// item's quantity when no explicit hour count was stored.
pub fn labor_hours_for_job(items: &[LineItem], job_id: &JobId) -> Decimal {
    let total: Decimal = items
        .iter()
        .filter(|item| item.item_type == ItemType::Labor)
        .filter(|item| item.job_id.as_ref() == Some(job_id))
        .map(|item| item.labor_hours.unwrap_or(item.qty))
        .sum();
    round_money(total)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::document::{DocType, Document, DocumentId, DocumentStatus};
    use crate::domain::job::JobId;
    use crate::domain::line_item::{ItemType, LineItem, LineItemId};
    use crate::domain::repair_order::RepairOrderId;

    use super::{job_totals, labor_hours_for_job, profit_summary, recalculate};

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    fn document(status: DocumentStatus) -> Document {
        Document {
            id: DocumentId("doc-1".to_string()),
            ro_id: RepairOrderId("ro-1".to_string()),
            doc_type: DocType::Estimate,
            version: 1,
            status,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            sent_at: None,
            locked_at: None,
            share_token: None,
            created_at: Utc::now(),
        }
    }

    fn item(
        id: &str,
        item_type: ItemType,
        qty: &str,
        unit_price: &str,
        taxable: bool,
        job_id: Option<&str>,
    ) -> LineItem {
        LineItem {
            id: LineItemId(id.to_string()),
            document_id: DocumentId("doc-1".to_string()),
            job_id: job_id.map(|job| JobId(job.to_string())),
            item_type,
            description: String::new(),
            qty: dec(qty),
            unit_price: dec(unit_price),
            taxable,
            labor_hours: None,
            cost: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tax_applies_only_to_taxable_non_discount_items() {
        let doc = document(DocumentStatus::Draft);
        let items = vec![
            item("a", ItemType::Part, "1", "100.00", true, None),
            item("b", ItemType::Labor, "1", "50.00", false, None),
        ];

        let totals = recalculate(&doc, &items, &HashSet::new(), dec("0.07")).expect("totals");
        assert_eq!(totals.subtotal, dec("150.00"));
        assert_eq!(totals.tax, dec("7.00"));
        assert_eq!(totals.total, dec("157.00"));
    }

    #[test]
    fn recalculate_is_idempotent() {
        let doc = document(DocumentStatus::Draft);
        let items = vec![
            item("a", ItemType::Part, "3", "33.33", true, None),
            item("b", ItemType::Discount, "1", "-10.00", false, None),
        ];

        let first = recalculate(&doc, &items, &HashSet::new(), dec("0.07")).expect("totals");
        let second = recalculate(&doc, &items, &HashSet::new(), dec("0.07")).expect("totals");
        assert_eq!(first, second);
    }

    #[test]
    fn frozen_documents_are_not_recomputed() {
        let items = vec![item("a", ItemType::Part, "1", "100.00", true, None)];

        assert!(recalculate(&document(DocumentStatus::Locked), &items, &HashSet::new(), dec("0.07"))
            .is_none());
        assert!(recalculate(&document(DocumentStatus::Paid), &items, &HashSet::new(), dec("0.07"))
            .is_none());

        let mut stamped = document(DocumentStatus::Sent);
        stamped.locked_at = Some(Utc::now());
        assert!(recalculate(&stamped, &items, &HashSet::new(), dec("0.07")).is_none());
    }

    #[test]
    fn declined_job_items_are_excluded_but_unassigned_items_count() {
        let doc = document(DocumentStatus::Draft);
        let items = vec![
            item("a", ItemType::Part, "1", "100.00", true, Some("job-declined")),
            item("b", ItemType::Fee, "1", "40.00", false, None),
        ];
        let declined: HashSet<JobId> =
            [JobId("job-declined".to_string())].into_iter().collect();

        let totals = recalculate(&doc, &items, &declined, dec("0.07")).expect("totals");
        assert_eq!(totals.subtotal, dec("40.00"));
        assert_eq!(totals.tax, dec("0.00"));
        assert_eq!(totals.total, dec("40.00"));
    }

    #[test]
    fn discounts_reduce_subtotal_and_never_the_taxable_base() {
        let doc = document(DocumentStatus::Draft);
        let items = vec![
            item("a", ItemType::Part, "1", "100.00", true, None),
            // Taxable flag on a discount is ignored for the tax base.
            item("b", ItemType::Discount, "1", "20.00", true, None),
        ];

        let totals = recalculate(&doc, &items, &HashSet::new(), dec("0.10")).expect("totals");
        assert_eq!(totals.subtotal, dec("80.00"));
        assert_eq!(totals.tax, dec("10.00"));
        assert_eq!(totals.total, dec("90.00"));
    }

    #[test]
    fn profit_summary_tracks_margin() {
        let mut part = item("a", ItemType::Part, "2", "75.00", true, None);
        part.cost = Some(dec("50.00"));
        let items = vec![part, item("b", ItemType::Discount, "1", "-10.00", false, None)];

        let profit = profit_summary(&items);
        assert_eq!(profit.revenue, dec("140.00"));
        assert_eq!(profit.cost, dec("100.00"));
        assert_eq!(profit.gross_profit, dec("40.00"));
        assert_eq!(profit.margin_pct, dec("28.57"));
    }

    #[test]
    fn zero_revenue_yields_zero_margin() {
        let profit = profit_summary(&[]);
        assert_eq!(profit.margin_pct, Decimal::ZERO);
    }

    #[test]
    fn job_totals_bucket_untagged_items_separately() {
        let items = vec![
            item("a", ItemType::Part, "1", "100.00", true, Some("job-1")),
            item("b", ItemType::Fee, "1", "25.00", false, None),
        ];

        let totals = job_totals(&items);
        assert_eq!(totals[&Some(JobId("job-1".to_string()))], dec("100.00"));
        assert_eq!(totals[&None], dec("25.00"));
    }

    #[test]
    fn labor_hours_fall_back_to_quantity() {
        let mut explicit = item("a", ItemType::Labor, "2.00", "85.00", false, Some("job-1"));
        explicit.labor_hours = Some(dec("2.50"));
        let implicit = item("b", ItemType::Labor, "1.25", "85.00", false, Some("job-1"));
        let other_job = item("c", ItemType::Labor, "9.00", "85.00", false, Some("job-2"));

        let hours =
            labor_hours_for_job(&[explicit, implicit, other_job], &JobId("job-1".to_string()));
        assert_eq!(hours, dec("3.75"));
    }
}
