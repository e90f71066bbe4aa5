use crate::domain::document::Document;
use crate::domain::line_item::LineItem;
use crate::pricing::valuator::PricedLineItem;

/// Outcome of promoting an approved estimate onto its invoice.
#[derive(Clone, Debug, PartialEq)]
pub enum PromotionPlan {
    /// The invoice is locked or paid; leave it untouched.
    Skip,
    /// Replace every line item on the invoice with these copies.
    Replace(Vec<PricedLineItem>),
}

/// Plan the estimate-to-invoice promotion. Promotion is a full overwrite:
/// the invoice's existing items are discarded and the estimate's items are
/// copied over, job tags and all, so the invoice mirrors the approved scope
/// exactly. A frozen invoice is never touched.
pub fn plan(estimate_items: &[LineItem], invoice: &Document) -> PromotionPlan {
    if invoice.is_frozen() {
        return PromotionPlan::Skip;
    }

    let copies = estimate_items
        .iter()
        .map(|item| PricedLineItem {
            item_type: item.item_type,
            description: item.description.clone(),
            job_id: item.job_id.clone(),
            qty: item.qty,
            unit_price: item.unit_price,
            taxable: item.taxable,
            labor_hours: item.labor_hours,
            cost: item.cost,
        })
        .collect();

    PromotionPlan::Replace(copies)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::document::{DocType, Document, DocumentId, DocumentStatus};
    use crate::domain::job::JobId;
    use crate::domain::line_item::{ItemType, LineItem, LineItemId};
    use crate::domain::repair_order::RepairOrderId;

    use super::{plan, PromotionPlan};

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    fn invoice(status: DocumentStatus) -> Document {
        Document {
            id: DocumentId("inv-1".to_string()),
            ro_id: RepairOrderId("ro-1".to_string()),
            doc_type: DocType::Invoice,
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

    fn estimate_item() -> LineItem {
        LineItem {
            id: LineItemId("li-1".to_string()),
            document_id: DocumentId("est-1".to_string()),
            job_id: Some(JobId("job-1".to_string())),
            item_type: ItemType::Part,
            description: "Brake pads".to_string(),
            qty: dec("2"),
            unit_price: dec("75.00"),
            taxable: true,
            labor_hours: None,
            cost: Some(dec("50.00")),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn promotion_copies_items_with_their_job_tags() {
        let result = plan(&[estimate_item()], &invoice(DocumentStatus::Draft));

        let PromotionPlan::Replace(copies) = result else {
            panic!("expected a replace plan");
        };
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].description, "Brake pads");
        assert_eq!(copies[0].job_id, Some(JobId("job-1".to_string())));
        assert_eq!(copies[0].unit_price, dec("75.00"));
        assert_eq!(copies[0].cost, Some(dec("50.00")));
    }

    #[test]
    fn frozen_invoices_are_skipped() {
        assert_eq!(plan(&[estimate_item()], &invoice(DocumentStatus::Locked)), PromotionPlan::Skip);
        assert_eq!(plan(&[estimate_item()], &invoice(DocumentStatus::Paid)), PromotionPlan::Skip);

        let mut stamped = invoice(DocumentStatus::Draft);
        stamped.locked_at = Some(Utc::now());
        assert_eq!(plan(&[estimate_item()], &stamped), PromotionPlan::Skip);
    }

    #[test]
    fn an_empty_estimate_clears_the_invoice() {
        let result = plan(&[], &invoice(DocumentStatus::Draft));
        assert_eq!(result, PromotionPlan::Replace(Vec::new()));
    }
}
