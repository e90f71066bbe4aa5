use chrono::{DateTime, Utc};

use crate::audit::AuditEvent;
use crate::domain::document::{DocType, Document, DocumentStatus};
use crate::domain::repair_order::RepairOrderStatus;
use crate::errors::DomainError;

/// Side effects a document transition asks the caller to apply alongside
/// the document update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentEffect {
    /// Move a still-open repair order to `estimate_sent`.
    MarkEstimateSent,
    /// Move the repair order to `work_in_progress`.
    SetRepairOrderWorkInProgress,
    /// Copy the approved estimate's line items onto the current invoice.
    PromoteInvoice,
}

/// Freeze a document's financials. Estimates are marked sent at the same
/// time; invoices move to `locked`. A document that is already frozen comes
/// back unchanged so a paid invoice can never be demoted.
pub fn lock(
    document: &Document,
    ro_status: RepairOrderStatus,
    now: DateTime<Utc>,
) -> (Document, Vec<DocumentEffect>, Vec<AuditEvent>) {
    if document.is_frozen() {
        return (document.clone(), Vec::new(), Vec::new());
    }

    let mut next = document.clone();
    let mut effects = Vec::new();
    let mut events = Vec::new();
    next.locked_at = Some(now);

    match document.doc_type {
        DocType::Estimate => {
            next.status = DocumentStatus::Sent;
            next.sent_at = Some(now);
            events.push(AuditEvent::new(
                document.ro_id.clone(),
                "estimate_sent",
                None,
                Some(document.id.0.clone()),
                now,
            ));
            if ro_status == RepairOrderStatus::Open {
                effects.push(DocumentEffect::MarkEstimateSent);
            }
        }
        DocType::Invoice => {
            next.status = DocumentStatus::Locked;
            events.push(AuditEvent::new(
                document.ro_id.clone(),
                "invoice_locked",
                None,
                Some(document.id.0.clone()),
                now,
            ));
        }
    }

    (next, effects, events)
}

/// Hand out a document for customer viewing. The share token is assigned on
/// first use and stable afterwards; sharing an estimate also marks it sent.
pub fn share(
    document: &Document,
    candidate_token: String,
    ro_status: RepairOrderStatus,
    now: DateTime<Utc>,
) -> (Document, Vec<DocumentEffect>, Vec<AuditEvent>) {
    let mut next = document.clone();
    let mut effects = Vec::new();
    let mut events = Vec::new();

    if next.share_token.is_none() {
        next.share_token = Some(candidate_token);
    }

    if document.doc_type == DocType::Estimate {
        next.status = DocumentStatus::Sent;
        if next.sent_at.is_none() {
            next.sent_at = Some(now);
        }
        events.push(AuditEvent::new(
            document.ro_id.clone(),
            "estimate_sent",
            None,
            Some(document.id.0.clone()),
            now,
        ));
        if ro_status == RepairOrderStatus::Open {
            effects.push(DocumentEffect::MarkEstimateSent);
        }
    }

    (next, effects, events)
}

/// Customer approval of an estimate. The repair order moves to
/// `work_in_progress` and the estimate's items are promoted onto the
/// invoice.
pub fn approve(
    document: &Document,
    now: DateTime<Utc>,
) -> Result<(Document, Vec<DocumentEffect>, AuditEvent), DomainError> {
    require_doc_type(document, DocType::Estimate)?;

    let mut next = document.clone();
    next.status = DocumentStatus::Approved;

    let event = AuditEvent::new(
        document.ro_id.clone(),
        "approved",
        None,
        Some(document.id.0.clone()),
        now,
    );

    Ok((
        next,
        vec![DocumentEffect::SetRepairOrderWorkInProgress, DocumentEffect::PromoteInvoice],
        event,
    ))
}

/// Customer declines an estimate. No cascade; individual jobs keep whatever
/// status they hold.
pub fn decline(
    document: &Document,
    now: DateTime<Utc>,
) -> Result<(Document, AuditEvent), DomainError> {
    require_doc_type(document, DocType::Estimate)?;

    let mut next = document.clone();
    next.status = DocumentStatus::Declined;

    let event = AuditEvent::new(
        document.ro_id.clone(),
        "declined",
        None,
        Some(document.id.0.clone()),
        now,
    );

    Ok((next, event))
}

/// Settle an invoice. Payment is terminal; totals stay whatever they were
/// at lock time.
pub fn mark_paid(
    document: &Document,
    now: DateTime<Utc>,
) -> Result<(Document, AuditEvent), DomainError> {
    require_doc_type(document, DocType::Invoice)?;

    let mut next = document.clone();
    next.status = DocumentStatus::Paid;

    let event = AuditEvent::new(
        document.ro_id.clone(),
        "paid",
        None,
        Some(document.id.0.clone()),
        now,
    );

    Ok((next, event))
}

fn require_doc_type(document: &Document, expected: DocType) -> Result<(), DomainError> {
    if document.doc_type != expected {
        return Err(DomainError::WrongDocType { expected, actual: document.doc_type });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::document::{DocType, Document, DocumentId, DocumentStatus};
    use crate::domain::repair_order::{RepairOrderId, RepairOrderStatus};
    use crate::errors::DomainError;

    use super::{approve, decline, lock, mark_paid, share, DocumentEffect};

    fn document(doc_type: DocType, status: DocumentStatus) -> Document {
        Document {
            id: DocumentId("doc-1".to_string()),
            ro_id: RepairOrderId("ro-1".to_string()),
            doc_type,
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

    #[test]
    fn locking_an_estimate_marks_it_sent_and_nudges_an_open_order() {
        let now = Utc::now();
        let (next, effects, events) = lock(
            &document(DocType::Estimate, DocumentStatus::Draft),
            RepairOrderStatus::Open,
            now,
        );

        assert_eq!(next.status, DocumentStatus::Sent);
        assert_eq!(next.sent_at, Some(now));
        assert_eq!(next.locked_at, Some(now));
        assert_eq!(effects, vec![DocumentEffect::MarkEstimateSent]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "estimate_sent");
    }

    #[test]
    fn locking_an_estimate_on_a_busy_order_skips_the_nudge() {
        let (_, effects, _) = lock(
            &document(DocType::Estimate, DocumentStatus::Draft),
            RepairOrderStatus::WorkInProgress,
            Utc::now(),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn locking_an_invoice_freezes_it() {
        let now = Utc::now();
        let (next, effects, events) = lock(
            &document(DocType::Invoice, DocumentStatus::Draft),
            RepairOrderStatus::WorkInProgress,
            now,
        );

        assert_eq!(next.status, DocumentStatus::Locked);
        assert_eq!(next.locked_at, Some(now));
        assert!(effects.is_empty());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "invoice_locked");
    }

    #[test]
    fn locking_a_frozen_document_is_a_no_op() {
        let mut paid = document(DocType::Invoice, DocumentStatus::Paid);
        paid.locked_at = Some(Utc::now());

        let (next, effects, events) = lock(&paid, RepairOrderStatus::Closed, Utc::now());
        assert_eq!(next.status, DocumentStatus::Paid);
        assert_eq!(next.locked_at, paid.locked_at);
        assert!(effects.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn sharing_assigns_a_token_once() {
        let now = Utc::now();
        let (first, _, _) = share(
            &document(DocType::Estimate, DocumentStatus::Draft),
            "token-a".to_string(),
            RepairOrderStatus::Open,
            now,
        );
        assert_eq!(first.share_token.as_deref(), Some("token-a"));
        assert_eq!(first.status, DocumentStatus::Sent);
        assert_eq!(first.sent_at, Some(now));

        let (second, _, _) = share(&first, "token-b".to_string(), RepairOrderStatus::Open, now);
        assert_eq!(second.share_token.as_deref(), Some("token-a"));
        assert_eq!(second.sent_at, Some(now));
    }

    #[test]
    fn sharing_an_invoice_changes_nothing_but_the_token() {
        let (next, effects, events) = share(
            &document(DocType::Invoice, DocumentStatus::Draft),
            "token-a".to_string(),
            RepairOrderStatus::WorkInProgress,
            Utc::now(),
        );

        assert_eq!(next.status, DocumentStatus::Draft);
        assert!(effects.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn approving_an_estimate_promotes_the_invoice() {
        let (next, effects, event) =
            approve(&document(DocType::Estimate, DocumentStatus::Sent), Utc::now())
                .expect("approve");

        assert_eq!(next.status, DocumentStatus::Approved);
        assert_eq!(
            effects,
            vec![DocumentEffect::SetRepairOrderWorkInProgress, DocumentEffect::PromoteInvoice]
        );
        assert_eq!(event.event_type, "approved");
    }

    #[test]
    fn approving_an_invoice_is_a_type_error() {
        let error =
            approve(&document(DocType::Invoice, DocumentStatus::Draft), Utc::now()).unwrap_err();
        assert!(matches!(
            error,
            DomainError::WrongDocType { expected: DocType::Estimate, actual: DocType::Invoice }
        ));
    }

    #[test]
    fn declining_an_estimate_has_no_cascade() {
        let (next, event) =
            decline(&document(DocType::Estimate, DocumentStatus::Sent), Utc::now())
                .expect("decline");
        assert_eq!(next.status, DocumentStatus::Declined);
        assert_eq!(event.event_type, "declined");
    }

    #[test]
    fn paying_requires_an_invoice() {
        let (next, event) =
            mark_paid(&document(DocType::Invoice, DocumentStatus::Locked), Utc::now())
                .expect("pay");
        assert_eq!(next.status, DocumentStatus::Paid);
        assert_eq!(event.event_type, "paid");

        let error =
            mark_paid(&document(DocType::Estimate, DocumentStatus::Sent), Utc::now()).unwrap_err();
        assert!(matches!(error, DomainError::WrongDocType { .. }));
    }
}
