use chrono::{DateTime, Utc};

use crate::audit::AuditEvent;
use crate::domain::repair_order::{RepairOrder, RepairOrderStatus};

/// Manual status change. Entering `closed` stamps `closed_at` (once);
/// leaving it clears the stamp. Returns the next snapshot plus the audit
/// event to append in the same transaction.
pub fn set_status(
    ro: &RepairOrder,
    new_status: RepairOrderStatus,
    now: DateTime<Utc>,
) -> (RepairOrder, AuditEvent) {
    let mut next = ro.clone();
    let old_status = ro.status;
    next.status = new_status;

    if new_status == RepairOrderStatus::Closed {
        if next.closed_at.is_none() {
            next.closed_at = Some(now);
        }
    } else {
        next.closed_at = None;
    }

    let event = AuditEvent::new(
        ro.id.clone(),
        "ro_status",
        Some(old_status.as_str().to_string()),
        Some(new_status.as_str().to_string()),
        now,
    );

    (next, event)
}

/// Archive a repair order. Soft deletion is orthogonal to status: the order
/// disappears from active listings but stays addressable for history.
/// Returns `None` when already archived.
pub fn soft_delete(ro: &RepairOrder, now: DateTime<Utc>) -> Option<(RepairOrder, AuditEvent)> {
    if ro.deleted_at.is_some() {
        return None;
    }

    let mut next = ro.clone();
    next.deleted_at = Some(now);

    let event =
        AuditEvent::new(ro.id.clone(), "ro_deleted", None, Some(now.to_rfc3339()), now);

    Some((next, event))
}
