use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::new_id;
use crate::domain::repair_order::RepairOrderId;

/// Immutable history record for one repair order mutation. Events are
/// append-only: nothing in the engine updates or deletes them, and every
/// lifecycle transition records exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub ro_id: RepairOrderId,
    pub event_type: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        ro_id: RepairOrderId,
        event_type: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self { id: new_id(), ro_id, event_type: event_type.into(), old_value, new_value, recorded_at }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::repair_order::RepairOrderId;

    use super::AuditEvent;

    #[test]
    fn events_capture_old_and_new_values() {
        let event = AuditEvent::new(
            RepairOrderId("ro-1".to_string()),
            "ro_status",
            Some("open".to_string()),
            Some("closed".to_string()),
            Utc::now(),
        );

        assert_eq!(event.event_type, "ro_status");
        assert_eq!(event.old_value.as_deref(), Some("open"));
        assert_eq!(event.new_value.as_deref(), Some("closed"));
        assert!(!event.id.is_empty());
    }
}
