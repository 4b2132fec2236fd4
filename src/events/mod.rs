//! Side-channel events: audit trail and search logging.
//!
//! Services emit events over an mpsc channel after their primary work is
//! done; a spawned consumer writes the corresponding rows. Channel or
//! database failures here are logged and swallowed — a logging outage must
//! never block a reservation, withdrawal, or search.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::{audit_log, search_log};

/// Events emitted by the services after their primary operation commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// An administrative or patient-facing mutation to record in the audit trail.
    ActionAudited {
        actor_id: Option<i64>,
        action: String,
        entity: String,
        record_id: i64,
        details: Option<serde_json::Value>,
    },
    /// A medication search completed (with or without results).
    MedicationSearched {
        term: String,
        had_results: bool,
        user_id: Option<i64>,
        first_medication_id: Option<i64>,
    },
    ReservationCreated(i64),
    ReservationCancelled(i64),
    ReservationRescheduled(i64),
    WithdrawalRecorded(i64),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event. A full or closed channel is reported to the caller as
    /// a string error; callers treat it as non-fatal.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget send: logs a warning on failure and returns.
    pub async fn send_lossy(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping side-channel event: {}", e);
        }
    }
}

/// Consumes events and persists audit/search-log rows until the channel closes.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, db: Arc<DatabaseConnection>) {
    while let Some(event) = rx.recv().await {
        match event {
            Event::ActionAudited {
                actor_id,
                action,
                entity,
                record_id,
                details,
            } => {
                let row = audit_log::ActiveModel {
                    actor_id: Set(actor_id),
                    action: Set(action.clone()),
                    entity: Set(entity.clone()),
                    record_id: Set(record_id),
                    details: Set(details),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                };
                if let Err(e) = row.insert(&*db).await {
                    warn!(
                        action = %action,
                        entity = %entity,
                        record_id = record_id,
                        error = %e,
                        "Failed to write audit log entry"
                    );
                }
            }
            Event::MedicationSearched {
                term,
                had_results,
                user_id,
                first_medication_id,
            } => {
                let row = search_log::ActiveModel {
                    term: Set(term.clone()),
                    had_results: Set(had_results),
                    user_id: Set(user_id),
                    first_medication_id: Set(first_medication_id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                };
                if let Err(e) = row.insert(&*db).await {
                    warn!(term = %term, error = %e, "Failed to write search log entry");
                }
            }
            Event::ReservationCreated(id) => {
                info!(reservation_id = id, "Reservation created");
            }
            Event::ReservationCancelled(id) => {
                info!(reservation_id = id, "Reservation cancelled");
            }
            Event::ReservationRescheduled(id) => {
                info!(reservation_id = id, "Reservation rescheduled");
            }
            Event::WithdrawalRecorded(id) => {
                info!(withdrawal_id = id, "Withdrawal recorded");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_to_json() {
        let event = Event::ActionAudited {
            actor_id: Some(1),
            action: "CREATE".into(),
            entity: "stock_lots".into(),
            record_id: 42,
            details: Some(serde_json::json!({"quantity": 10})),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ActionAudited"));
        assert!(json.contains("stock_lots"));
    }

    #[tokio::test]
    async fn send_lossy_does_not_fail_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or return an error to the caller.
        sender.send_lossy(Event::ReservationCreated(1)).await;
    }
}
