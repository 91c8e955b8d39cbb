use serde::Serialize;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Ms;

const CHANNEL_CAPACITY: usize = 256;

/// An append-only audit fact. The core only emits these; storing and
/// querying the trail is the subscriber's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFact {
    pub actor: Ulid,
    pub action: &'static str,
    pub entity: &'static str,
    pub entity_id: Ulid,
    pub at: Ms,
    pub details: String,
}

impl AuditFact {
    pub fn new(actor: Ulid, action: &'static str, entity: &'static str, entity_id: Ulid, at: Ms) -> Self {
        Self {
            actor,
            action,
            entity,
            entity_id,
            at,
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

/// Fire-and-forget broadcast hub for audit facts.
pub struct AuditHub {
    tx: broadcast::Sender<AuditFact>,
}

impl Default for AuditHub {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to the fact stream. Facts emitted before the first
    /// subscription are dropped — the trail is best-effort by design.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditFact> {
        self.tx.subscribe()
    }

    /// Emit a fact. No-op if nobody is listening.
    pub fn send(&self, fact: AuditFact) {
        let _ = self.tx.send(fact);
    }
}
