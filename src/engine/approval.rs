use crate::model::{AgendaKind, AgendaStatus};

/// Moves and service-provider visits always need administrator sign-off;
/// guest visits only when they touch the restricted window. Departures
/// auto-approve (their side effect is the coverage task, not a decision).
pub fn requires_approval(kind: AgendaKind, in_lock_window: bool) -> bool {
    match kind {
        AgendaKind::Move | AgendaKind::ServiceProvider => true,
        AgendaKind::Visit => in_lock_window,
        AgendaKind::Departure => false,
    }
}

/// A request that needs approval starts Pending; anything else is
/// immediately Approved.
pub fn initial_status(requires_approval: bool) -> AgendaStatus {
    if requires_approval {
        AgendaStatus::Pending
    } else {
        AgendaStatus::Approved
    }
}
