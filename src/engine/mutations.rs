use ulid::Ulid;

use crate::audit::AuditFact;
use crate::limits::*;
use crate::model::*;

use super::access::{require_admin, require_staff, require_unit_access};
use super::approval::{initial_status, requires_approval};
use super::overlap::{check_no_conflict, now_ms, validate_span};
use super::window::span_touches_window;
use super::{Engine, EngineError};

impl Engine {
    /// Register a unit so agendas can be recorded against it. Admin only.
    pub async fn register_unit(
        &self,
        caller: &Caller,
        code: String,
        owner_name: String,
    ) -> Result<Unit, EngineError> {
        require_admin(caller)?;
        if self.units.len() >= MAX_UNITS {
            return Err(EngineError::LimitExceeded("too many units"));
        }
        if code.len() > MAX_CODE_LEN {
            return Err(EngineError::LimitExceeded("unit code too long"));
        }
        if owner_name.len() > MAX_OWNER_NAME_LEN {
            return Err(EngineError::LimitExceeded("owner name too long"));
        }

        let id = Ulid::new();
        let event = Event::UnitRegistered {
            id,
            code: code.clone(),
            owner_name: owner_name.clone(),
        };
        self.wal_append(&event).await?;

        let unit = UnitState::new(id, code, owner_name);
        let record = unit.record();
        self.units
            .insert(id, std::sync::Arc::new(tokio::sync::RwLock::new(unit)));

        self.audit
            .send(AuditFact::new(caller.id, "create", "unit", id, now_ms()));
        Ok(record)
    }

    /// Store a recurring restricted window. Admin only. Rows accumulate;
    /// evaluation consults the first enabled one.
    pub async fn add_lock_window(
        &self,
        caller: &Caller,
        start_minute: u32,
        end_minute: u32,
        enabled: bool,
    ) -> Result<LockWindow, EngineError> {
        require_admin(caller)?;
        if start_minute >= MINUTES_PER_DAY || end_minute >= MINUTES_PER_DAY {
            return Err(EngineError::Validation("window minute out of range"));
        }

        let id = Ulid::new();
        let event = Event::LockWindowAdded { id, start_minute, end_minute, enabled };
        self.wal_append(&event).await?;

        let window = LockWindow { id, start_minute, end_minute, enabled };
        self.lock_windows.write().await.push(window.clone());

        self.audit
            .send(AuditFact::new(caller.id, "create", "lock_window", id, now_ms()));
        Ok(window)
    }

    /// Submit a scheduling request: authorization → interval validity →
    /// unit-scoped conflict check → restricted-window evaluation → approval
    /// policy → commit. A departure additionally spawns its coverage task
    /// after the agenda commit; that side effect is never rolled back.
    pub async fn submit_agenda(
        &self,
        caller: &Caller,
        unit_id: Ulid,
        kind: AgendaKind,
        start: Ms,
        end: Ms,
        description: String,
    ) -> Result<Agenda, EngineError> {
        require_unit_access(caller, unit_id)?;
        if end <= start {
            return Err(EngineError::Validation("end must be after start"));
        }
        let span = Span::new(start, end);
        validate_span(&span)?;
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::LimitExceeded("description too long"));
        }

        let unit = self
            .get_unit(&unit_id)
            .ok_or(EngineError::NotFound(unit_id))?;
        let mut guard = unit.write().await;
        if guard.agendas.len() >= MAX_AGENDAS_PER_UNIT {
            return Err(EngineError::LimitExceeded("too many agendas on unit"));
        }

        if let Err(e) = check_no_conflict(&guard, &span) {
            metrics::counter!(crate::observability::AGENDA_CONFLICTS_TOTAL).increment(1);
            return Err(e);
        }

        // No enabled window means no restriction, not an error.
        let in_window = {
            let windows = self.lock_windows.read().await;
            windows
                .iter()
                .find(|w| w.enabled)
                .map(|w| span_touches_window(&span, w))
                .unwrap_or(false)
        };
        let requires = requires_approval(kind, in_window);

        let agenda = Agenda {
            id: Ulid::new(),
            unit_id,
            requester_id: caller.id,
            kind,
            span,
            description,
            status: initial_status(requires),
            requires_approval: requires,
        };
        let event = Event::AgendaSubmitted {
            id: agenda.id,
            unit_id,
            requester_id: agenda.requester_id,
            kind,
            span,
            description: agenda.description.clone(),
            status: agenda.status,
            requires_approval: requires,
        };
        self.wal_append(&event).await?;
        guard.insert_agenda(agenda.clone());
        self.agenda_to_unit.insert(agenda.id, unit_id);
        drop(guard);

        metrics::counter!(
            crate::observability::AGENDA_SUBMITTED_TOTAL,
            "kind" => kind.as_str()
        )
        .increment(1);
        self.audit
            .send(AuditFact::new(caller.id, "create", "agenda", agenda.id, now_ms()));

        if kind == AgendaKind::Departure {
            // The agenda is already committed; a failure here leaves a
            // departure without coverage, repaired out of band.
            if let Err(e) = self.open_coverage(caller, unit_id, agenda.id).await {
                metrics::counter!(crate::observability::COVERAGE_OPEN_FAILURES_TOTAL)
                    .increment(1);
                tracing::error!("coverage for departure {} not opened: {e}", agenda.id);
            }
        }

        Ok(agenda)
    }

    /// Open the patrol task linked to a departure agenda.
    pub(crate) async fn open_coverage(
        &self,
        caller: &Caller,
        unit_id: Ulid,
        from_agenda_id: Ulid,
    ) -> Result<Coverage, EngineError> {
        if self.coverage_by_agenda.contains_key(&from_agenda_id) {
            return Err(EngineError::AlreadyExists(from_agenda_id));
        }

        let coverage = Coverage {
            id: Ulid::new(),
            unit_id,
            from_agenda_id,
            title: format!("Coverage for departure {from_agenda_id}"),
            assigned_to: None,
            status: CoverageStatus::Pending,
        };
        let event = Event::CoverageOpened {
            id: coverage.id,
            unit_id,
            from_agenda_id,
            title: coverage.title.clone(),
        };
        self.wal_append(&event).await?;
        self.coverages.insert(
            coverage.id,
            std::sync::Arc::new(tokio::sync::RwLock::new(coverage.clone())),
        );
        self.coverage_by_agenda.insert(from_agenda_id, coverage.id);

        metrics::counter!(crate::observability::COVERAGE_OPENED_TOTAL).increment(1);
        self.audit.send(
            AuditFact::new(caller.id, "create", "coverage", coverage.id, now_ms())
                .with_details("auto-generated by departure"),
        );
        Ok(coverage)
    }

    /// Record an approval decision. Admin only. The status is overwritten
    /// unconditionally — re-deciding an already-decided agenda is permitted
    /// and derives no side effects a second time.
    pub async fn decide_agenda(
        &self,
        caller: &Caller,
        agenda_id: Ulid,
        status: AgendaStatus,
    ) -> Result<Agenda, EngineError> {
        require_admin(caller)?;
        let mut guard = self.resolve_agenda_write(&agenda_id).await?;
        let unit_id = guard.id;
        if guard.agenda_mut(&agenda_id).is_none() {
            return Err(EngineError::NotFound(agenda_id));
        }

        let event = Event::AgendaDecided { id: agenda_id, unit_id, status };
        self.wal_append(&event).await?;

        let agenda = guard
            .agenda_mut(&agenda_id)
            .ok_or(EngineError::NotFound(agenda_id))?;
        agenda.status = status;
        let record = agenda.clone();

        metrics::counter!(
            crate::observability::AGENDA_DECIDED_TOTAL,
            "status" => status.as_str()
        )
        .increment(1);
        self.audit.send(
            AuditFact::new(caller.id, "approve", "agenda", agenda_id, now_ms())
                .with_details(status.as_str()),
        );
        Ok(record)
    }

    /// Update a coverage task's assignee and status together. Staff or
    /// admin. The caller picks the target status — the transition is
    /// deliberately permissive, not staged.
    pub async fn assign_coverage(
        &self,
        caller: &Caller,
        coverage_id: Ulid,
        assigned_to: Option<Ulid>,
        status: CoverageStatus,
    ) -> Result<Coverage, EngineError> {
        require_staff(caller)?;
        let coverage = self
            .get_coverage_handle(&coverage_id)
            .ok_or(EngineError::NotFound(coverage_id))?;
        let mut guard = coverage.write().await;

        let event = Event::CoverageAssigned { id: coverage_id, assigned_to, status };
        self.wal_append(&event).await?;
        guard.assigned_to = assigned_to;
        guard.status = status;
        let record = guard.clone();

        metrics::counter!(crate::observability::COVERAGE_ASSIGNED_TOTAL).increment(1);
        self.audit
            .send(AuditFact::new(caller.id, "update", "coverage", coverage_id, now_ms()));
        Ok(record)
    }
}
