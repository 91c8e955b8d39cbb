use ulid::Ulid;

use crate::model::*;

use super::access::{ListScope, agenda_scope, coverage_scope};
use super::{Engine, SharedCoverage, SharedUnitState};

impl Engine {
    /// Agendas visible to the caller, optionally filtered by unit, ordered
    /// by start then id. Occupants only ever see their own unit.
    pub async fn list_agenda(&self, caller: &Caller, unit_filter: Option<Ulid>) -> Vec<Agenda> {
        let mut agendas = match agenda_scope(caller, unit_filter) {
            ListScope::Nothing | ListScope::Assignee(_) => Vec::new(),
            ListScope::Unit(unit_id) => match self.get_unit(&unit_id) {
                Some(unit) => unit.read().await.agendas.clone(),
                None => Vec::new(),
            },
            ListScope::All => {
                // Collect the handles first so no map shard stays locked
                // across an await.
                let units: Vec<SharedUnitState> =
                    self.units.iter().map(|e| e.value().clone()).collect();
                let mut all = Vec::new();
                for unit in units {
                    all.extend(unit.read().await.agendas.iter().cloned());
                }
                all
            }
        };
        agendas.sort_by_key(|a| (a.span.start, a.id));
        agendas
    }

    /// Coverage tasks visible to the caller: everything for admins, own
    /// assignments for staff, the bound unit's tasks for occupants.
    pub async fn list_coverage(&self, caller: &Caller) -> Vec<Coverage> {
        let scope = coverage_scope(caller);
        if scope == ListScope::Nothing {
            return Vec::new();
        }
        let handles: Vec<SharedCoverage> =
            self.coverages.iter().map(|e| e.value().clone()).collect();
        let mut out = Vec::new();
        for handle in handles {
            let coverage = handle.read().await;
            let visible = match scope {
                ListScope::All => true,
                ListScope::Assignee(staff_id) => coverage.assigned_to == Some(staff_id),
                ListScope::Unit(unit_id) => coverage.unit_id == unit_id,
                ListScope::Nothing => false,
            };
            if visible {
                out.push(coverage.clone());
            }
        }
        out.sort_by_key(|c| c.id);
        out
    }

    /// Units visible to the caller; occupants see only their own.
    pub async fn list_units(&self, caller: &Caller) -> Vec<Unit> {
        let handles: Vec<SharedUnitState> = match caller.role {
            Role::Occupant => caller
                .unit_id
                .and_then(|unit_id| self.get_unit(&unit_id))
                .into_iter()
                .collect(),
            Role::Admin | Role::Staff => {
                self.units.iter().map(|e| e.value().clone()).collect()
            }
        };
        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.read().await.record());
        }
        out.sort_by_key(|u| u.id);
        out
    }

    pub async fn get_agenda(&self, agenda_id: &Ulid) -> Option<Agenda> {
        let unit_id = self.unit_for_agenda(agenda_id)?;
        let unit = self.get_unit(&unit_id)?;
        let guard = unit.read().await;
        guard.agendas.iter().find(|a| a.id == *agenda_id).cloned()
    }

    pub async fn get_coverage(&self, coverage_id: &Ulid) -> Option<Coverage> {
        let handle = self.get_coverage_handle(coverage_id)?;
        let guard = handle.read().await;
        Some(guard.clone())
    }

    /// The coverage spawned by a departure agenda, if any.
    pub async fn coverage_for_agenda(&self, agenda_id: &Ulid) -> Option<Coverage> {
        let coverage_id = *self.coverage_by_agenda.get(agenda_id)?.value();
        self.get_coverage(&coverage_id).await
    }

    /// The single window consulted by submissions: the first enabled stored
    /// row, if any.
    pub async fn current_lock_window(&self) -> Option<LockWindow> {
        let windows = self.lock_windows.read().await;
        windows.iter().find(|w| w.enabled).cloned()
    }
}
