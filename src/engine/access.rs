use ulid::Ulid;

use crate::model::{Caller, Role};

use super::EngineError;

/// Row visibility for list operations, derived once from the caller's role
/// instead of branching inside each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Unit(Ulid),
    Assignee(Ulid),
    /// Caller has a scoped role but no binding to scope by.
    Nothing,
}

pub fn require_admin(caller: &Caller) -> Result<(), EngineError> {
    match caller.role {
        Role::Admin => Ok(()),
        _ => Err(EngineError::Unauthorized("administrator role required")),
    }
}

pub fn require_staff(caller: &Caller) -> Result<(), EngineError> {
    match caller.role {
        Role::Admin | Role::Staff => Ok(()),
        Role::Occupant => Err(EngineError::Unauthorized("staff or administrator role required")),
    }
}

/// Occupants may only act on the unit they are bound to.
pub fn require_unit_access(caller: &Caller, unit_id: Ulid) -> Result<(), EngineError> {
    if caller.role == Role::Occupant && caller.unit_id != Some(unit_id) {
        return Err(EngineError::Unauthorized("occupant may only schedule their own unit"));
    }
    Ok(())
}

/// Agenda visibility: occupants are pinned to their own unit (any filter is
/// ignored); admin and staff may filter freely.
pub fn agenda_scope(caller: &Caller, unit_filter: Option<Ulid>) -> ListScope {
    match caller.role {
        Role::Occupant => match caller.unit_id {
            Some(unit_id) => ListScope::Unit(unit_id),
            None => ListScope::Nothing,
        },
        Role::Admin | Role::Staff => match unit_filter {
            Some(unit_id) => ListScope::Unit(unit_id),
            None => ListScope::All,
        },
    }
}

/// Coverage visibility: staff see their own assignments, occupants their
/// unit's tasks, administrators everything.
pub fn coverage_scope(caller: &Caller) -> ListScope {
    match caller.role {
        Role::Admin => ListScope::All,
        Role::Staff => ListScope::Assignee(caller.id),
        Role::Occupant => match caller.unit_id {
            Some(unit_id) => ListScope::Unit(unit_id),
            None => ListScope::Nothing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_checks() {
        let admin = Caller::admin(Ulid::new());
        let staff = Caller::staff(Ulid::new());
        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&staff).is_err());
        assert!(require_staff(&staff).is_ok());
        assert!(require_staff(&admin).is_ok());
    }

    #[test]
    fn occupant_unit_binding() {
        let unit = Ulid::new();
        let other = Ulid::new();
        let occupant = Caller::occupant(Ulid::new(), unit);
        assert!(require_unit_access(&occupant, unit).is_ok());
        assert!(require_unit_access(&occupant, other).is_err());
        // Staff are not unit-bound
        assert!(require_unit_access(&Caller::staff(Ulid::new()), other).is_ok());
    }

    #[test]
    fn occupant_agenda_scope_ignores_filter() {
        let unit = Ulid::new();
        let other = Ulid::new();
        let occupant = Caller::occupant(Ulid::new(), unit);
        assert_eq!(agenda_scope(&occupant, Some(other)), ListScope::Unit(unit));
        assert_eq!(agenda_scope(&occupant, None), ListScope::Unit(unit));
    }

    #[test]
    fn unbound_occupant_sees_nothing() {
        let unbound = Caller {
            id: Ulid::new(),
            role: Role::Occupant,
            unit_id: None,
        };
        assert_eq!(agenda_scope(&unbound, None), ListScope::Nothing);
        assert_eq!(coverage_scope(&unbound), ListScope::Nothing);
    }

    #[test]
    fn admin_and_staff_agenda_scopes() {
        let unit = Ulid::new();
        let admin = Caller::admin(Ulid::new());
        assert_eq!(agenda_scope(&admin, None), ListScope::All);
        assert_eq!(agenda_scope(&admin, Some(unit)), ListScope::Unit(unit));
    }

    #[test]
    fn coverage_scopes_by_role() {
        let staff_id = Ulid::new();
        let unit = Ulid::new();
        assert_eq!(coverage_scope(&Caller::admin(Ulid::new())), ListScope::All);
        assert_eq!(
            coverage_scope(&Caller::staff(staff_id)),
            ListScope::Assignee(staff_id)
        );
        assert_eq!(
            coverage_scope(&Caller::occupant(Ulid::new(), unit)),
            ListScope::Unit(unit)
        );
    }
}
