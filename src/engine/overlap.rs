use crate::limits::*;
use crate::model::{Ms, Span, UnitState};

use super::EngineError;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

pub(crate) fn validate_span(span: &Span) -> Result<(), EngineError> {
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("span too wide"));
    }
    Ok(())
}

/// Unit-scoped exclusivity check over every stored agenda, regardless of
/// status — a rejected request's interval still holds its slot. Touching
/// endpoints do not conflict.
///
/// The caller must hold the unit's write lock across this check and the
/// subsequent insert; that pair is the serialization point that prevents
/// two concurrent submissions from both passing.
pub fn check_no_conflict(unit: &UnitState, candidate: &Span) -> Result<(), EngineError> {
    if let Some(existing) = unit.overlapping(candidate).next() {
        return Err(EngineError::Conflict(existing.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Agenda, AgendaKind, AgendaStatus};
    use ulid::Ulid;

    const H: Ms = 3_600_000;

    fn unit_with(agendas: Vec<(Ms, Ms, AgendaStatus)>) -> UnitState {
        let mut unit = UnitState::new(Ulid::new(), "101".into(), "Ada".into());
        for (start, end, status) in agendas {
            unit.insert_agenda(Agenda {
                id: Ulid::new(),
                unit_id: unit.id,
                requester_id: Ulid::new(),
                kind: AgendaKind::Visit,
                span: Span::new(start, end),
                description: String::new(),
                status,
                requires_approval: false,
            });
        }
        unit
    }

    #[test]
    fn overlap_is_symmetric_and_reflexive() {
        let a = Span::new(10 * H, 12 * H);
        let b = Span::new(11 * H, 13 * H);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let unit = unit_with(vec![(10 * H, 12 * H, AgendaStatus::Approved)]);
        assert!(check_no_conflict(&unit, &Span::new(12 * H, 13 * H)).is_ok());
        assert!(check_no_conflict(&unit, &Span::new(9 * H, 10 * H)).is_ok());
    }

    #[test]
    fn mid_interval_overlap_conflicts() {
        let unit = unit_with(vec![(10 * H, 12 * H, AgendaStatus::Approved)]);
        let err = check_no_conflict(&unit, &Span::new(11 * H, 13 * H)).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn rejected_agenda_still_blocks() {
        let unit = unit_with(vec![(10 * H, 12 * H, AgendaStatus::Rejected)]);
        let err = check_no_conflict(&unit, &Span::new(11 * H, 13 * H)).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn empty_unit_never_conflicts() {
        let unit = unit_with(vec![]);
        assert!(check_no_conflict(&unit, &Span::new(0, H)).is_ok());
    }

    #[test]
    fn span_limits_enforced() {
        assert!(validate_span(&Span::new(0, H)).is_ok());
        assert!(matches!(
            validate_span(&Span::new(-1, H)),
            Err(EngineError::LimitExceeded(_))
        ));
        assert!(matches!(
            validate_span(&Span::new(0, MAX_SPAN_DURATION_MS + 1)),
            Err(EngineError::LimitExceeded(_))
        ));
    }
}
