use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds on the canonical clock — the only time type.
pub type Ms = i64;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Caller roles, assigned by the identity collaborator before the core is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Occupant,
}

/// An already-authenticated caller. Occupants carry the unit they are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Ulid,
    pub role: Role,
    pub unit_id: Option<Ulid>,
}

impl Caller {
    pub fn admin(id: Ulid) -> Self {
        Self { id, role: Role::Admin, unit_id: None }
    }

    pub fn staff(id: Ulid) -> Self {
        Self { id, role: Role::Staff, unit_id: None }
    }

    pub fn occupant(id: Ulid, unit_id: Ulid) -> Self {
        Self { id, role: Role::Occupant, unit_id: Some(unit_id) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgendaKind {
    Move,
    ServiceProvider,
    Visit,
    Departure,
}

impl AgendaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgendaKind::Move => "move",
            AgendaKind::ServiceProvider => "service_provider",
            AgendaKind::Visit => "visit",
            AgendaKind::Departure => "departure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgendaStatus {
    Pending,
    Approved,
    Rejected,
}

impl AgendaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgendaStatus::Pending => "pending",
            AgendaStatus::Approved => "approved",
            AgendaStatus::Rejected => "rejected",
        }
    }
}

/// A scheduling request for a unit-scoped event. Created by submission,
/// mutated only by an approval decision, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agenda {
    pub id: Ulid,
    pub unit_id: Ulid,
    pub requester_id: Ulid,
    pub kind: AgendaKind,
    pub span: Span,
    pub description: String,
    pub status: AgendaStatus,
    pub requires_approval: bool,
}

/// A recurring daily restricted window, in minutes of day `[0, 1440)`.
/// `start_minute > end_minute` means the window wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockWindow {
    pub id: Ulid,
    pub start_minute: u32,
    pub end_minute: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    Pending,
    InProgress,
    Completed,
}

impl CoverageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverageStatus::Pending => "pending",
            CoverageStatus::InProgress => "in_progress",
            CoverageStatus::Completed => "completed",
        }
    }
}

/// A patrol task covering a unit during a recorded departure.
/// Exactly one exists per departure-type agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub id: Ulid,
    pub unit_id: Ulid,
    pub from_agenda_id: Ulid,
    pub title: String,
    pub assigned_to: Option<Ulid>,
    pub status: CoverageStatus,
}

/// Public unit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Ulid,
    pub code: String,
    pub owner_name: String,
}

/// Per-unit scheduling state: the unit record plus every agenda ever
/// recorded against it, sorted by `span.start`.
#[derive(Debug, Clone)]
pub struct UnitState {
    pub id: Ulid,
    pub code: String,
    pub owner_name: String,
    pub agendas: Vec<Agenda>,
}

impl UnitState {
    pub fn new(id: Ulid, code: String, owner_name: String) -> Self {
        Self { id, code, owner_name, agendas: Vec::new() }
    }

    pub fn record(&self) -> Unit {
        Unit {
            id: self.id,
            code: self.code.clone(),
            owner_name: self.owner_name.clone(),
        }
    }

    /// Insert an agenda maintaining sort order by span.start.
    pub fn insert_agenda(&mut self, agenda: Agenda) {
        let pos = self
            .agendas
            .binary_search_by_key(&agenda.span.start, |a| a.span.start)
            .unwrap_or_else(|e| e);
        self.agendas.insert(pos, agenda);
    }

    pub fn agenda_mut(&mut self, id: &Ulid) -> Option<&mut Agenda> {
        self.agendas.iter_mut().find(|a| a.id == *id)
    }

    /// Return only agendas whose span overlaps the query window.
    /// Uses binary search to skip agendas starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Agenda> {
        let right_bound = self
            .agendas
            .partition_point(|a| a.span.start < query.end);
        self.agendas[..right_bound]
            .iter()
            .filter(move |a| a.span.end > query.start)
    }
}

/// The durable record format — flat, one variant per committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    UnitRegistered {
        id: Ulid,
        code: String,
        owner_name: String,
    },
    AgendaSubmitted {
        id: Ulid,
        unit_id: Ulid,
        requester_id: Ulid,
        kind: AgendaKind,
        span: Span,
        description: String,
        status: AgendaStatus,
        requires_approval: bool,
    },
    AgendaDecided {
        id: Ulid,
        unit_id: Ulid,
        status: AgendaStatus,
    },
    CoverageOpened {
        id: Ulid,
        unit_id: Ulid,
        from_agenda_id: Ulid,
        title: String,
    },
    CoverageAssigned {
        id: Ulid,
        assigned_to: Option<Ulid>,
        status: CoverageStatus,
    },
    LockWindowAdded {
        id: Ulid,
        start_minute: u32,
        end_minute: u32,
        enabled: bool,
    },
}
