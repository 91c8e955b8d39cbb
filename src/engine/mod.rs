mod access;
mod approval;
mod error;
mod mutations;
mod overlap;
mod queries;
mod window;

pub use access::{ListScope, agenda_scope, coverage_scope};
pub use approval::{initial_status, requires_approval};
pub use error::EngineError;
pub use overlap::check_no_conflict;
pub use window::{minute_of_day, span_touches_window, window_contains_minute};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, oneshot};
use ulid::Ulid;

use crate::audit::AuditHub;
use crate::model::*;
use crate::wal::Wal;

pub type SharedUnitState = Arc<RwLock<UnitState>>;
pub type SharedCoverage = Arc<RwLock<Coverage>>;

// ── Group-commit WAL channel ─────────────────────────────

pub(super) struct WalAppend {
    event: Event,
    response: oneshot::Sender<io::Result<()>>,
}

/// Background task that owns the WAL and batches appends for group commit:
/// block until the first append arrives, drain everything immediately
/// available, then a single flush+fsync for the whole batch.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalAppend>) {
    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }

        metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE)
            .record(batch.len() as f64);
        let flush_start = std::time::Instant::now();
        let result = flush_batch(&mut wal, &batch);
        metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
            .record(flush_start.elapsed().as_secs_f64());
        respond_batch(batch, &result);
    }
}

fn flush_batch(wal: &mut Wal, batch: &[WalAppend]) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for entry in batch {
        if let Err(e) = wal.append_buffered(&entry.event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = wal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn respond_batch(batch: Vec<WalAppend>, result: &io::Result<()>) {
    for entry in batch {
        let r = match result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = entry.response.send(r);
    }
}

/// The scheduling decision engine. Per-unit agenda state lives behind one
/// `RwLock` each; holding a unit's write guard across the conflict check and
/// the insert is what makes check-and-insert atomic per unit. Submissions
/// for different units never contend.
pub struct Engine {
    pub(super) units: DashMap<Ulid, SharedUnitState>,
    pub(super) coverages: DashMap<Ulid, SharedCoverage>,
    /// Reverse lookup: agenda id → owning unit id.
    pub(super) agenda_to_unit: DashMap<Ulid, Ulid>,
    /// 1:1 departure agenda → coverage index.
    pub(super) coverage_by_agenda: DashMap<Ulid, Ulid>,
    /// Stored lock windows in insertion order; evaluation consults the
    /// first enabled one.
    pub(super) lock_windows: RwLock<Vec<LockWindow>>,
    wal_tx: mpsc::Sender<WalAppend>,
    pub audit: Arc<AuditHub>,
}

impl Engine {
    pub fn new(wal_path: PathBuf, audit: Arc<AuditHub>) -> io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let engine = Self {
            units: DashMap::new(),
            coverages: DashMap::new(),
            agenda_to_unit: DashMap::new(),
            coverage_by_agenda: DashMap::new(),
            lock_windows: RwLock::new(Vec::new()),
            wal_tx,
            audit,
        };

        // Replay — we're the sole owner of every Arc here, so try_write
        // always succeeds instantly. Never use blocking_write here because
        // this runs inside an async context.
        for event in &events {
            engine.apply_replayed(event);
        }

        Ok(engine)
    }

    fn apply_replayed(&self, event: &Event) {
        match event {
            Event::UnitRegistered { id, code, owner_name } => {
                let unit = UnitState::new(*id, code.clone(), owner_name.clone());
                self.units.insert(*id, Arc::new(RwLock::new(unit)));
            }
            Event::AgendaSubmitted {
                id,
                unit_id,
                requester_id,
                kind,
                span,
                description,
                status,
                requires_approval,
            } => {
                if let Some(entry) = self.units.get(unit_id) {
                    let unit = entry.value().clone();
                    let mut guard = unit.try_write().expect("replay: uncontended write");
                    guard.insert_agenda(Agenda {
                        id: *id,
                        unit_id: *unit_id,
                        requester_id: *requester_id,
                        kind: *kind,
                        span: *span,
                        description: description.clone(),
                        status: *status,
                        requires_approval: *requires_approval,
                    });
                    self.agenda_to_unit.insert(*id, *unit_id);
                }
            }
            Event::AgendaDecided { id, unit_id, status } => {
                if let Some(entry) = self.units.get(unit_id) {
                    let unit = entry.value().clone();
                    let mut guard = unit.try_write().expect("replay: uncontended write");
                    if let Some(agenda) = guard.agenda_mut(id) {
                        agenda.status = *status;
                    }
                }
            }
            Event::CoverageOpened { id, unit_id, from_agenda_id, title } => {
                let coverage = Coverage {
                    id: *id,
                    unit_id: *unit_id,
                    from_agenda_id: *from_agenda_id,
                    title: title.clone(),
                    assigned_to: None,
                    status: CoverageStatus::Pending,
                };
                self.coverages.insert(*id, Arc::new(RwLock::new(coverage)));
                self.coverage_by_agenda.insert(*from_agenda_id, *id);
            }
            Event::CoverageAssigned { id, assigned_to, status } => {
                if let Some(entry) = self.coverages.get(id) {
                    let coverage = entry.value().clone();
                    let mut guard = coverage.try_write().expect("replay: uncontended write");
                    guard.assigned_to = *assigned_to;
                    guard.status = *status;
                }
            }
            Event::LockWindowAdded { id, start_minute, end_minute, enabled } => {
                let mut windows = self
                    .lock_windows
                    .try_write()
                    .expect("replay: uncontended write");
                windows.push(LockWindow {
                    id: *id,
                    start_minute: *start_minute,
                    end_minute: *end_minute,
                    enabled: *enabled,
                });
            }
        }
    }

    /// Write an event to the WAL via the background group-commit writer.
    /// Success here is the commit point of the enclosing mutation.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalAppend {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub fn get_unit(&self, id: &Ulid) -> Option<SharedUnitState> {
        self.units.get(id).map(|e| e.value().clone())
    }

    pub fn unit_for_agenda(&self, agenda_id: &Ulid) -> Option<Ulid> {
        self.agenda_to_unit.get(agenda_id).map(|e| *e.value())
    }

    pub(super) fn get_coverage_handle(&self, id: &Ulid) -> Option<SharedCoverage> {
        self.coverages.get(id).map(|e| e.value().clone())
    }

    /// Lookup agenda → unit, get the unit, acquire its write lock.
    pub(super) async fn resolve_agenda_write(
        &self,
        agenda_id: &Ulid,
    ) -> Result<tokio::sync::OwnedRwLockWriteGuard<UnitState>, EngineError> {
        let unit_id = self
            .unit_for_agenda(agenda_id)
            .ok_or(EngineError::NotFound(*agenda_id))?;
        let unit = self
            .get_unit(&unit_id)
            .ok_or(EngineError::NotFound(unit_id))?;
        Ok(unit.write_owned().await)
    }
}
