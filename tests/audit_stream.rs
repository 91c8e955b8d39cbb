//! End-to-end check of the audit fact stream: drive the engine through a
//! full unit → departure → decision → coverage flow and verify the facts a
//! subscriber observes, in order.

use std::path::PathBuf;
use std::sync::Arc;

use ulid::Ulid;

use concierge::audit::{AuditFact, AuditHub};
use concierge::engine::Engine;
use concierge::model::{AgendaKind, AgendaStatus, Caller, CoverageStatus};

fn wal_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("concierge_test_audit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

async fn next(rx: &mut tokio::sync::broadcast::Receiver<AuditFact>) -> AuditFact {
    tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for audit fact")
        .expect("audit stream closed")
}

#[tokio::test]
async fn full_flow_emits_ordered_audit_facts() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let audit = Arc::new(AuditHub::new());
    let engine = Engine::new(wal_path("full_flow.wal"), audit.clone()).unwrap();
    let mut rx = audit.subscribe();

    let admin = Caller::admin(Ulid::new());
    let staff = Caller::staff(Ulid::new());

    let unit = engine
        .register_unit(&admin, "101".into(), "Ada".into())
        .await
        .unwrap();

    let departure = engine
        .submit_agenda(
            &admin,
            unit.id,
            AgendaKind::Departure,
            1_728_000_000_000,
            1_728_043_200_000,
            "away for the weekend".into(),
        )
        .await
        .unwrap();
    let coverage = engine.coverage_for_agenda(&departure.id).await.unwrap();

    engine
        .decide_agenda(&admin, departure.id, AgendaStatus::Approved)
        .await
        .unwrap();
    engine
        .assign_coverage(&staff, coverage.id, Some(staff.id), CoverageStatus::InProgress)
        .await
        .unwrap();

    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("create", "unit"));
    assert_eq!(fact.entity_id, unit.id);
    assert_eq!(fact.actor, admin.id);

    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("create", "agenda"));
    assert_eq!(fact.entity_id, departure.id);

    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("create", "coverage"));
    assert_eq!(fact.entity_id, coverage.id);
    assert_eq!(fact.details, "auto-generated by departure");

    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("approve", "agenda"));
    assert_eq!(fact.entity_id, departure.id);
    assert_eq!(fact.details, "approved");

    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("update", "coverage"));
    assert_eq!(fact.entity_id, coverage.id);
    assert_eq!(fact.actor, staff.id);
}

#[tokio::test]
async fn rejected_submissions_emit_no_facts() {
    let audit = Arc::new(AuditHub::new());
    let engine = Engine::new(wal_path("no_facts.wal"), audit.clone()).unwrap();
    let mut rx = audit.subscribe();

    let admin = Caller::admin(Ulid::new());
    let unit = engine
        .register_unit(&admin, "101".into(), "Ada".into())
        .await
        .unwrap();

    // Invalid interval: denied before any state change
    engine
        .submit_agenda(&admin, unit.id, AgendaKind::Visit, 2_000, 1_000, String::new())
        .await
        .unwrap_err();

    // Only the unit registration is on the stream
    let fact = next(&mut rx).await;
    assert_eq!((fact.action, fact.entity), ("create", "unit"));
    assert!(rx.try_recv().is_err());
}
