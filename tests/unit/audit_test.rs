//! Tests for audit sinks

use prometheus_process_sim::core::{
    AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, ProcessFactory, ProcessKind,
};
use uuid::Uuid;

fn event(action: AuditAction) -> AuditEvent {
    let pid = ProcessFactory::default().new_cpu_process("c", "t", None).id();
    AuditEvent::new(Uuid::new_v4(), pid, ProcessKind::Cpu, action, Some("processing t".into()))
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(event(AuditAction::Started { planned_steps: 3 }));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].pid.get(), 1000);
    assert_eq!(events[0].kind, ProcessKind::Cpu);
    assert_eq!(events[0].action, AuditAction::Started { planned_steps: 3 });
    assert_eq!(events[0].detail.as_deref(), Some("processing t"));
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    sink.record(event(AuditAction::Started { planned_steps: 1 }));
    sink.record(event(AuditAction::Step { index: 1, total: 1, units: 400 }));
    sink.record(event(AuditAction::Completed { steps: 1 }));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, AuditAction::Step { index: 1, total: 1, units: 400 });
    assert_eq!(events[1].action, AuditAction::Completed { steps: 1 });

    sink.clear();
    assert!(sink.events().is_empty());
}

#[test]
fn test_audit_event_serializes() {
    let json = serde_json::to_value(event(AuditAction::Interrupted {
        completed_steps: 1,
        planned_steps: 4,
    }))
    .unwrap();
    assert_eq!(json["kind"], "CPU");
    assert_eq!(json["action"]["interrupted"]["planned_steps"], 4);
}
