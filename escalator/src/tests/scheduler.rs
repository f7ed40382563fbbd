use super::*;

use crate::scheduler::{WidthRetry, WidthStep};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Task {
    A,
    B,
    C,
}

#[test]
fn coalesces_per_key_across_tiers() {
    let mut s = Scheduler::new();
    assert!(s.is_idle());
    assert!(s.schedule_coalesced(Task::A, Tier::Finally));
    assert!(!s.schedule_coalesced(Task::A, Tier::Finally));
    assert!(!s.schedule_coalesced(Task::A, Tier::Deferred));
    assert!(s.schedule_coalesced(Task::B, Tier::Deferred));
    assert!(s.schedule_coalesced(Task::C, Tier::Finally));

    assert_eq!(s.drain_finally(), vec![Task::A, Task::C]);
    assert!(!s.has_finally());
    assert_eq!(s.drain_deferred(), vec![Task::B]);
    assert!(s.is_idle());
}

#[test]
fn cancelled_tasks_never_run() {
    let mut s = Scheduler::new();
    s.schedule_coalesced(Task::A, Tier::Finally);
    s.schedule_coalesced(Task::B, Tier::Deferred);
    s.schedule_at(Task::C, 100);

    assert!(s.cancel(Task::A));
    assert!(s.cancel(Task::C));
    assert!(!s.cancel(Task::C));
    assert!(s.drain_finally().is_empty());
    assert!(s.drain_due(1_000).is_empty());
    assert!(s.is_scheduled(Task::B));
    assert!(s.schedule_coalesced(Task::A, Tier::Finally));
}

#[test]
fn reschedule_moves_between_tiers() {
    let mut s = Scheduler::new();
    s.schedule_coalesced(Task::A, Tier::Finally);
    s.reschedule(Task::A, Tier::Deferred);
    assert!(!s.has_finally());
    assert!(s.has_deferred());
    s.reschedule(Task::A, Tier::Deferred);
    assert_eq!(s.drain_deferred(), vec![Task::A]);
}

#[test]
fn timers_fire_in_deadline_order() {
    let mut s = Scheduler::new();
    s.schedule_at(Task::A, 300);
    s.schedule_at(Task::B, 100);
    s.schedule_at(Task::C, 200);
    assert_eq!(s.next_due(), Some(100));
    assert!(s.drain_due(99).is_empty());
    assert_eq!(s.drain_due(250), vec![Task::B, Task::C]);

    // Re-arming replaces the deadline.
    s.schedule_at(Task::A, 500);
    assert!(s.drain_due(300).is_empty());
    assert_eq!(s.drain_due(500), vec![Task::A]);
    assert_eq!(s.next_due(), None);
}

#[test]
fn width_retry_escalates_after_the_limit() {
    let mut retry = WidthRetry::new(10);
    for i in 1..=10 {
        assert_eq!(retry.next_step(true, false), WidthStep::Again(Tier::Finally));
        assert_eq!(retry.retries(), i);
    }
    assert_eq!(retry.next_step(true, false), WidthStep::Again(Tier::Deferred));
    assert_eq!(retry.retries(), 0);
    assert_eq!(retry.next_step(true, false), WidthStep::Again(Tier::Finally));
    assert_eq!(retry.next_step(false, false), WidthStep::Run);
    assert_eq!(retry.retries(), 0);
}

#[test]
fn width_retry_waits_for_data() {
    let mut retry = WidthRetry::new(10);
    assert_eq!(retry.next_step(false, true), WidthStep::Again(Tier::Deferred));
    assert_eq!(retry.next_step(false, true), WidthStep::Again(Tier::Deferred));
    assert_eq!(retry.next_step(false, false), WidthStep::Run);
}

#[test]
fn watchdog_warns_once_per_operation() {
    let mut watchdog = OperationWatchdog::new(5000);
    let bind = watchdog.begin(OperationKind::Bind, 7, 1_000);
    let save = watchdog.begin(OperationKind::Save, 8, 4_000);

    assert_eq!(watchdog.check(6_000), 0);
    assert_eq!(watchdog.check(6_001), 1);
    assert_eq!(watchdog.check(8_000), 0);
    assert_eq!(watchdog.check(9_001), 1);
    assert_eq!(watchdog.check(60_000), 0);

    assert_eq!(
        watchdog.pending().collect::<Vec<_>>(),
        vec![(bind, OperationKind::Bind, 7), (save, OperationKind::Save, 8)]
    );
    assert!(watchdog.complete(bind));
    assert!(!watchdog.complete(bind));
    assert!(!watchdog.is_pending(bind));
    assert!(watchdog.is_pending(save));
    assert_eq!(watchdog.pending_count(), 1);
}
