//! Tests for abort strategies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use diagnos_config::AbortConfig;
use diagnos_test::kb::{session_for, two_batch_kb};

use super::*;

#[test]
fn test_step_count_abort() {
    let session = session_for(&two_batch_kb());
    let model = SearchModel::default();
    let path = Path::new();
    let mut abort = StepCountAbort::new(3);

    abort.init(&model);
    assert!(!abort.next_step(&path, &session));
    assert!(!abort.next_step(&path, &session));
    assert!(abort.next_step(&path, &session));
    assert_eq!(abort.steps(), 3);

    abort.init(&model);
    assert_eq!(abort.steps(), 0);
}

#[test]
fn test_default_step_limit() {
    assert_eq!(StepCountAbort::default().limit(), 100_000);
}

#[test]
fn test_time_abort_zero_limit() {
    let session = session_for(&two_batch_kb());
    let mut abort = TimeAbort::new(Duration::ZERO);
    abort.init(&SearchModel::default());
    assert!(abort.next_step(&Path::new(), &session));
}

#[test]
fn test_time_abort_unlimited() {
    let session = session_for(&two_batch_kb());
    let mut abort = TimeAbort::unlimited();
    abort.init(&SearchModel::default());
    assert!(!abort.next_step(&Path::new(), &session));
    assert_eq!(abort.limit(), None);
}

#[test]
fn test_external_abort() {
    let session = session_for(&two_batch_kb());
    let flag = Arc::new(AtomicBool::new(false));
    let mut abort = ExternalAbort::new(Arc::clone(&flag));

    assert!(!abort.next_step(&Path::new(), &session));
    flag.store(true, Ordering::SeqCst);
    assert!(abort.next_step(&Path::new(), &session));
}

#[test]
fn test_any_abort_counts_every_member() {
    let session = session_for(&two_batch_kb());
    let flag = Arc::new(AtomicBool::new(false));
    let mut abort = AnyAbort::new((StepCountAbort::new(10), ExternalAbort::new(Arc::clone(&flag))));
    abort.init(&SearchModel::default());

    assert!(!abort.next_step(&Path::new(), &session));
    flag.store(true, Ordering::SeqCst);
    assert!(abort.next_step(&Path::new(), &session));
    assert_eq!((abort.0).0.steps(), 2);
}

#[test]
fn test_configured_abort() {
    let config = AbortConfig {
        step_limit: Some(2),
        ..AbortConfig::default()
    };
    let session = session_for(&two_batch_kb());
    let mut abort = ConfiguredAbort::from_config(&config);
    abort.init(&SearchModel::default());

    assert!(!abort.next_step(&Path::new(), &session));
    assert!(abort.next_step(&Path::new(), &session));
    assert_eq!((abort.0).1.limit(), None);
}
