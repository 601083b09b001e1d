use std::sync::Arc;
use std::time::Duration;

use scribeflow::application::orchestration::{
    ActivityError, ActivityExecutor, OrchestrationEngine, OrchestrationError, RetryPolicy,
};
use scribeflow::application::ports::HistoryStore;
use scribeflow::domain::{InstanceId, RunStatus};
use scribeflow::infrastructure::persistence::InMemoryHistoryStore;
use serde_json::json;

use crate::helpers::{CrashingHistoryStore, ScriptedActivity, SequenceOrchestration};

struct Activities {
    a: Arc<ScriptedActivity>,
    b: Arc<ScriptedActivity>,
    c: Arc<ScriptedActivity>,
}

impl Activities {
    fn echo() -> Self {
        Self {
            a: Arc::new(ScriptedActivity::echo("A")),
            b: Arc::new(ScriptedActivity::echo("B")),
            c: Arc::new(ScriptedActivity::echo("C")),
        }
    }

    fn engine(&self, store: Arc<dyn HistoryStore>) -> OrchestrationEngine {
        let executor = ActivityExecutor::new(RetryPolicy::new(
            2,
            Duration::from_millis(1),
            Duration::from_millis(1),
        ))
        .register(self.a.clone())
        .register(self.b.clone())
        .register(self.c.clone());
        OrchestrationEngine::new(store, Arc::new(executor))
    }
}

fn three_steps() -> SequenceOrchestration {
    SequenceOrchestration {
        steps: vec![("A", json!("x")), ("B", json!("y")), ("C", json!("z"))],
    }
}

#[tokio::test]
async fn given_fresh_instance_when_running_then_executes_each_activity_once_and_completes() {
    let activities = Activities::echo();
    let store = Arc::new(InMemoryHistoryStore::new());
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();

    let succeeded = engine.run(&three_steps(), instance_id).await.unwrap();

    assert_eq!(succeeded, 3);
    assert_eq!((activities.a.calls(), activities.b.calls(), activities.c.calls()), (1, 1, 1));
    let run = store.load_run(instance_id).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.history.len(), 3);
    assert_eq!(run.output, Some(json!(3)));
}

#[tokio::test]
async fn given_crash_after_two_recorded_calls_when_resuming_then_recorded_calls_are_not_reexecuted()
{
    let activities = Activities::echo();
    let store = Arc::new(CrashingHistoryStore::crash_after(2));
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();

    let first = engine.run(&three_steps(), instance_id).await;
    assert!(matches!(first, Err(OrchestrationError::History(_))));
    let interrupted = store.load_run(instance_id).await.unwrap().unwrap();
    assert_eq!(interrupted.status, RunStatus::Running);
    assert_eq!(interrupted.history.len(), 2);

    store.recover();
    let succeeded = engine.run(&three_steps(), instance_id).await.unwrap();

    assert_eq!(succeeded, 3);
    assert_eq!(activities.a.calls(), 1);
    assert_eq!(activities.b.calls(), 1);
    // C ran before the crash but its outcome was never recorded.
    assert_eq!(activities.c.calls(), 2);
}

#[tokio::test]
async fn given_reordered_calls_when_replaying_then_run_aborts_with_history_mismatch() {
    let activities = Activities::echo();
    let store = Arc::new(CrashingHistoryStore::crash_after(1));
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();
    let _ = engine.run(&three_steps(), instance_id).await;
    store.recover();

    let reordered = SequenceOrchestration {
        steps: vec![("B", json!("y")), ("A", json!("x"))],
    };
    let result = engine.run(&reordered, instance_id).await;

    match result {
        Err(OrchestrationError::HistoryMismatch { position, recorded, called }) => {
            assert_eq!(position, 0);
            assert!(recorded.starts_with("A#"));
            assert!(called.starts_with("B#"));
        }
        other => panic!("expected history mismatch, got {:?}", other),
    }
    let run = store.load_run(instance_id).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Aborted);

    let again = engine.run(&three_steps(), instance_id).await;
    assert!(matches!(again, Err(OrchestrationError::RunAborted { .. })));
}

#[tokio::test]
async fn given_same_activity_with_different_input_when_replaying_then_history_mismatch() {
    let activities = Activities::echo();
    let store = Arc::new(CrashingHistoryStore::crash_after(1));
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();
    let _ = engine.run(&three_steps(), instance_id).await;
    store.recover();

    let changed = SequenceOrchestration {
        steps: vec![("A", json!("other")), ("B", json!("y"))],
    };
    let result = engine.run(&changed, instance_id).await;

    assert!(matches!(result, Err(OrchestrationError::HistoryMismatch { position: 0, .. })));
    assert_eq!(activities.a.calls(), 1);
}

#[tokio::test]
async fn given_controller_finishing_early_when_history_has_more_calls_then_history_mismatch() {
    let activities = Activities::echo();
    let store = Arc::new(CrashingHistoryStore::crash_after(2));
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();
    let _ = engine.run(&three_steps(), instance_id).await;
    store.recover();

    let shorter = SequenceOrchestration {
        steps: vec![("A", json!("x"))],
    };
    let result = engine.run(&shorter, instance_id).await;

    assert!(matches!(result, Err(OrchestrationError::HistoryMismatch { position: 1, .. })));
    let run = store.load_run(instance_id).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Aborted);
}

#[tokio::test]
async fn given_recorded_failure_when_replaying_then_failure_is_returned_without_reexecution() {
    let activities = Activities {
        a: Arc::new(ScriptedActivity::scripted(
            "A",
            vec![Err(ActivityError::Rejected("no".to_string()))],
        )),
        ..Activities::echo()
    };
    let store = Arc::new(CrashingHistoryStore::crash_after(1));
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();
    let _ = engine.run(&three_steps(), instance_id).await;
    store.recover();

    let succeeded = engine.run(&three_steps(), instance_id).await.unwrap();

    assert_eq!(succeeded, 2);
    assert_eq!(activities.a.calls(), 1);
}

#[tokio::test]
async fn given_completed_run_when_running_again_then_returns_sealed_output_without_executing() {
    let activities = Activities::echo();
    let store = Arc::new(InMemoryHistoryStore::new());
    let engine = activities.engine(store.clone());
    let instance_id = InstanceId::new();
    engine.run(&three_steps(), instance_id).await.unwrap();

    let output = engine.run(&three_steps(), instance_id).await.unwrap();

    assert_eq!(output, 3);
    assert_eq!(activities.a.calls(), 1);
}
