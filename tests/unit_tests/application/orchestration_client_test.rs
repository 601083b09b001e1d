use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scribeflow::application::orchestration::{
    Activity, ActivityError, ActivityExecutor, OrchestrationClient, OrchestrationEngine,
    OrchestrationError, RetryPolicy, TriggerOutcome,
};
use scribeflow::application::ports::HistoryStore;
use scribeflow::domain::{InstanceId, RunStatus};
use scribeflow::infrastructure::persistence::InMemoryHistoryStore;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::helpers::{CrashingHistoryStore, ScriptedActivity, SequenceOrchestration};

/// Blocks until released, keeping its run in flight.
struct GateActivity {
    gate: Arc<Notify>,
}

#[async_trait]
impl Activity for GateActivity {
    fn name(&self) -> &'static str {
        "Gate"
    }

    async fn execute(&self, _input: Value) -> Result<Value, ActivityError> {
        self.gate.notified().await;
        Ok(json!(true))
    }
}

fn client_with(
    store: Arc<dyn HistoryStore>,
    executor: ActivityExecutor,
    steps: Vec<(&'static str, Value)>,
) -> OrchestrationClient<SequenceOrchestration> {
    let engine = Arc::new(OrchestrationEngine::new(store, Arc::new(executor)));
    OrchestrationClient::new(engine, Arc::new(SequenceOrchestration { steps }))
}

async fn wait_until_idle(client: &OrchestrationClient<SequenceOrchestration>) {
    for _ in 0..500 {
        if client.is_idle().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("orchestration did not finish in time");
}

#[tokio::test]
async fn given_active_run_when_starting_another_then_rejected_with_active_instance() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let active = InstanceId::new();
    store.create_run(active, "sequence").await.unwrap();
    let client = client_with(
        store.clone(),
        ActivityExecutor::new(RetryPolicy::no_retry()),
        vec![],
    );

    let result = client.run_new().await;

    match result {
        Err(OrchestrationError::AlreadyRunning { pipeline, active: reported }) => {
            assert_eq!(pipeline, "sequence");
            assert_eq!(reported, active.to_string());
        }
        other => panic!("expected AlreadyRunning, got {:?}", other),
    }
}

#[tokio::test]
async fn given_run_in_flight_when_triggering_again_then_trigger_is_skipped() {
    let gate = Arc::new(Notify::new());
    let executor = ActivityExecutor::new(RetryPolicy::no_retry()).register(Arc::new(GateActivity {
        gate: gate.clone(),
    }));
    let store = Arc::new(InMemoryHistoryStore::new());
    let client = client_with(store.clone(), executor, vec![("Gate", json!(null))]);

    let first = client.trigger().await.unwrap();
    let second = client.trigger().await.unwrap();

    let TriggerOutcome::Started(instance_id) = first else {
        panic!("expected a new run, got {:?}", first);
    };
    assert_eq!(second, TriggerOutcome::Skipped(instance_id));

    gate.notify_one();
    wait_until_idle(&client).await;
    let run = client.status(instance_id).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn given_orphaned_running_instance_when_triggering_then_resumes_it() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let orphan = InstanceId::new();
    store.create_run(orphan, "sequence").await.unwrap();
    let activity = Arc::new(ScriptedActivity::echo("A"));
    let client = client_with(
        store.clone(),
        ActivityExecutor::new(RetryPolicy::no_retry()).register(activity.clone()),
        vec![("A", json!(1))],
    );

    let outcome = client.trigger().await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Resumed(orphan));
    wait_until_idle(&client).await;
    let run = client.status(orphan).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(activity.calls(), 1);
}

#[tokio::test]
async fn given_interrupted_runs_when_resuming_incomplete_then_each_is_completed() {
    let store = Arc::new(CrashingHistoryStore::crash_after(1));
    let activity_a = Arc::new(ScriptedActivity::echo("A"));
    let activity_b = Arc::new(ScriptedActivity::echo("B"));
    let client = client_with(
        store.clone(),
        ActivityExecutor::new(RetryPolicy::no_retry())
            .register(activity_a.clone())
            .register(activity_b.clone()),
        vec![("A", json!(1)), ("B", json!(2))],
    );
    assert!(client.run_new().await.is_err());
    store.recover();

    let resumed = client.resume_incomplete().await.unwrap();

    assert_eq!(resumed, 1);
    assert_eq!(activity_a.calls(), 1);
    assert_eq!(activity_b.calls(), 2);
    assert!(store.list_running().await.unwrap().is_empty());
}

#[tokio::test]
async fn given_unknown_instance_when_querying_status_then_returns_none() {
    let client = client_with(
        Arc::new(InMemoryHistoryStore::new()),
        ActivityExecutor::new(RetryPolicy::no_retry()),
        vec![],
    );

    let status = client.status(InstanceId::new()).await.unwrap();

    assert!(status.is_none());
}
