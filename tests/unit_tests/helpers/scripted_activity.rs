use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use scribeflow::application::orchestration::{
    Activity, ActivityError, Orchestration, OrchestrationContext, OrchestrationError,
};

/// Activity that replays a fixed list of results, then echoes its input.
pub struct ScriptedActivity {
    name: &'static str,
    script: Mutex<Vec<Result<Value, ActivityError>>>,
    calls: AtomicUsize,
}

impl ScriptedActivity {
    pub fn echo(name: &'static str) -> Self {
        Self::scripted(name, Vec::new())
    }

    pub fn scripted(name: &'static str, mut script: Vec<Result<Value, ActivityError>>) -> Self {
        script.reverse();
        Self {
            name,
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Activity for ScriptedActivity {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, input: Value) -> Result<Value, ActivityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop() {
            Some(result) => result,
            None => Ok(json!({ "echo": input })),
        }
    }
}

/// Calls the given activities in order and returns how many succeeded.
pub struct SequenceOrchestration {
    pub steps: Vec<(&'static str, Value)>,
}

#[async_trait]
impl Orchestration for SequenceOrchestration {
    type Output = usize;

    fn name(&self) -> &str {
        "sequence"
    }

    async fn run(&self, ctx: &mut OrchestrationContext) -> Result<usize, OrchestrationError> {
        let mut succeeded = 0;
        for (name, input) in &self.steps {
            let result: Result<Value, _> = ctx.call_activity(name, input).await?;
            if result.is_ok() {
                succeeded += 1;
            }
        }
        Ok(succeeded)
    }
}
