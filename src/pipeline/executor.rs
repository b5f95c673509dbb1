//! Concurrent fan-out/fan-in execution of source tasks.
//!
//! Every task runs to completion with full isolation: an error in one task
//! is logged and recorded as an absent result without disturbing the rest
//! of the run. The same execution path serves both consumption modes;
//! streaming consumers receive one event per task in real completion order.

use crate::pipeline::events::{PipelineEvent, ProgressEvent};
use crate::types::{Result, SourceResult};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// A boxed source operation, bound to its parameters at construction time.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<SourceResult>> + Send>>;

/// A task ready to run: id, display label, and the bound operation.
pub struct PreparedTask {
    pub id: String,
    pub label: String,
    pub future: TaskFuture,
}

impl PreparedTask {
    pub fn new(id: impl Into<String>, label: impl Into<String>, future: TaskFuture) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            future,
        }
    }
}

/// Run every task concurrently and collect the full id → result mapping.
///
/// When an event sender is provided, exactly one `task_done` event is
/// emitted per task as it completes, before its result is recorded. The
/// run always drains to completion; a dropped receiver does not cancel it.
pub async fn run_all(
    tasks: Vec<PreparedTask>,
    events: Option<&mpsc::Sender<PipelineEvent>>,
) -> HashMap<String, Option<SourceResult>> {
    let total = tasks.len();
    let mut pending: FuturesUnordered<_> = tasks.into_iter().map(guard).collect();

    let mut results = HashMap::with_capacity(total);
    let mut completed = 0;

    while let Some((id, label, outcome)) = pending.next().await {
        completed += 1;
        if let Some(tx) = events {
            let event =
                ProgressEvent::task_done(&id, &label, outcome.as_ref(), completed, total);
            if tx.send(PipelineEvent::Status(event)).await.is_err() {
                tracing::debug!(task = %id, "event receiver dropped, continuing run");
            }
        }
        results.insert(id, outcome);
    }

    results
}

/// Isolate one task: its error becomes an absent result and a diagnostic,
/// never a failure of the run.
async fn guard(task: PreparedTask) -> (String, String, Option<SourceResult>) {
    let PreparedTask { id, label, future } = task;
    let outcome = match future.await {
        Ok(result) => Some(result),
        Err(err) => {
            tracing::warn!(task = %id, error = %err, "source task failed");
            None
        }
    };
    (id, label, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::{Phase, TaskState};
    use crate::types::{AppError, SearchHit};
    use std::time::Duration;

    fn ok_task(id: &str, url: &str, delay_ms: u64) -> PreparedTask {
        let url = url.to_string();
        PreparedTask::new(
            id,
            id,
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(SourceResult::Search(vec![SearchHit {
                    title: "t".to_string(),
                    url,
                    snippet: "s".to_string(),
                    source: "google".to_string(),
                }]))
            }),
        )
    }

    fn failing_task(id: &str) -> PreparedTask {
        PreparedTask::new(
            id,
            id,
            Box::pin(async { Err(AppError::Source("boom".to_string())) }),
        )
    }

    #[tokio::test]
    async fn collects_every_task_result() {
        let tasks = vec![
            ok_task("a", "https://a", 0),
            ok_task("b", "https://b", 0),
            ok_task("c", "https://c", 0),
        ];
        let results = run_all(tasks, None).await;
        assert_eq!(results.len(), 3);
        assert!(results.values().all(Option::is_some));
    }

    #[tokio::test]
    async fn one_failure_does_not_disturb_the_others() {
        let tasks = vec![
            ok_task("good", "https://a", 10),
            failing_task("bad"),
            ok_task("slow", "https://b", 30),
        ];
        let results = run_all(tasks, None).await;

        assert_eq!(results.len(), 3);
        assert!(results["good"].is_some());
        assert!(results["bad"].is_none());
        assert!(results["slow"].is_some());
    }

    #[tokio::test]
    async fn emits_exactly_one_event_per_task() {
        let (tx, mut rx) = mpsc::channel(16);
        let tasks = vec![
            ok_task("a", "https://a", 20),
            failing_task("b"),
            ok_task("c", "https://c", 0),
        ];
        let results = run_all(tasks, Some(&tx)).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            if let PipelineEvent::Status(status) = event {
                events.push(status);
            }
        }

        assert_eq!(results.len(), 3);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.step == Phase::TaskDone));
        // Completion counters are monotone 1..=N regardless of order.
        let counters: Vec<usize> = events.iter().map(|e| e.completed).collect();
        assert_eq!(counters, vec![1, 2, 3]);
        // The failing task reports an error state.
        let failed = events
            .iter()
            .find(|e| e.task_id.as_deref() == Some("b"))
            .expect("event for failing task");
        assert_eq!(failed.state, TaskState::Error);
    }

    #[tokio::test]
    async fn events_arrive_in_completion_order_not_launch_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let tasks = vec![ok_task("slow", "https://s", 50), ok_task("fast", "https://f", 0)];
        run_all(tasks, Some(&tx)).await;
        drop(tx);

        let mut order = Vec::new();
        while let Some(PipelineEvent::Status(status)) = rx.recv().await {
            if let Some(id) = status.task_id {
                order.push(id);
            }
        }
        assert_eq!(order, vec!["fast".to_string(), "slow".to_string()]);
    }
}
