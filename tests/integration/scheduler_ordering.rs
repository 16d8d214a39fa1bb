//! Integration tests for bounded dispatch and result ordering

use crate::integration::test_utils::numbered_tasks;
use genfleet::progress::{ProgressEvent, RecordingProgress};
use genfleet::provider::mock::{ScriptedClient, ScriptedReply};
use genfleet::{BatchSummary, Concurrency, TaskScheduler};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn randomly_delayed_client(n: usize) -> ScriptedClient {
    let mut rng = rand::thread_rng();
    (0..n).fold(ScriptedClient::new(ScriptedReply::text("unused")), |client, i| {
        let delay = Duration::from_millis(rng.gen_range(0..25));
        client.on_prompt(
            format!("prompt-{i}"),
            ScriptedReply::text(format!("content-{i}")).after(delay),
        )
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_results_match_input_under_random_latency() {
    let temp = TempDir::new().unwrap();
    // Prompts "prompt-1" and "prompt-10" overlap, so stay below ten tasks
    let tasks = numbered_tasks(temp.path(), 9);
    let client = Arc::new(randomly_delayed_client(9));

    for concurrency in [1, 3, 9] {
        let scheduler = TaskScheduler::new(client.clone(), "m", Concurrency::resolve(concurrency));
        let results = scheduler.run_single(tasks.clone()).await;

        assert_eq!(results.len(), tasks.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.task, tasks[i]);
            assert_eq!(result.outcome.as_deref(), Ok(format!("content-{i}").as_str()));
            let written = std::fs::read_to_string(&tasks[i].output_path).unwrap();
            assert_eq!(written, format!("content-{i}"));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_never_exceeds_limit() {
    let temp = TempDir::new().unwrap();
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("ok").after(Duration::from_millis(10))),
    );
    let scheduler = TaskScheduler::new(client.clone(), "m", Concurrency::resolve(2));

    let results = scheduler.run_single(numbered_tasks(temp.path(), 8)).await;

    assert_eq!(BatchSummary::from_results(&results).succeeded, 8);
    assert!(client.peak_in_flight() <= 2);
    assert_eq!(client.call_count(), 8);
}

#[tokio::test]
async fn test_single_slot_runs_tasks_one_at_a_time() {
    let temp = TempDir::new().unwrap();
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("ok").after(Duration::from_millis(5))),
    );
    let scheduler = TaskScheduler::new(client.clone(), "m", Concurrency::resolve(1));

    let results = scheduler.run_single(numbered_tasks(temp.path(), 3)).await;

    assert!(results.iter().all(|r| r.outcome.is_ok()));
    assert_eq!(client.peak_in_flight(), 1);
}

#[test]
fn test_non_positive_concurrency_uses_default() {
    for requested in [0, -1, -100] {
        assert_eq!(Concurrency::resolve(requested).get(), Concurrency::DEFAULT);
    }
    assert_eq!(Concurrency::resolve(12).get(), 12);
}

#[tokio::test]
async fn test_mixed_batch_reports_each_slot() {
    let temp = TempDir::new().unwrap();
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("ok"))
            .on_prompt("prompt-1", ScriptedReply::fail("quota exhausted")),
    );
    let progress = Arc::new(RecordingProgress::new());
    let scheduler = TaskScheduler::new(client, "m", Concurrency::default())
        .with_progress(progress.clone());

    let tasks = numbered_tasks(temp.path(), 3);
    let results = scheduler.run_single(tasks.clone()).await;

    assert!(results[0].outcome.is_ok());
    assert!(results[1].outcome.as_ref().unwrap_err().contains("quota exhausted"));
    assert!(results[2].outcome.is_ok());
    assert!(!tasks[1].output_path.exists());

    let summary = BatchSummary::from_results(&results);
    assert_eq!((summary.succeeded, summary.failed, summary.total), (2, 1, 3));

    let events = progress.events();
    assert!(matches!(events.first(), Some(ProgressEvent::BatchStarted { total: 3, .. })));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::BatchFinished { succeeded: 2, failed: 1, .. })
    ));
}
