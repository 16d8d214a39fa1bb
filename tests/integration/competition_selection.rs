//! Integration tests for multi-variant competition

use genfleet::competition::{CompetitionEngine, ScoringPolicy, Selector, ALL_FAILED};
use genfleet::provider::mock::{ScriptedClient, ScriptedReply};
use genfleet::provider::SamplingConfig;
use genfleet::variant::{sampling_modes, VariantCharacter};
use genfleet::{BatchSummary, Concurrency, Task, TaskScheduler, Variant};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn three_models() -> Vec<Variant> {
    ["m1", "m2", "m3"]
        .iter()
        .map(|m| Variant::new(*m, *m, SamplingConfig::balanced(), VariantCharacter::Balanced))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_fast_long_answer_beats_short_and_failed_variants() {
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::fail("unreachable"))
            .on_model("m1", ScriptedReply::text("x".repeat(500)).after(Duration::from_secs(1)))
            .on_model("m2", ScriptedReply::text("y".repeat(50)).after(Duration::from_millis(500)))
            .on_model("m3", ScriptedReply::fail("model overloaded")),
    );
    let engine = CompetitionEngine::new(client, Selector::default());
    let task = Task::new("a.tsx", "out/a.tsx", "make a card");

    let result = engine.compete(&task, &three_models()).await;

    assert_eq!(result.best, Some(0));
    assert_eq!(result.outcomes[0].score, Some(110.0));
    assert_eq!(result.outcomes[1].score, Some(90.0));
    assert_eq!(result.outcomes[2].score, None);
    assert_eq!(result.outcomes[2].error(), Some("Provider request failed: model overloaded"));
    assert!(result.justification.starts_with("variant: m1 | score: 110.00"));
}

#[tokio::test]
async fn test_every_variant_failing_has_no_winner() {
    let client = Arc::new(ScriptedClient::new(ScriptedReply::fail("down")));
    let engine = CompetitionEngine::new(client.clone(), Selector::default());

    let result = engine
        .compete(&Task::new("a.tsx", "out/a.tsx", "p"), &three_models())
        .await;

    assert_eq!(result.best, None);
    assert_eq!(result.justification, ALL_FAILED);
    assert!(result.outcomes.iter().all(|o| o.error().is_some()));
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_empty_content_is_not_eligible() {
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text(""))
            .on_model("m3", ScriptedReply::text("short")),
    );
    let engine = CompetitionEngine::new(client, Selector::default());

    let result = engine
        .compete(&Task::new("a.tsx", "out/a.tsx", "p"), &three_models())
        .await;

    assert_eq!(result.best, Some(2));
    assert_eq!(result.outcomes[0].score, None);
}

#[tokio::test]
async fn test_winner_written_into_missing_directory() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out/a.tsx");
    assert!(!temp.path().join("out").exists());

    let winner = format!("export const A = () => null;{}", " ".repeat(200));
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("tiny"))
            .on_model("m2", ScriptedReply::text(winner.clone())),
    );
    let scheduler = TaskScheduler::new(client, "m1", Concurrency::default());

    let results = scheduler
        .run_competition(vec![Task::new("a.tsx", &output, "p")], three_models())
        .await;

    assert_eq!(results[0].best, Some(1));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), winner);
    assert_eq!(BatchSummary::from_results(&results).succeeded, 1);
}

#[tokio::test]
async fn test_sampling_modes_send_distinct_configs_to_one_model() {
    let client = Arc::new(ScriptedClient::new(ScriptedReply::text("const a = 1;")));
    let engine = CompetitionEngine::new(client.clone(), Selector::default());

    engine
        .compete(&Task::new("a.ts", "out/a.ts", "p"), &sampling_modes("flash"))
        .await;

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.model == "flash"));
    let mut temperatures: Vec<f32> = requests.iter().map(|r| r.sampling.temperature).collect();
    temperatures.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(temperatures, vec![0.2, 0.5, 0.9]);
}

#[tokio::test]
async fn test_custom_policy_changes_winner() {
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("plain text"))
            .on_model("m2", ScriptedReply::text("fn main() {}")),
    );
    let policy = ScoringPolicy {
        keywords: vec!["fn".to_string()],
        keyword_bonus: 50.0,
        ..ScoringPolicy::default()
    };
    let engine = CompetitionEngine::new(client, Selector::from_policy(policy));

    let result = engine
        .compete(&Task::new("a.rs", "out/a.rs", "p"), &three_models())
        .await;

    assert_eq!(result.best, Some(1));
}
