//! Integration tests for CLI routing through RunContext

use crate::integration::test_utils::{echo_client, with_env};
use clap::Parser;
use genfleet::cli::{map_error, Cli, RunContext};
use genfleet::credentials::CredentialStore;
use genfleet::error::ApiError;
use genfleet::provider::mock::{ScriptedClient, ScriptedReply};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Workspace with an explicit config file so no user configuration leaks in
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("genfleet.toml");
        std::fs::write(&config, "[execution]\nconcurrency = 2\n").unwrap();
        Self { dir, config }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cli(&self, args: &[&str]) -> Cli {
        let mut full = vec![
            "genfleet".to_string(),
            "--quiet".to_string(),
            "--config".to_string(),
            self.config.display().to_string(),
        ];
        full.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(full).unwrap()
    }

    fn context(&self, cli: &Cli) -> RunContext {
        RunContext::new(cli)
            .unwrap()
            .with_credential_store(CredentialStore::new(self.path().join("creds/credentials.toml")))
    }

    fn tasks_json(&self, names: &[&str]) -> String {
        let tasks: Vec<serde_json::Value> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "fileName": name,
                    "outputPath": self.path().join("out").join(name),
                    "prompt": format!("build {name}"),
                })
            })
            .collect();
        serde_json::to_string(&tasks).unwrap()
    }
}

#[test]
fn test_from_json_single_mode_writes_files() {
    let ws = Workspace::new();
    let json = ws.tasks_json(&["A.tsx", "B.tsx"]);
    let cli = ws.cli(&["--no-compete", "from-json", &json]);
    let client = echo_client("export const X = 1;");

    let out = ws.context(&cli).with_client(client.clone()).execute(&cli.command).unwrap();

    assert!(out.ends_with("2 of 2 task(s) succeeded, 0 failed"));
    assert_eq!(client.call_count(), 2);
    assert_eq!(
        std::fs::read_to_string(ws.path().join("out/A.tsx")).unwrap(),
        "export const X = 1;"
    );
}

#[test]
fn test_from_template_file_runs_competition_between_models() {
    let ws = Workspace::new();
    let file = ws.path().join("batch.json");
    std::fs::write(&file, ws.tasks_json(&["Card.tsx"])).unwrap();
    let winner = format!("export function Card() {{ return null; }}{}", " ".repeat(120));
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("short"))
            .on_model("beta", ScriptedReply::text(winner.clone())),
    );

    let cli = ws.cli(&["--models", "alpha,beta", "from-template", file.to_str().unwrap()]);
    let out = ws.context(&cli).with_client(client.clone()).execute(&cli.command).unwrap();

    assert!(out.contains("variant: beta"));
    assert!(out.ends_with("1 of 1 task(s) succeeded, 0 failed"));
    assert_eq!(client.call_count(), 2);
    assert_eq!(std::fs::read_to_string(ws.path().join("out/Card.tsx")).unwrap(), winner);
}

#[test]
fn test_failed_tasks_do_not_fail_the_command() {
    let ws = Workspace::new();
    let json = ws.tasks_json(&["A.tsx", "B.tsx"]);
    let cli = ws.cli(&["--no-compete", "from-json", &json]);
    let client = Arc::new(
        ScriptedClient::new(ScriptedReply::text("ok"))
            .on_prompt("build B.tsx", ScriptedReply::fail("blocked")),
    );

    let out = ws.context(&cli).with_client(client).execute(&cli.command).unwrap();

    assert!(out.ends_with("1 of 2 task(s) succeeded, 1 failed"));
    assert!(!ws.path().join("out/B.tsx").exists());
}

#[test]
fn test_invalid_json_is_rejected_before_any_call() {
    let ws = Workspace::new();
    let cli = ws.cli(&["from-json", "[{\"fileName\": 1}]"]);
    let client = echo_client("unused");

    let err = ws.context(&cli).with_client(client.clone()).execute(&cli.command).unwrap_err();

    assert!(map_error(&err).starts_with("Invalid tasks: "));
    assert_eq!(client.call_count(), 0);
}

#[test]
fn test_list_needs_no_credential() {
    let ws = Workspace::new();
    let cli = ws.cli(&["list"]);

    let out = with_env(&ws.dir, &[], || ws.context(&cli).execute(&cli.command).unwrap());

    assert!(out.starts_with("Available presets:"));
    assert!(out.contains("  game-components (5 task(s))"));
    assert!(out.contains("  web-app (3 task(s))"));
}

#[test]
fn test_generation_without_credential_fails_at_setup() {
    let ws = Workspace::new();
    let json = ws.tasks_json(&["A.tsx"]);
    let cli = ws.cli(&["from-json", &json]);

    let err = with_env(&ws.dir, &[], || ws.context(&cli).execute(&cli.command).unwrap_err());

    assert!(matches!(err, ApiError::CredentialMissing));
    assert!(!ws.path().join("out/A.tsx").exists());
}

#[test]
fn test_api_key_lifecycle() {
    let ws = Workspace::new();
    with_env(&ws.dir, &[], || {
        let set = ws.cli(&["api", "set", "AIzaSyExample1234"]);
        let out = ws.context(&set).execute(&set.command).unwrap();
        assert!(out.starts_with("API key saved to "));

        let status = ws.cli(&["api", "status"]);
        let out = ws.context(&status).execute(&status.command).unwrap();
        assert!(out.contains("configured via credential file"));
        assert!(out.ends_with("Key: AIza...1234"));

        let delete = ws.cli(&["api", "delete"]);
        assert_eq!(
            ws.context(&delete).execute(&delete.command).unwrap(),
            "Stored API key deleted"
        );
        assert_eq!(
            ws.context(&status).execute(&status.command).unwrap(),
            "API key: not configured"
        );
    });
}

#[test]
fn test_analyze_routes_to_analyzer() {
    let ws = Workspace::new();
    let src = ws.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("main.rs"), "fn main() {}\n").unwrap();
    let report = ws.path().join("report.txt");
    let client = echo_client("## Summary\nTiny program.\n");

    let cli = ws.cli(&[
        "analyze",
        "--mode",
        "architect",
        "module boundaries",
        src.to_str().unwrap(),
        "-o",
        report.to_str().unwrap(),
    ]);
    let out = ws.context(&cli).with_client(client.clone()).execute(&cli.command).unwrap();

    assert!(out.starts_with("Analysis (architect)"));
    assert!(out.contains("Summary:\nTiny program."));
    assert!(out.ends_with(&format!("Report written to {}", report.display())));
    assert!(report.exists());
    assert_eq!(client.call_count(), 1);
    assert!(client.requests()[0].prompt.contains("Pay particular attention to: module boundaries"));
}
