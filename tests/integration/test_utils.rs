//! Shared test utilities for integration tests

use genfleet::provider::mock::{ScriptedClient, ScriptedReply};
use genfleet::Task;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Tasks `t0..tn` writing into `dir`, each prompt naming its own index
pub fn numbered_tasks(dir: &Path, n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| {
            Task::new(
                format!("t{i}.tsx"),
                dir.join(format!("out/t{i}.tsx")),
                format!("prompt-{i}"),
            )
        })
        .collect()
}

/// Client that echoes a fixed text for every request
pub fn echo_client(text: &str) -> Arc<ScriptedClient> {
    Arc::new(ScriptedClient::new(ScriptedReply::text(text)))
}

/// Serializes tests that change process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after a test
struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(keys: &[&'static str]) -> Self {
        Self {
            saved: keys.iter().map(|k| (*k, std::env::var(k).ok())).collect(),
        }
    }

    fn restore(self) {
        for (key, value) in self.saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Run `f` with `XDG_CONFIG_HOME` pointing into `test_dir` and `vars` set.
///
/// Every variable touched is restored afterwards, even when `f` panics.
pub fn with_env<F, R>(test_dir: &TempDir, vars: &[(&'static str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let mut keys: Vec<&'static str> = vars.iter().map(|(k, _)| *k).collect();
    keys.extend(["XDG_CONFIG_HOME", "GEMINI_API_KEY", "GENFLEET_ENV"]);
    let env_state = EnvState::capture(&keys);

    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());
    std::env::remove_var("GEMINI_API_KEY");
    std::env::remove_var("GENFLEET_ENV");
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    env_state.restore();

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
