use std::fs;
use std::path::Path;

use anyhow::Context;

use atelier_core::config::AppConfig;
use atelier_core::{distribute, InMemoryPromiseSource, PromiseSnapshot};

use crate::commands::CommandResult;

/// Loads a promise snapshot file and splits its commission pool. When the
/// file carries no commission settings, the configured studio settings apply.
pub fn run(config: &AppConfig, promise_path: &Path) -> CommandResult {
    let mut snapshot = match load_snapshot(promise_path) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            return CommandResult::failure("distribute", "promise_load", format!("{error:#}"), 4)
        }
    };
    if snapshot.settings.is_none() {
        snapshot.settings = Some(config.commission.clone());
    }
    let promise_id = snapshot.attribution.promise_id.clone();

    let mut source = InMemoryPromiseSource::new();
    source.insert(promise_id.clone(), snapshot);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "distribute",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(distribute(&source, &promise_id)) {
        Ok(split) => match serde_json::to_value(&split) {
            Ok(data) => {
                CommandResult::success_with_data("distribute", "split commission pool", data)
            }
            Err(error) => {
                CommandResult::failure("distribute", "serialization", error.to_string(), 3)
            }
        },
        Err(error) => CommandResult::failure("distribute", "not_found", error.to_string(), 2),
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<PromiseSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read promise file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse promise file `{}`", path.display()))
}
