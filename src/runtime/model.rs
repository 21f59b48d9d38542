use log::info;
use std::process::Stdio;

use super::{ ollama_command, BootstrapError };

/// Whether `model` shows up in the NAME column of `ollama list` output.
/// A model given without a tag also matches its `:latest` variant.
pub fn model_listed(list_output: &str, model: &str) -> bool {
    let model = model.trim();
    let with_latest = if model.contains(':') { None } else { Some(format!("{}:latest", model)) };

    list_output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| *name != "NAME")
        .any(|name| name == model || with_latest.as_deref() == Some(name))
}

/// Pulls `model` into the server on `host:port` unless `ollama list` already reports it.
pub async fn ensure_model(
    bin: &str,
    host: &str,
    port: u16,
    model: &str
) -> Result<(), BootstrapError> {
    info!("Checking whether model {} is available...", model);

    let output = ollama_command(bin, host, port)
        .arg("list")
        .stdin(Stdio::null())
        .output().await
        .map_err(|e| BootstrapError::Command {
            command: format!("{} list", bin),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BootstrapError::Command {
            command: format!("{} list", bin),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let listed = String::from_utf8_lossy(&output.stdout);
    if model_listed(&listed, model) {
        info!("Model {} is already installed.", model);
        return Ok(());
    }

    info!("Pulling model {} (this can take a few minutes)...", model);
    let command = format!("{} pull {}", bin, model);
    let status = ollama_command(bin, host, port)
        .arg("pull")
        .arg(model)
        .status().await
        .map_err(|e| BootstrapError::Command { command: command.clone(), detail: e.to_string() })?;

    if !status.success() {
        return Err(BootstrapError::Command { command, detail: status.to_string() });
    }

    info!("Model {} pulled.", model);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_OUTPUT: &str =
        "NAME                ID              SIZE      MODIFIED\n\
         gemma3:1b           8648f39daa8f    815 MB    2 days ago\n\
         llama3:latest       365c0bd3c000    4.7 GB    3 weeks ago\n";

    #[test]
    fn finds_exact_tag() {
        assert!(model_listed(LIST_OUTPUT, "gemma3:1b"));
    }

    #[test]
    fn untagged_name_matches_latest() {
        assert!(model_listed(LIST_OUTPUT, "llama3"));
    }

    #[test]
    fn other_tag_of_same_model_does_not_match() {
        assert!(!model_listed(LIST_OUTPUT, "gemma3:4b"));
        assert!(!model_listed(LIST_OUTPUT, "gemma3"));
    }

    #[test]
    fn header_and_empty_output_never_match() {
        assert!(!model_listed(LIST_OUTPUT, "NAME"));
        assert!(!model_listed("", "gemma3:1b"));
    }

    #[tokio::test]
    async fn missing_binary_reports_command_error() {
        let res = ensure_model(
            "szpont-ai-definitely-not-a-real-binary",
            "127.0.0.1",
            11434,
            "gemma3:1b"
        ).await;
        assert!(matches!(res, Err(BootstrapError::Command { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_and_pull_target_configured_server() {
        use crate::runtime::testing::{ calls, fake_ollama, scratch_dir };

        let dir = scratch_dir("model-pull");
        let bin = fake_ollama(&dir, "exit 0");

        ensure_model(bin.to_str().unwrap(), "127.0.0.1", 11500, "gemma3:1b").await.unwrap();

        assert_eq!(calls(&dir), "list 127.0.0.1:11500\npull 127.0.0.1:11500\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn listed_model_is_not_pulled_again() {
        use crate::runtime::testing::{ calls, fake_ollama, scratch_dir };

        let dir = scratch_dir("model-listed");
        let bin = fake_ollama(&dir, "echo 'NAME ID SIZE MODIFIED'\necho 'gemma3:1b abc 815MB now'");

        ensure_model(bin.to_str().unwrap(), "localhost", 11600, "gemma3:1b").await.unwrap();

        assert_eq!(calls(&dir), "list localhost:11600\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
