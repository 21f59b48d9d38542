//! Bootstrapping of the local Ollama runtime: install, launch, wait, pull.

pub mod install;
pub mod model;
pub mod server;

use thiserror::Error;
use tokio::process::Command;

pub use install::{ ensure_installed, is_installed, kill_gui };
pub use model::{ ensure_model, model_listed };
pub use server::{ wait_for_port, OllamaServer };

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to download installer: {0}")]
    Download(String),

    #[error("installer checksum mismatch, expected {expected}, got {actual}")]
    ChecksumMismatch {
        expected: String,
        actual: String,
    },

    #[error("installer exited with status {0}")]
    InstallerFailed(String),

    #[error("failed to start `{bin} serve`: {source}")]
    ServerStart {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Ollama server process exited early with status {0}")]
    ServerExited(String),

    #[error("Ollama server did not accept connections on {addr} within {secs}s, check the installation")]
    ServerTimeout {
        addr: String,
        secs: u64,
    },

    #[error("`{command}` failed: {detail}")]
    Command {
        command: String,
        detail: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A `<bin>` invocation aimed at the server on `host:port`. Every ollama
/// subcommand (`serve`, `list`, `pull`) reads `OLLAMA_HOST`.
pub(crate) fn ollama_command(bin: &str, host: &str, port: u16) -> Command {
    let mut cmd = Command::new(bin);
    cmd.env("OLLAMA_HOST", format!("{}:{}", host, port));
    cmd
}
