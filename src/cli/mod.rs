use clap::Parser;
use std::time::Duration;
use url::Url;

pub const DEFAULT_INSTALLER_URL: &str = "https://ollama.com/download/OllamaSetup.exe";

/// Installs and starts a local Ollama runtime, then serves a chat page in front of it.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Ollama Runtime Args ---
    /// Ollama executable to run (looked up in PATH unless absolute)
    #[arg(long, env = "OLLAMA_BIN", default_value = "ollama")]
    pub ollama_bin: String,

    /// Host the Ollama server binds to and is reached on
    #[arg(long, env = "OLLAMA_HOST_ADDR", default_value = "127.0.0.1")]
    pub ollama_host: String,

    /// Port of the Ollama API
    #[arg(long, env = "OLLAMA_PORT", default_value = "11434")]
    pub ollama_port: u16,

    /// Model used for chat completion; pulled on startup when missing
    #[arg(long, env = "MODEL_NAME", default_value = "gemma3:1b")]
    pub model: String,

    /// Seconds to wait for the Ollama port to accept connections
    #[arg(long, env = "OLLAMA_WAIT_TIMEOUT_SECS", default_value = "10")]
    pub wait_timeout_secs: u64,

    /// Optional timeout in seconds for a single chat completion request
    #[arg(long, env = "OLLAMA_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Skip installing/starting Ollama and pulling the model (use an already running server)
    #[arg(long, env = "SKIP_BOOTSTRAP", default_value = "false")]
    pub skip_bootstrap: bool,

    // --- Installer Args (Windows only) ---
    /// Download URL of the Ollama Windows installer
    #[arg(long, env = "OLLAMA_INSTALLER_URL", default_value = DEFAULT_INSTALLER_URL)]
    pub installer_url: Url,

    /// Expected SHA-256 (hex) of the downloaded installer. Not verified when unset.
    #[arg(long, env = "OLLAMA_INSTALLER_SHA256")]
    pub installer_sha256: Option<String>,

    // --- Web UI Args ---
    /// Host address and port for the chat UI to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:5000")]
    pub server_addr: String,

    /// Delay in milliseconds before the chat UI is opened in the browser
    #[arg(long, env = "BROWSER_DELAY_MS", default_value = "1000")]
    pub browser_delay_ms: u64,

    /// Do not open the chat UI in the default browser
    #[arg(long, env = "NO_BROWSER", default_value = "false")]
    pub no_browser: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    /// Base URL of the Ollama HTTP API, e.g. `http://127.0.0.1:11434`.
    pub fn ollama_base_url(&self) -> String {
        format!("http://{}:{}", self.ollama_host, self.ollama_port)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn browser_delay(&self) -> Duration {
        Duration::from_millis(self.browser_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_ollama() {
        let args = Args::try_parse_from(["szpont-ai"]).unwrap();
        assert_eq!(args.ollama_port, 11434);
        assert_eq!(args.model, "gemma3:1b");
        assert_eq!(args.ollama_base_url(), "http://127.0.0.1:11434");
        assert_eq!(args.server_addr, "127.0.0.1:5000");
        assert_eq!(args.wait_timeout(), Duration::from_secs(10));
        assert_eq!(args.browser_delay(), Duration::from_millis(1000));
        assert_eq!(args.installer_url.as_str(), DEFAULT_INSTALLER_URL);
        assert!(args.request_timeout().is_none());
    }

    #[test]
    fn ollama_url_follows_host_and_port() {
        let args = Args::try_parse_from([
            "szpont-ai",
            "--ollama-host",
            "localhost",
            "--ollama-port",
            "11500",
        ]).unwrap();
        assert_eq!(args.ollama_base_url(), "http://localhost:11500");
    }

    #[test]
    fn rejects_invalid_installer_url() {
        let res = Args::try_parse_from(["szpont-ai", "--installer-url", "not a url"]);
        assert!(res.is_err());
    }
}
