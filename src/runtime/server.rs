use log::{ debug, info, warn };
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Child;
use tokio::time::{ sleep, timeout, Instant };

use super::{ ollama_command, BootstrapError };

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls `host:port` until a TCP connection succeeds or `limit` elapses.
pub async fn wait_for_port(host: &str, port: u16, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        match timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => {
                return true;
            }
            Ok(Err(e)) => debug!("{}:{} not reachable yet: {}", host, port, e),
            Err(_) => debug!("{}:{} connect attempt timed out", host, port),
        }
        sleep(POLL_INTERVAL).await;
    }
    false
}

/// Handle to an `ollama serve` process started by us.
pub struct OllamaServer {
    host: String,
    port: u16,
    process: Option<Child>,
}

impl OllamaServer {
    /// Spawns `<bin> serve` with its output discarded. `OLLAMA_HOST` is set so the
    /// server binds the configured address rather than its built-in default.
    pub fn start(bin: &str, host: &str, port: u16) -> Result<Self, BootstrapError> {
        info!("Starting Ollama server ({} serve) on {}:{}", bin, host, port);

        let child = ollama_command(bin, host, port)
            .arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BootstrapError::ServerStart { bin: bin.to_string(), source })?;

        debug!("Ollama server process started with PID: {:?}", child.id());
        Ok(Self {
            host: host.to_string(),
            port,
            process: Some(child),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Waits for the port to accept connections. Returns early with an error if
    /// the process we spawned has already exited, which usually means another
    /// instance holds the port or the binary is broken.
    pub async fn wait_ready(&mut self, limit: Duration) -> Result<(), BootstrapError> {
        let deadline = Instant::now() + limit;
        info!("Waiting for Ollama server on {}...", self.addr());

        while Instant::now() < deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if wait_for_port(&self.host, self.port, remaining.min(POLL_INTERVAL)).await {
                info!("Ollama server is up");
                return Ok(());
            }
            if let Some(status) = self.exit_status()? {
                // Someone else may already be serving on the port.
                if wait_for_port(&self.host, self.port, CONNECT_TIMEOUT).await {
                    info!("Ollama server is up (served by an existing instance)");
                    return Ok(());
                }
                return Err(BootstrapError::ServerExited(status));
            }
        }

        Err(BootstrapError::ServerTimeout {
            addr: self.addr(),
            secs: limit.as_secs(),
        })
    }

    fn exit_status(&mut self) -> Result<Option<String>, BootstrapError> {
        match self.process.as_mut() {
            Some(child) => {
                let status = child.try_wait()?;
                if status.is_some() {
                    self.process = None;
                }
                Ok(status.map(|s| s.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Kills the spawned process if it is still alive.
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.process.take() {
            info!("Stopping Ollama server (PID: {:?})", child.id());
            match child.try_wait() {
                Ok(Some(status)) => debug!("Ollama server already exited: {}", status),
                Ok(None) => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill Ollama server: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Error checking Ollama server status: {}", e);
                    let _ = child.kill().await;
                }
            }
        }
    }
}
