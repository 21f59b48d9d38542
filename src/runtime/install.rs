use futures::StreamExt;
use log::{ debug, info, warn };
use sha2::{ Digest, Sha256 };
use std::path::{ Path, PathBuf };
use std::process::Stdio;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use url::Url;

use super::BootstrapError;
use crate::cli::Args;

const INSTALLER_FILENAME: &str = "OllamaSetup.exe";
const INSTALLER_FLAGS: [&str; 3] = ["/SILENT", "/NORESTART", "/SUPPRESSMSGBOXES"];
const GUI_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// True when `<bin> --version` can be spawned and exits successfully.
pub async fn is_installed(bin: &str) -> bool {
    match Command::new(bin)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status().await
    {
        Ok(status) => status.success(),
        Err(e) => {
            debug!("`{} --version` could not be run: {}", bin, e);
            false
        }
    }
}

/// Closes the Ollama tray app the Windows installer tends to launch.
/// Output and failures are ignored.
pub async fn kill_gui() {
    if !cfg!(windows) {
        return;
    }
    let _ = Command::new("taskkill")
        .args(["/IM", "Ollama.exe", "/F"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status().await;
}

/// Makes sure the runtime is present. Automatic installation is only
/// supported on Windows; elsewhere the user has to install Ollama manually.
pub async fn ensure_installed(args: &Args) -> Result<(), BootstrapError> {
    if !cfg!(windows) {
        warn!("Automatic installation only works on Windows. Install Ollama manually if it is missing.");
        return Ok(());
    }

    if is_installed(&args.ollama_bin).await {
        kill_gui().await;
        return Ok(());
    }

    install(args).await
}

/// Downloads the installer, runs it silently, then removes it.
pub async fn install(args: &Args) -> Result<(), BootstrapError> {
    info!("Ollama not found, downloading installer...");
    let setup_path = std::env::current_dir()?.join(INSTALLER_FILENAME);

    download(&args.installer_url, &setup_path, args.installer_sha256.as_deref()).await?;

    info!("Download finished. Installing Ollama (silent mode)...");
    let status = Command::new(&setup_path).args(INSTALLER_FLAGS).status().await?;
    if !status.success() {
        return Err(BootstrapError::InstallerFailed(status.to_string()));
    }

    tokio::time::sleep(GUI_SETTLE_DELAY).await;
    kill_gui().await;

    info!("Ollama installed. Removing installer...");
    fs::remove_file(&setup_path).await?;
    Ok(())
}

/// Streams `url` to `dest`, verifying the SHA-256 when one is given.
/// A partially written file or one that fails verification is removed.
pub async fn download(
    url: &Url,
    dest: &Path,
    expected_sha256: Option<&str>
) -> Result<PathBuf, BootstrapError> {
    let resp = reqwest::get(url.clone()).await
        .and_then(|r| r.error_for_status())
        .map_err(|e| BootstrapError::Download(e.to_string()))?;

    let digest = match write_body(resp, dest).await {
        Ok(digest) => digest,
        Err(e) => {
            let _ = fs::remove_file(dest).await;
            return Err(e);
        }
    };

    if let Some(expected) = expected_sha256 {
        let actual = hex::encode(digest);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            let _ = fs::remove_file(dest).await;
            return Err(BootstrapError::ChecksumMismatch {
                expected: expected.trim().to_string(),
                actual,
            });
        }
        debug!("Installer checksum verified: {}", actual);
    }

    Ok(dest.to_path_buf())
}

/// Writes the response body to `dest` chunk by chunk, returning its SHA-256.
async fn write_body(resp: reqwest::Response, dest: &Path) -> Result<Vec<u8>, BootstrapError> {
    let mut file = fs::File::create(dest).await?;
    let mut hasher = Sha256::new();
    let mut stream = resp.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BootstrapError::Download(e.to_string()))?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
    }
    file.flush().await?;
    debug!("Downloaded {} bytes to {}", downloaded, dest.display());

    Ok(hasher.finalize().to_vec())
}
