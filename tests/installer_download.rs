use axum::{ body::{ Body, Bytes }, routing::get, Router };
use sha2::{ Digest, Sha256 };
use std::path::PathBuf;
use szpont_ai::runtime::BootstrapError;
use szpont_ai::runtime::install::download;
use url::Url;

const PAYLOAD: &[u8] = b"MZ fake installer bytes";

async fn spawn_installer_host() -> String {
    let app = Router::new()
        .route("/download/OllamaSetup.exe", get(|| async { PAYLOAD }))
        .route("/download/truncated.exe", get(truncated_body));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn truncated_body() -> Body {
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(PAYLOAD)),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "upstream went away")),
    ];
    Body::from_stream(futures::stream::iter(chunks))
}

fn temp_target(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("szpont-ai-{}-{}", std::process::id(), name))
}

#[tokio::test]
async fn download_writes_file_and_accepts_matching_checksum() {
    let base = spawn_installer_host().await;
    let url = Url::parse(&format!("{base}/download/OllamaSetup.exe")).unwrap();
    let dest = temp_target("ok.exe");
    let expected = hex::encode(Sha256::digest(PAYLOAD)).to_uppercase();

    let path = download(&url, &dest, Some(&expected)).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), PAYLOAD);
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn checksum_mismatch_removes_file() {
    let base = spawn_installer_host().await;
    let url = Url::parse(&format!("{base}/download/OllamaSetup.exe")).unwrap();
    let dest = temp_target("bad.exe");

    let err = download(&url, &dest, Some("00ff")).await.unwrap_err();

    assert!(matches!(err, BootstrapError::ChecksumMismatch { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn missing_installer_is_a_download_error() {
    let base = spawn_installer_host().await;
    let url = Url::parse(&format!("{base}/download/missing.exe")).unwrap();
    let dest = temp_target("missing.exe");

    let err = download(&url, &dest, None).await.unwrap_err();

    assert!(matches!(err, BootstrapError::Download(_)));
    assert!(!dest.exists());
}

#[tokio::test]
async fn interrupted_download_removes_partial_file() {
    let base = spawn_installer_host().await;
    let url = Url::parse(&format!("{base}/download/truncated.exe")).unwrap();
    let dest = temp_target("truncated.exe");

    let err = download(&url, &dest, None).await.unwrap_err();

    assert!(matches!(err, BootstrapError::Download(_)), "got {:?}", err);
    assert!(!dest.exists());
}
