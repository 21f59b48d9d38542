pub mod browser;
pub mod cli;
pub mod llm;
pub mod models;
pub mod runtime;
pub mod server;

use cli::Args;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::{ error, info, warn };
use runtime::{ ensure_installed, ensure_model, OllamaServer };
use server::{ AppState, Server };
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Ollama Binary: {}", args.ollama_bin);
    info!("Ollama URL: {}", args.ollama_base_url());
    info!("Model: {}", args.model);
    info!("Wait Timeout: {}s", args.wait_timeout_secs);
    info!("Skip Bootstrap: {}", args.skip_bootstrap);
    info!("Server Address: {}", args.server_addr);
    info!("Open Browser: {}", !args.no_browser);
    info!("-------------------------");

    let mut ollama = if args.skip_bootstrap {
        info!("Bootstrap skipped, expecting Ollama at {}", args.ollama_base_url());
        None
    } else {
        Some(bootstrap(&args).await?)
    };

    let chat_config = LlmConfig {
        base_url: Some(args.ollama_base_url()),
        completion_model: Some(args.model.clone()),
        request_timeout: args.request_timeout(),
    };
    let chat_client = new_chat_client(&chat_config);
    info!("Forwarding chat to {} (model {})", chat_client.get_base_url(), chat_client.get_model());
    let state = AppState::new(chat_client);
    let server = Server::new(args.server_addr.clone(), state);

    let result = match server.bind().await {
        Ok(listener) => {
            match listener.local_addr() {
                Ok(addr) if !args.no_browser => {
                    browser::open_after(browser::ui_url(addr), args.browser_delay());
                }
                Ok(_) => {}
                Err(e) => warn!("Not opening the browser, local address unknown: {}", e),
            }
            server.serve(listener, shutdown_signal()).await
        }
        Err(e) => Err(e),
    };

    if let Some(ollama) = ollama.as_mut() {
        ollama.stop().await;
    }
    result
}

/// Installs Ollama if needed, starts `ollama serve`, waits for its port and
/// makes sure the model is pulled. A failed model pull is not fatal.
async fn bootstrap(args: &Args) -> Result<OllamaServer, Box<dyn Error + Send + Sync>> {
    if let Err(e) = ensure_installed(args).await {
        error!("Ollama installation failed: {}", e);
        return Err(e.into());
    }

    let mut ollama = OllamaServer::start(&args.ollama_bin, &args.ollama_host, args.ollama_port)?;
    if let Err(e) = ollama.wait_ready(args.wait_timeout()).await {
        error!("Ollama server did not start: {}", e);
        ollama.stop().await;
        return Err(e.into());
    }

    match ensure_model(&args.ollama_bin, &args.ollama_host, args.ollama_port, &args.model).await {
        Ok(()) => info!("Model ready, starting chat UI..."),
        Err(e) => warn!("Could not prepare model {}: {}", args.model, e),
    }

    Ok(ollama)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
