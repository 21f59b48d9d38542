pub mod api;

pub use api::{ build_app, AppState };

use log::info;
use std::error::Error;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct Server {
    addr: String,
    state: AppState,
}

impl Server {
    pub fn new(addr: String, state: AppState) -> Self {
        Self { addr, state }
    }

    pub async fn bind(&self) -> Result<TcpListener, Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.addr).await.map_err(|e|
            format!("Failed to bind chat UI to {}: {}. Try a different --server-addr.", self.addr, e)
        )?;
        Ok(listener)
    }

    /// Serves the chat UI on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(
        &self,
        listener: TcpListener,
        shutdown: F
    ) -> Result<(), Box<dyn Error + Send + Sync>>
        where F: Future<Output = ()> + Send + 'static
    {
        let local: SocketAddr = listener.local_addr()?;
        info!("Chat UI listening on: http://{}", local);

        let app = build_app(self.state.clone());
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        info!("Chat UI stopped");
        Ok(())
    }

    pub async fn run<F>(&self, shutdown: F) -> Result<(), Box<dyn Error + Send + Sync>>
        where F: Future<Output = ()> + Send + 'static
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
