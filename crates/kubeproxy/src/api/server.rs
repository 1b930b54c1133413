use std::sync::Arc;

use error_stack::Report;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::Tracing;
use poem::Endpoint;
use poem::EndpointExt;
use poem::Route;
use poem::Server;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use super::errors::ApiError;
use super::handlers::exec_command;
use super::handlers::healthz;
use super::handlers::list_containers;
use crate::app::pool::TaskPool;
use crate::domain::mirror::MirrorStore;
use crate::domain::EventDispatcher;

/// Local HTTP control surface used by the game-server plugin
pub struct ControlServer {
    store: Arc<MirrorStore>,
    dispatcher: Arc<EventDispatcher>,
    pool: TaskPool,
    listen_addr: String,
}

impl ControlServer {
    pub fn new(
        store: Arc<MirrorStore>,
        dispatcher: Arc<EventDispatcher>,
        pool: TaskPool,
        listen_addr: String,
    ) -> Self {
        Self {
            store,
            dispatcher,
            pool,
            listen_addr,
        }
    }

    pub fn routes(&self) -> impl Endpoint {
        Route::new()
            .at("/containers", get(list_containers))
            .at("/exec", get(exec_command))
            .at("/healthz", get(healthz))
            .data(self.store.clone())
            .data(self.dispatcher.clone())
            .data(self.pool.clone())
            .with(Tracing)
    }

    /// Serve until cancelled.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServerError`] if the server fails to start or bind to the address
    pub async fn run(self, cancellation_token: CancellationToken) -> Result<(), Report<ApiError>> {
        info!("Starting control server on {}", self.listen_addr);

        let app = self.routes();
        let server = Server::new(TcpListener::bind(self.listen_addr.clone()));

        tokio::select! {
            result = server.run(app) => {
                match result {
                    Ok(()) => {
                        info!("Control server stopped normally");
                        Ok(())
                    }
                    Err(e) => {
                        error!("Control server failed: {e}");
                        Err(Report::new(ApiError::ServerError {
                            message: format!("Server failed on {}: {e}", self.listen_addr),
                        }))
                    }
                }
            }
            _ = cancellation_token.cancelled() => {
                info!("Control server shutdown requested");
                Ok(())
            }
        }
    }
}
