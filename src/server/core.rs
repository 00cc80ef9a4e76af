use log::{error, info};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::auth::CredentialStore;
use crate::config::ServerConfig;
use crate::error::DriveError;
use crate::protocol::router;
use crate::server::state::{AppState, SharedState};
use crate::storage::filesystem::ensure_storage_root;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Prepares storage, opens the credential store and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, DriveError> {
        ensure_storage_root(&config.storage_root_path())?;
        info!("Storage root directory: {}", config.storage_root);
        ensure_storage_root(&config.staging_dir_path())?;
        info!("Upload staging directory: {}", config.staging_dir);

        let credentials = CredentialStore::open(config.database_path())?;
        info!(
            "Credential store: {} ({} registered users)",
            config.database_path,
            credentials.user_count()?
        );

        let socket = config.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(DriveError::IoError(e));
            }
        };

        Ok(Self {
            listener,
            state: AppState::new(config, credentials).shared(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C
    pub async fn start(self) -> Result<(), DriveError> {
        let addr = self.local_addr()?;
        info!(
            "Starting RAX Drive on http://{} (identity: {:?}, access: {:?})",
            addr, self.state.config.identity_mode, self.state.config.access_policy
        );

        let app = router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
