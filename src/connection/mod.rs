//! Connection configuration provider
//!
//! Owns the shared connection handles for the selected endpoint together
//! with the persisted user settings (endpoint URL, slippage).
//!
//! ## Lifecycle
//!
//! - [`ConnectionProvider::start`] restores the persisted settings, opens the
//!   main and the "send" connection handles and establishes their keep-alive
//!   subscriptions.
//! - [`ConnectionProvider::set_endpoint`] persists the new endpoint and
//!   replaces both handles wholesale. Keep-alive subscriptions of the old
//!   handles are cancelled and recreated on the new ones.
//! - [`ConnectionProvider::shutdown`] cancels every keep-alive subscription.
//!
//! Readers take an immutable [`ConnectionContext`] snapshot; configuration
//! changes publish a new snapshot instead of mutating the current one.

mod keep_alive;

pub use keep_alive::KeepAlive;

use crate::endpoints::{self, Network, UnknownNetwork};
use crate::metrics::metrics;
use crate::rpc::{RpcError, RpcTransport, TransportFactory};
use crate::storage::{self, SettingsStore, StorageError, ENDPOINT_KEY};
use arc_swap::ArcSwap;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    UnknownNetwork(#[from] UnknownNetwork),

    #[error("Invalid slippage {0}: must be a finite, non-negative number")]
    InvalidSlippage(f64),

    #[error("Failed to open connection: {0}")]
    Transport(#[from] RpcError),

    #[error("Settings storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Provider settings that do not change at runtime
#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    /// Network used when no endpoint has been persisted yet
    pub default_network: Network,

    /// Commitment both connection handles are created with
    pub commitment: CommitmentConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_network: endpoints::default_network(),
            commitment: CommitmentConfig::processed(),
        }
    }
}

/// Immutable view of the current connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Handle for reads and confirmations
    pub connection: Arc<dyn RpcTransport>,

    /// Secondary handle reserved for submitting transactions
    pub send_connection: Arc<dyn RpcTransport>,

    pub endpoint: String,

    pub network: Network,

    pub slippage: f64,
}

/// Shared connection handles plus persisted network/slippage settings
pub struct ConnectionProvider {
    factory: Arc<dyn TransportFactory>,
    store: Arc<dyn SettingsStore>,
    commitment: CommitmentConfig,
    context: ArcSwap<ConnectionContext>,
    /// Serializes endpoint switches; holds the live keep-alive subscriptions
    keep_alive: Mutex<Vec<KeepAlive>>,
}

impl ConnectionProvider {
    /// Restore persisted settings and open the connection handles.
    ///
    /// Must be called from within a tokio runtime: keep-alive subscriptions
    /// are spawned as tasks.
    pub fn start(
        factory: Arc<dyn TransportFactory>,
        store: Arc<dyn SettingsStore>,
        settings: ProviderSettings,
    ) -> Result<Self, ConnectionError> {
        let endpoint = match store.get(ENDPOINT_KEY)? {
            Some(url) if endpoints::is_valid_endpoint(&url) => url,
            Some(url) => {
                warn!(endpoint = %url, "Persisted endpoint is not a valid URL, using default");
                settings.default_network.descriptor().url.to_string()
            }
            None => settings.default_network.descriptor().url.to_string(),
        };
        let slippage = storage::load_slippage(store.as_ref())?;

        let (connection, send_connection) =
            open_handles(factory.as_ref(), &endpoint, settings.commitment)?;
        let keep_alive = vec![
            KeepAlive::establish(connection.as_ref()),
            KeepAlive::establish(send_connection.as_ref()),
        ];

        let network = endpoints::network_for_endpoint(&endpoint);
        info!(endpoint = %endpoint, network = %network, slippage, "Connection provider started");

        Ok(Self {
            factory,
            store,
            commitment: settings.commitment,
            context: ArcSwap::from_pointee(ConnectionContext {
                connection,
                send_connection,
                endpoint,
                network,
                slippage,
            }),
            keep_alive: Mutex::new(keep_alive),
        })
    }

    /// Snapshot of the current configuration
    pub fn context(&self) -> Arc<ConnectionContext> {
        self.context.load_full()
    }

    pub fn connection(&self) -> Arc<dyn RpcTransport> {
        Arc::clone(&self.context.load().connection)
    }

    pub fn send_connection(&self) -> Arc<dyn RpcTransport> {
        Arc::clone(&self.context.load().send_connection)
    }

    pub fn endpoint(&self) -> String {
        self.context.load().endpoint.clone()
    }

    pub fn network(&self) -> Network {
        self.context.load().network
    }

    pub fn slippage(&self) -> f64 {
        self.context.load().slippage
    }

    /// Switch to `endpoint`, recreating both connection handles.
    ///
    /// Accepts an http(s) URL or a network name. The input is resolved and
    /// validated before anything changes. Setting the current endpoint
    /// again still replaces the handles.
    #[instrument(skip(self), fields(previous = %self.endpoint()))]
    pub async fn set_endpoint(&self, endpoint: &str) -> Result<(), ConnectionError> {
        let endpoint = resolve_endpoint(endpoint)?;
        let endpoint = endpoint.as_str();

        let mut keep_alive = self.keep_alive.lock().await;

        let (connection, send_connection) =
            open_handles(self.factory.as_ref(), endpoint, self.commitment)?;
        self.store.set(ENDPOINT_KEY, endpoint)?;

        for previous in keep_alive.drain(..) {
            previous.cancel().await;
        }
        keep_alive.push(KeepAlive::establish(connection.as_ref()));
        keep_alive.push(KeepAlive::establish(send_connection.as_ref()));

        let network = endpoints::network_for_endpoint(endpoint);
        self.context.rcu(|current| ConnectionContext {
            connection: Arc::clone(&connection),
            send_connection: Arc::clone(&send_connection),
            endpoint: endpoint.to_string(),
            network,
            slippage: current.slippage,
        });

        metrics().endpoint_switches.inc();
        info!(endpoint = %endpoint, network = %network, "Endpoint changed");
        Ok(())
    }

    /// Switch to the descriptor endpoint of `network`
    pub async fn set_network(&self, network: Network) -> Result<(), ConnectionError> {
        self.set_endpoint(network.descriptor().url).await
    }

    /// Persist and publish a new slippage tolerance
    pub fn set_slippage(&self, slippage: f64) -> Result<(), ConnectionError> {
        if !slippage.is_finite() || slippage < 0.0 {
            return Err(ConnectionError::InvalidSlippage(slippage));
        }

        storage::store_slippage(self.store.as_ref(), slippage)?;
        self.context.rcu(|current| ConnectionContext {
            slippage,
            ..(**current).clone()
        });

        info!(slippage, "Slippage changed");
        Ok(())
    }

    /// Number of keep-alive subscription pairs currently held
    pub async fn keep_alive_count(&self) -> usize {
        self.keep_alive.lock().await.len()
    }

    /// Cancel all keep-alive subscriptions.
    ///
    /// The connection handles stay readable; call this when the provider is
    /// being torn down.
    pub async fn shutdown(&self) {
        let mut keep_alive = self.keep_alive.lock().await;
        for previous in keep_alive.drain(..) {
            previous.cancel().await;
        }
        info!(endpoint = %self.endpoint(), "Connection provider shut down");
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("context", &self.context.load())
            .field("commitment", &self.commitment.commitment)
            .finish_non_exhaustive()
    }
}

/// Resolve user input that is either an endpoint URL or a network name
pub fn resolve_endpoint(input: &str) -> Result<String, ConnectionError> {
    let input = input.trim();
    if endpoints::is_valid_endpoint(input) {
        return Ok(input.to_string());
    }
    if input.contains("://") {
        return Err(ConnectionError::InvalidEndpoint(input.to_string()));
    }
    let network: Network = input.parse()?;
    Ok(network.descriptor().url.to_string())
}

fn open_handles(
    factory: &dyn TransportFactory,
    endpoint: &str,
    commitment: CommitmentConfig,
) -> Result<(Arc<dyn RpcTransport>, Arc<dyn RpcTransport>), RpcError> {
    let connection = factory.connect(endpoint, commitment)?;
    let send_connection = factory.connect(endpoint, commitment)?;
    Ok((connection, send_connection))
}
