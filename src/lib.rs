//! DEX connection library
//!
//! Shared Solana connection configuration for DEX front-ends: the selected
//! RPC endpoint and slippage tolerance (both persisted), the connection
//! handles built for that endpoint and their keep-alive subscriptions, plus
//! a single-shot transaction submission workflow.

pub mod config;
pub mod connection;
pub mod endpoints;
pub mod explorer;
pub mod metrics;
pub mod notify;
pub mod observability;
pub mod rpc;
pub mod storage;
pub mod tx_submit;
pub mod wallet;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionContext, ConnectionError, ConnectionProvider, ProviderSettings};
pub use endpoints::{EndpointDescriptor, Network, ENDPOINTS};
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use rpc::{RpcError, RpcTransport, SolanaTransportFactory, TransportFactory};
pub use storage::{MemoryStore, SettingsStore, SledStore};
pub use tx_submit::{send_transaction, send_transaction_with_options, SendTransactionError, SubmitOptions};
pub use wallet::{KeypairWallet, WalletSigner};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
