//! RPC transport seam
//!
//! Everything the crate needs from a cluster goes through [`RpcTransport`]:
//! blockhash lookup, raw submission, status polling, log retrieval and the
//! websocket subscriptions used for keep-alive.

use async_trait::async_trait;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Result as TransactionResult,
};
use std::sync::Arc;

pub mod errors;
pub mod solana;
pub mod subscription;

pub use errors::RpcError;
pub use solana::{SolanaRpcTransport, SolanaTransportFactory};
pub use subscription::{CancelSignal, Subscription, SubscriptionKind};

pub type RpcResult<T> = Result<T, RpcError>;

/// One connection handle to an RPC endpoint
#[async_trait]
pub trait RpcTransport: Send + Sync + std::fmt::Debug {
    /// HTTP endpoint this handle talks to
    fn endpoint(&self) -> &str;

    /// Default commitment of the handle
    fn commitment(&self) -> CommitmentConfig;

    /// Fetch a recent blockhash at `commitment`
    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> RpcResult<Hash>;

    /// Submit an already serialized, signed transaction
    async fn send_raw_transaction(
        &self,
        raw_transaction: &[u8],
        config: RpcSendTransactionConfig,
    ) -> RpcResult<Signature>;

    /// Status of `signature` once it has reached `commitment`.
    ///
    /// `None` while the transaction has not reached that level.
    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<TransactionResult<()>>>;

    /// Log messages recorded for a landed transaction
    async fn get_transaction_logs(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<Vec<String>>>;

    /// Subscribe to changes of `account`, discarding notifications
    fn on_account_change(&self, account: Pubkey) -> Subscription;

    /// Subscribe to slot changes, discarding notifications
    fn on_slot_change(&self) -> Subscription;
}

/// Creates connection handles for an endpoint
pub trait TransportFactory: Send + Sync {
    fn connect(
        &self,
        endpoint: &str,
        commitment: CommitmentConfig,
    ) -> RpcResult<Arc<dyn RpcTransport>>;
}
