//! Error types for transaction submission

use crate::rpc::RpcError;
use crate::wallet::WalletError;
use solana_sdk::signature::Signature;
use thiserror::Error;

/// Everything that can go wrong between building and confirming a transaction
#[derive(Error, Debug)]
pub enum SendTransactionError {
    /// The wallet exposes no public key; nothing was sent
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("No instructions provided")]
    NoInstructions,

    /// Failed to fetch a recent blockhash
    #[error("Blockhash error: {0}")]
    Blockhash(#[source] RpcError),

    /// Partial signing by an additional signer failed, or the wallet left
    /// the transaction incompletely signed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The wallet refused or failed to sign
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The endpoint rejected the submission
    #[error("Submit failed: {0}")]
    Submit(#[source] RpcError),

    /// Polling the signature status failed
    #[error("Status query for {signature} failed: {source}")]
    Status {
        signature: Signature,
        #[source]
        source: RpcError,
    },

    /// The transaction landed with an error
    #[error("Raw transaction {signature} failed ({status})")]
    TransactionFailed { signature: Signature, status: String },

    /// The requested commitment was not reached in time
    #[error("Transaction {signature} was not confirmed in {timeout_secs:.1} seconds")]
    ConfirmationTimeout {
        signature: Signature,
        timeout_secs: f64,
    },
}

impl SendTransactionError {
    /// Signature of the submitted transaction, when it got that far
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Status { signature, .. }
            | Self::TransactionFailed { signature, .. }
            | Self::ConfirmationTimeout { signature, .. } => Some(signature),
            _ => None,
        }
    }

    /// Label of the `transactions_failed` metric
    pub fn category(&self) -> &'static str {
        match self {
            Self::WalletNotConnected => "wallet_not_connected",
            Self::NoInstructions => "no_instructions",
            Self::Blockhash(_) => "blockhash",
            Self::Signing(_) => "signing",
            Self::Wallet(_) => "wallet",
            Self::Serialization(_) => "serialization",
            Self::Submit(_) => "submit",
            Self::Status { .. } => "status",
            Self::TransactionFailed { .. } => "transaction_failed",
            Self::ConfirmationTimeout { .. } => "timeout",
        }
    }
}
