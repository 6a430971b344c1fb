//! Signature status polling

use super::errors::SendTransactionError;
use crate::rpc::RpcTransport;
use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature,
    transaction::Result as TransactionResult,
};
use std::time::{Duration, Instant};
use tracing::trace;

/// How confirmation is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Poll until `signature` reaches `commitment`, returning the on-chain result
pub async fn wait_for_status(
    connection: &dyn RpcTransport,
    signature: &Signature,
    commitment: CommitmentConfig,
    options: &ConfirmOptions,
) -> Result<TransactionResult<()>, SendTransactionError> {
    let started = Instant::now();

    loop {
        let status = connection
            .get_signature_status(signature, commitment)
            .await
            .map_err(|source| SendTransactionError::Status {
                signature: *signature,
                source,
            })?;

        if let Some(result) = status {
            return Ok(result);
        }

        if started.elapsed() >= options.timeout {
            return Err(SendTransactionError::ConfirmationTimeout {
                signature: *signature,
                timeout_secs: options.timeout.as_secs_f64(),
            });
        }

        trace!(signature = %signature, commitment = ?commitment.commitment, "Not yet confirmed");
        tokio::time::sleep(options.poll_interval).await;
    }
}
