//! Build, sign, submit and confirm a transaction for a wallet
//!
//! The workflow is strictly sequential:
//!
//! 1. refuse to start without a wallet public key
//! 2. assemble the instructions with a fresh blockhash, wallet as fee payer
//! 3. partial-sign with additional signers, then let the wallet sign
//! 4. serialize and submit with preflight disabled
//! 5. optionally poll for confirmation; on failure scrape the transaction
//!    logs for `Error: ...` lines, notify the user and fail
//!
//! There is no retry at any step.

pub mod confirm;
pub mod errors;
pub mod logs;

pub use confirm::{wait_for_status, ConfirmOptions};
pub use errors::SendTransactionError;
pub use logs::{extract_log_errors, fetch_log_errors};

use crate::endpoints;
use crate::explorer;
use crate::metrics::metrics;
use crate::notify::{Notification, Notifier};
use crate::observability::CorrelationId;
use crate::rpc::RpcTransport;
use crate::wallet::WalletSigner;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    instruction::Instruction,
    message::Message,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Headline of the notification sent for a failed transaction
pub const FAILED_TRANSACTION_MESSAGE: &str = "Transaction failed...";

/// Submission knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Commitment used for preflight and awaited on confirmation
    pub commitment: CommitmentLevel,
    pub skip_preflight: bool,
    pub confirm: ConfirmOptions,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            commitment: CommitmentLevel::Confirmed,
            skip_preflight: true,
            confirm: ConfirmOptions::default(),
        }
    }
}

/// Submit `instructions` signed by `wallet` (fee payer) and `signers`.
///
/// Returns the transaction signature. With `await_confirmation` the call
/// only returns once the transaction reached the commitment level of
/// [`SubmitOptions::commitment`] (`confirmed` for this entry point).
pub async fn send_transaction(
    connection: &dyn RpcTransport,
    wallet: &dyn WalletSigner,
    instructions: &[Instruction],
    signers: &[Keypair],
    await_confirmation: bool,
    notifier: &dyn Notifier,
) -> Result<Signature, SendTransactionError> {
    send_transaction_with_options(
        connection,
        wallet,
        instructions,
        signers,
        await_confirmation,
        notifier,
        &SubmitOptions::default(),
    )
    .await
}

/// [`send_transaction`] with explicit [`SubmitOptions`]
#[instrument(
    skip_all,
    fields(
        endpoint = %connection.endpoint(),
        instructions = instructions.len(),
        correlation_id = %CorrelationId::new(),
    )
)]
pub async fn send_transaction_with_options(
    connection: &dyn RpcTransport,
    wallet: &dyn WalletSigner,
    instructions: &[Instruction],
    signers: &[Keypair],
    await_confirmation: bool,
    notifier: &dyn Notifier,
    options: &SubmitOptions,
) -> Result<Signature, SendTransactionError> {
    let payer = wallet
        .public_key()
        .ok_or(SendTransactionError::WalletNotConnected)?;
    if instructions.is_empty() {
        return Err(SendTransactionError::NoInstructions);
    }

    let blockhash = connection
        .get_latest_blockhash(CommitmentConfig::finalized())
        .await
        .map_err(SendTransactionError::Blockhash)?;

    // Fee payer is always the first account key and first signature slot
    let mut message = Message::new(instructions, Some(&payer));
    message.recent_blockhash = blockhash;
    let mut transaction = Transaction::new_unsigned(message);

    if !signers.is_empty() {
        let partial: Vec<&dyn Signer> = signers.iter().map(|s| s as &dyn Signer).collect();
        transaction
            .try_partial_sign(&partial, blockhash)
            .map_err(|e| SendTransactionError::Signing(e.to_string()))?;
    }

    let transaction = wallet.sign_transaction(transaction).await?;
    if !transaction.is_signed() {
        return Err(SendTransactionError::Signing(
            "transaction is missing required signatures".to_string(),
        ));
    }

    let raw = bincode::serialize(&transaction)
        .map_err(|e| SendTransactionError::Serialization(e.to_string()))?;
    let config = RpcSendTransactionConfig {
        skip_preflight: options.skip_preflight,
        preflight_commitment: Some(options.commitment),
        ..RpcSendTransactionConfig::default()
    };

    let signature = connection
        .send_raw_transaction(&raw, config)
        .await
        .map_err(SendTransactionError::Submit)?;
    metrics().transactions_submitted.inc();
    info!(signature = %signature, payer = %payer, bytes = raw.len(), "Transaction submitted");

    if !await_confirmation {
        return Ok(signature);
    }

    let started = Instant::now();
    let commitment = CommitmentConfig {
        commitment: options.commitment,
    };
    let outcome = match wait_for_status(connection, &signature, commitment, &options.confirm).await
    {
        Ok(outcome) => outcome,
        Err(e) => return Err(record_failure(e)),
    };
    metrics()
        .confirmation_latency
        .observe(started.elapsed().as_secs_f64());

    if let Err(err) = outcome {
        let status = serde_json::json!({ "err": err }).to_string();

        let errors = match fetch_log_errors(connection, &signature, &options.confirm).await {
            Ok(errors) => errors,
            Err(e) => {
                warn!(signature = %signature, "Could not read transaction logs: {}", e);
                Vec::new()
            }
        };
        debug!(signature = %signature, errors = ?errors, "Extracted log errors");

        let network = endpoints::network_for_endpoint(connection.endpoint());
        notifier.notify(
            Notification::error(FAILED_TRANSACTION_MESSAGE, errors)
                .with_link(explorer::transaction_url(&signature, network)),
        );

        warn!(signature = %signature, status = %status, "Transaction failed");
        return Err(record_failure(SendTransactionError::TransactionFailed {
            signature,
            status,
        }));
    }

    metrics().transactions_confirmed.inc();
    info!(
        signature = %signature,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Transaction confirmed"
    );
    Ok(signature)
}

/// Count a post-submission failure under its category
fn record_failure(err: SendTransactionError) -> SendTransactionError {
    metrics()
        .transactions_failed
        .with_label_values(&[err.category()])
        .inc();
    err
}
