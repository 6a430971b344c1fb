//! Error extraction from transaction log output

use super::confirm::{wait_for_status, ConfirmOptions};
use super::errors::SendTransactionError;
use crate::rpc::RpcTransport;
use once_cell::sync::Lazy;
use regex::Regex;
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use tracing::debug;

static ERROR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Error: (.*)").expect("error pattern is a valid regex"));

/// Collect the text following every `Error: ` in `logs`.
///
/// A match runs to the end of its line. The scan advances past empty
/// matches, so a bare `Error: ` yields one empty string.
pub fn extract_log_errors<S: AsRef<str>>(logs: &[S]) -> Vec<String> {
    logs.iter()
        .flat_map(|line| {
            ERROR_PATTERN
                .captures_iter(line.as_ref())
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Wait for finalization of a failed transaction and extract its log errors
pub async fn fetch_log_errors(
    connection: &dyn RpcTransport,
    signature: &Signature,
    options: &ConfirmOptions,
) -> Result<Vec<String>, SendTransactionError> {
    let finalized = CommitmentConfig::finalized();
    wait_for_status(connection, signature, finalized, options).await?;

    let logs = connection
        .get_transaction_logs(signature, finalized)
        .await
        .map_err(|source| SendTransactionError::Status {
            signature: *signature,
            source,
        })?
        .unwrap_or_default();

    let errors = extract_log_errors(&logs);
    debug!(signature = %signature, log_lines = logs.len(), errors = errors.len(), "Scanned transaction logs");
    Ok(errors)
}
