//! [`RpcTransport`] over `solana-client`
//!
//! HTTP calls go through the nonblocking `RpcClient`; subscriptions open a
//! dedicated `PubsubClient` on the endpoint's websocket URL.

use super::{
    CancelSignal, RpcError, RpcResult, RpcTransport, Subscription, SubscriptionKind,
    TransportFactory,
};
use crate::endpoints;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use futures_util::StreamExt;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcSendTransactionConfig, RpcTransactionConfig,
};
use solana_client::rpc_request::RpcRequest;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Result as TransactionResult,
};
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

/// Pubsub connection shared by every subscription of one handle
type SharedPubsub = Arc<OnceCell<Arc<PubsubClient>>>;

/// Connection handle backed by `solana-client`
pub struct SolanaRpcTransport {
    endpoint: String,
    ws_url: String,
    commitment: CommitmentConfig,
    client: RpcClient,
    /// Connected on the first subscription, then reused
    pubsub: SharedPubsub,
}

impl SolanaRpcTransport {
    pub fn new(endpoint: &str, commitment: CommitmentConfig) -> RpcResult<Self> {
        if !endpoints::is_valid_endpoint(endpoint) {
            return Err(RpcError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        let ws_url = endpoints::websocket_url(endpoint).map_err(|e| RpcError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            ws_url,
            commitment,
            client: RpcClient::new_with_commitment(endpoint.to_string(), commitment),
            pubsub: Arc::new(OnceCell::new()),
        })
    }

    /// Websocket URL used for subscriptions
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Underlying client, for calls this crate does not wrap
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    fn map_err(&self, err: solana_client::client_error::ClientError) -> RpcError {
        RpcError::from_client_error(err, &self.endpoint)
    }
}

impl std::fmt::Debug for SolanaRpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcTransport")
            .field("endpoint", &self.endpoint)
            .field("ws_url", &self.ws_url)
            .field("commitment", &self.commitment.commitment)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcTransport for SolanaRpcTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> RpcResult<Hash> {
        self.client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map(|(blockhash, _last_valid_block_height)| blockhash)
            .map_err(|e| self.map_err(e))
    }

    #[instrument(skip(self, raw_transaction, config), fields(endpoint = %self.endpoint, bytes = raw_transaction.len()))]
    async fn send_raw_transaction(
        &self,
        raw_transaction: &[u8],
        config: RpcSendTransactionConfig,
    ) -> RpcResult<Signature> {
        let encoded = BASE64_STANDARD.encode(raw_transaction);
        let config = RpcSendTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            ..config
        };

        let signature: String = self
            .client
            .send(
                RpcRequest::SendTransaction,
                serde_json::json!([encoded, config]),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        Signature::from_str(&signature).map_err(|e| RpcError::MalformedResponse {
            endpoint: self.endpoint.clone(),
            message: format!("invalid signature '{}': {}", signature, e),
        })
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<TransactionResult<()>>> {
        self.client
            .get_signature_status_with_commitment(signature, commitment)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn get_transaction_logs(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<Vec<String>>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(commitment),
            max_supported_transaction_version: Some(0),
        };

        let tx = match self.client.get_transaction_with_config(signature, config).await {
            Ok(tx) => tx,
            // The node answers `null` for transactions it does not know
            Err(e) if e.to_string().contains("invalid type: null") => {
                return Err(RpcError::TransactionNotFound {
                    signature: signature.to_string(),
                    endpoint: self.endpoint.clone(),
                });
            }
            Err(e) => return Err(self.map_err(e)),
        };

        Ok(tx
            .transaction
            .meta
            .and_then(|meta| Option::<Vec<String>>::from(meta.log_messages)))
    }

    fn on_account_change(&self, account: Pubkey) -> Subscription {
        let pubsub = Arc::clone(&self.pubsub);
        let ws_url = self.ws_url.clone();
        let commitment = self.commitment;
        Subscription::spawn(SubscriptionKind::AccountChange, move |cancel| {
            run_account_subscription(pubsub, ws_url, account, commitment, cancel)
        })
    }

    fn on_slot_change(&self) -> Subscription {
        let pubsub = Arc::clone(&self.pubsub);
        let ws_url = self.ws_url.clone();
        Subscription::spawn(SubscriptionKind::SlotChange, move |cancel| {
            run_slot_subscription(pubsub, ws_url, cancel)
        })
    }
}

/// Shared pubsub client of the handle, connecting it on first use.
///
/// Concurrent callers wait for the same connection attempt. Returns `None`
/// when cancelled first or when the connection fails.
async fn connect_pubsub(
    pubsub: &SharedPubsub,
    ws_url: &str,
    cancel: &mut CancelSignal,
) -> Option<Arc<PubsubClient>> {
    let connect = pubsub.get_or_try_init(|| async {
        debug!(ws_url = %ws_url, "Connecting pubsub client");
        PubsubClient::new(ws_url).await.map(Arc::new)
    });

    tokio::select! {
        _ = cancel => None,
        result = connect => match result {
            Ok(client) => Some(Arc::clone(client)),
            Err(e) => {
                warn!(ws_url = %ws_url, "Failed to connect pubsub client: {}", e);
                None
            }
        },
    }
}

async fn run_account_subscription(
    pubsub: SharedPubsub,
    ws_url: String,
    account: Pubkey,
    commitment: CommitmentConfig,
    mut cancel: CancelSignal,
) {
    let Some(client) = connect_pubsub(&pubsub, &ws_url, &mut cancel).await else {
        return;
    };

    let config = RpcAccountInfoConfig {
        encoding: Some(UiAccountEncoding::Base64),
        commitment: Some(commitment),
        data_slice: None,
        min_context_slot: None,
    };

    let (mut notifications, unsubscribe) = match client.account_subscribe(&account, Some(config)).await {
        Ok(result) => result,
        Err(e) => {
            warn!(account = %account, "Failed to subscribe to account changes: {}", e);
            return;
        }
    };
    debug!(ws_url = %ws_url, account = %account, "Account keep-alive subscribed");

    loop {
        tokio::select! {
            _ = &mut cancel => break,
            notification = notifications.next() => {
                if notification.is_none() {
                    warn!(ws_url = %ws_url, "Account subscription stream closed");
                    break;
                }
            }
        }
    }

    unsubscribe().await;
}

async fn run_slot_subscription(pubsub: SharedPubsub, ws_url: String, mut cancel: CancelSignal) {
    let Some(client) = connect_pubsub(&pubsub, &ws_url, &mut cancel).await else {
        return;
    };

    let (mut notifications, unsubscribe) = match client.slot_subscribe().await {
        Ok(result) => result,
        Err(e) => {
            warn!(ws_url = %ws_url, "Failed to subscribe to slot changes: {}", e);
            return;
        }
    };
    debug!(ws_url = %ws_url, "Slot keep-alive subscribed");

    loop {
        tokio::select! {
            _ = &mut cancel => break,
            notification = notifications.next() => {
                if notification.is_none() {
                    warn!(ws_url = %ws_url, "Slot subscription stream closed");
                    break;
                }
            }
        }
    }

    unsubscribe().await;
}

/// Factory producing [`SolanaRpcTransport`] handles
#[derive(Debug, Default, Clone, Copy)]
pub struct SolanaTransportFactory;

impl TransportFactory for SolanaTransportFactory {
    fn connect(
        &self,
        endpoint: &str,
        commitment: CommitmentConfig,
    ) -> RpcResult<Arc<dyn RpcTransport>> {
        Ok(Arc::new(SolanaRpcTransport::new(endpoint, commitment)?))
    }
}
