//! Shared test doubles for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use dex_connection::notify::{Notification, Notifier};
use dex_connection::rpc::{
    RpcError, RpcResult, RpcTransport, Subscription, SubscriptionKind, TransportFactory,
};
use parking_lot::Mutex;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Result as TransactionResult, Transaction},
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory transport recording every call
#[derive(Debug)]
pub struct MockTransport {
    endpoint: String,
    commitment: CommitmentConfig,
    pub blockhash: Hash,
    pub account_subscriptions: AtomicUsize,
    pub slot_subscriptions: AtomicUsize,
    /// Subscription tasks that have not exited yet
    pub active_subscriptions: Arc<AtomicUsize>,
    pub calls: Mutex<Vec<&'static str>>,
    pub sent: Mutex<Vec<(Vec<u8>, RpcSendTransactionConfig)>>,
    /// Popped once per status query; the last entry repeats forever
    statuses: Mutex<VecDeque<Option<TransactionResult<()>>>>,
    logs: Mutex<Option<Vec<String>>>,
    fail_logs: Mutex<bool>,
}

impl MockTransport {
    pub fn new(endpoint: &str, commitment: CommitmentConfig) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            commitment,
            blockhash: Hash::new_unique(),
            account_subscriptions: AtomicUsize::new(0),
            slot_subscriptions: AtomicUsize::new(0),
            active_subscriptions: Arc::new(AtomicUsize::new(0)),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            statuses: Mutex::new(VecDeque::from(vec![Some(Ok(()))])),
            logs: Mutex::new(None),
            fail_logs: Mutex::new(false),
        }
    }

    pub fn with_statuses(self, statuses: Vec<Option<TransactionResult<()>>>) -> Self {
        *self.statuses.lock() = statuses.into();
        self
    }

    pub fn with_logs(self, logs: Vec<&str>) -> Self {
        *self.logs.lock() = Some(logs.into_iter().map(str::to_string).collect());
        self
    }

    pub fn with_failing_logs(self) -> Self {
        *self.fail_logs.lock() = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn active(&self) -> usize {
        self.active_subscriptions.load(Ordering::SeqCst)
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().push(call);
    }

    fn subscribe(&self, kind: SubscriptionKind) -> Subscription {
        let active = Arc::clone(&self.active_subscriptions);
        active.fetch_add(1, Ordering::SeqCst);
        Subscription::spawn(kind, move |cancel| async move {
            let _ = cancel.await;
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    async fn get_latest_blockhash(&self, _commitment: CommitmentConfig) -> RpcResult<Hash> {
        self.record("getLatestBlockhash");
        Ok(self.blockhash)
    }

    async fn send_raw_transaction(
        &self,
        raw_transaction: &[u8],
        config: RpcSendTransactionConfig,
    ) -> RpcResult<Signature> {
        self.record("sendTransaction");
        let transaction: Transaction =
            bincode::deserialize(raw_transaction).map_err(|e| RpcError::MalformedResponse {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            })?;
        self.sent.lock().push((raw_transaction.to_vec(), config));
        Ok(transaction.signatures[0])
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> RpcResult<Option<TransactionResult<()>>> {
        self.record("getSignatureStatuses");
        let mut statuses = self.statuses.lock();
        let status = if statuses.len() > 1 {
            statuses.pop_front().flatten()
        } else {
            statuses.front().cloned().flatten()
        };
        Ok(status)
    }

    async fn get_transaction_logs(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> RpcResult<Option<Vec<String>>> {
        self.record("getTransaction");
        if *self.fail_logs.lock() {
            return Err(RpcError::TransactionNotFound {
                signature: signature.to_string(),
                endpoint: self.endpoint.clone(),
            });
        }
        Ok(self.logs.lock().clone())
    }

    fn on_account_change(&self, _account: Pubkey) -> Subscription {
        self.account_subscriptions.fetch_add(1, Ordering::SeqCst);
        self.subscribe(SubscriptionKind::AccountChange)
    }

    fn on_slot_change(&self) -> Subscription {
        self.slot_subscriptions.fetch_add(1, Ordering::SeqCst);
        self.subscribe(SubscriptionKind::SlotChange)
    }
}

/// Factory handing out [`MockTransport`]s and remembering them
#[derive(Debug, Default)]
pub struct MockFactory {
    pub created: Mutex<Vec<Arc<MockTransport>>>,
}

impl MockFactory {
    pub fn created(&self) -> Vec<Arc<MockTransport>> {
        self.created.lock().clone()
    }
}

impl TransportFactory for MockFactory {
    fn connect(
        &self,
        endpoint: &str,
        commitment: CommitmentConfig,
    ) -> RpcResult<Arc<dyn RpcTransport>> {
        let transport = Arc::new(MockTransport::new(endpoint, commitment));
        self.created.lock().push(Arc::clone(&transport));
        Ok(transport)
    }
}

/// Notifier that keeps what it was given
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn received(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().push(notification);
    }
}
